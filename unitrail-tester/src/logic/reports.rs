use std::io::Write;
use std::time::Duration;

use anyhow::Result;
use colored::Colorize;

use super::simulation::SimulationRun;

fn count(value: usize) -> f64 {
    f64::from(u32::try_from(value).unwrap_or(u32::MAX))
}

fn success_rate(runs: &[SimulationRun]) -> f64 {
    if runs.is_empty() {
        return 0.0;
    }
    let passed = runs.iter().filter(|run| run.passed()).count();
    count(passed) / count(runs.len()) * 100.0
}

fn mean_turns_to_complete(runs: &[SimulationRun]) -> Option<f64> {
    let finished: Vec<u32> = runs.iter().filter_map(|run| run.turns_to_complete).collect();
    if finished.is_empty() {
        return None;
    }
    let total: f64 = finished.iter().copied().map(f64::from).sum();
    Some(total / count(finished.len()))
}

pub fn generate_console_report(
    out: &mut dyn Write,
    runs: &[SimulationRun],
    total_duration: Duration,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 Simulation Results Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "=============================".cyan())?;

    let passed = runs.iter().filter(|run| run.passed()).count();
    let completed = runs.iter().filter(|run| run.completed).count();
    writeln!(out, "Total runs: {}", runs.len())?;
    writeln!(out, "Passed: {}", passed.to_string().green())?;
    writeln!(out, "Failed: {}", (runs.len() - passed).to_string().red())?;
    writeln!(out, "Success rate: {:.1}%", success_rate(runs))?;
    writeln!(out, "Graduated: {completed}/{}", runs.len())?;
    if let Some(mean) = mean_turns_to_complete(runs) {
        writeln!(out, "Mean turns to graduate: {mean:.1}")?;
    }
    writeln!(out, "Total time: {total_duration:?}")?;
    writeln!(out)?;

    for run in runs {
        let status = if run.passed() {
            "✅ PASS".green()
        } else {
            "❌ FAIL".red()
        };
        writeln!(
            out,
            "{} seed {} ({})",
            status,
            run.seed.to_string().bold(),
            run.policy
        )?;
        writeln!(
            out,
            "   Turns: {}  Level: {}  Credits: {}",
            run.turns_played, run.final_progress.level, run.final_progress.credits
        )?;
        for transition in &run.transitions {
            writeln!(
                out,
                "   ⬆️  turn {}: level {} -> {} ({})",
                transition.turn, transition.from, transition.to, transition.label
            )?;
        }
        writeln!(
            out,
            "   Enhanced turns: {}  Choices: {}  Time: {:?}",
            run.enhanced_turns, run.choices_taken, run.duration
        )?;
        if !run.violations.is_empty() {
            writeln!(out, "   Violations:")?;
            for violation in &run.violations {
                writeln!(out, "     • {}", violation.red())?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

pub fn generate_json_report(out: &mut dyn Write, runs: &[SimulationRun]) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, runs)?;
    writeln!(out)?;
    Ok(())
}

pub fn generate_markdown_report(out: &mut dyn Write, runs: &[SimulationRun]) -> Result<()> {
    writeln!(out, "# Unitrail Simulation Results\n")?;

    let passed = runs.iter().filter(|run| run.passed()).count();
    writeln!(out, "## Summary\n")?;
    writeln!(out, "- **Total runs**: {}", runs.len())?;
    writeln!(out, "- **Passed**: {passed}")?;
    writeln!(out, "- **Failed**: {}", runs.len() - passed)?;
    writeln!(out, "- **Success rate**: {:.1}%\n", success_rate(runs))?;

    writeln!(out, "## Runs\n")?;
    writeln!(
        out,
        "| Seed | Policy | Turns | Level | Credits | Graduated at | Choices | Status |"
    )?;
    writeln!(out, "|---|---|---|---|---|---|---|---|")?;
    for run in runs {
        let graduated = run
            .turns_to_complete
            .map_or_else(|| "-".to_string(), |turn| turn.to_string());
        writeln!(
            out,
            "| {} | {} | {} | {} | {} | {} | {} | {} |",
            run.seed,
            run.policy,
            run.turns_played,
            run.final_progress.level,
            run.final_progress.credits,
            graduated,
            run.choices_taken,
            if run.passed() { "✅" } else { "❌" }
        )?;
    }

    let failing: Vec<&SimulationRun> = runs.iter().filter(|run| !run.passed()).collect();
    if !failing.is_empty() {
        writeln!(out, "\n## Violations\n")?;
        for run in failing {
            writeln!(out, "### Seed {}\n", run.seed)?;
            for violation in &run.violations {
                writeln!(out, "- {violation}")?;
            }
            writeln!(out)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::simulation::TransitionRecord;
    use unitrail_game::{Progress, StatSet};

    fn run(seed: u64, violations: Vec<String>) -> SimulationRun {
        SimulationRun {
            seed,
            policy: "first".to_string(),
            turns_played: 120,
            completed: violations.is_empty(),
            turns_to_complete: violations.is_empty().then_some(100),
            transitions: vec![TransitionRecord {
                turn: 30,
                from: 1,
                to: 2,
                label: "Sophomore".to_string(),
            }],
            enhanced_turns: 4,
            choices_taken: 2,
            credits_earned: 45,
            final_progress: Progress {
                level: 4,
                stats: StatSet::default(),
                credits: 12,
                position: 3,
            },
            violations,
            duration: Duration::from_millis(3),
        }
    }

    fn render(f: impl FnOnce(&mut dyn Write) -> Result<()>) -> String {
        let mut buffer = Vec::new();
        f(&mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn json_report_lists_runs() {
        let runs = vec![run(1, Vec::new())];
        let text = render(|out| generate_json_report(out, &runs));
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed[0]["seed"], 1);
        assert_eq!(parsed[0]["final_progress"]["level"], 4);
        assert!(parsed[0].get("duration").is_none());
    }

    #[test]
    fn markdown_report_lists_violations() {
        let runs = vec![run(1, Vec::new()), run(2, vec!["turn 3: bad".to_string()])];
        let text = render(|out| generate_markdown_report(out, &runs));
        assert!(text.contains("- **Success rate**: 50.0%"));
        assert!(text.contains("| 1 | first | 120 | 4 | 12 | 100 | 2 | ✅ |"));
        assert!(text.contains("### Seed 2"));
        assert!(text.contains("- turn 3: bad"));
    }

    #[test]
    fn console_report_summarizes() {
        colored::control::set_override(false);
        let runs = vec![run(9, Vec::new())];
        let text = render(|out| generate_console_report(out, &runs, Duration::from_secs(1)));
        assert!(text.contains("Total runs: 1"));
        assert!(text.contains("Mean turns to graduate: 100.0"));
        assert!(text.contains("level 1 -> 2 (Sophomore)"));
    }
}
