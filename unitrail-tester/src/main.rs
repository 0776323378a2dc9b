mod logic;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use logic::{
    FsLoader, JsonFileStorage, PolicyKind, ScriptedEnhancer, SimulationConfig, SimulationRun,
    resolve_seed_inputs, run_simulation, split_csv,
};
use unitrail_game::{DataLoader, GameEngine, MemoryStorage, SnapshotStorage};

#[derive(Debug, Parser)]
#[command(name = "unitrail-tester", version = "0.1.0")]
#[command(about = "Automated seeded playthroughs and invariant checks for the Unitrail game")]
struct Args {
    /// Seeds to run (comma-separated integers, 0x hex or ranges like 1..10)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Maximum turns to play per seed
    #[arg(long, default_value_t = 500)]
    turns: u32,

    /// How enhancement choices are answered
    #[arg(long, value_enum, default_value_t = PolicyKind::First)]
    policy: PolicyKind,

    /// Game configuration JSON (defaults to the bundled assets)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Reference lists JSON (defaults to the bundled assets)
    #[arg(long)]
    references: Option<PathBuf>,

    /// Scripted enhancement replies to replay instead of plain tile events
    #[arg(long)]
    enhancements: Option<PathBuf>,

    /// How long to wait for each enhancement before using the plain event
    #[arg(long, default_value_t = 2_000)]
    enhancement_timeout_ms: u64,

    /// Persist the snapshot to this file after every turn
    #[arg(long)]
    save: Option<PathBuf>,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console"])]
    report: String,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    announce_banner();

    let start_time = Instant::now();
    let runs = run_all(&args).await?;
    write_reports(&args, &runs, start_time.elapsed())?;

    if runs.iter().any(|run| !run.passed()) {
        std::process::exit(1);
    }

    Ok(())
}

fn announce_banner() {
    println!("{}", "🎮 Unitrail Automated Tester".bright_cyan().bold());
    println!("{}", "============================".cyan());
}

async fn run_all(args: &Args) -> Result<Vec<SimulationRun>> {
    let seeds = resolve_seed_inputs(&split_csv(&args.seeds))?;
    let loader = FsLoader::new(args.config.clone(), args.references.clone());
    log::info!(
        "loading game configuration from {}",
        loader.config_path().display()
    );
    let enhancer = args
        .enhancements
        .as_deref()
        .map(ScriptedEnhancer::from_path)
        .transpose()?;

    if let Some(path) = &args.save {
        let engine = GameEngine::new(loader, JsonFileStorage::new(path.clone()));
        run_seeds(args, &engine, &seeds, enhancer.as_ref()).await
    } else {
        let engine = GameEngine::new(loader, MemoryStorage::new());
        run_seeds(args, &engine, &seeds, enhancer.as_ref()).await
    }
}

async fn run_seeds<L, S>(
    args: &Args,
    engine: &GameEngine<L, S>,
    seeds: &[u64],
    enhancer: Option<&ScriptedEnhancer>,
) -> Result<Vec<SimulationRun>>
where
    L: DataLoader,
    S: SnapshotStorage,
{
    println!("{}", "🎲 Running Simulations".bright_yellow().bold());
    println!("{}", "-".repeat(30).yellow());

    let mut runs = Vec::with_capacity(seeds.len());
    for &seed in seeds {
        let config = SimulationConfig::new(seed, args.policy)
            .with_max_turns(args.turns)
            .with_timeout(Duration::from_millis(args.enhancement_timeout_ms));
        let run = run_simulation(engine, config, enhancer, args.verbose)
            .await
            .with_context(|| format!("simulation for seed {seed} failed"))?;
        if run.passed() {
            println!(
                "✅ [seed {}] level {} after {} turns - {:?}",
                seed, run.final_progress.level, run.turns_played, run.duration
            );
        } else {
            eprintln!(
                "❌ [seed {}] {} violation(s) - {:?}",
                seed.to_string().red(),
                run.violations.len(),
                run.duration
            );
        }
        runs.push(run);
    }
    Ok(runs)
}

fn write_reports(args: &Args, runs: &[SimulationRun], duration: Duration) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report.as_str() {
        "json" => logic::reports::generate_json_report(&mut output_target, runs)?,
        "markdown" => {
            logic::reports::generate_markdown_report(&mut output_target, runs)?;
            writeln!(&mut output_target, "_Total time: {duration:?}_")?;
        }
        _ => {
            logic::reports::generate_console_report(&mut output_target, runs, duration)?;
            writeln!(&mut output_target, "🏁 Total time: {duration:?}")?;
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}
