use anyhow::{Context, Result, bail};

/// Seed used when no tokens are given.
pub const DEFAULT_SEED: u64 = 1337;

const MAX_RANGE_LEN: u64 = 10_000;

/// Split a comma-separated argument into trimmed, non-empty tokens.
pub fn split_csv(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_seed(token: &str) -> Result<u64> {
    if let Some(hex) = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
    {
        return u64::from_str_radix(&hex.replace('_', ""), 16)
            .with_context(|| format!("invalid hex seed: {token}"));
    }
    if let Ok(value) = token.parse::<i64>() {
        return Ok(value.unsigned_abs());
    }
    token
        .parse::<u64>()
        .with_context(|| format!("Unrecognized seed token: {token}"))
}

/// Resolve CLI seed tokens into a deduplicated list.
///
/// Accepts decimal integers (negatives use their magnitude), `0x` hex
/// literals and inclusive ranges such as `1..10`.
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<u64>> {
    let mut seeds: Vec<u64> = Vec::new();
    for token in tokens {
        if let Some((start, end)) = token.split_once("..") {
            let start = parse_seed(start.trim())?;
            let end = parse_seed(end.trim_start_matches('=').trim())?;
            if end < start {
                bail!("empty seed range: {token}");
            }
            if end - start >= MAX_RANGE_LEN {
                bail!("seed range {token} exceeds {MAX_RANGE_LEN} seeds");
            }
            seeds.extend(start..=end);
        } else {
            seeds.push(parse_seed(token)?);
        }
    }

    let mut seen = std::collections::HashSet::new();
    seeds.retain(|seed| seen.insert(*seed));
    if seeds.is_empty() {
        seeds.push(DEFAULT_SEED);
    }
    Ok(seeds)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(input: &str) -> Result<Vec<u64>> {
        resolve_seed_inputs(&split_csv(input))
    }

    #[test]
    fn resolves_numbers_hex_and_ranges() {
        assert_eq!(resolve("42, -7,0x10").unwrap(), vec![42, 7, 16]);
        assert_eq!(resolve("3..5,4").unwrap(), vec![3, 4, 5]);
        assert_eq!(resolve("1..=2").unwrap(), vec![1, 2]);
    }

    #[test]
    fn empty_input_falls_back_to_default() {
        assert_eq!(resolve(" , ").unwrap(), vec![DEFAULT_SEED]);
    }

    #[test]
    fn rejects_garbage_and_backwards_ranges() {
        assert!(resolve("banana").is_err());
        assert!(resolve("9..3").is_err());
        assert!(resolve("0..100000").is_err());
    }
}
