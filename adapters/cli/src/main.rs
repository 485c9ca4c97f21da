#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter: runs one full match and reports the outcome.
//!
//! Logging goes through `env_logger`, so `RUST_LOG=info` shows the round
//! commentary and `RUST_LOG=debug` the full event stream.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;

use storm_arena_agents::{IdleAgent, RandomAgent, SeekerAgent};
use storm_arena_core::MatchConfig;
use storm_arena_session::{MatchOutcome, Session};
use storm_arena_toolkit::Agent;

#[derive(Debug, Parser)]
#[command(name = "storm-arena", about = "Deterministic two-player arena matches")]
struct Args {
    /// Agent controlling the first player: idle, random, or seeker.
    #[arg(long, default_value = "seeker")]
    player_one: String,

    /// Agent controlling the second player: idle, random, or seeker.
    #[arg(long, default_value = "random")]
    player_two: String,

    /// Match seed. Identical seeds reproduce identical matches.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// JSON file overriding the default match configuration. Missing fields
    /// keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Grid width override.
    #[arg(long)]
    width: Option<i32>,

    /// Grid height override.
    #[arg(long)]
    height: Option<i32>,

    /// Round limit override.
    #[arg(long)]
    max_rounds: Option<u32>,
}

fn make_agent(name: &str) -> anyhow::Result<Box<dyn Agent>> {
    match name {
        "idle" => Ok(Box::new(IdleAgent)),
        "random" => Ok(Box::new(RandomAgent)),
        "seeker" => Ok(Box::new(SeekerAgent)),
        other => bail!("unknown agent '{other}', expected idle, random, or seeker"),
    }
}

fn load_config(args: &Args) -> anyhow::Result<MatchConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("parsing {}", path.display()))?
        }
        None => MatchConfig::default(),
    };
    if let Some(width) = args.width {
        config.width = width;
    }
    if let Some(height) = args.height {
        config.height = height;
    }
    if let Some(max_rounds) = args.max_rounds {
        config.max_rounds = max_rounds;
    }
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    let config = load_config(&args)?;
    let agents = [make_agent(&args.player_one)?, make_agent(&args.player_two)?];
    let mut session = Session::new(config, agents, args.seed)?;
    match session.run() {
        MatchOutcome::Victory { winner } => println!(
            "{} wins after {} round(s)",
            session.agent_name(winner).unwrap_or("unknown"),
            session.round(),
        ),
        MatchOutcome::Draw => println!("draw after {} round(s)", session.round()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agent_names_resolve_or_fail_loudly() {
        assert!(make_agent("idle").is_ok());
        assert!(make_agent("random").is_ok());
        assert!(make_agent("seeker").is_ok());
        assert!(make_agent("camper").is_err());
    }

    #[test]
    fn cli_overrides_win_over_defaults() {
        let args = Args::parse_from([
            "storm-arena",
            "--width",
            "12",
            "--height",
            "10",
            "--max-rounds",
            "50",
        ]);
        let config = load_config(&args).expect("config loads");
        assert_eq!(config.width, 12);
        assert_eq!(config.height, 10);
        assert_eq!(config.max_rounds, 50);
        assert_eq!(config.storm_interval, 20);
    }
}
