use std::path::PathBuf;

use clap::Parser;

use chopsticks_bench::config::{BenchmarkConfig, ResolvedOutputs};
use chopsticks_bench::logging::init_logging;
use chopsticks_bench::tournament::TournamentRunner;

/// Headless computer-vs-computer Chopsticks tournaments.
#[derive(Debug, Parser)]
#[command(
    name = "chopsticks-bench",
    author,
    version,
    about = "Deterministic Chopsticks tournament harness"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "bench/chopsticks.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the number of game seeds to play.
    #[arg(long, value_name = "GAMES")]
    games: Option<usize>,

    /// Override the RNG seed for game seeds.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Override the number of seat permutations per game seed.
    #[arg(long, value_name = "COUNT")]
    permutations: Option<usize>,

    /// Override the per-game turn limit.
    #[arg(long, value_name = "TURNS")]
    max_turns: Option<u32>,

    /// Log the evaluator's reasoning for every computer move.
    #[arg(long)]
    evaluation_details: bool,

    /// Exit after validating the configuration (no tournament is run).
    #[arg(long)]
    validate_only: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = BenchmarkConfig::from_path(&cli.config)?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }
    if let Some(games) = cli.games {
        config.games.count = games;
    }
    if let Some(seed) = cli.seed {
        config.games.seed = Some(seed);
    }
    if let Some(permutations) = cli.permutations {
        config.games.permutations = permutations;
    }
    if let Some(max_turns) = cli.max_turns {
        config.games.max_turns = max_turns;
    }
    if cli.evaluation_details {
        config.logging.evaluation_details = true;
    }

    config.validate()?;

    let outputs: ResolvedOutputs = config.resolved_outputs();
    let agent_count = config.agents.len();
    let run_id = config.run_id.clone();
    let games = config.games.count;
    let permutations = config.games.permutations;

    println!(
        "Loaded configuration '{run_id}' with {agent_count} agents ({games} games, up to {permutations} permutations)"
    );

    let runner = TournamentRunner::new(config.clone(), outputs.clone())?;

    if cli.validate_only {
        println!("Validation-only mode: tournament execution skipped.");
        return Ok(());
    }

    let _logging_guard = init_logging(&config.logging, &outputs)?;
    let summary = runner.run()?;
    println!(
        "Tournament complete for '{run_id}': {} games × {} permutations → {} rows at {}",
        summary.games_played,
        summary.permutations,
        summary.rows_written,
        summary.jsonl_path.display()
    );
    if summary.turn_limited > 0 {
        println!("{} games ended at the turn limit", summary.turn_limited);
    }
    println!("Summary table: {}", summary.summary_path.display());
    if let Some(telemetry_path) = summary.telemetry_path.as_ref() {
        println!("Telemetry log: {}", telemetry_path.display());
    }

    Ok(())
}
