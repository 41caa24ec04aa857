//! Headless settlement runner.
//!
//! # Usage
//!
//! ```bash
//! # Built-in demo scenario
//! cargo run -p hexhold_headless -- demo
//!
//! # Scenario file, pretty-printed report
//! cargo run -p hexhold_headless -- run --scenario scenarios/starter.ron --pretty
//!
//! # Shortest path between two tiles
//! cargo run -p hexhold_headless -- path --scenario scenarios/starter.ron --from 0 --to 15
//!
//! # Determinism check
//! cargo run -p hexhold_headless -- verify --scenario scenarios/starter.ron --runs 5
//! ```
//!
//! Reports go to stdout as JSON; logs go to stderr.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use hexhold_core::tile::TileId;
use hexhold_headless::{find_path, run_scenario, verify_determinism, Scenario};

#[derive(Parser)]
#[command(name = "hexhold_headless")]
#[command(about = "Headless settlement runner for scenario testing and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scenario file and print the report
    Run {
        /// Scenario file to load
        #[arg(short, long)]
        scenario: PathBuf,

        /// Ticks to run (defaults to the scenario's own count)
        #[arg(short, long)]
        ticks: Option<u64>,

        /// Pretty-print the JSON report
        #[arg(long)]
        pretty: bool,
    },

    /// Run the built-in starter demo
    Demo {
        /// Ticks to run
        #[arg(short, long)]
        ticks: Option<u64>,

        /// Pretty-print the JSON report
        #[arg(long)]
        pretty: bool,
    },

    /// Print the shortest path between two tiles of a scenario
    Path {
        /// Scenario file to load
        #[arg(short, long)]
        scenario: PathBuf,

        /// Start tile id
        #[arg(long)]
        from: u32,

        /// End tile id
        #[arg(long)]
        to: u32,
    },

    /// Run a scenario several times and compare final state hashes
    Verify {
        /// Scenario file to load
        #[arg(short, long)]
        scenario: PathBuf,

        /// Number of runs
        #[arg(short, long, default_value = "3")]
        runs: u32,

        /// Ticks per run (defaults to the scenario's own count)
        #[arg(short, long)]
        ticks: Option<u64>,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging to stderr (stdout is for reports)
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(filter)
        .init();

    match cli.command {
        Commands::Run {
            scenario,
            ticks,
            pretty,
        } => cmd_run(&load_or_exit(&scenario), ticks, pretty),
        Commands::Demo { ticks, pretty } => cmd_run(&Scenario::starter_demo(), ticks, pretty),
        Commands::Path { scenario, from, to } => cmd_path(&load_or_exit(&scenario), from, to),
        Commands::Verify {
            scenario,
            runs,
            ticks,
        } => cmd_verify(&load_or_exit(&scenario), runs, ticks),
    }
}

fn load_or_exit(path: &Path) -> Scenario {
    match Scenario::load(path) {
        Ok(scenario) => scenario,
        Err(e) => {
            eprintln!("Failed to load scenario: {e}");
            std::process::exit(1);
        }
    }
}

fn print_json<T: Serialize>(value: &T, pretty: bool) {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    match json {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Failed to serialize report: {e}");
            std::process::exit(1);
        }
    }
}

/// Run a scenario and print its report
fn cmd_run(scenario: &Scenario, ticks: Option<u64>, pretty: bool) {
    match run_scenario(scenario, ticks) {
        Ok(report) => print_json(&report, pretty),
        Err(e) => {
            eprintln!("Scenario failed: {e}");
            std::process::exit(1);
        }
    }
}

/// Print the route between two tiles
fn cmd_path(scenario: &Scenario, from: u32, to: u32) {
    match find_path(scenario, TileId::new(from), TileId::new(to)) {
        Ok(report) => print_json(&report, true),
        Err(e) => {
            eprintln!("No path: {e}");
            std::process::exit(1);
        }
    }
}

/// Check that repeated runs agree
fn cmd_verify(scenario: &Scenario, runs: u32, ticks: Option<u64>) {
    let ticks = ticks.unwrap_or(scenario.ticks);
    tracing::info!(scenario = %scenario.name, runs, ticks, "Verifying determinism");

    let hashes = match verify_determinism(scenario, ticks, runs) {
        Ok(hashes) => hashes,
        Err(e) => {
            eprintln!("Scenario failed: {e}");
            std::process::exit(1);
        }
    };

    if hashes.windows(2).all(|w| w[0] == w[1]) {
        eprintln!("PASS: All {runs} runs produced identical results");
    } else {
        eprintln!("FAIL: Non-determinism detected! Hashes: {hashes:?}");
        std::process::exit(1);
    }
}
