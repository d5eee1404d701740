//! Scenario Runner CLI
//!
//! Replays scripted capture-the-flag scenarios on a headless host and dumps
//! config presets.

#[cfg(feature = "cli")]
use anyhow::Result;
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "ctf_runner")]
#[command(about = "Replay capture-the-flag scenarios through the rule engine", long_about = None)]
struct Cli {
    /// Log engine events (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Run a scenario script and print a JSON summary
    Run {
        /// Scenario JSON file path
        #[arg(long)]
        scenario: PathBuf,

        /// Match config JSON file (defaults + CTF_SCORE_SCALE when omitted)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Spawn RNG seed
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Pretty-print the summary
        #[arg(long, default_value = "false")]
        pretty: bool,
    },

    /// Print a match config as JSON
    Config {
        /// Score reward preset (asymmetric, flat, prototype)
        #[arg(long)]
        scale: Option<String>,
    },
}

#[cfg(feature = "cli")]
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Run { scenario, config, seed, pretty } => {
            let script = ctf_runner::load_scenario(&scenario)?;
            let config = ctf_runner::load_config(config.as_deref())?;
            tracing::info!(scenario = %scenario.display(), seed, "running scenario");

            let summary = ctf_runner::run_scenario(config, &script, seed)?;
            let json = if pretty {
                serde_json::to_string_pretty(&summary)?
            } else {
                serde_json::to_string(&summary)?
            };
            println!("{}", json);
        }

        Commands::Config { scale } => {
            let mut config = ctf_core::MatchConfig::default();
            if let Some(scale) = scale {
                config = config.with_score_scale(scale.parse::<ctf_core::ScoreScale>()?);
            }
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn init_tracing(verbose: bool) {
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::WARN };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("ctf_runner CLI is not available. Enable the 'cli' feature to use it.");
    std::process::exit(1);
}
