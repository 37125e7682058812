//! Command-line interface for sweep-runner
//!
//! `launch` registers a sweep and starts the tracker's agent, which calls back
//! into `trial` once per suggested configuration. `merge` previews a trial config.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod launch;
mod merge;
mod trial;
mod utils;

/// Launch hyperparameter sweeps through an external experiment tracker
#[derive(Parser)]
#[command(name = "sweep-runner")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (sets log level to DEBUG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a sweep with the tracker and run its agent
    Launch(launch::LaunchArgs),

    /// Run one trial with parameters suggested by the tracker
    Trial(trial::TrialArgs),

    /// Print the configuration a trial would train with
    Merge(merge::MergeArgs),
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG in the environment always takes precedence; --verbose falls back to DEBUG.
    let filter = if cli.verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    match cli.command {
        Commands::Launch(args) => launch::run(args),
        Commands::Trial(args) => trial::run(args),
        Commands::Merge(args) => merge::run(args),
    }
}
