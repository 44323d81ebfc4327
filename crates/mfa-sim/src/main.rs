use std::error::Error;

use clap::{Parser, Subcommand};
use commands::{
    evolve::{self, RunArgs},
    fluct, run,
    version::{self, VersionArgs},
};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod output;

#[derive(Parser, Debug)]
#[command(name = "mfa-sim", about = "Mean-field AOA propagator and fluctuation CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Propagate the mean-field spins through the schedule.
    Evolve(RunArgs),
    /// Record the trajectory and analyse its linear fluctuations.
    Fluct(RunArgs),
    /// Run both stages and write a summary.
    Run(RunArgs),
    /// Print version information.
    Version(VersionArgs),
}

fn main() -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();
    match cli.command {
        Command::Evolve(args) => evolve::run(&args),
        Command::Fluct(args) => fluct::run(&args),
        Command::Run(args) => run::run(&args),
        Command::Version(args) => version::run(&args),
    }
}
