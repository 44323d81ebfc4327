use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use mfa_core::{Interaction, Schedule, SpinConfig};
use mfa_dyn::{evolve, expectation, solution, undecided_bits};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::RunConfig;
use crate::output::{persist_config, write_json};

#[derive(Args, Debug)]
pub struct RunArgs {
    /// YAML run configuration.
    #[arg(long)]
    pub config: PathBuf,
    /// Output directory for run artefacts.
    #[arg(long)]
    pub out: PathBuf,
}

/// Contents of `final_state.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalState {
    pub spins: SpinConfig,
    pub energy: f64,
    pub bitstring: Vec<i8>,
    pub undecided: Vec<usize>,
    pub steps: usize,
}

pub fn final_state(
    initial: &SpinConfig,
    interaction: &Interaction,
    schedule: &Schedule,
) -> Result<FinalState, Box<dyn Error>> {
    let spins = evolve(initial, interaction, schedule)?;
    let z = spins.z_components();
    let energy = expectation(&z, interaction)?;
    let bitstring = solution(&z);
    let undecided = undecided_bits(&bitstring);
    info!(energy, steps = schedule.len(), "mean-field propagation finished");
    Ok(FinalState {
        spins,
        energy,
        bitstring,
        undecided,
        steps: schedule.len(),
    })
}

pub fn run(args: &RunArgs) -> Result<(), Box<dyn Error>> {
    let config = RunConfig::load(&args.config)?;
    let problem = config.materialize()?;
    persist_config(&config, &args.out)?;
    let state = final_state(&problem.initial, &problem.interaction, &problem.schedule)?;
    write_json(args.out.join("final_state.json"), &state)?;
    Ok(())
}
