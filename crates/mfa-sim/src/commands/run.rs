use std::error::Error;

use mfa_core::stable_hash_string;
use serde::Serialize;
use tracing::info;

use super::evolve::{final_state, RunArgs};
use super::fluct::analyze;
use crate::config::RunConfig;
use crate::output::{persist_config, write_json};

#[derive(Debug, Serialize)]
struct RunSummary {
    version: String,
    config_hash: String,
    spins: usize,
    steps: usize,
    energy: f64,
    bitstring: Vec<i8>,
    analysis_hash: String,
    max_lyapunov: f64,
    unstable_steps: Vec<usize>,
    ill_conditioned_steps: Vec<usize>,
    sum_rule_residual: f64,
}

pub fn run(args: &RunArgs) -> Result<(), Box<dyn Error>> {
    let config = RunConfig::load(&args.config)?;
    let problem = config.materialize()?;
    persist_config(&config, &args.out)?;

    let state = final_state(&problem.initial, &problem.interaction, &problem.schedule)?;
    let (trajectory, report) = analyze(&problem, &config)?;
    write_json(args.out.join("final_state.json"), &state)?;
    write_json(args.out.join("trajectory.json"), &trajectory)?;
    write_json(args.out.join("fluctuations.json"), &report)?;

    let max_lyapunov = report
        .lyapunov
        .first()
        .and_then(|row| row.last())
        .copied()
        .unwrap_or(0.0);
    let summary = RunSummary {
        version: env!("CARGO_PKG_VERSION").into(),
        config_hash: stable_hash_string(&config)?,
        spins: problem.interaction.dim(),
        steps: problem.schedule.len(),
        energy: state.energy,
        bitstring: state.bitstring,
        analysis_hash: report.analysis_hash.clone(),
        max_lyapunov,
        unstable_steps: report.diagnostics.unstable_steps.clone(),
        ill_conditioned_steps: report.diagnostics.ill_conditioned_steps.clone(),
        sum_rule_residual: report.diagnostics.sum_rule_residual,
    };
    info!(
        analysis_hash = %summary.analysis_hash,
        max_lyapunov,
        "run complete"
    );
    write_json(args.out.join("summary.json"), &summary)?;
    Ok(())
}
