use std::error::Error;

use mfa_core::Trajectory;
use mfa_dyn::record_trajectory;
use mfa_fluct::{analyze_fluctuations, FluctuationReport};

use super::evolve::RunArgs;
use crate::config::{Problem, RunConfig};
use crate::output::{persist_config, write_json};

pub fn analyze(
    problem: &Problem,
    config: &RunConfig,
) -> Result<(Trajectory, FluctuationReport), Box<dyn Error>> {
    let trajectory = record_trajectory(&problem.initial, &problem.interaction, &problem.schedule)?;
    let report = analyze_fluctuations(
        &trajectory,
        &problem.interaction,
        &problem.schedule,
        &config.fluct,
    )?;
    Ok((trajectory, report))
}

pub fn run(args: &RunArgs) -> Result<(), Box<dyn Error>> {
    let config = RunConfig::load(&args.config)?;
    let problem = config.materialize()?;
    persist_config(&config, &args.out)?;
    let (trajectory, report) = analyze(&problem, &config)?;
    write_json(args.out.join("trajectory.json"), &trajectory)?;
    write_json(args.out.join("fluctuations.json"), &report)?;
    Ok(())
}
