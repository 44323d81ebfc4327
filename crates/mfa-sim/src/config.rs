use std::error::Error;
use std::fs;
use std::path::Path;

use mfa_core::{Interaction, Schedule, SpinConfig};
use mfa_dyn::{InstanceSpec, ScheduleSpec};
use mfa_fluct::FluctOpts;
use serde::{Deserialize, Serialize};

const DEFAULT_FLUCT_TAU: f64 = 1.0;

fn default_fluct() -> FluctOpts {
    FluctOpts::with_tau(DEFAULT_FLUCT_TAU)
}

/// YAML run configuration shared by every subcommand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub instance: InstanceSpec,
    pub schedule: ScheduleSpec,
    /// Initial dynamical spins; all spins along +x when omitted.
    #[serde(default)]
    pub initial: Option<SpinConfig>,
    #[serde(default = "default_fluct")]
    pub fluct: FluctOpts,
}

/// Materialised inputs of a run.
#[derive(Debug, Clone)]
pub struct Problem {
    pub interaction: Interaction,
    pub schedule: Schedule,
    pub initial: SpinConfig,
}

impl RunConfig {
    pub fn load(path: &Path) -> Result<Self, Box<dyn Error>> {
        let contents = fs::read_to_string(path)?;
        let config: RunConfig = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    pub fn materialize(&self) -> Result<Problem, Box<dyn Error>> {
        let interaction = self.instance.build()?;
        let schedule = self.schedule.build()?;
        let initial = match &self.initial {
            Some(spins) => spins.clone(),
            None => SpinConfig::polarized_x(interaction.dynamical()),
        };
        interaction.check_spins(initial.len())?;
        Ok(Problem {
            interaction,
            schedule,
            initial,
        })
    }
}
