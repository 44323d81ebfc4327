use mfa_core::{Interaction, MfaError, Schedule, Spin, SpinConfig, Trajectory};
use tracing::debug;

use crate::field::field_unchecked;
use crate::rotation::{rotate, rotation};

/// Advances `spins` by a single problem/driver step.
///
/// The field-dependent problem rotation acts on `(x, y)` first; the uniform
/// driver rotation then acts on `(y, z)`.
pub fn evolve_step(
    spins: &SpinConfig,
    interaction: &Interaction,
    beta: f64,
    gamma: f64,
) -> Result<SpinConfig, MfaError> {
    interaction.check_spins(spins.len())?;
    Ok(step_unchecked(spins, interaction, beta, gamma))
}

fn step_unchecked(
    spins: &SpinConfig,
    interaction: &Interaction,
    beta: f64,
    gamma: f64,
) -> SpinConfig {
    let field = field_unchecked(spins, interaction);
    let driver = rotation(2.0 * beta);
    spins
        .spins()
        .iter()
        .zip(field)
        .map(|(spin, m)| {
            let problem = rotation(2.0 * gamma * m);
            let (x, y_mid) = rotate(&problem, spin.x, spin.y);
            let (y, z) = rotate(&driver, y_mid, spin.z);
            Spin::new(x, y, z)
        })
        .collect()
}

/// Runs the full schedule and returns the final configuration.
///
/// An empty schedule returns a copy of `spins`.
pub fn evolve(
    spins: &SpinConfig,
    interaction: &Interaction,
    schedule: &Schedule,
) -> Result<SpinConfig, MfaError> {
    interaction.check_spins(spins.len())?;
    let mut current = spins.clone();
    for (beta, gamma) in schedule.steps() {
        current = step_unchecked(&current, interaction, beta, gamma);
    }
    Ok(current)
}

/// Runs the schedule and keeps every intermediate configuration.
///
/// The returned trajectory holds `p + 1` entries, the initial state first.
pub fn record_trajectory(
    spins: &SpinConfig,
    interaction: &Interaction,
    schedule: &Schedule,
) -> Result<Trajectory, MfaError> {
    interaction.check_spins(spins.len())?;
    let mut trajectory = Trajectory::new(Vec::with_capacity(schedule.len() + 1));
    let mut current = spins.clone();
    for (beta, gamma) in schedule.steps() {
        let next = step_unchecked(&current, interaction, beta, gamma);
        trajectory.push(current);
        current = next;
    }
    trajectory.push(current);
    debug!(
        steps = schedule.len(),
        spins = spins.len(),
        "recorded mean-field trajectory"
    );
    Ok(trajectory)
}
