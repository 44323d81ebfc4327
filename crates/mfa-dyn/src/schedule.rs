//! Annealing schedule construction.

use mfa_core::{ErrorInfo, MfaError, Schedule};
use serde::{Deserialize, Serialize};

fn schedule_error(code: &str, message: impl Into<String>) -> MfaError {
    MfaError::Config(ErrorInfo::new(code, message))
}

/// Declarative schedule description used by run configurations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ScheduleSpec {
    /// Linear ramp from driver-dominated to problem-dominated over `p` steps.
    Linear {
        /// Number of steps.
        p: usize,
        /// Total annealing time.
        tau: f64,
        /// Optional override for the last driver angle.
        #[serde(default)]
        final_beta: Option<f64>,
    },
    /// Constant angles for every step.
    Constant {
        /// Number of steps.
        p: usize,
        /// Driver angle.
        beta: f64,
        /// Problem coefficient.
        gamma: f64,
    },
    /// Explicit per-step values.
    Explicit {
        /// Driver angles.
        beta: Vec<f64>,
        /// Problem coefficients.
        gamma: Vec<f64>,
    },
}

impl ScheduleSpec {
    /// Materialises the described schedule.
    pub fn build(&self) -> Result<Schedule, MfaError> {
        match self {
            ScheduleSpec::Linear { p, tau, final_beta } => linear_annealing(*p, *tau, *final_beta),
            ScheduleSpec::Constant { p, beta, gamma } => constant_schedule(*p, *beta, *gamma),
            ScheduleSpec::Explicit { beta, gamma } => Schedule::new(beta.clone(), gamma.clone()),
        }
    }
}

fn ensure_finite(name: &str, value: f64) -> Result<(), MfaError> {
    if !value.is_finite() {
        return Err(MfaError::Config(
            ErrorInfo::new("non-finite-schedule", format!("{name} must be finite"))
                .with_context("value", value),
        ));
    }
    Ok(())
}

/// Linear annealing ramp of `p` steps over total time `tau`.
///
/// Step `k = 1..=p` uses `gamma = tau (k - 1/2) / p` and
/// `beta = tau (1 - k / p)`. The ramp ends with `beta = 0`; `final_beta`
/// replaces that last value (the reference instances use `tau / (4p)`).
pub fn linear_annealing(p: usize, tau: f64, final_beta: Option<f64>) -> Result<Schedule, MfaError> {
    ensure_finite("tau", tau)?;
    if tau < 0.0 {
        return Err(schedule_error("negative-tau", "annealing time must be non-negative"));
    }
    let steps = p as f64;
    let mut beta: Vec<f64> = (1..=p).map(|k| tau * (1.0 - k as f64 / steps)).collect();
    let gamma: Vec<f64> = (1..=p).map(|k| tau * (k as f64 - 0.5) / steps).collect();
    if let (Some(last), Some(value)) = (beta.last_mut(), final_beta) {
        ensure_finite("final_beta", value)?;
        *last = value;
    }
    Schedule::new(beta, gamma)
}

/// `p` identical steps.
pub fn constant_schedule(p: usize, beta: f64, gamma: f64) -> Result<Schedule, MfaError> {
    ensure_finite("beta", beta)?;
    ensure_finite("gamma", gamma)?;
    Schedule::new(vec![beta; p], vec![gamma; p])
}
