use mfa_core::{
    round_f64, stable_hash_string, ErrorInfo, Interaction, MfaError, Schedule, Trajectory,
};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::compose::{compose_generators, ComposeOpts, StepDiagnostics, DEFAULT_CONDITION_LIMIT};
use crate::generator::{align_inputs, assemble_generator, couplings_for};

fn default_condition_limit() -> f64 {
    DEFAULT_CONDITION_LIMIT
}

fn default_imag_tolerance() -> f64 {
    1e-8
}

/// Options controlling a fluctuation analysis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FluctOpts {
    /// Fluctuation time step used in every step propagator.
    pub tau: f64,
    /// Condition number above which a step is flagged as ill-conditioned.
    #[serde(default = "default_condition_limit")]
    pub condition_limit: f64,
    /// Imaginary part above which a frequency marks an unstable step.
    #[serde(default = "default_imag_tolerance")]
    pub imag_tolerance: f64,
}

impl FluctOpts {
    /// Options with default thresholds for the given time step.
    pub fn with_tau(tau: f64) -> Self {
        Self {
            tau,
            condition_limit: default_condition_limit(),
            imag_tolerance: default_imag_tolerance(),
        }
    }

    fn validate(&self) -> Result<(), MfaError> {
        if !(self.condition_limit.is_finite() && self.condition_limit >= 1.0) {
            return Err(MfaError::Config(
                ErrorInfo::new("condition-limit", "condition limit must be finite and >= 1")
                    .with_context("condition_limit", self.condition_limit),
            ));
        }
        if !(self.imag_tolerance.is_finite() && self.imag_tolerance >= 0.0) {
            return Err(MfaError::Config(
                ErrorInfo::new("imag-tolerance", "imaginary tolerance must be non-negative")
                    .with_context("imag_tolerance", self.imag_tolerance),
            ));
        }
        Ok(())
    }
}

/// Numerical health of a fluctuation analysis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FluctDiagnostics {
    /// Largest imaginary part of any generator eigenvalue.
    pub max_imag: f64,
    /// Steps whose spectrum left the real axis.
    pub unstable_steps: Vec<usize>,
    /// Largest deviation of any `A` block from Hermiticity.
    pub hermiticity_residual: f64,
    /// Largest deviation of any `B` block from symmetry.
    pub symmetry_residual: f64,
    /// Largest eigenbasis condition number.
    pub max_condition: f64,
    /// Steps whose eigenbasis exceeded the condition limit.
    pub ill_conditioned_steps: Vec<usize>,
    /// Largest `|l_i + l_(m-1-i)|` of the final Lyapunov spectrum.
    pub sum_rule_residual: f64,
    /// Spins whose gauge entry is zero.
    pub undecided_spins: Vec<usize>,
    /// Per-step values.
    pub steps: Vec<StepDiagnostics>,
}

/// Serializable result of [`analyze_fluctuations`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FluctuationReport {
    /// Content hash over the rounded spectra and diagnostics.
    pub analysis_hash: String,
    /// Number of fluctuation modes `2 (N - 1)`.
    pub modes: usize,
    /// Number of schedule steps.
    pub steps: usize,
    /// Fluctuation time step.
    pub tau: f64,
    /// Gauge frame taken from the final configuration.
    pub gauge: Vec<i8>,
    /// Frequencies, one row per mode.
    pub omega: Vec<Vec<f64>>,
    /// Lyapunov exponents, one row per mode, largest first.
    pub lyapunov: Vec<Vec<f64>>,
    /// Numerical diagnostics.
    pub diagnostics: FluctDiagnostics,
}

fn matrix_rows(matrix: &DMatrix<f64>) -> Vec<Vec<f64>> {
    matrix
        .row_iter()
        .map(|row| row.iter().copied().collect())
        .collect()
}

/// Largest `|l_i + l_(m-1-i)|` of a sorted spectrum.
pub fn sum_rule_residual(spectrum: &[f64]) -> f64 {
    spectrum
        .iter()
        .zip(spectrum.iter().rev())
        .map(|(low, high)| (low + high).abs())
        .fold(0.0, f64::max)
}

/// Runs the fluctuation analysis and gathers spectra plus diagnostics.
pub fn analyze_fluctuations(
    trajectory: &Trajectory,
    interaction: &Interaction,
    schedule: &Schedule,
    opts: &FluctOpts,
) -> Result<FluctuationReport, MfaError> {
    opts.validate()?;
    let inputs = align_inputs(trajectory, interaction, schedule)?;
    let couplings = couplings_for(&inputs, interaction, schedule)?;
    let hermiticity_residual = couplings
        .iter()
        .map(|pair| pair.hermiticity_residual())
        .fold(0.0, f64::max);
    let symmetry_residual = couplings
        .iter()
        .map(|pair| pair.symmetry_residual())
        .fold(0.0, f64::max);
    let generators: Vec<_> = couplings.iter().map(assemble_generator).collect();

    let modes = 2 * interaction.dynamical();
    let history = compose_generators(
        &generators,
        modes,
        &ComposeOpts {
            tau: opts.tau,
            condition_limit: opts.condition_limit,
        },
    )?;

    let unstable_steps: Vec<usize> = history
        .steps
        .iter()
        .filter(|diag| diag.max_imag > opts.imag_tolerance)
        .map(|diag| diag.step)
        .collect();
    if !unstable_steps.is_empty() {
        warn!(?unstable_steps, "generator spectrum left the real axis");
    }
    let ill_conditioned_steps = history
        .steps
        .iter()
        .filter(|diag| diag.condition > opts.condition_limit)
        .map(|diag| diag.step)
        .collect();
    let sum_rule = history
        .final_lyapunov()
        .map(|spectrum| sum_rule_residual(&spectrum))
        .unwrap_or(0.0);
    let gauge = inputs.gauge.clone();

    let diagnostics = FluctDiagnostics {
        max_imag: history.steps.iter().map(|d| d.max_imag).fold(0.0, f64::max),
        unstable_steps,
        hermiticity_residual,
        symmetry_residual,
        max_condition: history.steps.iter().map(|d| d.condition).fold(0.0, f64::max),
        ill_conditioned_steps,
        sum_rule_residual: sum_rule,
        undecided_spins: gauge.as_ref().map(|g| g.undecided()).unwrap_or_default(),
        steps: history.steps.clone(),
    };

    let mut report = FluctuationReport {
        analysis_hash: String::new(),
        modes,
        steps: history.len(),
        tau: opts.tau,
        gauge: gauge.map(|g| g.signs().to_vec()).unwrap_or_default(),
        omega: matrix_rows(&history.omega),
        lyapunov: matrix_rows(&history.lyapunov),
        diagnostics,
    };
    let rounded = |rows: &[Vec<f64>]| -> Vec<Vec<f64>> {
        rows.iter()
            .map(|row| row.iter().copied().map(round_f64).collect())
            .collect()
    };
    report.analysis_hash = stable_hash_string(&(
        report.modes,
        report.steps,
        round_f64(report.tau),
        &report.gauge,
        rounded(&report.omega),
        rounded(&report.lyapunov),
        &report.diagnostics.unstable_steps,
    ))?;
    debug!(
        steps = report.steps,
        modes = report.modes,
        sum_rule = report.diagnostics.sum_rule_residual,
        "fluctuation analysis complete"
    );
    Ok(report)
}
