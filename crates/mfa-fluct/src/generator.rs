//! Bogoliubov coupling blocks and the pseudo-Hermitian generator.

use mfa_core::{ErrorInfo, Interaction, MfaError, Schedule, SpinConfig, Trajectory};
use mfa_dyn::local_field;
use nalgebra::{DMatrix, DVector};
use num_complex::Complex64;

use crate::gauge::GaugeFrame;

/// Normal (`a`, Hermitian) and anomalous (`b`, symmetric) coupling blocks of
/// a single step.
#[derive(Debug, Clone, PartialEq)]
pub struct CouplingPair {
    /// Particle-conserving block.
    pub a: DMatrix<Complex64>,
    /// Pair-creation block.
    pub b: DMatrix<Complex64>,
}

impl CouplingPair {
    /// Largest entry of `a - a^dagger`.
    pub fn hermiticity_residual(&self) -> f64 {
        max_abs(&(&self.a - self.a.adjoint()))
    }

    /// Largest entry of `b - b^T`.
    pub fn symmetry_residual(&self) -> f64 {
        max_abs(&(&self.b - self.b.transpose()))
    }
}

fn max_abs(m: &DMatrix<Complex64>) -> f64 {
    m.iter().map(|value| value.norm()).fold(0.0, f64::max)
}

/// Configurations and gauge frame consumed by the fluctuation analysis.
#[derive(Debug, Clone)]
pub struct StepInputs<'a> {
    /// One configuration per schedule step.
    pub states: &'a [SpinConfig],
    /// Frame derived from the final trajectory point.
    pub gauge: Option<GaugeFrame>,
}

/// Pairs a trajectory with a schedule of `p` steps.
///
/// A trajectory of `p` configurations is used as is. A recorded trajectory of
/// `p + 1` configurations (initial state first) contributes its first `p`
/// entries. In both cases the gauge comes from the last entry.
pub fn align_inputs<'a>(
    trajectory: &'a Trajectory,
    interaction: &Interaction,
    schedule: &Schedule,
) -> Result<StepInputs<'a>, MfaError> {
    let p = schedule.len();
    let len = trajectory.len();
    if len != p && len != p + 1 {
        return Err(MfaError::Shape(
            ErrorInfo::new(
                "trajectory-length",
                "trajectory must hold one configuration per step (optionally plus the final state)",
            )
            .with_context("steps", p)
            .with_context("configurations", len)
            .with_hint("pass the output of record_trajectory for the same schedule"),
        ));
    }
    for state in trajectory.states() {
        interaction.check_spins(state.len())?;
    }
    let gauge = match trajectory.final_state() {
        Some(state) if p > 0 => Some(GaugeFrame::from_final_state(state)?),
        _ => None,
    };
    Ok(StepInputs {
        states: &trajectory.states()[..p],
        gauge,
    })
}

/// Builds the coupling blocks of one step from its configuration.
pub fn step_couplings(
    state: &SpinConfig,
    interaction: &Interaction,
    gauge: &GaugeFrame,
    beta: f64,
    gamma: f64,
) -> Result<CouplingPair, MfaError> {
    let n = state.len();
    if gauge.len() != n {
        return Err(MfaError::shape_mismatch(
            "gauge-length",
            "gauge frame does not cover the configuration",
            n,
            gauge.len(),
        ));
    }
    let field = local_field(state, interaction)?;
    let raising = |idx: usize| {
        let spin = state.spin(idx);
        Complex64::new(gauge.value(idx) * spin.x, spin.y)
    };
    let lowering = |idx: usize| raising(idx).conj();

    let mut a = DMatrix::<Complex64>::zeros(n, n);
    let mut b = DMatrix::<Complex64>::zeros(n, n);
    for i in 0..n {
        let spin = state.spin(i);
        let denominator = 1.0 + gauge.value(i) * spin.z;
        if denominator == 0.0 {
            return Err(MfaError::Numerics(
                ErrorInfo::new(
                    "gauge-pole",
                    "spin points against its gauge direction; curvature term is singular",
                )
                .with_context("spin", i)
                .with_context("z", spin.z)
                .with_hint("the gauge frame comes from the last trajectory entry"),
            ));
        }
        // Half of the diagonal; the Hermitian symmetrisation below doubles it.
        let diagonal = beta * spin.x / denominator + gamma * gauge.value(i) * field[i];
        a[(i, i)] = Complex64::new(diagonal, 0.0);
        for j in (i + 1)..n {
            let weight = -gamma * interaction.coupling(i, j);
            a[(i, j)] = raising(i) * lowering(j) * weight;
            b[(i, j)] = raising(i) * raising(j) * weight;
        }
    }
    let a_dagger = a.adjoint();
    let b_transpose = b.transpose();
    a += a_dagger;
    b += b_transpose;
    Ok(CouplingPair { a, b })
}

/// Coupling blocks for every step of the schedule.
pub fn build_couplings(
    trajectory: &Trajectory,
    interaction: &Interaction,
    schedule: &Schedule,
) -> Result<Vec<CouplingPair>, MfaError> {
    let inputs = align_inputs(trajectory, interaction, schedule)?;
    couplings_for(&inputs, interaction, schedule)
}

pub(crate) fn couplings_for(
    inputs: &StepInputs<'_>,
    interaction: &Interaction,
    schedule: &Schedule,
) -> Result<Vec<CouplingPair>, MfaError> {
    let Some(gauge) = inputs.gauge.as_ref() else {
        return Ok(Vec::new());
    };
    inputs
        .states
        .iter()
        .zip(schedule.steps())
        .map(|(state, (beta, gamma))| step_couplings(state, interaction, gauge, beta, gamma))
        .collect()
}

/// Indefinite metric `diag(+1, ..., +1, -1, ..., -1)` with blocks of size `n`.
pub fn pseudo_metric(n: usize) -> DMatrix<Complex64> {
    let signs = DVector::from_fn(2 * n, |row, _| {
        if row < n {
            Complex64::new(1.0, 0.0)
        } else {
            Complex64::new(-1.0, 0.0)
        }
    });
    DMatrix::from_diagonal(&signs)
}

/// Generator `tau_3 [[A, B], [B^dagger, A^*]]` of the linearised dynamics.
pub fn assemble_generator(pair: &CouplingPair) -> DMatrix<Complex64> {
    let n = pair.a.nrows();
    let mut block = DMatrix::<Complex64>::zeros(2 * n, 2 * n);
    block.view_mut((0, 0), (n, n)).copy_from(&pair.a);
    block.view_mut((0, n), (n, n)).copy_from(&pair.b);
    block.view_mut((n, 0), (n, n)).copy_from(&pair.b.adjoint());
    block.view_mut((n, n), (n, n)).copy_from(&pair.a.conjugate());
    pseudo_metric(n) * block
}

/// Generators for every step of the schedule.
pub fn build_generators(
    trajectory: &Trajectory,
    interaction: &Interaction,
    schedule: &Schedule,
) -> Result<Vec<DMatrix<Complex64>>, MfaError> {
    Ok(build_couplings(trajectory, interaction, schedule)?
        .iter()
        .map(assemble_generator)
        .collect())
}
