//! Step propagators, the running propagator and finite-time Lyapunov spectra.

use mfa_core::{ErrorInfo, Interaction, MfaError, Schedule, Trajectory};
use nalgebra::{DMatrix, DVector, Schur, SymmetricEigen};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::generator::{align_inputs, assemble_generator, couplings_for};

const MAX_ITERATIONS: usize = 10_000;

/// Eigenbasis condition number above which a step is reported.
pub const DEFAULT_CONDITION_LIMIT: f64 = 1e8;

fn numerics_error(code: &str, message: impl Into<String>, step: usize) -> MfaError {
    MfaError::Numerics(ErrorInfo::new(code, message).with_context("step", step))
}

/// Eigendecomposition `L = V diag(w) V^-1` of a generator.
#[derive(Debug, Clone)]
pub struct Eigenbasis {
    /// Complex eigenvalues in Schur order.
    pub values: DVector<Complex64>,
    /// Unit-norm eigenvectors stored column-wise.
    pub vectors: DMatrix<Complex64>,
    /// Inverse of `vectors`.
    pub inverse: DMatrix<Complex64>,
    /// 2-norm condition number of `vectors`.
    pub condition: f64,
}

impl Eigenbasis {
    /// Largest imaginary part among the eigenvalues.
    pub fn max_imag(&self) -> f64 {
        self.values
            .iter()
            .map(|value| value.im.abs())
            .fold(0.0, f64::max)
    }

    /// Real parts of the eigenvalues, ascending.
    pub fn frequencies(&self) -> Vec<f64> {
        let mut freqs: Vec<f64> = self.values.iter().map(|value| value.re).collect();
        freqs.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        freqs
    }

    /// `V diag(exp(-i tau w)) V^-1`.
    pub fn propagator(&self, tau: f64) -> DMatrix<Complex64> {
        let phases = self.values.map(|value| (Complex64::new(0.0, -tau) * value).exp());
        &self.vectors * DMatrix::from_diagonal(&phases) * &self.inverse
    }
}

/// Relative size below which a diagonal gap and its right-hand side are both
/// treated as round-off of an exactly degenerate eigenvalue.
const DEGENERACY_TOLERANCE: f64 = 1e-12;

// Eigenvectors of an upper-triangular matrix by back-substitution. Degenerate
// eigenvalues with a vanishing right-hand side get a zero coefficient; other
// near-equal diagonal entries are separated by a floor proportional to the
// matrix norm.
fn triangular_eigenvectors(t: &DMatrix<Complex64>) -> DMatrix<Complex64> {
    let n = t.nrows();
    let scale = t.norm().max(f64::MIN_POSITIVE);
    let floor = f64::EPSILON * scale;
    let degenerate = DEGENERACY_TOLERANCE * scale;
    let mut y = DMatrix::<Complex64>::zeros(n, n);
    for k in 0..n {
        let lambda = t[(k, k)];
        y[(k, k)] = Complex64::new(1.0, 0.0);
        for i in (0..k).rev() {
            let mut acc = Complex64::new(0.0, 0.0);
            for j in (i + 1)..=k {
                acc += t[(i, j)] * y[(j, k)];
            }
            let mut denominator = t[(i, i)] - lambda;
            if denominator.norm() < degenerate && acc.norm() < degenerate {
                continue;
            }
            if denominator.norm() < floor {
                denominator = Complex64::new(floor, 0.0);
            }
            y[(i, k)] = -acc / denominator;
        }
    }
    y
}

/// Diagonalises a (non-Hermitian) generator through its complex Schur form.
pub fn diagonalize(generator: &DMatrix<Complex64>, step: usize) -> Result<Eigenbasis, MfaError> {
    let schur = Schur::try_new(generator.clone(), f64::EPSILON, MAX_ITERATIONS).ok_or_else(|| {
        numerics_error("schur-no-convergence", "Schur decomposition did not converge", step)
    })?;
    let (q, t) = schur.unpack();
    let values = t.diagonal();
    let mut vectors = q * triangular_eigenvectors(&t);
    for mut column in vectors.column_iter_mut() {
        column.normalize_mut();
    }

    let singular = vectors.singular_values();
    let sigma_max = singular.iter().copied().fold(0.0, f64::max);
    let sigma_min = singular.iter().copied().fold(f64::INFINITY, f64::min);
    if sigma_min <= 0.0 || !sigma_min.is_finite() {
        return Err(numerics_error(
            "singular-eigenbasis",
            "generator is defective; eigenvector matrix is singular",
            step,
        ));
    }
    let inverse = vectors.clone().try_inverse().ok_or_else(|| {
        numerics_error(
            "singular-eigenbasis",
            "eigenvector matrix could not be inverted",
            step,
        )
    })?;

    Ok(Eigenbasis {
        values,
        vectors,
        inverse,
        condition: sigma_max / sigma_min,
    })
}

/// Finite-time Lyapunov exponents `log(eig(M M^dagger)) / 2`, ascending.
pub fn lyapunov_spectrum(
    propagator: &DMatrix<Complex64>,
    step: usize,
) -> Result<Vec<f64>, MfaError> {
    if propagator
        .iter()
        .any(|entry| !(entry.re.is_finite() && entry.im.is_finite()))
    {
        return Err(numerics_error(
            "non-finite-propagator",
            "running propagator has non-finite entries",
            step,
        ));
    }
    let gram = propagator * propagator.adjoint();
    let eigen = SymmetricEigen::try_new(gram, f64::EPSILON, MAX_ITERATIONS).ok_or_else(|| {
        numerics_error(
            "gram-no-convergence",
            "Hermitian eigendecomposition of the Gram matrix did not converge",
            step,
        )
    })?;
    if eigen.eigenvalues.iter().any(|value| !value.is_finite()) {
        return Err(numerics_error(
            "non-finite-gram",
            "Gram matrix has non-finite eigenvalues",
            step,
        ));
    }
    // The Gram matrix is positive definite; clamp round-off below zero.
    let mut exponents: Vec<f64> = eigen
        .eigenvalues
        .iter()
        .map(|&value| 0.5 * value.max(f64::MIN_POSITIVE).ln())
        .collect();
    exponents.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    Ok(exponents)
}

/// Per-step numerical diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepDiagnostics {
    /// Step index.
    pub step: usize,
    /// Largest imaginary part of the generator's eigenvalues.
    pub max_imag: f64,
    /// Condition number of the eigenvector matrix.
    pub condition: f64,
}

/// Frequency and Lyapunov histories, one row per mode and one column per step.
#[derive(Debug, Clone, PartialEq)]
pub struct FluctuationHistory {
    /// Real eigenfrequencies, ascending within each column.
    pub omega: DMatrix<f64>,
    /// Lyapunov exponents, descending within each column.
    pub lyapunov: DMatrix<f64>,
    /// Diagnostics for every step.
    pub steps: Vec<StepDiagnostics>,
    /// Running propagator after the last step.
    pub propagator: DMatrix<Complex64>,
}

impl FluctuationHistory {
    /// Number of fluctuation modes `2 (N - 1)`.
    pub fn modes(&self) -> usize {
        self.omega.nrows()
    }

    /// Number of schedule steps.
    pub fn len(&self) -> usize {
        self.omega.ncols()
    }

    /// Returns `true` when no step was composed.
    pub fn is_empty(&self) -> bool {
        self.omega.ncols() == 0
    }

    /// Lyapunov spectrum at the final step, descending.
    pub fn final_lyapunov(&self) -> Option<Vec<f64>> {
        let steps = self.lyapunov.ncols();
        (steps > 0).then(|| self.lyapunov.column(steps - 1).iter().copied().collect())
    }
}

/// Options for [`compose_generators`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComposeOpts {
    /// Fluctuation time step.
    pub tau: f64,
    /// Condition number above which a step is logged as ill-conditioned.
    pub condition_limit: f64,
}

/// Multiplies the step propagators of `generators` into the running
/// propagator and records the spectra after every step.
pub fn compose_generators(
    generators: &[DMatrix<Complex64>],
    modes: usize,
    opts: &ComposeOpts,
) -> Result<FluctuationHistory, MfaError> {
    if !opts.tau.is_finite() {
        return Err(MfaError::Config(
            ErrorInfo::new("non-finite-tau", "fluctuation time step must be finite")
                .with_context("tau", opts.tau),
        ));
    }
    let p = generators.len();
    let mut propagator = DMatrix::<Complex64>::identity(modes, modes);
    let mut omega = DMatrix::<f64>::zeros(modes, p);
    let mut lyapunov = DMatrix::<f64>::zeros(modes, p);
    let mut steps = Vec::with_capacity(p);

    for (k, generator) in generators.iter().enumerate() {
        if generator.nrows() != modes || generator.ncols() != modes {
            return Err(MfaError::shape_mismatch(
                "generator-size",
                "generator dimension does not match the mode count",
                modes,
                generator.nrows(),
            ));
        }
        let basis = diagonalize(generator, k)?;
        if basis.condition > opts.condition_limit {
            warn!(
                step = k,
                condition = basis.condition,
                "eigenbasis is ill-conditioned; step propagator may be inaccurate"
            );
        }
        propagator = basis.propagator(opts.tau) * propagator;
        let exponents = lyapunov_spectrum(&propagator, k)?;

        for (row, freq) in basis.frequencies().into_iter().enumerate() {
            omega[(row, k)] = freq;
        }
        for (row, exponent) in exponents.into_iter().rev().enumerate() {
            lyapunov[(row, k)] = exponent;
        }
        steps.push(StepDiagnostics {
            step: k,
            max_imag: basis.max_imag(),
            condition: basis.condition,
        });
    }

    debug!(steps = p, modes, "composed fluctuation propagator");
    Ok(FluctuationHistory {
        omega,
        lyapunov,
        steps,
        propagator,
    })
}

/// Frequency and Lyapunov histories of the fluctuations around `trajectory`.
///
/// `trajectory` holds one configuration per step of `schedule`, optionally
/// followed by the final state; the gauge frame is taken from its last entry.
pub fn evolve_fluctuations(
    trajectory: &Trajectory,
    interaction: &Interaction,
    tau: f64,
    schedule: &Schedule,
) -> Result<FluctuationHistory, MfaError> {
    let inputs = align_inputs(trajectory, interaction, schedule)?;
    let generators: Vec<_> = couplings_for(&inputs, interaction, schedule)?
        .iter()
        .map(assemble_generator)
        .collect();
    compose_generators(
        &generators,
        2 * interaction.dynamical(),
        &ComposeOpts {
            tau,
            condition_limit: DEFAULT_CONDITION_LIMIT,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(re: f64) -> Complex64 {
        Complex64::new(re, 0.0)
    }

    #[test]
    fn degenerate_eigenvalues_do_not_mix() {
        // Diagonal gap and coupling both at round-off level.
        let t = DMatrix::from_row_slice(
            3,
            3,
            &[
                c(1.0 + 1e-15),
                c(2e-15),
                c(0.3),
                c(0.0),
                c(1.0),
                c(0.5),
                c(0.0),
                c(0.0),
                c(-1.0),
            ],
        );
        let y = triangular_eigenvectors(&t);
        assert_eq!(y[(0, 1)], c(0.0));
        assert_eq!(y[(1, 1)], c(1.0));
        // A genuine gap is still solved for.
        assert!((y[(1, 2)] - c(-0.25)).norm() < 1e-15);
    }

    #[test]
    fn non_finite_propagator_is_rejected() {
        let mut propagator = DMatrix::<Complex64>::identity(2, 2);
        propagator[(0, 1)] = Complex64::new(f64::NAN, 0.0);
        let err = lyapunov_spectrum(&propagator, 3).unwrap_err();
        assert!(matches!(
            err,
            MfaError::Numerics(ref info) if info.code == "non-finite-propagator"
        ));
        assert_eq!(err.info().context.get("step").map(String::as_str), Some("3"));
    }
}
