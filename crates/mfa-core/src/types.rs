use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, MfaError};

const SYMMETRY_TOLERANCE: f64 = 1e-12;

fn shape_error(code: &str, message: impl Into<String>) -> MfaError {
    MfaError::Shape(ErrorInfo::new(code, message))
}

/// Classical Bloch vector of a single dynamical spin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct Spin {
    /// Transverse component along the driver axis.
    pub x: f64,
    /// Second transverse component.
    pub y: f64,
    /// Component along the problem (computational) axis.
    pub z: f64,
}

impl Spin {
    /// Creates a spin from its three components.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Spin aligned with the driver field, the usual initial state.
    pub const fn along_x() -> Self {
        Self::new(1.0, 0.0, 0.0)
    }

    /// Euclidean length of the Bloch vector.
    pub fn norm(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

impl From<[f64; 3]> for Spin {
    fn from(value: [f64; 3]) -> Self {
        Self::new(value[0], value[1], value[2])
    }
}

impl From<Spin> for [f64; 3] {
    fn from(spin: Spin) -> Self {
        [spin.x, spin.y, spin.z]
    }
}

/// Configuration of all dynamical spins.
///
/// The last spin of the problem is gauge-fixed and never appears here; a
/// configuration for an `N`-spin problem therefore holds `N - 1` entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpinConfig {
    spins: Vec<Spin>,
}

impl SpinConfig {
    /// Wraps an explicit list of spins.
    pub fn new(spins: Vec<Spin>) -> Self {
        Self { spins }
    }

    /// All `count` spins pointing along +x.
    pub fn polarized_x(count: usize) -> Self {
        Self::new(vec![Spin::along_x(); count])
    }

    /// Number of dynamical spins.
    pub fn len(&self) -> usize {
        self.spins.len()
    }

    /// Returns `true` when no dynamical spin is present.
    pub fn is_empty(&self) -> bool {
        self.spins.is_empty()
    }

    /// Read-only view of the spins.
    pub fn spins(&self) -> &[Spin] {
        &self.spins
    }

    /// Returns the spin at `index`.
    pub fn spin(&self, index: usize) -> Spin {
        self.spins[index]
    }

    /// Collects the z-components in spin order.
    pub fn z_components(&self) -> Vec<f64> {
        self.spins.iter().map(|spin| spin.z).collect()
    }

    /// Bloch-vector lengths of every spin.
    pub fn norms(&self) -> Vec<f64> {
        self.spins.iter().map(Spin::norm).collect()
    }

    /// Rows of `[x, y, z]` suitable for tabular output.
    pub fn to_rows(&self) -> Vec<[f64; 3]> {
        self.spins.iter().copied().map(Into::into).collect()
    }
}

impl FromIterator<Spin> for SpinConfig {
    fn from_iter<I: IntoIterator<Item = Spin>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Symmetric interaction matrix `J` of an `N`-spin Ising problem.
///
/// Index `N - 1` is the gauge-fixed reference spin: its row holds the bias
/// acting on every dynamical spin, while the leading `(N - 1) x (N - 1)` block
/// couples dynamical spins with one another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")]
pub struct Interaction {
    dim: usize,
    entries: Vec<f64>,
}

impl Interaction {
    /// Validates and stores a dense row-major matrix.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, MfaError> {
        let dim = rows.len();
        if dim < 2 {
            return Err(MfaError::Shape(
                ErrorInfo::new(
                    "interaction-too-small",
                    "interaction matrix needs at least one dynamical and one reference spin",
                )
                .with_context("dim", dim),
            ));
        }
        let mut entries = Vec::with_capacity(dim * dim);
        for (row_idx, row) in rows.into_iter().enumerate() {
            if row.len() != dim {
                return Err(MfaError::Shape(
                    ErrorInfo::new("interaction-not-square", "interaction matrix must be square")
                        .with_context("row", row_idx)
                        .with_context("expected", dim)
                        .with_context("actual", row.len()),
                ));
            }
            entries.extend(row);
        }
        let interaction = Self { dim, entries };
        interaction.validate()?;
        Ok(interaction)
    }

    fn validate(&self) -> Result<(), MfaError> {
        for i in 0..self.dim {
            if self.get(i, i).abs() > SYMMETRY_TOLERANCE {
                return Err(MfaError::Shape(
                    ErrorInfo::new("interaction-diagonal", "interaction diagonal must vanish")
                        .with_context("index", i),
                ));
            }
            for j in (i + 1)..self.dim {
                if (self.get(i, j) - self.get(j, i)).abs() > SYMMETRY_TOLERANCE {
                    return Err(MfaError::Shape(
                        ErrorInfo::new("interaction-asymmetric", "interaction must be symmetric")
                            .with_context("row", i)
                            .with_context("col", j),
                    ));
                }
            }
        }
        if self.entries.iter().any(|value| !value.is_finite()) {
            return Err(shape_error(
                "interaction-non-finite",
                "interaction entries must be finite",
            ));
        }
        Ok(())
    }

    /// Total number of spins `N`, reference spin included.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of dynamical spins `N - 1`.
    pub fn dynamical(&self) -> usize {
        self.dim - 1
    }

    /// Index of the gauge-fixed reference spin.
    pub fn reference(&self) -> usize {
        self.dim - 1
    }

    /// Raw matrix entry `J[i, j]`.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.entries[i * self.dim + j]
    }

    /// Bias on dynamical spin `i`, i.e. its coupling to the reference spin.
    pub fn bias(&self, i: usize) -> f64 {
        self.get(self.reference(), i)
    }

    /// Coupling between dynamical spins `i` and `j`.
    pub fn coupling(&self, i: usize, j: usize) -> f64 {
        self.get(i, j)
    }

    /// Copy with the reference row and column negated.
    ///
    /// Together with a global flip of all dynamical spins this leaves the
    /// energy expectation unchanged.
    pub fn with_bias_flipped(&self) -> Self {
        let mut flipped = self.clone();
        let reference = self.reference();
        for i in 0..self.dim {
            flipped.entries[reference * self.dim + i] *= -1.0;
            flipped.entries[i * self.dim + reference] *= -1.0;
        }
        flipped
    }

    /// Dense rows of the matrix.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.entries
            .chunks(self.dim)
            .map(|row| row.to_vec())
            .collect()
    }

    /// Fails unless `spins` has exactly one entry per dynamical spin.
    pub fn check_spins(&self, spins: usize) -> Result<(), MfaError> {
        if spins != self.dynamical() {
            return Err(MfaError::shape_mismatch(
                "spin-count",
                "spin configuration does not match the interaction's dynamical block",
                self.dynamical(),
                spins,
            ));
        }
        Ok(())
    }
}

impl TryFrom<Vec<Vec<f64>>> for Interaction {
    type Error = MfaError;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self, Self::Error> {
        Self::from_rows(rows)
    }
}

impl From<Interaction> for Vec<Vec<f64>> {
    fn from(interaction: Interaction) -> Self {
        interaction.to_rows()
    }
}

#[derive(Deserialize)]
struct RawSchedule {
    beta: Vec<f64>,
    gamma: Vec<f64>,
}

/// Driver angles `beta` and problem coefficients `gamma`, one pair per step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSchedule")]
pub struct Schedule {
    beta: Vec<f64>,
    gamma: Vec<f64>,
}

impl Schedule {
    /// Builds a schedule, rejecting sequences of different length.
    pub fn new(beta: Vec<f64>, gamma: Vec<f64>) -> Result<Self, MfaError> {
        if beta.len() != gamma.len() {
            return Err(MfaError::shape_mismatch(
                "schedule-length",
                "beta and gamma must have the same length",
                beta.len(),
                gamma.len(),
            ));
        }
        Ok(Self { beta, gamma })
    }

    /// Schedule without any step.
    pub fn empty() -> Self {
        Self {
            beta: Vec::new(),
            gamma: Vec::new(),
        }
    }

    /// Number of steps `p`.
    pub fn len(&self) -> usize {
        self.beta.len()
    }

    /// Returns `true` for the empty schedule.
    pub fn is_empty(&self) -> bool {
        self.beta.is_empty()
    }

    /// Driver angles.
    pub fn beta(&self) -> &[f64] {
        &self.beta
    }

    /// Problem coefficients.
    pub fn gamma(&self) -> &[f64] {
        &self.gamma
    }

    /// Iterates `(beta, gamma)` pairs in step order.
    pub fn steps(&self) -> impl ExactSizeIterator<Item = (f64, f64)> + '_ {
        self.beta
            .iter()
            .zip(self.gamma.iter())
            .map(|(&beta, &gamma)| (beta, gamma))
    }
}

impl TryFrom<RawSchedule> for Schedule {
    type Error = MfaError;

    fn try_from(raw: RawSchedule) -> Result<Self, Self::Error> {
        Self::new(raw.beta, raw.gamma)
    }
}

/// Ordered sequence of spin configurations indexed by annealing step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Trajectory {
    states: Vec<SpinConfig>,
}

impl Trajectory {
    /// Wraps an explicit list of configurations.
    pub fn new(states: Vec<SpinConfig>) -> Self {
        Self { states }
    }

    /// Appends a configuration.
    pub fn push(&mut self, state: SpinConfig) {
        self.states.push(state);
    }

    /// Number of recorded configurations.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Returns `true` if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Read-only view of the configurations.
    pub fn states(&self) -> &[SpinConfig] {
        &self.states
    }

    /// Configuration at step `k`.
    pub fn state(&self, k: usize) -> &SpinConfig {
        &self.states[k]
    }

    /// Last recorded configuration.
    pub fn final_state(&self) -> Option<&SpinConfig> {
        self.states.last()
    }
}
