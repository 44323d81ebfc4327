//! Problem-instance construction.

use mfa_core::{ErrorInfo, Interaction, MfaError, RngHandle};
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

fn instance_error(code: &str, message: impl Into<String>) -> MfaError {
    MfaError::Config(ErrorInfo::new(code, message))
}

/// Declarative instance description used by run configurations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum InstanceSpec {
    /// Sherrington–Kirkpatrick spin glass with Gaussian couplings.
    Sk {
        /// Total number of spins, reference spin included.
        n: usize,
        /// Master seed for the coupling draw.
        seed: u64,
    },
    /// Fully connected instance with identical couplings.
    Uniform {
        /// Total number of spins, reference spin included.
        n: usize,
        /// Value of every off-diagonal entry.
        #[serde(default = "default_coupling")]
        coupling: f64,
    },
    /// Explicit dense matrix.
    Explicit {
        /// Interaction matrix, reference spin last.
        matrix: Interaction,
    },
}

fn default_coupling() -> f64 {
    1.0
}

impl InstanceSpec {
    /// Materialises the described interaction matrix.
    pub fn build(&self) -> Result<Interaction, MfaError> {
        match self {
            InstanceSpec::Sk { n, seed } => sk_instance(*n, *seed),
            InstanceSpec::Uniform { n, coupling } => uniform_instance(*n, *coupling),
            InstanceSpec::Explicit { matrix } => Ok(matrix.clone()),
        }
    }
}

fn ensure_size(n: usize) -> Result<(), MfaError> {
    if n < 2 {
        return Err(MfaError::Config(
            ErrorInfo::new("instance-too-small", "an instance needs at least two spins")
                .with_context("n", n),
        ));
    }
    Ok(())
}

/// Sherrington–Kirkpatrick couplings `J_ij ~ N(0, 1) / sqrt(n)` for `i < j`.
///
/// Entries are drawn row by row from substream 0 of `seed` and mirrored into
/// the lower triangle.
pub fn sk_instance(n: usize, seed: u64) -> Result<Interaction, MfaError> {
    ensure_size(n)?;
    let mut rng = RngHandle::substream(seed, 0);
    let scale = (n as f64).sqrt();
    let mut rows = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let draw: f64 = rng.sample(StandardNormal);
            rows[i][j] = draw / scale;
            rows[j][i] = draw / scale;
        }
    }
    Interaction::from_rows(rows)
}

/// Every pair, reference spin included, coupled with `coupling`.
pub fn uniform_instance(n: usize, coupling: f64) -> Result<Interaction, MfaError> {
    ensure_size(n)?;
    if !coupling.is_finite() {
        return Err(instance_error("non-finite-coupling", "coupling must be finite"));
    }
    let rows = (0..n)
        .map(|i| {
            (0..n)
                .map(|j| if i == j { 0.0 } else { coupling })
                .collect()
        })
        .collect();
    Interaction::from_rows(rows)
}
