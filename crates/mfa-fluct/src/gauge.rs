use mfa_core::{ErrorInfo, MfaError, SpinConfig};
use mfa_dyn::{solution, undecided_bits};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Fixed per-spin frame used for every fluctuation step.
///
/// The frame is the rounded bitstring of the final mean-field state. Spins
/// whose final z-component vanishes get a zero entry and are reported by
/// [`GaugeFrame::undecided`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GaugeFrame {
    signs: Vec<i8>,
}

impl GaugeFrame {
    /// Derives the frame from the final configuration of a trajectory.
    ///
    /// Non-finite z-components are rejected rather than read as undecided.
    pub fn from_final_state(state: &SpinConfig) -> Result<Self, MfaError> {
        if state.is_empty() {
            return Err(MfaError::Shape(ErrorInfo::new(
                "empty-gauge",
                "cannot derive a gauge frame without dynamical spins",
            )));
        }
        let z = state.z_components();
        if let Some(spin) = z.iter().position(|value| !value.is_finite()) {
            return Err(MfaError::Numerics(
                ErrorInfo::new(
                    "non-finite-state",
                    "final configuration has a non-finite z-component",
                )
                .with_context("spin", spin)
                .with_context("z", z[spin]),
            ));
        }
        let signs = solution(&z);
        let undecided = undecided_bits(&signs);
        if !undecided.is_empty() {
            warn!(?undecided, "final z-components vanish; gauge entries set to zero");
        }
        Ok(Self { signs })
    }

    /// Frame entry for spin `i` as a float.
    pub fn value(&self, i: usize) -> f64 {
        f64::from(self.signs[i])
    }

    /// Raw sign pattern.
    pub fn signs(&self) -> &[i8] {
        &self.signs
    }

    /// Number of spins covered by the frame.
    pub fn len(&self) -> usize {
        self.signs.len()
    }

    /// Returns `true` for a frame without spins.
    pub fn is_empty(&self) -> bool {
        self.signs.is_empty()
    }

    /// Indices with an undecided (zero) frame entry.
    pub fn undecided(&self) -> Vec<usize> {
        undecided_bits(&self.signs)
    }
}
