use mfa_core::{Interaction, MfaError, SpinConfig};

/// Effective classical field acting on every dynamical spin.
///
/// Entry `i` is the bias from the reference spin plus the coupling-weighted
/// sum of the other dynamical spins' z-components.
pub fn local_field(spins: &SpinConfig, interaction: &Interaction) -> Result<Vec<f64>, MfaError> {
    interaction.check_spins(spins.len())?;
    Ok(field_unchecked(spins, interaction))
}

pub(crate) fn field_unchecked(spins: &SpinConfig, interaction: &Interaction) -> Vec<f64> {
    let n = spins.len();
    (0..n)
        .map(|i| {
            let pairwise: f64 = spins
                .spins()
                .iter()
                .enumerate()
                .map(|(j, spin)| interaction.coupling(i, j) * spin.z)
                .sum();
            interaction.bias(i) + pairwise
        })
        .collect()
}
