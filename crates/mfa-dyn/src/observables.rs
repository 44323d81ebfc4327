use mfa_core::{Interaction, MfaError};

/// Classical Ising energy `-(h.z + z.J.z / 2)` of a product state.
pub fn expectation(z: &[f64], interaction: &Interaction) -> Result<f64, MfaError> {
    interaction.check_spins(z.len())?;
    let mut energy = 0.0;
    for (i, &zi) in z.iter().enumerate() {
        let half_field: f64 = z
            .iter()
            .enumerate()
            .map(|(j, &zj)| 0.5 * zj * interaction.coupling(j, i))
            .sum();
        energy += (interaction.bias(i) + half_field) * zi;
    }
    Ok(-energy)
}

/// Rounded bitstring: the sign of every z-component.
///
/// An exactly vanishing component maps to `0` and must be treated as
/// undecided by the caller.
pub fn solution(z: &[f64]) -> Vec<i8> {
    z.iter().map(|&value| sign(value)).collect()
}

pub(crate) fn sign(value: f64) -> i8 {
    if value > 0.0 {
        1
    } else if value < 0.0 {
        -1
    } else {
        0
    }
}

/// Indices whose bit is undecided.
pub fn undecided_bits(bits: &[i8]) -> Vec<usize> {
    bits.iter()
        .enumerate()
        .filter(|(_, &bit)| bit == 0)
        .map(|(idx, _)| idx)
        .collect()
}
