//! Batched 2x2 rotations acting on spin component pairs.

use nalgebra::{Matrix2, Vector2};

/// Rotation acting on a pair of spin components.
pub type Rotation = Matrix2<f64>;

/// Builds the rotation for angle `alpha`.
///
/// The pair `(u, v)` is mapped to `(u cos a + v sin a, -u sin a + v cos a)`.
pub fn rotation(alpha: f64) -> Rotation {
    let (s, c) = alpha.sin_cos();
    Matrix2::new(c, s, -s, c)
}

/// One rotation per angle, in input order.
pub fn rotations(alphas: &[f64]) -> Vec<Rotation> {
    alphas.iter().copied().map(rotation).collect()
}

/// Applies `rot` to the pair `(u, v)`.
pub fn rotate(rot: &Rotation, u: f64, v: f64) -> (f64, f64) {
    let out = rot * Vector2::new(u, v);
    (out[0], out[1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quarter_turn_maps_u_to_minus_v() {
        let rot = rotation(std::f64::consts::FRAC_PI_2);
        let (u, v) = rotate(&rot, 1.0, 0.0);
        assert!(u.abs() < 1e-15);
        assert!((v + 1.0).abs() < 1e-15);
    }

    #[test]
    fn rotations_compose_additively() {
        let rots = rotations(&[0.3, 0.4]);
        let combined = rots[1] * rots[0];
        assert!((combined - rotation(0.7)).norm() < 1e-14);
        assert!((rotation(0.0) - Rotation::identity()).norm() == 0.0);
    }
}
