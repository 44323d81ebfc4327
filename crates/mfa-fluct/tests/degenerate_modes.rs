use mfa_core::SpinConfig;
use mfa_dyn::{constant_schedule, record_trajectory, uniform_instance};
use mfa_fluct::{build_generators, evolve_fluctuations};
use nalgebra::DMatrix;
use num_complex::Complex64;

// Scaling-and-squaring Taylor series, independent of any eigendecomposition.
fn expm(a: &DMatrix<Complex64>) -> DMatrix<Complex64> {
    let n = a.nrows();
    let mut scale = 1.0;
    let mut squarings = 0;
    while a.norm() * scale > 0.25 {
        scale *= 0.5;
        squarings += 1;
    }
    let scaled = a * Complex64::new(scale, 0.0);
    let mut term = DMatrix::<Complex64>::identity(n, n);
    let mut result = term.clone();
    for k in 1..=30 {
        term = &term * &scaled * Complex64::new(1.0 / k as f64, 0.0);
        result += &term;
    }
    for _ in 0..squarings {
        result = &result * &result;
    }
    result
}

#[test]
fn symmetric_spins_give_well_conditioned_bases() {
    let interaction = uniform_instance(4, 1.0).expect("instance");
    let schedule = constant_schedule(6, 0.1, 0.1).expect("schedule");
    let trajectory =
        record_trajectory(&SpinConfig::polarized_x(3), &interaction, &schedule).expect("record");
    let tau = 1.0;

    let history = evolve_fluctuations(&trajectory, &interaction, tau, &schedule).expect("history");
    for diag in &history.steps {
        assert!(
            diag.condition < 1e4,
            "step {} has condition {}",
            diag.step,
            diag.condition
        );
    }

    let generators = build_generators(&trajectory, &interaction, &schedule).expect("generators");
    let mut expected = DMatrix::<Complex64>::identity(6, 6);
    for generator in &generators {
        expected = expm(&(generator * Complex64::new(0.0, -tau))) * expected;
    }
    let error = (&history.propagator - &expected).norm();
    assert!(error < 1e-10, "propagator deviates by {error}");
}
