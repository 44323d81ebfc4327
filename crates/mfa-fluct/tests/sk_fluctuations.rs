mod common;

use common::{assert_close, reference_trajectory};
use mfa_core::Trajectory;
use mfa_fluct::{analyze_fluctuations, evolve_fluctuations, FluctOpts, FluctuationReport};

const TAU: f64 = 0.5;

#[test]
fn first_step_frequencies_match_reference() {
    let (interaction, schedule, trajectory) = reference_trajectory();
    let history = evolve_fluctuations(&trajectory, &interaction, TAU, &schedule).expect("history");
    assert_eq!(history.modes(), 8);
    assert_eq!(history.len(), 10);

    let expected = [
        -0.9381873908489227,
        -0.9313192051319971,
        -0.923173112828672,
        -0.8743372813520159,
        0.8743372813520159,
        0.923173112828672,
        0.9313192051319971,
        0.9381873908489227,
    ];
    for (row, reference) in expected.iter().enumerate() {
        assert_close(history.omega[(row, 0)], *reference, 1e-9);
    }
    assert_close(history.lyapunov[(0, 0)], 0.015986836342965598, 1e-7);
}

#[test]
fn final_lyapunov_spectrum_matches_reference() {
    let (interaction, schedule, trajectory) = reference_trajectory();
    let history = evolve_fluctuations(&trajectory, &interaction, TAU, &schedule).expect("history");
    let spectrum = history.final_lyapunov().expect("non-empty history");

    let leading = [
        0.761706649564909,
        0.5514763381533387,
        0.061481085786432216,
        0.004867828269235728,
    ];
    for (idx, reference) in leading.iter().enumerate() {
        assert_close(spectrum[idx], *reference, 1e-7);
        assert_close(spectrum[7 - idx], -reference, 1e-7);
    }
    for pair in spectrum.windows(2) {
        assert!(pair[0] >= pair[1]);
    }
}

#[test]
fn lyapunov_spectra_obey_sum_rule_every_step() {
    let (interaction, schedule, trajectory) = reference_trajectory();
    let history = evolve_fluctuations(&trajectory, &interaction, TAU, &schedule).expect("history");
    for step in 0..history.len() {
        let column = history.lyapunov.column(step);
        let total: f64 = column.iter().sum();
        assert!(total.abs() < 1e-8, "step {step} sums to {total}");
        for mode in 0..4 {
            assert_close(column[mode], -column[7 - mode], 1e-8);
        }
    }
}

#[test]
fn report_flags_the_complex_step() {
    let (interaction, schedule, trajectory) = reference_trajectory();
    let opts = FluctOpts::with_tau(TAU);
    let report =
        analyze_fluctuations(&trajectory, &interaction, &schedule, &opts).expect("report");

    assert_eq!(report.gauge, vec![1, -1, -1, -1]);
    assert_eq!(report.modes, 8);
    assert_eq!(report.steps, 10);

    let diagnostics = &report.diagnostics;
    assert_eq!(diagnostics.unstable_steps, vec![5]);
    assert_close(diagnostics.steps[5].max_imag, 0.09688151779663048, 1e-7);
    assert_close(diagnostics.max_imag, 0.09688151779663048, 1e-7);
    for step in diagnostics.steps.iter().filter(|diag| diag.step != 5) {
        assert!(step.max_imag < 1e-8, "step {} has {}", step.step, step.max_imag);
    }
    assert!(diagnostics.max_condition < 10.0);
    assert!(diagnostics.ill_conditioned_steps.is_empty());
    assert!(diagnostics.sum_rule_residual < 1e-8);
    assert!(diagnostics.undecided_spins.is_empty());
    assert_eq!(diagnostics.hermiticity_residual, 0.0);
    assert_eq!(diagnostics.symmetry_residual, 0.0);
}

#[test]
fn report_is_deterministic_and_serializable() {
    let (interaction, schedule, trajectory) = reference_trajectory();
    let opts = FluctOpts::with_tau(TAU);
    let first = analyze_fluctuations(&trajectory, &interaction, &schedule, &opts).expect("first");
    let second = analyze_fluctuations(&trajectory, &interaction, &schedule, &opts).expect("second");
    assert_eq!(first.analysis_hash, second.analysis_hash);
    assert_eq!(first.analysis_hash.len(), 64);

    let json = serde_json::to_string(&first).expect("encode");
    let decoded: FluctuationReport = serde_json::from_str(&json).expect("decode");
    assert_eq!(decoded.analysis_hash, first.analysis_hash);
    assert_eq!(decoded.gauge, first.gauge);
    assert_eq!(decoded.diagnostics.unstable_steps, first.diagnostics.unstable_steps);

    let shorter = FluctOpts::with_tau(0.25);
    let other =
        analyze_fluctuations(&trajectory, &interaction, &schedule, &shorter).expect("other");
    assert_ne!(other.analysis_hash, first.analysis_hash);
}

#[test]
fn zero_time_step_keeps_fluctuations_bounded() {
    let (interaction, schedule, trajectory) = reference_trajectory();
    let history = evolve_fluctuations(&trajectory, &interaction, 0.0, &schedule).expect("history");
    assert!(history.lyapunov.iter().all(|value| value.abs() < 1e-10));
    let identity = nalgebra::DMatrix::<num_complex::Complex64>::identity(8, 8);
    assert!((&history.propagator - identity).norm() < 1e-10);
}

#[test]
fn trajectory_without_initial_state_uses_same_gauge() {
    let (interaction, schedule, trajectory) = reference_trajectory();
    let trimmed = Trajectory::new(trajectory.states()[1..].to_vec());
    let opts = FluctOpts::with_tau(TAU);
    let report = analyze_fluctuations(&trimmed, &interaction, &schedule, &opts).expect("report");
    assert_eq!(report.gauge, vec![1, -1, -1, -1]);
    assert_eq!(report.steps, 10);
    assert!(report.diagnostics.sum_rule_residual < 1e-8);
}

#[test]
fn rejects_invalid_options() {
    let (interaction, schedule, trajectory) = reference_trajectory();
    let mut opts = FluctOpts::with_tau(f64::NAN);
    assert!(analyze_fluctuations(&trajectory, &interaction, &schedule, &opts).is_err());
    opts.tau = TAU;
    opts.condition_limit = 0.5;
    assert!(analyze_fluctuations(&trajectory, &interaction, &schedule, &opts).is_err());
}
