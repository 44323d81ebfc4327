use mfa_core::{Interaction, MfaError, Schedule, Spin, SpinConfig, Trajectory};

fn triangle() -> Vec<Vec<f64>> {
    vec![
        vec![0.0, 1.0, 0.5],
        vec![1.0, 0.0, -0.25],
        vec![0.5, -0.25, 0.0],
    ]
}

#[test]
fn interaction_exposes_reference_spin() {
    let j = Interaction::from_rows(triangle()).expect("valid");
    assert_eq!(j.dim(), 3);
    assert_eq!(j.dynamical(), 2);
    assert_eq!(j.reference(), 2);
    assert_eq!(j.bias(0), 0.5);
    assert_eq!(j.bias(1), -0.25);
    assert_eq!(j.coupling(0, 1), 1.0);
}

#[test]
fn interaction_rejects_malformed_matrices() {
    let mut asym = triangle();
    asym[0][1] = 2.0;
    assert!(matches!(
        Interaction::from_rows(asym),
        Err(MfaError::Shape(info)) if info.code == "interaction-asymmetric"
    ));

    let mut diag = triangle();
    diag[1][1] = 1.0;
    assert!(Interaction::from_rows(diag).is_err());

    let ragged = vec![vec![0.0, 1.0], vec![1.0]];
    assert!(Interaction::from_rows(ragged).is_err());

    assert!(Interaction::from_rows(vec![vec![0.0]]).is_err());
}

#[test]
fn bias_flip_negates_reference_row_only() {
    let j = Interaction::from_rows(triangle()).expect("valid");
    let flipped = j.with_bias_flipped();
    assert_eq!(flipped.bias(0), -0.5);
    assert_eq!(flipped.get(0, 2), -0.5);
    assert_eq!(flipped.coupling(0, 1), 1.0);
}

#[test]
fn schedule_rejects_length_mismatch() {
    let err = Schedule::new(vec![0.1, 0.2], vec![0.1]).unwrap_err();
    assert_eq!(err.info().code, "schedule-length");
    let ok = Schedule::new(vec![0.1, 0.2], vec![0.3, 0.4]).expect("schedule");
    assert_eq!(ok.steps().collect::<Vec<_>>(), vec![(0.1, 0.3), (0.2, 0.4)]);
}

#[test]
fn schedule_yaml_is_validated() {
    let good: Schedule = serde_yaml::from_str("beta: [0.1]\ngamma: [0.2]\n").expect("yaml");
    assert_eq!(good.len(), 1);
    let bad: Result<Schedule, _> = serde_yaml::from_str("beta: [0.1, 0.2]\ngamma: [0.2]\n");
    assert!(bad.is_err());
}

#[test]
fn spin_config_serializes_as_rows() {
    let config = SpinConfig::new(vec![Spin::new(1.0, 0.0, 0.0), Spin::new(0.0, 0.6, 0.8)]);
    let json = serde_json::to_string(&config).expect("json");
    assert_eq!(json, "[[1.0,0.0,0.0],[0.0,0.6,0.8]]");
    let decoded: SpinConfig = serde_json::from_str(&json).expect("decode");
    assert_eq!(decoded, config);
    assert_eq!(decoded.z_components(), vec![0.0, 0.8]);
    assert!((decoded.norms()[1] - 1.0).abs() < 1e-15);
}

#[test]
fn trajectory_tracks_final_state() {
    let mut trajectory = Trajectory::default();
    assert!(trajectory.final_state().is_none());
    trajectory.push(SpinConfig::polarized_x(2));
    trajectory.push(SpinConfig::new(vec![Spin::new(0.0, 0.0, 1.0); 2]));
    assert_eq!(trajectory.len(), 2);
    assert_eq!(trajectory.final_state().expect("final").spin(1).z, 1.0);
}
