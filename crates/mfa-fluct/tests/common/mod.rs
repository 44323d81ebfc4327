#![allow(dead_code)]

use mfa_core::{Interaction, Schedule, SpinConfig, Trajectory};
use mfa_dyn::{linear_annealing, record_trajectory};

// Couplings of the N = 5 reference Sherrington–Kirkpatrick instance.
pub fn reference_interaction() -> Interaction {
    let upper = [
        [0.0, -0.12793573348166293, -0.21670411503453044, -1.1866001328940943, -0.0037049988892551987],
        [0.0, 0.0, 0.14105236137693697, 0.1882996047044451, -0.4765521402619942],
        [0.0, 0.0, 0.0, 0.25097277081028896, -0.5838590431585854],
        [0.0, 0.0, 0.0, 0.0, -0.3056466236010491],
        [0.0, 0.0, 0.0, 0.0, 0.0],
    ];
    let rows = (0..5)
        .map(|i| {
            (0..5)
                .map(|j| if i <= j { upper[i][j] } else { upper[j][i] })
                .collect()
        })
        .collect();
    Interaction::from_rows(rows).expect("reference instance")
}

pub fn reference_schedule() -> Schedule {
    linear_annealing(10, 0.5, Some(0.5 / 40.0)).expect("schedule")
}

pub fn reference_trajectory() -> (Interaction, Schedule, Trajectory) {
    let interaction = reference_interaction();
    let schedule = reference_schedule();
    let trajectory =
        record_trajectory(&SpinConfig::polarized_x(4), &interaction, &schedule).expect("record");
    (interaction, schedule, trajectory)
}

pub fn assert_close(actual: f64, expected: f64, tol: f64) {
    assert!(
        (actual - expected).abs() < tol,
        "{actual} differs from {expected} by more than {tol}"
    );
}
