//! Linear stability of mean-field AOA trajectories.
//!
//! Small fluctuations around a recorded trajectory are described by
//! Bogoliubov coupling blocks `A` (Hermitian) and `B` (symmetric). Each step's
//! generator `tau_3 [[A, B], [B^dagger, A^*]]` is diagonalised, its propagator
//! is multiplied into a running product, and the finite-time Lyapunov spectrum
//! is read off the singular values of that product.

pub mod compose;
pub mod gauge;
pub mod generator;
pub mod report;

pub use compose::{
    compose_generators, diagonalize, evolve_fluctuations, lyapunov_spectrum, ComposeOpts,
    Eigenbasis, FluctuationHistory, StepDiagnostics, DEFAULT_CONDITION_LIMIT,
};
pub use gauge::GaugeFrame;
pub use generator::{
    align_inputs, assemble_generator, build_couplings, build_generators, pseudo_metric,
    step_couplings, CouplingPair, StepInputs,
};
pub use report::{
    analyze_fluctuations, sum_rule_residual, FluctDiagnostics, FluctOpts, FluctuationReport,
};
