//! Mean-field simulation of the alternating-operator ansatz.
//!
//! Spins are classical Bloch vectors. Each annealing step rotates every spin
//! about the z-axis by an angle set by its local field (problem step) and then
//! about the x-axis by a uniform angle (driver step).

pub mod field;
pub mod instances;
pub mod observables;
pub mod propagate;
pub mod rotation;
pub mod schedule;

pub use field::local_field;
pub use instances::{sk_instance, uniform_instance, InstanceSpec};
pub use observables::{expectation, solution, undecided_bits};
pub use propagate::{evolve, evolve_step, record_trajectory};
pub use rotation::{rotate, rotation, rotations, Rotation};
pub use schedule::{constant_schedule, linear_annealing, ScheduleSpec};
