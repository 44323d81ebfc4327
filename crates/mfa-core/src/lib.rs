#![deny(missing_docs)]
#![doc = "Core data types, structured errors and serialisation helpers shared by the \
mean-field AOA crates."]

pub mod errors;
pub mod rng;
/// Canonical JSON/YAML serialisation and content hashing.
#[path = "serde.rs"]
pub mod serde_io;
mod types;

pub use errors::{ErrorInfo, MfaError};
pub use rng::{derive_substream_seed, RngHandle};
pub use serde_io::{
    from_json_slice, from_yaml_slice, round_f64, stable_hash_string, to_canonical_json_bytes,
    to_yaml_string,
};
pub use types::{Interaction, Schedule, Spin, SpinConfig, Trajectory};
