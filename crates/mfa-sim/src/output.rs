use std::error::Error;
use std::fs;
use std::path::Path;

use mfa_core::{to_canonical_json_bytes, to_yaml_string};
use serde::Serialize;

use crate::config::RunConfig;

/// Writes `value` as canonical JSON, creating parent directories as needed.
pub fn write_json<P: AsRef<Path>, T: Serialize>(path: P, value: &T) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = path.as_ref().parent() {
        fs::create_dir_all(parent)?;
    }
    let bytes = to_canonical_json_bytes(value)?;
    fs::write(path, bytes)?;
    Ok(())
}

/// Stores the resolved run configuration, defaults included, next to the artefacts.
pub fn persist_config(config: &RunConfig, out: &Path) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(out)?;
    fs::write(out.join("config.yaml"), to_yaml_string(config)?)?;
    Ok(())
}
