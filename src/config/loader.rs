//! Configuration loading with defaults

use std::path::Path;

use tracing::debug;

use crate::errors::{BsdError, Result};
use crate::fs;
use crate::schemas::EngineConfig;

const SUPPORTED_SCHEMA_VERSION: u32 = 1;

/// Load the engine configuration of a workspace, falling back to defaults.
///
/// If config.json exists, it is read and merged with defaults.
/// If it doesn't exist, the default configuration is returned.
/// Values the engine cannot honour are rejected with `ConfigError`.
pub fn load_config(root: &Path) -> Result<EngineConfig> {
    let config = fs::read_config(root)?;
    check_limits(&config)?;
    debug!(
        max_chain_depth = config.max_chain_depth,
        max_transporters = config.max_transporters,
        "engine configuration loaded"
    );
    Ok(config)
}

fn check_limits(config: &EngineConfig) -> Result<()> {
    if config.schema_version != SUPPORTED_SCHEMA_VERSION {
        return Err(BsdError::ConfigError(format!(
            "unsupported config schema_version {} (expected {})",
            config.schema_version, SUPPORTED_SCHEMA_VERSION
        )));
    }
    if config.max_chain_depth == 0 {
        return Err(BsdError::ConfigError(
            "max_chain_depth must be at least 1".to_string(),
        ));
    }
    // Transport stages are numbered with a u8
    if config.max_transporters == 0 || config.max_transporters > u8::MAX as usize {
        return Err(BsdError::ConfigError(format!(
            "max_transporters must be between 1 and {}, got {}",
            u8::MAX,
            config.max_transporters
        )));
    }
    Ok(())
}
