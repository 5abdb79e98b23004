//! Config schema - Configuration for the signature engine

use serde::{Deserialize, Serialize};

/// Main configuration for the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Schema version for forward compatibility
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Maximum number of hops walked when closing a chain's ancestry
    #[serde(default = "default_max_chain_depth")]
    pub max_chain_depth: usize,

    /// Maximum number of transporters on a multimodal document
    #[serde(default = "default_max_transporters")]
    pub max_transporters: usize,

    /// Remove transporters that never signed once the operation is signed
    #[serde(default = "default_drop_unsigned_transporters")]
    pub drop_unsigned_transporters_on_operation: bool,
}

fn default_schema_version() -> u32 {
    1
}

fn default_max_chain_depth() -> usize {
    16
}

fn default_max_transporters() -> usize {
    5
}

fn default_drop_unsigned_transporters() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            schema_version: default_schema_version(),
            max_chain_depth: default_max_chain_depth(),
            max_transporters: default_max_transporters(),
            drop_unsigned_transporters_on_operation: default_drop_unsigned_transporters(),
        }
    }
}
