//! Bridge configuration loading.
//!
//! Configuration is a small TOML file naming the debug adapter to wrap and,
//! optionally, where compiled cell dumps go:
//!
//! ```toml
//! dump_dir = "/tmp/celldap"
//!
//! [adapter]
//! command = "debugpy-adapter"
//! args = ["--log-stderr"]
//! ```
//!
//! Command-line arguments take precedence over file values.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{BridgeError, BridgeResult};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BridgeConfig {
    /// The wrapped debug adapter.
    #[serde(default)]
    pub adapter: AdapterConfig,

    /// Directory for compiled cell dumps; a temporary directory when unset.
    #[serde(default)]
    pub dump_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdapterConfig {
    #[serde(default)]
    pub command: Option<String>,

    #[serde(default)]
    pub args: Vec<String>,
}

impl BridgeConfig {
    pub fn from_toml_str(raw: &str) -> BridgeResult<Self> {
        toml::from_str(raw).map_err(|err| BridgeError::config(format!("invalid bridge config: {err}")))
    }

    pub fn load(path: &Path) -> BridgeResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }
}
