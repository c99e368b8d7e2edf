//! Timer configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;

/// All jobs from one manager share a single logical group in the engine.
pub const DEFAULT_GROUP: &str = "taskloom-task";

/// Configuration for a timer manager instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerConfig {
    /// Logical group name shared by every job submitted by this manager.
    pub group: String,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            group: DEFAULT_GROUP.to_string(),
        }
    }
}

impl TimerConfig {
    /// Parse configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}
