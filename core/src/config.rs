//! Run configuration, loadable from a JSON file.
//!
//! Every field has a default, so a config file only needs the keys it
//! wants to change. Command-line flags override file values.

use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_ALIENS: usize = 4;
pub const DEFAULT_MAX_STEPS: u64 = 10_000;
pub const DEFAULT_DEPTH: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimConfig {
    /// Number of aliens to land on the map.
    pub aliens: usize,
    /// Maximum number of iterations before the run gives up.
    pub max_steps: u64,
    /// Grid size for generated maps.
    pub depth: usize,
    /// Master seed. A fresh seed is drawn when absent.
    pub seed: Option<u64>,
    /// Wall-clock budget for a run, in seconds.
    pub timeout_secs: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            aliens:       DEFAULT_ALIENS,
            max_steps:    DEFAULT_MAX_STEPS,
            depth:        DEFAULT_DEPTH,
            seed:         None,
            timeout_secs: None,
        }
    }
}

impl SimConfig {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {}: {e}", path.display()))?;
        Self::from_json(&content)
            .map_err(|e| anyhow::anyhow!("Invalid config {}: {e}", path.display()))
    }

    pub fn from_json(content: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Small, fully seeded config for tests.
    pub fn default_test() -> Self {
        Self {
            aliens:       2,
            max_steps:    100,
            depth:        4,
            seed:         Some(42),
            timeout_secs: None,
        }
    }
}
