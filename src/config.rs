//! Prefetch Configuration
//!
//! Settings for a look-ahead cache and the worker pool draining it.
//! Loaded from YAML, with every field optional:
//!
//! ```yaml
//! capacity: 268435456
//! workers: 4
//! thread_name: lookahead
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cache::DEFAULT_CAPACITY;
use crate::error::{Error, Result};

/// Upper bound on worker threads
pub const MAX_WORKERS: usize = 256;

/// Configuration for a look-ahead cache and its worker pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrefetchConfig {
    /// Cache capacity, in weight units
    pub capacity: u64,

    /// Number of worker threads calling `wait_and_pop`
    pub workers: usize,

    /// Prefix for worker thread names
    pub thread_name: String,
}

impl Default for PrefetchConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            workers: 1,
            thread_name: "lookahead".to_string(),
        }
    }
}

impl PrefetchConfig {
    /// Parse a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Check every field is usable
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(Error::Config("capacity must be greater than 0".into()));
        }
        if self.workers == 0 || self.workers > MAX_WORKERS {
            return Err(Error::Config(format!(
                "workers must be between 1 and {}, got {}",
                MAX_WORKERS, self.workers
            )));
        }
        if self.thread_name.trim().is_empty() {
            return Err(Error::Config("thread_name must not be empty".into()));
        }
        Ok(())
    }

    /// Name of worker `index`
    pub fn worker_name(&self, index: usize) -> String {
        format!("{}-{}", self.thread_name, index)
    }
}

// =============================================================================
// Tests
// =============================================================================
