//! Configuration surface
//!
//! Settings use PascalCase keys so files written by earlier releases load unchanged.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::AnimLockResult;

/// Persisted compensation settings and the learned lock database
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Master switch for animation lock compensation
    #[serde(rename = "EnableAnimLockComp")]
    pub enable_compensation: bool,
    /// Emit one diagnostic line per acknowledged action
    #[serde(rename = "EnableLogging")]
    pub enable_logging: bool,
    /// Compute corrections without ever writing the live timer
    #[serde(rename = "EnableDryRun")]
    pub enable_dry_run: bool,
    /// Last server-confirmed lock per action id (seconds)
    #[serde(rename = "AnimationLocks")]
    pub animation_locks: HashMap<u32, f32>,
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            enable_compensation: true,
            enable_logging: false,
            enable_dry_run: false,
            animation_locks: HashMap::new(),
        }
    }
}

impl Configuration {
    /// Load from a JSON settings file; a missing file yields the defaults
    pub fn load(path: impl AsRef<Path>) -> AnimLockResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Configuration::default());
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Write as pretty JSON, replacing the file atomically
    pub fn save(&self, path: impl AsRef<Path>) -> AnimLockResult<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}

/// Log output settings
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `animlock_runtime=debug`
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
            json: false,
        }
    }
}
