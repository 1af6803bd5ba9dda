//! Environment information provider.
//!
//! Components that need the data directory, the current time or the platform
//! name receive an [`Environment`] instead of reaching for process globals.
//! Tests substitute a [`FixedEnvironment`] to get deterministic timestamps.

use super::paths;
use chrono::{DateTime, Utc};
use std::fmt;
use std::path::{Path, PathBuf};

/// Capabilities describing where and when the engine runs.
pub trait Environment: Send + Sync + fmt::Debug {
    /// Directory for service data files and trace output.
    fn data_dir(&self) -> &Path;

    /// Current wall-clock time.
    fn now(&self) -> DateTime<Utc>;

    /// Operating system name, reported in trace resources.
    fn platform(&self) -> &str {
        std::env::consts::OS
    }
}

/// The real process environment.
#[derive(Debug, Clone)]
pub struct SystemEnvironment {
    data_dir: PathBuf,
}

impl SystemEnvironment {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Uses the configured data directory, or the platform default.
    #[must_use]
    pub fn from_config(config: &crate::Config) -> Self {
        Self::new(config.data_dir.clone().unwrap_or_else(paths::default_data_dir))
    }
}

impl Environment for SystemEnvironment {
    fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// An environment frozen at a given instant.
#[derive(Debug, Clone)]
pub struct FixedEnvironment {
    data_dir: PathBuf,
    now: DateTime<Utc>,
    platform: String,
}

impl FixedEnvironment {
    pub fn new(data_dir: impl Into<PathBuf>, now: DateTime<Utc>) -> Self {
        Self {
            data_dir: data_dir.into(),
            now,
            platform: "test".to_string(),
        }
    }
}

impl Environment for FixedEnvironment {
    fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn platform(&self) -> &str {
        &self.platform
    }
}
