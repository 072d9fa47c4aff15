//! Classifier configuration
//!
//! Layered the usual way: built-in defaults, then an optional TOML file,
//! then `TOXTRACK_*` environment variables. The CLI applies its own flags
//! last.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::errors::{ClassifierError, Result};
use crate::trainer::TrainingParams;

/// Default reference dataset file name
pub const DEFAULT_DATASET: &str = "agaricus_lepiota_data.csv";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Reference dataset (target + 22 attribute columns, no header)
    pub dataset_path: PathBuf,
    pub training: TrainingParams,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (`trace`, `debug`, `info`, `warn`, `error`)
    pub level: String,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from(DEFAULT_DATASET),
            training: TrainingParams::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl ClassifierConfig {
    /// Load configuration from a TOML file; missing keys keep their defaults
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        let content = std::fs::read_to_string(path).map_err(|e| {
            ClassifierError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ClassifierError::Config(format!("failed to parse config: {e}")))
    }

    /// Apply `TOXTRACK_*` overrides from the process environment
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    ///
    /// Recognized keys: `TOXTRACK_DATASET`, `TOXTRACK_SEED`,
    /// `TOXTRACK_LOG_LEVEL`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("TOXTRACK_DATASET") {
            self.dataset_path = PathBuf::from(path);
        }

        if let Some(seed) = lookup("TOXTRACK_SEED") {
            self.training.seed = seed.trim().parse().map_err(|_| {
                ClassifierError::Config(format!("TOXTRACK_SEED must be an unsigned integer, got '{seed}'"))
            })?;
        }

        if let Some(level) = lookup("TOXTRACK_LOG_LEVEL") {
            self.logging.level = level;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let training = &self.training;
        if training.max_depth == 0 {
            return Err(ClassifierError::Config("training.max_depth must be at least 1".to_string()));
        }
        if training.min_samples_split < 2 {
            return Err(ClassifierError::Config(
                "training.min_samples_split must be at least 2".to_string(),
            ));
        }
        if training.min_samples_leaf == 0 {
            return Err(ClassifierError::Config(
                "training.min_samples_leaf must be at least 1".to_string(),
            ));
        }

        const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
        if !LEVELS.contains(&self.logging.level.to_ascii_lowercase().as_str()) {
            return Err(ClassifierError::Config(format!(
                "unknown log level '{}'",
                self.logging.level
            )));
        }

        Ok(())
    }
}
