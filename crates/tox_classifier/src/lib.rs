//! ToxTrack classifier - deterministic mushroom edibility prediction
//!
//! Loads the labeled reference dataset, fits one categorical encoder per
//! attribute, trains a single entropy decision tree and answers prediction
//! requests against it.

pub mod cart;
pub mod config;
pub mod dataset;
pub mod deterministic;
pub mod encoder;
pub mod engine;
pub mod errors;
pub mod specimen;
pub mod trainer;

use std::path::Path;

pub use config::{ClassifierConfig, LoggingConfig, DEFAULT_DATASET};
pub use dataset::{Dataset, EncodedDataset, COLUMN_COUNT};
pub use deterministic::SplitTieBreaker;
pub use encoder::{ColumnEncoder, SpecimenEncoder, TargetEncoder, ValidOptions};
pub use engine::{predict_with, shared, try_shared, Engine, Prediction};
pub use errors::{ClassifierError, Result};
pub use specimen::{SpecimenBuilder, SpecimenRecord};
pub use trainer::{TrainingParams, TreeTrainer};

/// Train an engine directly from a dataset file using the provided parameters.
pub fn engine_from_csv(path: &Path, params: &TrainingParams) -> Result<Engine> {
    let dataset = Dataset::from_csv(path)?;
    Engine::from_dataset(&dataset, params)
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
