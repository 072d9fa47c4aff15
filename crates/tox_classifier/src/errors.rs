//! Error types for loading, training and prediction

use thiserror::Error;
use toxtrack_core::{Attribute, ModelError};

/// Errors returned by the classifier pipeline.
///
/// `DataLoad` is fatal at startup. `UnknownCategory` and `SchemaMismatch`
/// reject a single prediction request and leave the engine untouched.
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("dataset error: {0}")]
    DataLoad(String),

    #[error("unknown category for {attribute}: code '{code}' was not observed in training data")]
    UnknownCategory { attribute: Attribute, code: char },

    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("training error: {0}")]
    Training(String),

    #[error("inference error: {0}")]
    Inference(String),

    #[error(transparent)]
    Model(#[from] ModelError),
}

pub type Result<T> = std::result::Result<T, ClassifierError>;
