//! Error types for the core crate

use thiserror::Error;

use crate::serde_canon::CanonicalError;

/// Lookups against the static attribute catalog
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("unknown attribute name: {0}")]
    UnknownAttribute(String),

    #[error("unknown label code: {0}")]
    UnknownLabel(String),

    #[error("{attribute}: '{value}' is neither a code nor a label in the catalog")]
    UnknownValue { attribute: String, value: String },
}

/// Model packaging and structural validation
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("model validation failed: {0}")]
    ValidationFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("canonical serialization error: {0}")]
    Canonical(#[from] CanonicalError),
}
