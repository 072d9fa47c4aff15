//! Prediction engine
//!
//! [`Engine`] is the immutable bundle produced by the one-time load:
//! trained model, column encoders, target encoder, valid options and the
//! modal specimen. Predictions borrow it read-only, so one engine can serve
//! any number of callers.
//!
//! [`shared`] holds the process-wide instance. Concurrent first calls train
//! at most once; a failed load leaves the cell empty so the error surfaces
//! to every caller that tries.

use once_cell::sync::OnceCell;
use serde::Serialize;
use tracing::{debug, info};

use toxtrack_core::{Classify, Edibility, TreeModel};

use crate::config::ClassifierConfig;
use crate::dataset::Dataset;
use crate::encoder::{SpecimenEncoder, TargetEncoder, ValidOptions};
use crate::errors::{ClassifierError, Result};
use crate::specimen::SpecimenRecord;
use crate::trainer::{TrainingParams, TreeTrainer};

static SHARED: OnceCell<Engine> = OnceCell::new();

/// Outcome of a single prediction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub label: Edibility,
    /// Leaf class distribution, in target encoder order
    pub probabilities: Vec<(Edibility, f64)>,
}

impl Prediction {
    /// Probability assigned to the predicted label
    pub fn confidence(&self) -> f64 {
        self.probabilities
            .iter()
            .find(|(label, _)| *label == self.label)
            .map(|(_, p)| *p)
            .unwrap_or(0.0)
    }
}

#[derive(Debug, Clone)]
pub struct Engine {
    model: TreeModel,
    encoder: SpecimenEncoder,
    target_encoder: TargetEncoder,
    valid_options: ValidOptions,
    modal: SpecimenRecord,
}

impl Engine {
    /// Read the configured dataset, fit encoders and train the model
    pub fn load(config: &ClassifierConfig) -> Result<Self> {
        config.validate()?;

        info!("Loading dataset from: {}", config.dataset_path.display());
        let dataset = Dataset::from_csv(&config.dataset_path)?;

        Self::from_dataset(&dataset, &config.training)
    }

    /// Fit encoders and train on an already loaded dataset
    pub fn from_dataset(dataset: &Dataset, params: &TrainingParams) -> Result<Self> {
        let class_counts = dataset.class_counts();
        info!(
            samples = dataset.len(),
            edible = class_counts.get(&Edibility::Edible).copied().unwrap_or(0),
            poisonous = class_counts.get(&Edibility::Poisonous).copied().unwrap_or(0),
            "dataset loaded"
        );

        let (encoder, target_encoder) = dataset.fit_encoders();
        let encoded = dataset.encode(&encoder, &target_encoder)?;
        let valid_options = encoder.valid_options();
        let modal = dataset.modal_record();

        let model = TreeTrainer::new(params.clone()).train(&encoded, &target_encoder)?;
        info!(
            max_depth = params.max_depth,
            seed = params.seed,
            options = valid_options.total(),
            "classifier ready"
        );

        Ok(Self {
            model,
            encoder,
            target_encoder,
            valid_options,
            modal,
        })
    }

    /// Predicted label for one specimen
    pub fn predict(&self, specimen: &SpecimenRecord) -> Result<Edibility> {
        Ok(self.predict_detailed(specimen)?.label)
    }

    /// Predicted label plus the leaf class distribution
    pub fn predict_detailed(&self, specimen: &SpecimenRecord) -> Result<Prediction> {
        predict_with(&self.model, &self.encoder, &self.target_encoder, specimen)
    }

    pub fn model(&self) -> &TreeModel {
        &self.model
    }

    pub fn encoder(&self) -> &SpecimenEncoder {
        &self.encoder
    }

    pub fn target_encoder(&self) -> &TargetEncoder {
        &self.target_encoder
    }

    pub fn valid_options(&self) -> &ValidOptions {
        &self.valid_options
    }

    /// Most frequent code per column in the reference dataset
    pub fn modal_record(&self) -> &SpecimenRecord {
        &self.modal
    }
}

/// Encode, classify and decode one specimen.
///
/// The whole record is encoded before the classifier is consulted, so an
/// unknown category fails without touching the model.
pub fn predict_with<C: Classify>(
    classifier: &C,
    encoder: &SpecimenEncoder,
    target_encoder: &TargetEncoder,
    specimen: &SpecimenRecord,
) -> Result<Prediction> {
    let features = encoder.encode(specimen)?;

    let leaf = classifier
        .classify(&features)
        .ok_or_else(|| ClassifierError::Inference("classifier produced no leaf".to_string()))?;

    let label = target_encoder.decode(leaf.class)?;
    let probabilities = target_encoder
        .labels()
        .into_iter()
        .zip(leaf.probabilities())
        .collect();

    debug!(%specimen, %label, "prediction");
    Ok(Prediction {
        label,
        probabilities,
    })
}

/// Process-wide engine, loaded on first use.
///
/// Later calls return the same instance and ignore `config`.
pub fn shared(config: &ClassifierConfig) -> Result<&'static Engine> {
    SHARED.get_or_try_init(|| Engine::load(config))
}

/// The shared engine if it has already been loaded
pub fn try_shared() -> Option<&'static Engine> {
    SHARED.get()
}
