//! Decision tree trainer
//!
//! Fits one entropy tree on the encoded dataset and packages it with the
//! target codes and run metadata.

use serde::{Deserialize, Serialize};
use tracing::info;

use toxtrack_core::{Classify, ModelMetadata, TreeModel};

use crate::cart::{CartBuilder, TreeConfig};
use crate::dataset::EncodedDataset;
use crate::encoder::TargetEncoder;
use crate::errors::{ClassifierError, Result};

/// Training parameters. The defaults are the production configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingParams {
    pub max_depth: usize,
    pub seed: u64,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

impl Default for TrainingParams {
    fn default() -> Self {
        Self {
            max_depth: 5,
            seed: 42,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

impl TrainingParams {
    fn tree_config(&self) -> TreeConfig {
        TreeConfig {
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            min_samples_leaf: self.min_samples_leaf,
            seed: self.seed,
        }
    }
}

pub struct TreeTrainer {
    params: TrainingParams,
}

impl TreeTrainer {
    pub fn new(params: TrainingParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &TrainingParams {
        &self.params
    }

    /// Fit a tree on `data`, whose targets were encoded by `target_encoder`
    pub fn train(&self, data: &EncodedDataset, target_encoder: &TargetEncoder) -> Result<TreeModel> {
        if data.is_empty() {
            return Err(ClassifierError::Training("no training samples".to_string()));
        }
        if data.features.len() != data.targets.len() {
            return Err(ClassifierError::Training(format!(
                "{} feature rows but {} targets",
                data.features.len(),
                data.targets.len()
            )));
        }
        if let Some(row) = data.features.iter().position(|f| f.len() != data.feature_count) {
            return Err(ClassifierError::Training(format!(
                "row {row} has {} features, expected {}",
                data.features[row].len(),
                data.feature_count
            )));
        }
        if data.class_count != target_encoder.len() {
            return Err(ClassifierError::Training(format!(
                "dataset has {} classes but target encoder has {}",
                data.class_count,
                target_encoder.len()
            )));
        }
        if data.targets.iter().any(|&t| t as usize >= data.class_count) {
            return Err(ClassifierError::Training("target index out of range".to_string()));
        }

        let builder = CartBuilder::new(
            &data.features,
            &data.targets,
            data.class_count,
            self.params.tree_config(),
        );
        let tree = builder.build();

        let metadata = ModelMetadata {
            trainer_version: crate::VERSION.to_string(),
            created_at: chrono::Utc::now().timestamp(),
            training_samples: data.len(),
            training_accuracy: 0.0,
        };
        let mut model = TreeModel::new(
            data.feature_count,
            target_encoder.codes().to_vec(),
            self.params.max_depth,
            self.params.seed,
            tree,
            metadata,
        );
        model.metadata.training_accuracy = accuracy(&model, data);
        model.validate()?;

        info!(
            nodes = model.tree.nodes.len(),
            leaves = model.tree.leaf_count(),
            depth = model.tree.depth(),
            accuracy = model.metadata.training_accuracy,
            "decision tree trained"
        );

        Ok(model)
    }
}

/// Fraction of rows whose leaf class matches the target
pub fn accuracy<C: Classify>(classifier: &C, data: &EncodedDataset) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let correct = data
        .features
        .iter()
        .zip(&data.targets)
        .filter(|&(features, &target)| {
            classifier
                .classify(features)
                .is_some_and(|leaf| leaf.class == target)
        })
        .count();
    correct as f64 / data.len() as f64
}
