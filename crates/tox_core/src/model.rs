//! Packaged classification model
//!
//! A [`TreeModel`] bundles the trained tree with the information needed to
//! interpret it (feature count, class codes, training parameters) and a
//! [`ModelMetadata`] block describing the training run.
//!
//! The model hash covers the structural part only: two trainings on the same
//! data with the same seed hash identically even though `created_at` differs.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::errors::ModelError;
use crate::serde_canon::{canonical_hash_hex, to_canonical_json};
use crate::tree::{Leaf, Tree};

/// Current on-disk model format version
pub const MODEL_FORMAT_VERSION: u32 = 1;

/// Anything that maps an encoded feature vector to a leaf
pub trait Classify {
    fn classify(&self, features: &[u32]) -> Option<&Leaf>;
}

/// Details of the training run that produced a model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelMetadata {
    /// Crate version that trained the model
    pub trainer_version: String,
    /// Unix timestamp (seconds)
    pub created_at: i64,
    pub training_samples: usize,
    /// Fraction of training rows the tree classifies correctly
    pub training_accuracy: f64,
}

/// Decision tree classifier with its interpretation context
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TreeModel {
    pub version: u32,
    /// Length of the encoded feature vectors the tree expects
    pub feature_count: usize,
    /// Target codes, indexed by encoded class
    pub classes: Vec<char>,
    pub max_depth: usize,
    pub seed: u64,
    pub tree: Tree,
    pub metadata: ModelMetadata,
}

/// Borrowed view of the fields that identify a model
#[derive(Serialize)]
struct ModelFingerprint<'a> {
    version: u32,
    feature_count: usize,
    classes: &'a [char],
    max_depth: usize,
    seed: u64,
    tree: &'a Tree,
}

impl TreeModel {
    pub fn new(
        feature_count: usize,
        classes: Vec<char>,
        max_depth: usize,
        seed: u64,
        tree: Tree,
        metadata: ModelMetadata,
    ) -> Self {
        Self {
            version: MODEL_FORMAT_VERSION,
            feature_count,
            classes,
            max_depth,
            seed,
            tree,
            metadata,
        }
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.version != MODEL_FORMAT_VERSION {
            return Err(ModelError::ValidationFailed(format!(
                "unsupported model version: {}",
                self.version
            )));
        }

        if self.classes.is_empty() {
            return Err(ModelError::ValidationFailed("model has no classes".to_string()));
        }

        self.tree
            .validate(self.feature_count, self.classes.len())
            .map_err(ModelError::ValidationFailed)?;

        let depth = self.tree.depth();
        if depth > self.max_depth {
            return Err(ModelError::ValidationFailed(format!(
                "tree depth {depth} exceeds max_depth {}",
                self.max_depth
            )));
        }

        Ok(())
    }

    /// Class code predicted for an encoded feature vector
    pub fn predict_code(&self, features: &[u32]) -> Option<char> {
        let leaf = self.classify(features)?;
        self.classes.get(leaf.class as usize).copied()
    }

    /// Serialize to canonical JSON (sorted keys, no whitespace)
    pub fn to_canonical_json(&self) -> Result<String, ModelError> {
        Ok(to_canonical_json(self)?)
    }

    /// Hex BLAKE3 hash of the model structure, excluding run metadata
    pub fn hash_hex(&self) -> Result<String, ModelError> {
        let fingerprint = ModelFingerprint {
            version: self.version,
            feature_count: self.feature_count,
            classes: &self.classes,
            max_depth: self.max_depth,
            seed: self.seed,
            tree: &self.tree,
        };
        Ok(canonical_hash_hex(&fingerprint)?)
    }

    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<(), ModelError> {
        fs::write(path, self.to_canonical_json()?)?;
        Ok(())
    }

    /// Load and validate a model written by [`TreeModel::save_json`]
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self, ModelError> {
        let json = fs::read_to_string(path)?;
        let model: TreeModel = serde_json::from_str(&json)?;
        model.validate()?;
        tracing::debug!(
            nodes = model.tree.nodes.len(),
            depth = model.tree.depth(),
            "loaded tree model"
        );
        Ok(model)
    }
}

impl Classify for TreeModel {
    fn classify(&self, features: &[u32]) -> Option<&Leaf> {
        if features.len() != self.feature_count {
            return None;
        }
        self.tree.evaluate(features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Node;
    use tempfile::NamedTempFile;

    fn metadata(created_at: i64) -> ModelMetadata {
        ModelMetadata {
            trainer_version: "0.0.0".to_string(),
            created_at,
            training_samples: 12,
            training_accuracy: 1.0,
        }
    }

    fn test_model(created_at: i64) -> TreeModel {
        let tree = Tree::new(vec![
            Node::split(0, 1, 1, 2),
            Node::leaf(0, vec![7, 0]),
            Node::leaf(1, vec![0, 5]),
        ]);
        TreeModel::new(2, vec!['e', 'p'], 5, 42, tree, metadata(created_at))
    }

    #[test]
    fn test_predict_code() {
        let model = test_model(0);
        assert_eq!(model.predict_code(&[0, 9]), Some('e'));
        assert_eq!(model.predict_code(&[2, 0]), Some('p'));
        assert_eq!(model.predict_code(&[2]), None);
    }

    #[test]
    fn test_hash_ignores_run_metadata() {
        let a = test_model(1_700_000_000);
        let b = test_model(1_800_000_000);
        assert_ne!(a, b);
        assert_eq!(a.hash_hex().unwrap(), b.hash_hex().unwrap());
    }

    #[test]
    fn test_hash_changes_with_tree() {
        let a = test_model(0);
        let mut b = test_model(0);
        b.tree.nodes[0] = Node::split(1, 1, 1, 2);
        assert_ne!(a.hash_hex().unwrap(), b.hash_hex().unwrap());
    }

    #[test]
    fn test_save_load_json() {
        let model = test_model(1_700_000_000);
        let file = NamedTempFile::new().unwrap();

        model.save_json(file.path()).unwrap();
        let loaded = TreeModel::load_json(file.path()).unwrap();

        assert_eq!(model, loaded);
        assert_eq!(model.hash_hex().unwrap(), loaded.hash_hex().unwrap());
    }

    #[test]
    fn test_validation() {
        assert!(test_model(0).validate().is_ok());

        let mut wrong_version = test_model(0);
        wrong_version.version = 99;
        assert!(wrong_version.validate().is_err());

        let mut too_deep = test_model(0);
        too_deep.max_depth = 0;
        assert!(too_deep.validate().is_err());

        let mut no_classes = test_model(0);
        no_classes.classes.clear();
        assert!(no_classes.validate().is_err());
    }
}
