//! ToxTrack core types
//!
//! Static, type-checked pieces shared by the trainer and the prediction
//! boundary:
//!
//! - `catalog`: the 22 mushroom attributes, their codes and display labels
//! - `label`: the edibility label predicted for a specimen
//! - `tree`: decision tree nodes and traversal over encoded features
//! - `model`: packaged tree with canonical JSON and BLAKE3 hashing
//! - `errors`: error types for catalog lookups and model handling

pub mod catalog;
pub mod errors;
pub mod label;
pub mod model;
pub mod serde_canon;
pub mod tree;

pub use catalog::{Attribute, AttributeGroup, ATTRIBUTE_COUNT};
pub use errors::{CatalogError, ModelError};
pub use label::Edibility;
pub use model::{Classify, ModelMetadata, TreeModel, MODEL_FORMAT_VERSION};
pub use tree::{Leaf, Node, Tree};
