//! Decision tree structure and traversal
//!
//! Nodes are stored in a flat vector with the root at index 0. Features are
//! dense column indices produced by the column encoders, and an internal node
//! sends a sample left when `features[feature] <= threshold`.

use serde::{Deserialize, Serialize};

/// Terminal node: the predicted class plus the training class counts that
/// reached it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Leaf {
    /// Encoded class index
    pub class: u32,
    /// Training samples per encoded class
    pub counts: Vec<u64>,
}

impl Leaf {
    pub fn new(class: u32, counts: Vec<u64>) -> Self {
        Self { class, counts }
    }

    /// Number of training samples that reached this leaf
    pub fn support(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Class probabilities from the leaf counts, indexed by encoded class
    pub fn probabilities(&self) -> Vec<f64> {
        let total = self.support();
        if total == 0 {
            return vec![0.0; self.counts.len()];
        }
        self.counts
            .iter()
            .map(|&c| c as f64 / total as f64)
            .collect()
    }
}

/// A tree node
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Node {
    Split {
        feature: u32,
        threshold: u32,
        left: u32,
        right: u32,
    },
    Leaf(Leaf),
}

impl Node {
    pub fn split(feature: u32, threshold: u32, left: u32, right: u32) -> Self {
        Node::Split {
            feature,
            threshold,
            left,
            right,
        }
    }

    pub fn leaf(class: u32, counts: Vec<u64>) -> Self {
        Node::Leaf(Leaf::new(class, counts))
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }
}

/// A single classification tree
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Tree {
    /// Tree nodes (node 0 is the root)
    pub nodes: Vec<Node>,
}

impl Tree {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Walk from the root to the leaf selected by `features`.
    ///
    /// Returns `None` if the tree is empty or malformed (child index out of
    /// range, feature index past the end of `features`).
    pub fn evaluate(&self, features: &[u32]) -> Option<&Leaf> {
        let mut idx = 0usize;
        // every step moves strictly deeper, so a valid walk visits at most len nodes
        for _ in 0..self.nodes.len() {
            match self.nodes.get(idx)? {
                Node::Leaf(leaf) => return Some(leaf),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let value = *features.get(*feature as usize)?;
                    idx = if value <= *threshold {
                        *left as usize
                    } else {
                        *right as usize
                    };
                }
            }
        }
        None
    }

    pub fn root(&self) -> Option<&Node> {
        self.nodes.first()
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Length of the longest root-to-leaf path, counted in edges
    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], idx: usize) -> usize {
            match nodes.get(idx) {
                Some(Node::Split { left, right, .. }) => {
                    1 + walk(nodes, *left as usize).max(walk(nodes, *right as usize))
                }
                _ => 0,
            }
        }
        if self.nodes.is_empty() {
            0
        } else {
            walk(&self.nodes, 0)
        }
    }

    /// Validate tree structure against the expected feature and class counts.
    ///
    /// Children must point forward in the node vector, which rules out cycles.
    pub fn validate(&self, feature_count: usize, class_count: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }

        for (i, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Split {
                    feature,
                    left,
                    right,
                    ..
                } => {
                    if *feature as usize >= feature_count {
                        return Err(format!(
                            "node {i}: feature {feature} out of range ({feature_count} features)"
                        ));
                    }
                    for child in [*left as usize, *right as usize] {
                        if child <= i || child >= self.nodes.len() {
                            return Err(format!("node {i}: invalid child index {child}"));
                        }
                    }
                }
                Node::Leaf(leaf) => {
                    if leaf.counts.len() != class_count {
                        return Err(format!(
                            "node {i}: {} class counts, expected {class_count}",
                            leaf.counts.len()
                        ));
                    }
                    if leaf.class as usize >= class_count {
                        return Err(format!("node {i}: class {} out of range", leaf.class));
                    }
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump() -> Tree {
        Tree::new(vec![
            Node::split(1, 2, 1, 2),
            Node::leaf(0, vec![9, 1]),
            Node::leaf(1, vec![0, 5]),
        ])
    }

    #[test]
    fn test_evaluate_goes_left_on_equal() {
        let tree = stump();
        assert_eq!(tree.evaluate(&[0, 2]).map(|l| l.class), Some(0));
        assert_eq!(tree.evaluate(&[0, 3]).map(|l| l.class), Some(1));
    }

    #[test]
    fn test_evaluate_rejects_short_vectors() {
        let tree = stump();
        assert!(tree.evaluate(&[0]).is_none());
        assert!(Tree::default().evaluate(&[1, 2]).is_none());
    }

    #[test]
    fn test_cyclic_tree_terminates() {
        let tree = Tree::new(vec![Node::split(0, 0, 0, 0)]);
        assert!(tree.evaluate(&[0]).is_none());
        assert!(tree.validate(1, 2).is_err());
    }

    #[test]
    fn test_leaf_probabilities() {
        let leaf = Leaf::new(0, vec![9, 1]);
        assert_eq!(leaf.support(), 10);
        assert_eq!(leaf.probabilities(), vec![0.9, 0.1]);
        assert_eq!(Leaf::new(0, vec![0, 0]).probabilities(), vec![0.0, 0.0]);
    }

    #[test]
    fn test_shape() {
        let tree = stump();
        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.leaf_count(), 2);
        assert!(tree.validate(2, 2).is_ok());
        assert!(tree.validate(1, 2).is_err());
        assert!(tree.validate(2, 3).is_err());
    }

    #[test]
    fn test_serialized_form_is_tagged() {
        let json = serde_json::to_string(&Node::leaf(1, vec![0, 3])).unwrap();
        assert_eq!(json, r#"{"kind":"leaf","class":1,"counts":[0,3]}"#);
    }
}
