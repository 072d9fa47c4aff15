//! CART classification tree builder
//!
//! Exact-greedy construction over encoded categorical features. Each
//! internal node splits on `feature <= threshold`, choosing the candidate
//! with the largest information gain (entropy, base 2). Thresholds are the
//! distinct encoded values present at the node.

use std::collections::BTreeMap;
use tracing::debug;

use toxtrack_core::{Node, Tree};

use crate::deterministic::SplitTieBreaker;

/// Gains closer than this are treated as equal
const GAIN_EPSILON: f64 = 1e-12;

/// Growth limits for a single tree
#[derive(Clone, Debug)]
pub struct TreeConfig {
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub seed: u64,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: 5,
            min_samples_split: 2,
            min_samples_leaf: 1,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone)]
struct SplitCandidate {
    feature: u32,
    threshold: u32,
    gain: f64,
    tie_breaker: SplitTieBreaker,
}

impl SplitCandidate {
    fn beats(&self, other: &SplitCandidate) -> bool {
        self.gain > other.gain + GAIN_EPSILON
            || ((self.gain - other.gain).abs() <= GAIN_EPSILON && self.tie_breaker < other.tie_breaker)
    }
}

/// Shannon entropy (bits) of a class distribution
pub fn entropy(counts: &[u64], total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let n = total as f64;
    counts
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f64 / n;
            -p * p.log2()
        })
        .sum()
}

/// Most frequent class; equal counts go to the lowest class index
pub fn majority_class(counts: &[u64]) -> u32 {
    let mut best = 0usize;
    for (class, &count) in counts.iter().enumerate().skip(1) {
        if count > counts[best] {
            best = class;
        }
    }
    best as u32
}

/// Builds a classification tree from encoded rows
pub struct CartBuilder<'a> {
    config: TreeConfig,
    features: &'a [Vec<u32>],
    targets: &'a [u32],
    class_count: usize,
    feature_count: usize,
}

impl<'a> CartBuilder<'a> {
    /// `features` and `targets` must have the same length and every target
    /// must be below `class_count`.
    pub fn new(
        features: &'a [Vec<u32>],
        targets: &'a [u32],
        class_count: usize,
        config: TreeConfig,
    ) -> Self {
        debug_assert_eq!(features.len(), targets.len());

        let feature_count = features.first().map(Vec::len).unwrap_or(0);

        Self {
            config,
            features,
            targets,
            class_count,
            feature_count,
        }
    }

    pub fn build(&self) -> Tree {
        let mut nodes = Vec::new();
        let indices: Vec<usize> = (0..self.targets.len()).collect();

        self.build_node(&indices, 0, &mut nodes, 0);

        Tree::new(nodes)
    }

    fn build_node(&self, indices: &[usize], depth: usize, nodes: &mut Vec<Node>, node_id: u64) -> u32 {
        let current_idx = nodes.len() as u32;
        let counts = self.class_counts(indices);
        let pure = counts.iter().filter(|&&c| c > 0).count() <= 1;

        if depth >= self.config.max_depth || indices.len() < self.config.min_samples_split || pure {
            nodes.push(Node::leaf(majority_class(&counts), counts));
            return current_idx;
        }

        // zero-gain splits are still taken; deeper splits may separate the classes
        let Some(split) = self.find_best_split(indices, &counts, node_id) else {
            nodes.push(Node::leaf(majority_class(&counts), counts));
            return current_idx;
        };

        debug!(
            node_id,
            depth,
            feature = split.feature,
            threshold = split.threshold,
            gain = split.gain,
            samples = indices.len(),
            "split selected"
        );

        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .copied()
            .partition(|&i| self.features[i][split.feature as usize] <= split.threshold);

        // reserve the slot; children are patched in after recursion
        nodes.push(Node::split(split.feature, split.threshold, 0, 0));

        let left_idx = self.build_node(&left_indices, depth + 1, nodes, node_id * 2 + 1);
        let right_idx = self.build_node(&right_indices, depth + 1, nodes, node_id * 2 + 2);

        if let Node::Split { left, right, .. } = &mut nodes[current_idx as usize] {
            *left = left_idx;
            *right = right_idx;
        }

        current_idx
    }

    fn class_counts(&self, indices: &[usize]) -> Vec<u64> {
        let mut counts = vec![0u64; self.class_count];
        for &i in indices {
            counts[self.targets[i] as usize] += 1;
        }
        counts
    }

    fn find_best_split(&self, indices: &[usize], counts: &[u64], node_id: u64) -> Option<SplitCandidate> {
        let total = indices.len() as u64;
        let n = total as f64;
        let parent_entropy = entropy(counts, total);
        let min_leaf = self.config.min_samples_leaf as u64;
        let mut best: Option<SplitCandidate> = None;

        for feature in 0..self.feature_count {
            // value -> class counts, ordered by value
            let mut histogram: BTreeMap<u32, Vec<u64>> = BTreeMap::new();
            for &i in indices {
                let value = self.features[i][feature];
                let slot = histogram
                    .entry(value)
                    .or_insert_with(|| vec![0; self.class_count]);
                slot[self.targets[i] as usize] += 1;
            }

            let mut left = vec![0u64; self.class_count];
            let last = histogram.len().saturating_sub(1);
            for (&value, value_counts) in histogram.iter().take(last) {
                for (acc, &c) in left.iter_mut().zip(value_counts) {
                    *acc += c;
                }
                let left_total: u64 = left.iter().sum();
                let right_total = total - left_total;
                if left_total < min_leaf || right_total < min_leaf {
                    continue;
                }

                let right: Vec<u64> = counts.iter().zip(&left).map(|(&c, &l)| c - l).collect();
                let gain = parent_entropy
                    - (left_total as f64 / n) * entropy(&left, left_total)
                    - (right_total as f64 / n) * entropy(&right, right_total);

                let candidate = SplitCandidate {
                    feature: feature as u32,
                    threshold: value,
                    gain,
                    tie_breaker: SplitTieBreaker::new(self.config.seed, feature as u32, value, node_id),
                };

                best = match best {
                    Some(current) if !candidate.beats(&current) => Some(current),
                    _ => Some(candidate),
                };
            }
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use toxtrack_core::Leaf;

    #[test]
    fn test_entropy() {
        assert_eq!(entropy(&[5, 5], 10), 1.0);
        assert_eq!(entropy(&[10, 0], 10), 0.0);
        assert_eq!(entropy(&[0, 0], 0), 0.0);
        assert!((entropy(&[1, 3], 4) - 0.811_278_124_459_132_8).abs() < 1e-12);
    }

    #[test]
    fn test_majority_class_ties_go_low() {
        assert_eq!(majority_class(&[3, 3]), 0);
        assert_eq!(majority_class(&[2, 3]), 1);
        assert_eq!(majority_class(&[0, 0]), 0);
    }

    #[test]
    fn test_separable_feature_is_chosen() {
        // feature 1 separates the classes, feature 0 is noise
        let features = vec![vec![0, 0], vec![1, 0], vec![0, 1], vec![1, 1], vec![0, 2], vec![1, 2]];
        let targets = vec![0, 0, 0, 0, 1, 1];

        let tree = CartBuilder::new(&features, &targets, 2, TreeConfig::default()).build();

        assert_eq!(tree.nodes[0], Node::split(1, 1, 1, 2));
        assert_eq!(tree.evaluate(&[1, 0]).map(|l| l.class), Some(0));
        assert_eq!(tree.evaluate(&[0, 2]).map(|l| l.class), Some(1));
        assert_eq!(tree.leaf_count(), 2);
    }

    #[test]
    fn test_depth_limit() {
        // labels alternate along a single feature, forcing one split per level
        let features: Vec<Vec<u32>> = (0..16).map(|v| vec![v]).collect();
        let targets: Vec<u32> = (0..16).map(|v| v % 2).collect();
        let config = TreeConfig {
            max_depth: 2,
            ..TreeConfig::default()
        };

        let tree = CartBuilder::new(&features, &targets, 2, config).build();
        assert!(tree.depth() <= 2);
        assert!(tree.validate(1, 2).is_ok());
    }

    #[test]
    fn test_pure_node_is_leaf() {
        let features = vec![vec![0], vec![1], vec![2]];
        let targets = vec![1, 1, 1];

        let tree = CartBuilder::new(&features, &targets, 2, TreeConfig::default()).build();
        assert_eq!(tree.nodes, vec![Node::Leaf(Leaf::new(1, vec![0, 3]))]);
    }

    #[test]
    fn test_indistinguishable_rows_tie_to_lowest_class() {
        let features = vec![vec![0], vec![0], vec![0], vec![0]];
        let targets = vec![1, 0, 1, 0];

        let tree = CartBuilder::new(&features, &targets, 2, TreeConfig::default()).build();
        assert_eq!(tree.nodes, vec![Node::leaf(0, vec![2, 2])]);
    }

    #[test]
    fn test_xor_takes_zero_gain_root_split() {
        // neither feature alone carries any information about the target
        let features: Vec<Vec<u32>> = (0..20u32).map(|i| vec![i % 2, (i / 2) % 2]).collect();
        let targets: Vec<u32> = features.iter().map(|f| f[0] ^ f[1]).collect();

        let tree = CartBuilder::new(&features, &targets, 2, TreeConfig::default()).build();

        assert!(!tree.nodes[0].is_leaf());
        assert_eq!(tree.depth(), 2);
        assert_eq!(tree.leaf_count(), 4);
        for (row, &target) in features.iter().zip(&targets) {
            assert_eq!(tree.evaluate(row).map(|l| l.class), Some(target));
        }
    }

    #[test]
    fn test_min_samples_leaf_respected() {
        let features: Vec<Vec<u32>> = (0..6).map(|v| vec![v]).collect();
        let targets = vec![1, 0, 0, 0, 0, 0];
        let config = TreeConfig {
            min_samples_leaf: 2,
            ..TreeConfig::default()
        };

        let tree = CartBuilder::new(&features, &targets, 2, config).build();
        for node in &tree.nodes {
            if let Node::Leaf(leaf) = node {
                assert!(leaf.support() >= 2);
            }
        }
    }

    #[test]
    fn test_same_seed_same_tree() {
        let features: Vec<Vec<u32>> = (0..40).map(|i| vec![i % 3, i % 5, i % 7]).collect();
        let targets: Vec<u32> = (0..40).map(|i| ((i % 3 + i % 5) % 2) as u32).collect();

        let a = CartBuilder::new(&features, &targets, 2, TreeConfig::default()).build();
        let b = CartBuilder::new(&features, &targets, 2, TreeConfig::default()).build();
        assert_eq!(a, b);
    }
}
