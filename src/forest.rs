//! Random forest classification over landmark features.
//!
//! A bagged ensemble of CART decision trees: every tree is fit on a bootstrap sample of the
//! training set, splits are chosen by Gini impurity over a random √d subset of the features,
//! and the ensemble's probability distribution is the mean of the per-tree leaf distributions.
//! Fitting is seeded and deterministic: each tree derives its own RNG stream from the base
//! seed, so the parallel fit never depends on scheduling order.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::feature::FEATURE_DIM;

/// Tunable forest parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForestConfig {
    /// Number of trees in the ensemble.
    pub trees: usize,
    /// Maximum tree depth.
    pub max_depth: usize,
    /// Minimum number of samples a node needs to be considered for splitting.
    pub min_samples_split: usize,
    /// Base seed for bootstrap and feature sampling.
    pub seed: u64,
}

impl ForestConfig {
    pub const DEFAULT_TREES: usize = 200;
    pub const DEFAULT_MAX_DEPTH: usize = 30;
    pub const DEFAULT_MIN_SAMPLES_SPLIT: usize = 5;
    pub const DEFAULT_SEED: u64 = 42;
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            trees: Self::DEFAULT_TREES,
            max_depth: Self::DEFAULT_MAX_DEPTH,
            min_samples_split: Self::DEFAULT_MIN_SAMPLES_SPLIT,
            seed: Self::DEFAULT_SEED,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
enum Node {
    Split {
        feature: usize,
        threshold: f32,
        left: usize,
        right: usize,
    },
    Leaf {
        distribution: Vec<f32>,
    },
}

#[derive(Debug, Serialize, Deserialize)]
struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    /// Walks the tree; values at or below a split's threshold go left.
    fn leaf_distribution(&self, features: &[f32]) -> &[f32] {
        let mut node = 0;
        loop {
            match &self.nodes[node] {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if features[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
                Node::Leaf { distribution } => return distribution,
            }
        }
    }
}

/// A fitted random forest. Immutable once fit; safe to query concurrently.
#[derive(Debug, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    num_features: usize,
    num_classes: usize,
}

impl RandomForest {
    /// Fits a forest on the given training samples.
    ///
    /// `labels[i]` is the class index of `features[i]` and must be below `num_classes`.
    pub fn fit(
        features: &[[f32; FEATURE_DIM]],
        labels: &[usize],
        num_classes: usize,
        config: &ForestConfig,
    ) -> Self {
        assert_eq!(features.len(), labels.len());
        assert!(!features.is_empty(), "cannot fit a forest on no samples");

        let trees = (0..config.trees)
            .into_par_iter()
            .map(|tree| {
                let mut rng = fastrand::Rng::with_seed(config.seed.wrapping_add(tree as u64));
                let sample: Vec<usize> = (0..features.len())
                    .map(|_| rng.usize(..features.len()))
                    .collect();
                fit_tree(features, labels, sample, num_classes, config, &mut rng)
            })
            .collect();

        Self {
            trees,
            num_features: FEATURE_DIM,
            num_classes,
        }
    }

    pub fn num_features(&self) -> usize {
        self.num_features
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    /// Returns the ensemble's probability distribution over all class indices.
    ///
    /// The distribution sums to 1 and is the mean of the per-tree leaf distributions.
    pub fn predict_proba(&self, features: &[f32; FEATURE_DIM]) -> Vec<f32> {
        let mut proba = vec![0.0; self.num_classes];
        for tree in &self.trees {
            for (acc, p) in proba.iter_mut().zip(tree.leaf_distribution(features)) {
                *acc += p;
            }
        }
        for p in &mut proba {
            *p /= self.trees.len() as f32;
        }
        proba
    }

    /// Returns the predicted class index: the argmax of [`RandomForest::predict_proba`].
    pub fn predict(&self, features: &[f32; FEATURE_DIM]) -> usize {
        argmax(&self.predict_proba(features))
    }
}

/// Index of the largest value; the first one wins on ties.
pub fn argmax(values: &[f32]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate() {
        if v > values[best] {
            best = i;
        }
    }
    best
}

fn fit_tree(
    features: &[[f32; FEATURE_DIM]],
    labels: &[usize],
    sample: Vec<usize>,
    num_classes: usize,
    config: &ForestConfig,
    rng: &mut fastrand::Rng,
) -> DecisionTree {
    let mut nodes = Vec::new();
    grow(
        &mut nodes,
        features,
        labels,
        sample,
        num_classes,
        config,
        rng,
        0,
    );
    DecisionTree { nodes }
}

/// Recursively grows a (sub)tree over `indices` and returns its root node id.
fn grow(
    nodes: &mut Vec<Node>,
    features: &[[f32; FEATURE_DIM]],
    labels: &[usize],
    indices: Vec<usize>,
    num_classes: usize,
    config: &ForestConfig,
    rng: &mut fastrand::Rng,
    depth: usize,
) -> usize {
    let counts = class_counts(labels, &indices, num_classes);
    let pure = counts.iter().filter(|&&c| c > 0).count() <= 1;

    if pure || depth >= config.max_depth || indices.len() < config.min_samples_split {
        return push_leaf(nodes, &counts, indices.len());
    }

    let Some((feature, threshold)) = best_split(features, labels, &indices, num_classes, rng)
    else {
        // No candidate feature separates the samples (e.g. duplicate rows with different
        // labels); keep the mixed distribution.
        return push_leaf(nodes, &counts, indices.len());
    };

    let (left, right): (Vec<usize>, Vec<usize>) = indices
        .into_iter()
        .partition(|&i| features[i][feature] <= threshold);

    let id = nodes.len();
    // Placeholder, patched once both subtrees are grown.
    nodes.push(Node::Leaf {
        distribution: Vec::new(),
    });
    let left = grow(
        nodes, features, labels, left, num_classes, config, rng, depth + 1,
    );
    let right = grow(
        nodes, features, labels, right, num_classes, config, rng, depth + 1,
    );
    nodes[id] = Node::Split {
        feature,
        threshold,
        left,
        right,
    };
    id
}

fn push_leaf(nodes: &mut Vec<Node>, counts: &[usize], total: usize) -> usize {
    let id = nodes.len();
    nodes.push(Node::Leaf {
        distribution: counts.iter().map(|&c| c as f32 / total as f32).collect(),
    });
    id
}

fn class_counts(labels: &[usize], indices: &[usize], num_classes: usize) -> Vec<usize> {
    let mut counts = vec![0; num_classes];
    for &i in indices {
        counts[labels[i]] += 1;
    }
    counts
}

fn gini(counts: &[usize], total: usize) -> f32 {
    let mut impurity = 1.0;
    for &c in counts {
        let p = c as f32 / total as f32;
        impurity -= p * p;
    }
    impurity
}

/// Finds the Gini-optimal `(feature, threshold)` over a random √d feature subset.
fn best_split(
    features: &[[f32; FEATURE_DIM]],
    labels: &[usize],
    indices: &[usize],
    num_classes: usize,
    rng: &mut fastrand::Rng,
) -> Option<(usize, f32)> {
    let candidates = sample_features(rng);
    let total = indices.len();

    let mut best: Option<(usize, f32)> = None;
    let mut best_impurity = gini(&class_counts(labels, indices, num_classes), total);

    let mut sorted: Vec<(f32, usize)> = Vec::with_capacity(total);
    for &feature in &candidates {
        sorted.clear();
        sorted.extend(indices.iter().map(|&i| (features[i][feature], labels[i])));
        sorted.sort_unstable_by(|a, b| a.0.total_cmp(&b.0));

        let mut left_counts = vec![0; num_classes];
        let mut right_counts = class_counts(labels, indices, num_classes);

        for split_at in 1..total {
            let (value, label) = sorted[split_at - 1];
            left_counts[label] += 1;
            right_counts[label] -= 1;

            let next = sorted[split_at].0;
            if value == next {
                continue;
            }

            let weighted = (split_at as f32 * gini(&left_counts, split_at)
                + (total - split_at) as f32 * gini(&right_counts, total - split_at))
                / total as f32;
            if weighted < best_impurity {
                best_impurity = weighted;
                best = Some((feature, (value + next) / 2.0));
            }
        }
    }

    best
}

/// Draws √d distinct feature indices.
fn sample_features(rng: &mut fastrand::Rng) -> Vec<usize> {
    let k = (FEATURE_DIM as f32).sqrt().ceil() as usize;
    let mut all: Vec<usize> = (0..FEATURE_DIM).collect();
    for i in 0..k {
        let j = rng.usize(i..FEATURE_DIM);
        all.swap(i, j);
    }
    all.truncate(k);
    all
}
