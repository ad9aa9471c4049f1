//! CART decision trees and a bagged random forest
//!
//! Trees split on Gini impurity. Importances are the total weighted
//! impurity decrease contributed by each feature, normalized per tree and
//! averaged across the forest.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;

use super::{check_trainable, Classifier};
use crate::pipeline::error::Result;
use crate::pipeline::matrix::{FeatureMatrix, LabelVector};

/// Hyperparameters for [`RandomForest`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForestConfig {
    pub n_estimators: usize,
    /// Maximum tree depth; `None` grows until leaves are pure
    pub max_depth: Option<usize>,
    /// Nodes with fewer samples become leaves
    pub min_samples_split: usize,
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: 50,
            max_depth: None,
            min_samples_split: 2,
            seed: 0,
        }
    }
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        class: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// Best split found for a node
struct SplitCandidate {
    feature: usize,
    threshold: f64,
    impurity_decrease: f64,
}

/// A single CART classification tree
#[derive(Debug, Clone)]
pub struct DecisionTree {
    nodes: Vec<Node>,
    importances: Vec<f64>,
    max_depth: Option<usize>,
    min_samples_split: usize,
    /// Features considered per split; `None` considers all
    max_features: Option<usize>,
}

impl DecisionTree {
    pub fn new(max_depth: Option<usize>, min_samples_split: usize) -> Self {
        Self {
            nodes: Vec::new(),
            importances: Vec::new(),
            max_depth,
            min_samples_split: min_samples_split.max(2),
            max_features: None,
        }
    }

    fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = Some(max_features.max(1));
        self
    }

    /// Grow the tree on the listed rows (repeats allowed, for bootstraps).
    fn grow(&mut self, x: &FeatureMatrix, y: &LabelVector, rows: Vec<usize>, rng: &mut StdRng) {
        let n_classes = y.n_classes();
        self.nodes.clear();
        self.importances = vec![0.0; x.n_features()];

        // (node slot, rows reaching it, depth)
        self.nodes.push(Node::Leaf { class: 0 });
        let mut work = vec![(0usize, rows, 0usize)];

        while let Some((slot, rows, depth)) = work.pop() {
            let counts = class_counts(&rows, y.codes(), n_classes);
            let majority = majority_class(&counts);

            let depth_reached = self.max_depth.map(|d| depth >= d).unwrap_or(false);
            let pure = counts.iter().filter(|&&c| c > 0).count() <= 1;
            if depth_reached || pure || rows.len() < self.min_samples_split {
                self.nodes[slot] = Node::Leaf { class: majority };
                continue;
            }

            let candidates = self.candidate_features(x.n_features(), rng);
            let Some(split) = best_split(x, y.codes(), &rows, &counts, &candidates) else {
                self.nodes[slot] = Node::Leaf { class: majority };
                continue;
            };

            self.importances[split.feature] += split.impurity_decrease;

            let column = x.column(split.feature);
            let (left_rows, right_rows): (Vec<usize>, Vec<usize>) =
                rows.into_iter().partition(|&r| column[r] <= split.threshold);

            let left = self.nodes.len();
            self.nodes.push(Node::Leaf { class: majority });
            let right = self.nodes.len();
            self.nodes.push(Node::Leaf { class: majority });

            self.nodes[slot] = Node::Split {
                feature: split.feature,
                threshold: split.threshold,
                left,
                right,
            };

            work.push((right, right_rows, depth + 1));
            work.push((left, left_rows, depth + 1));
        }
    }

    fn candidate_features(&self, n_features: usize, rng: &mut StdRng) -> Vec<usize> {
        let mut features: Vec<usize> = (0..n_features).collect();
        if let Some(k) = self.max_features {
            if k < n_features {
                features.shuffle(rng);
                features.truncate(k);
                features.sort_unstable();
            }
        }
        features
    }

    fn predict_row(&self, x: &FeatureMatrix, row: usize) -> usize {
        let mut node = 0;
        loop {
            match &self.nodes[node] {
                Node::Leaf { class } => return *class,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if x.get(row, *feature) <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], idx: usize) -> usize {
            match &nodes[idx] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
            }
        }
        if self.nodes.is_empty() {
            0
        } else {
            walk(&self.nodes, 0)
        }
    }

    /// Importances normalized to sum to 1 (all zero for a single leaf).
    fn normalized_importances(&self) -> Vec<f64> {
        let total: f64 = self.importances.iter().sum();
        if total > 0.0 {
            self.importances.iter().map(|v| v / total).collect()
        } else {
            vec![0.0; self.importances.len()]
        }
    }
}

impl Classifier for DecisionTree {
    fn fit(&mut self, x: &FeatureMatrix, y: &LabelVector) -> Result<()> {
        check_trainable(x, y)?;
        let mut rng = StdRng::seed_from_u64(0);
        self.grow(x, y, (0..x.n_samples()).collect(), &mut rng);
        Ok(())
    }

    fn predict(&self, x: &FeatureMatrix) -> Vec<usize> {
        (0..x.n_samples()).map(|r| self.predict_row(x, r)).collect()
    }

    fn feature_importances(&self) -> Vec<f64> {
        self.normalized_importances()
    }
}

/// Bagged ensemble of CART trees with sqrt(p) features tried per split
#[derive(Debug, Clone)]
pub struct RandomForest {
    config: ForestConfig,
    trees: Vec<DecisionTree>,
    n_classes: usize,
    n_features: usize,
}

impl RandomForest {
    pub fn new(config: ForestConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            n_classes: 0,
            n_features: 0,
        }
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }
}

impl Classifier for RandomForest {
    fn fit(&mut self, x: &FeatureMatrix, y: &LabelVector) -> Result<()> {
        check_trainable(x, y)?;

        let n = x.n_samples();
        let p = x.n_features();
        let max_features = (p as f64).sqrt().ceil() as usize;

        self.n_classes = y.n_classes();
        self.n_features = p;
        let config = self.config.clone();

        // each tree owns a seed derived from its index so the forest is
        // identical regardless of rayon scheduling
        self.trees = (0..config.n_estimators.max(1))
            .into_par_iter()
            .map(|t| {
                let mut rng = StdRng::seed_from_u64(tree_seed(config.seed, t));
                let rows: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                let mut tree = DecisionTree::new(config.max_depth, config.min_samples_split)
                    .with_max_features(max_features);
                tree.grow(x, y, rows, &mut rng);
                tree
            })
            .collect();

        log::trace!(
            "random forest: {} trees on {} samples x {} features",
            self.trees.len(),
            n,
            p
        );

        Ok(())
    }

    fn predict(&self, x: &FeatureMatrix) -> Vec<usize> {
        (0..x.n_samples())
            .map(|row| {
                let mut votes = vec![0usize; self.n_classes.max(1)];
                for tree in &self.trees {
                    votes[tree.predict_row(x, row)] += 1;
                }
                majority_class(&votes)
            })
            .collect()
    }

    fn feature_importances(&self) -> Vec<f64> {
        let mut total = vec![0.0; self.n_features];
        for tree in &self.trees {
            for (acc, imp) in total.iter_mut().zip(tree.normalized_importances()) {
                *acc += imp;
            }
        }
        let sum: f64 = total.iter().sum();
        if sum > 0.0 {
            total.iter_mut().for_each(|v| *v /= sum);
        }
        total
    }
}

/// Seed of tree `t` in a forest seeded with `seed`.
fn tree_seed(seed: u64, t: usize) -> u64 {
    seed ^ (t as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

fn class_counts(rows: &[usize], codes: &[usize], n_classes: usize) -> Vec<usize> {
    let mut counts = vec![0usize; n_classes];
    for &r in rows {
        counts[codes[r]] += 1;
    }
    counts
}

/// Most frequent class; ties resolve to the lowest code.
fn majority_class(counts: &[usize]) -> usize {
    let mut best = 0;
    for (class, &count) in counts.iter().enumerate() {
        if count > counts[best] {
            best = class;
        }
    }
    best
}

fn gini(counts: &[usize], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let t = total as f64;
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / t;
            p * p
        })
        .sum::<f64>()
}

/// Search the candidate features for the split with the largest weighted
/// impurity decrease. Returns `None` when no split improves purity.
fn best_split(
    x: &FeatureMatrix,
    codes: &[usize],
    rows: &[usize],
    counts: &[usize],
    candidates: &[usize],
) -> Option<SplitCandidate> {
    let n = rows.len();
    if n < 2 {
        return None;
    }
    let parent = gini(counts, n) * n as f64;
    let mut best: Option<SplitCandidate> = None;

    let mut sorted = rows.to_vec();
    for &feature in candidates {
        let column = x.column(feature);
        sorted.sort_by(|&a, &b| column[a].total_cmp(&column[b]));

        let mut left = vec![0usize; counts.len()];
        let mut right = counts.to_vec();

        for i in 0..n - 1 {
            let code = codes[sorted[i]];
            left[code] += 1;
            right[code] -= 1;

            let here = column[sorted[i]];
            let next = column[sorted[i + 1]];
            if here == next {
                continue;
            }

            let n_left = i + 1;
            let n_right = n - n_left;
            let child = gini(&left, n_left) * n_left as f64 + gini(&right, n_right) * n_right as f64;
            let decrease = parent - child;

            let improves = match &best {
                Some(b) => decrease > b.impurity_decrease + 1e-12,
                None => decrease > 1e-12,
            };
            if improves {
                best = Some(SplitCandidate {
                    feature,
                    threshold: here + (next - here) / 2.0,
                    impurity_decrease: decrease,
                });
            }
        }
    }

    best
}
