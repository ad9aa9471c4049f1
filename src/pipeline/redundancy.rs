//! Graph-based redundancy pruning
//!
//! Near-duplicate features are collapsed by building a similarity graph and
//! keeping a single representative per connected component. Working on
//! components rather than greedily walking pairs means the outcome does not
//! depend on the order pairs are visited.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::correlation::{find_similar_pairs_auto, SimilarPair};
use super::error::{Result, SelectionError};
use super::matrix::FeatureMatrix;

/// Default similarity at or above which two features count as redundant
pub const DEFAULT_REDUNDANCY_THRESHOLD: f64 = 0.9;

/// Undirected graph over feature names; an edge joins two features whose
/// similarity reached the threshold.
#[derive(Debug, Clone, Default)]
pub struct SimilarityGraph {
    adjacency: BTreeMap<String, BTreeSet<String>>,
}

impl SimilarityGraph {
    /// Build the graph for every feature of `matrix`. Features without any
    /// similar partner become isolated nodes.
    pub fn build(matrix: &FeatureMatrix, threshold: f64) -> Self {
        let pairs = find_similar_pairs_auto(matrix, threshold);
        Self::from_pairs(matrix.feature_names(), &pairs)
    }

    pub fn from_pairs(features: &[String], pairs: &[SimilarPair]) -> Self {
        let mut adjacency: BTreeMap<String, BTreeSet<String>> = features
            .iter()
            .map(|f| (f.clone(), BTreeSet::new()))
            .collect();

        for pair in pairs {
            if pair.feature1 == pair.feature2 {
                continue;
            }
            adjacency
                .entry(pair.feature1.clone())
                .or_default()
                .insert(pair.feature2.clone());
            adjacency
                .entry(pair.feature2.clone())
                .or_default()
                .insert(pair.feature1.clone());
        }

        Self { adjacency }
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(|n| n.len()).sum::<usize>() / 2
    }

    pub fn neighbors(&self, feature: &str) -> Option<&BTreeSet<String>> {
        self.adjacency.get(feature)
    }

    pub fn has_edge(&self, a: &str, b: &str) -> bool {
        self.adjacency
            .get(a)
            .map(|n| n.contains(b))
            .unwrap_or(false)
    }

    /// Connected components, each sorted by name, ordered by their smallest
    /// member.
    pub fn connected_components(&self) -> Vec<Vec<String>> {
        let mut visited: BTreeSet<&str> = BTreeSet::new();
        let mut components = Vec::new();

        for start in self.adjacency.keys() {
            if visited.contains(start.as_str()) {
                continue;
            }

            let mut component = Vec::new();
            let mut stack = vec![start.as_str()];
            visited.insert(start.as_str());

            while let Some(node) = stack.pop() {
                component.push(node.to_string());
                if let Some(neighbors) = self.adjacency.get(node) {
                    for next in neighbors {
                        if visited.insert(next.as_str()) {
                            stack.push(next.as_str());
                        }
                    }
                }
            }

            component.sort();
            components.push(component);
        }

        components
    }
}

/// A feature removed as redundant and the representative that replaced it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RedundantFeature {
    pub feature: String,
    pub representative: String,
}

/// Outcome of redundancy analysis
#[derive(Debug, Clone, Default, Serialize)]
pub struct RedundancyReport {
    /// Retained features in original column order
    pub kept: Vec<String>,
    /// Removed features, sorted by name
    pub dropped: Vec<RedundantFeature>,
    /// Components with more than one member
    pub groups: Vec<Vec<String>>,
}

/// Identify redundant features without modifying the matrix.
///
/// Each connected component of the similarity graph keeps the member with
/// the highest variance; equal variances resolve to the lexicographically
/// smallest name.
pub fn find_redundant_features(matrix: &FeatureMatrix, threshold: f64) -> Result<RedundancyReport> {
    validate_threshold(threshold)?;

    if matrix.n_features() < 2 {
        return Err(SelectionError::invalid_input(format!(
            "Redundancy pruning needs at least 2 features, got {}",
            matrix.n_features()
        )));
    }

    if threshold >= 1.0 {
        return Ok(RedundancyReport {
            kept: matrix.feature_names().to_vec(),
            ..Default::default()
        });
    }

    let graph = SimilarityGraph::build(matrix, threshold);
    log::debug!(
        "similarity graph: {} features, {} edges at threshold {:.3}",
        graph.node_count(),
        graph.edge_count(),
        threshold
    );

    let variances: BTreeMap<&str, f64> = matrix
        .feature_names()
        .iter()
        .enumerate()
        .map(|(i, name)| (name.as_str(), matrix.variance(i)))
        .collect();

    let mut dropped = Vec::new();
    let mut groups = Vec::new();
    let mut removed: BTreeSet<String> = BTreeSet::new();

    for component in graph.connected_components() {
        if component.len() < 2 {
            continue;
        }

        let representative = pick_representative(&component, &variances);
        for member in &component {
            if member != representative {
                removed.insert(member.clone());
                dropped.push(RedundantFeature {
                    feature: member.clone(),
                    representative: representative.clone(),
                });
            }
        }
        groups.push(component);
    }

    dropped.sort_by(|a, b| a.feature.cmp(&b.feature));

    let kept = matrix
        .feature_names()
        .iter()
        .filter(|name| !removed.contains(*name))
        .cloned()
        .collect();

    Ok(RedundancyReport {
        kept,
        dropped,
        groups,
    })
}

/// Remove near-duplicate features, keeping one representative per group of
/// mutually similar features.
///
/// No two retained features have similarity >= `threshold`. A threshold of
/// 1.0 or more leaves the matrix unchanged.
pub fn prune_redundant(matrix: &FeatureMatrix, threshold: f64) -> Result<FeatureMatrix> {
    let report = find_redundant_features(matrix, threshold)?;
    matrix.select_features(&report.kept)
}

fn pick_representative<'a>(component: &'a [String], variances: &BTreeMap<&str, f64>) -> &'a String {
    // component is sorted by name, so the first maximum is the smallest name
    let mut best = &component[0];
    let mut best_var = variances.get(best.as_str()).copied().unwrap_or(0.0);
    for member in &component[1..] {
        let var = variances.get(member.as_str()).copied().unwrap_or(0.0);
        if var > best_var {
            best = member;
            best_var = var;
        }
    }
    best
}

fn validate_threshold(threshold: f64) -> Result<()> {
    if threshold.is_nan() || threshold <= 0.0 {
        return Err(SelectionError::invalid_config(format!(
            "Redundancy threshold must be in (0, 1], got {}",
            threshold
        )));
    }
    Ok(())
}
