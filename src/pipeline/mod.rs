//! Pipeline module - redundancy pruning, variance filtering and the
//! selection cascade

pub mod budget;
pub mod cascade;
pub mod config;
pub mod correlation;
pub mod cv;
pub mod error;
pub mod loader;
pub mod matrix;
pub mod models;
pub mod redundancy;
pub mod result;
pub mod scoring;
pub mod selectors;
pub mod stats;
pub mod variance;

pub use budget::IterationBudget;
pub use cascade::{run_pipeline, select_features};
pub use config::{load_pipeline_config, Method, PipelineConfig, SelectionConfig};
pub use correlation::{find_similar_pairs_auto, SimilarPair};
pub use cv::CvMetric;
pub use error::{Result, SelectionError};
pub use loader::*;
pub use matrix::{FeatureMatrix, LabelVector};
pub use redundancy::{
    find_redundant_features, prune_redundant, RedundancyReport, SimilarityGraph,
    DEFAULT_REDUNDANCY_THRESHOLD,
};
pub use result::{SelectionResult, StageRecord};
pub use scoring::ScoringFunction;
pub use selectors::{SelectionStrategy, StageOutcome};
pub use variance::{filter_low_variance, low_variance_features, DEFAULT_MIN_VARIANCE};
