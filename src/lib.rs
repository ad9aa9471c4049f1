//! featsel: automated feature selection
//!
//! Prunes redundant features through a similarity graph, filters
//! low-variance features, then narrows the rest through a configurable
//! cascade of univariate, model-based and wrapper selection methods.

pub mod cli;
pub mod pipeline;
pub mod report;
pub mod utils;
