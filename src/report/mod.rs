//! Report module - summarizing and exporting selection results

pub mod selection_export;
pub mod summary;

pub use selection_export::*;
pub use summary::*;
