//! Data pipeline for the event-log lab.
//!
//! Responsible for reading CSV / JSON datasets into raw rows, cleaning them,
//! aggregating revenue and running the combined analysis pipeline.

pub mod aggregator;
pub mod analysis;
pub mod cleaner;
pub mod reader;

pub use aggregator::RevenueAggregator;
pub use analysis::{analyze_dataset, analyze_file, DatasetAnalysis};
pub use cleaner::{clean, clean_at};
pub use eventlab_core as core;
