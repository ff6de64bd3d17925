//! End-to-end analysis pipeline.
//!
//! Runs the cleaner and the aggregator over one dataset and bundles the
//! results, plus a few run statistics, for the presentation layer.

use std::path::Path;

use chrono::Utc;
use eventlab_core::error::Result;
use eventlab_core::models::{
    AggregationResults, CleanedRow, CleaningLog, DeviceRevenue, EventTypeCount, RawRow,
};
use eventlab_core::settings::InputFormat;
use serde::Serialize;
use tracing::debug;

use crate::aggregator::RevenueAggregator;
use crate::cleaner::clean_at;
use crate::reader::load_rows;

// ── Public types ──────────────────────────────────────────────────────────────

/// Statistics about one pipeline run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisMetadata {
    /// RFC 3339 time the run started; also the default row timestamp.
    pub generated_at: String,
    /// Raw rows handed to the cleaner.
    pub rows_in: usize,
    /// Cleaned rows produced.
    pub rows_out: usize,
    pub unique_users: usize,
    pub total_revenue: f64,
    pub clean_time_seconds: f64,
    pub aggregate_time_seconds: f64,
}

/// Everything the presentation layer may display for one dataset.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetAnalysis {
    pub cleaned: Vec<CleanedRow>,
    pub cleaning_log: CleaningLog,
    pub aggregations: AggregationResults,
    pub revenue_by_device: Vec<DeviceRevenue>,
    pub event_type_counts: Vec<EventTypeCount>,
    pub metadata: AnalysisMetadata,
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Clean `rows` and compute every aggregation over the result.
///
/// Each call is independent; nothing is cached between runs.
pub fn analyze_dataset(rows: &[RawRow]) -> DatasetAnalysis {
    let now = Utc::now();

    // ── Step 1: Clean ─────────────────────────────────────────────────────────
    let clean_start = std::time::Instant::now();
    let (cleaned, cleaning_log) = clean_at(rows, now);
    let clean_time = clean_start.elapsed().as_secs_f64();

    // ── Step 2: Aggregate ─────────────────────────────────────────────────────
    let aggregate_start = std::time::Instant::now();
    let aggregations = RevenueAggregator::aggregate(&cleaned);
    let revenue_by_device = RevenueAggregator::revenue_by_device(&cleaned);
    let event_type_counts = RevenueAggregator::event_type_counts(&cleaned);
    let aggregate_time = aggregate_start.elapsed().as_secs_f64();

    let metadata = AnalysisMetadata {
        generated_at: now.to_rfc3339(),
        rows_in: rows.len(),
        rows_out: cleaned.len(),
        unique_users: RevenueAggregator::unique_users(&cleaned),
        total_revenue: RevenueAggregator::total_revenue(&cleaned),
        clean_time_seconds: clean_time,
        aggregate_time_seconds: aggregate_time,
    };

    debug!(
        "Analysed {} rows into {} cleaned rows across {} countries",
        metadata.rows_in,
        metadata.rows_out,
        aggregations.revenue_by_country.len()
    );

    DatasetAnalysis {
        cleaned,
        cleaning_log,
        aggregations,
        revenue_by_device,
        event_type_counts,
        metadata,
    }
}

/// Load a dataset from disk and analyse it.
pub fn analyze_file(path: &Path, format: InputFormat) -> Result<DatasetAnalysis> {
    let rows = load_rows(path, format)?;
    Ok(analyze_dataset(&rows))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
