//! Text and JSON rendering of a [`DatasetAnalysis`].
//!
//! The text report mirrors the dashboard: four cleaning stat cards, ARPU,
//! the top countries by revenue, the device mix, event-type counts and a
//! preview of the first cleaned rows.

use std::fmt::Write as _;

use eventlab_core::formatting::{format_count, format_currency, format_number, percentage};
use eventlab_core::models::{
    AggregationResults, CleanedRow, CleaningLog, DeviceRevenue, EventTypeCount,
};
use eventlab_data::analysis::{AnalysisMetadata, DatasetAnalysis};
use serde::Serialize;

/// How much of the analysis to show.
#[derive(Debug, Clone, Copy)]
pub struct ReportOptions {
    /// Cleaned rows to include in the preview.
    pub preview_rows: usize,
    /// Countries to list in the revenue table.
    pub top_countries: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            preview_rows: 10,
            top_countries: 8,
        }
    }
}

// ── JSON ──────────────────────────────────────────────────────────────────────

/// Serialisable view of an analysis with the row preview truncated.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonReport<'a> {
    source: &'a str,
    cleaning_log: &'a CleaningLog,
    aggregations: &'a AggregationResults,
    revenue_by_device: &'a [DeviceRevenue],
    event_type_counts: &'a [EventTypeCount],
    preview: &'a [CleanedRow],
    metadata: &'a AnalysisMetadata,
}

/// Render `analysis` as pretty-printed JSON.
pub fn render_json(
    source: &str,
    analysis: &DatasetAnalysis,
    options: ReportOptions,
) -> serde_json::Result<String> {
    let report = JsonReport {
        source,
        cleaning_log: &analysis.cleaning_log,
        aggregations: &analysis.aggregations,
        revenue_by_device: &analysis.revenue_by_device,
        event_type_counts: &analysis.event_type_counts,
        preview: preview(&analysis.cleaned, options.preview_rows),
        metadata: &analysis.metadata,
    };
    serde_json::to_string_pretty(&report)
}

// ── Text ──────────────────────────────────────────────────────────────────────

/// Render `analysis` as a plain-text report.
pub fn render_text(source: &str, analysis: &DatasetAnalysis, options: ReportOptions) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_text(&mut out, source, analysis, options);
    out
}

fn write_text(
    out: &mut String,
    source: &str,
    analysis: &DatasetAnalysis,
    options: ReportOptions,
) -> std::fmt::Result {
    let meta = &analysis.metadata;
    writeln!(out, "Event log report: {}", source)?;
    writeln!(
        out,
        "{} raw rows in, {} cleaned rows out",
        format_count(meta.rows_in as u64),
        format_count(meta.rows_out as u64)
    )?;

    // ── Cleaning stat cards ───────────────────────────────────────────────────
    let log = &analysis.cleaning_log;
    writeln!(out)?;
    writeln!(out, "Cleaning")?;
    for (label, value) in [
        ("Duplicates Removed", log.duplicates_removed),
        ("Casing Normalized", log.casing_fixed),
        ("Nulls Handled", log.nulls_handled),
        ("Invalid Dropped", log.invalid_dropped),
    ] {
        writeln!(out, "  {:<20} {:>10}", label, format_count(value))?;
    }
    writeln!(out, "  {:<20} {:>10}", "Total Fixes", format_count(log.total()))?;

    // ── ARPU ──────────────────────────────────────────────────────────────────
    writeln!(out)?;
    writeln!(
        out,
        "Average revenue per user: {} ({} users, {} total)",
        format_currency(analysis.aggregations.arpu),
        format_count(meta.unique_users as u64),
        format_currency(meta.total_revenue)
    )?;

    // ── Revenue by country ────────────────────────────────────────────────────
    let by_country = &analysis.aggregations.revenue_by_country;
    writeln!(out)?;
    writeln!(
        out,
        "Revenue by country (top {} of {})",
        options.top_countries.min(by_country.len()),
        by_country.len()
    )?;
    if by_country.is_empty() {
        writeln!(out, "  (no data)")?;
    }
    for entry in by_country.iter().take(options.top_countries) {
        writeln!(
            out,
            "  {:<20} {:>14}",
            entry.country,
            format_currency(entry.total_revenue)
        )?;
    }

    // ── Device mix ────────────────────────────────────────────────────────────
    writeln!(out)?;
    writeln!(out, "Revenue by device")?;
    if analysis.revenue_by_device.is_empty() {
        writeln!(out, "  (no data)")?;
    }
    for entry in &analysis.revenue_by_device {
        let share = percentage(entry.total_revenue, meta.total_revenue, 1);
        writeln!(
            out,
            "  {:<20} {:>14} {:>7}%",
            entry.device,
            format_currency(entry.total_revenue),
            format_number(share, 1)
        )?;
    }

    // ── Event types ───────────────────────────────────────────────────────────
    writeln!(out)?;
    writeln!(out, "Event types")?;
    if analysis.event_type_counts.is_empty() {
        writeln!(out, "  (no data)")?;
    }
    for entry in &analysis.event_type_counts {
        writeln!(
            out,
            "  {:<20} {:>10}",
            entry.event_type.as_str(),
            format_count(entry.count)
        )?;
    }

    // ── Preview ───────────────────────────────────────────────────────────────
    let rows = preview(&analysis.cleaned, options.preview_rows);
    if rows.is_empty() {
        return Ok(());
    }
    writeln!(out)?;
    writeln!(out, "Sample cleaned data (first {} rows)", rows.len())?;
    writeln!(
        out,
        "  {:<12} {:<12} {:>10} {:<10} {:<8} {:<8} {}",
        "USER", "EVENT", "REVENUE", "COUNTRY", "CURRENCY", "DEVICE", "TIMESTAMP"
    )?;
    for row in rows {
        writeln!(
            out,
            "  {:<12} {:<12} {:>10} {:<10} {:<8} {:<8} {}",
            row.user_id,
            row.event_type.as_str(),
            format!("{:.2}", row.revenue),
            row.country,
            row.currency,
            row.device,
            row.timestamp.format("%Y-%m-%d %H:%M")
        )?;
    }

    Ok(())
}

fn preview(rows: &[CleanedRow], limit: usize) -> &[CleanedRow] {
    &rows[..rows.len().min(limit)]
}

// ── Tests ─────────────────────────────────────────────────────────────────────
