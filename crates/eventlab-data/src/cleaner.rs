//! Cleaning pass over raw event-log rows.
//!
//! Removes exact duplicates, drops rows without a user id or event type,
//! normalises casing and defaults, coerces revenue and parses timestamps.
//! Every anomaly is counted in a [`CleaningLog`]; nothing here fails.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use eventlab_core::data_processors::{Revenue, RevenueProcessor, TimestampProcessor};
use eventlab_core::models::{CleanedRow, CleaningLog, EventType, RawRow};
use tracing::debug;

/// Country used when the column is absent or blank.
pub const DEFAULT_COUNTRY: &str = "UNKNOWN";
/// Currency used when the column is absent or blank.
pub const DEFAULT_CURRENCY: &str = "USD";
/// Device used when the column is absent or blank.
pub const DEFAULT_DEVICE: &str = "web";

// ── Public API ────────────────────────────────────────────────────────────────

/// Clean `rows`, stamping rows without a usable timestamp with the current
/// time.
///
/// Returns the cleaned rows in input order (after de-duplication) together
/// with the run's counters.
pub fn clean(rows: &[RawRow]) -> (Vec<CleanedRow>, CleaningLog) {
    clean_at(rows, Utc::now())
}

/// Same as [`clean`] with an explicit processing time.
pub fn clean_at(rows: &[RawRow], now: DateTime<Utc>) -> (Vec<CleanedRow>, CleaningLog) {
    let unique = dedupe(rows);
    let dedup_log = CleaningLog {
        duplicates_removed: (rows.len() - unique.len()) as u64,
        ..Default::default()
    };

    let (cleaned, log) = unique.into_iter().map(|row| clean_row(row, now)).fold(
        (Vec::with_capacity(rows.len()), dedup_log),
        |(mut cleaned, log), outcome| match outcome {
            RowOutcome::Kept(row, delta) => {
                cleaned.push(row);
                (cleaned, log + delta)
            }
            RowOutcome::Dropped => (
                cleaned,
                log + CleaningLog {
                    invalid_dropped: 1,
                    ..Default::default()
                },
            ),
        },
    );

    debug!(
        "cleaned {} of {} rows: {} duplicates, {} invalid, {} nulls, {} casing",
        cleaned.len(),
        rows.len(),
        log.duplicates_removed,
        log.invalid_dropped,
        log.nulls_handled,
        log.casing_fixed
    );

    (cleaned, log)
}

/// Canonical string form of a raw row used for exact-duplicate detection.
///
/// Absent and empty fields produce different keys.
pub fn canonical_key(row: &RawRow) -> String {
    serde_json::to_string(row).unwrap_or_else(|_| format!("{:?}", row))
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// What happened to one de-duplicated row.
enum RowOutcome {
    Kept(CleanedRow, CleaningLog),
    Dropped,
}

/// Keep the first occurrence of every distinct row.
fn dedupe(rows: &[RawRow]) -> Vec<&RawRow> {
    let mut seen: HashSet<String> = HashSet::with_capacity(rows.len());
    rows.iter()
        .filter(|row| seen.insert(canonical_key(row)))
        .collect()
}

/// Trim `raw`, falling back to `default` when nothing is left.
fn trimmed_or<'a>(raw: Option<&'a str>, default: &'a str) -> &'a str {
    match raw.map(str::trim) {
        Some(s) if !s.is_empty() => s,
        _ => default,
    }
}

fn clean_row(row: &RawRow, now: DateTime<Utc>) -> RowOutcome {
    let (Some(user_id), Some(raw_event)) = (row.user_id.as_deref(), row.event_type.as_deref())
    else {
        return RowOutcome::Dropped;
    };
    // user_id is checked as given; a blank event type would normalise to "".
    if user_id.is_empty() || raw_event.trim().is_empty() {
        return RowOutcome::Dropped;
    }

    let mut delta = CleaningLog::default();

    let event_type = EventType::from_normalized(&raw_event.trim().to_lowercase());
    if !event_type.is_known() {
        debug!("passing through unrecognised event type \"{}\"", event_type);
    }

    let country = trimmed_or(row.country.as_deref(), DEFAULT_COUNTRY).to_uppercase();
    let currency = trimmed_or(row.currency.as_deref(), DEFAULT_CURRENCY).to_uppercase();
    let device = trimmed_or(row.device.as_deref(), DEFAULT_DEVICE).to_lowercase();

    // The default is substituted before comparing, so a missing country on
    // its own is not a casing fix. One increment per row at most.
    let original_country = match row.country.as_deref() {
        Some(c) if !c.is_empty() => c,
        _ => DEFAULT_COUNTRY,
    };
    if original_country != country || raw_event != event_type.as_str() {
        delta.casing_fixed = 1;
    }

    let revenue = RevenueProcessor::coerce(row.revenue.as_ref());
    match revenue {
        Revenue::Invalid => delta.nulls_handled = 1,
        Revenue::Missing if event_type.is_financial() => delta.nulls_handled = 1,
        Revenue::Missing | Revenue::Parsed(_) => {}
    }

    let timestamp = TimestampProcessor::parse_or(row.timestamp.as_deref(), now);

    RowOutcome::Kept(
        CleanedRow {
            user_id: user_id.to_string(),
            event_type,
            revenue: revenue.amount(),
            country,
            currency,
            device,
            timestamp,
        },
        delta,
    )
}

// ── Tests ─────────────────────────────────────────────────────────────────────
