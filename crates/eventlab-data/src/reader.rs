//! Dataset loading for the event-log lab.
//!
//! Turns CSV text (header row + records) or a JSON array of objects into
//! [`RawRow`]s. Cells are not interpreted here beyond mapping columns to
//! fields; all cleaning happens downstream.

use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use eventlab_core::error::{EventLabError, Result};
use eventlab_core::models::{RawRow, RevenueValue};
use eventlab_core::settings::InputFormat;
use tracing::{debug, warn};

/// Column names recognised in the header row.
pub const KNOWN_COLUMNS: &[&str] = &[
    "user_id",
    "event_type",
    "revenue",
    "country",
    "currency",
    "device",
    "timestamp",
];

// ── Public API ────────────────────────────────────────────────────────────────

/// Read `path` and parse it as `format`.
///
/// The file is read as raw bytes so that a CSV record with invalid UTF-8
/// only costs that record, not the whole file.
pub fn load_rows(path: &Path, format: InputFormat) -> Result<Vec<RawRow>> {
    let content = std::fs::read(path).map_err(|source| EventLabError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let rows = parse_rows(&content, format)?;
    debug!("Loaded {} {} rows from {}", rows.len(), format, path.display());
    Ok(rows)
}

/// Parse already-loaded text as `format`.
pub fn parse_rows(content: impl AsRef<[u8]>, format: InputFormat) -> Result<Vec<RawRow>> {
    match format {
        InputFormat::Csv => parse_csv(content),
        InputFormat::Json => parse_json(content),
    }
}

/// Parse CSV text with a header row into raw rows.
///
/// * A cell present in the record is always `Some`, even when empty.
/// * A short record gets `Some("")` for the trailing columns it lacks.
/// * A known column missing from the header leaves the field `None`.
/// * Unknown columns are ignored.
/// * A record that cannot be decoded is skipped with a warning.
///
/// Fails when the header carries none of the [`KNOWN_COLUMNS`] or cannot
/// itself be decoded.
pub fn parse_csv(content: impl AsRef<[u8]>) -> Result<Vec<RawRow>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_ref());

    let headers = reader.headers()?.clone();
    let columns = ColumnMap::from_headers(&headers);
    if columns.is_empty() {
        return Err(EventLabError::MissingHeader(format!(
            "expected at least one of {}",
            KNOWN_COLUMNS.join(", ")
        )));
    }
    for missing in columns.missing() {
        warn!("CSV header has no \"{}\" column", missing);
    }

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for record in reader.records() {
        match record {
            Ok(record) => rows.push(columns.to_row(&record)),
            Err(e) => {
                warn!("Skipping malformed CSV record: {}", e);
                skipped += 1;
            }
        }
    }
    if skipped > 0 {
        warn!("Skipped {} malformed CSV records", skipped);
    }
    Ok(rows)
}

/// Parse a JSON array of row objects.
///
/// `revenue` may be a number, a string or `null`; other fields are strings.
pub fn parse_json(content: impl AsRef<[u8]>) -> Result<Vec<RawRow>> {
    Ok(serde_json::from_slice(content.as_ref())?)
}

// ── ColumnMap ─────────────────────────────────────────────────────────────────

/// Position of each known column within the header row.
#[derive(Debug, Default)]
struct ColumnMap {
    user_id: Option<usize>,
    event_type: Option<usize>,
    revenue: Option<usize>,
    country: Option<usize>,
    currency: Option<usize>,
    device: Option<usize>,
    timestamp: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &StringRecord) -> Self {
        let mut map = ColumnMap::default();
        for (i, name) in headers.iter().enumerate() {
            // Strip a UTF-8 byte-order mark that some spreadsheet exports add.
            let slot = match name.trim_start_matches('\u{feff}') {
                "user_id" => &mut map.user_id,
                "event_type" => &mut map.event_type,
                "revenue" => &mut map.revenue,
                "country" => &mut map.country,
                "currency" => &mut map.currency,
                "device" => &mut map.device,
                "timestamp" => &mut map.timestamp,
                _ => continue,
            };
            // First occurrence of a duplicated header wins.
            if slot.is_none() {
                *slot = Some(i);
            }
        }
        map
    }

    fn positions(&self) -> [(&'static str, Option<usize>); 7] {
        [
            ("user_id", self.user_id),
            ("event_type", self.event_type),
            ("revenue", self.revenue),
            ("country", self.country),
            ("currency", self.currency),
            ("device", self.device),
            ("timestamp", self.timestamp),
        ]
    }

    fn is_empty(&self) -> bool {
        self.positions().iter().all(|(_, pos)| pos.is_none())
    }

    fn missing(&self) -> Vec<&'static str> {
        self.positions()
            .into_iter()
            .filter(|(_, pos)| pos.is_none())
            .map(|(name, _)| name)
            .collect()
    }

    fn to_row(&self, record: &StringRecord) -> RawRow {
        // A header column past the end of a short record reads as empty.
        let cell = |pos: Option<usize>| pos.map(|i| record.get(i).unwrap_or("").to_string());
        RawRow {
            user_id: cell(self.user_id),
            event_type: cell(self.event_type),
            revenue: cell(self.revenue).map(RevenueValue::Text),
            country: cell(self.country),
            currency: cell(self.currency),
            device: cell(self.device),
            timestamp: cell(self.timestamp),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    const SAMPLE_CSV: &str = "\
user_id,event_type,revenue,country,currency,device,timestamp
u1,PURCHASE,120.50,usa ,usd,Web,2024-01-15T10:00:00Z
u2,view,,,,,
";

    // ── parse_csv ─────────────────────────────────────────────────────────────

    #[test]
    fn test_parse_csv_maps_columns() {
        let rows = parse_csv(SAMPLE_CSV).unwrap();
        assert_eq!(rows.len(), 2);

        let first = &rows[0];
        assert_eq!(first.user_id.as_deref(), Some("u1"));
        assert_eq!(first.event_type.as_deref(), Some("PURCHASE"));
        assert_eq!(first.revenue, Some(RevenueValue::Text("120.50".into())));
        assert_eq!(first.country.as_deref(), Some("usa "));
        assert_eq!(first.device.as_deref(), Some("Web"));
        assert_eq!(first.timestamp.as_deref(), Some("2024-01-15T10:00:00Z"));
    }

    #[test]
    fn test_parse_csv_empty_cells_stay_present() {
        let rows = parse_csv(SAMPLE_CSV).unwrap();
        let second = &rows[1];
        assert_eq!(second.revenue, Some(RevenueValue::Text(String::new())));
        assert_eq!(second.country.as_deref(), Some(""));
        assert_eq!(second.timestamp.as_deref(), Some(""));
    }

    #[test]
    fn test_parse_csv_missing_columns_are_none() {
        let rows = parse_csv("event_type,user_id\nview,u1\n").unwrap();
        assert_eq!(rows[0].user_id.as_deref(), Some("u1"));
        assert_eq!(rows[0].event_type.as_deref(), Some("view"));
        assert!(rows[0].revenue.is_none());
        assert!(rows[0].country.is_none());
    }

    #[test]
    fn test_parse_csv_short_record_pads_empty_cells() {
        let rows = parse_csv("user_id,event_type,revenue\nu1,purchase\nu1,purchase,\n").unwrap();
        assert_eq!(rows[0].event_type.as_deref(), Some("purchase"));
        assert_eq!(rows[0].revenue, Some(RevenueValue::Text(String::new())));
        assert_eq!(rows[0], rows[1]);
    }

    #[test]
    fn test_parse_csv_skips_undecodable_record() {
        let mut content = b"user_id,event_type\nu1,view\n".to_vec();
        content.extend_from_slice(b"u\xff2,view\nu3,purchase\n");
        let rows = parse_csv(&content).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].user_id.as_deref(), Some("u1"));
        assert_eq!(rows[1].user_id.as_deref(), Some("u3"));
    }

    #[test]
    fn test_parse_csv_undecodable_header_fails() {
        let err = parse_csv(b"user_\xffid,event_type\nu1,view\n").unwrap_err();
        assert!(matches!(err, EventLabError::CsvParse(_)));
    }

    #[test]
    fn test_parse_csv_ignores_unknown_columns() {
        let rows = parse_csv("session,user_id,event_type\ns-9,u1,view\n").unwrap();
        assert_eq!(rows[0].user_id.as_deref(), Some("u1"));
    }

    #[test]
    fn test_parse_csv_quoted_fields() {
        let rows = parse_csv("user_id,event_type,country\n\"u,1\",view,\" France \"\n").unwrap();
        assert_eq!(rows[0].user_id.as_deref(), Some("u,1"));
        assert_eq!(rows[0].country.as_deref(), Some(" France "));
    }

    #[test]
    fn test_parse_csv_strips_bom() {
        let rows = parse_csv("\u{feff}user_id,event_type\nu1,view\n").unwrap();
        assert_eq!(rows[0].user_id.as_deref(), Some("u1"));
    }

    #[test]
    fn test_parse_csv_rejects_unrelated_header() {
        let err = parse_csv("a,b,c\n1,2,3\n").unwrap_err();
        assert!(matches!(err, EventLabError::MissingHeader(_)));
    }

    #[test]
    fn test_parse_csv_header_only() {
        let rows = parse_csv("user_id,event_type\n").unwrap();
        assert!(rows.is_empty());
    }

    // ── parse_json ────────────────────────────────────────────────────────────

    #[test]
    fn test_parse_json_rows() {
        let json = r#"[
            {"user_id": "u1", "event_type": "purchase", "revenue": 42},
            {"user_id": "u2", "event_type": "refund", "revenue": "-3.5"},
            {"user_id": "u3", "event_type": "purchase", "revenue": null}
        ]"#;
        let rows = parse_json(json).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].revenue, Some(RevenueValue::Number(42.0)));
        assert_eq!(rows[1].revenue, Some(RevenueValue::Text("-3.5".into())));
        assert!(rows[2].revenue.is_none());
    }

    #[test]
    fn test_parse_json_invalid() {
        let err = parse_json("{not json").unwrap_err();
        assert!(matches!(err, EventLabError::JsonParse(_)));
    }

    // ── load_rows ─────────────────────────────────────────────────────────────

    #[test]
    fn test_load_rows_from_csv_file() {
        let mut file = NamedTempFile::new().expect("tempfile");
        file.write_all(SAMPLE_CSV.as_bytes()).expect("write");

        let rows = load_rows(file.path(), InputFormat::Csv).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_load_rows_missing_file() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("nope.csv");

        let err = load_rows(&path, InputFormat::Csv).unwrap_err();
        match err {
            EventLabError::FileRead { path: p, .. } => assert_eq!(p, path),
            other => panic!("unexpected error: {other}"),
        }
    }
}
