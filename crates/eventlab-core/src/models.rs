use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::Add;

// ── Raw input ─────────────────────────────────────────────────────────────────

/// The revenue cell of a raw row, which may arrive as text (CSV) or as a
/// number (JSON / programmatic callers).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RevenueValue {
    Number(f64),
    Text(String),
}

impl RevenueValue {
    /// `true` for an empty text cell, which is treated like an absent value.
    pub fn is_blank(&self) -> bool {
        matches!(self, RevenueValue::Text(s) if s.is_empty())
    }
}

impl From<f64> for RevenueValue {
    fn from(value: f64) -> Self {
        RevenueValue::Number(value)
    }
}

impl From<&str> for RevenueValue {
    fn from(value: &str) -> Self {
        RevenueValue::Text(value.to_string())
    }
}

/// A loosely-typed event-log record as produced by the input layer.
///
/// Every field is optional and none is validated. `None` means the column was
/// absent; `Some("")` means it was present but empty, and the two are kept
/// distinct so that duplicate detection can tell them apart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revenue: Option<RevenueValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

// ── EventType ─────────────────────────────────────────────────────────────────

/// Interaction kind of a cleaned row.
///
/// Values outside the five known kinds are kept (lowercased and trimmed) in
/// [`EventType::Other`] rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventType {
    View,
    AddToCart,
    Purchase,
    Refund,
    Signup,
    /// An unrecognised event kind, passed through as-is.
    Other(String),
}

impl EventType {
    /// Build from an already-normalised (trimmed, lowercased) string.
    pub fn from_normalized(value: &str) -> Self {
        match value {
            "view" => EventType::View,
            "add_to_cart" => EventType::AddToCart,
            "purchase" => EventType::Purchase,
            "refund" => EventType::Refund,
            "signup" => EventType::Signup,
            other => EventType::Other(other.to_string()),
        }
    }

    /// The lowercase wire name of this event kind.
    pub fn as_str(&self) -> &str {
        match self {
            EventType::View => "view",
            EventType::AddToCart => "add_to_cart",
            EventType::Purchase => "purchase",
            EventType::Refund => "refund",
            EventType::Signup => "signup",
            EventType::Other(s) => s.as_str(),
        }
    }

    /// Purchases and refunds are expected to carry a revenue amount.
    pub fn is_financial(&self) -> bool {
        matches!(self, EventType::Purchase | EventType::Refund)
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, EventType::Other(_))
    }
}

impl From<String> for EventType {
    fn from(value: String) -> Self {
        EventType::from_normalized(&value.trim().to_lowercase())
    }
}

impl From<EventType> for String {
    fn from(value: EventType) -> Self {
        match value {
            EventType::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Cleaned output ────────────────────────────────────────────────────────────

/// A validated, normalised event-log record.
///
/// Only the cleaner constructs these, and only for rows that carry both a
/// user id and an event type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanedRow {
    /// Non-empty user identifier, kept exactly as supplied.
    pub user_id: String,
    pub event_type: EventType,
    /// Finite revenue amount; `0.0` when absent or unparseable.
    pub revenue: f64,
    /// Trimmed, uppercase country; `"UNKNOWN"` when absent.
    pub country: String,
    /// Trimmed, uppercase currency code; `"USD"` when absent.
    pub currency: String,
    /// Trimmed, lowercase device; `"web"` when absent.
    pub device: String,
    /// Parsed event time, or the cleaning time when absent or invalid.
    pub timestamp: DateTime<Utc>,
}

/// Counters describing what a single cleaning run changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleaningLog {
    pub duplicates_removed: u64,
    pub nulls_handled: u64,
    pub casing_fixed: u64,
    pub invalid_dropped: u64,
}

impl CleaningLog {
    /// Total number of counted events across all four categories.
    pub fn total(&self) -> u64 {
        self.duplicates_removed + self.nulls_handled + self.casing_fixed + self.invalid_dropped
    }
}

impl Add for CleaningLog {
    type Output = CleaningLog;

    fn add(self, rhs: CleaningLog) -> CleaningLog {
        CleaningLog {
            duplicates_removed: self.duplicates_removed + rhs.duplicates_removed,
            nulls_handled: self.nulls_handled + rhs.nulls_handled,
            casing_fixed: self.casing_fixed + rhs.casing_fixed,
            invalid_dropped: self.invalid_dropped + rhs.invalid_dropped,
        }
    }
}

impl Sum for CleaningLog {
    fn sum<I: Iterator<Item = CleaningLog>>(iter: I) -> CleaningLog {
        iter.fold(CleaningLog::default(), Add::add)
    }
}

// ── Aggregations ──────────────────────────────────────────────────────────────

/// Summed revenue for one country.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryRevenue {
    pub country: String,
    pub total_revenue: f64,
}

/// Headline aggregations over a cleaned dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationResults {
    /// One entry per distinct country, highest revenue first.
    pub revenue_by_country: Vec<CountryRevenue>,
    /// Average revenue per distinct user.
    pub arpu: f64,
}

/// Summed revenue for one device (display-only view).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRevenue {
    pub device: String,
    pub total_revenue: f64,
}

/// Number of cleaned rows for one event kind (display-only view).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTypeCount {
    pub event_type: EventType,
    pub count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── EventType ─────────────────────────────────────────────────────────────

    #[test]
    fn test_event_type_known_members() {
        assert_eq!(EventType::from_normalized("view"), EventType::View);
        assert_eq!(
            EventType::from_normalized("add_to_cart"),
            EventType::AddToCart
        );
        assert_eq!(EventType::from_normalized("purchase"), EventType::Purchase);
        assert_eq!(EventType::from_normalized("refund"), EventType::Refund);
        assert_eq!(EventType::from_normalized("signup"), EventType::Signup);
    }

    #[test]
    fn test_event_type_unknown_passes_through() {
        let et = EventType::from_normalized("click");
        assert_eq!(et, EventType::Other("click".to_string()));
        assert_eq!(et.as_str(), "click");
        assert!(!et.is_known());
    }

    #[test]
    fn test_event_type_from_string_folds_case() {
        assert_eq!(
            EventType::from(" PURCHASE ".to_string()),
            EventType::Purchase
        );
    }

    #[test]
    fn test_event_type_is_financial() {
        assert!(EventType::Purchase.is_financial());
        assert!(EventType::Refund.is_financial());
        assert!(!EventType::View.is_financial());
        assert!(!EventType::Other("purchase_attempt".into()).is_financial());
    }

    #[test]
    fn test_event_type_serializes_as_wire_name() {
        let json = serde_json::to_string(&EventType::AddToCart).unwrap();
        assert_eq!(json, "\"add_to_cart\"");
        let other = serde_json::to_string(&EventType::Other("click".into())).unwrap();
        assert_eq!(other, "\"click\"");
    }

    // ── RawRow ────────────────────────────────────────────────────────────────

    #[test]
    fn test_raw_row_revenue_accepts_number_and_text() {
        let row: RawRow =
            serde_json::from_str(r#"{"user_id":"u1","revenue":12.5}"#).unwrap();
        assert_eq!(row.revenue, Some(RevenueValue::Number(12.5)));

        let row: RawRow =
            serde_json::from_str(r#"{"user_id":"u1","revenue":"12.5"}"#).unwrap();
        assert_eq!(row.revenue, Some(RevenueValue::Text("12.5".into())));

        let row: RawRow = serde_json::from_str(r#"{"user_id":"u1","revenue":null}"#).unwrap();
        assert_eq!(row.revenue, None);
    }

    #[test]
    fn test_raw_row_serialization_distinguishes_absent_and_empty() {
        let absent = RawRow {
            user_id: Some("u1".into()),
            ..Default::default()
        };
        let empty = RawRow {
            user_id: Some("u1".into()),
            country: Some(String::new()),
            ..Default::default()
        };
        assert_ne!(
            serde_json::to_string(&absent).unwrap(),
            serde_json::to_string(&empty).unwrap()
        );
    }

    #[test]
    fn test_revenue_value_is_blank() {
        assert!(RevenueValue::from("").is_blank());
        assert!(!RevenueValue::from(" ").is_blank());
        assert!(!RevenueValue::from(0.0).is_blank());
    }

    // ── CleaningLog ───────────────────────────────────────────────────────────

    #[test]
    fn test_cleaning_log_sum() {
        let deltas = vec![
            CleaningLog {
                nulls_handled: 1,
                ..Default::default()
            },
            CleaningLog {
                casing_fixed: 1,
                ..Default::default()
            },
            CleaningLog {
                nulls_handled: 1,
                casing_fixed: 1,
                ..Default::default()
            },
        ];
        let total: CleaningLog = deltas.into_iter().sum();
        assert_eq!(total.nulls_handled, 2);
        assert_eq!(total.casing_fixed, 2);
        assert_eq!(total.duplicates_removed, 0);
        assert_eq!(total.total(), 4);
    }

    #[test]
    fn test_cleaning_log_camel_case_fields() {
        let json = serde_json::to_value(CleaningLog::default()).unwrap();
        assert!(json.get("duplicatesRemoved").is_some());
        assert!(json.get("nullsHandled").is_some());
        assert!(json.get("casingFixed").is_some());
        assert!(json.get("invalidDropped").is_some());
    }

    #[test]
    fn test_aggregation_results_camel_case_fields() {
        let results = AggregationResults {
            revenue_by_country: vec![CountryRevenue {
                country: "USA".into(),
                total_revenue: 1.0,
            }],
            arpu: 1.0,
        };
        let json = serde_json::to_value(&results).unwrap();
        assert_eq!(json["revenueByCountry"][0]["totalRevenue"], 1.0);
        assert_eq!(json["arpu"], 1.0);
    }
}
