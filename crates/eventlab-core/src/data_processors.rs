use std::sync::OnceLock;

use chrono::{DateTime, TimeZone, Utc};
use regex::Regex;
use tracing::debug;

use crate::models::RevenueValue;

// ── TimestampProcessor ────────────────────────────────────────────────────────

/// Parses the timestamp column of an event log.
pub struct TimestampProcessor;

impl TimestampProcessor {
    /// Attempt to parse `s` into a UTC [`DateTime`].
    ///
    /// Handles RFC 3339 / ISO 8601 (including `Z`-suffix), RFC 2822 and a
    /// handful of common naive date-time patterns, which are read as UTC.
    /// Returns `None` for empty or unrecognised input.
    pub fn parse(s: &str) -> Option<DateTime<Utc>> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }

        // Replace trailing 'Z' with '+00:00' for RFC 3339 compatibility.
        let normalised = if let Some(stripped) = s.strip_suffix('Z') {
            format!("{}+00:00", stripped)
        } else {
            s.to_string()
        };

        if let Ok(dt) = DateTime::parse_from_rfc3339(&normalised) {
            return Some(dt.with_timezone(&Utc));
        }

        if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
            return Some(dt.with_timezone(&Utc));
        }

        const FORMATS: &[&str] = &[
            "%Y-%m-%dT%H:%M:%S%.f",
            "%Y-%m-%dT%H:%M",
            "%Y-%m-%d %H:%M:%S%.f",
            "%Y-%m-%d %H:%M",
            "%Y/%m/%d %H:%M:%S",
            "%m/%d/%Y %H:%M:%S",
            "%Y-%m-%d",
            "%Y/%m/%d",
            "%m/%d/%Y",
        ];

        for fmt in FORMATS {
            if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(s, fmt) {
                return Some(Utc.from_utc_datetime(&naive));
            }
            if let Ok(date) = chrono::NaiveDate::parse_from_str(s, fmt) {
                let naive = date.and_hms_opt(0, 0, 0)?;
                return Some(Utc.from_utc_datetime(&naive));
            }
        }

        debug!("could not parse timestamp \"{}\"", s);
        None
    }

    /// Parse `raw` when present and valid, otherwise return `fallback`.
    pub fn parse_or(raw: Option<&str>, fallback: DateTime<Utc>) -> DateTime<Utc> {
        raw.and_then(Self::parse).unwrap_or(fallback)
    }
}

// ── RevenueProcessor ──────────────────────────────────────────────────────────

/// Result of coercing a raw revenue cell into a number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Revenue {
    /// A finite amount was read.
    Parsed(f64),
    /// The cell was absent, null, or empty.
    Missing,
    /// The cell had content that is not a finite number.
    Invalid,
}

impl Revenue {
    /// The amount to store on a cleaned row; `0.0` unless parsed.
    pub fn amount(self) -> f64 {
        match self {
            Revenue::Parsed(v) => v,
            Revenue::Missing | Revenue::Invalid => 0.0,
        }
    }
}

fn numeric_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[+-]?(?:Infinity|(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?)")
            .expect("regex is valid")
    })
}

/// Coerces the string-or-number revenue column.
pub struct RevenueProcessor;

impl RevenueProcessor {
    /// Coerce a raw revenue value.
    ///
    /// Numbers pass through. Text is read with float-prefix semantics:
    /// leading whitespace is skipped and the longest numeric prefix wins, so
    /// `"120.50"` and `"12abc"` both parse while `"abc"` and `"  "` do not.
    /// Non-finite results are [`Revenue::Invalid`].
    pub fn coerce(value: Option<&RevenueValue>) -> Revenue {
        match value {
            None => Revenue::Missing,
            Some(v) if v.is_blank() => Revenue::Missing,
            Some(RevenueValue::Number(n)) => Self::finite(*n),
            Some(RevenueValue::Text(s)) => match Self::parse_text(s) {
                Some(n) => Self::finite(n),
                None => Revenue::Invalid,
            },
        }
    }

    fn parse_text(s: &str) -> Option<f64> {
        let m = numeric_prefix().find(s.trim_start())?;
        let literal = m.as_str();
        // Rust spells it "inf"; the sign is kept so the caller can reject it.
        if let Some(sign) = literal.strip_suffix("Infinity") {
            return Some(if sign == "-" {
                f64::NEG_INFINITY
            } else {
                f64::INFINITY
            });
        }
        literal.parse::<f64>().ok()
    }

    fn finite(n: f64) -> Revenue {
        if n.is_finite() {
            Revenue::Parsed(n)
        } else {
            Revenue::Invalid
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
