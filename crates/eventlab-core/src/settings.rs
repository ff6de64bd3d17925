use clap::Parser;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{EventLabError, Result};

// ── InputFormat ────────────────────────────────────────────────────────────────

/// On-disk encoding of an event-log dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// Comma-separated text with a header row.
    Csv,
    /// A JSON array of row objects.
    Json,
}

impl InputFormat {
    /// Pick a format from a file extension; anything but `.json` is CSV.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => InputFormat::Json,
            _ => InputFormat::Csv,
        }
    }

    /// Parse a `--input-format` value, resolving `"auto"` against `path`.
    pub fn resolve(value: &str, path: &Path) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::from_path(path)),
            "csv" => Ok(InputFormat::Csv),
            "json" => Ok(InputFormat::Json),
            other => Err(EventLabError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputFormat::Csv => f.write_str("csv"),
            InputFormat::Json => f.write_str("json"),
        }
    }
}

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Clean an event-log CSV and report revenue aggregations
#[derive(Parser, Debug, Clone)]
#[command(
    name = "eventlab",
    about = "Clean an event-log CSV and report revenue aggregations",
    version
)]
pub struct Settings {
    /// Dataset to load (CSV with a header row, or a JSON array of rows)
    #[arg(env = "EVENTLAB_INPUT")]
    pub input: PathBuf,

    /// Input encoding
    #[arg(long, env = "EVENTLAB_INPUT_FORMAT", default_value = "auto", value_parser = ["auto", "csv", "json"])]
    pub input_format: String,

    /// Report output format
    #[arg(long, env = "EVENTLAB_FORMAT", default_value = "text", value_parser = ["text", "json"])]
    pub format: String,

    /// Number of cleaned rows to preview (0-1000)
    #[arg(long, env = "EVENTLAB_PREVIEW_ROWS", default_value = "10", value_parser = clap::value_parser!(u16).range(0..=1000))]
    pub preview_rows: u16,

    /// Number of countries shown in the revenue table
    #[arg(long, env = "EVENTLAB_TOP_COUNTRIES", default_value = "8", value_parser = clap::value_parser!(u16).range(1..))]
    pub top_countries: u16,

    /// Logging level
    #[arg(long, env = "EVENTLAB_LOG_LEVEL", default_value = "WARNING", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Settings {
    /// Parse the process arguments and apply flag overrides.
    pub fn load() -> Self {
        Self::load_from_args(std::env::args_os())
    }

    /// Same as [`Settings::load`] but accepts an explicit argument list.
    pub fn load_from_args<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let mut settings = Settings::parse_from(args);
        // --debug overrides log level.
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }

    /// The concrete input encoding for [`Settings::input`].
    pub fn resolved_input_format(&self) -> Result<InputFormat> {
        InputFormat::resolve(&self.input_format, &self.input)
    }

    pub fn wants_json(&self) -> bool {
        self.format == "json"
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
