//! Sleep log ingestion
//!
//! Parses the raw sleep CSV into typed rows. The required column set is
//! verified against the header before any row is parsed: a missing column is
//! a fatal schema error. Within rows the tolerance is asymmetric — a required
//! date/timestamp/number that fails to parse fails the whole load, while the
//! optional `overall_score` degrades to `None` for that row. Extra columns
//! are ignored.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::AnalyticsError;
use crate::types::RawSessionRow;

/// Exact column set every input table must carry
pub const REQUIRED_COLUMNS: [&str; 14] = [
    "date",
    "week_day",
    "is_night_sleep",
    "start_time",
    "end_time",
    "duration_min",
    "minutes_asleep",
    "minutes_awake",
    "efficiency",
    "deep_minutes",
    "light_minutes",
    "rem_minutes",
    "overall_score",
    "resting_heart_rate",
];

/// Loader for the sleep session CSV table
pub struct SleepLogLoader;

impl SleepLogLoader {
    /// Load and parse a sleep log from a file path
    pub fn load_path<P: AsRef<Path>>(path: P) -> Result<Vec<RawSessionRow>, AnalyticsError> {
        let file = std::fs::File::open(path)?;
        Self::load_reader(file)
    }

    /// Load and parse a sleep log from any reader
    pub fn load_reader<R: Read>(reader: R) -> Result<Vec<RawSessionRow>, AnalyticsError> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        let index: HashMap<&str, usize> =
            headers.iter().enumerate().map(|(i, h)| (h, i)).collect();

        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|c| !index.contains_key(c))
            .collect();
        if !missing.is_empty() {
            return Err(AnalyticsError::MissingColumns(missing.join(", ")));
        }

        let mut rows = Vec::new();
        for (i, record) in rdr.records().enumerate() {
            let record = record?;
            // Header occupies line 1, so data row i is line i + 2
            let row_no = i + 2;
            let field = |name: &str| record.get(index[name]).unwrap_or("");

            rows.push(RawSessionRow {
                date: parse_date(row_no, "date", field("date"))?,
                week_day: field("week_day").to_string(),
                is_night_sleep: parse_bool(row_no, "is_night_sleep", field("is_night_sleep"))?,
                start_time: parse_timestamp(row_no, "start_time", field("start_time"))?,
                end_time: parse_timestamp(row_no, "end_time", field("end_time"))?,
                duration_min: parse_f64(row_no, "duration_min", field("duration_min"))?,
                minutes_asleep: parse_f64(row_no, "minutes_asleep", field("minutes_asleep"))?,
                minutes_awake: parse_f64(row_no, "minutes_awake", field("minutes_awake"))?,
                deep_minutes: parse_f64(row_no, "deep_minutes", field("deep_minutes"))?,
                light_minutes: parse_f64(row_no, "light_minutes", field("light_minutes"))?,
                rem_minutes: parse_f64(row_no, "rem_minutes", field("rem_minutes"))?,
                overall_score: field("overall_score").parse::<f64>().ok(),
                resting_heart_rate: parse_f64(
                    row_no,
                    "resting_heart_rate",
                    field("resting_heart_rate"),
                )?,
            });
        }

        Ok(rows)
    }
}

fn parse_f64(row: usize, field: &'static str, value: &str) -> Result<f64, AnalyticsError> {
    value.parse::<f64>().map_err(|_| AnalyticsError::Parse {
        row,
        field,
        value: value.to_string(),
    })
}

fn parse_date(row: usize, field: &'static str, value: &str) -> Result<NaiveDate, AnalyticsError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| AnalyticsError::Parse {
        row,
        field,
        value: value.to_string(),
    })
}

/// Timestamps appear as ISO 8601 with or without fractional seconds, and
/// occasionally with a space separator instead of `T`
fn parse_timestamp(
    row: usize,
    field: &'static str,
    value: &str,
) -> Result<NaiveDateTime, AnalyticsError> {
    const FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ];
    for format in FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(ts);
        }
    }
    Err(AnalyticsError::Parse {
        row,
        field,
        value: value.to_string(),
    })
}

/// Accept the truthy/falsy encodings seen in exported logs
fn parse_bool(row: usize, field: &'static str, value: &str) -> Result<bool, AnalyticsError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "1" => Ok(true),
        "false" | "f" | "no" | "n" | "0" => Ok(false),
        _ => Err(AnalyticsError::Parse {
            row,
            field,
            value: value.to_string(),
        }),
    }
}
