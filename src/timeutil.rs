//! Shared time-of-day utilities
//!
//! Bedtimes cluster around midnight, so plain hour-of-day comparisons break
//! across the day boundary (01:00 would sort before 23:00). The
//! "night-continuous" wrap fixes this: any hour before noon is treated as
//! belonging to the previous evening's night and shifted by +24, making
//! cross-midnight comparisons monotonic. Noon is the single wrap boundary
//! for every bedtime-based computation in this crate.

use chrono::{NaiveDateTime, Timelike};

/// Hour below which a time is considered part of the previous night
pub const NIGHT_WRAP_BOUNDARY_HOUR: f64 = 12.0;

/// Fractional hour of day in [0, 24), minute resolution
pub fn hour_of_day(ts: &NaiveDateTime) -> f64 {
    ts.hour() as f64 + ts.minute() as f64 / 60.0
}

/// Map an hour of day onto the night-continuous timeline.
///
/// Hours before noon are shifted to the next day (+24), so 01:15 becomes
/// 25.25 while 23:30 stays 23.5.
pub fn wrap_to_night(hour: f64) -> f64 {
    if hour < NIGHT_WRAP_BOUNDARY_HOUR {
        hour + 24.0
    } else {
        hour
    }
}

/// Inverse of [`wrap_to_night`]: map a wrapped hour back into [0, 24)
pub fn unwrap_hour(wrapped: f64) -> f64 {
    if wrapped >= 24.0 {
        wrapped - 24.0
    } else {
        wrapped
    }
}

/// Format a fractional hour as `HH:MM`, rounding to the nearest minute
pub fn format_hour_hhmm(hour: f64) -> String {
    let total_minutes = (hour * 60.0).round() as i64 % (24 * 60);
    format!("{:02}:{:02}", total_minutes / 60, total_minutes % 60)
}

/// Render an optional metric, using an em dash for undefined values
pub fn format_opt(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", precision, v),
        None => "—".to_string(),
    }
}
