//! Record normalization
//!
//! Turns raw rows into [`SleepSession`] values with every derived field
//! computed once, up front. Call sites never recompute ratios; they read the
//! session. Divisions with a zero denominator produce `None`, never 0 and
//! never NaN.

use crate::timeutil::hour_of_day;
use crate::types::{RawSessionRow, SleepSession};

/// Normalizer for raw sleep log rows
pub struct Normalizer;

impl Normalizer {
    /// Normalize a batch of raw rows into sessions sorted ascending by start time
    pub fn normalize(rows: Vec<RawSessionRow>) -> Vec<SleepSession> {
        let mut sessions: Vec<SleepSession> = rows.into_iter().map(normalize_row).collect();
        sessions.sort_by_key(|s| s.start_time);
        sessions
    }
}

fn normalize_row(row: RawSessionRow) -> SleepSession {
    SleepSession {
        start_hour: hour_of_day(&row.start_time),
        end_hour: hour_of_day(&row.end_time),
        efficiency: ratio(row.minutes_asleep, row.duration_min),
        deep_pct: ratio(row.deep_minutes, row.minutes_asleep),
        rem_pct: ratio(row.rem_minutes, row.minutes_asleep),
        awake_pct: ratio(row.minutes_awake, row.duration_min),
        sleep_hours: row.minutes_asleep / 60.0,
        date: row.date,
        week_day: row.week_day,
        is_night_sleep: row.is_night_sleep,
        start_time: row.start_time,
        end_time: row.end_time,
        duration_min: row.duration_min,
        minutes_asleep: row.minutes_asleep,
        minutes_awake: row.minutes_awake,
        deep_minutes: row.deep_minutes,
        light_minutes: row.light_minutes,
        rem_minutes: row.rem_minutes,
        overall_score: row.overall_score,
        resting_heart_rate: row.resting_heart_rate,
    }
}

/// Guarded division: `None` when the denominator is not positive
fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator > 0.0 {
        Some(numerator / denominator)
    } else {
        None
    }
}
