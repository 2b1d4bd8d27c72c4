//! Core types for the sleep analytics pipeline
//!
//! This module defines the data that flows through each stage: raw rows from
//! the loader, normalized sessions with derived fields, window queries, and
//! the report types consumed by the presentation layer.
//!
//! Metrics that can be undefined (zero denominator, absent score) are
//! `Option<f64>`: `None` is the explicit undefined sentinel and propagates
//! through aggregation instead of turning into 0 or NaN.

use chrono::{NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};

/// One row of the input table, parsed but not yet derived/sorted
#[derive(Debug, Clone, PartialEq)]
pub struct RawSessionRow {
    pub date: NaiveDate,
    pub week_day: String,
    pub is_night_sleep: bool,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub duration_min: f64,
    pub minutes_asleep: f64,
    pub minutes_awake: f64,
    pub deep_minutes: f64,
    pub light_minutes: f64,
    pub rem_minutes: f64,
    /// Quality score 0-100; absent or unparsable for naps
    pub overall_score: Option<f64>,
    pub resting_heart_rate: f64,
}

/// One sleep session (night sleep or nap) with eagerly computed derived fields.
///
/// Immutable once produced by the normalizer. The `date` is the calendar day
/// the session ends on, which keeps cross-midnight sessions unambiguous.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepSession {
    pub date: NaiveDate,
    /// Day name, redundant with `date`, carried for display only
    pub week_day: String,
    pub is_night_sleep: bool,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    /// Total time in bed (minutes)
    pub duration_min: f64,
    pub minutes_asleep: f64,
    pub minutes_awake: f64,
    pub deep_minutes: f64,
    pub light_minutes: f64,
    pub rem_minutes: f64,
    pub overall_score: Option<f64>,
    pub resting_heart_rate: f64,
    /// Fractional hour of day the session started, [0, 24)
    pub start_hour: f64,
    /// Fractional hour of day the session ended, [0, 24)
    pub end_hour: f64,
    /// minutes_asleep / duration_min; `None` when duration is zero
    pub efficiency: Option<f64>,
    /// deep_minutes / minutes_asleep; `None` when no sleep was recorded
    pub deep_pct: Option<f64>,
    /// rem_minutes / minutes_asleep; `None` when no sleep was recorded
    pub rem_pct: Option<f64>,
    /// minutes_awake / duration_min; `None` when duration is zero
    pub awake_pct: Option<f64>,
    pub sleep_hours: f64,
}

/// Day-of-week filter applied to windowed views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayType {
    #[default]
    All,
    Weekdays,
    Weekends,
}

impl DayType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DayType::All => "All",
            DayType::Weekdays => "Weekdays",
            DayType::Weekends => "Weekends",
        }
    }

    /// Whether a weekday belongs to this day class
    pub fn matches(&self, weekday: Weekday) -> bool {
        match self {
            DayType::All => true,
            DayType::Weekdays => weekday.number_from_monday() <= 5,
            DayType::Weekends => weekday.number_from_monday() >= 6,
        }
    }
}

/// An as-of time-travel window over the session snapshot.
///
/// Constructed fresh per query; selects the inclusive calendar range
/// `[as_of - (lookback_days - 1), as_of]`, so `lookback_days = 1` is exactly
/// the as-of day and the whole as-of day is always included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowQuery {
    pub as_of: NaiveDate,
    pub lookback_days: u32,
    pub day_type: DayType,
    pub night_only: bool,
}

impl WindowQuery {
    pub fn new(as_of: NaiveDate, lookback_days: u32) -> Self {
        Self {
            as_of,
            lookback_days,
            day_type: DayType::All,
            night_only: false,
        }
    }

    pub fn day_type(mut self, day_type: DayType) -> Self {
        self.day_type = day_type;
        self
    }

    pub fn night_only(mut self, night_only: bool) -> Self {
        self.night_only = night_only;
        self
    }
}

/// Nap recommendation for the day after a given night.
///
/// Callers receive `Option<NapAdvice>`: `None` means "no last night, no
/// recommendation possible" and must render differently from `No`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "lowercase")]
pub enum NapAdvice {
    No,
    Yes { minutes: u32 },
}

impl NapAdvice {
    pub fn decision(&self) -> &'static str {
        match self {
            NapAdvice::No => "No",
            NapAdvice::Yes { .. } => "Yes",
        }
    }

    pub fn minutes(&self) -> u32 {
        match self {
            NapAdvice::No => 0,
            NapAdvice::Yes { minutes } => *minutes,
        }
    }
}

/// Named boolean rules that can fire for a bad night
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    LateBedtime,
    ShortSleep,
    LowEfficiency,
    WokeUpALot,
    HighRestingHr,
    LowDeepSleep,
    /// Catch-all for bad nights where no specific signal fired
    Other,
}

impl SignalKind {
    /// Declaration order; doubles as the deterministic tie-break for ranking
    pub const ALL: [SignalKind; 7] = [
        SignalKind::LateBedtime,
        SignalKind::ShortSleep,
        SignalKind::LowEfficiency,
        SignalKind::WokeUpALot,
        SignalKind::HighRestingHr,
        SignalKind::LowDeepSleep,
        SignalKind::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SignalKind::LateBedtime => "Late bedtime",
            SignalKind::ShortSleep => "Short sleep",
            SignalKind::LowEfficiency => "Low efficiency",
            SignalKind::WokeUpALot => "Woke up a lot",
            SignalKind::HighRestingHr => "High resting heart rate",
            SignalKind::LowDeepSleep => "Low deep sleep",
            SignalKind::Other => "Other / unclear",
        }
    }
}

/// One ranked row of the Pareto table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParetoRow {
    pub signal: SignalKind,
    pub count: usize,
    pub cumulative_count: usize,
    /// Running share of total tallies, in [0, 1]
    pub cumulative_share: f64,
}

/// Ranked signal tallies for the bad nights of a window.
///
/// `rows` is empty when the window had no bad nights; that is a valid result,
/// not an error.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParetoReport {
    pub rows: Vec<ParetoRow>,
    pub bad_days: usize,
    pub total_days: usize,
}

/// Rolling-window KPI statistics.
///
/// Means exclude undefined values; a metric undefined for the whole window
/// (or an empty window) is `None`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WindowSummary {
    pub sessions: usize,
    pub nights: usize,
    pub avg_score: Option<f64>,
    pub avg_sleep_hours: Option<f64>,
    pub avg_efficiency: Option<f64>,
    pub avg_deep_pct: Option<f64>,
    pub avg_resting_hr: Option<f64>,
}

/// Bedtime suggestion in both machine and display form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BedtimeSuggestion {
    /// Suggested bedtime as a fractional hour in [0, 24)
    pub hour: f64,
    /// `HH:MM` rendering of `hour`
    pub display: String,
}

/// Complete analytics output for one window query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompassReport {
    pub producer: String,
    pub version: String,
    pub as_of: NaiveDate,
    pub lookback_days: u32,
    pub day_type: DayType,
    pub summary: WindowSummary,
    /// `None` when there is no last night to base a suggestion on
    pub bedtime: Option<BedtimeSuggestion>,
    /// `None` when there is no last night; distinct from `Some(No)`
    pub nap: Option<NapAdvice>,
    pub pareto: ParetoReport,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_day_type_matches() {
        assert!(DayType::All.matches(Weekday::Mon));
        assert!(DayType::All.matches(Weekday::Sun));
        assert!(DayType::Weekdays.matches(Weekday::Fri));
        assert!(!DayType::Weekdays.matches(Weekday::Sat));
        assert!(DayType::Weekends.matches(Weekday::Sat));
        assert!(!DayType::Weekends.matches(Weekday::Mon));
    }

    #[test]
    fn test_nap_advice_accessors() {
        assert_eq!(NapAdvice::No.decision(), "No");
        assert_eq!(NapAdvice::No.minutes(), 0);
        let yes = NapAdvice::Yes { minutes: 45 };
        assert_eq!(yes.decision(), "Yes");
        assert_eq!(yes.minutes(), 45);
    }

    #[test]
    fn test_nap_advice_serialization() {
        let json = serde_json::to_string(&NapAdvice::Yes { minutes: 35 }).unwrap();
        assert_eq!(json, r#"{"decision":"yes","minutes":35}"#);
        let json = serde_json::to_string(&NapAdvice::No).unwrap();
        assert_eq!(json, r#"{"decision":"no"}"#);
    }

    #[test]
    fn test_signal_labels() {
        assert_eq!(SignalKind::WokeUpALot.label(), "Woke up a lot");
        assert_eq!(SignalKind::Other.label(), "Other / unclear");
        // Every variant is listed exactly once
        assert_eq!(SignalKind::ALL.len(), 7);
    }

    #[test]
    fn test_window_query_builder() {
        let as_of = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();
        let query = WindowQuery::new(as_of, 30)
            .day_type(DayType::Weekends)
            .night_only(true);
        assert_eq!(query.lookback_days, 30);
        assert_eq!(query.day_type, DayType::Weekends);
        assert!(query.night_only);
    }
}
