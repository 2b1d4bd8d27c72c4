//! Time window engine
//!
//! As-of time travel over the session snapshot: an inclusive calendar range
//! ending on the as-of day, optionally restricted to night sleeps and to a
//! day-of-week class. The filters are independent predicates, so their
//! application order never changes the result.
//!
//! Windows are ephemeral borrowed views; nothing here copies or caches.

use chrono::{Datelike, Days, NaiveDate};

use crate::types::{SleepSession, WindowQuery};

/// Select the ordered subset of sessions matching a window query.
///
/// Returns an empty vector when nothing matches; callers treat that as "no
/// data", not as an error.
pub fn select<'a>(sessions: &'a [SleepSession], query: &WindowQuery) -> Vec<&'a SleepSession> {
    let start = window_start(query.as_of, query.lookback_days);
    sessions
        .iter()
        .filter(|s| s.date >= start && s.date <= query.as_of)
        .filter(|s| !query.night_only || s.is_night_sleep)
        .filter(|s| query.day_type.matches(s.date.weekday()))
        .collect()
}

/// The most recent night sleep on or before `as_of`.
///
/// Deliberately not windowed and blind to any day-type filter: the
/// recommendation engines always see the true latest night, regardless of the
/// lens applied to charts.
pub fn latest_night<'a>(
    sessions: &'a [SleepSession],
    as_of: NaiveDate,
) -> Option<&'a SleepSession> {
    sessions
        .iter()
        .rev()
        .find(|s| s.is_night_sleep && s.date <= as_of)
}

/// First calendar day of an inclusive lookback window ending on `as_of`
fn window_start(as_of: NaiveDate, lookback_days: u32) -> NaiveDate {
    // lookback_days = 1 means exactly the as-of day
    as_of
        .checked_sub_days(Days::new(lookback_days.saturating_sub(1) as u64))
        .unwrap_or(NaiveDate::MIN)
}
