//! Rolling-window KPI statistics
//!
//! The quick-stats row over a windowed view: mean score, sleep hours,
//! efficiency, deep share, and resting heart rate. Undefined per-session
//! values are excluded from the means; an empty window (or a metric undefined
//! throughout) yields `None`, which displays as an em dash.

use crate::types::{SleepSession, WindowSummary};

/// Summarize a windowed, ordered set of sessions
pub fn summarize(windowed: &[&SleepSession]) -> WindowSummary {
    WindowSummary {
        sessions: windowed.len(),
        nights: windowed.iter().filter(|s| s.is_night_sleep).count(),
        avg_score: mean_defined(windowed.iter().map(|s| s.overall_score)),
        avg_sleep_hours: mean(windowed.iter().map(|s| s.sleep_hours)),
        avg_efficiency: mean_defined(windowed.iter().map(|s| s.efficiency)),
        avg_deep_pct: mean_defined(windowed.iter().map(|s| s.deep_pct)),
        avg_resting_hr: mean(windowed.iter().map(|s| s.resting_heart_rate)),
    }
}

fn mean_defined(values: impl Iterator<Item = Option<f64>>) -> Option<f64> {
    mean(values.flatten())
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let mut sum = 0.0;
    let mut count = 0usize;
    for value in values {
        sum += value;
        count += 1;
    }
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}
