//! Bad-night signal analyzer
//!
//! Aggregates a windowed set of night records to one row per calendar day,
//! selects the bad days by score, evaluates a fixed set of boolean signals
//! per bad day, and produces the ranked tally with a cumulative-share curve.
//!
//! Two signals are window-relative rather than absolute: "woke up a lot" and
//! "high resting heart rate" compare each day against the 75th percentile of
//! the whole windowed period, so "bad" means bad against the person's own
//! recent baseline for those two.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::timeutil::wrap_to_night;
use crate::types::{ParetoReport, ParetoRow, SignalKind, SleepSession};

/// Thresholds for bad-night selection and the signal rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParetoConfig {
    /// A day whose mean score is at or below this is a bad night
    pub score_threshold: f64,
    /// Percentile level for the window-relative thresholds
    pub percentile: f64,
    /// Wrapped bedtime hour at or past which "late bedtime" fires (26.0 = 02:00)
    pub late_bedtime_wrapped: f64,
    /// Total sleep below this fires "short sleep"
    pub short_sleep_hours: f64,
    /// Mean efficiency below this fires "low efficiency"
    pub low_efficiency: f64,
    /// Awake fraction of time in bed at or past this fires "woke up a lot"
    pub high_awake_fraction: f64,
    /// Mean deep-sleep share below this fires "low deep sleep"
    pub low_deep_pct: f64,
}

impl Default for ParetoConfig {
    fn default() -> Self {
        Self {
            score_threshold: 75.0,
            percentile: 0.75,
            late_bedtime_wrapped: 26.0,
            short_sleep_hours: 7.0,
            low_efficiency: 0.85,
            high_awake_fraction: 0.15,
            low_deep_pct: 0.12,
        }
    }
}

/// One calendar day of aggregated night records.
///
/// Minutes are summed, rate-like fields are averaged; the aggregation
/// protects the analysis against duplicate or partial entries for one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyNightRow {
    pub date: NaiveDate,
    pub duration_min: f64,
    pub minutes_asleep: f64,
    pub minutes_awake: f64,
    /// Mean wrapped bedtime hour of the day's records
    pub bedtime_wrapped: f64,
    pub efficiency: Option<f64>,
    pub deep_pct: Option<f64>,
    pub overall_score: Option<f64>,
    pub resting_heart_rate: f64,
}

/// Collapse windowed night records into one ordered row per calendar day
pub fn aggregate_daily(nights: &[&SleepSession]) -> Vec<DailyNightRow> {
    let mut by_date: BTreeMap<NaiveDate, Vec<&SleepSession>> = BTreeMap::new();
    for session in nights {
        by_date.entry(session.date).or_default().push(*session);
    }

    by_date
        .into_iter()
        .map(|(date, records)| DailyNightRow {
            date,
            duration_min: records.iter().map(|s| s.duration_min).sum(),
            minutes_asleep: records.iter().map(|s| s.minutes_asleep).sum(),
            minutes_awake: records.iter().map(|s| s.minutes_awake).sum(),
            bedtime_wrapped: mean(records.iter().map(|s| wrap_to_night(s.start_hour)))
                .unwrap_or(f64::NAN),
            efficiency: mean_defined(records.iter().map(|s| s.efficiency)),
            deep_pct: mean_defined(records.iter().map(|s| s.deep_pct)),
            overall_score: mean_defined(records.iter().map(|s| s.overall_score)),
            resting_heart_rate: mean(records.iter().map(|s| s.resting_heart_rate))
                .unwrap_or(f64::NAN),
        })
        .collect()
}

/// Analyze a windowed set of night records into a ranked signal table.
///
/// An empty window, or a window with no bad days, yields an empty report:
/// `rows` is empty and `bad_days` is zero, never an error.
pub fn analyze(nights: &[&SleepSession], config: &ParetoConfig) -> ParetoReport {
    let days = aggregate_daily(nights);
    let total_days = days.len();

    // Relative thresholds are computed over the entire windowed period,
    // not just the bad days
    let rhr_threshold = percentile(
        days.iter().map(|d| d.resting_heart_rate).collect(),
        config.percentile,
    );
    let awake_threshold = percentile(
        days.iter().map(|d| d.minutes_awake).collect(),
        config.percentile,
    );

    let bad_days: Vec<&DailyNightRow> = days
        .iter()
        .filter(|d| {
            d.overall_score
                .is_some_and(|score| score <= config.score_threshold)
        })
        .collect();

    let mut counts = [0usize; 7];
    for day in &bad_days {
        let fired = signals_for(day, config, rhr_threshold, awake_threshold);
        if fired.is_empty() {
            counts[SignalKind::Other as usize] += 1;
        } else {
            for signal in fired {
                counts[signal as usize] += 1;
            }
        }
    }

    let mut ranked: Vec<(SignalKind, usize)> = SignalKind::ALL
        .iter()
        .map(|&signal| (signal, counts[signal as usize]))
        .filter(|&(_, count)| count > 0)
        .collect();
    // Stable sort keeps declaration order as the tie-break, so identical
    // inputs always produce identical tables
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    let total_tallies: usize = ranked.iter().map(|&(_, count)| count).sum();
    let mut cumulative = 0usize;
    let rows = ranked
        .into_iter()
        .map(|(signal, count)| {
            cumulative += count;
            ParetoRow {
                signal,
                count,
                cumulative_count: cumulative,
                cumulative_share: cumulative as f64 / total_tallies as f64,
            }
        })
        .collect();

    ParetoReport {
        rows,
        bad_days: bad_days.len(),
        total_days,
    }
}

/// Evaluate the six signal rules for one bad day.
///
/// Each rule fires at most once per day; a day with none is later tallied
/// under the catch-all bucket.
fn signals_for(
    day: &DailyNightRow,
    config: &ParetoConfig,
    rhr_threshold: Option<f64>,
    awake_threshold: Option<f64>,
) -> Vec<SignalKind> {
    let mut fired = Vec::new();

    if day.bedtime_wrapped >= config.late_bedtime_wrapped {
        fired.push(SignalKind::LateBedtime);
    }

    if day.minutes_asleep / 60.0 < config.short_sleep_hours {
        fired.push(SignalKind::ShortSleep);
    }

    if day
        .efficiency
        .is_some_and(|eff| eff < config.low_efficiency)
    {
        fired.push(SignalKind::LowEfficiency);
    }

    // Either condition fires the signal: at/above the window's percentile, or
    // a large awake share of time in bed
    let awake_vs_window = awake_threshold.is_some_and(|t| day.minutes_awake >= t);
    let awake_fraction = day.duration_min > 0.0
        && day.minutes_awake / day.duration_min >= config.high_awake_fraction;
    if awake_vs_window || awake_fraction {
        fired.push(SignalKind::WokeUpALot);
    }

    if rhr_threshold.is_some_and(|t| day.resting_heart_rate >= t) {
        fired.push(SignalKind::HighRestingHr);
    }

    if day.deep_pct.is_some_and(|deep| deep < config.low_deep_pct) {
        fired.push(SignalKind::LowDeepSleep);
    }

    fired
}

/// Percentile with linear interpolation between closest ranks
fn percentile(mut values: Vec<f64>, level: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let rank = level.clamp(0.0, 1.0) * (values.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        return Some(values[lower]);
    }
    let weight = rank - lower as f64;
    Some(values[lower] * (1.0 - weight) + values[upper] * weight)
}

/// Mean of defined values; `None` when every value is undefined
fn mean_defined(values: impl Iterator<Item = Option<f64>>) -> Option<f64> {
    mean(values.flatten())
}

/// Mean of an iterator; `None` when it is empty
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

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct NightParams {
        day: u32,
        start_hour: f64,
        minutes_asleep: f64,
        minutes_awake: f64,
        resting_hr: f64,
        score: f64,
        deep_frac: f64,
    }

    fn night(p: NightParams) -> SleepSession {
        let date = NaiveDate::from_ymd_opt(2025, 6, p.day).unwrap();
        let duration = p.minutes_asleep + p.minutes_awake;
        let deep = p.minutes_asleep * p.deep_frac;
        let rem = p.minutes_asleep * 0.22;
        SleepSession {
            date,
            week_day: date.format("%A").to_string(),
            is_night_sleep: true,
            start_time: date.and_hms_opt(0, 0, 0).unwrap(),
            end_time: date.and_hms_opt(9, 0, 0).unwrap(),
            duration_min: duration,
            minutes_asleep: p.minutes_asleep,
            minutes_awake: p.minutes_awake,
            deep_minutes: deep,
            light_minutes: p.minutes_asleep - deep - rem,
            rem_minutes: rem,
            overall_score: Some(p.score),
            resting_heart_rate: p.resting_hr,
            start_hour: p.start_hour,
            end_hour: 9.0,
            efficiency: if duration > 0.0 {
                Some(p.minutes_asleep / duration)
            } else {
                None
            },
            deep_pct: if p.minutes_asleep > 0.0 {
                Some(p.deep_frac)
            } else {
                None
            },
            rem_pct: Some(0.22),
            awake_pct: if duration > 0.0 {
                Some(p.minutes_awake / duration)
            } else {
                None
            },
            sleep_hours: p.minutes_asleep / 60.0,
        }
    }

    /// A healthy night that is not bad and keeps the relative thresholds high
    fn good_night(day: u32) -> SleepSession {
        night(NightParams {
            day,
            start_hour: 23.5,
            minutes_asleep: 450.0,
            minutes_awake: 80.0,
            resting_hr: 62.0,
            score: 90.0,
            deep_frac: 0.18,
        })
    }

    /// A bad night whose only abnormality is short sleep
    fn short_sleep_night(day: u32) -> SleepSession {
        night(NightParams {
            day,
            start_hour: 23.5,
            minutes_asleep: 390.0,
            minutes_awake: 30.0,
            resting_hr: 50.0,
            score: 70.0,
            deep_frac: 0.15,
        })
    }

    fn refs(sessions: &[SleepSession]) -> Vec<&SleepSession> {
        sessions.iter().collect()
    }

    #[test]
    fn test_percentile_interpolation() {
        assert_eq!(percentile(vec![1.0, 2.0, 3.0, 4.0], 0.75), Some(3.25));
        assert_eq!(percentile(vec![5.0], 0.75), Some(5.0));
        assert_eq!(percentile(vec![], 0.75), None);
    }

    #[test]
    fn test_aggregate_merges_duplicate_dates() {
        let a = short_sleep_night(10);
        let mut b = short_sleep_night(10);
        b.minutes_asleep = 60.0;
        b.minutes_awake = 10.0;
        let sessions = vec![a, b];

        let days = aggregate_daily(&refs(&sessions));
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].minutes_asleep, 450.0);
        assert_eq!(days[0].minutes_awake, 40.0);
        // Rate fields are averaged, not summed
        assert_eq!(days[0].overall_score, Some(70.0));
    }

    #[test]
    fn test_single_cause_window() {
        let mut sessions: Vec<SleepSession> = (1..=4).map(good_night).collect();
        sessions.extend((5..=8).map(short_sleep_night));

        let report = analyze(&refs(&sessions), &ParetoConfig::default());

        assert_eq!(report.total_days, 8);
        assert_eq!(report.bad_days, 4);
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].signal, SignalKind::ShortSleep);
        assert_eq!(report.rows[0].count, 4);
        assert_eq!(report.rows[0].cumulative_share, 1.0);
    }

    #[test]
    fn test_catch_all_bucket() {
        // Bad by score, but every specific rule stays quiet
        let mut sessions: Vec<SleepSession> = (1..=4).map(good_night).collect();
        sessions.push(night(NightParams {
            day: 5,
            start_hour: 23.0,
            minutes_asleep: 432.0,
            minutes_awake: 20.0,
            resting_hr: 50.0,
            score: 70.0,
            deep_frac: 0.15,
        }));

        let report = analyze(&refs(&sessions), &ParetoConfig::default());

        assert_eq!(report.bad_days, 1);
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].signal, SignalKind::Other);
        assert_eq!(report.rows[0].count, 1);
    }

    #[test]
    fn test_relative_thresholds_fire_against_own_window() {
        // The bad night's RHR and awake minutes top the window, so both
        // relative signals fire even though the absolute values are ordinary
        let mut sessions: Vec<SleepSession> = (1..=4)
            .map(|day| {
                night(NightParams {
                    day,
                    start_hour: 23.5,
                    minutes_asleep: 450.0,
                    minutes_awake: 20.0,
                    resting_hr: 50.0,
                    score: 90.0,
                    deep_frac: 0.18,
                })
            })
            .collect();
        sessions.push(night(NightParams {
            day: 5,
            start_hour: 23.5,
            minutes_asleep: 430.0,
            minutes_awake: 60.0,
            resting_hr: 58.0,
            score: 70.0,
            deep_frac: 0.18,
        }));

        let report = analyze(&refs(&sessions), &ParetoConfig::default());
        let fired: Vec<SignalKind> = report.rows.iter().map(|r| r.signal).collect();
        assert!(fired.contains(&SignalKind::HighRestingHr));
        assert!(fired.contains(&SignalKind::WokeUpALot));
    }

    #[test]
    fn test_late_bedtime_and_low_deep() {
        let mut sessions: Vec<SleepSession> = (1..=4).map(good_night).collect();
        sessions.push(night(NightParams {
            day: 5,
            start_hour: 2.25, // wraps to 26.25, past the 02:00 cutoff
            minutes_asleep: 430.0,
            minutes_awake: 20.0,
            resting_hr: 50.0,
            score: 70.0,
            deep_frac: 0.08,
        }));

        let report = analyze(&refs(&sessions), &ParetoConfig::default());
        let fired: Vec<SignalKind> = report.rows.iter().map(|r| r.signal).collect();
        assert!(fired.contains(&SignalKind::LateBedtime));
        assert!(fired.contains(&SignalKind::LowDeepSleep));
        assert!(!fired.contains(&SignalKind::Other));
    }

    #[test]
    fn test_tallies_at_least_bad_days() {
        let mut sessions: Vec<SleepSession> = (1..=3).map(good_night).collect();
        sessions.extend((4..=6).map(short_sleep_night));
        sessions.push(night(NightParams {
            day: 7,
            start_hour: 3.0,
            minutes_asleep: 330.0,
            minutes_awake: 90.0,
            resting_hr: 65.0,
            score: 55.0,
            deep_frac: 0.07,
        }));

        let report = analyze(&refs(&sessions), &ParetoConfig::default());
        let total_tallies: usize = report.rows.iter().map(|r| r.count).sum();
        assert!(total_tallies >= report.bad_days);
        // A signal fires at most once per day
        assert!(report.rows.iter().all(|r| r.count <= report.bad_days));
        // The last cumulative share is always exactly 1
        assert_eq!(report.rows.last().unwrap().cumulative_share, 1.0);
    }

    #[test]
    fn test_deterministic_reruns() {
        let mut sessions: Vec<SleepSession> = (1..=4).map(good_night).collect();
        sessions.extend((5..=8).map(short_sleep_night));
        let config = ParetoConfig::default();

        let first = analyze(&refs(&sessions), &config);
        let second = analyze(&refs(&sessions), &config);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_no_bad_days_is_empty_report() {
        let sessions: Vec<SleepSession> = (1..=5).map(good_night).collect();
        let report = analyze(&refs(&sessions), &ParetoConfig::default());

        assert_eq!(report.bad_days, 0);
        assert_eq!(report.total_days, 5);
        assert!(report.rows.is_empty());
    }

    #[test]
    fn test_empty_window_is_empty_report() {
        let report = analyze(&[], &ParetoConfig::default());
        assert_eq!(report, ParetoReport::default());
    }
}
