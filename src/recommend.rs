//! Recommendation rule engine
//!
//! Two pure functions over the single most recent night sleep: a bedtime
//! suggestion and a nap recommendation. Both take an explicit [`RuleConfig`]
//! so alternate rule sets are testable without touching the function bodies,
//! and both return `None` when there is no last night to reason about.

use crate::timeutil::{unwrap_hour, wrap_to_night};
use crate::types::{NapAdvice, SleepSession};
use serde::{Deserialize, Serialize};

/// Cutoffs for the recommendation rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Bedtime to converge towards, fractional hour in [0, 24)
    pub target_bedtime_hour: f64,
    /// Largest correction applied per night, minutes
    pub max_shift_minutes: f64,
    /// Nap gate: recommend when last night's sleep was below this
    pub nap_gate_sleep_hours: f64,
    /// Nap gate: recommend when last night's score was below this
    pub nap_gate_score: f64,
    /// Tier 1 (long nap) cutoffs and duration
    pub long_nap_score: f64,
    pub long_nap_sleep_hours: f64,
    pub long_nap_minutes: u32,
    /// Tier 2 (medium nap) cutoffs and duration
    pub mid_nap_score: f64,
    pub mid_nap_sleep_hours: f64,
    pub mid_nap_minutes: u32,
    /// Tier 3 (short recovery nap) duration
    pub short_nap_minutes: u32,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            target_bedtime_hour: 1.25, // 01:15
            max_shift_minutes: 30.0,
            nap_gate_sleep_hours: 7.5,
            nap_gate_score: 75.0,
            long_nap_score: 60.0,
            long_nap_sleep_hours: 6.0,
            long_nap_minutes: 45,
            mid_nap_score: 70.0,
            mid_nap_sleep_hours: 6.5,
            mid_nap_minutes: 35,
            short_nap_minutes: 23,
        }
    }
}

/// Suggest tonight's bedtime from the last night's observed bedtime.
///
/// Both target and observed bedtime are compared on the night-continuous
/// timeline. An observed bedtime at or before the target is kept unchanged:
/// early bedtimes are never discouraged. A later one is pulled earlier by at
/// most `max_shift_minutes`, clamped at the target, so the correction stays
/// gradual night over night.
pub fn suggest_bedtime(last_night: Option<&SleepSession>, config: &RuleConfig) -> Option<f64> {
    let night = last_night?;
    let observed = wrap_to_night(night.start_hour);
    let target = wrap_to_night(config.target_bedtime_hour);

    if observed <= target {
        return Some(night.start_hour);
    }

    let shifted = (observed - config.max_shift_minutes / 60.0).max(target);
    Some(unwrap_hour(shifted))
}

/// Recommend a nap for the day after the last night.
///
/// Gate first, then the duration tiers in strict priority order. A night with
/// no score evaluates every score condition as false, leaving the duration
/// conditions to drive the decision alone.
pub fn recommend_nap(last_night: Option<&SleepSession>, config: &RuleConfig) -> Option<NapAdvice> {
    let night = last_night?;
    let hours = night.sleep_hours;
    let score_below = |cutoff: f64| night.overall_score.is_some_and(|s| s < cutoff);

    if hours >= config.nap_gate_sleep_hours && !score_below(config.nap_gate_score) {
        return Some(NapAdvice::No);
    }

    let minutes = if score_below(config.long_nap_score) || hours < config.long_nap_sleep_hours {
        config.long_nap_minutes
    } else if score_below(config.mid_nap_score) || hours < config.mid_nap_sleep_hours {
        config.mid_nap_minutes
    } else {
        config.short_nap_minutes
    };

    Some(NapAdvice::Yes { minutes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn night_with(start_hour: f64, sleep_hours: f64, score: Option<f64>) -> SleepSession {
        let date = NaiveDate::from_ymd_opt(2025, 6, 29).unwrap();
        let minutes_asleep = sleep_hours * 60.0;
        let duration = minutes_asleep + 40.0;
        SleepSession {
            date,
            week_day: "Sunday".to_string(),
            is_night_sleep: true,
            start_time: date.and_hms_opt(0, 0, 0).unwrap(),
            end_time: date.and_hms_opt(9, 0, 0).unwrap(),
            duration_min: duration,
            minutes_asleep,
            minutes_awake: 40.0,
            deep_minutes: minutes_asleep * 0.15,
            light_minutes: minutes_asleep * 0.6,
            rem_minutes: minutes_asleep * 0.25,
            overall_score: score,
            resting_heart_rate: 55.0,
            start_hour,
            end_hour: 9.0,
            efficiency: Some(minutes_asleep / duration),
            deep_pct: Some(0.15),
            rem_pct: Some(0.25),
            awake_pct: Some(40.0 / duration),
            sleep_hours,
        }
    }

    #[test]
    fn test_bedtime_earlier_than_target_kept() {
        // 00:30 wraps to 24.5, target 01:15 wraps to 25.25; keep as is
        let night = night_with(0.5, 7.0, Some(80.0));
        let suggested = suggest_bedtime(Some(&night), &RuleConfig::default()).unwrap();
        assert_eq!(suggested, 0.5);
    }

    #[test]
    fn test_bedtime_shifted_by_max_step() {
        // 03:00 is 105 minutes past the target; only 30 are corrected
        let night = night_with(3.0, 7.0, Some(80.0));
        let suggested = suggest_bedtime(Some(&night), &RuleConfig::default()).unwrap();
        assert!((suggested - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_bedtime_clamped_at_target() {
        // 01:30 is only 15 minutes late; clamp at the target, not past it
        let night = night_with(1.5, 7.0, Some(80.0));
        let suggested = suggest_bedtime(Some(&night), &RuleConfig::default()).unwrap();
        assert!((suggested - 1.25).abs() < 1e-9);
    }

    #[test]
    fn test_bedtime_just_before_wrapped_target_kept() {
        // 01:00 wraps to 25.0 <= 25.25, so it stays
        let night = night_with(1.0, 7.0, Some(80.0));
        let suggested = suggest_bedtime(Some(&night), &RuleConfig::default()).unwrap();
        assert_eq!(suggested, 1.0);
    }

    #[test]
    fn test_bedtime_none_without_last_night() {
        assert_eq!(suggest_bedtime(None, &RuleConfig::default()), None);
    }

    #[test]
    fn test_nap_long_tier() {
        let night = night_with(1.0, 5.5, Some(55.0));
        let advice = recommend_nap(Some(&night), &RuleConfig::default()).unwrap();
        assert_eq!(advice, NapAdvice::Yes { minutes: 45 });
    }

    #[test]
    fn test_nap_mid_tier_score_gate() {
        // 6.8h alone would be tier 3, but score 68 < 70 fires tier 2
        let night = night_with(1.0, 6.8, Some(68.0));
        let advice = recommend_nap(Some(&night), &RuleConfig::default()).unwrap();
        assert_eq!(advice, NapAdvice::Yes { minutes: 35 });
    }

    #[test]
    fn test_nap_short_tier() {
        let night = night_with(1.0, 7.0, Some(72.0));
        let advice = recommend_nap(Some(&night), &RuleConfig::default()).unwrap();
        assert_eq!(advice, NapAdvice::Yes { minutes: 23 });
    }

    #[test]
    fn test_nap_not_needed() {
        let night = night_with(1.0, 8.0, Some(90.0));
        let advice = recommend_nap(Some(&night), &RuleConfig::default()).unwrap();
        assert_eq!(advice, NapAdvice::No);
    }

    #[test]
    fn test_nap_none_without_last_night() {
        assert_eq!(recommend_nap(None, &RuleConfig::default()), None);
    }

    #[test]
    fn test_nap_missing_score_uses_duration_only() {
        // No score: the 7.5h duration gate alone decides, then duration tiers
        let rested = night_with(1.0, 8.0, None);
        assert_eq!(
            recommend_nap(Some(&rested), &RuleConfig::default()).unwrap(),
            NapAdvice::No
        );

        let short = night_with(1.0, 6.2, None);
        assert_eq!(
            recommend_nap(Some(&short), &RuleConfig::default()).unwrap(),
            NapAdvice::Yes { minutes: 35 }
        );
    }
}
