//! Pipeline orchestration
//!
//! The public entry point: load a sleep log once into an immutable snapshot,
//! then run as many window/recommendation/analysis queries against it as
//! needed. Every query takes an explicit as-of date and returns freshly
//! computed results; repeated calls with identical inputs are identical.

use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;

use crate::error::AnalyticsError;
use crate::loader::SleepLogLoader;
use crate::normalizer::Normalizer;
use crate::pareto::{self, ParetoConfig};
use crate::recommend::{self, RuleConfig};
use crate::summary;
use crate::timeutil::format_hour_hhmm;
use crate::types::{
    BedtimeSuggestion, CompassReport, NapAdvice, ParetoReport, SleepSession, WindowQuery,
    WindowSummary,
};
use crate::window;
use crate::{COMPASS_VERSION, PRODUCER_NAME};

/// Analytics processor over an immutable session snapshot.
///
/// Holds the normalized record set plus the rule and threshold configuration;
/// all query methods are pure and side-effect free.
pub struct CompassProcessor {
    sessions: Vec<SleepSession>,
    rules: RuleConfig,
    thresholds: ParetoConfig,
}

impl CompassProcessor {
    /// Create a processor over already-normalized sessions with default rules
    pub fn new(sessions: Vec<SleepSession>) -> Self {
        Self {
            sessions,
            rules: RuleConfig::default(),
            thresholds: ParetoConfig::default(),
        }
    }

    /// Create a processor with explicit rule and threshold configuration
    pub fn with_configs(
        sessions: Vec<SleepSession>,
        rules: RuleConfig,
        thresholds: ParetoConfig,
    ) -> Self {
        Self {
            sessions,
            rules,
            thresholds,
        }
    }

    /// Load, validate, and normalize a sleep log from a CSV file
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self, AnalyticsError> {
        let rows = SleepLogLoader::load_path(path)?;
        Ok(Self::new(Normalizer::normalize(rows)))
    }

    /// Load, validate, and normalize a sleep log from any reader
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, AnalyticsError> {
        let rows = SleepLogLoader::load_reader(reader)?;
        Ok(Self::new(Normalizer::normalize(rows)))
    }

    /// The full normalized snapshot, sorted ascending by start time
    pub fn sessions(&self) -> &[SleepSession] {
        &self.sessions
    }

    /// Date of the latest session in the snapshot, if any
    pub fn latest_date(&self) -> Option<NaiveDate> {
        self.sessions.iter().map(|s| s.date).max()
    }

    /// Ordered subset of sessions matching a window query
    pub fn window(&self, query: &WindowQuery) -> Vec<&SleepSession> {
        window::select(&self.sessions, query)
    }

    /// KPI statistics over a window query
    pub fn summary(&self, query: &WindowQuery) -> WindowSummary {
        summary::summarize(&self.window(query))
    }

    /// The most recent night sleep on or before `as_of`
    pub fn latest_night(&self, as_of: NaiveDate) -> Option<&SleepSession> {
        window::latest_night(&self.sessions, as_of)
    }

    /// Bedtime suggestion for the night following `as_of`
    pub fn suggest_bedtime(&self, as_of: NaiveDate) -> Option<f64> {
        recommend::suggest_bedtime(self.latest_night(as_of), &self.rules)
    }

    /// Nap recommendation for the day after the last night before `as_of`
    pub fn recommend_nap(&self, as_of: NaiveDate) -> Option<NapAdvice> {
        recommend::recommend_nap(self.latest_night(as_of), &self.rules)
    }

    /// Bad-night Pareto analysis over the night sleeps of a window.
    ///
    /// The night-only restriction is forced; the query's day-type lens is
    /// honored as given.
    pub fn pareto(&self, query: &WindowQuery) -> ParetoReport {
        let nights = self.window(&query.clone().night_only(true));
        pareto::analyze(&nights, &self.thresholds)
    }

    /// Assemble the complete report for one window query
    pub fn report(&self, query: &WindowQuery) -> CompassReport {
        let bedtime = self.suggest_bedtime(query.as_of).map(|hour| BedtimeSuggestion {
            hour,
            display: format_hour_hhmm(hour),
        });

        CompassReport {
            producer: PRODUCER_NAME.to_string(),
            version: COMPASS_VERSION.to_string(),
            as_of: query.as_of,
            lookback_days: query.lookback_days,
            day_type: query.day_type,
            summary: self.summary(query),
            bedtime,
            nap: self.recommend_nap(query.as_of),
            pareto: self.pareto(query),
        }
    }

    /// Encode the report for one window query as JSON
    pub fn report_json(&self, query: &WindowQuery) -> Result<String, AnalyticsError> {
        Ok(serde_json::to_string_pretty(&self.report(query))?)
    }
}
