//! Sleep Compass - analytics core for personal sleep logs
//!
//! Turns a sleep-tracking log (one record per night sleep or nap) into
//! decision-ready signals through a deterministic pipeline: ingestion →
//! normalization → as-of windowing → recommendation / bad-night analysis.
//!
//! ## Modules
//!
//! - **Loader / Normalizer**: schema-checked CSV ingestion and eager
//!   derived-field computation
//! - **Window Engine**: as-of time travel with weekday/weekend filtering
//! - **Recommendation Rules**: bedtime suggestion and nap recommendation
//! - **Bad-Night Analyzer**: ranked signal tallies with a cumulative-share
//!   (Pareto) curve

pub mod error;
pub mod loader;
pub mod normalizer;
pub mod pareto;
pub mod pipeline;
pub mod recommend;
pub mod summary;
pub mod timeutil;
pub mod types;
pub mod window;

pub use error::AnalyticsError;
pub use pareto::ParetoConfig;
pub use pipeline::CompassProcessor;
pub use recommend::{recommend_nap, suggest_bedtime, RuleConfig};
pub use types::{
    CompassReport, DayType, NapAdvice, ParetoReport, ParetoRow, SignalKind, SleepSession,
    WindowQuery, WindowSummary,
};

/// Crate version embedded in all reports
pub const COMPASS_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for reports
pub const PRODUCER_NAME: &str = "sleep-compass";
