//! Compass CLI - command-line interface for Sleep Compass
//!
//! Commands:
//! - summary: windowed KPI statistics
//! - recommend: bedtime suggestion and nap recommendation
//! - pareto: bad-night signal breakdown
//! - validate: schema-check a sleep log

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::NaiveDate;
use sleep_compass::pareto::ParetoConfig;
use sleep_compass::recommend::RuleConfig;
use sleep_compass::timeutil::{format_hour_hhmm, format_opt};
use sleep_compass::{
    AnalyticsError, CompassProcessor, DayType, NapAdvice, WindowQuery, COMPASS_VERSION,
};

/// Compass - decision-ready analytics for personal sleep logs
#[derive(Parser)]
#[command(name = "compass")]
#[command(version = COMPASS_VERSION)]
#[command(about = "Analyze a sleep log: windowed stats, recommendations, bad-night causes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Windowed KPI statistics
    Summary {
        /// Sleep log CSV path
        #[arg(short, long)]
        input: PathBuf,

        /// Reference date (YYYY-MM-DD); defaults to the latest date in the log
        #[arg(long)]
        as_of: Option<String>,

        /// Lookback window in days
        #[arg(long, default_value = "30")]
        days: u32,

        /// Day-of-week filter
        #[arg(long, value_enum, default_value = "all")]
        day_type: DayTypeArg,

        /// Restrict to night sleeps
        #[arg(long)]
        night_only: bool,

        /// Output the full report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Bedtime suggestion and nap recommendation from the last night
    Recommend {
        /// Sleep log CSV path
        #[arg(short, long)]
        input: PathBuf,

        /// Reference date (YYYY-MM-DD); defaults to the latest date in the log
        #[arg(long)]
        as_of: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Bad-night signal breakdown with cumulative-share curve
    Pareto {
        /// Sleep log CSV path
        #[arg(short, long)]
        input: PathBuf,

        /// Reference date (YYYY-MM-DD); defaults to the latest date in the log
        #[arg(long)]
        as_of: Option<String>,

        /// Lookback window in days
        #[arg(long, default_value = "30")]
        days: u32,

        /// Score at or below which a night counts as bad
        #[arg(long, default_value = "75.0")]
        score_threshold: f64,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate the schema of a sleep log
    Validate {
        /// Sleep log CSV path
        #[arg(short, long)]
        input: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum DayTypeArg {
    All,
    Weekdays,
    Weekends,
}

impl From<DayTypeArg> for DayType {
    fn from(arg: DayTypeArg) -> Self {
        match arg {
            DayTypeArg::All => DayType::All,
            DayTypeArg::Weekdays => DayType::Weekdays,
            DayTypeArg::Weekends => DayType::Weekends,
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Analytics(#[from] AnalyticsError),

    #[error("Invalid --as-of date {0:?} (expected YYYY-MM-DD)")]
    InvalidAsOf(String),

    #[error("The log contains no sessions; pass --as-of or add data")]
    NoData,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Summary {
            input,
            as_of,
            days,
            day_type,
            night_only,
            json,
        } => cmd_summary(&input, as_of.as_deref(), days, day_type.into(), night_only, json),

        Commands::Recommend { input, as_of, json } => {
            cmd_recommend(&input, as_of.as_deref(), json)
        }

        Commands::Pareto {
            input,
            as_of,
            days,
            score_threshold,
            json,
        } => cmd_pareto(&input, as_of.as_deref(), days, score_threshold, json),

        Commands::Validate { input } => cmd_validate(&input),
    }
}

/// A malformed user-supplied as-of date is a soft CLI error, never a panic
fn resolve_as_of(
    processor: &CompassProcessor,
    as_of: Option<&str>,
) -> Result<NaiveDate, CliError> {
    match as_of {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|_| CliError::InvalidAsOf(s.to_string())),
        None => processor.latest_date().ok_or(CliError::NoData),
    }
}

fn cmd_summary(
    input: &PathBuf,
    as_of: Option<&str>,
    days: u32,
    day_type: DayType,
    night_only: bool,
    json: bool,
) -> Result<(), CliError> {
    let processor = CompassProcessor::from_csv_path(input)?;
    let as_of = resolve_as_of(&processor, as_of)?;
    let query = WindowQuery::new(as_of, days)
        .day_type(day_type)
        .night_only(night_only);

    if json {
        println!("{}", processor.report_json(&query)?);
        return Ok(());
    }

    let summary = processor.summary(&query);
    println!(
        "Window: {} day(s) ending {} ({})",
        days,
        as_of,
        day_type.as_str()
    );
    println!(
        "Sessions: {} ({} nights)",
        summary.sessions, summary.nights
    );
    println!("Avg score:      {}", format_opt(summary.avg_score, 1));
    println!(
        "Avg sleep (h):  {}",
        format_opt(summary.avg_sleep_hours, 2)
    );
    println!(
        "Avg efficiency: {}",
        format_opt(summary.avg_efficiency, 2)
    );
    println!(
        "Avg deep %:     {}",
        format_opt(summary.avg_deep_pct.map(|d| d * 100.0), 1)
    );
    println!("Avg RHR:        {}", format_opt(summary.avg_resting_hr, 1));
    Ok(())
}

fn cmd_recommend(input: &PathBuf, as_of: Option<&str>, json: bool) -> Result<(), CliError> {
    let processor = CompassProcessor::from_csv_path(input)?;
    let as_of = resolve_as_of(&processor, as_of)?;

    let bedtime = processor.suggest_bedtime(as_of);
    let nap = processor.recommend_nap(as_of);

    if json {
        let out = serde_json::json!({
            "as_of": as_of,
            "bedtime": bedtime.map(|h| serde_json::json!({
                "hour": h,
                "display": format_hour_hhmm(h),
            })),
            "nap": nap,
        });
        println!("{}", serde_json::to_string_pretty(&out).map_err(AnalyticsError::from)?);
        return Ok(());
    }

    match bedtime {
        Some(hour) => println!("Suggested bedtime: {}", format_hour_hhmm(hour)),
        None => println!("Suggested bedtime: no night sleep on record"),
    }
    match nap {
        Some(NapAdvice::Yes { minutes }) => println!("Nap today: yes, {minutes} min"),
        Some(NapAdvice::No) => println!("Nap today: not needed"),
        None => println!("Nap today: no night sleep on record"),
    }
    Ok(())
}

fn cmd_pareto(
    input: &PathBuf,
    as_of: Option<&str>,
    days: u32,
    score_threshold: f64,
    json: bool,
) -> Result<(), CliError> {
    let rows = sleep_compass::loader::SleepLogLoader::load_path(input)?;
    let sessions = sleep_compass::normalizer::Normalizer::normalize(rows);
    let thresholds = ParetoConfig {
        score_threshold,
        ..ParetoConfig::default()
    };
    let processor = CompassProcessor::with_configs(sessions, RuleConfig::default(), thresholds);

    let as_of = resolve_as_of(&processor, as_of)?;
    let report = processor.pareto(&WindowQuery::new(as_of, days));

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).map_err(AnalyticsError::from)?
        );
        return Ok(());
    }

    println!(
        "{} bad night(s) out of {} in the {} day(s) ending {}",
        report.bad_days, report.total_days, days, as_of
    );
    if report.rows.is_empty() {
        println!("No bad nights in window.");
        return Ok(());
    }
    println!("{:<26} {:>5} {:>10}", "Signal", "Count", "Cum share");
    for row in &report.rows {
        println!(
            "{:<26} {:>5} {:>9.0}%",
            row.signal.label(),
            row.count,
            row.cumulative_share * 100.0
        );
    }
    Ok(())
}

fn cmd_validate(input: &PathBuf) -> Result<(), CliError> {
    let processor = CompassProcessor::from_csv_path(input)?;
    let sessions = processor.sessions();
    let nights = sessions.iter().filter(|s| s.is_night_sleep).count();

    match (sessions.first(), sessions.last()) {
        (Some(first), Some(last)) => println!(
            "OK: {} session(s) ({} nights), {} to {}",
            sessions.len(),
            nights,
            first.date,
            last.date
        ),
        _ => println!("OK: schema valid, no sessions"),
    }
    Ok(())
}
