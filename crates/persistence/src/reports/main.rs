//! Wardbook Reports
//!
//! Opens a hospital records database and prints every analytics report as
//! one JSON document on standard output.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `WARDBOOK_DATABASE` | wardbook.db | Database file |
//! | `WARDBOOK_LOG_LEVEL` | info | Log level |
//! | `WARDBOOK_INIT_SCHEMA` | false | Create missing tables and views first |
//! | `WARDBOOK_YEAR` | current year | Year for the admissions report |

use std::collections::BTreeMap;

use chrono::Datelike;
use clap::Parser;
use serde::Serialize;
use tracing::info;

use wardbook_persistence::backends::sqlite::SqliteBackend;
use wardbook_persistence::core::{AnalyticsProvider, DoctorPatientCount, SummaryProvider};
use wardbook_persistence::types::{CurrentHospitalizationSummary, DepartmentSummary};

/// Command line configuration for the reports binary.
#[derive(Debug, Clone, Parser)]
#[command(name = "wardbook-reports")]
#[command(about = "Hospital records analytics")]
struct ReportsConfig {
    /// Path to the SQLite database file.
    #[arg(short, long, env = "WARDBOOK_DATABASE", default_value = "wardbook.db")]
    database: String,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "WARDBOOK_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Create missing tables and views before reporting.
    #[arg(long, env = "WARDBOOK_INIT_SCHEMA", default_value_t = false)]
    init_schema: bool,

    /// Year for the admissions report. Defaults to the current year.
    #[arg(long, env = "WARDBOOK_YEAR")]
    year: Option<i32>,
}

impl ReportsConfig {
    fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.database.trim().is_empty() {
            errors.push("Database path cannot be empty".to_string());
        }

        if !["error", "warn", "info", "debug", "trace"].contains(&self.log_level.as_str()) {
            errors.push(format!("Unknown log level '{}'", self.log_level));
        }

        if let Some(year) = self.year
            && !(1..=9999).contains(&year)
        {
            errors.push(format!("Year {} is out of range", year));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Serialize)]
struct Report {
    average_length_of_stay: BTreeMap<String, i64>,
    doctor_patient_counts: Vec<DoctorPatientCount>,
    covid_cases: u64,
    bed_occupancy_rate: BTreeMap<String, f64>,
    average_age_of_admitted_patients: f64,
    admissions_year: i32,
    admissions: BTreeMap<String, u64>,
    departments: Vec<DepartmentSummary>,
    current_hospitalizations: Vec<CurrentHospitalizationSummary>,
}

fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "wardbook_persistence={level},wardbook_reports={level}"
        ))
    });

    // Reports go to stdout, logs to stderr.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn build_report(backend: &SqliteBackend, year: i32) -> anyhow::Result<Report> {
    Ok(Report {
        average_length_of_stay: backend.average_length_of_stay_per_department()?,
        doctor_patient_counts: backend.doctor_patient_counts()?,
        covid_cases: backend.covid_case_count()?,
        bed_occupancy_rate: backend.bed_occupancy_rate_per_department()?,
        average_age_of_admitted_patients: backend.average_age_of_admitted_patients()?,
        admissions_year: year,
        admissions: backend.admissions_per_department_per_year(year)?,
        departments: backend.department_summaries()?,
        current_hospitalizations: backend.current_hospitalizations()?,
    })
}

fn main() -> anyhow::Result<()> {
    let config = ReportsConfig::parse();
    init_logging(&config.log_level);

    if let Err(errors) = config.validate() {
        for error in &errors {
            eprintln!("Configuration error: {}", error);
        }
        std::process::exit(1);
    }

    info!(database = %config.database, "Opening database");
    let backend = SqliteBackend::open(&config.database)?;
    if config.init_schema {
        backend.init_schema()?;
    }

    let year = config
        .year
        .unwrap_or_else(|| chrono::Local::now().date_naive().year());
    let report = build_report(&backend, year)?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(args: &[&str]) -> ReportsConfig {
        ReportsConfig::parse_from(std::iter::once("wardbook-reports").chain(args.iter().copied()))
    }

    #[test]
    fn test_validate_collects_every_problem() {
        let cfg = config(&["--database", " ", "--log-level", "loud", "--year", "0"]);
        let errors = cfg.validate().unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_report_over_empty_database() {
        let backend = SqliteBackend::in_memory().unwrap();
        backend.init_schema().unwrap();
        let report = build_report(&backend, 2024).unwrap();
        assert_eq!(report.covid_cases, 0);
        assert!(report.admissions.is_empty());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["admissions_year"], 2024);
    }
}
