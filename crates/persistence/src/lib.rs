//! Wardbook Persistence Layer
//!
//! This crate stores and retrieves the operational records of a hospital:
//! patients, doctors, departments, appointments, hospitalizations and medical
//! records. On top of plain storage it assembles read-only summaries and
//! computes grouped statistics for reporting.
//!
//! # Features
//!
//! - **Repositories**: insert, lookup, full and single-field update, delete
//!   for every entity, with validation before any query is issued
//! - **Referential integrity**: deletes that would orphan dependent rows are
//!   rejected and reported as such
//! - **Summaries**: appointment, department and current-stay composites,
//!   either read from reporting views or assembled from repositories
//! - **Analytics**: length of stay, occupancy, case counts, patient ages and
//!   yearly admissions
//!
//! # Backend Features
//!
//! - `sqlite` (default) - SQLite with in-memory and file modes
//! - `reports` - the `wardbook-reports` command line binary
//!
//! # Architecture
//!
//! - [`types`] - Entities, updatable field tokens and summary composites
//! - [`error`] - Error types for all operations
//! - [`core`] - Repository, summary and analytics traits
//! - [`summary`] - Pure composition of summaries from fetched entities
//! - [`backends`] - Backend implementations
//!
//! # Quick Start
//!
//! ```
//! use chrono::NaiveDate;
//! use wardbook_persistence::backends::sqlite::SqliteBackend;
//! use wardbook_persistence::core::{Repository, SummaryProvider};
//! use wardbook_persistence::types::{Department, Hospitalization, Patient};
//!
//! # fn main() -> Result<(), wardbook_persistence::StorageError> {
//! let backend = SqliteBackend::in_memory()?;
//! backend.init_schema()?;
//!
//! let patient = backend.patients().insert(Patient::new(
//!     "Nikos",
//!     "Georgiou",
//!     NaiveDate::from_ymd_opt(1972, 11, 3).unwrap(),
//!     "03117201234",
//! ))?;
//! let ward = backend
//!     .departments()
//!     .insert(Department::new("Cardiology", Some(10)))?;
//!
//! let admitted = NaiveDate::from_ymd_opt(2025, 3, 14)
//!     .unwrap()
//!     .and_hms_opt(9, 30, 0)
//!     .unwrap();
//! backend.hospitalizations().insert(Hospitalization::admit(
//!     patient.id.unwrap(),
//!     ward.id.unwrap(),
//!     admitted,
//! ))?;
//!
//! let current = backend.current_hospitalization_by_amka("03117201234")?.unwrap();
//! assert_eq!(current.department.name, "Cardiology");
//!
//! let summary = backend.department_summary("cardiology")?.unwrap();
//! assert_eq!(summary.occupancy, 1);
//! # Ok(())
//! # }
//! ```
//!
//! # Errors
//!
//! Every operation returns [`StorageResult`]. Rejected input surfaces as
//! [`StorageError::Validation`], constraint failures as
//! [`StorageError::Integrity`] and driver or pool failures as
//! [`StorageError::Backend`]. Lookups that find nothing return `Ok(None)` or
//! an empty collection, never an error.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod backends;
pub mod core;
pub mod error;
pub mod summary;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{StorageError, StorageResult};
pub use types::{
    Appointment, AppointmentSummary, CurrentHospitalizationSummary, Department,
    DepartmentSummary, Doctor, Entity, Gender, Hospitalization, MedicalRecord, Patient,
};

// Re-export core traits
pub use core::{
    AnalyticsProvider, Backend, BackendKind, DoctorPatientCount, FieldValue, Repository,
    SummaryProvider, UpdatableField,
};

#[cfg(feature = "sqlite")]
pub use backends::sqlite::{AssembledSummaries, SqliteBackend, SqliteBackendConfig};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
