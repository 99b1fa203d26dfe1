//! SQLite backend implementation.
//!
//! This module provides the SQLite implementation of the repository, summary
//! and analytics traits. It supports both in-memory databases (great for
//! testing) and file-based databases.
//!
//! # Example
//!
//! ```no_run
//! use wardbook_persistence::backends::sqlite::SqliteBackend;
//! use wardbook_persistence::core::{AnalyticsProvider, Repository};
//! use wardbook_persistence::types::Department;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = SqliteBackend::open("./data/wardbook.db")?;
//! backend.init_schema()?;
//!
//! backend.departments().insert(Department::new("Cardiology", Some(12)))?;
//! let rates = backend.bed_occupancy_rate_per_department()?;
//! assert_eq!(rates.get("Cardiology"), Some(&0.0));
//! # Ok(())
//! # }
//! ```
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE department (
//!     department_id INTEGER PRIMARY KEY AUTOINCREMENT,
//!     name TEXT NOT NULL,
//!     capacity INTEGER            -- NULL: no bed count on file
//! );
//! CREATE UNIQUE INDEX idx_department_name ON department (fold_case(name));
//!
//! CREATE TABLE hospitalization (
//!     hospitalization_id INTEGER PRIMARY KEY AUTOINCREMENT,
//!     patient_id INTEGER NOT NULL REFERENCES patient (patient_id),
//!     department_id INTEGER NOT NULL REFERENCES department (department_id),
//!     admit_datetime TEXT NOT NULL,
//!     discharge_datetime TEXT,    -- NULL: currently admitted
//!     bed_number TEXT,
//!     reason TEXT
//! );
//! ```
//!
//! `patient`, `doctor`, `appointment` and `medical_record` follow the same
//! pattern. Timestamps are stored as `YYYY-MM-DD HH:MM:SS[.fff]` text and
//! dates as `YYYY-MM-DD`. Three views pre-join the summaries:
//! `appointment_full_view`, `department_full_view` and
//! `current_hospitalization_view`.

mod analytics;
mod backend;
mod repository;
mod schema;
mod summary;

pub use backend::{SqliteBackend, SqliteBackendConfig};
pub use repository::{
    AppointmentRepository, DepartmentRepository, DoctorRepository, HospitalizationRepository,
    MedicalRecordRepository, PatientRepository,
};
pub use schema::{SCHEMA_VERSION, drop_all_tables, initialize_schema};
pub use summary::AssembledSummaries;
