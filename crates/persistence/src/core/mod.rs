//! Core storage traits and abstractions.
//!
//! This module provides the foundational traits for the persistence layer:
//!
//! - [`Backend`] - Storage driver abstraction
//! - [`Repository`] - Per-entity CRUD and single-column updates
//! - [`SummaryProvider`] - Composite summary lookups
//! - [`AnalyticsProvider`] - Grouped aggregate reports
//! - [`UpdatableField`] / [`FieldValue`] - The closed update allow-lists
//!
//! # Layering
//!
//! ```text
//! Backend (connections, schema)
//!     ├── Repository (one per entity)
//!     │       └── AssembledSummaries ─┐
//!     ├── SummaryProvider (views) ────┴── same contract
//!     └── AnalyticsProvider
//! ```

pub mod analytics;
pub mod backend;
pub mod field;
pub mod repository;
pub mod summary;

pub use analytics::{AnalyticsProvider, DoctorPatientCount};
pub use backend::{Backend, BackendKind};
pub use field::{FieldKind, FieldValue, UpdatableField};
pub use repository::Repository;
pub use summary::SummaryProvider;
