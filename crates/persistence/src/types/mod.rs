//! Entity types for the persistence layer.
//!
//! This module provides the records persisted by the repositories and the
//! read-only composites assembled from them:
//!
//! - [`Patient`], [`Doctor`], [`Department`], [`Appointment`],
//!   [`Hospitalization`], [`MedicalRecord`] - persisted entities
//! - [`AppointmentSummary`], [`DepartmentSummary`],
//!   [`CurrentHospitalizationSummary`] - composites, never persisted
//! - one updatable field token enum per entity ([`PatientField`], ...)
//!
//! Entity invariants are checked by [`Entity::validate`] before any query is
//! issued. An entity that has not been inserted yet carries `id: None`.
//!
//! # Examples
//!
//! ```
//! use chrono::NaiveDate;
//! use wardbook_persistence::types::{Entity, Gender, Patient};
//!
//! let patient = Patient::new(
//!     "  Maria ",
//!     "Papadopoulou",
//!     NaiveDate::from_ymd_opt(1985, 4, 12).unwrap(),
//!     "12048501234",
//! )
//! .with_gender(Gender::F);
//!
//! assert_eq!(patient.first_name, "Maria");
//! assert!(patient.id.is_none());
//! assert!(patient.validate().is_ok());
//! ```

mod appointment;
mod department;
mod doctor;
mod hospitalization;
mod medical_record;
mod patient;
mod summary;

pub use appointment::{Appointment, AppointmentField};
pub use department::{Department, DepartmentField};
pub use doctor::{Doctor, DoctorField};
pub use hospitalization::{Hospitalization, HospitalizationField};
pub(crate) use hospitalization::check_discharge_order;
pub use medical_record::{MedicalRecord, MedicalRecordField};
pub use patient::{Gender, Patient, PatientField};
pub use summary::{AppointmentSummary, CurrentHospitalizationSummary, DepartmentSummary};

use chrono::NaiveDateTime;

use crate::error::ValidationError;

/// A persisted record with a generated integer identifier.
pub trait Entity: Clone + Send + Sync {
    /// Entity name used in errors and logs.
    const NAME: &'static str;

    /// The generated identifier, `None` until inserted.
    fn id(&self) -> Option<i64>;

    /// Checks every invariant against an explicit clock.
    fn validate_at(&self, now: NaiveDateTime) -> Result<(), ValidationError>;

    /// Checks every invariant against the local clock.
    fn validate(&self) -> Result<(), ValidationError> {
        self.validate_at(now())
    }

    /// Returns the identifier or a validation error for unsaved entities.
    fn require_id(&self) -> Result<i64, ValidationError> {
        self.id()
            .ok_or(ValidationError::MissingId { entity: Self::NAME })
    }
}

/// Local wall-clock time, the reference for "future" and "past" checks.
pub(crate) fn now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

pub(crate) fn require_non_blank(
    entity: &'static str,
    field: &'static str,
    value: &str,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::invalid(entity, field, "must not be blank"));
    }
    Ok(())
}

pub(crate) fn require_digits(
    entity: &'static str,
    field: &'static str,
    value: &str,
) -> Result<(), ValidationError> {
    if value.is_empty() || !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::invalid(
            entity,
            field,
            "must contain digits only",
        ));
    }
    Ok(())
}

pub(crate) fn require_positive_id(
    entity: &'static str,
    field: &'static str,
    value: i64,
) -> Result<(), ValidationError> {
    if value <= 0 {
        return Err(ValidationError::invalid(entity, field, "must be > 0"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_non_blank() {
        assert!(require_non_blank("patient", "first_name", "Anna").is_ok());
        assert!(require_non_blank("patient", "first_name", "   ").is_err());
        assert!(require_non_blank("patient", "first_name", "").is_err());
    }

    #[test]
    fn test_require_digits() {
        assert!(require_digits("doctor", "phone", "2101234567").is_ok());
        assert!(require_digits("doctor", "phone", "+30 210").is_err());
        assert!(require_digits("doctor", "phone", "").is_err());
    }

    #[test]
    fn test_require_positive_id() {
        assert!(require_positive_id("appointment", "doctor_id", 1).is_ok());
        assert!(require_positive_id("appointment", "doctor_id", 0).is_err());
        assert!(require_positive_id("appointment", "doctor_id", -4).is_err());
    }
}
