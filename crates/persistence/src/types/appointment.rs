use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{Entity, require_positive_id};
use crate::core::field::{FieldValue, updatable_fields};
use crate::error::ValidationError;

/// A scheduled visit of a patient to a doctor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    /// Generated identifier.
    pub id: Option<i64>,
    /// Visiting patient.
    pub patient_id: i64,
    /// Attending doctor.
    pub doctor_id: i64,
    /// Scheduled time, never in the past when written.
    pub date_time: NaiveDateTime,
    /// Free-text reason for the visit.
    pub reason: Option<String>,
}

impl Appointment {
    /// Creates an unsaved appointment without a reason.
    pub fn new(patient_id: i64, doctor_id: i64, date_time: NaiveDateTime) -> Self {
        Self {
            id: None,
            patient_id,
            doctor_id,
            date_time,
            reason: None,
        }
    }

    /// Sets the reason.
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

impl Entity for Appointment {
    const NAME: &'static str = "appointment";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn validate_at(&self, now: NaiveDateTime) -> Result<(), ValidationError> {
        require_positive_id(Self::NAME, "patient_id", self.patient_id)?;
        require_positive_id(Self::NAME, "doctor_id", self.doctor_id)?;
        check_not_past(self.date_time, now)
    }
}

fn check_not_past(date_time: NaiveDateTime, now: NaiveDateTime) -> Result<(), ValidationError> {
    if date_time < now {
        return Err(ValidationError::invalid(
            Appointment::NAME,
            "appointment_datetime",
            "must not be in the past",
        ));
    }
    Ok(())
}

updatable_fields! {
    /// Updatable appointment columns.
    pub enum AppointmentField for "appointment" in "appointment" by "appointment_id" {
        /// Patient who booked.
        PatientId => "patient_id": Integer;
        /// Doctor seen.
        DoctorId => "doctor_id": Integer;
        /// Scheduled time; must not be in the past.
        DateTime => "appointment_datetime": DateTime;
        /// Free-text reason for the visit.
        Reason => "reason": Text, nullable;
    }
    check = check_appointment_field;
}

fn check_appointment_field(
    field: &AppointmentField,
    value: &FieldValue,
    now: NaiveDateTime,
) -> Result<(), ValidationError> {
    match (field, value) {
        (AppointmentField::PatientId, FieldValue::Integer(id)) => {
            require_positive_id(Appointment::NAME, "patient_id", *id)
        }
        (AppointmentField::DoctorId, FieldValue::Integer(id)) => {
            require_positive_id(Appointment::NAME, "doctor_id", *id)
        }
        (AppointmentField::DateTime, FieldValue::DateTime(dt)) => check_not_past(*dt, now),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::UpdatableField;
    use chrono::{Duration, NaiveDate};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 10)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_past_appointment_rejected() {
        let appt = Appointment::new(1, 2, now() - Duration::minutes(1));
        let err = appt.validate_at(now()).unwrap_err();
        assert!(err.to_string().contains("past"));
        assert!(Appointment::new(1, 2, now()).validate_at(now()).is_ok());
    }

    #[test]
    fn test_references_must_be_positive() {
        let appt = Appointment::new(0, 2, now() + Duration::days(1));
        assert!(appt.validate_at(now()).is_err());
    }

    #[test]
    fn test_reschedule_rules() {
        let field: AppointmentField = "appointment_datetime".parse().unwrap();
        assert_eq!(field, AppointmentField::DateTime);
        assert!(
            field
                .validate_at(&FieldValue::DateTime(now() + Duration::hours(2)), now())
                .is_ok()
        );
        assert!(
            field
                .validate_at(&FieldValue::DateTime(now() - Duration::hours(2)), now())
                .is_err()
        );
        assert!(
            AppointmentField::Reason
                .validate_at(&FieldValue::Null, now())
                .is_ok()
        );
    }
}
