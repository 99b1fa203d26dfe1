use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{Entity, require_non_blank, require_positive_id};
use crate::core::field::{FieldValue, updatable_fields};
use crate::error::ValidationError;

/// A clinical entry written about a patient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicalRecord {
    /// Generated identifier.
    pub id: Option<i64>,
    /// Subject of the record.
    pub patient_id: i64,
    /// Author, if known.
    pub doctor_id: Option<i64>,
    /// When the entry was made, never in the future.
    pub record_date_time: NaiveDateTime,
    /// Diagnosis text.
    pub diagnosis: String,
    /// Prescribed treatment.
    pub treatment: String,
    /// Additional notes.
    pub notes: Option<String>,
}

impl MedicalRecord {
    /// Creates an unsaved record.
    pub fn new(
        patient_id: i64,
        record_date_time: NaiveDateTime,
        diagnosis: impl Into<String>,
        treatment: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            patient_id,
            doctor_id: None,
            record_date_time,
            diagnosis: diagnosis.into(),
            treatment: treatment.into(),
            notes: None,
        }
    }

    /// Sets the authoring doctor.
    pub fn by_doctor(mut self, doctor_id: i64) -> Self {
        self.doctor_id = Some(doctor_id);
        self
    }

    /// Sets the notes.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

impl Entity for MedicalRecord {
    const NAME: &'static str = "medical_record";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn validate_at(&self, now: NaiveDateTime) -> Result<(), ValidationError> {
        require_positive_id(Self::NAME, "patient_id", self.patient_id)?;
        if let Some(doctor_id) = self.doctor_id {
            require_positive_id(Self::NAME, "doctor_id", doctor_id)?;
        }
        check_not_future(self.record_date_time, now)?;
        require_non_blank(Self::NAME, "diagnosis", &self.diagnosis)?;
        require_non_blank(Self::NAME, "treatment", &self.treatment)
    }
}

fn check_not_future(at: NaiveDateTime, now: NaiveDateTime) -> Result<(), ValidationError> {
    if at > now {
        return Err(ValidationError::invalid(
            MedicalRecord::NAME,
            "record_datetime",
            "must not be in the future",
        ));
    }
    Ok(())
}

updatable_fields! {
    /// Updatable medical record columns.
    pub enum MedicalRecordField for "medical_record" in "medical_record" by "record_id" {
        /// Patient the record belongs to.
        PatientId => "patient_id": Integer;
        /// Authoring doctor, if any.
        DoctorId => "doctor_id": Integer, nullable;
        /// When the record was made.
        RecordDateTime => "record_datetime": DateTime;
        /// Diagnosis text.
        Diagnosis => "diagnosis": Text;
        /// Prescribed treatment.
        Treatment => "treatment": Text;
        /// Additional notes.
        Notes => "notes": Text, nullable;
    }
    check = check_medical_record_field;
}

fn check_medical_record_field(
    field: &MedicalRecordField,
    value: &FieldValue,
    now: NaiveDateTime,
) -> Result<(), ValidationError> {
    match (field, value) {
        (MedicalRecordField::PatientId, FieldValue::Integer(id)) => {
            require_positive_id(MedicalRecord::NAME, "patient_id", *id)
        }
        (MedicalRecordField::DoctorId, FieldValue::Integer(id)) => {
            require_positive_id(MedicalRecord::NAME, "doctor_id", *id)
        }
        (MedicalRecordField::RecordDateTime, FieldValue::DateTime(dt)) => check_not_future(*dt, now),
        (MedicalRecordField::Diagnosis, FieldValue::Text(s)) => {
            require_non_blank(MedicalRecord::NAME, "diagnosis", s)
        }
        (MedicalRecordField::Treatment, FieldValue::Text(s)) => {
            require_non_blank(MedicalRecord::NAME, "treatment", s)
        }
        _ => Ok(()),
    }
}
