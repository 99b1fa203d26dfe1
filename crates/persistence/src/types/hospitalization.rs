use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{Entity, require_positive_id};
use crate::core::field::{FieldValue, updatable_fields};
use crate::error::ValidationError;

/// An inpatient stay in a department.
///
/// A stay without a discharge time is *current*. Once discharged it no longer
/// counts toward occupancy and no longer appears in current-stay summaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hospitalization {
    /// Generated identifier.
    pub id: Option<i64>,
    /// Admitted patient.
    pub patient_id: i64,
    /// Admitting department.
    pub department_id: i64,
    /// Admission time.
    pub admit_date_time: NaiveDateTime,
    /// Discharge time, `None` while the patient is still admitted.
    pub discharge_date_time: Option<NaiveDateTime>,
    /// Bed label.
    pub bed_number: Option<String>,
    /// Reason for admission.
    pub reason: Option<String>,
}

impl Hospitalization {
    /// Creates an unsaved, current hospitalization.
    pub fn admit(patient_id: i64, department_id: i64, admit_date_time: NaiveDateTime) -> Self {
        Self {
            id: None,
            patient_id,
            department_id,
            admit_date_time,
            discharge_date_time: None,
            bed_number: None,
            reason: None,
        }
    }

    /// Sets the discharge time.
    pub fn discharged_at(mut self, at: NaiveDateTime) -> Self {
        self.discharge_date_time = Some(at);
        self
    }

    /// Sets the bed label.
    pub fn with_bed(mut self, bed_number: impl Into<String>) -> Self {
        self.bed_number = Some(bed_number.into());
        self
    }

    /// Sets the admission reason.
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Returns true while the patient has not been discharged.
    pub fn is_current(&self) -> bool {
        self.discharge_date_time.is_none()
    }
}

impl Entity for Hospitalization {
    const NAME: &'static str = "hospitalization";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn validate_at(&self, _now: NaiveDateTime) -> Result<(), ValidationError> {
        require_positive_id(Self::NAME, "patient_id", self.patient_id)?;
        require_positive_id(Self::NAME, "department_id", self.department_id)?;
        if let Some(discharge) = self.discharge_date_time {
            check_discharge_order(self.admit_date_time, discharge)?;
        }
        Ok(())
    }
}

pub(crate) fn check_discharge_order(
    admit: NaiveDateTime,
    discharge: NaiveDateTime,
) -> Result<(), ValidationError> {
    if discharge < admit {
        return Err(ValidationError::invalid(
            Hospitalization::NAME,
            "discharge_datetime",
            "must not precede admission",
        ));
    }
    Ok(())
}

updatable_fields! {
    /// Updatable hospitalization columns.
    ///
    /// Ordering between admission and discharge involves two columns, so the
    /// repository checks it against the stored row when either one changes.
    pub enum HospitalizationField for "hospitalization" in "hospitalization" by "hospitalization_id" {
        /// Admitted patient.
        PatientId => "patient_id": Integer;
        /// Department holding the bed.
        DepartmentId => "department_id": Integer;
        /// Admission time.
        AdmitDateTime => "admit_datetime": DateTime;
        /// Discharge time; null while the stay is current.
        DischargeDateTime => "discharge_datetime": DateTime, nullable;
        /// Bed label.
        BedNumber => "bed_number": Text, nullable;
        /// Reason for admission.
        Reason => "reason": Text, nullable;
    }
    check = check_hospitalization_field;
}

fn check_hospitalization_field(
    field: &HospitalizationField,
    value: &FieldValue,
    _now: NaiveDateTime,
) -> Result<(), ValidationError> {
    match (field, value) {
        (HospitalizationField::PatientId, FieldValue::Integer(id)) => {
            require_positive_id(Hospitalization::NAME, "patient_id", *id)
        }
        (HospitalizationField::DepartmentId, FieldValue::Integer(id)) => {
            require_positive_id(Hospitalization::NAME, "department_id", *id)
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn admitted() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 11, 2)
            .unwrap()
            .and_hms_opt(14, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_new_stay_is_current() {
        let stay = Hospitalization::admit(1, 1, admitted()).with_bed("12B");
        assert!(stay.is_current());
        assert!(stay.validate().is_ok());
    }

    #[test]
    fn test_discharge_before_admission_rejected() {
        let stay = Hospitalization::admit(1, 1, admitted()).discharged_at(admitted() - Duration::hours(1));
        assert!(!stay.is_current());
        let err = stay.validate().unwrap_err();
        assert!(err.to_string().contains("discharge_datetime"));
    }

    #[test]
    fn test_same_instant_discharge_allowed() {
        let stay = Hospitalization::admit(1, 1, admitted()).discharged_at(admitted());
        assert!(stay.validate().is_ok());
    }
}
