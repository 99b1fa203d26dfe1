use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{Entity, require_digits, require_non_blank, require_positive_id};
use crate::core::field::{FieldValue, updatable_fields};
use crate::error::ValidationError;

/// A doctor, optionally attached to one department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Doctor {
    /// Generated identifier.
    pub id: Option<i64>,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Medical specialty.
    pub specialty: String,
    /// Contact phone, digits only.
    pub phone: Option<String>,
    /// Owning department; `None` for unassigned doctors.
    pub department_id: Option<i64>,
}

impl Doctor {
    /// Creates an unsaved, unassigned doctor.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        specialty: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            first_name: first_name.into().trim().to_string(),
            last_name: last_name.into().trim().to_string(),
            specialty: specialty.into().trim().to_string(),
            phone: None,
            department_id: None,
        }
    }

    /// Assigns the doctor to a department.
    pub fn in_department(mut self, department_id: i64) -> Self {
        self.department_id = Some(department_id);
        self
    }

    /// Sets the phone number.
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }
}

impl Entity for Doctor {
    const NAME: &'static str = "doctor";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn validate_at(&self, _now: NaiveDateTime) -> Result<(), ValidationError> {
        require_non_blank(Self::NAME, "first_name", &self.first_name)?;
        require_non_blank(Self::NAME, "last_name", &self.last_name)?;
        require_non_blank(Self::NAME, "specialty", &self.specialty)?;
        if let Some(phone) = &self.phone {
            require_digits(Self::NAME, "phone", phone)?;
        }
        if let Some(department_id) = self.department_id {
            require_positive_id(Self::NAME, "department_id", department_id)?;
        }
        Ok(())
    }
}

updatable_fields! {
    /// Updatable doctor columns.
    pub enum DoctorField for "doctor" in "doctor" by "doctor_id" {
        /// Given name.
        FirstName => "first_name": Text;
        /// Family name.
        LastName => "last_name": Text;
        /// Medical specialty.
        Specialty => "specialty": Text;
        /// Contact phone.
        Phone => "phone": Text, nullable;
        /// Assigned department; null for unassigned doctors.
        DepartmentId => "department_id": Integer, nullable;
    }
    check = check_doctor_field;
}

fn check_doctor_field(
    field: &DoctorField,
    value: &FieldValue,
    _now: NaiveDateTime,
) -> Result<(), ValidationError> {
    match (field, value) {
        (DoctorField::FirstName, FieldValue::Text(s)) => {
            require_non_blank(Doctor::NAME, "first_name", s)
        }
        (DoctorField::LastName, FieldValue::Text(s)) => {
            require_non_blank(Doctor::NAME, "last_name", s)
        }
        (DoctorField::Specialty, FieldValue::Text(s)) => {
            require_non_blank(Doctor::NAME, "specialty", s)
        }
        (DoctorField::Phone, FieldValue::Text(s)) => require_digits(Doctor::NAME, "phone", s),
        (DoctorField::DepartmentId, FieldValue::Integer(id)) => {
            require_positive_id(Doctor::NAME, "department_id", *id)
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::UpdatableField;

    #[test]
    fn test_unassigned_doctor_is_valid() {
        let doctor = Doctor::new("Eleni", "Katsarou", "Cardiology");
        assert!(doctor.department_id.is_none());
        assert!(doctor.validate().is_ok());
    }

    #[test]
    fn test_blank_specialty_rejected() {
        let doctor = Doctor::new("Eleni", "Katsarou", "  ");
        let err = doctor.validate().unwrap_err();
        assert!(err.to_string().contains("specialty"));
    }

    #[test]
    fn test_department_reference_must_be_positive() {
        assert!(Doctor::new("A", "B", "C").in_department(0).validate().is_err());
        assert!(Doctor::new("A", "B", "C").in_department(3).validate().is_ok());
    }

    #[test]
    fn test_department_can_be_cleared() {
        assert!(DoctorField::DepartmentId.validate(&FieldValue::Null).is_ok());
        assert!(
            DoctorField::DepartmentId
                .validate(&FieldValue::Integer(-1))
                .is_err()
        );
        assert!(DoctorField::Specialty.validate(&FieldValue::Null).is_err());
    }
}
