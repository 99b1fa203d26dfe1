use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{Entity, require_non_blank};
use crate::core::field::{FieldValue, updatable_fields};
use crate::error::ValidationError;

/// A hospital department.
///
/// `capacity` is the number of beds used as the denominator of occupancy
/// reports. It does not limit admissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    /// Generated identifier.
    pub id: Option<i64>,
    /// Unique department name.
    pub name: String,
    /// Bed count, never negative.
    pub capacity: Option<i64>,
}

impl Department {
    /// Creates an unsaved department with the given bed capacity.
    pub fn new(name: impl Into<String>, capacity: Option<i64>) -> Self {
        Self {
            id: None,
            name: name.into().trim().to_string(),
            capacity,
        }
    }
}

impl Entity for Department {
    const NAME: &'static str = "department";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn validate_at(&self, _now: NaiveDateTime) -> Result<(), ValidationError> {
        require_non_blank(Self::NAME, "name", &self.name)?;
        if let Some(capacity) = self.capacity {
            check_capacity(capacity)?;
        }
        Ok(())
    }
}

fn check_capacity(capacity: i64) -> Result<(), ValidationError> {
    if capacity < 0 {
        return Err(ValidationError::invalid(
            Department::NAME,
            "capacity",
            "must not be negative",
        ));
    }
    Ok(())
}

updatable_fields! {
    /// Updatable department columns.
    pub enum DepartmentField for "department" in "department" by "department_id" {
        /// Department name, unique ignoring case.
        Name => "name": Text;
        /// Bed count; null when unknown.
        Capacity => "capacity": Integer, nullable;
    }
    check = check_department_field;
}

fn check_department_field(
    field: &DepartmentField,
    value: &FieldValue,
    _now: NaiveDateTime,
) -> Result<(), ValidationError> {
    match (field, value) {
        (DepartmentField::Name, FieldValue::Text(s)) => {
            require_non_blank(Department::NAME, "name", s)
        }
        (DepartmentField::Capacity, FieldValue::Integer(c)) => check_capacity(*c),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::UpdatableField;

    #[test]
    fn test_capacity_rules() {
        assert!(Department::new("ICU", Some(0)).validate().is_ok());
        assert!(Department::new("ICU", None).validate().is_ok());
        assert!(Department::new("ICU", Some(-2)).validate().is_err());
        assert!(
            DepartmentField::Capacity
                .validate(&FieldValue::Integer(-1))
                .is_err()
        );
    }

    #[test]
    fn test_name_is_trimmed_and_required() {
        assert_eq!(Department::new(" Cardiology ", Some(2)).name, "Cardiology");
        assert!(Department::new("   ", Some(2)).validate().is_err());
    }
}
