use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::{Entity, require_digits, require_non_blank};
use crate::core::field::{FieldValue, updatable_fields};
use crate::error::ValidationError;

/// Administrative gender recorded for a patient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    /// Male.
    M,
    /// Female.
    F,
}

impl Gender {
    /// Returns the stored code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::M => "M",
            Gender::F => "F",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "M" => Ok(Gender::M),
            "F" => Ok(Gender::F),
            _ => Err(ValidationError::invalid(
                Patient::NAME,
                "gender",
                "must be 'M' or 'F'",
            )),
        }
    }
}

/// A registered patient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    /// Generated identifier.
    pub id: Option<i64>,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Date of birth, never in the future.
    pub date_of_birth: NaiveDate,
    /// Gender, if recorded.
    pub gender: Option<Gender>,
    /// Contact phone, digits only.
    pub phone: Option<String>,
    /// National social security number (AMKA), the business key.
    pub amka: String,
}

impl Patient {
    /// Creates an unsaved patient; names are trimmed.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        date_of_birth: NaiveDate,
        amka: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            first_name: first_name.into().trim().to_string(),
            last_name: last_name.into().trim().to_string(),
            date_of_birth,
            gender: None,
            phone: None,
            amka: amka.into().trim().to_string(),
        }
    }

    /// Sets the gender.
    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = Some(gender);
        self
    }

    /// Sets the phone number.
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Returns "first last".
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl Entity for Patient {
    const NAME: &'static str = "patient";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn validate_at(&self, now: NaiveDateTime) -> Result<(), ValidationError> {
        require_non_blank(Self::NAME, "first_name", &self.first_name)?;
        require_non_blank(Self::NAME, "last_name", &self.last_name)?;
        require_non_blank(Self::NAME, "amka", &self.amka)?;
        check_date_of_birth(self.date_of_birth, now)?;
        if let Some(phone) = &self.phone {
            require_digits(Self::NAME, "phone", phone)?;
        }
        Ok(())
    }
}

fn check_date_of_birth(date_of_birth: NaiveDate, now: NaiveDateTime) -> Result<(), ValidationError> {
    if date_of_birth > now.date() {
        return Err(ValidationError::invalid(
            Patient::NAME,
            "date_of_birth",
            "must not be in the future",
        ));
    }
    Ok(())
}

updatable_fields! {
    /// Updatable patient columns.
    pub enum PatientField for "patient" in "patient" by "patient_id" {
        /// Given name.
        FirstName => "first_name": Text;
        /// Family name.
        LastName => "last_name": Text;
        /// Date of birth; not after today.
        DateOfBirth => "date_of_birth": Date;
        /// `M` or `F`.
        Gender => "gender": Text, nullable;
        /// Contact phone.
        Phone => "phone": Text, nullable;
        /// Social security number, unique.
        Amka => "amka": Text;
    }
    check = check_patient_field;
}

fn check_patient_field(
    field: &PatientField,
    value: &FieldValue,
    now: NaiveDateTime,
) -> Result<(), ValidationError> {
    match (field, value) {
        (PatientField::FirstName, FieldValue::Text(s)) => {
            require_non_blank(Patient::NAME, "first_name", s)
        }
        (PatientField::LastName, FieldValue::Text(s)) => {
            require_non_blank(Patient::NAME, "last_name", s)
        }
        (PatientField::Amka, FieldValue::Text(s)) => require_non_blank(Patient::NAME, "amka", s),
        (PatientField::DateOfBirth, FieldValue::Date(d)) => check_date_of_birth(*d, now),
        (PatientField::Gender, FieldValue::Text(s)) => {
            // Stored codes are upper case only.
            if s != Gender::M.as_str() && s != Gender::F.as_str() {
                return Err(ValidationError::invalid(
                    Patient::NAME,
                    "gender",
                    "must be 'M' or 'F'",
                ));
            }
            Ok(())
        }
        (PatientField::Phone, FieldValue::Text(s)) => require_digits(Patient::NAME, "phone", s),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::UpdatableField;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn patient() -> Patient {
        Patient::new(
            "Nikos",
            "Georgiou",
            NaiveDate::from_ymd_opt(1970, 2, 3).unwrap(),
            "03027001234",
        )
    }

    #[test]
    fn test_new_trims_names() {
        let p = Patient::new(" A ", " B\t", NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(), " 1 ");
        assert_eq!(p.first_name, "A");
        assert_eq!(p.last_name, "B");
        assert_eq!(p.amka, "1");
        assert_eq!(p.full_name(), "A B");
    }

    #[test]
    fn test_valid_patient() {
        let p = patient().with_gender(Gender::M).with_phone("6971234567");
        assert!(p.validate_at(now()).is_ok());
    }

    #[test]
    fn test_future_birth_date_rejected() {
        let mut p = patient();
        p.date_of_birth = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let err = p.validate_at(now()).unwrap_err();
        assert!(err.to_string().contains("date_of_birth"));

        // Born today is fine.
        p.date_of_birth = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        assert!(p.validate_at(now()).is_ok());
    }

    #[test]
    fn test_blank_names_rejected() {
        let mut p = patient();
        p.last_name = "  ".to_string();
        assert!(p.validate_at(now()).is_err());
    }

    #[test]
    fn test_non_digit_phone_rejected() {
        let p = patient().with_phone("69-71");
        assert!(p.validate_at(now()).is_err());
    }

    #[test]
    fn test_gender_parsing() {
        assert_eq!("m".parse::<Gender>().unwrap(), Gender::M);
        assert_eq!(" F ".parse::<Gender>().unwrap(), Gender::F);
        assert!("X".parse::<Gender>().is_err());
        assert_eq!(Gender::F.to_string(), "F");
    }

    #[test]
    fn test_field_rules() {
        assert!(
            PatientField::Gender
                .validate_at(&FieldValue::from("F"), now())
                .is_ok()
        );
        assert!(
            PatientField::Gender
                .validate_at(&FieldValue::from("female"), now())
                .is_err()
        );
        assert!(
            PatientField::Gender
                .validate_at(&FieldValue::Null, now())
                .is_ok()
        );
        assert!(
            PatientField::Amka
                .validate_at(&FieldValue::Null, now())
                .is_err()
        );
        assert!(
            PatientField::DateOfBirth
                .validate_at(
                    &FieldValue::Date(NaiveDate::from_ymd_opt(2030, 1, 1).unwrap()),
                    now()
                )
                .is_err()
        );
    }
}
