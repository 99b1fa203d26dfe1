//! Single-column partial updates.
//!
//! Every entity exposes a closed enumeration of updatable field tokens. Each
//! token knows its column, its value kind, whether it accepts `NULL`, and the
//! one parameterized `UPDATE` statement that writes it. The statements are
//! assembled with `concat!` from literal table and column names, so no caller
//! string ever reaches the SQL text.
//!
//! ```
//! use wardbook_persistence::core::{FieldValue, UpdatableField};
//! use wardbook_persistence::types::DepartmentField;
//!
//! let field: DepartmentField = "capacity".parse().unwrap();
//! assert_eq!(field, DepartmentField::Capacity);
//! assert_eq!(
//!     field.update_statement(),
//!     "UPDATE department SET capacity = ?1 WHERE department_id = ?2"
//! );
//! assert!(field.validate(&FieldValue::Null).is_ok());
//! assert!("budget".parse::<DepartmentField>().is_err());
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::ValidationError;

/// The storage kind of an updatable column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Integer column (identifiers, capacities).
    Integer,
    /// Text column.
    Text,
    /// Calendar date column.
    Date,
    /// Timestamp column.
    DateTime,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Integer => write!(f, "integer"),
            FieldKind::Text => write!(f, "text"),
            FieldKind::Date => write!(f, "date"),
            FieldKind::DateTime => write!(f, "datetime"),
        }
    }
}

/// A typed value for a single-column update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Clears a nullable column.
    Null,
    /// Integer value.
    Integer(i64),
    /// Text value.
    Text(String),
    /// Calendar date.
    Date(NaiveDate),
    /// Timestamp.
    DateTime(NaiveDateTime),
}

impl FieldValue {
    /// Returns the kind of this value, or `None` for `Null`.
    pub fn kind(&self) -> Option<FieldKind> {
        match self {
            FieldValue::Null => None,
            FieldValue::Integer(_) => Some(FieldKind::Integer),
            FieldValue::Text(_) => Some(FieldKind::Text),
            FieldValue::Date(_) => Some(FieldKind::Date),
            FieldValue::DateTime(_) => Some(FieldKind::DateTime),
        }
    }

    /// Returns true for `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Returns the text payload, if any.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer payload, if any.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the date payload, if any.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Returns the timestamp payload, if any.
    pub fn as_date_time(&self) -> Option<NaiveDateTime> {
        match self {
            FieldValue::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        FieldValue::Date(value)
    }
}

impl From<NaiveDateTime> for FieldValue {
    fn from(value: NaiveDateTime) -> Self {
        FieldValue::DateTime(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

/// A token from an entity's closed set of updatable columns.
pub trait UpdatableField:
    Copy + Eq + fmt::Debug + fmt::Display + FromStr<Err = ValidationError> + Send + Sync + 'static
{
    /// Entity name used in errors and logs.
    const ENTITY: &'static str;

    /// Every token of this entity, in declaration order.
    fn all() -> &'static [Self];

    /// The column this token writes.
    fn column(&self) -> &'static str;

    /// The value kind the column stores.
    fn kind(&self) -> FieldKind;

    /// Whether the column accepts `NULL`.
    fn is_nullable(&self) -> bool;

    /// The fixed statement: `?1` is the value, `?2` the primary key.
    fn update_statement(&self) -> &'static str;

    /// Entity-specific rules for a well-shaped value.
    fn check_value(&self, value: &FieldValue, now: NaiveDateTime) -> Result<(), ValidationError>;

    /// Validates shape (kind and nullability) and then entity rules.
    fn validate(&self, value: &FieldValue) -> Result<(), ValidationError> {
        self.validate_at(value, crate::types::now())
    }

    /// Same as [`UpdatableField::validate`] against an explicit clock.
    fn validate_at(&self, value: &FieldValue, now: NaiveDateTime) -> Result<(), ValidationError> {
        match value.kind() {
            None if !self.is_nullable() => {
                return Err(ValidationError::InvalidField {
                    entity: Self::ENTITY,
                    field: self.column(),
                    message: "column is not nullable".to_string(),
                });
            }
            None => {}
            Some(kind) if kind != self.kind() => {
                return Err(ValidationError::InvalidField {
                    entity: Self::ENTITY,
                    field: self.column(),
                    message: format!("expected {} value, got {}", self.kind(), kind),
                });
            }
            Some(_) => {}
        }
        self.check_value(value, now)
    }
}

/// Declares a closed set of updatable columns for one table.
///
/// Each line is `Variant => "column": Kind` with an optional trailing
/// `, nullable`. The `check` function receives the token, a value whose shape
/// already matches, and the current time.
macro_rules! updatable_fields {
    (@nullable nullable) => { true };
    (
        $(#[$meta:meta])*
        pub enum $name:ident for $entity:literal in $table:literal by $id:literal {
            $(
                $(#[$vmeta:meta])*
                $variant:ident => $column:literal : $kind:ident $(, $nullable:ident)?;
            )+
        }
        check = $check:path;
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                $variant,
            )+
        }

        impl $crate::core::field::UpdatableField for $name {
            const ENTITY: &'static str = $entity;

            fn all() -> &'static [Self] {
                &[$($name::$variant),+]
            }

            fn column(&self) -> &'static str {
                match self {
                    $($name::$variant => $column,)+
                }
            }

            fn kind(&self) -> $crate::core::field::FieldKind {
                match self {
                    $($name::$variant => $crate::core::field::FieldKind::$kind,)+
                }
            }

            fn is_nullable(&self) -> bool {
                match self {
                    $($name::$variant => false $(|| $crate::core::field::updatable_fields!(@nullable $nullable))?,)+
                }
            }

            fn update_statement(&self) -> &'static str {
                match self {
                    $(
                        $name::$variant => concat!(
                            "UPDATE ", $table, " SET ", $column, " = ?1 WHERE ", $id, " = ?2"
                        ),
                    )+
                }
            }

            fn check_value(
                &self,
                value: &$crate::core::field::FieldValue,
                now: chrono::NaiveDateTime,
            ) -> Result<(), $crate::error::ValidationError> {
                $check(self, value, now)
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::error::ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $($column => Ok($name::$variant),)+
                    other => Err($crate::error::ValidationError::UnknownField {
                        entity: $entity,
                        field: other.to_string(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str($crate::core::field::UpdatableField::column(self))
            }
        }
    };
}

pub(crate) use updatable_fields;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{HospitalizationField, MedicalRecordField, PatientField};

    fn noon(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_field_value_conversions() {
        assert_eq!(FieldValue::from(5_i64), FieldValue::Integer(5));
        assert_eq!(FieldValue::from("x"), FieldValue::Text("x".to_string()));
        assert_eq!(FieldValue::from(None::<i64>), FieldValue::Null);
        assert_eq!(FieldValue::from(Some(3_i64)), FieldValue::Integer(3));
        assert!(FieldValue::Null.kind().is_none());
        assert_eq!(FieldValue::Integer(1).as_integer(), Some(1));
        assert_eq!(FieldValue::Integer(1).as_text(), None);
    }

    #[test]
    fn test_parse_and_display_round_trip() {
        for field in PatientField::all() {
            let parsed: PatientField = field.column().parse().unwrap();
            assert_eq!(parsed, *field);
            assert_eq!(field.to_string(), field.column());
        }
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = "patient_id; DROP TABLE patient".parse::<PatientField>().unwrap_err();
        assert!(matches!(err, ValidationError::UnknownField { entity: "patient", .. }));
    }

    #[test]
    fn test_statements_are_fixed() {
        assert_eq!(
            HospitalizationField::DischargeDateTime.update_statement(),
            "UPDATE hospitalization SET discharge_datetime = ?1 WHERE hospitalization_id = ?2"
        );
        assert_eq!(
            MedicalRecordField::DoctorId.update_statement(),
            "UPDATE medical_record SET doctor_id = ?1 WHERE record_id = ?2"
        );
    }

    #[test]
    fn test_null_only_for_nullable_columns() {
        let now = noon(2025, 1, 1);
        assert!(
            HospitalizationField::DischargeDateTime
                .validate_at(&FieldValue::Null, now)
                .is_ok()
        );
        assert!(
            HospitalizationField::AdmitDateTime
                .validate_at(&FieldValue::Null, now)
                .is_err()
        );
        assert!(
            MedicalRecordField::DoctorId
                .validate_at(&FieldValue::Null, now)
                .is_ok()
        );
        assert!(
            MedicalRecordField::Diagnosis
                .validate_at(&FieldValue::Null, now)
                .is_err()
        );
    }

    #[test]
    fn test_kind_mismatch_rejected() {
        let now = noon(2025, 1, 1);
        let err = PatientField::DateOfBirth
            .validate_at(&FieldValue::Text("1990-01-01".into()), now)
            .unwrap_err();
        match err {
            ValidationError::InvalidField { field, message, .. } => {
                assert_eq!(field, "date_of_birth");
                assert!(message.contains("expected date"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
