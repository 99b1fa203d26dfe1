//! Per-entity repositories over the SQLite backend.
//!
//! Each repository borrows the backend and checks out one pooled connection
//! per call. No method holds a connection while calling another method that
//! needs one, so a single-connection pool never blocks on itself.

mod appointment;
mod department;
mod doctor;
mod hospitalization;
mod medical_record;
mod patient;

pub use appointment::AppointmentRepository;
pub use department::DepartmentRepository;
pub use doctor::DoctorRepository;
pub use hospitalization::HospitalizationRepository;
pub use medical_record::MedicalRecordRepository;
pub use patient::PatientRepository;

pub(crate) use doctor::map_doctor;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, Value, ValueRef};
use rusqlite::{Params, Row, ToSql};
use tracing::{debug, warn};

use super::SqliteBackend;
use crate::core::{FieldValue, UpdatableField};
use crate::error::{BackendError, IntegrityError, StorageError, StorageResult};
use crate::types::Gender;

// ============================================================================
// Value conversions
// ============================================================================

impl ToSql for FieldValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            FieldValue::Null => Ok(ToSqlOutput::Owned(Value::Null)),
            FieldValue::Integer(i) => Ok(ToSqlOutput::from(*i)),
            FieldValue::Text(s) => Ok(ToSqlOutput::from(s.as_str())),
            FieldValue::Date(d) => d.to_sql(),
            FieldValue::DateTime(dt) => dt.to_sql(),
        }
    }
}

impl ToSql for Gender {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Gender {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;
        text.parse().map_err(|_| {
            FromSqlError::Other(Box::new(BackendError::InvalidColumnValue {
                entity: "patient",
                column: "gender",
                value: text.to_string(),
            }))
        })
    }
}

// ============================================================================
// Error classification
// ============================================================================

/// Maps constraint failures to integrity errors carrying the operation's
/// context. Anything else goes through the generic conversion.
pub(crate) fn classify_write_error(
    err: rusqlite::Error,
    entity: &'static str,
    id: Option<i64>,
    operation: &'static str,
) -> StorageError {
    if let rusqlite::Error::SqliteFailure(ffi_err, message) = &err {
        let message = message.clone().unwrap_or_else(|| ffi_err.to_string());
        match ffi_err.extended_code {
            rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY => {
                warn!(entity, id, operation, "Rejected by foreign key");
                return IntegrityError::ReferentialIntegrity {
                    entity,
                    id,
                    operation,
                    message,
                }
                .into();
            }
            rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE => {
                warn!(entity, operation, "Rejected by unique constraint");
                return IntegrityError::UniqueViolation { entity, message }.into();
            }
            _ => {}
        }
    }
    err.into()
}

/// A write addressed by primary key touches at most one row.
pub(crate) fn single_row(entity: &'static str, id: i64, rows: usize) -> StorageResult<usize> {
    if rows > 1 {
        return Err(BackendError::UnexpectedRowCount {
            entity,
            id,
            count: rows,
        }
        .into());
    }
    Ok(rows)
}

// ============================================================================
// Query helpers
// ============================================================================

impl SqliteBackend {
    /// Runs a query expected to return at most one row.
    pub(crate) fn query_optional<T, P, F>(&self, sql: &str, params: P, map: F) -> StorageResult<Option<T>>
    where
        P: Params,
        F: FnOnce(&Row<'_>) -> rusqlite::Result<T>,
    {
        let conn = self.get_connection()?;
        match conn.query_row(sql, params, map) {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Runs a query and maps every row.
    pub(crate) fn query_list<T, P, F>(&self, sql: &str, params: P, map: F) -> StorageResult<Vec<T>>
    where
        P: Params,
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        let conn = self.get_connection()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map(params, map)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Runs a `COUNT(*)` style query.
    pub(crate) fn query_count<P: Params>(&self, sql: &str, params: P) -> StorageResult<u64> {
        let conn = self.get_connection()?;
        let count: i64 = conn.query_row(sql, params, |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }

    /// Inserts one row and returns its generated id.
    pub(crate) fn insert_row<P: Params>(
        &self,
        entity: &'static str,
        sql: &str,
        params: P,
    ) -> StorageResult<i64> {
        let conn = self.get_connection()?;
        let rows = conn
            .execute(sql, params)
            .map_err(|e| classify_write_error(e, entity, None, "insert"))?;
        if rows == 0 {
            return Err(BackendError::NoRowsAffected {
                entity,
                operation: "insert",
            }
            .into());
        }

        let id = conn.last_insert_rowid();
        if id <= 0 {
            return Err(BackendError::MissingGeneratedId { entity }.into());
        }

        debug!(entity, id, "Inserted row");
        Ok(id)
    }

    /// Runs an `UPDATE` or `DELETE` addressed by primary key.
    pub(crate) fn write_by_id<P: Params>(
        &self,
        entity: &'static str,
        id: i64,
        operation: &'static str,
        sql: &str,
        params: P,
    ) -> StorageResult<usize> {
        let conn = self.get_connection()?;
        let rows = conn
            .execute(sql, params)
            .map_err(|e| classify_write_error(e, entity, Some(id), operation))?;
        debug!(entity, id, operation, rows, "Wrote row");
        single_row(entity, id, rows)
    }

    /// Validates and writes one column through the token's fixed statement.
    pub(crate) fn update_single_field<F: UpdatableField>(
        &self,
        id: i64,
        field: F,
        value: &FieldValue,
    ) -> StorageResult<usize> {
        field.validate(value)?;
        debug!(entity = F::ENTITY, id, field = %field, "Updating field");
        self.write_by_id(
            F::ENTITY,
            id,
            "update",
            field.update_statement(),
            rusqlite::params![value, id],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Repository;
    use crate::types::{Department, Doctor};

    fn backend() -> SqliteBackend {
        let backend = SqliteBackend::in_memory().unwrap();
        backend.init_schema().unwrap();
        backend
    }

    #[test]
    fn test_single_row() {
        assert_eq!(single_row("patient", 1, 0).unwrap(), 0);
        assert_eq!(single_row("patient", 1, 1).unwrap(), 1);
        let err = single_row("patient", 1, 3).unwrap_err();
        assert!(matches!(
            err,
            StorageError::Backend(BackendError::UnexpectedRowCount { count: 3, .. })
        ));
    }

    #[test]
    fn test_foreign_key_violation_classified() {
        let backend = backend();
        let err = backend
            .doctors()
            .insert(Doctor::new("Anna", "Vlachou", "Surgery").in_department(99))
            .unwrap_err();
        match err {
            StorageError::Integrity(IntegrityError::ReferentialIntegrity {
                entity,
                id,
                operation,
                ..
            }) => {
                assert_eq!(entity, "doctor");
                assert_eq!(id, None);
                assert_eq!(operation, "insert");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unique_violation_classified() {
        let backend = backend();
        backend
            .departments()
            .insert(Department::new("ICU", Some(4)))
            .unwrap();
        let err = backend
            .departments()
            .insert(Department::new("icu", Some(6)))
            .unwrap_err();
        assert!(matches!(
            err,
            StorageError::Integrity(IntegrityError::UniqueViolation {
                entity: "department",
                ..
            })
        ));
    }

    #[test]
    fn test_invalid_stored_gender_reported() {
        let backend = backend();
        {
            let conn = backend.get_connection().unwrap();
            // Bypass the CHECK constraint to simulate a legacy row.
            conn.execute_batch(
                "PRAGMA ignore_check_constraints = ON;
                 INSERT INTO patient (first_name, last_name, date_of_birth, gender, amka)
                 VALUES ('A', 'B', '1980-01-01', 'X', '1');
                 PRAGMA ignore_check_constraints = OFF;",
            )
            .unwrap();
        }

        let err = backend.patients().find_all().unwrap_err();
        match err {
            StorageError::Backend(BackendError::InvalidColumnValue { column, value, .. }) => {
                assert_eq!(column, "gender");
                assert_eq!(value, "X");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
