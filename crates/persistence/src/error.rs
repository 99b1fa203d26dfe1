//! Error types for the persistence layer.
//!
//! This module defines all error types used throughout the persistence layer,
//! following a hierarchy that separates validation errors (raised before any
//! query is issued), integrity errors (constraint rejections reported by the
//! store) and backend errors (the store failed or answered with an unexpected
//! shape).
//!
//! A missing row is not an error: lookups return `Option` or an empty `Vec`.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use thiserror::Error;

/// The primary error type for all storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Entity invariant violated before persistence
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Constraint rejected by the store
    #[error(transparent)]
    Integrity(#[from] IntegrityError),

    /// Backend-specific errors
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl StorageError {
    /// Returns true if this error is a foreign-key rejection.
    pub fn is_referential_integrity(&self) -> bool {
        matches!(
            self,
            StorageError::Integrity(IntegrityError::ReferentialIntegrity { .. })
        )
    }

    /// Returns true if this error was raised before reaching storage.
    pub fn is_validation(&self) -> bool {
        matches!(self, StorageError::Validation(_))
    }
}

/// Errors raised when an entity or field value breaks an invariant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A field holds a value the entity does not accept.
    #[error("invalid {entity}.{field}: {message}")]
    InvalidField {
        entity: &'static str,
        field: &'static str,
        message: String,
    },

    /// A field name outside the entity's updatable allow-list.
    #[error("unknown {entity} field: {field}")]
    UnknownField { entity: &'static str, field: String },

    /// The operation needs a persisted entity but got one without an id.
    #[error("{entity} has no id")]
    MissingId { entity: &'static str },
}

impl ValidationError {
    pub(crate) fn invalid(
        entity: &'static str,
        field: &'static str,
        message: impl Into<String>,
    ) -> Self {
        ValidationError::InvalidField {
            entity,
            field,
            message: message.into(),
        }
    }
}

/// Errors reported by the store's constraint checks.
#[derive(Error, Debug)]
pub enum IntegrityError {
    /// A foreign key blocked the operation.
    #[error("{operation} of {entity} {} blocked by a foreign key: {message}", display_id(.id))]
    ReferentialIntegrity {
        entity: &'static str,
        id: Option<i64>,
        operation: &'static str,
        message: String,
    },

    /// A unique business key already exists.
    #[error("duplicate {entity}: {message}")]
    UniqueViolation {
        entity: &'static str,
        message: String,
    },
}

fn display_id(id: &Option<i64>) -> String {
    match id {
        Some(id) => id.to_string(),
        None => "(new)".to_string(),
    }
}

/// Errors originating from the database backend.
#[derive(Error, Debug)]
pub enum BackendError {
    /// Connection to the backend failed.
    #[error("connection failed to {backend_name}: {message}")]
    ConnectionFailed {
        backend_name: String,
        message: String,
    },

    /// Internal backend error.
    #[error("internal error in {backend_name}: {message}")]
    Internal {
        backend_name: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Query execution error.
    #[error("query execution failed: {message}")]
    QueryError { message: String },

    /// Schema creation failed.
    #[error("schema initialization failed: {message}")]
    SchemaError { message: String },

    /// The store reported zero affected rows for a write that must touch one.
    #[error("{operation} of {entity} affected no rows")]
    NoRowsAffected {
        entity: &'static str,
        operation: &'static str,
    },

    /// An insert succeeded but produced no identifier.
    #[error("insert of {entity} returned no generated id")]
    MissingGeneratedId { entity: &'static str },

    /// A single-row write by primary key touched more than one row.
    #[error("expected at most one {entity} row for id {id}, store reported {count}")]
    UnexpectedRowCount {
        entity: &'static str,
        id: i64,
        count: usize,
    },

    /// A stored value could not be mapped back into the entity.
    #[error("invalid value in {entity}.{column}: {value}")]
    InvalidColumnValue {
        entity: &'static str,
        column: &'static str,
        value: String,
    },
}

/// Result type alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        // Row mappers report unreadable stored values as a boxed BackendError.
        let err = match err {
            rusqlite::Error::FromSqlConversionFailure(idx, ty, source) => {
                match source.downcast::<BackendError>() {
                    Ok(backend) => return StorageError::Backend(*backend),
                    Err(source) => rusqlite::Error::FromSqlConversionFailure(idx, ty, source),
                }
            }
            other => other,
        };
        let malformed = matches!(
            &err,
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: rusqlite::ErrorCode::Unknown,
                    ..
                },
                _,
            ) | rusqlite::Error::InvalidColumnName(_)
                | rusqlite::Error::InvalidColumnIndex(_)
                | rusqlite::Error::InvalidColumnType(..)
                | rusqlite::Error::InvalidParameterCount(..)
                | rusqlite::Error::InvalidParameterName(_)
        );
        if malformed {
            return StorageError::Backend(BackendError::QueryError {
                message: err.to_string(),
            });
        }
        StorageError::Backend(BackendError::Internal {
            backend_name: "sqlite".to_string(),
            message: err.to_string(),
            source: Some(Box::new(err)),
        })
    }
}

#[cfg(feature = "sqlite")]
impl From<r2d2::Error> for StorageError {
    fn from(err: r2d2::Error) -> Self {
        StorageError::Backend(BackendError::ConnectionFailed {
            backend_name: "sqlite".to_string(),
            message: err.to_string(),
        })
    }
}
