//! Backend abstraction for storage drivers.
//!
//! This module defines the [`Backend`] trait implemented by every storage
//! driver. The repository, summary and analytics traits are implemented on
//! top of a backend handle; the backend itself only owns connections and the
//! schema.

use std::fmt::Debug;

use crate::error::BackendError;

/// Identifies the type of storage backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// SQLite database (file-based or in-memory).
    Sqlite,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Sqlite => write!(f, "sqlite"),
        }
    }
}

/// A storage backend holding a pool of connections to one relational store.
///
/// All methods are blocking. A connection is checked out per operation and
/// returned when the operation finishes, on success and failure alike.
pub trait Backend: Send + Sync + Debug {
    /// Returns the kind of backend.
    fn kind(&self) -> BackendKind;

    /// Returns a human-readable name for this backend.
    fn name(&self) -> &'static str;

    /// Checks if the backend is healthy and accepting connections.
    fn health_check(&self) -> Result<(), BackendError>;

    /// Creates tables and reporting views if they do not exist yet.
    fn initialize(&self) -> Result<(), BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_kind_display() {
        assert_eq!(BackendKind::Sqlite.to_string(), "sqlite");
    }
}
