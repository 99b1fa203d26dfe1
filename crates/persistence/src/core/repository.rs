//! Uniform per-entity repository contract.

use crate::core::field::{FieldValue, UpdatableField};
use crate::error::StorageResult;
use crate::types::Entity;

/// CRUD access to one entity table.
///
/// Every write validates its input before touching storage, so a
/// [`ValidationError`](crate::error::ValidationError) always means no query
/// was issued. Lookups that find nothing return `None` or an empty `Vec`.
///
/// # Example
///
/// ```
/// use wardbook_persistence::backends::sqlite::SqliteBackend;
/// use wardbook_persistence::core::{FieldValue, Repository};
/// use wardbook_persistence::types::{Department, DepartmentField};
///
/// let backend = SqliteBackend::in_memory().unwrap();
/// backend.init_schema().unwrap();
///
/// let icu = backend
///     .departments()
///     .insert(Department::new("ICU", Some(8)))
///     .unwrap();
/// let id = icu.id.unwrap();
///
/// let rows = backend
///     .departments()
///     .update_field(id, DepartmentField::Capacity, FieldValue::Null)
///     .unwrap();
/// assert_eq!(rows, 1);
///
/// let stored = backend.departments().find_by_id(id).unwrap().unwrap();
/// assert_eq!(stored.capacity, None);
/// ```
pub trait Repository {
    /// The entity stored by this repository.
    type Entity: Entity;

    /// The closed set of columns accepted by [`Repository::update_field`].
    type Field: UpdatableField;

    /// Validates and inserts the entity, returning it with its generated id.
    fn insert(&self, entity: Self::Entity) -> StorageResult<Self::Entity>;

    /// Fetches one entity by primary key.
    fn find_by_id(&self, id: i64) -> StorageResult<Option<Self::Entity>>;

    /// Fetches every entity in the table's natural order.
    fn find_all(&self) -> StorageResult<Vec<Self::Entity>>;

    /// Overwrites every column of the row identified by the entity's id.
    ///
    /// Returns the number of rows written: 0 when the row does not exist.
    fn update(&self, entity: &Self::Entity) -> StorageResult<usize>;

    /// Writes a single column of one row.
    ///
    /// Returns 0 when the id does not exist and 1 otherwise.
    fn update_field(&self, id: i64, field: Self::Field, value: FieldValue) -> StorageResult<usize>;

    /// Same as [`Repository::update_field`], resolving the column by name.
    ///
    /// Names outside the entity's allow-list are rejected before any query.
    fn update_field_by_name(
        &self,
        id: i64,
        column: &str,
        value: FieldValue,
    ) -> StorageResult<usize> {
        let field: Self::Field = column.parse()?;
        self.update_field(id, field, value)
    }

    /// Deletes one row by primary key, returning 0 or 1.
    fn delete_by_id(&self, id: i64) -> StorageResult<usize>;
}
