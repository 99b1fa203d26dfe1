use rusqlite::{Row, params};

use crate::backends::sqlite::SqliteBackend;
use crate::core::{FieldValue, Repository};
use crate::error::StorageResult;
use crate::types::{Department, DepartmentField, Entity};

/// Repository over the `department` table, plus department-level counts.
#[derive(Debug, Clone, Copy)]
pub struct DepartmentRepository<'a> {
    backend: &'a SqliteBackend,
}

fn map_department(row: &Row<'_>) -> rusqlite::Result<Department> {
    Ok(Department {
        id: Some(row.get("department_id")?),
        name: row.get("name")?,
        capacity: row.get("capacity")?,
    })
}

impl<'a> DepartmentRepository<'a> {
    pub(crate) fn new(backend: &'a SqliteBackend) -> Self {
        Self { backend }
    }

    /// Finds a department by name, ignoring case.
    pub fn find_by_name(&self, name: &str) -> StorageResult<Option<Department>> {
        self.backend.query_optional(
            "SELECT department_id, name, capacity FROM department
             WHERE fold_case(name) = fold_case(?1)",
            [name.trim()],
            map_department,
        )
    }

    /// Number of departments.
    pub fn count(&self) -> StorageResult<u64> {
        self.backend.query_count("SELECT COUNT(*) FROM department", [])
    }

    /// Number of doctors in the named department; 0 if it does not exist.
    pub fn doctor_count(&self, name: &str) -> StorageResult<u64> {
        self.backend.query_count(
            "SELECT COUNT(*) FROM doctor d
             JOIN department dep ON dep.department_id = d.department_id
             WHERE fold_case(dep.name) = fold_case(?1)",
            [name.trim()],
        )
    }

    /// Mean number of doctors over departments that have at least one.
    ///
    /// Unassigned doctors are not counted. Returns 0.0 without doctors.
    pub fn average_doctors_per_department(&self) -> StorageResult<f64> {
        let average = self.backend.query_optional(
            "SELECT AVG(doctors) FROM (
                SELECT COUNT(*) AS doctors FROM doctor
                WHERE department_id IS NOT NULL
                GROUP BY department_id
             )",
            [],
            |row| row.get::<_, Option<f64>>(0),
        )?;
        Ok(average.flatten().unwrap_or(0.0))
    }

    /// Current hospitalizations in the named department; 0 if it does not exist.
    pub fn occupancy(&self, name: &str) -> StorageResult<u64> {
        self.backend.query_count(
            "SELECT COUNT(*) FROM hospitalization h
             JOIN department dep ON dep.department_id = h.department_id
             WHERE fold_case(dep.name) = fold_case(?1) AND h.discharge_datetime IS NULL",
            [name.trim()],
        )
    }
}

impl Repository for DepartmentRepository<'_> {
    type Entity = Department;
    type Field = DepartmentField;

    fn insert(&self, mut department: Department) -> StorageResult<Department> {
        department.validate()?;
        let id = self.backend.insert_row(
            Department::NAME,
            "INSERT INTO department (name, capacity) VALUES (?1, ?2)",
            params![department.name, department.capacity],
        )?;
        department.id = Some(id);
        Ok(department)
    }

    fn find_by_id(&self, id: i64) -> StorageResult<Option<Department>> {
        self.backend.query_optional(
            "SELECT department_id, name, capacity FROM department WHERE department_id = ?1",
            [id],
            map_department,
        )
    }

    fn find_all(&self) -> StorageResult<Vec<Department>> {
        self.backend.query_list(
            "SELECT department_id, name, capacity FROM department ORDER BY department_id",
            [],
            map_department,
        )
    }

    fn update(&self, department: &Department) -> StorageResult<usize> {
        let id = department.require_id()?;
        department.validate()?;
        self.backend.write_by_id(
            Department::NAME,
            id,
            "update",
            "UPDATE department SET name = ?1, capacity = ?2 WHERE department_id = ?3",
            params![department.name, department.capacity, id],
        )
    }

    fn update_field(
        &self,
        id: i64,
        field: DepartmentField,
        value: FieldValue,
    ) -> StorageResult<usize> {
        self.backend.update_single_field(id, field, &value)
    }

    fn delete_by_id(&self, id: i64) -> StorageResult<usize> {
        self.backend.write_by_id(
            Department::NAME,
            id,
            "delete",
            "DELETE FROM department WHERE department_id = ?1",
            [id],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Doctor;

    fn backend() -> SqliteBackend {
        let backend = SqliteBackend::in_memory().unwrap();
        backend.init_schema().unwrap();
        backend
    }

    #[test]
    fn test_null_capacity_round_trip() {
        let backend = backend();
        let saved = backend
            .departments()
            .insert(Department::new("Radiology", None))
            .unwrap();
        let found = backend
            .departments()
            .find_by_id(saved.id.unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(found.capacity, None);
    }

    #[test]
    fn test_find_by_name_ignores_case() {
        let backend = backend();
        let saved = backend
            .departments()
            .insert(Department::new("Oncology", Some(5)))
            .unwrap();
        assert_eq!(
            backend.departments().find_by_name(" oncology").unwrap(),
            Some(saved)
        );
        assert_eq!(backend.departments().find_by_name("ICU").unwrap(), None);
    }

    #[test]
    fn test_doctor_statistics() {
        let backend = backend();
        let a = backend
            .departments()
            .insert(Department::new("A", Some(1)))
            .unwrap()
            .id
            .unwrap();
        let b = backend
            .departments()
            .insert(Department::new("B", Some(1)))
            .unwrap()
            .id
            .unwrap();
        backend
            .departments()
            .insert(Department::new("Empty", Some(1)))
            .unwrap();

        assert_eq!(backend.departments().average_doctors_per_department().unwrap(), 0.0);

        for dep in [a, a, a, b] {
            backend
                .doctors()
                .insert(Doctor::new("X", "Y", "Z").in_department(dep))
                .unwrap();
        }
        backend
            .doctors()
            .insert(Doctor::new("Free", "Agent", "Z"))
            .unwrap();

        assert_eq!(backend.departments().doctor_count("a").unwrap(), 3);
        assert_eq!(backend.departments().doctor_count("missing").unwrap(), 0);
        assert_eq!(backend.departments().average_doctors_per_department().unwrap(), 2.0);
        assert_eq!(backend.departments().occupancy("A").unwrap(), 0);
    }

    #[test]
    fn test_delete_blocked_by_doctor() {
        let backend = backend();
        let dep = backend
            .departments()
            .insert(Department::new("ICU", Some(3)))
            .unwrap()
            .id
            .unwrap();
        backend
            .doctors()
            .insert(Doctor::new("A", "B", "C").in_department(dep))
            .unwrap();

        let err = backend.departments().delete_by_id(dep).unwrap_err();
        assert!(err.is_referential_integrity());
        assert!(err.to_string().contains("department 1"));
        assert_eq!(backend.departments().count().unwrap(), 1);
    }
}
