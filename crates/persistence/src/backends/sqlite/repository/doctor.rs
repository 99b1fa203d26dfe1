use rusqlite::{Row, params};

use crate::backends::sqlite::SqliteBackend;
use crate::core::{FieldValue, Repository};
use crate::error::StorageResult;
use crate::types::{Doctor, DoctorField, Entity};

/// Repository over the `doctor` table.
#[derive(Debug, Clone, Copy)]
pub struct DoctorRepository<'a> {
    backend: &'a SqliteBackend,
}

pub(crate) fn map_doctor(row: &Row<'_>) -> rusqlite::Result<Doctor> {
    Ok(Doctor {
        id: Some(row.get("doctor_id")?),
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        specialty: row.get("specialty")?,
        phone: row.get("phone")?,
        department_id: row.get("department_id")?,
    })
}

impl<'a> DoctorRepository<'a> {
    pub(crate) fn new(backend: &'a SqliteBackend) -> Self {
        Self { backend }
    }

    /// Doctors assigned to a department, by id.
    pub fn find_by_department_id(&self, department_id: i64) -> StorageResult<Vec<Doctor>> {
        self.backend.query_list(
            "SELECT doctor_id, first_name, last_name, specialty, phone, department_id
             FROM doctor WHERE department_id = ?1 ORDER BY doctor_id",
            [department_id],
            map_doctor,
        )
    }

    /// Doctors assigned to the department with this name, in any case.
    pub fn find_by_department_name(&self, name: &str) -> StorageResult<Vec<Doctor>> {
        self.backend.query_list(
            "SELECT d.doctor_id, d.first_name, d.last_name, d.specialty, d.phone, d.department_id
             FROM doctor d
             JOIN department dep ON dep.department_id = d.department_id
             WHERE fold_case(dep.name) = fold_case(?1)
             ORDER BY d.doctor_id",
            [name.trim()],
            map_doctor,
        )
    }

    /// Number of doctors.
    pub fn count(&self) -> StorageResult<u64> {
        self.backend.query_count("SELECT COUNT(*) FROM doctor", [])
    }
}

impl Repository for DoctorRepository<'_> {
    type Entity = Doctor;
    type Field = DoctorField;

    fn insert(&self, mut doctor: Doctor) -> StorageResult<Doctor> {
        doctor.validate()?;
        let id = self.backend.insert_row(
            Doctor::NAME,
            "INSERT INTO doctor (first_name, last_name, specialty, phone, department_id)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                doctor.first_name,
                doctor.last_name,
                doctor.specialty,
                doctor.phone,
                doctor.department_id,
            ],
        )?;
        doctor.id = Some(id);
        Ok(doctor)
    }

    fn find_by_id(&self, id: i64) -> StorageResult<Option<Doctor>> {
        self.backend.query_optional(
            "SELECT doctor_id, first_name, last_name, specialty, phone, department_id
             FROM doctor WHERE doctor_id = ?1",
            [id],
            map_doctor,
        )
    }

    fn find_all(&self) -> StorageResult<Vec<Doctor>> {
        self.backend.query_list(
            "SELECT doctor_id, first_name, last_name, specialty, phone, department_id
             FROM doctor ORDER BY doctor_id",
            [],
            map_doctor,
        )
    }

    fn update(&self, doctor: &Doctor) -> StorageResult<usize> {
        let id = doctor.require_id()?;
        doctor.validate()?;
        self.backend.write_by_id(
            Doctor::NAME,
            id,
            "update",
            "UPDATE doctor SET first_name = ?1, last_name = ?2, specialty = ?3,
                phone = ?4, department_id = ?5
             WHERE doctor_id = ?6",
            params![
                doctor.first_name,
                doctor.last_name,
                doctor.specialty,
                doctor.phone,
                doctor.department_id,
                id,
            ],
        )
    }

    fn update_field(&self, id: i64, field: DoctorField, value: FieldValue) -> StorageResult<usize> {
        self.backend.update_single_field(id, field, &value)
    }

    fn delete_by_id(&self, id: i64) -> StorageResult<usize> {
        self.backend.write_by_id(
            Doctor::NAME,
            id,
            "delete",
            "DELETE FROM doctor WHERE doctor_id = ?1",
            [id],
        )
    }
}
