use rusqlite::{Row, params};

use crate::backends::sqlite::SqliteBackend;
use crate::core::{FieldValue, Repository};
use crate::error::StorageResult;
use crate::types::{Entity, Patient, PatientField};

/// Repository over the `patient` table.
#[derive(Debug, Clone, Copy)]
pub struct PatientRepository<'a> {
    backend: &'a SqliteBackend,
}

fn map_patient(row: &Row<'_>) -> rusqlite::Result<Patient> {
    Ok(Patient {
        id: Some(row.get("patient_id")?),
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        date_of_birth: row.get("date_of_birth")?,
        gender: row.get("gender")?,
        phone: row.get("phone")?,
        amka: row.get("amka")?,
    })
}

impl<'a> PatientRepository<'a> {
    pub(crate) fn new(backend: &'a SqliteBackend) -> Self {
        Self { backend }
    }

    /// Finds the patient with the given AMKA.
    pub fn find_by_amka(&self, amka: &str) -> StorageResult<Option<Patient>> {
        self.backend.query_optional(
            "SELECT patient_id, first_name, last_name, date_of_birth, gender, phone, amka
             FROM patient WHERE amka = ?1",
            [amka.trim()],
            map_patient,
        )
    }

    /// Number of registered patients.
    pub fn count(&self) -> StorageResult<u64> {
        self.backend.query_count("SELECT COUNT(*) FROM patient", [])
    }
}

impl Repository for PatientRepository<'_> {
    type Entity = Patient;
    type Field = PatientField;

    fn insert(&self, mut patient: Patient) -> StorageResult<Patient> {
        patient.validate()?;
        let id = self.backend.insert_row(
            Patient::NAME,
            "INSERT INTO patient (first_name, last_name, date_of_birth, gender, phone, amka)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                patient.first_name,
                patient.last_name,
                patient.date_of_birth,
                patient.gender,
                patient.phone,
                patient.amka,
            ],
        )?;
        patient.id = Some(id);
        Ok(patient)
    }

    fn find_by_id(&self, id: i64) -> StorageResult<Option<Patient>> {
        self.backend.query_optional(
            "SELECT patient_id, first_name, last_name, date_of_birth, gender, phone, amka
             FROM patient WHERE patient_id = ?1",
            [id],
            map_patient,
        )
    }

    fn find_all(&self) -> StorageResult<Vec<Patient>> {
        self.backend.query_list(
            "SELECT patient_id, first_name, last_name, date_of_birth, gender, phone, amka
             FROM patient ORDER BY patient_id",
            [],
            map_patient,
        )
    }

    fn update(&self, patient: &Patient) -> StorageResult<usize> {
        let id = patient.require_id()?;
        patient.validate()?;
        self.backend.write_by_id(
            Patient::NAME,
            id,
            "update",
            "UPDATE patient SET first_name = ?1, last_name = ?2, date_of_birth = ?3,
                gender = ?4, phone = ?5, amka = ?6
             WHERE patient_id = ?7",
            params![
                patient.first_name,
                patient.last_name,
                patient.date_of_birth,
                patient.gender,
                patient.phone,
                patient.amka,
                id,
            ],
        )
    }

    fn update_field(&self, id: i64, field: PatientField, value: FieldValue) -> StorageResult<usize> {
        self.backend.update_single_field(id, field, &value)
    }

    fn delete_by_id(&self, id: i64) -> StorageResult<usize> {
        self.backend.write_by_id(
            Patient::NAME,
            id,
            "delete",
            "DELETE FROM patient WHERE patient_id = ?1",
            [id],
        )
    }
}
