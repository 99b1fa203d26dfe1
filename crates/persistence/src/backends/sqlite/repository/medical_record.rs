use rusqlite::{Row, params};

use crate::backends::sqlite::SqliteBackend;
use crate::core::{FieldValue, Repository};
use crate::error::StorageResult;
use crate::types::{Entity, MedicalRecord, MedicalRecordField};

/// Repository over the `medical_record` table.
#[derive(Debug, Clone, Copy)]
pub struct MedicalRecordRepository<'a> {
    backend: &'a SqliteBackend,
}

fn map_medical_record(row: &Row<'_>) -> rusqlite::Result<MedicalRecord> {
    Ok(MedicalRecord {
        id: Some(row.get("record_id")?),
        patient_id: row.get("patient_id")?,
        doctor_id: row.get("doctor_id")?,
        record_date_time: row.get("record_datetime")?,
        diagnosis: row.get("diagnosis")?,
        treatment: row.get("treatment")?,
        notes: row.get("notes")?,
    })
}

impl<'a> MedicalRecordRepository<'a> {
    pub(crate) fn new(backend: &'a SqliteBackend) -> Self {
        Self { backend }
    }

    /// Records about a patient, latest first.
    pub fn find_by_patient_id(&self, patient_id: i64) -> StorageResult<Vec<MedicalRecord>> {
        self.backend.query_list(
            "SELECT record_id, patient_id, doctor_id, record_datetime, diagnosis, treatment, notes
             FROM medical_record WHERE patient_id = ?1
             ORDER BY record_datetime DESC, record_id DESC",
            [patient_id],
            map_medical_record,
        )
    }

    /// Records written by a doctor, latest first.
    pub fn find_by_doctor_id(&self, doctor_id: i64) -> StorageResult<Vec<MedicalRecord>> {
        self.backend.query_list(
            "SELECT record_id, patient_id, doctor_id, record_datetime, diagnosis, treatment, notes
             FROM medical_record WHERE doctor_id = ?1
             ORDER BY record_datetime DESC, record_id DESC",
            [doctor_id],
            map_medical_record,
        )
    }
}

impl Repository for MedicalRecordRepository<'_> {
    type Entity = MedicalRecord;
    type Field = MedicalRecordField;

    fn insert(&self, mut record: MedicalRecord) -> StorageResult<MedicalRecord> {
        record.validate()?;
        let id = self.backend.insert_row(
            MedicalRecord::NAME,
            "INSERT INTO medical_record (patient_id, doctor_id, record_datetime,
                diagnosis, treatment, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.patient_id,
                record.doctor_id,
                record.record_date_time,
                record.diagnosis,
                record.treatment,
                record.notes,
            ],
        )?;
        record.id = Some(id);
        Ok(record)
    }

    fn find_by_id(&self, id: i64) -> StorageResult<Option<MedicalRecord>> {
        self.backend.query_optional(
            "SELECT record_id, patient_id, doctor_id, record_datetime, diagnosis, treatment, notes
             FROM medical_record WHERE record_id = ?1",
            [id],
            map_medical_record,
        )
    }

    fn find_all(&self) -> StorageResult<Vec<MedicalRecord>> {
        self.backend.query_list(
            "SELECT record_id, patient_id, doctor_id, record_datetime, diagnosis, treatment, notes
             FROM medical_record ORDER BY record_datetime DESC, record_id DESC",
            [],
            map_medical_record,
        )
    }

    fn update(&self, record: &MedicalRecord) -> StorageResult<usize> {
        let id = record.require_id()?;
        record.validate()?;
        self.backend.write_by_id(
            MedicalRecord::NAME,
            id,
            "update",
            "UPDATE medical_record SET patient_id = ?1, doctor_id = ?2, record_datetime = ?3,
                diagnosis = ?4, treatment = ?5, notes = ?6
             WHERE record_id = ?7",
            params![
                record.patient_id,
                record.doctor_id,
                record.record_date_time,
                record.diagnosis,
                record.treatment,
                record.notes,
                id,
            ],
        )
    }

    fn update_field(
        &self,
        id: i64,
        field: MedicalRecordField,
        value: FieldValue,
    ) -> StorageResult<usize> {
        self.backend.update_single_field(id, field, &value)
    }

    fn delete_by_id(&self, id: i64) -> StorageResult<usize> {
        self.backend.write_by_id(
            MedicalRecord::NAME,
            id,
            "delete",
            "DELETE FROM medical_record WHERE record_id = ?1",
            [id],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Doctor, Patient};
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    fn written() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 5)
            .unwrap()
            .and_hms_opt(16, 45, 0)
            .unwrap()
    }

    fn setup() -> (SqliteBackend, i64) {
        let backend = SqliteBackend::in_memory().unwrap();
        backend.init_schema().unwrap();
        let patient = backend
            .patients()
            .insert(Patient::new(
                "Giorgos",
                "Pappas",
                NaiveDate::from_ymd_opt(1979, 3, 3).unwrap(),
                "03037901234",
            ))
            .unwrap()
            .id
            .unwrap();
        (backend, patient)
    }

    #[test]
    fn test_record_without_doctor_round_trip() {
        let (backend, patient) = setup();
        let saved = backend
            .medical_records()
            .insert(MedicalRecord::new(patient, written(), "Asthma", "Inhaler"))
            .unwrap();
        let found = backend
            .medical_records()
            .find_by_id(saved.id.unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(found.doctor_id, None);
        assert_eq!(found.notes, None);
        assert_eq!(found, saved);
    }

    #[test]
    fn test_listing_by_patient_and_doctor() {
        let (backend, patient) = setup();
        let doctor = backend
            .doctors()
            .insert(Doctor::new("Dora", "Kyriakou", "Pulmonology"))
            .unwrap()
            .id
            .unwrap();

        let older = backend
            .medical_records()
            .insert(MedicalRecord::new(patient, written(), "Asthma", "Inhaler").by_doctor(doctor))
            .unwrap();
        let newer = backend
            .medical_records()
            .insert(
                MedicalRecord::new(patient, written() + Duration::days(7), "Asthma", "Steroids")
                    .with_notes("Follow-up in a month"),
            )
            .unwrap();

        assert_eq!(
            backend.medical_records().find_by_patient_id(patient).unwrap(),
            vec![newer.clone(), older.clone()]
        );
        assert_eq!(
            backend.medical_records().find_by_doctor_id(doctor).unwrap(),
            vec![older]
        );
        assert_eq!(backend.medical_records().find_all().unwrap()[0], newer);
    }

    #[test]
    fn test_patient_delete_blocked_by_record() {
        let (backend, patient) = setup();
        backend
            .medical_records()
            .insert(MedicalRecord::new(patient, written(), "Gout", "Diet"))
            .unwrap();

        let err = backend.patients().delete_by_id(patient).unwrap_err();
        assert!(err.is_referential_integrity());
        assert!(backend.patients().find_by_id(patient).unwrap().is_some());
    }

    #[test]
    fn test_delete_returns_row_count() {
        let (backend, patient) = setup();
        let id = backend
            .medical_records()
            .insert(MedicalRecord::new(patient, written(), "Gout", "Diet"))
            .unwrap()
            .id
            .unwrap();

        assert_eq!(backend.medical_records().delete_by_id(id).unwrap(), 1);
        assert_eq!(backend.medical_records().delete_by_id(id).unwrap(), 0);
    }
}
