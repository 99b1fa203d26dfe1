use chrono::NaiveDate;
use rusqlite::{Row, params};

use crate::backends::sqlite::SqliteBackend;
use crate::core::{FieldValue, Repository};
use crate::error::StorageResult;
use crate::types::{Appointment, AppointmentField, Entity};

/// Repository over the `appointment` table.
#[derive(Debug, Clone, Copy)]
pub struct AppointmentRepository<'a> {
    backend: &'a SqliteBackend,
}

fn map_appointment(row: &Row<'_>) -> rusqlite::Result<Appointment> {
    Ok(Appointment {
        id: Some(row.get("appointment_id")?),
        patient_id: row.get("patient_id")?,
        doctor_id: row.get("doctor_id")?,
        date_time: row.get("appointment_datetime")?,
        reason: row.get("reason")?,
    })
}

impl<'a> AppointmentRepository<'a> {
    pub(crate) fn new(backend: &'a SqliteBackend) -> Self {
        Self { backend }
    }

    /// Appointments of a doctor, earliest first.
    pub fn find_by_doctor(&self, doctor_id: i64) -> StorageResult<Vec<Appointment>> {
        self.backend.query_list(
            "SELECT appointment_id, patient_id, doctor_id, appointment_datetime, reason
             FROM appointment WHERE doctor_id = ?1
             ORDER BY appointment_datetime, appointment_id",
            [doctor_id],
            map_appointment,
        )
    }

    /// Appointments of a patient, earliest first.
    pub fn find_by_patient(&self, patient_id: i64) -> StorageResult<Vec<Appointment>> {
        self.backend.query_list(
            "SELECT appointment_id, patient_id, doctor_id, appointment_datetime, reason
             FROM appointment WHERE patient_id = ?1
             ORDER BY appointment_datetime, appointment_id",
            [patient_id],
            map_appointment,
        )
    }

    /// Number of appointments of a doctor.
    pub fn count_by_doctor(&self, doctor_id: i64) -> StorageResult<u64> {
        self.backend.query_count(
            "SELECT COUNT(*) FROM appointment WHERE doctor_id = ?1",
            [doctor_id],
        )
    }

    /// Appointments whose calendar date lies in `from..=to`, earliest first.
    ///
    /// An inverted interval is empty.
    pub fn find_in_date_interval(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> StorageResult<Vec<Appointment>> {
        if from > to {
            return Ok(Vec::new());
        }
        self.backend.query_list(
            "SELECT appointment_id, patient_id, doctor_id, appointment_datetime, reason
             FROM appointment
             WHERE date(appointment_datetime) BETWEEN ?1 AND ?2
             ORDER BY appointment_datetime, appointment_id",
            params![from, to],
            map_appointment,
        )
    }
}

impl Repository for AppointmentRepository<'_> {
    type Entity = Appointment;
    type Field = AppointmentField;

    fn insert(&self, mut appointment: Appointment) -> StorageResult<Appointment> {
        appointment.validate()?;
        let id = self.backend.insert_row(
            Appointment::NAME,
            "INSERT INTO appointment (patient_id, doctor_id, appointment_datetime, reason)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                appointment.patient_id,
                appointment.doctor_id,
                appointment.date_time,
                appointment.reason,
            ],
        )?;
        appointment.id = Some(id);
        Ok(appointment)
    }

    fn find_by_id(&self, id: i64) -> StorageResult<Option<Appointment>> {
        self.backend.query_optional(
            "SELECT appointment_id, patient_id, doctor_id, appointment_datetime, reason
             FROM appointment WHERE appointment_id = ?1",
            [id],
            map_appointment,
        )
    }

    fn find_all(&self) -> StorageResult<Vec<Appointment>> {
        self.backend.query_list(
            "SELECT appointment_id, patient_id, doctor_id, appointment_datetime, reason
             FROM appointment ORDER BY appointment_datetime, appointment_id",
            [],
            map_appointment,
        )
    }

    fn update(&self, appointment: &Appointment) -> StorageResult<usize> {
        let id = appointment.require_id()?;
        appointment.validate()?;
        self.backend.write_by_id(
            Appointment::NAME,
            id,
            "update",
            "UPDATE appointment SET patient_id = ?1, doctor_id = ?2,
                appointment_datetime = ?3, reason = ?4
             WHERE appointment_id = ?5",
            params![
                appointment.patient_id,
                appointment.doctor_id,
                appointment.date_time,
                appointment.reason,
                id,
            ],
        )
    }

    fn update_field(
        &self,
        id: i64,
        field: AppointmentField,
        value: FieldValue,
    ) -> StorageResult<usize> {
        self.backend.update_single_field(id, field, &value)
    }

    fn delete_by_id(&self, id: i64) -> StorageResult<usize> {
        self.backend.write_by_id(
            Appointment::NAME,
            id,
            "delete",
            "DELETE FROM appointment WHERE appointment_id = ?1",
            [id],
        )
    }
}
