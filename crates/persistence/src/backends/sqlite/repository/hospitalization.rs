use chrono::NaiveDateTime;
use rusqlite::{Row, params};
use tracing::debug;

use crate::backends::sqlite::SqliteBackend;
use crate::core::{FieldValue, Repository, UpdatableField};
use crate::error::StorageResult;
use crate::types::{Entity, Hospitalization, HospitalizationField};

/// Repository over the `hospitalization` table.
#[derive(Debug, Clone, Copy)]
pub struct HospitalizationRepository<'a> {
    backend: &'a SqliteBackend,
}

fn map_hospitalization(row: &Row<'_>) -> rusqlite::Result<Hospitalization> {
    Ok(Hospitalization {
        id: Some(row.get("hospitalization_id")?),
        patient_id: row.get("patient_id")?,
        department_id: row.get("department_id")?,
        admit_date_time: row.get("admit_datetime")?,
        discharge_date_time: row.get("discharge_datetime")?,
        bed_number: row.get("bed_number")?,
        reason: row.get("reason")?,
    })
}

impl<'a> HospitalizationRepository<'a> {
    pub(crate) fn new(backend: &'a SqliteBackend) -> Self {
        Self { backend }
    }

    /// Every stay of a patient, latest admission first.
    pub fn find_by_patient_id(&self, patient_id: i64) -> StorageResult<Vec<Hospitalization>> {
        self.backend.query_list(
            "SELECT hospitalization_id, patient_id, department_id, admit_datetime,
                discharge_datetime, bed_number, reason
             FROM hospitalization WHERE patient_id = ?1
             ORDER BY admit_datetime DESC, hospitalization_id DESC",
            [patient_id],
            map_hospitalization,
        )
    }

    /// Stays without a discharge time, latest admission first.
    pub fn find_current(&self) -> StorageResult<Vec<Hospitalization>> {
        self.backend.query_list(
            "SELECT hospitalization_id, patient_id, department_id, admit_datetime,
                discharge_datetime, bed_number, reason
             FROM hospitalization WHERE discharge_datetime IS NULL
             ORDER BY admit_datetime DESC, hospitalization_id DESC",
            [],
            map_hospitalization,
        )
    }

    /// Closes a current stay at `at`.
    ///
    /// Returns 0 when the stay does not exist or was already discharged.
    pub fn discharge(&self, id: i64, at: NaiveDateTime) -> StorageResult<usize> {
        let Some(stay) = self.find_by_id(id)? else {
            return Ok(0);
        };
        if !stay.is_current() {
            debug!(id, "Hospitalization already discharged");
            return Ok(0);
        }
        crate::types::check_discharge_order(stay.admit_date_time, at)?;

        self.backend.write_by_id(
            Hospitalization::NAME,
            id,
            "discharge",
            "UPDATE hospitalization SET discharge_datetime = ?1
             WHERE hospitalization_id = ?2 AND discharge_datetime IS NULL",
            params![at, id],
        )
    }

    /// Closes a current stay at the local time.
    pub fn discharge_now(&self, id: i64) -> StorageResult<usize> {
        self.discharge(id, crate::types::now())
    }
}

impl Repository for HospitalizationRepository<'_> {
    type Entity = Hospitalization;
    type Field = HospitalizationField;

    fn insert(&self, mut stay: Hospitalization) -> StorageResult<Hospitalization> {
        stay.validate()?;
        let id = self.backend.insert_row(
            Hospitalization::NAME,
            "INSERT INTO hospitalization (patient_id, department_id, admit_datetime,
                discharge_datetime, bed_number, reason)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                stay.patient_id,
                stay.department_id,
                stay.admit_date_time,
                stay.discharge_date_time,
                stay.bed_number,
                stay.reason,
            ],
        )?;
        stay.id = Some(id);
        Ok(stay)
    }

    fn find_by_id(&self, id: i64) -> StorageResult<Option<Hospitalization>> {
        self.backend.query_optional(
            "SELECT hospitalization_id, patient_id, department_id, admit_datetime,
                discharge_datetime, bed_number, reason
             FROM hospitalization WHERE hospitalization_id = ?1",
            [id],
            map_hospitalization,
        )
    }

    fn find_all(&self) -> StorageResult<Vec<Hospitalization>> {
        self.backend.query_list(
            "SELECT hospitalization_id, patient_id, department_id, admit_datetime,
                discharge_datetime, bed_number, reason
             FROM hospitalization ORDER BY admit_datetime DESC, hospitalization_id DESC",
            [],
            map_hospitalization,
        )
    }

    fn update(&self, stay: &Hospitalization) -> StorageResult<usize> {
        let id = stay.require_id()?;
        stay.validate()?;
        self.backend.write_by_id(
            Hospitalization::NAME,
            id,
            "update",
            "UPDATE hospitalization SET patient_id = ?1, department_id = ?2,
                admit_datetime = ?3, discharge_datetime = ?4, bed_number = ?5, reason = ?6
             WHERE hospitalization_id = ?7",
            params![
                stay.patient_id,
                stay.department_id,
                stay.admit_date_time,
                stay.discharge_date_time,
                stay.bed_number,
                stay.reason,
                id,
            ],
        )
    }

    fn update_field(
        &self,
        id: i64,
        field: HospitalizationField,
        value: FieldValue,
    ) -> StorageResult<usize> {
        field.validate(&value)?;

        // Admission and discharge are ordered against the stored counterpart.
        if let FieldValue::DateTime(new_value) = &value {
            let new_value = *new_value;
            let (admit, discharge) = match field {
                HospitalizationField::AdmitDateTime => {
                    let Some(stay) = self.find_by_id(id)? else {
                        return Ok(0);
                    };
                    (new_value, stay.discharge_date_time)
                }
                HospitalizationField::DischargeDateTime => {
                    let Some(stay) = self.find_by_id(id)? else {
                        return Ok(0);
                    };
                    (stay.admit_date_time, Some(new_value))
                }
                _ => (new_value, None),
            };
            if let Some(discharge) = discharge {
                crate::types::check_discharge_order(admit, discharge)?;
            }
        }

        self.backend.update_single_field(id, field, &value)
    }

    fn delete_by_id(&self, id: i64) -> StorageResult<usize> {
        self.backend.write_by_id(
            Hospitalization::NAME,
            id,
            "delete",
            "DELETE FROM hospitalization WHERE hospitalization_id = ?1",
            [id],
        )
    }
}
