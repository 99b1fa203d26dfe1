//! Summary providers over SQLite.
//!
//! [`SqliteBackend`] answers every lookup with one query against a reporting
//! view. [`AssembledSummaries`] answers the same lookups from individual
//! repository calls composed with [`crate::summary`]. The two agree field for
//! field.

use rusqlite::Row;

use super::SqliteBackend;
use crate::core::{Repository, SummaryProvider};
use crate::error::StorageResult;
use crate::summary::{appointment_summary, current_hospitalization_summary, department_summary};
use crate::types::{
    Appointment, AppointmentSummary, CurrentHospitalizationSummary, Department, DepartmentSummary,
    Doctor, Hospitalization, Patient,
};

// ============================================================================
// View row mappers
// ============================================================================

fn map_view_patient(row: &Row<'_>, birth_column: &str) -> rusqlite::Result<Patient> {
    Ok(Patient {
        id: Some(row.get("patient_id")?),
        first_name: row.get("patient_first_name")?,
        last_name: row.get("patient_last_name")?,
        date_of_birth: row.get(birth_column)?,
        gender: row.get("patient_gender")?,
        phone: row.get("patient_phone")?,
        amka: row.get("patient_amka")?,
    })
}

fn map_appointment_view(row: &Row<'_>) -> rusqlite::Result<AppointmentSummary> {
    let department = match row.get::<_, Option<i64>>("department_id")? {
        Some(id) => Some(Department {
            id: Some(id),
            name: row.get("department_name")?,
            capacity: row.get("department_capacity")?,
        }),
        None => None,
    };
    Ok(AppointmentSummary {
        appointment: Appointment {
            id: Some(row.get("appointment_id")?),
            patient_id: row.get("patient_id")?,
            doctor_id: row.get("doctor_id")?,
            date_time: row.get("appointment_datetime")?,
            reason: row.get("appointment_reason")?,
        },
        doctor: Doctor {
            id: Some(row.get("doctor_id")?),
            first_name: row.get("doctor_first_name")?,
            last_name: row.get("doctor_last_name")?,
            specialty: row.get("doctor_specialty")?,
            phone: row.get("doctor_phone")?,
            department_id: department.as_ref().and_then(|d| d.id),
        },
        patient: map_view_patient(row, "patient_birth_date")?,
        department,
    })
}

fn map_department_view(row: &Row<'_>) -> rusqlite::Result<DepartmentSummary> {
    let occupancy: i64 = row.get("current_occupancy")?;
    let doctor_count: i64 = row.get("doctor_count")?;
    Ok(department_summary(
        Department {
            id: Some(row.get("department_id")?),
            name: row.get("department_name")?,
            capacity: row.get("capacity")?,
        },
        occupancy.max(0) as u64,
        doctor_count.max(0) as u64,
    ))
}

fn map_current_view(row: &Row<'_>) -> rusqlite::Result<CurrentHospitalizationSummary> {
    let department = Department {
        id: Some(row.get("department_id")?),
        name: row.get("department_name")?,
        capacity: row.get("department_capacity")?,
    };
    let hospitalization = Hospitalization {
        id: Some(row.get("hospitalization_id")?),
        patient_id: row.get("patient_id")?,
        department_id: row.get("department_id")?,
        admit_date_time: row.get("admit_datetime")?,
        discharge_date_time: row.get("discharge_datetime")?,
        bed_number: row.get("bed_number")?,
        reason: row.get("reason")?,
    };
    Ok(CurrentHospitalizationSummary {
        patient: map_view_patient(row, "patient_date_of_birth")?,
        department,
        hospitalization,
    })
}

// ============================================================================
// View-backed provider
// ============================================================================

impl SummaryProvider for SqliteBackend {
    fn appointment_summary(&self, appointment_id: i64) -> StorageResult<Option<AppointmentSummary>> {
        self.query_optional(
            "SELECT * FROM appointment_full_view WHERE appointment_id = ?1",
            [appointment_id],
            map_appointment_view,
        )
    }

    fn appointment_summaries_by_doctor(
        &self,
        doctor_id: i64,
    ) -> StorageResult<Vec<AppointmentSummary>> {
        self.query_list(
            "SELECT * FROM appointment_full_view WHERE doctor_id = ?1
             ORDER BY appointment_datetime DESC, appointment_id DESC",
            [doctor_id],
            map_appointment_view,
        )
    }

    fn appointment_summaries_by_patient(
        &self,
        patient_id: i64,
    ) -> StorageResult<Vec<AppointmentSummary>> {
        self.query_list(
            "SELECT * FROM appointment_full_view WHERE patient_id = ?1
             ORDER BY appointment_datetime DESC, appointment_id DESC",
            [patient_id],
            map_appointment_view,
        )
    }

    fn department_summary(&self, name: &str) -> StorageResult<Option<DepartmentSummary>> {
        self.query_optional(
            "SELECT * FROM department_full_view WHERE fold_case(department_name) = fold_case(?1)",
            [name.trim()],
            map_department_view,
        )
    }

    fn department_summaries(&self) -> StorageResult<Vec<DepartmentSummary>> {
        self.query_list(
            "SELECT * FROM department_full_view ORDER BY department_id",
            [],
            map_department_view,
        )
    }

    fn current_hospitalization_by_amka(
        &self,
        amka: &str,
    ) -> StorageResult<Option<CurrentHospitalizationSummary>> {
        self.query_optional(
            "SELECT * FROM current_hospitalization_view WHERE patient_amka = ?1
             ORDER BY admit_datetime DESC, hospitalization_id DESC LIMIT 1",
            [amka.trim()],
            map_current_view,
        )
    }

    fn current_hospitalization_by_patient(
        &self,
        patient_id: i64,
    ) -> StorageResult<Option<CurrentHospitalizationSummary>> {
        self.query_optional(
            "SELECT * FROM current_hospitalization_view WHERE patient_id = ?1
             ORDER BY admit_datetime DESC, hospitalization_id DESC LIMIT 1",
            [patient_id],
            map_current_view,
        )
    }

    fn current_hospitalizations(&self) -> StorageResult<Vec<CurrentHospitalizationSummary>> {
        self.query_list(
            "SELECT * FROM current_hospitalization_view
             ORDER BY admit_datetime DESC, hospitalization_id DESC",
            [],
            map_current_view,
        )
    }
}

// ============================================================================
// Client-side assembly
// ============================================================================

/// Summaries composed from repository lookups instead of reporting views.
///
/// Useful against a database whose views are missing or stale. Every lookup
/// issues several queries, one connection checkout each.
#[derive(Debug, Clone, Copy)]
pub struct AssembledSummaries<'a> {
    backend: &'a SqliteBackend,
}

impl<'a> AssembledSummaries<'a> {
    /// Creates a provider over the given backend.
    pub fn new(backend: &'a SqliteBackend) -> Self {
        Self { backend }
    }

    fn assemble_appointment(&self, appointment: Appointment) -> StorageResult<Option<AppointmentSummary>> {
        let Some(doctor) = self.backend.doctors().find_by_id(appointment.doctor_id)? else {
            return Ok(None);
        };
        let Some(patient) = self.backend.patients().find_by_id(appointment.patient_id)? else {
            return Ok(None);
        };
        let department = match doctor.department_id {
            Some(id) => self.backend.departments().find_by_id(id)?,
            None => None,
        };
        Ok(appointment_summary(appointment, doctor, patient, department))
    }

    fn assemble_appointments(
        &self,
        appointments: Vec<Appointment>,
    ) -> StorageResult<Vec<AppointmentSummary>> {
        let mut summaries = Vec::with_capacity(appointments.len());
        for appointment in appointments {
            if let Some(summary) = self.assemble_appointment(appointment)? {
                summaries.push(summary);
            }
        }
        // Latest first, like the view-backed listings
        summaries.sort_by(|a, b| {
            (b.appointment.date_time, b.appointment.id).cmp(&(a.appointment.date_time, a.appointment.id))
        });
        Ok(summaries)
    }

    fn assemble_department(&self, department: Department) -> StorageResult<DepartmentSummary> {
        let departments = self.backend.departments();
        let occupancy = departments.occupancy(&department.name)?;
        let doctor_count = departments.doctor_count(&department.name)?;
        Ok(department_summary(department, occupancy, doctor_count))
    }

    fn assemble_current(
        &self,
        stay: Hospitalization,
    ) -> StorageResult<Option<CurrentHospitalizationSummary>> {
        let Some(patient) = self.backend.patients().find_by_id(stay.patient_id)? else {
            return Ok(None);
        };
        let Some(department) = self.backend.departments().find_by_id(stay.department_id)? else {
            return Ok(None);
        };
        Ok(current_hospitalization_summary(patient, department, stay))
    }
}

impl SummaryProvider for AssembledSummaries<'_> {
    fn appointment_summary(&self, appointment_id: i64) -> StorageResult<Option<AppointmentSummary>> {
        match self.backend.appointments().find_by_id(appointment_id)? {
            Some(appointment) => self.assemble_appointment(appointment),
            None => Ok(None),
        }
    }

    fn appointment_summaries_by_doctor(
        &self,
        doctor_id: i64,
    ) -> StorageResult<Vec<AppointmentSummary>> {
        let appointments = self.backend.appointments().find_by_doctor(doctor_id)?;
        self.assemble_appointments(appointments)
    }

    fn appointment_summaries_by_patient(
        &self,
        patient_id: i64,
    ) -> StorageResult<Vec<AppointmentSummary>> {
        let appointments = self.backend.appointments().find_by_patient(patient_id)?;
        self.assemble_appointments(appointments)
    }

    fn department_summary(&self, name: &str) -> StorageResult<Option<DepartmentSummary>> {
        match self.backend.departments().find_by_name(name)? {
            Some(department) => self.assemble_department(department).map(Some),
            None => Ok(None),
        }
    }

    fn department_summaries(&self) -> StorageResult<Vec<DepartmentSummary>> {
        self.backend
            .departments()
            .find_all()?
            .into_iter()
            .map(|department| self.assemble_department(department))
            .collect()
    }

    fn current_hospitalization_by_amka(
        &self,
        amka: &str,
    ) -> StorageResult<Option<CurrentHospitalizationSummary>> {
        match self.backend.patients().find_by_amka(amka)? {
            Some(Patient { id: Some(id), .. }) => self.current_hospitalization_by_patient(id),
            _ => Ok(None),
        }
    }

    fn current_hospitalization_by_patient(
        &self,
        patient_id: i64,
    ) -> StorageResult<Option<CurrentHospitalizationSummary>> {
        let latest = self
            .backend
            .hospitalizations()
            .find_by_patient_id(patient_id)?
            .into_iter()
            .find(Hospitalization::is_current);
        match latest {
            Some(stay) => self.assemble_current(stay),
            None => Ok(None),
        }
    }

    fn current_hospitalizations(&self) -> StorageResult<Vec<CurrentHospitalizationSummary>> {
        let mut summaries = Vec::new();
        for stay in self.backend.hospitalizations().find_current()? {
            if let Some(summary) = self.assemble_current(stay)? {
                summaries.push(summary);
            }
        }
        Ok(summaries)
    }
}
