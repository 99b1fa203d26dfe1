//! Composite summary lookups.

use crate::error::StorageResult;
use crate::types::{AppointmentSummary, CurrentHospitalizationSummary, DepartmentSummary};

/// Source of read-only composite summaries.
///
/// Implementations may read pre-joined reporting views or assemble the
/// composites from individual repository lookups; both must return the same
/// values. A lookup that matches nothing yields `None`, never a partially
/// populated summary.
pub trait SummaryProvider {
    /// The summary of one appointment.
    fn appointment_summary(&self, appointment_id: i64)
    -> StorageResult<Option<AppointmentSummary>>;

    /// Every appointment of a doctor, latest first.
    fn appointment_summaries_by_doctor(
        &self,
        doctor_id: i64,
    ) -> StorageResult<Vec<AppointmentSummary>>;

    /// Every appointment of a patient, latest first.
    fn appointment_summaries_by_patient(
        &self,
        patient_id: i64,
    ) -> StorageResult<Vec<AppointmentSummary>>;

    /// The summary of a department, matched by name case-insensitively.
    fn department_summary(&self, name: &str) -> StorageResult<Option<DepartmentSummary>>;

    /// Summaries of every department in id order.
    fn department_summaries(&self) -> StorageResult<Vec<DepartmentSummary>>;

    /// The current stay of the patient with the given AMKA.
    ///
    /// When several stays are open the most recently admitted one is returned.
    fn current_hospitalization_by_amka(
        &self,
        amka: &str,
    ) -> StorageResult<Option<CurrentHospitalizationSummary>>;

    /// The current stay of the patient with the given id.
    fn current_hospitalization_by_patient(
        &self,
        patient_id: i64,
    ) -> StorageResult<Option<CurrentHospitalizationSummary>>;

    /// Every current stay, latest admission first.
    fn current_hospitalizations(&self) -> StorageResult<Vec<CurrentHospitalizationSummary>>;
}
