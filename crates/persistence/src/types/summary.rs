use serde::{Deserialize, Serialize};

use super::{Appointment, Department, Doctor, Hospitalization, Patient};

/// An appointment joined with its doctor, patient and the doctor's department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentSummary {
    /// The appointment itself.
    pub appointment: Appointment,
    /// Attending doctor.
    pub doctor: Doctor,
    /// Visiting patient.
    pub patient: Patient,
    /// The doctor's department; `None` for unassigned doctors.
    pub department: Option<Department>,
}

/// A department with its live statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentSummary {
    /// The department itself.
    pub department: Department,
    /// Number of current hospitalizations.
    pub occupancy: u64,
    /// Number of doctors assigned to it.
    pub doctor_count: u64,
}

/// A patient who is currently admitted, with the admitting department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentHospitalizationSummary {
    /// Admitted patient.
    pub patient: Patient,
    /// Admitting department.
    pub department: Department,
    /// The stay; its discharge time is always `None`.
    pub hospitalization: Hospitalization,
}
