//! Composition of read-only summaries from already fetched entities.
//!
//! These functions never touch storage. They check that the parts belong
//! together and return `None` otherwise, so a caller can never build a
//! summary that mixes unrelated rows.
//!
//! ```
//! use chrono::NaiveDate;
//! use wardbook_persistence::summary::current_hospitalization_summary;
//! use wardbook_persistence::types::{Department, Hospitalization, Patient};
//!
//! let mut patient = Patient::new(
//!     "Eleni",
//!     "Markou",
//!     NaiveDate::from_ymd_opt(1961, 5, 2).unwrap(),
//!     "02056101234",
//! );
//! patient.id = Some(3);
//! let mut ward = Department::new("Orthopedics", Some(12));
//! ward.id = Some(5);
//! let admitted = NaiveDate::from_ymd_opt(2025, 1, 10)
//!     .unwrap()
//!     .and_hms_opt(7, 0, 0)
//!     .unwrap();
//! let stay = Hospitalization::admit(3, 5, admitted);
//!
//! let summary = current_hospitalization_summary(patient, ward, stay.clone()).unwrap();
//! assert_eq!(summary.department.name, "Orthopedics");
//! ```

use crate::types::{
    Appointment, AppointmentSummary, CurrentHospitalizationSummary, Department,
    DepartmentSummary, Doctor, Hospitalization, Patient,
};

/// Joins an appointment with its doctor, patient and the doctor's department.
///
/// Returns `None` when the doctor or patient is not the one the appointment
/// references, or when the department does not match the doctor's.
pub fn appointment_summary(
    appointment: Appointment,
    doctor: Doctor,
    patient: Patient,
    department: Option<Department>,
) -> Option<AppointmentSummary> {
    if doctor.id != Some(appointment.doctor_id) || patient.id != Some(appointment.patient_id) {
        return None;
    }
    if department.as_ref().and_then(|d| d.id) != doctor.department_id {
        return None;
    }
    Some(AppointmentSummary {
        appointment,
        doctor,
        patient,
        department,
    })
}

/// Pairs a department with its occupancy and doctor count.
pub fn department_summary(
    department: Department,
    occupancy: u64,
    doctor_count: u64,
) -> DepartmentSummary {
    DepartmentSummary {
        department,
        occupancy,
        doctor_count,
    }
}

/// Joins a current stay with its patient and department.
///
/// Returns `None` for a discharged stay or mismatched parts.
pub fn current_hospitalization_summary(
    patient: Patient,
    department: Department,
    hospitalization: Hospitalization,
) -> Option<CurrentHospitalizationSummary> {
    if !hospitalization.is_current()
        || patient.id != Some(hospitalization.patient_id)
        || department.id != Some(hospitalization.department_id)
    {
        return None;
    }
    Some(CurrentHospitalizationSummary {
        patient,
        department,
        hospitalization,
    })
}
