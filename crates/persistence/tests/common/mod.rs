//! Test infrastructure for the persistence layer.
//!
//! Fixture builders for every entity and a seeded in-memory backend.

#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};

use wardbook_persistence::backends::sqlite::SqliteBackend;
use wardbook_persistence::core::Repository;
use wardbook_persistence::types::{
    Appointment, Department, Doctor, Gender, Hospitalization, MedicalRecord, Patient,
};

/// A fresh in-memory backend with the schema in place.
pub fn create_backend() -> SqliteBackend {
    let backend = SqliteBackend::in_memory().expect("Failed to create SQLite backend");
    backend.init_schema().expect("Failed to initialize schema");
    backend
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    date(y, m, d).and_hms_opt(h, min, 0).expect("valid time")
}

/// A point in the future, for appointments.
pub fn upcoming(days: i64, hour: u32) -> NaiveDateTime {
    (chrono::Local::now().date_naive() + Duration::days(days))
        .and_hms_opt(hour, 0, 0)
        .expect("valid time")
}

// ============================================================================
// Builders
// ============================================================================

pub fn patient(first: &str, last: &str, amka: &str) -> Patient {
    Patient::new(first, last, date(1980, 1, 15), amka)
}

pub fn insert_patient(backend: &SqliteBackend, amka: &str, born: NaiveDate) -> Patient {
    backend
        .patients()
        .insert(Patient::new("Test", "Patient", born, amka).with_gender(Gender::F))
        .expect("insert patient")
}

pub fn insert_department(backend: &SqliteBackend, name: &str, capacity: Option<i64>) -> Department {
    backend
        .departments()
        .insert(Department::new(name, capacity))
        .expect("insert department")
}

pub fn insert_doctor(backend: &SqliteBackend, last: &str, department: Option<i64>) -> Doctor {
    let mut doctor = Doctor::new("Test", last, "General Practice");
    doctor.department_id = department;
    backend.doctors().insert(doctor).expect("insert doctor")
}

pub fn admit(backend: &SqliteBackend, patient: i64, department: i64, when: NaiveDateTime) -> Hospitalization {
    backend
        .hospitalizations()
        .insert(Hospitalization::admit(patient, department, when))
        .expect("insert hospitalization")
}

pub fn admit_and_discharge(
    backend: &SqliteBackend,
    patient: i64,
    department: i64,
    admitted: NaiveDateTime,
    discharged: NaiveDateTime,
) -> Hospitalization {
    backend
        .hospitalizations()
        .insert(Hospitalization::admit(patient, department, admitted).discharged_at(discharged))
        .expect("insert hospitalization")
}

pub fn record(
    backend: &SqliteBackend,
    patient: i64,
    doctor: Option<i64>,
    diagnosis: &str,
) -> MedicalRecord {
    let mut record = MedicalRecord::new(patient, at(2024, 6, 1, 10, 0), diagnosis, "Observation");
    record.doctor_id = doctor;
    backend
        .medical_records()
        .insert(record)
        .expect("insert medical record")
}

pub fn book(backend: &SqliteBackend, patient: i64, doctor: i64, when: NaiveDateTime) -> Appointment {
    backend
        .appointments()
        .insert(Appointment::new(patient, doctor, when))
        .expect("insert appointment")
}
