//! Summary integration tests.
//!
//! Every lookup is checked against both providers: the view-backed one on
//! [`SqliteBackend`] and [`AssembledSummaries`].

mod common;

use common::*;

use wardbook_persistence::backends::sqlite::{AssembledSummaries, SqliteBackend};
use wardbook_persistence::core::{Repository, SummaryProvider};

struct Seeded {
    backend: SqliteBackend,
    patients: Vec<i64>,
    doctors: Vec<i64>,
    appointments: Vec<i64>,
}

fn seeded() -> Seeded {
    let backend = create_backend();
    let cardio = insert_department(&backend, "Cardiology", Some(2)).id;
    let icu = insert_department(&backend, "ICU", None).id;
    insert_department(&backend, "Empty", Some(5));

    let doctors = vec![
        insert_doctor(&backend, "Heart", cardio).id.unwrap(),
        insert_doctor(&backend, "Lung", icu).id.unwrap(),
        insert_doctor(&backend, "Floating", None).id.unwrap(),
    ];
    let patients = vec![
        insert_patient(&backend, "21016001234", date(1960, 1, 21)).id.unwrap(),
        insert_patient(&backend, "21017001234", date(1970, 1, 21)).id.unwrap(),
    ];

    let mut appointments = Vec::new();
    for (i, doctor) in doctors.iter().enumerate() {
        for (j, patient) in patients.iter().enumerate() {
            let when = upcoming(1 + i as i64, 9 + j as u32);
            appointments.push(book(&backend, *patient, *doctor, when).id.unwrap());
        }
    }

    admit(&backend, patients[0], cardio.unwrap(), at(2025, 1, 1, 8, 0));
    admit_and_discharge(&backend, patients[1], icu.unwrap(), at(2025, 1, 2, 8, 0), at(2025, 1, 5, 8, 0));
    admit(&backend, patients[1], cardio.unwrap(), at(2025, 1, 6, 8, 0));

    Seeded {
        backend,
        patients,
        doctors,
        appointments,
    }
}

#[test]
fn test_view_and_assembled_providers_agree() {
    let s = seeded();
    let views: &dyn SummaryProvider = &s.backend;
    let assembled = AssembledSummaries::new(&s.backend);

    for id in &s.appointments {
        assert_eq!(
            views.appointment_summary(*id).unwrap(),
            assembled.appointment_summary(*id).unwrap()
        );
    }
    for id in &s.doctors {
        let from_views = views.appointment_summaries_by_doctor(*id).unwrap();
        assert_eq!(from_views.len(), 2);
        assert_eq!(from_views, assembled.appointment_summaries_by_doctor(*id).unwrap());
    }
    for id in &s.patients {
        assert_eq!(
            views.appointment_summaries_by_patient(*id).unwrap(),
            assembled.appointment_summaries_by_patient(*id).unwrap()
        );
        assert_eq!(
            views.current_hospitalization_by_patient(*id).unwrap(),
            assembled.current_hospitalization_by_patient(*id).unwrap()
        );
    }
    for name in ["Cardiology", "icu", "Empty", "Missing"] {
        assert_eq!(
            views.department_summary(name).unwrap(),
            assembled.department_summary(name).unwrap()
        );
    }
    assert_eq!(
        views.department_summaries().unwrap(),
        assembled.department_summaries().unwrap()
    );
    assert_eq!(
        views.current_hospitalizations().unwrap(),
        assembled.current_hospitalizations().unwrap()
    );
    assert_eq!(
        views.current_hospitalization_by_amka("21017001234").unwrap(),
        assembled.current_hospitalization_by_amka("21017001234").unwrap()
    );
}

#[test]
fn test_department_summary_counts() {
    let s = seeded();
    let summary = s.backend.department_summary("cardiology").unwrap().unwrap();
    assert_eq!(summary.department.name, "Cardiology");
    assert_eq!(summary.occupancy, 2);
    assert_eq!(summary.doctor_count, 1);

    let icu = s.backend.department_summary("ICU").unwrap().unwrap();
    assert_eq!(icu.occupancy, 0);
    assert_eq!(icu.department.capacity, None);
}

#[test]
fn test_appointment_summary_for_unassigned_doctor() {
    let s = seeded();
    let summaries = s.backend.appointment_summaries_by_doctor(s.doctors[2]).unwrap();
    assert!(summaries.iter().all(|summary| summary.department.is_none()));
    assert!(summaries.iter().all(|summary| summary.doctor.department_id.is_none()));
    // Latest first
    assert!(summaries[0].appointment.date_time >= summaries[1].appointment.date_time);
}

#[test]
fn test_current_summary_absent_after_discharge() {
    let s = seeded();
    let patient = s.patients[0];
    let current = s
        .backend
        .current_hospitalization_by_patient(patient)
        .unwrap()
        .unwrap();
    assert_eq!(current.department.name, "Cardiology");
    assert!(current.hospitalization.is_current());

    let stay_id = current.hospitalization.id.unwrap();
    assert_eq!(
        s.backend
            .hospitalizations()
            .discharge(stay_id, at(2025, 1, 3, 8, 0))
            .unwrap(),
        1
    );

    assert!(s.backend.current_hospitalization_by_patient(patient).unwrap().is_none());
    assert!(
        AssembledSummaries::new(&s.backend)
            .current_hospitalization_by_patient(patient)
            .unwrap()
            .is_none()
    );
    assert_eq!(s.backend.current_hospitalizations().unwrap().len(), 1);
    assert_eq!(
        s.backend.department_summary("Cardiology").unwrap().unwrap().occupancy,
        1
    );
}

#[test]
fn test_current_summary_by_amka_absent_after_only_stay_discharged() {
    let backend = create_backend();
    let ward = insert_department(&backend, "Neurology", Some(3)).id.unwrap();
    let patient = insert_patient(&backend, "14038501234", date(1985, 3, 14)).id.unwrap();
    let stay = admit(&backend, patient, ward, at(2025, 4, 1, 10, 0)).id.unwrap();

    let assembled = AssembledSummaries::new(&backend);
    let providers: [&dyn SummaryProvider; 2] = [&backend, &assembled];
    for provider in providers {
        let current = provider
            .current_hospitalization_by_amka("14038501234")
            .unwrap()
            .unwrap();
        assert_eq!(current.hospitalization.id, Some(stay));
    }

    backend
        .hospitalizations()
        .discharge(stay, at(2025, 4, 4, 12, 0))
        .unwrap();

    for provider in providers {
        assert!(provider.current_hospitalization_by_amka("14038501234").unwrap().is_none());
        assert!(provider.current_hospitalizations().unwrap().is_empty());
    }
}

#[test]
fn test_department_summary_matches_greek_name_in_any_case() {
    let backend = create_backend();
    let ward = insert_department(&backend, "ΚΑΡΔΙΟΛΟΓΙΚΗ", Some(2)).id;
    insert_doctor(&backend, "Papadakis", ward);

    let assembled = AssembledSummaries::new(&backend);
    let providers: [&dyn SummaryProvider; 2] = [&backend, &assembled];
    for provider in providers {
        let summary = provider.department_summary("καρδιολογικη").unwrap().unwrap();
        assert_eq!(summary.department.name, "ΚΑΡΔΙΟΛΟΓΙΚΗ");
        assert_eq!(summary.doctor_count, 1);
    }
}

#[test]
fn test_summaries_serialize_to_json() {
    let s = seeded();
    let summary = s.backend.department_summary("Cardiology").unwrap().unwrap();
    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["occupancy"], 2);
    assert_eq!(json["department"]["name"], "Cardiology");
}
