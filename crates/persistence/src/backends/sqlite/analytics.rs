use std::collections::BTreeMap;

use chrono::NaiveDate;
use rusqlite::params;
use tracing::debug;

use super::SqliteBackend;
use super::repository::map_doctor;
use crate::core::analytics::{AnalyticsProvider, DoctorPatientCount, age_on};
use crate::error::StorageResult;

impl SqliteBackend {
    fn query_grouped<T, P, F>(&self, sql: &str, params: P, value: F) -> StorageResult<BTreeMap<String, T>>
    where
        P: rusqlite::Params,
        F: Fn(&rusqlite::Row<'_>) -> rusqlite::Result<T>,
    {
        let rows = self.query_list(sql, params, |row| Ok((row.get::<_, String>(0)?, value(row)?)))?;
        Ok(rows.into_iter().collect())
    }
}

impl AnalyticsProvider for SqliteBackend {
    fn average_length_of_stay_per_department(&self) -> StorageResult<BTreeMap<String, i64>> {
        self.query_grouped(
            "SELECT dep.name,
                AVG(CAST(strftime('%s', h.discharge_datetime) AS INTEGER)
                    - CAST(strftime('%s', h.admit_datetime) AS INTEGER)) / 86400.0
             FROM hospitalization h
             JOIN department dep ON dep.department_id = h.department_id
             WHERE h.discharge_datetime IS NOT NULL
             GROUP BY dep.department_id, dep.name",
            [],
            |row| Ok(row.get::<_, f64>(1)?.round() as i64),
        )
    }

    fn doctor_patient_counts(&self) -> StorageResult<Vec<DoctorPatientCount>> {
        self.query_list(
            "SELECT d.doctor_id, d.first_name, d.last_name, d.specialty, d.phone,
                d.department_id, COUNT(DISTINCT mr.patient_id) AS patient_count
             FROM medical_record mr
             JOIN doctor d ON d.doctor_id = mr.doctor_id
             GROUP BY d.doctor_id
             ORDER BY patient_count DESC, d.doctor_id ASC",
            [],
            |row| {
                let count: i64 = row.get("patient_count")?;
                Ok(DoctorPatientCount {
                    doctor: map_doctor(row)?,
                    patient_count: count.max(0) as u64,
                })
            },
        )
    }

    fn covid_case_count(&self) -> StorageResult<u64> {
        self.query_count(
            "SELECT COUNT(*) FROM medical_record WHERE LOWER(diagnosis) LIKE '%covid%'",
            [],
        )
    }

    fn bed_occupancy_rate_per_department(&self) -> StorageResult<BTreeMap<String, f64>> {
        self.query_grouped(
            "SELECT dep.name, dep.capacity, COUNT(h.hospitalization_id)
             FROM department dep
             LEFT JOIN hospitalization h
                ON h.department_id = dep.department_id AND h.discharge_datetime IS NULL
             GROUP BY dep.department_id, dep.name, dep.capacity",
            [],
            |row| {
                let capacity: Option<i64> = row.get(1)?;
                let occupied: i64 = row.get(2)?;
                Ok(match capacity {
                    Some(capacity) if capacity > 0 => (occupied as f64 / capacity as f64).min(1.0),
                    _ => 0.0,
                })
            },
        )
    }

    fn average_age_of_admitted_patients_on(&self, today: NaiveDate) -> StorageResult<f64> {
        let births: Vec<NaiveDate> = self.query_list(
            "SELECT p.date_of_birth FROM patient p
             WHERE EXISTS (SELECT 1 FROM hospitalization h WHERE h.patient_id = p.patient_id)",
            [],
            |row| row.get(0),
        )?;
        if births.is_empty() {
            return Ok(0.0);
        }
        let total: i64 = births
            .iter()
            .map(|dob| i64::from(age_on(*dob, today)))
            .sum();
        Ok(total as f64 / births.len() as f64)
    }

    fn admissions_per_department_per_year(
        &self,
        year: i32,
    ) -> StorageResult<BTreeMap<String, u64>> {
        let bounds = NaiveDate::from_ymd_opt(year, 1, 1)
            .zip(NaiveDate::from_ymd_opt(year.saturating_add(1), 1, 1));
        let Some((start, end)) = bounds else {
            debug!(year, "Year outside the representable calendar");
            return Ok(BTreeMap::new());
        };
        self.query_grouped(
            "SELECT dep.name, COUNT(*)
             FROM hospitalization h
             JOIN department dep ON dep.department_id = h.department_id
             WHERE h.admit_datetime >= ?1 AND h.admit_datetime < ?2
             GROUP BY dep.department_id, dep.name",
            params![start, end],
            |row| Ok(row.get::<_, i64>(1)?.max(0) as u64),
        )
    }
}
