//! Aggregate reports computed from storage.
//!
//! Every report is a pure function of what is stored at the time of the
//! call. Empty storage yields empty maps or zero, never an error.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::StorageResult;
use crate::types::Doctor;

/// A doctor and the number of distinct patients in their medical records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoctorPatientCount {
    /// The doctor.
    pub doctor: Doctor,
    /// Distinct patients across the doctor's records.
    pub patient_count: u64,
}

/// Grouped statistics over hospitalizations and medical records.
///
/// Maps keyed by department name iterate in [`BTreeMap`] order, which
/// compares names byte by byte. Names of the same case come out
/// alphabetically, but every uppercase ASCII letter sorts before any
/// lowercase one, so `"ICU"` precedes `"cardiology"`.
pub trait AnalyticsProvider {
    /// Mean length of discharged stays in whole days, keyed by department name.
    ///
    /// Departments without a discharged stay are omitted.
    fn average_length_of_stay_per_department(&self) -> StorageResult<BTreeMap<String, i64>>;

    /// Distinct patient counts for doctors with at least one record.
    ///
    /// Ordered by count descending, then by doctor id.
    fn doctor_patient_counts(&self) -> StorageResult<Vec<DoctorPatientCount>>;

    /// Number of records whose diagnosis mentions covid, in any case.
    fn covid_case_count(&self) -> StorageResult<u64>;

    /// Current stays divided by capacity for every department.
    ///
    /// A department without a positive capacity reports 0.0. Admissions
    /// beyond capacity are allowed but the rate never exceeds 1.0.
    fn bed_occupancy_rate_per_department(&self) -> StorageResult<BTreeMap<String, f64>>;

    /// Mean age in whole years on `today` of every patient ever admitted.
    ///
    /// Each patient counts once. Returns 0.0 when nobody was admitted.
    fn average_age_of_admitted_patients_on(&self, today: NaiveDate) -> StorageResult<f64>;

    /// [`AnalyticsProvider::average_age_of_admitted_patients_on`] for the local date.
    fn average_age_of_admitted_patients(&self) -> StorageResult<f64> {
        self.average_age_of_admitted_patients_on(crate::types::now().date())
    }

    /// Admissions in the calendar year, keyed by department name.
    ///
    /// Departments without an admission that year are omitted. Keys iterate
    /// in byte order of the name, see the trait docs.
    fn admissions_per_department_per_year(&self, year: i32)
    -> StorageResult<BTreeMap<String, u64>>;
}

/// Age in completed years on `today`.
pub fn age_on(date_of_birth: NaiveDate, today: NaiveDate) -> i32 {
    // years_since is None when the birth date is after today
    today
        .years_since(date_of_birth)
        .map(|years| years as i32)
        .unwrap_or(0)
}
