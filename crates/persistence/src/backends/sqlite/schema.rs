//! SQLite schema definitions.

use rusqlite::Connection;
use rusqlite::functions::FunctionFlags;
use tracing::info;

use crate::error::{BackendError, StorageResult};

/// Current schema version.
pub const SCHEMA_VERSION: i32 = 1;

/// Tables created by [`initialize_schema`], parents first.
pub const TABLES: [&str; 6] = [
    "department",
    "patient",
    "doctor",
    "appointment",
    "hospitalization",
    "medical_record",
];

/// Reporting views created by [`initialize_schema`].
pub const VIEWS: [&str; 3] = [
    "appointment_full_view",
    "department_full_view",
    "current_hospitalization_view",
];

/// Unicode case-folding SQL function registered on every connection.
const FOLD_CASE: &str = "fold_case";

/// Registers `fold_case(text)`, which lowercases with full Unicode rules.
///
/// SQLite's own `LOWER()` and `NOCASE` only fold ASCII. Department names are
/// compared and kept unique through this function, so it must be present on
/// every connection that reads or writes the `department` table.
pub fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        FOLD_CASE,
        1,
        FunctionFlags::SQLITE_UTF8
            | FunctionFlags::SQLITE_DETERMINISTIC
            | FunctionFlags::SQLITE_INNOCUOUS,
        |ctx| {
            let text: Option<String> = ctx.get(0)?;
            Ok(text.map(|t| t.to_lowercase()))
        },
    )
}

/// Initialize the database schema.
///
/// Safe to call on an already initialized database.
pub fn initialize_schema(conn: &Connection) -> StorageResult<()> {
    register_functions(conn).map_err(|e| schema_error("register functions", e))?;
    let current_version = get_schema_version(conn)?;

    if current_version == 0 {
        create_tables(conn)?;
        create_indexes(conn)?;
        create_views(conn)?;
        set_schema_version(conn, SCHEMA_VERSION)?;
        info!(version = SCHEMA_VERSION, "Created wardbook schema");
    } else if current_version > SCHEMA_VERSION {
        return Err(BackendError::SchemaError {
            message: format!(
                "database schema version {} is newer than supported version {}",
                current_version, SCHEMA_VERSION
            ),
        }
        .into());
    }

    Ok(())
}

/// Get the current schema version, 0 for an empty database.
fn get_schema_version(conn: &Connection) -> StorageResult<i32> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER NOT NULL
        )",
        [],
    )
    .map_err(|e| schema_error("create schema_version table", e))?;

    match conn.query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
        row.get(0)
    }) {
        Ok(version) => Ok(version),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
        Err(e) => Err(schema_error("read schema_version", e)),
    }
}

/// Set the schema version.
fn set_schema_version(conn: &Connection, version: i32) -> StorageResult<()> {
    conn.execute("DELETE FROM schema_version", [])
        .map_err(|e| schema_error("clear schema_version", e))?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])
        .map_err(|e| schema_error("set schema_version", e))?;
    Ok(())
}

fn create_tables(conn: &Connection) -> StorageResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS department (
            department_id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            capacity INTEGER CHECK (capacity IS NULL OR capacity >= 0)
        );

        CREATE TABLE IF NOT EXISTS patient (
            patient_id INTEGER PRIMARY KEY AUTOINCREMENT,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            date_of_birth TEXT NOT NULL,
            gender TEXT CHECK (gender IS NULL OR gender IN ('M', 'F')),
            phone TEXT,
            amka TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS doctor (
            doctor_id INTEGER PRIMARY KEY AUTOINCREMENT,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            specialty TEXT NOT NULL,
            phone TEXT,
            department_id INTEGER REFERENCES department (department_id)
        );

        CREATE TABLE IF NOT EXISTS appointment (
            appointment_id INTEGER PRIMARY KEY AUTOINCREMENT,
            patient_id INTEGER NOT NULL REFERENCES patient (patient_id),
            doctor_id INTEGER NOT NULL REFERENCES doctor (doctor_id),
            appointment_datetime TEXT NOT NULL,
            reason TEXT
        );

        CREATE TABLE IF NOT EXISTS hospitalization (
            hospitalization_id INTEGER PRIMARY KEY AUTOINCREMENT,
            patient_id INTEGER NOT NULL REFERENCES patient (patient_id),
            department_id INTEGER NOT NULL REFERENCES department (department_id),
            admit_datetime TEXT NOT NULL,
            discharge_datetime TEXT,
            bed_number TEXT,
            reason TEXT
        );

        CREATE TABLE IF NOT EXISTS medical_record (
            record_id INTEGER PRIMARY KEY AUTOINCREMENT,
            patient_id INTEGER NOT NULL REFERENCES patient (patient_id),
            doctor_id INTEGER REFERENCES doctor (doctor_id),
            record_datetime TEXT NOT NULL,
            diagnosis TEXT NOT NULL,
            treatment TEXT NOT NULL,
            notes TEXT
        );",
    )
    .map_err(|e| schema_error("create tables", e))
}

fn create_indexes(conn: &Connection) -> StorageResult<()> {
    conn.execute_batch(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_department_name ON department (fold_case(name));
        CREATE INDEX IF NOT EXISTS idx_doctor_department ON doctor (department_id);
        CREATE INDEX IF NOT EXISTS idx_appointment_doctor ON appointment (doctor_id, appointment_datetime);
        CREATE INDEX IF NOT EXISTS idx_appointment_patient ON appointment (patient_id, appointment_datetime);
        CREATE INDEX IF NOT EXISTS idx_hospitalization_patient ON hospitalization (patient_id);
        CREATE INDEX IF NOT EXISTS idx_hospitalization_department ON hospitalization (department_id, discharge_datetime);
        CREATE INDEX IF NOT EXISTS idx_hospitalization_admit ON hospitalization (admit_datetime);
        CREATE INDEX IF NOT EXISTS idx_medical_record_patient ON medical_record (patient_id);
        CREATE INDEX IF NOT EXISTS idx_medical_record_doctor ON medical_record (doctor_id);",
    )
    .map_err(|e| schema_error("create indexes", e))
}

fn create_views(conn: &Connection) -> StorageResult<()> {
    conn.execute_batch(
        "CREATE VIEW IF NOT EXISTS appointment_full_view AS
        SELECT
            a.appointment_id,
            a.appointment_datetime,
            a.reason AS appointment_reason,
            d.doctor_id,
            d.first_name AS doctor_first_name,
            d.last_name AS doctor_last_name,
            d.specialty AS doctor_specialty,
            d.phone AS doctor_phone,
            d.department_id,
            dep.name AS department_name,
            dep.capacity AS department_capacity,
            p.patient_id,
            p.first_name AS patient_first_name,
            p.last_name AS patient_last_name,
            p.date_of_birth AS patient_birth_date,
            p.gender AS patient_gender,
            p.phone AS patient_phone,
            p.amka AS patient_amka
        FROM appointment a
        JOIN doctor d ON d.doctor_id = a.doctor_id
        JOIN patient p ON p.patient_id = a.patient_id
        LEFT JOIN department dep ON dep.department_id = d.department_id;

        CREATE VIEW IF NOT EXISTS department_full_view AS
        SELECT
            dep.department_id,
            dep.name AS department_name,
            dep.capacity,
            (SELECT COUNT(*) FROM hospitalization h
                WHERE h.department_id = dep.department_id
                AND h.discharge_datetime IS NULL) AS current_occupancy,
            (SELECT COUNT(*) FROM doctor d
                WHERE d.department_id = dep.department_id) AS doctor_count
        FROM department dep;

        CREATE VIEW IF NOT EXISTS current_hospitalization_view AS
        SELECT
            h.hospitalization_id,
            h.admit_datetime,
            h.discharge_datetime,
            h.bed_number,
            h.reason,
            p.patient_id,
            p.first_name AS patient_first_name,
            p.last_name AS patient_last_name,
            p.date_of_birth AS patient_date_of_birth,
            p.gender AS patient_gender,
            p.phone AS patient_phone,
            p.amka AS patient_amka,
            dep.department_id,
            dep.name AS department_name,
            dep.capacity AS department_capacity
        FROM hospitalization h
        JOIN patient p ON p.patient_id = h.patient_id
        JOIN department dep ON dep.department_id = h.department_id
        WHERE h.discharge_datetime IS NULL;",
    )
    .map_err(|e| schema_error("create views", e))
}

fn schema_error(step: &str, e: rusqlite::Error) -> crate::error::StorageError {
    BackendError::SchemaError {
        message: format!("failed to {}: {}", step, e),
    }
    .into()
}

/// Drop all tables and views (for testing).
pub fn drop_all_tables(conn: &Connection) -> StorageResult<()> {
    for view in VIEWS {
        conn.execute_batch(&format!("DROP VIEW IF EXISTS {view};"))
            .map_err(|e| schema_error("drop view", e))?;
    }
    for table in TABLES.iter().rev() {
        conn.execute_batch(&format!("DROP TABLE IF EXISTS {table};"))
            .map_err(|e| schema_error("drop table", e))?;
    }
    conn.execute_batch("DROP TABLE IF EXISTS schema_version;")
        .map_err(|e| schema_error("drop schema_version", e))?;
    Ok(())
}
