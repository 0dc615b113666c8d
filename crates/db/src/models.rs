//! Row structs that map 1-to-1 onto database tables.
//!
//! These are *persistence* models: they carry no domain behaviour.
//! Domain types live in the `service` crate.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// employees
// ---------------------------------------------------------------------------

/// Column list shared by every `SELECT` / `RETURNING` on `employees`.
pub const EMPLOYEE_COLUMNS: &str = "id, first_name, last_name, email, department, position, \
     hire_date, salary, is_active, created_at, updated_at";

/// A persisted employee row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct EmployeeRow {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub department: String,
    pub position: String,
    pub hire_date: NaiveDate,
    pub salary: Option<Decimal>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The replaceable columns of an employee, already validated and normalised.
///
/// Used for both inserts and full updates; `id`, `is_active` and the
/// timestamps are owned by the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeChanges {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub department: String,
    pub position: String,
    pub hire_date: NaiveDate,
    pub salary: Option<Decimal>,
}
