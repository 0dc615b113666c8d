//! Core domain models for employee records.
//!
//! `Employee` is the in-memory shape handed to the API layer; it is built
//! from the persistence row in the `db` crate.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use db::EmployeeRow;

// ---------------------------------------------------------------------------
// Employee
// ---------------------------------------------------------------------------

/// A stored employee, active or soft-deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
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

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl From<EmployeeRow> for Employee {
    fn from(row: EmployeeRow) -> Self {
        Self {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            department: row.department,
            position: row.position,
            hire_date: row.hire_date,
            salary: row.salary,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// EmployeeInput
// ---------------------------------------------------------------------------

/// Unvalidated field values for a create or a full update.
///
/// Every field is optional so that missing values surface as field-level
/// validation messages rather than deserialisation failures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub hire_date: Option<NaiveDate>,
    pub salary: Option<Decimal>,
}

impl From<&Employee> for EmployeeInput {
    fn from(e: &Employee) -> Self {
        Self {
            first_name: Some(e.first_name.clone()),
            last_name: Some(e.last_name.clone()),
            email: Some(e.email.clone()),
            department: Some(e.department.clone()),
            position: Some(e.position.clone()),
            hire_date: Some(e.hire_date),
            salary: e.salary,
        }
    }
}

// ---------------------------------------------------------------------------
// EmployeeFilter
// ---------------------------------------------------------------------------

/// Listing filters shared by the REST and HTML surfaces.
///
/// A non-blank `search` wins over `department`; with neither, every active
/// employee is listed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeFilter {
    pub search: Option<String>,
    pub department: Option<String>,
}

impl EmployeeFilter {
    /// The trimmed search term, if one was given.
    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// The trimmed department, if one was given.
    pub fn department(&self) -> Option<&str> {
        self.department.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// Aggregate head-count over active employees.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_employees: i64,
    /// Department name → active employee count.
    pub department_stats: BTreeMap<String, i64>,
    /// Departments with at least one active employee, sorted.
    pub departments: Vec<String>,
}
