//! HTML form binding for the add and edit pages.
//!
//! Form fields arrive as raw strings so a bad date or salary can be reported
//! next to the field and the user's input re-rendered unchanged.

use std::str::FromStr;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use service::{validation, Employee, EmployeeInput, ValidationErrors};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmployeeForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub department: String,
    pub position: String,
    pub hire_date: String,
    pub salary: String,
}

impl EmployeeForm {
    pub fn from_employee(e: &Employee) -> Self {
        Self {
            first_name: e.first_name.clone(),
            last_name: e.last_name.clone(),
            email: e.email.clone(),
            department: e.department.clone(),
            position: e.position.clone(),
            hire_date: e.hire_date.format(DATE_FORMAT).to_string(),
            salary: e.salary.map(|s| s.to_string()).unwrap_or_default(),
        }
    }

    /// Convert to service input, collecting parse failures of typed fields.
    pub fn parse(&self) -> (EmployeeInput, ValidationErrors) {
        let mut errors = ValidationErrors::default();

        let hire_date = match self.hire_date.trim() {
            "" => None,
            raw => NaiveDate::parse_from_str(raw, DATE_FORMAT)
                .map_err(|_| errors.push("hireDate", "Please provide a valid date in YYYY-MM-DD format"))
                .ok(),
        };
        let salary = match self.salary.trim() {
            "" => None,
            raw => Decimal::from_str(raw)
                .map_err(|_| errors.push("salary", "Salary must be a valid number"))
                .ok(),
        };

        let input = EmployeeInput {
            first_name: Some(self.first_name.clone()),
            last_name: Some(self.last_name.clone()),
            email: Some(self.email.clone()),
            department: Some(self.department.clone()),
            position: Some(self.position.clone()),
            hire_date,
            salary,
        };
        (input, errors)
    }

    /// Parse the typed fields of the form.
    ///
    /// On success the input is returned unvalidated; the service applies the
    /// field rules. When a date or salary fails to parse, the rule failures of
    /// the other fields are collected too, so the form shows every error at
    /// once (a parse failure wins over a rule failure on the same field).
    pub fn bind(&self) -> Result<EmployeeInput, ValidationErrors> {
        let (input, mut errors) = self.parse();
        if errors.is_empty() {
            return Ok(input);
        }

        if let Err(rule_errors) = validation::validate(&input, Utc::now().date_naive()) {
            for e in rule_errors.0 {
                if !errors.has_field(&e.field) {
                    errors.0.push(e);
                }
            }
        }
        Err(errors)
    }
}
