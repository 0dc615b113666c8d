//! Field validation for employee input.
//!
//! Rules enforced (messages are user-facing):
//! 1. Names are required and 2–50 characters long.
//! 2. Email is required, well-formed and at most 100 characters.
//! 3. Department is required (free text, at most 100 characters).
//! 4. Position is required and 2–100 characters long.
//! 5. Hire date is required and not in the future.
//! 6. Salary is optional, non-negative and fits `NUMERIC(10, 2)`.
//!
//! Every rule is checked; the result carries all failures, not the first.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use validator::ValidateEmail;

use db::EmployeeChanges;

use crate::{models::EmployeeInput, ValidationErrors};

/// Exclusive upper bound of a `NUMERIC(10, 2)` salary.
const SALARY_LIMIT: Decimal = Decimal::from_parts(100_000_000, 0, 0, false, 0);

fn trimmed(value: &Option<String>) -> &str {
    value.as_deref().map(str::trim).unwrap_or("")
}

fn check_length(
    errors: &mut ValidationErrors,
    field: &str,
    value: &str,
    (min, max): (usize, usize),
    required: &str,
    out_of_range: &str,
) {
    let len = value.chars().count();
    if len == 0 {
        errors.push(field, required);
    } else if len < min || len > max {
        errors.push(field, out_of_range);
    }
}

/// Normalise an email for storage and comparison.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validate `input` and return the normalised column values.
///
/// `today` is the reference date for the "not in the future" rule.
///
/// # Errors
/// Returns every failing field as a [`ValidationErrors`].
pub fn validate(input: &EmployeeInput, today: NaiveDate) -> Result<EmployeeChanges, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let first_name = trimmed(&input.first_name);
    check_length(
        &mut errors, "firstName", first_name, (2, 50),
        "First name is required",
        "First name must be between 2 and 50 characters",
    );

    let last_name = trimmed(&input.last_name);
    check_length(
        &mut errors, "lastName", last_name, (2, 50),
        "Last name is required",
        "Last name must be between 2 and 50 characters",
    );

    let email = normalize_email(input.email.as_deref().unwrap_or(""));
    if email.is_empty() {
        errors.push("email", "Email is required");
    } else if email.chars().count() > 100 {
        errors.push("email", "Email must not exceed 100 characters");
    } else if !email.validate_email() {
        errors.push("email", "Please provide a valid email address");
    }

    let department = trimmed(&input.department);
    check_length(
        &mut errors, "department", department, (1, 100),
        "Department is required",
        "Department must not exceed 100 characters",
    );

    let position = trimmed(&input.position);
    check_length(
        &mut errors, "position", position, (2, 100),
        "Position is required",
        "Position must be between 2 and 100 characters",
    );

    match input.hire_date {
        None => errors.push("hireDate", "Hire date is required"),
        Some(date) if date > today => errors.push("hireDate", "Hire date cannot be in the future"),
        Some(_) => {}
    }

    let salary = input.salary.map(|s| s.round_dp(2));
    if let Some(s) = salary {
        if s < Decimal::ZERO {
            errors.push("salary", "Salary must be a positive number");
        } else if s >= SALARY_LIMIT {
            errors.push("salary", "Salary must not exceed 99999999.99");
        }
    }

    match input.hire_date {
        Some(hire_date) if errors.is_empty() => Ok(EmployeeChanges {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email,
            department: department.to_string(),
            position: position.to_string(),
            hire_date,
            salary,
        }),
        _ => Err(errors),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn valid_input() -> EmployeeInput {
        EmployeeInput {
            first_name: Some("  Ada ".into()),
            last_name: Some("Lovelace".into()),
            email: Some(" Ada.Lovelace@Example.COM ".into()),
            department: Some("Engineering".into()),
            position: Some("Analyst".into()),
            hire_date: NaiveDate::from_ymd_opt(2020, 1, 15),
            salary: Some(Decimal::from_str("72000.456").unwrap()),
        }
    }

    #[test]
    fn valid_input_is_normalised() {
        let changes = validate(&valid_input(), today()).expect("input should be valid");
        assert_eq!(changes.first_name, "Ada");
        assert_eq!(changes.email, "ada.lovelace@example.com");
        assert_eq!(changes.salary, Some(Decimal::from_str("72000.46").unwrap()));
    }

    #[test]
    fn empty_input_reports_every_required_field() {
        let errors = validate(&EmployeeInput::default(), today()).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["firstName", "lastName", "email", "department", "position", "hireDate"]
        );
        assert_eq!(errors.message_for("firstName"), Some("First name is required"));
    }

    #[test]
    fn short_names_and_bad_email_are_rejected() {
        let input = EmployeeInput {
            first_name: Some("A".into()),
            email: Some("not-an-email".into()),
            ..valid_input()
        };
        let errors = validate(&input, today()).unwrap_err();
        assert_eq!(
            errors.message_for("firstName"),
            Some("First name must be between 2 and 50 characters")
        );
        assert_eq!(errors.message_for("email"), Some("Please provide a valid email address"));
        assert!(!errors.has_field("lastName"));
    }

    #[test]
    fn future_hire_date_is_rejected_but_today_is_fine() {
        let tomorrow = today().succ_opt().unwrap();
        let future = EmployeeInput { hire_date: Some(tomorrow), ..valid_input() };
        let errors = validate(&future, today()).unwrap_err();
        assert_eq!(errors.message_for("hireDate"), Some("Hire date cannot be in the future"));

        let same_day = EmployeeInput { hire_date: Some(today()), ..valid_input() };
        assert!(validate(&same_day, today()).is_ok());
    }

    #[test]
    fn salary_bounds() {
        let negative = EmployeeInput { salary: Some(Decimal::from(-1)), ..valid_input() };
        assert!(validate(&negative, today()).unwrap_err().has_field("salary"));

        let huge = EmployeeInput { salary: Some(Decimal::from(100_000_000)), ..valid_input() };
        assert!(validate(&huge, today()).unwrap_err().has_field("salary"));

        let none = EmployeeInput { salary: None, ..valid_input() };
        assert_eq!(validate(&none, today()).unwrap().salary, None);
    }

    #[test]
    fn department_is_free_text() {
        let input = EmployeeInput { department: Some("Quantum Gardening".into()), ..valid_input() };
        assert_eq!(validate(&input, today()).unwrap().department, "Quantum Gardening");
    }
}
