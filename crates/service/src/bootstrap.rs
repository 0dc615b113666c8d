//! Start-up bootstrap: schema reconciliation followed by sample-data seeding.
//!
//! Nothing here is allowed to stop the server from starting; every failure
//! is logged and swallowed.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{error, info, warn};

use db::{schema, DbError, DbPool, EmployeeChanges};

use crate::store::EmployeeStore;

struct Sample {
    first_name: &'static str,
    last_name: &'static str,
    department: &'static str,
    position: &'static str,
    hired: (i32, u32, u32),
    /// Salary in cents.
    salary_cents: i64,
}

const SAMPLES: &[Sample] = &[
    Sample { first_name: "John",  last_name: "Doe",      department: "Engineering", position: "Software Engineer",    hired: (2022, 1, 15),  salary_cents: 7_500_000 },
    Sample { first_name: "Jane",  last_name: "Smith",    department: "HR",          position: "HR Manager",           hired: (2021, 3, 10),  salary_cents: 6_500_000 },
    Sample { first_name: "Mike",  last_name: "Johnson",  department: "Sales",       position: "Sales Representative", hired: (2023, 6, 1),   salary_cents: 5_500_000 },
    Sample { first_name: "Sarah", last_name: "Williams", department: "Marketing",   position: "Marketing Specialist", hired: (2022, 9, 20),  salary_cents: 6_000_000 },
    Sample { first_name: "David", last_name: "Brown",    department: "Finance",     position: "Financial Analyst",    hired: (2021, 11, 5),  salary_cents: 7_000_000 },
];

/// The fixed sample employees inserted into an empty table.
pub fn sample_employees() -> Vec<EmployeeChanges> {
    SAMPLES
        .iter()
        .filter_map(|s| {
            let (y, m, d) = s.hired;
            let hire_date = NaiveDate::from_ymd_opt(y, m, d)?;
            Some(EmployeeChanges {
                first_name: s.first_name.to_string(),
                last_name: s.last_name.to_string(),
                email: format!("{}.{}@company.com", s.first_name, s.last_name).to_lowercase(),
                department: s.department.to_string(),
                position: s.position.to_string(),
                hire_date,
                salary: Some(Decimal::new(s.salary_cents, 2)),
            })
        })
        .collect()
}

/// Insert the sample employees if the table holds no rows at all.
///
/// Returns how many rows were inserted. Individual insert failures are
/// logged and skipped.
pub async fn seed_if_empty(store: &dyn EmployeeStore) -> Result<usize, DbError> {
    let existing = store.count_all().await?;
    if existing > 0 {
        info!("Found {existing} existing employees, skipping sample data creation");
        return Ok(0);
    }

    info!("No employees found, creating sample data");
    let mut inserted = 0;
    for sample in sample_employees() {
        match store.insert(&sample).await {
            Ok(_) => inserted += 1,
            Err(e) => warn!("Could not create sample employee {}: {e}", sample.email),
        }
    }
    info!("Created {inserted} sample employees");
    Ok(inserted)
}

/// Reconcile the schema and, when `seed` is set, seed an empty table.
///
/// Never fails; problems are logged.
pub async fn run(pool: &DbPool, store: &dyn EmployeeStore, seed: bool) {
    info!("Starting database initialization");

    match schema::ensure_schema(pool).await {
        Ok(report) if !report.is_clean() => {
            warn!("Schema reconciliation incomplete: {}", report.failures.join("; "));
        }
        Ok(_) => {}
        Err(e) => error!("Error ensuring table structure: {e}"),
    }

    if seed {
        if let Err(e) = seed_if_empty(store).await {
            error!("Error initializing sample data: {e}");
        }
    }

    info!("Database initialization finished");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MemoryStore;
    use crate::validation;
    use std::collections::HashSet;

    #[test]
    fn samples_pass_validation_and_have_distinct_emails() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let samples = sample_employees();
        assert_eq!(samples.len(), SAMPLES.len());

        let emails: HashSet<&str> = samples.iter().map(|s| s.email.as_str()).collect();
        assert_eq!(emails.len(), samples.len());

        for sample in &samples {
            let input = crate::EmployeeInput {
                first_name: Some(sample.first_name.clone()),
                last_name: Some(sample.last_name.clone()),
                email: Some(sample.email.clone()),
                department: Some(sample.department.clone()),
                position: Some(sample.position.clone()),
                hire_date: Some(sample.hire_date),
                salary: sample.salary,
            };
            assert_eq!(validation::validate(&input, today).as_ref(), Ok(sample));
        }
    }

    #[tokio::test]
    async fn seeds_an_empty_store_once() {
        let store = MemoryStore::new();
        assert_eq!(seed_if_empty(&store).await.unwrap(), 5);
        assert_eq!(seed_if_empty(&store).await.unwrap(), 0);
        assert_eq!(store.rows().len(), 5);
    }

    #[tokio::test]
    async fn soft_deleted_rows_still_count_as_existing() {
        let store = MemoryStore::new();
        seed_if_empty(&store).await.unwrap();
        for row in store.rows() {
            store.set_active(row.id, false).await.unwrap();
        }
        assert_eq!(seed_if_empty(&store).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn unavailable_store_reports_an_error() {
        let store = MemoryStore::new();
        store.set_unavailable(true);
        assert!(seed_if_empty(&store).await.is_err());
    }
}
