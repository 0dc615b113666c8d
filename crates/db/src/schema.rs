//! Idempotent schema bootstrap for the `employees` table.
//!
//! Run once at start-up, before requests are served:
//! 1. Create the table (and its indexes) when it does not exist.
//! 2. Add any expected column an older table is missing, with a safe default.
//! 3. Back-fill `NULL` date-like columns left behind by earlier schemas.
//!
//! Only the initial existence probe is fatal; every later step logs its
//! failure and moves on so a partially broken table never blocks start-up.

use sqlx::PgPool;
use tracing::{error, info, warn};

use crate::DbError;

/// One column the application expects, with the DDL used to add it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: &'static str,
    /// Definition used by `ALTER TABLE … ADD COLUMN`.
    pub definition: &'static str,
}

/// Every column of `employees`, in table order.
pub const EXPECTED_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec { name: "id",         definition: "BIGSERIAL PRIMARY KEY" },
    ColumnSpec { name: "first_name", definition: "VARCHAR(50) NOT NULL DEFAULT ''" },
    ColumnSpec { name: "last_name",  definition: "VARCHAR(50) NOT NULL DEFAULT ''" },
    ColumnSpec { name: "email",      definition: "VARCHAR(100) NOT NULL DEFAULT ''" },
    ColumnSpec { name: "department", definition: "VARCHAR(100) NOT NULL DEFAULT ''" },
    ColumnSpec { name: "position",   definition: "VARCHAR(100) NOT NULL DEFAULT ''" },
    ColumnSpec { name: "hire_date",  definition: "DATE NOT NULL DEFAULT DATE '2020-01-01'" },
    ColumnSpec { name: "salary",     definition: "NUMERIC(10, 2) DEFAULT 0.00" },
    ColumnSpec { name: "is_active",  definition: "BOOLEAN NOT NULL DEFAULT TRUE" },
    ColumnSpec { name: "created_at", definition: "TIMESTAMPTZ NOT NULL DEFAULT NOW()" },
    ColumnSpec { name: "updated_at", definition: "TIMESTAMPTZ NOT NULL DEFAULT NOW()" },
];

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS employees (
        id          BIGSERIAL PRIMARY KEY,
        first_name  VARCHAR(50)  NOT NULL,
        last_name   VARCHAR(50)  NOT NULL,
        email       VARCHAR(100) NOT NULL,
        department  VARCHAR(100) NOT NULL,
        position    VARCHAR(100) NOT NULL,
        hire_date   DATE         NOT NULL,
        salary      NUMERIC(10, 2),
        is_active   BOOLEAN      NOT NULL DEFAULT TRUE,
        created_at  TIMESTAMPTZ  NOT NULL DEFAULT NOW(),
        updated_at  TIMESTAMPTZ  NOT NULL DEFAULT NOW()
    )
"#;

const INDEXES: &[(&str, &str)] = &[
    ("idx_employees_email",
     "CREATE UNIQUE INDEX IF NOT EXISTS idx_employees_email ON employees (email)"),
    ("idx_employees_department",
     "CREATE INDEX IF NOT EXISTS idx_employees_department ON employees (department)"),
    ("idx_employees_is_active",
     "CREATE INDEX IF NOT EXISTS idx_employees_is_active ON employees (is_active)"),
];

const NORMALIZATIONS: &[(&str, &str)] = &[
    ("hire_date",  "UPDATE employees SET hire_date = DATE '2020-01-01' WHERE hire_date IS NULL"),
    ("created_at", "UPDATE employees SET created_at = NOW() WHERE created_at IS NULL"),
    ("updated_at", "UPDATE employees SET updated_at = NOW() WHERE updated_at IS NULL"),
    ("is_active",  "UPDATE employees SET is_active = TRUE WHERE is_active IS NULL"),
];

/// What [`ensure_schema`] did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SchemaReport {
    pub created_table: bool,
    pub added_columns: Vec<String>,
    /// Human-readable description of every step that failed.
    pub failures: Vec<String>,
}

impl SchemaReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// The expected columns not present in `existing` (compared case-insensitively).
pub fn missing_columns(existing: &[String]) -> Vec<ColumnSpec> {
    EXPECTED_COLUMNS
        .iter()
        .filter(|spec| !existing.iter().any(|c| c.eq_ignore_ascii_case(spec.name)))
        .copied()
        .collect()
}

async fn table_exists(pool: &PgPool) -> Result<bool, DbError> {
    let exists = sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM information_schema.tables
            WHERE table_schema = current_schema() AND table_name = 'employees'
        )
        "#,
    )
    .fetch_one(pool)
    .await?;
    Ok(exists)
}

async fn existing_columns(pool: &PgPool) -> Result<Vec<String>, DbError> {
    let columns = sqlx::query_scalar::<_, String>(
        r#"
        SELECT column_name::text FROM information_schema.columns
        WHERE table_schema = current_schema() AND table_name = 'employees'
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(columns)
}

/// Run `sql`, recording a failure under `step` instead of propagating it.
async fn run_step(pool: &PgPool, step: &str, sql: &str, report: &mut SchemaReport) -> bool {
    match sqlx::query(sql).execute(pool).await {
        Ok(_) => true,
        Err(e) => {
            warn!("Schema step '{step}' failed: {e}");
            report.failures.push(format!("{step}: {e}"));
            false
        }
    }
}

/// Bring the `employees` table up to the expected shape.
///
/// # Errors
/// Returns `DbError` only when the database cannot be inspected at all.
pub async fn ensure_schema(pool: &PgPool) -> Result<SchemaReport, DbError> {
    let mut report = SchemaReport::default();

    if !table_exists(pool).await? {
        info!("Creating employees table");
        let created = run_step(pool, "create table", CREATE_TABLE, &mut report).await;
        report.created_table = created;
    } else {
        info!("Employees table exists, checking structure");
        match existing_columns(pool).await {
            Ok(existing) => {
                for column in missing_columns(&existing) {
                    let sql = format!(
                        "ALTER TABLE employees ADD COLUMN IF NOT EXISTS {} {}",
                        column.name, column.definition
                    );
                    if run_step(pool, &format!("add column {}", column.name), &sql, &mut report).await {
                        info!("Added {} column", column.name);
                        report.added_columns.push(column.name.to_string());
                    }
                }
            }
            Err(e) => {
                error!("Could not list employees columns: {e}");
                report.failures.push(format!("list columns: {e}"));
            }
        }

        for (column, sql) in NORMALIZATIONS {
            run_step(pool, &format!("normalize {column}"), sql, &mut report).await;
        }
    }

    for (name, sql) in INDEXES {
        run_step(pool, &format!("index {name}"), sql, &mut report).await;
    }

    if report.is_clean() {
        info!("Database schema is up to date");
    } else {
        warn!("Database schema bootstrap finished with {} failure(s)", report.failures.len());
    }

    Ok(report)
}
