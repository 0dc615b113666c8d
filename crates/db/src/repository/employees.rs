//! Employee CRUD, listing and aggregate queries.
//!
//! Listing queries are composed with [`QueryBuilder`] so the filter, the
//! ordering and the paging clauses can vary while every user-supplied value
//! still travels as a bind parameter.

use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::{
    models::{EmployeeChanges, EmployeeRow, EMPLOYEE_COLUMNS},
    paging::{Page, PageRequest, SortField},
    DbError,
};

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

/// Which active rows a listing query selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveFilter<'a> {
    /// Every active employee.
    All,
    /// Active employees whose department equals the value exactly.
    Department(&'a str),
    /// Active employees with the term in any text column (case-insensitive).
    Search(&'a str),
}

/// Escape `LIKE` metacharacters so `term` matches literally.
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn push_filter<'a>(qb: &mut QueryBuilder<'a, Postgres>, filter: ActiveFilter<'a>) {
    qb.push(" WHERE is_active = TRUE");
    match filter {
        ActiveFilter::All => {}
        ActiveFilter::Department(department) => {
            qb.push(" AND department = ").push_bind(department);
        }
        ActiveFilter::Search(term) => {
            let pattern = format!("%{}%", escape_like(term));
            qb.push(" AND (");
            for (i, column) in ["first_name", "last_name", "email", "department", "position"]
                .iter()
                .enumerate()
            {
                if i > 0 {
                    qb.push(" OR ");
                }
                qb.push(*column).push(" ILIKE ").push_bind(pattern.clone());
            }
            qb.push(")");
        }
    }
}

/// `ORDER BY` with an `id` tie-breaker, then the bound page window.
fn push_order(qb: &mut QueryBuilder<'_, Postgres>, request: &PageRequest) {
    qb.push(" ORDER BY ")
        .push(request.sort.field.column())
        .push(" ")
        .push(request.sort.direction.keyword());
    if request.sort.field != SortField::Id {
        qb.push(", id ASC");
    }
    qb.push(" LIMIT ")
        .push_bind(request.limit())
        .push(" OFFSET ")
        .push_bind(request.offset());
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// Fetch a single employee by primary key, active or not.
pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<EmployeeRow>, DbError> {
    let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = $1");
    let row = sqlx::query_as::<_, EmployeeRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Return one page of active employees matching `filter`.
///
/// Rows are ordered by the requested sort and then by `id` so consecutive
/// pages never overlap.
pub async fn find_active_page(
    pool: &PgPool,
    filter: ActiveFilter<'_>,
    request: &PageRequest,
) -> Result<Page<EmployeeRow>, DbError> {
    let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM employees");
    push_filter(&mut count, filter);
    let total = count.build_query_scalar::<i64>().fetch_one(pool).await?;

    let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {EMPLOYEE_COLUMNS} FROM employees"));
    push_filter(&mut select, filter);
    push_order(&mut select, request);

    let rows = select
        .build_query_as::<EmployeeRow>()
        .fetch_all(pool)
        .await?;

    Ok(Page::new(rows, request, total))
}

pub async fn count_active(pool: &PgPool) -> Result<i64, DbError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM employees WHERE is_active = TRUE")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Count every row, soft-deleted ones included.
pub async fn count_all(pool: &PgPool) -> Result<i64, DbError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM employees")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Active head-count per department, ordered by department name.
pub async fn count_by_department(pool: &PgPool) -> Result<Vec<(String, i64)>, DbError> {
    let rows = sqlx::query_as::<_, (String, i64)>(
        r#"
        SELECT department, COUNT(*)
        FROM employees
        WHERE is_active = TRUE
        GROUP BY department
        ORDER BY department
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Distinct departments that have at least one active employee.
pub async fn departments(pool: &PgPool) -> Result<Vec<String>, DbError> {
    let rows = sqlx::query_scalar::<_, String>(
        "SELECT DISTINCT department FROM employees WHERE is_active = TRUE ORDER BY department",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Whether any row, active or not, already uses `email`.
pub async fn exists_by_email(pool: &PgPool, email: &str) -> Result<bool, DbError> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM employees WHERE LOWER(email) = LOWER($1))",
    )
    .bind(email)
    .fetch_one(pool)
    .await?;
    Ok(exists)
}

/// Whether a row other than `id` already uses `email`.
pub async fn exists_by_email_excluding(
    pool: &PgPool,
    email: &str,
    id: i64,
) -> Result<bool, DbError> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM employees WHERE LOWER(email) = LOWER($1) AND id <> $2)",
    )
    .bind(email)
    .bind(id)
    .fetch_one(pool)
    .await?;
    Ok(exists)
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// Insert a new, active employee and return the stored row.
pub async fn insert(pool: &PgPool, changes: &EmployeeChanges) -> Result<EmployeeRow, DbError> {
    let sql = format!(
        r#"
        INSERT INTO employees
            (first_name, last_name, email, department, position, hire_date, salary,
             is_active, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, TRUE, NOW(), NOW())
        RETURNING {EMPLOYEE_COLUMNS}
        "#
    );

    sqlx::query_as::<_, EmployeeRow>(&sql)
        .bind(&changes.first_name)
        .bind(&changes.last_name)
        .bind(&changes.email)
        .bind(&changes.department)
        .bind(&changes.position)
        .bind(changes.hire_date)
        .bind(changes.salary)
        .fetch_one(pool)
        .await
        .map_err(DbError::classify)
}

/// Overwrite the replaceable columns of `id` and refresh `updated_at`.
///
/// Returns `DbError::NotFound` if no such row exists.
pub async fn update(
    pool: &PgPool,
    id: i64,
    changes: &EmployeeChanges,
) -> Result<EmployeeRow, DbError> {
    let sql = format!(
        r#"
        UPDATE employees
        SET first_name = $1, last_name = $2, email = $3, department = $4,
            position = $5, hire_date = $6, salary = $7, updated_at = NOW()
        WHERE id = $8
        RETURNING {EMPLOYEE_COLUMNS}
        "#
    );

    sqlx::query_as::<_, EmployeeRow>(&sql)
        .bind(&changes.first_name)
        .bind(&changes.last_name)
        .bind(&changes.email)
        .bind(&changes.department)
        .bind(&changes.position)
        .bind(changes.hire_date)
        .bind(changes.salary)
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(DbError::classify)?
        .ok_or(DbError::NotFound)
}

/// Flip the `is_active` flag of `id`.
///
/// Returns `DbError::NotFound` if no row was updated.
pub async fn set_active(pool: &PgPool, id: i64, active: bool) -> Result<(), DbError> {
    let result = sqlx::query("UPDATE employees SET is_active = $1, updated_at = NOW() WHERE id = $2")
        .bind(active)
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }

    Ok(())
}

/// Permanently delete an employee; returns the number of rows removed.
pub async fn delete(pool: &PgPool, id: i64) -> Result<u64, DbError> {
    let result = sqlx::query("DELETE FROM employees WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paging::{Sort, SortDirection};

    #[test]
    fn escape_like_quotes_metacharacters() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn search_filter_binds_every_text_column() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM employees");
        push_filter(&mut qb, ActiveFilter::Search("ann"));
        let sql = qb.sql();
        assert!(sql.contains("is_active = TRUE"));
        for column in ["first_name", "last_name", "email", "department", "position"] {
            assert!(sql.contains(&format!("{column} ILIKE $")), "{column} missing from {sql}");
        }
        assert!(!sql.contains("ann"), "term must be bound, not inlined");
    }

    #[test]
    fn department_filter_is_bound() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM employees");
        push_filter(&mut qb, ActiveFilter::Department("Sales"));
        assert_eq!(
            qb.sql(),
            "SELECT COUNT(*) FROM employees WHERE is_active = TRUE AND department = $1"
        );
    }

    #[test]
    fn tied_sort_column_gets_id_tie_breaker() {
        let sort = Sort { field: SortField::Department, direction: SortDirection::Desc };
        let request = PageRequest::new(1, 10, sort).unwrap();
        let mut qb = QueryBuilder::<Postgres>::new("SELECT id FROM employees");
        push_order(&mut qb, &request);
        assert_eq!(
            qb.sql(),
            "SELECT id FROM employees ORDER BY department DESC, id ASC LIMIT $1 OFFSET $2"
        );
    }

    #[test]
    fn id_sort_has_no_duplicate_tie_breaker() {
        let sort = Sort { field: SortField::Id, direction: SortDirection::Desc };
        let request = PageRequest::new(0, 5, sort).unwrap();
        let mut qb = QueryBuilder::<Postgres>::new("SELECT id FROM employees");
        push_filter(&mut qb, ActiveFilter::All);
        push_order(&mut qb, &request);
        assert_eq!(
            qb.sql(),
            "SELECT id FROM employees WHERE is_active = TRUE ORDER BY id DESC LIMIT $1 OFFSET $2"
        );
    }
}
