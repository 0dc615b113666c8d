//! The `EmployeeStore` trait: the persistence contract the service needs.
//!
//! [`PgEmployeeStore`] forwards to the repository functions in the `db`
//! crate; [`crate::mock::MemoryStore`] implements the same contract in
//! memory for tests.

use async_trait::async_trait;

use db::{
    repository::employees::{self as repo, ActiveFilter},
    DbError, DbPool, EmployeeChanges, EmployeeRow, Page, PageRequest,
};

#[async_trait]
pub trait EmployeeStore: Send + Sync {
    /// Look up a row by id, active or not.
    async fn find_by_id(&self, id: i64) -> Result<Option<EmployeeRow>, DbError>;

    /// One page of active rows selected by `filter`.
    async fn find_active_page(
        &self,
        filter: ActiveFilter<'_>,
        request: &PageRequest,
    ) -> Result<Page<EmployeeRow>, DbError>;

    async fn count_active(&self) -> Result<i64, DbError>;

    /// Row count including soft-deleted rows.
    async fn count_all(&self) -> Result<i64, DbError>;

    /// `(department, active count)` pairs ordered by department.
    async fn count_by_department(&self) -> Result<Vec<(String, i64)>, DbError>;

    /// Sorted distinct departments of active rows.
    async fn departments(&self) -> Result<Vec<String>, DbError>;

    async fn exists_by_email(&self, email: &str) -> Result<bool, DbError>;

    async fn exists_by_email_excluding(&self, email: &str, id: i64) -> Result<bool, DbError>;

    async fn insert(&self, changes: &EmployeeChanges) -> Result<EmployeeRow, DbError>;

    /// Returns `DbError::NotFound` when `id` does not exist.
    async fn update(&self, id: i64, changes: &EmployeeChanges) -> Result<EmployeeRow, DbError>;

    /// Returns `DbError::NotFound` when `id` does not exist.
    async fn set_active(&self, id: i64, active: bool) -> Result<(), DbError>;

    /// Physically remove `id`; returns the number of rows removed.
    async fn delete(&self, id: i64) -> Result<u64, DbError>;
}

/// Postgres-backed store.
#[derive(Debug, Clone)]
pub struct PgEmployeeStore {
    pool: DbPool,
}

impl PgEmployeeStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EmployeeStore for PgEmployeeStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<EmployeeRow>, DbError> {
        repo::find_by_id(&self.pool, id).await
    }

    async fn find_active_page(
        &self,
        filter: ActiveFilter<'_>,
        request: &PageRequest,
    ) -> Result<Page<EmployeeRow>, DbError> {
        repo::find_active_page(&self.pool, filter, request).await
    }

    async fn count_active(&self) -> Result<i64, DbError> {
        repo::count_active(&self.pool).await
    }

    async fn count_all(&self) -> Result<i64, DbError> {
        repo::count_all(&self.pool).await
    }

    async fn count_by_department(&self) -> Result<Vec<(String, i64)>, DbError> {
        repo::count_by_department(&self.pool).await
    }

    async fn departments(&self) -> Result<Vec<String>, DbError> {
        repo::departments(&self.pool).await
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, DbError> {
        repo::exists_by_email(&self.pool, email).await
    }

    async fn exists_by_email_excluding(&self, email: &str, id: i64) -> Result<bool, DbError> {
        repo::exists_by_email_excluding(&self.pool, email, id).await
    }

    async fn insert(&self, changes: &EmployeeChanges) -> Result<EmployeeRow, DbError> {
        repo::insert(&self.pool, changes).await
    }

    async fn update(&self, id: i64, changes: &EmployeeChanges) -> Result<EmployeeRow, DbError> {
        repo::update(&self.pool, id, changes).await
    }

    async fn set_active(&self, id: i64, active: bool) -> Result<(), DbError> {
        repo::set_active(&self.pool, id, active).await
    }

    async fn delete(&self, id: i64) -> Result<u64, DbError> {
        repo::delete(&self.pool, id).await
    }
}
