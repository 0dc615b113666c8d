//! Employee service.
//!
//! `EmployeeService` is the single entry point both HTTP surfaces use:
//! 1. Validates and normalises input before any write.
//! 2. Enforces email uniqueness across active and soft-deleted rows.
//! 3. Soft-deletes by flipping `is_active`; hard delete is separate.
//! 4. Composes listings (search, department, all) and statistics.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument, warn};

use db::{repository::employees::ActiveFilter, DbError, Page, PageRequest, Sort, SortDirection, SortField};

use crate::{
    models::{Employee, EmployeeFilter, EmployeeInput, Statistics},
    store::EmployeeStore,
    validation, ServiceError,
};

/// Stateless orchestrator over an [`EmployeeStore`].
#[derive(Clone)]
pub struct EmployeeService {
    store: Arc<dyn EmployeeStore>,
}

impl EmployeeService {
    pub fn new(store: Arc<dyn EmployeeStore>) -> Self {
        Self { store }
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Fetch one employee by id. Soft-deleted employees are returned too.
    pub async fn get(&self, id: i64) -> Result<Employee, ServiceError> {
        self.store
            .find_by_id(id)
            .await?
            .map(Employee::from)
            .ok_or(ServiceError::NotFound(id))
    }

    pub async fn list_active(&self, request: &PageRequest) -> Result<Page<Employee>, ServiceError> {
        self.page(ActiveFilter::All, request).await
    }

    pub async fn list_by_department(
        &self,
        department: &str,
        request: &PageRequest,
    ) -> Result<Page<Employee>, ServiceError> {
        self.page(ActiveFilter::Department(department), request).await
    }

    /// Case-insensitive substring search over the text columns of active rows.
    ///
    /// The term is used as given; callers decide what a blank term means.
    pub async fn search(&self, term: &str, request: &PageRequest) -> Result<Page<Employee>, ServiceError> {
        self.page(ActiveFilter::Search(term), request).await
    }

    /// List active employees: search if a term is present, else filter by
    /// department if one is present, else everything.
    pub async fn browse(
        &self,
        filter: &EmployeeFilter,
        request: &PageRequest,
    ) -> Result<Page<Employee>, ServiceError> {
        if let Some(term) = filter.search_term() {
            self.search(term, request).await
        } else if let Some(department) = filter.department() {
            self.list_by_department(department, request).await
        } else {
            self.list_active(request).await
        }
    }

    /// The `limit` most recently created active employees.
    pub async fn recent(&self, limit: u32) -> Result<Vec<Employee>, ServiceError> {
        let sort = Sort { field: SortField::CreatedAt, direction: SortDirection::Desc };
        let request = PageRequest { page: 0, size: limit, sort };
        Ok(self.list_active(&request).await?.items)
    }

    pub async fn count_active(&self) -> Result<i64, ServiceError> {
        Ok(self.store.count_active().await?)
    }

    pub async fn departments(&self) -> Result<Vec<String>, ServiceError> {
        Ok(self.store.departments().await?)
    }

    #[instrument(skip(self))]
    pub async fn statistics(&self) -> Result<Statistics, ServiceError> {
        // One query so the per-department counts always sum to the total.
        let counts = self.store.count_by_department().await?;
        let total_employees = counts.iter().map(|(_, n)| n).sum();
        let departments = counts.iter().map(|(d, _)| d.clone()).collect();
        let department_stats = counts.into_iter().collect();

        Ok(Statistics { total_employees, department_stats, departments })
    }

    async fn page(
        &self,
        filter: ActiveFilter<'_>,
        request: &PageRequest,
    ) -> Result<Page<Employee>, ServiceError> {
        let page = self.store.find_active_page(filter, request).await?;
        Ok(page.map(Employee::from))
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// Validate and persist a new employee.
    ///
    /// # Errors
    /// - [`ServiceError::Validation`] for field-level failures.
    /// - [`ServiceError::DuplicateEmail`] if any row already uses the email.
    #[instrument(skip(self, input))]
    pub async fn create(&self, input: &EmployeeInput) -> Result<Employee, ServiceError> {
        let changes = validation::validate(input, Utc::now().date_naive())?;

        if self.store.exists_by_email(&changes.email).await? {
            return Err(ServiceError::DuplicateEmail(changes.email));
        }

        let row = self.store.insert(&changes).await.map_err(|e| match e {
            DbError::UniqueViolation { .. } => ServiceError::DuplicateEmail(changes.email.clone()),
            other => other.into(),
        })?;

        info!(employee_id = row.id, "Created employee");
        Ok(row.into())
    }

    /// Replace every editable field of `id`.
    ///
    /// `created_at` and `is_active` are left untouched.
    ///
    /// # Errors
    /// - [`ServiceError::Validation`] for field-level failures.
    /// - [`ServiceError::NotFound`] if `id` does not exist.
    /// - [`ServiceError::DuplicateEmail`] if another row uses the new email.
    #[instrument(skip(self, input))]
    pub async fn update(&self, id: i64, input: &EmployeeInput) -> Result<Employee, ServiceError> {
        let changes = validation::validate(input, Utc::now().date_naive())?;

        if self.store.find_by_id(id).await?.is_none() {
            return Err(ServiceError::NotFound(id));
        }

        if self.store.exists_by_email_excluding(&changes.email, id).await? {
            return Err(ServiceError::DuplicateEmail(changes.email));
        }

        let row = self.store.update(id, &changes).await.map_err(|e| match e {
            DbError::UniqueViolation { .. } => ServiceError::DuplicateEmail(changes.email.clone()),
            DbError::NotFound => ServiceError::NotFound(id),
            other => other.into(),
        })?;

        info!(employee_id = id, "Updated employee");
        Ok(row.into())
    }

    /// Mark `id` inactive. The row stays in storage.
    #[instrument(skip(self))]
    pub async fn soft_delete(&self, id: i64) -> Result<(), ServiceError> {
        self.store.set_active(id, false).await.map_err(|e| match e {
            DbError::NotFound => ServiceError::NotFound(id),
            other => other.into(),
        })?;

        info!(employee_id = id, "Soft-deleted employee");
        Ok(())
    }

    /// Physically remove `id`. Returns whether a row was removed; a missing
    /// id is not an error.
    #[instrument(skip(self))]
    pub async fn hard_delete(&self, id: i64) -> Result<bool, ServiceError> {
        let removed = self.store.delete(id).await? > 0;
        if removed {
            warn!(employee_id = id, "Hard-deleted employee");
        }
        Ok(removed)
    }
}
