//! `MemoryStore`: an in-memory test double for `EmployeeStore`.
//!
//! Mirrors the Postgres semantics the service relies on: auto-assigned ids,
//! the unique email index, active-only listings with a stable `id`
//! tie-breaker, and case-insensitive substring search.

use std::cmp::Ordering;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use db::{
    repository::employees::ActiveFilter, DbError, EmployeeChanges, EmployeeRow, Page,
    PageRequest, SortDirection, SortField,
};

use crate::store::EmployeeStore;

#[derive(Debug, Default)]
struct State {
    rows: Vec<EmployeeRow>,
    next_id: i64,
    last_timestamp: Option<DateTime<Utc>>,
}

impl State {
    /// Strictly increasing timestamps so `created_at` ordering is deterministic.
    fn tick(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let ts = match self.last_timestamp {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_timestamp = Some(ts);
        ts
    }

    fn email_taken(&self, email: &str, excluding: Option<i64>) -> bool {
        self.rows
            .iter()
            .any(|r| r.email.eq_ignore_ascii_case(email) && Some(r.id) != excluding)
    }
}

/// A store that keeps every row in a `Vec` behind a mutex.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail as if the database were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, AtomicOrdering::SeqCst);
    }

    /// Snapshot of every stored row, soft-deleted ones included.
    pub fn rows(&self) -> Vec<EmployeeRow> {
        self.state.lock().unwrap().rows.clone()
    }

    fn check(&self) -> Result<(), DbError> {
        if self.unavailable.load(AtomicOrdering::SeqCst) {
            return Err(DbError::Sqlx(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

fn matches(row: &EmployeeRow, filter: ActiveFilter<'_>) -> bool {
    if !row.is_active {
        return false;
    }
    match filter {
        ActiveFilter::All => true,
        ActiveFilter::Department(department) => row.department == department,
        ActiveFilter::Search(term) => {
            let term = term.to_lowercase();
            [&row.first_name, &row.last_name, &row.email, &row.department, &row.position]
                .iter()
                .any(|value| value.to_lowercase().contains(&term))
        }
    }
}

/// Postgres orders NULL above every value: last ascending, first descending.
fn nulls_last<T: Ord>(a: Option<T>, b: Option<T>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(x), Some(y)) => x.cmp(&y),
    }
}

fn compare(a: &EmployeeRow, b: &EmployeeRow, field: SortField) -> Ordering {
    match field {
        SortField::Id         => a.id.cmp(&b.id),
        SortField::FirstName  => a.first_name.cmp(&b.first_name),
        SortField::LastName   => a.last_name.cmp(&b.last_name),
        SortField::Email      => a.email.cmp(&b.email),
        SortField::Department => a.department.cmp(&b.department),
        SortField::Position   => a.position.cmp(&b.position),
        SortField::HireDate   => a.hire_date.cmp(&b.hire_date),
        SortField::Salary     => nulls_last(a.salary, b.salary),
        SortField::IsActive   => a.is_active.cmp(&b.is_active),
        SortField::CreatedAt  => a.created_at.cmp(&b.created_at),
        SortField::UpdatedAt  => a.updated_at.cmp(&b.updated_at),
    }
}

fn unique_violation() -> DbError {
    DbError::UniqueViolation { constraint: "idx_employees_email".into() }
}

#[async_trait]
impl EmployeeStore for MemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<EmployeeRow>, DbError> {
        self.check()?;
        let state = self.state.lock().unwrap();
        Ok(state.rows.iter().find(|r| r.id == id).cloned())
    }

    async fn find_active_page(
        &self,
        filter: ActiveFilter<'_>,
        request: &PageRequest,
    ) -> Result<Page<EmployeeRow>, DbError> {
        self.check()?;
        let state = self.state.lock().unwrap();

        let mut selected: Vec<EmployeeRow> =
            state.rows.iter().filter(|r| matches(r, filter)).cloned().collect();
        selected.sort_by(|a, b| {
            let ord = compare(a, b, request.sort.field);
            let ord = match request.sort.direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            };
            ord.then(a.id.cmp(&b.id))
        });

        let total = selected.len() as i64;
        let items = selected
            .into_iter()
            .skip(request.offset() as usize)
            .take(request.limit() as usize)
            .collect();

        Ok(Page::new(items, request, total))
    }

    async fn count_active(&self) -> Result<i64, DbError> {
        self.check()?;
        let state = self.state.lock().unwrap();
        Ok(state.rows.iter().filter(|r| r.is_active).count() as i64)
    }

    async fn count_all(&self) -> Result<i64, DbError> {
        self.check()?;
        Ok(self.state.lock().unwrap().rows.len() as i64)
    }

    async fn count_by_department(&self) -> Result<Vec<(String, i64)>, DbError> {
        self.check()?;
        let state = self.state.lock().unwrap();
        let mut counts = std::collections::BTreeMap::<String, i64>::new();
        for row in state.rows.iter().filter(|r| r.is_active) {
            *counts.entry(row.department.clone()).or_default() += 1;
        }
        Ok(counts.into_iter().collect())
    }

    async fn departments(&self) -> Result<Vec<String>, DbError> {
        Ok(self.count_by_department().await?.into_iter().map(|(d, _)| d).collect())
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, DbError> {
        self.check()?;
        Ok(self.state.lock().unwrap().email_taken(email, None))
    }

    async fn exists_by_email_excluding(&self, email: &str, id: i64) -> Result<bool, DbError> {
        self.check()?;
        Ok(self.state.lock().unwrap().email_taken(email, Some(id)))
    }

    async fn insert(&self, changes: &EmployeeChanges) -> Result<EmployeeRow, DbError> {
        self.check()?;
        let mut state = self.state.lock().unwrap();
        if state.email_taken(&changes.email, None) {
            return Err(unique_violation());
        }

        state.next_id += 1;
        let now = state.tick();
        let row = EmployeeRow {
            id: state.next_id,
            first_name: changes.first_name.clone(),
            last_name: changes.last_name.clone(),
            email: changes.email.clone(),
            department: changes.department.clone(),
            position: changes.position.clone(),
            hire_date: changes.hire_date,
            salary: changes.salary,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        state.rows.push(row.clone());
        Ok(row)
    }

    async fn update(&self, id: i64, changes: &EmployeeChanges) -> Result<EmployeeRow, DbError> {
        self.check()?;
        let mut state = self.state.lock().unwrap();
        if state.email_taken(&changes.email, Some(id)) {
            return Err(unique_violation());
        }

        let now = state.tick();
        let row = state.rows.iter_mut().find(|r| r.id == id).ok_or(DbError::NotFound)?;
        row.first_name = changes.first_name.clone();
        row.last_name = changes.last_name.clone();
        row.email = changes.email.clone();
        row.department = changes.department.clone();
        row.position = changes.position.clone();
        row.hire_date = changes.hire_date;
        row.salary = changes.salary;
        row.updated_at = now;
        Ok(row.clone())
    }

    async fn set_active(&self, id: i64, active: bool) -> Result<(), DbError> {
        self.check()?;
        let mut state = self.state.lock().unwrap();
        let now = state.tick();
        let row = state.rows.iter_mut().find(|r| r.id == id).ok_or(DbError::NotFound)?;
        row.is_active = active;
        row.updated_at = now;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<u64, DbError> {
        self.check()?;
        let mut state = self.state.lock().unwrap();
        let before = state.rows.len();
        state.rows.retain(|r| r.id != id);
        Ok((before - state.rows.len()) as u64)
    }
}
