//! Request and response shapes of the JSON surface.
//!
//! The HTML surface reuses [`ListParams`] so both read the same query
//! string keys and defaults.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use db::{Page, PageRequest, Sort, SortDirection, SortField};
use service::{Employee, EmployeeFilter, ValidationErrors};

// ---------------------------------------------------------------------------
// Employee
// ---------------------------------------------------------------------------

/// Wire form of an employee: camelCase plus the derived `fullName`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeDto {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub email: String,
    pub department: String,
    pub position: String,
    pub hire_date: NaiveDate,
    pub salary: Option<Decimal>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Employee> for EmployeeDto {
    fn from(e: Employee) -> Self {
        Self {
            full_name: e.full_name(),
            id: e.id,
            first_name: e.first_name,
            last_name: e.last_name,
            email: e.email,
            department: e.department,
            position: e.position,
            hire_date: e.hire_date,
            salary: e.salary,
            is_active: e.is_active,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeListResponse {
    pub employees: Vec<EmployeeDto>,
    pub page: u32,
    pub size: u32,
    pub total_items: i64,
    pub total_pages: i64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl From<Page<Employee>> for EmployeeListResponse {
    fn from(page: Page<Employee>) -> Self {
        Self {
            total_pages: page.total_pages(),
            has_next: page.has_next(),
            has_previous: page.has_previous(),
            page: page.page,
            size: page.size,
            total_items: page.total_items,
            employees: page.items.into_iter().map(EmployeeDto::from).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Listing parameters
// ---------------------------------------------------------------------------

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Query string of every listing endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub sort_by: Option<String>,
    pub sort_direction: Option<String>,
    pub search: Option<String>,
    pub department: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl ListParams {
    /// Resolve paging and sorting, applying defaults for absent values.
    ///
    /// # Errors
    /// An unknown `sortBy` or `sortDirection`, or a `size` outside
    /// `1..=100`, is reported against that parameter.
    pub fn page_request(&self) -> Result<PageRequest, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let field = match non_blank(&self.sort_by) {
            None => SortField::Id,
            Some(raw) => raw.parse::<SortField>().unwrap_or_else(|e| {
                errors.push("sortBy", e);
                SortField::Id
            }),
        };
        let direction = match non_blank(&self.sort_direction) {
            None => SortDirection::Asc,
            Some(raw) => raw.parse::<SortDirection>().unwrap_or_else(|e| {
                errors.push("sortDirection", e);
                SortDirection::Asc
            }),
        };

        let sort = Sort { field, direction };
        let size = self.size.unwrap_or(DEFAULT_PAGE_SIZE);
        match PageRequest::new(self.page.unwrap_or(0), size, sort) {
            Ok(request) if errors.is_empty() => Ok(request),
            Ok(_) => Err(errors),
            Err(e) => {
                errors.push("size", e);
                Err(errors)
            }
        }
    }

    pub fn filter(&self) -> EmployeeFilter {
        EmployeeFilter { search: self.search.clone(), department: self.department.clone() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_nothing_is_given() {
        let request = ListParams::default().page_request().unwrap();
        assert_eq!(request, PageRequest::default());
    }

    #[test]
    fn sort_parameters_are_parsed() {
        let params = ListParams {
            sort_by: Some("lastName".into()),
            sort_direction: Some("DESC".into()),
            page: Some(2),
            size: Some(25),
            ..Default::default()
        };
        let request = params.page_request().unwrap();
        assert_eq!(request.sort, Sort { field: SortField::LastName, direction: SortDirection::Desc });
        assert_eq!(request.offset(), 50);
    }

    #[test]
    fn every_bad_parameter_is_reported() {
        let params = ListParams {
            sort_by: Some("password".into()),
            sort_direction: Some("sideways".into()),
            size: Some(0),
            ..Default::default()
        };
        let errors = params.page_request().unwrap_err();
        assert!(errors.has_field("sortBy"));
        assert!(errors.has_field("sortDirection"));
        assert!(errors.has_field("size"));
    }

    #[test]
    fn list_response_carries_paging_metadata() {
        let page: Page<Employee> = Page {
            items: Vec::new(),
            page: 1,
            size: 10,
            total_items: 21,
        };
        let body = EmployeeListResponse::from(page);
        assert_eq!(body.total_pages, 3);
        assert!(body.has_next);
        assert!(body.has_previous);
    }
}
