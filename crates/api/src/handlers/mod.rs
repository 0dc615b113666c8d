//! Request handlers for both HTTP surfaces.
//!
//! `employees` serves the JSON API under `/api`; `web` serves the HTML
//! pages. Both go through the same [`EmployeeService`].

pub mod employees;
pub mod web;

use service::EmployeeService;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub service: EmployeeService,
}

impl AppState {
    pub fn new(service: EmployeeService) -> Self {
        Self { service }
    }
}
