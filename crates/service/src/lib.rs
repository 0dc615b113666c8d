//! `service` crate: employee domain model, validation and the service layer.
//!
//! The [`EmployeeService`] orchestrates an [`EmployeeStore`]: it validates
//! input, enforces email uniqueness, performs soft deletes and assembles
//! statistics. Both HTTP surfaces in the `api` crate call into it.

pub mod bootstrap;
pub mod employees;
pub mod error;
pub mod mock;
pub mod models;
pub mod store;
pub mod validation;

pub use employees::EmployeeService;
pub use error::{FieldError, ServiceError, ValidationErrors};
pub use models::{Employee, EmployeeFilter, EmployeeInput, Statistics};
pub use store::{EmployeeStore, PgEmployeeStore};
