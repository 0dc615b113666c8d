//! `db` crate: pure persistence layer.
//!
//! Provides a connection pool, the `employees` row struct, paging/sorting
//! primitives, repository functions and the idempotent schema bootstrap.
//! No business logic lives here.

pub mod error;
pub mod models;
pub mod paging;
pub mod pool;
pub mod repository;
pub mod schema;

pub use error::DbError;
pub use models::{EmployeeChanges, EmployeeRow};
pub use paging::{Page, PageRequest, Sort, SortDirection, SortField};
pub use pool::DbPool;
