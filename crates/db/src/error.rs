//! Typed error type for the db crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("row not found")]
    NotFound,

    /// A `UNIQUE` constraint rejected the write.
    #[error("unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },
}

impl DbError {
    /// Postgres SQLSTATE for `unique_violation`.
    const UNIQUE_VIOLATION: &'static str = "23505";

    /// Classify a raw sqlx error, pulling unique violations out into their
    /// own variant so callers can map them to a domain conflict.
    pub fn classify(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.code().as_deref() == Some(Self::UNIQUE_VIOLATION) {
                return Self::UniqueViolation {
                    constraint: db_err.constraint().unwrap_or("unknown").to_string(),
                };
            }
        }
        Self::Sqlx(err)
    }
}
