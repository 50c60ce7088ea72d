//! Error types for generated data access code

use thiserror::Error;

/// Errors raised while building a query from caller supplied options
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Unsupported operator '{operator}' for filter on column '{column}'")]
    UnsupportedOperator { column: String, operator: String },

    #[error("Filter on column '{column}' compares with NULL; no operator matches NULL")]
    NullValue { column: String },

    #[error("Invalid identifier: '{0}'")]
    InvalidIdentifier(String),

    #[error("Invalid order direction '{0}', expected 'asc' or 'desc'")]
    InvalidDirection(String),
}

/// Errors returned by generated `count`/`select`/`find`/`insert`/`update`/`delete`
#[derive(Error, Debug)]
pub enum Error {
    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Failed to decode column '{column}': {message}")]
    Decode { column: String, message: String },
}

impl Error {
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Decode {
            column: column.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
