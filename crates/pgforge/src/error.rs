//! Error types for pgforge

use thiserror::Error;

/// Result type alias for pgforge operations
pub type SqlResult<T> = Result<T, SqlError>;

/// Error types for statement building and execution
#[derive(Debug, Error)]
pub enum SqlError {
    /// A set-at-most-once clause was set a second time
    #[error("Clause already set: {0}")]
    DuplicateClause(&'static str),

    /// A join alias collides with an existing table alias
    #[error("Duplicate table alias: {0}")]
    DuplicateAlias(String),

    /// A builder argument is outside its accepted domain
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A statement violates a structural rule (e.g. join sequencing)
    #[error("Structural error: {0}")]
    Structural(String),

    /// A fetch expected an exact row or column count and got another
    #[error("Cardinality error: expected {expected} row(s), got {got}")]
    Cardinality { expected: usize, got: usize },

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Query execution error
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),
}

impl SqlError {
    /// Create an invalid-argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Create a structural error
    pub fn structural(message: impl Into<String>) -> Self {
        Self::Structural(message.into())
    }

    /// Create a cardinality error
    pub fn cardinality(expected: usize, got: usize) -> Self {
        Self::Cardinality { expected, got }
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Check if this is a duplicate-clause error
    pub fn is_duplicate_clause(&self) -> bool {
        matches!(self, Self::DuplicateClause(_))
    }

    /// Check if this is a cardinality error
    pub fn is_cardinality(&self) -> bool {
        matches!(self, Self::Cardinality { .. })
    }
}
