use thiserror::Error;

/// Errors that can occur when writing to or reading from the analytics store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Creating a table or one of its indexes failed.
    #[error("Schema error on table {table}: {source}")]
    Schema {
        table: &'static str,
        #[source]
        source: sqlx::Error,
    },
}

/// Result type for analytics store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
