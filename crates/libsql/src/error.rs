use crate::SqlType;

use std::path::PathBuf;

use forum_sql::SqlStoreError;
use thiserror::Error;

/// Errors that can occur in this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// The database file to open does not exist.
    #[error("database file {} does not exist", .0.display())]
    NotFound(PathBuf),

    /// Incorrect SQL type for request.
    #[error("Incorrect SQL type. Expected {0}, got {1}")]
    IncorrectSqlType(SqlType, SqlType),

    /// Libsql error.
    #[error(transparent)]
    Libsql(#[from] libsql::Error),

    /// The transaction was already committed or rolled back.
    #[error("Transaction already completed")]
    TransactionCompleted,
}

impl SqlStoreError for Error {}
