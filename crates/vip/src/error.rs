use forum_sql::SqlStoreError;
use thiserror::Error;

/// Errors that end a reconciliation run.
#[derive(Debug, Error)]
pub enum Error<E>
where
    E: SqlStoreError,
{
    /// Reading candidates or statistics failed.
    #[error("failed to read from the forum database: {0}")]
    Query(#[source] E),

    /// Applying membership changes failed; nothing was committed.
    #[error("failed to apply membership changes, transaction rolled back: {0}")]
    Transaction(#[source] E),

    /// Thresholds or policy cannot be used.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A result row lacked an expected column or had the wrong type.
    #[error("result row is missing column `{0}`")]
    MissingColumn(&'static str),
}

/// Result of a reconciler operation over a store with error `E`.
pub type Result<T, E> = std::result::Result<T, Error<E>>;
