//! Storage-agnostic SQL interfaces shared by the forum maintenance jobs.
mod rows;
mod sql_param;

pub use rows::{Row, Rows};
pub use sql_param::SqlParam;

use async_trait::async_trait;
use std::error::Error;
use std::fmt::Debug;

/// Marker trait for SQL store errors
pub trait SqlStoreError: Debug + Error + Send + Sync + 'static {}

#[async_trait]
pub trait SqlConnection: Clone + Send + Sync + 'static {
    type Error: SqlStoreError;
    type Transaction: SqlTransaction<Error = Self::Error>;

    /// Execute a SQL statement that modifies data
    async fn execute<Q: Into<String> + Send>(
        &self,
        query: Q,
        params: Vec<SqlParam>,
    ) -> Result<u64, Self::Error>;

    /// Execute a SQL statement that modifies schema
    async fn migrate<Q: Into<String> + Send>(&self, query: Q) -> Result<(), Self::Error>;

    /// Execute a SQL query that returns data
    async fn query<Q: Into<String> + Send>(
        &self,
        query: Q,
        params: Vec<SqlParam>,
    ) -> Result<Rows, Self::Error>;

    /// Open a transaction on this connection
    async fn begin_transaction(&self) -> Result<Self::Transaction, Self::Error>;
}

#[async_trait]
pub trait SqlTransaction: Send + Sync + 'static {
    type Error: SqlStoreError;

    /// Execute a SQL statement that modifies data inside the transaction
    async fn execute<Q: Into<String> + Send>(
        &self,
        query: Q,
        params: Vec<SqlParam>,
    ) -> Result<u64, Self::Error>;

    async fn commit(self) -> Result<(), Self::Error>;

    async fn rollback(self) -> Result<(), Self::Error>;
}
