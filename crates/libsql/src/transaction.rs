//! Transaction wrapper for libsql.

use std::sync::Arc;

use async_trait::async_trait;
use forum_sql::{SqlParam, SqlTransaction};
use tokio::sync::Mutex;
use tracing::debug;

use crate::{Error, SqlType, conversion::convert_params};

/// A wrapper around libsql transaction that provides our SQL interface.
pub struct Transaction {
    /// The underlying libsql transaction, taken on commit or rollback
    inner: Arc<Mutex<Option<libsql::Transaction>>>,
}

impl Transaction {
    /// Create a new transaction wrapper.
    pub(crate) fn new(tx: libsql::Transaction) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Some(tx))),
        }
    }
}

#[async_trait]
impl SqlTransaction for Transaction {
    type Error = Error;

    /// Execute a SQL statement within the transaction.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The statement is not a mutation
    /// - The transaction has already been committed or rolled back
    /// - The SQL execution fails
    async fn execute<Q: Into<String> + Send>(
        &self,
        query: Q,
        params: Vec<SqlParam>,
    ) -> Result<u64, Error> {
        let query = query.into();
        SqlType::classify(&query).ensure(SqlType::Mutation)?;

        let mut inner = self.inner.lock().await;
        if let Some(tx) = inner.as_mut() {
            Ok(tx.execute(&query, convert_params(params)).await?)
        } else {
            Err(Error::TransactionCompleted)
        }
    }

    /// Commit the transaction.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The transaction has already been committed or rolled back
    /// - The commit operation fails
    async fn commit(self) -> Result<(), Error> {
        let mut inner = self.inner.lock().await;
        if let Some(tx) = inner.take() {
            tx.commit().await?;
            debug!("transaction committed");
            Ok(())
        } else {
            Err(Error::TransactionCompleted)
        }
    }

    /// Rollback the transaction.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The transaction has already been committed or rolled back
    /// - The rollback operation fails
    async fn rollback(self) -> Result<(), Error> {
        let mut inner = self.inner.lock().await;
        if let Some(tx) = inner.take() {
            tx.rollback().await?;
            debug!("transaction rolled back");
            Ok(())
        } else {
            Err(Error::TransactionCompleted)
        }
    }
}
