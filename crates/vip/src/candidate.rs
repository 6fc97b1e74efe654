use std::fmt::{Display, Formatter, Result as FmtResult};

use forum_sql::{Row, SqlStoreError};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A user whose balance and membership make them eligible for a change.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Candidate {
    /// `users.id`.
    pub user_id: i64,

    /// `users.username`.
    pub username: String,

    /// `None` when the user has no recorded balance.
    pub balance: Option<f64>,
}

impl Candidate {
    pub(crate) fn from_row<E: SqlStoreError>(row: &Row<'_>) -> Result<Self, E> {
        let user_id = row
            .get_integer_by_name("id")
            .ok_or(Error::<E>::MissingColumn("id"))?;
        let username = row
            .get_text_by_name("username")
            .ok_or(Error::<E>::MissingColumn("username"))?
            .to_string();
        let balance = row
            .get_real_by_name("balance")
            .ok_or(Error::<E>::MissingColumn("balance"))?;

        Ok(Self {
            user_id,
            username,
            balance,
        })
    }
}

impl Display for Candidate {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self.balance {
            Some(balance) => write!(f, "{} (#{}, balance: {balance})", self.username, self.user_id),
            None => write!(f, "{} (#{}, no balance)", self.username, self.user_id),
        }
    }
}
