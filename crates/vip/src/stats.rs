use std::fmt::{Display, Formatter, Result as FmtResult};

use forum_sql::{Row, SqlStoreError};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Aggregate view of users relative to the thresholds.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Stats {
    /// Rows in `users`.
    pub total_users: u64,

    /// Members of the promotion group.
    pub group_size: u64,

    /// Users with a balance at or above the promotion amount.
    pub at_or_above_promotion: u64,

    /// Users below the demotion amount, including those without a balance.
    pub below_demotion: u64,

    /// Users inside the hysteresis band.
    pub in_band: u64,

    /// Users with a NULL balance.
    pub without_balance: u64,
}

impl Stats {
    pub(crate) fn from_row<E: SqlStoreError>(row: &Row<'_>) -> Result<Self, E> {
        let count = |name: &'static str| {
            row.get_integer_by_name(name)
                .and_then(|value| u64::try_from(value).ok())
                .ok_or(Error::<E>::MissingColumn(name))
        };

        Ok(Self {
            total_users: count("total_users")?,
            group_size: count("group_size")?,
            at_or_above_promotion: count("at_or_above_promotion")?,
            below_demotion: count("below_demotion")?,
            in_band: count("in_band")?,
            without_balance: count("without_balance")?,
        })
    }
}

impl Display for Stats {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        writeln!(f, "Total users:                {}", self.total_users)?;
        writeln!(f, "Current group members:      {}", self.group_size)?;
        writeln!(f, "At or above promotion:      {}", self.at_or_above_promotion)?;
        writeln!(f, "Below demotion:             {}", self.below_demotion)?;
        writeln!(f, "Between thresholds:         {}", self.in_band)?;
        writeln!(f, "Without a balance:          {}", self.without_balance)
    }
}
