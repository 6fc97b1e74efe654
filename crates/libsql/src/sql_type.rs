use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};

/// Kind of statement, decided from its leading keyword.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum SqlType {
    /// `CREATE`, `ALTER` or `DROP`.
    Migration,
    /// Anything that is neither a migration nor a query.
    Mutation,
    /// `SELECT` or `WITH`.
    Query,
}

impl SqlType {
    /// Classifies `sql` by its first keyword.
    #[must_use]
    pub fn classify(sql: &str) -> Self {
        let sql = sql.trim_start().to_uppercase();

        if sql.starts_with("SELECT") || sql.starts_with("WITH") {
            Self::Query
        } else if sql.starts_with("CREATE") || sql.starts_with("ALTER") || sql.starts_with("DROP") {
            Self::Migration
        } else {
            Self::Mutation
        }
    }

    /// Fails with [`crate::Error::IncorrectSqlType`] unless `self` is `expected`.
    ///
    /// # Errors
    ///
    /// Returns an error when the statement kinds differ.
    pub fn ensure(self, expected: Self) -> Result<(), crate::Error> {
        if self == expected {
            Ok(())
        } else {
            Err(crate::Error::IncorrectSqlType(expected, self))
        }
    }
}

impl Display for SqlType {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Self::Migration => write!(f, "Migration"),
            Self::Mutation => write!(f, "Mutation"),
            Self::Query => write!(f, "Query"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(SqlType::classify("  select 1"), SqlType::Query);
        assert_eq!(
            SqlType::classify("WITH x AS (SELECT 1) SELECT * FROM x"),
            SqlType::Query
        );
        assert_eq!(
            SqlType::classify("CREATE TABLE t (id INTEGER)"),
            SqlType::Migration
        );
        assert_eq!(
            SqlType::classify("INSERT INTO t (id) VALUES (1)"),
            SqlType::Mutation
        );
        assert_eq!(
            SqlType::classify("DELETE FROM t WHERE id = 1"),
            SqlType::Mutation
        );
    }
}
