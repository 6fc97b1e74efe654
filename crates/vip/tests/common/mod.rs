#![allow(dead_code)]

use std::path::Path;

use forum_libsql::Database;
use forum_sql::{SqlConnection, SqlParam};
use forum_vip::{DemotionPolicy, Reconciler, Thresholds};

pub const VIP: i64 = 4;
pub const MEMBER: i64 = 3;

pub struct Forum {
    pub db: Database,
}

impl Forum {
    pub async fn in_memory() -> Self {
        Self::open(":memory:").await
    }

    pub async fn open(path: impl AsRef<Path> + Send) -> Self {
        let db = Database::connect(path).await.unwrap();

        db.migrate(
            "CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY,
                username TEXT NOT NULL,
                balance NUMERIC
            )",
        )
        .await
        .unwrap();
        db.migrate(
            "CREATE TABLE IF NOT EXISTS group_user (
                user_id INTEGER NOT NULL,
                group_id INTEGER NOT NULL,
                PRIMARY KEY (user_id, group_id)
            )",
        )
        .await
        .unwrap();

        Self { db }
    }

    pub async fn user(&self, id: i64, username: &str, balance: Option<f64>) -> &Self {
        self.db
            .execute(
                "INSERT INTO users (id, username, balance) VALUES (?1, ?2, ?3)",
                vec![
                    SqlParam::Integer(id),
                    SqlParam::Text(username.to_string()),
                    balance.into(),
                ],
            )
            .await
            .unwrap();
        self
    }

    pub async fn join(&self, user_id: i64, group_id: i64) -> &Self {
        self.db
            .execute(
                "INSERT INTO group_user (user_id, group_id) VALUES (?1, ?2)",
                vec![SqlParam::Integer(user_id), SqlParam::Integer(group_id)],
            )
            .await
            .unwrap();
        self
    }

    pub async fn set_balance(&self, user_id: i64, balance: Option<f64>) {
        self.db
            .execute(
                "UPDATE users SET balance = ?2 WHERE id = ?1",
                vec![SqlParam::Integer(user_id), balance.into()],
            )
            .await
            .unwrap();
    }

    pub async fn members(&self, group_id: i64) -> Vec<i64> {
        self.db
            .query(
                "SELECT user_id FROM group_user WHERE group_id = ?1 ORDER BY user_id",
                vec![SqlParam::Integer(group_id)],
            )
            .await
            .unwrap()
            .iter()
            .filter_map(|row| row.get_integer_by_name("user_id"))
            .collect()
    }

    pub fn reconciler(&self) -> Reconciler<Database> {
        self.reconciler_with(Thresholds::default(), DemotionPolicy::Remove)
    }

    pub fn reconciler_with(
        &self,
        thresholds: Thresholds,
        policy: DemotionPolicy,
    ) -> Reconciler<Database> {
        Reconciler::new(self.db.clone(), thresholds, policy).unwrap()
    }
}

pub fn ids(candidates: &[forum_vip::Candidate]) -> Vec<i64> {
    candidates.iter().map(|c| c.user_id).collect()
}
