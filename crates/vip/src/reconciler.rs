use forum_sql::{SqlConnection, SqlParam, SqlTransaction};
use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};
use crate::{
    AppliedChanges, Candidate, DemotionPolicy, Preview, RunMode, RunReport, Stats, Summary,
    Thresholds,
};

static FIND_PROMOTION_CANDIDATES_SQL: &str = include_str!("../sql/find_promotion_candidates.sql");
static FIND_DEMOTION_CANDIDATES_SQL: &str = include_str!("../sql/find_demotion_candidates.sql");
static INSERT_MEMBERSHIP_SQL: &str = include_str!("../sql/insert_membership.sql");
static DELETE_MEMBERSHIP_SQL: &str = include_str!("../sql/delete_membership.sql");
static STATS_SQL: &str = include_str!("../sql/stats.sql");

/// Keeps VIP group membership in line with user balances.
///
/// Each call reads the current state afresh; nothing is cached between calls.
#[derive(Clone, Debug)]
pub struct Reconciler<C: SqlConnection> {
    connection: C,
    thresholds: Thresholds,
    demotion_policy: DemotionPolicy,
}

impl<C: SqlConnection> Reconciler<C> {
    /// Creates a reconciler over `connection`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the thresholds are not finite, or if
    /// the move policy is used with identical promotion and demotion groups.
    pub fn new(
        connection: C,
        thresholds: Thresholds,
        demotion_policy: DemotionPolicy,
    ) -> Result<Self, C::Error> {
        thresholds
            .validate(demotion_policy)
            .map_err(Error::<C::Error>::InvalidConfig)?;

        if thresholds.is_inverted() {
            warn!(
                promotion_amount = thresholds.promotion_amount,
                demotion_amount = thresholds.demotion_amount,
                "demotion amount is above promotion amount; there is no hysteresis band"
            );
        }

        Ok(Self {
            connection,
            thresholds,
            demotion_policy,
        })
    }

    /// Users at or above the promotion amount who are not yet in the
    /// promotion group, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Query`] if the database cannot be read.
    pub async fn find_promotion_candidates(&self) -> Result<Vec<Candidate>, C::Error> {
        let candidates = self
            .find_candidates(
                FIND_PROMOTION_CANDIDATES_SQL,
                self.thresholds.promotion_amount,
            )
            .await?;

        for candidate in &candidates {
            debug!(%candidate, "promotion candidate");
        }

        Ok(candidates)
    }

    /// Promotion group members below the demotion amount or without a
    /// balance, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Query`] if the database cannot be read.
    pub async fn find_demotion_candidates(&self) -> Result<Vec<Candidate>, C::Error> {
        let candidates = self
            .find_candidates(
                FIND_DEMOTION_CANDIDATES_SQL,
                self.thresholds.demotion_amount,
            )
            .await?;

        for candidate in &candidates {
            debug!(%candidate, "demotion candidate");
        }

        Ok(candidates)
    }

    async fn find_candidates(&self, query: &str, amount: f64) -> Result<Vec<Candidate>, C::Error> {
        let rows = self
            .connection
            .query(
                query,
                vec![
                    SqlParam::Integer(self.thresholds.promotion_group_id),
                    SqlParam::Real(amount),
                ],
            )
            .await
            .map_err(Error::Query)?;

        rows.iter()
            .map(|row| Candidate::from_row::<C::Error>(&row))
            .collect()
    }

    /// Applies promotions then demotions in a single transaction.
    ///
    /// Inserts are skipped for rows that already exist and deletes only touch
    /// existing rows, so the returned counts are rows actually changed and a
    /// stale candidate list is harmless.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transaction`] if any statement fails. The transaction
    /// is rolled back first, so no change from this call persists.
    pub async fn apply(
        &self,
        promotions: &[Candidate],
        demotions: &[Candidate],
    ) -> Result<AppliedChanges, C::Error> {
        let tx = self
            .connection
            .begin_transaction()
            .await
            .map_err(Error::Transaction)?;

        match self.apply_in(&tx, promotions, demotions).await {
            Ok(changes) => {
                tx.commit().await.map_err(Error::Transaction)?;

                info!(
                    promoted = changes.promoted,
                    demoted = changes.demoted,
                    moved = changes.moved,
                    "membership changes committed"
                );

                Ok(changes)
            }
            Err(e) => {
                error!(error = %e, "applying membership changes failed, rolling back");

                if let Err(rollback_error) = tx.rollback().await {
                    warn!(error = %rollback_error, "rollback failed");
                }

                Err(Error::Transaction(e))
            }
        }
    }

    async fn apply_in(
        &self,
        tx: &C::Transaction,
        promotions: &[Candidate],
        demotions: &[Candidate],
    ) -> std::result::Result<AppliedChanges, C::Error> {
        let Thresholds {
            promotion_group_id,
            demotion_group_id,
            ..
        } = self.thresholds;
        let moving = self.demotion_policy == DemotionPolicy::Move;
        let mut changes = AppliedChanges::default();

        for candidate in promotions {
            let inserted =
                membership(tx, INSERT_MEMBERSHIP_SQL, candidate, promotion_group_id).await?;
            changes.promoted += inserted;

            if moving && inserted > 0 {
                changes.moved +=
                    membership(tx, DELETE_MEMBERSHIP_SQL, candidate, demotion_group_id).await?;
            }

            if inserted == 0 {
                debug!(%candidate, "already promoted");
            }
        }

        for candidate in demotions {
            let deleted =
                membership(tx, DELETE_MEMBERSHIP_SQL, candidate, promotion_group_id).await?;
            changes.demoted += deleted;

            if moving && deleted > 0 {
                changes.moved +=
                    membership(tx, INSERT_MEMBERSHIP_SQL, candidate, demotion_group_id).await?;
            }

            if deleted == 0 {
                debug!(%candidate, "already demoted");
            }
        }

        Ok(changes)
    }

    /// Planned changes as a printable value. Touches nothing.
    #[must_use]
    pub fn preview(&self, promotions: &[Candidate], demotions: &[Candidate]) -> Preview {
        Preview::new(self.thresholds, promotions, demotions)
    }

    /// Counts users relative to the thresholds. Read only.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Query`] if the database cannot be read.
    pub async fn stats(&self) -> Result<Stats, C::Error> {
        let rows = self
            .connection
            .query(
                STATS_SQL,
                vec![
                    SqlParam::Integer(self.thresholds.promotion_group_id),
                    SqlParam::Real(self.thresholds.promotion_amount),
                    SqlParam::Real(self.thresholds.demotion_amount),
                ],
            )
            .await
            .map_err(Error::Query)?;

        let row = rows
            .row(0)
            .ok_or(Error::<C::Error>::MissingColumn("total_users"))?;

        Stats::from_row::<C::Error>(&row)
    }

    /// One full pass in the given mode.
    ///
    /// `verbose` attaches the preview to applied runs; dry runs always carry it.
    ///
    /// # Errors
    ///
    /// Propagates the first query or transaction error.
    pub async fn run(&self, mode: RunMode, verbose: bool) -> Result<RunReport, C::Error> {
        info!(
            ?mode,
            promotion_group_id = self.thresholds.promotion_group_id,
            promotion_amount = self.thresholds.promotion_amount,
            demotion_amount = self.thresholds.demotion_amount,
            demotion_policy = %self.demotion_policy,
            "starting VIP reconciliation"
        );

        if mode == RunMode::Stats {
            return Ok(RunReport::Stats(self.stats().await?));
        }

        let promotions = self.find_promotion_candidates().await?;
        let demotions = self.find_demotion_candidates().await?;

        info!(
            promotions = promotions.len(),
            demotions = demotions.len(),
            "computed candidates"
        );

        let preview = self.preview(&promotions, &demotions);

        if mode == RunMode::DryRun {
            return Ok(RunReport::Reconciliation {
                summary: Summary::from_preview(&preview),
                preview: Some(preview),
            });
        }

        let changes = if preview.is_empty() {
            info!("no changes needed");
            AppliedChanges::default()
        } else {
            self.apply(&promotions, &demotions).await?
        };

        Ok(RunReport::Reconciliation {
            summary: Summary::from_changes(changes),
            preview: verbose.then_some(preview),
        })
    }
}

async fn membership<T: SqlTransaction>(
    tx: &T,
    statement: &str,
    candidate: &Candidate,
    group_id: i64,
) -> std::result::Result<u64, T::Error> {
    tx.execute(
        statement,
        vec![
            SqlParam::Integer(candidate.user_id),
            SqlParam::Integer(group_id),
        ],
    )
    .await
}
