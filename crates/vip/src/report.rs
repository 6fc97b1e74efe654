use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};

use crate::{Preview, Stats};

/// What a run does after reading the database.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunMode {
    /// Report aggregates only.
    Stats,

    /// Compute and report candidates without writing.
    DryRun,

    /// Compute candidates and apply them in one transaction.
    #[default]
    Apply,
}

/// Rows changed by [`crate::Reconciler::apply`].
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct AppliedChanges {
    /// Promotion group rows inserted.
    pub promoted: u64,

    /// Promotion group rows deleted.
    pub demoted: u64,

    /// Demotion group rows inserted or deleted under the move policy.
    pub moved: u64,
}

impl AppliedChanges {
    /// Returns `true` when no row was changed.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.promoted == 0 && self.demoted == 0 && self.moved == 0
    }
}

/// Machine-readable outcome of a reconciliation run.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Users promoted, or promotion candidates on a dry run.
    pub promoted: u64,

    /// Users demoted, or demotion candidates on a dry run.
    pub demoted: u64,

    /// Demotion group rows changed under the move policy.
    pub moved: u64,

    /// `false` for dry runs, where the counts are candidate counts.
    pub applied: bool,

    /// Messages of the errors that ended the run.
    pub errors: Vec<String>,
}

impl Summary {
    pub(crate) const fn from_changes(changes: AppliedChanges) -> Self {
        Self {
            promoted: changes.promoted,
            demoted: changes.demoted,
            moved: changes.moved,
            applied: true,
            errors: Vec::new(),
        }
    }

    pub(crate) fn from_preview(preview: &Preview) -> Self {
        Self {
            promoted: preview.promotions.len() as u64,
            demoted: preview.demotions.len() as u64,
            moved: 0,
            applied: false,
            errors: Vec::new(),
        }
    }

    /// Summary for a run that stopped on `error`.
    #[must_use]
    pub fn failed(error: impl Display) -> Self {
        Self {
            errors: vec![error.to_string()],
            ..Self::default()
        }
    }
}

impl Display for Summary {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        if !self.errors.is_empty() {
            return write!(f, "Failed: {}", self.errors.join("; "));
        }

        if self.promoted == 0 && self.demoted == 0 {
            return write!(f, "No changes needed.");
        }

        if self.applied {
            write!(
                f,
                "Promoted {} user(s), demoted {} user(s).",
                self.promoted, self.demoted
            )
        } else {
            write!(
                f,
                "Dry run: {} user(s) would be promoted, {} user(s) would be demoted.",
                self.promoted, self.demoted
            )
        }
    }
}

/// Everything a run produced, ready for printing or serializing.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RunReport {
    /// Output of [`RunMode::Stats`].
    Stats(Stats),

    /// Output of [`RunMode::DryRun`] and [`RunMode::Apply`].
    Reconciliation {
        /// Counts for the run.
        #[serde(flatten)]
        summary: Summary,

        /// Planned changes, present on dry runs and verbose runs.
        #[serde(skip_serializing_if = "Option::is_none")]
        preview: Option<Preview>,
    },
}

impl RunReport {
    /// The reconciliation summary, or `None` for stats runs.
    #[must_use]
    pub const fn summary(&self) -> Option<&Summary> {
        match self {
            Self::Stats(_) => None,
            Self::Reconciliation { summary, .. } => Some(summary),
        }
    }
}

impl Display for RunReport {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Self::Stats(stats) => write!(f, "{stats}"),
            Self::Reconciliation { summary, preview } => {
                if let Some(preview) = preview {
                    write!(f, "{preview}")?;
                }
                write!(f, "{summary}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_messages() {
        assert_eq!(Summary::default().to_string(), "No changes needed.");

        let applied = Summary::from_changes(AppliedChanges {
            promoted: 2,
            demoted: 1,
            moved: 0,
        });
        assert_eq!(applied.to_string(), "Promoted 2 user(s), demoted 1 user(s).");

        let failed = Summary::failed("database is locked");
        assert_eq!(failed.to_string(), "Failed: database is locked");
    }

    #[test]
    fn test_reconciliation_serializes_flat() {
        let report = RunReport::Reconciliation {
            summary: Summary::from_changes(AppliedChanges {
                promoted: 1,
                demoted: 1,
                moved: 0,
            }),
            preview: None,
        };

        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "promoted": 1,
                "demoted": 1,
                "moved": 0,
                "applied": true,
                "errors": [],
            })
        );
    }
}
