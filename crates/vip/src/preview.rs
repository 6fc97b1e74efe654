use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};

use crate::{Candidate, Thresholds};

/// Planned membership changes, for dry runs and verbose output.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Preview {
    /// Thresholds the candidates were selected with.
    pub thresholds: Thresholds,

    /// Users that would join the promotion group.
    pub promotions: Vec<Candidate>,

    /// Users that would leave the promotion group.
    pub demotions: Vec<Candidate>,
}

impl Preview {
    pub(crate) fn new(
        thresholds: Thresholds,
        promotions: &[Candidate],
        demotions: &[Candidate],
    ) -> Self {
        Self {
            thresholds,
            promotions: promotions.to_vec(),
            demotions: demotions.to_vec(),
        }
    }

    /// Returns `true` when there is nothing to promote or demote.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.promotions.is_empty() && self.demotions.is_empty()
    }
}

fn write_section(f: &mut Formatter, heading: &str, candidates: &[Candidate]) -> FmtResult {
    if candidates.is_empty() {
        return writeln!(f, "{heading}: none");
    }

    writeln!(f, "{heading}: {}", candidates.len())?;
    for candidate in candidates {
        writeln!(f, "  - {candidate}")?;
    }

    Ok(())
}

impl Display for Preview {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write_section(
            f,
            &format!(
                "Promote into group {} (balance >= {})",
                self.thresholds.promotion_group_id, self.thresholds.promotion_amount
            ),
            &self.promotions,
        )?;
        write_section(
            f,
            &format!(
                "Demote from group {} (balance < {})",
                self.thresholds.promotion_group_id, self.thresholds.demotion_amount
            ),
            &self.demotions,
        )
    }
}
