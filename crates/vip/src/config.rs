use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Group identifiers and balance thresholds for one run.
///
/// `demotion_amount <= promotion_amount` is expected but not enforced; the
/// interval between the two is the hysteresis band where nothing changes.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct Thresholds {
    /// Group whose membership marks a user as VIP.
    pub promotion_group_id: i64,

    /// Group demoted users are moved into under [`DemotionPolicy::Move`].
    pub demotion_group_id: i64,

    /// Balance at or above which a user is promoted.
    pub promotion_amount: f64,

    /// Balance strictly below which a user is demoted.
    pub demotion_amount: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            promotion_group_id: 4,
            demotion_group_id: 3,
            promotion_amount: 500.0,
            demotion_amount: 100.0,
        }
    }
}

impl Thresholds {
    /// Returns `true` when the demotion threshold is above the promotion
    /// threshold, which collapses the hysteresis band.
    #[must_use]
    pub fn is_inverted(&self) -> bool {
        self.demotion_amount > self.promotion_amount
    }

    pub(crate) fn validate(&self, policy: DemotionPolicy) -> Result<(), String> {
        if !self.promotion_amount.is_finite() {
            return Err(format!(
                "promotion amount must be a finite number, got {}",
                self.promotion_amount
            ));
        }

        if !self.demotion_amount.is_finite() {
            return Err(format!(
                "demotion amount must be a finite number, got {}",
                self.demotion_amount
            ));
        }

        if policy == DemotionPolicy::Move && self.promotion_group_id == self.demotion_group_id {
            return Err(format!(
                "demotion group must differ from promotion group {} when moving demoted users",
                self.promotion_group_id
            ));
        }

        Ok(())
    }
}

/// What happens to a demoted user's group memberships.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DemotionPolicy {
    /// Only the promotion group row is deleted.
    #[default]
    Remove,

    /// The promotion group row is swapped for a demotion group row, and
    /// promoted users leave the demotion group.
    Move,
}

impl Display for DemotionPolicy {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Self::Remove => write!(f, "remove"),
            Self::Move => write!(f, "move"),
        }
    }
}

impl FromStr for DemotionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "remove" => Ok(Self::Remove),
            "move" => Ok(Self::Move),
            other => Err(format!(
                "unknown demotion policy `{other}`, expected `remove` or `move`"
            )),
        }
    }
}
