//! Balance-driven VIP group maintenance for forum databases.
//!
//! Users whose balance reaches the promotion amount are added to the
//! promotion group; members whose balance drops below the demotion amount,
//! or who have no balance at all, are removed from it. Balances between the
//! two amounts leave membership untouched.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod candidate;
mod config;
mod error;
mod preview;
mod reconciler;
mod report;
mod stats;

pub use candidate::Candidate;
pub use config::{DemotionPolicy, Thresholds};
pub use error::{Error, Result};
pub use preview::Preview;
pub use reconciler::Reconciler;
pub use report::{AppliedChanges, RunMode, RunReport, Summary};
pub use stats::Stats;
