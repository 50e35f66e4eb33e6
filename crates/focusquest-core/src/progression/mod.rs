//! Experience points, levels and titles.

mod curve;
mod ledger;

pub use curve::{title_for_level, LevelCurve, MAX_LEVEL, MAX_XP};
pub use ledger::{LevelUpResult, ProgressionLedger, UserProgress};
