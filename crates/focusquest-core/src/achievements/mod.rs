//! Achievement catalog and unlock evaluation.
//!
//! The catalog is a static table of definitions. Each user gets one row per
//! definition; rows unlock at most once and keep their unlock timestamp.

mod catalog;
mod engine;

pub use catalog::{
    AchievementCatalog, AchievementCategory, AchievementDef, Rarity, Rule, RuleFamily,
    STANDARD_ACHIEVEMENTS,
};
pub use engine::{
    plan_evaluation, plan_special_unlock, Achievement, AchievementEngine, AchievementFilter,
    AchievementStats, EvaluationPlan,
};
