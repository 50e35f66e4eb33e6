use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::catalog::{AchievementCatalog, AchievementCategory, AchievementDef, Rarity, RuleFamily};
use crate::activity::CumulativeCounters;
use crate::error::{CoreError, Result, ValidationError};
use crate::storage::ProgressStore;

/// A user's instance of a catalog achievement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievement {
    pub user_id: String,
    pub achievement_type: String,
    pub title: String,
    pub description: String,
    pub badge_icon: String,
    pub xp_reward: u64,
    pub target_value: u64,
    pub category: AchievementCategory,
    pub rarity: Rarity,
    pub current_progress: u64,
    pub is_unlocked: bool,
    pub unlocked_at: Option<DateTime<Utc>>,
}

impl Achievement {
    /// A locked row with no progress.
    pub fn from_def(user_id: &str, def: &AchievementDef) -> Self {
        Self {
            user_id: user_id.to_string(),
            achievement_type: def.id.to_string(),
            title: def.title.to_string(),
            description: def.description.to_string(),
            badge_icon: def.badge_icon.to_string(),
            xp_reward: def.xp_reward,
            target_value: def.target_value,
            category: def.category,
            rarity: def.rarity,
            current_progress: 0,
            is_unlocked: false,
            unlocked_at: None,
        }
    }

    /// Unlock the row. Returns false if it was already unlocked.
    pub fn unlock(&mut self, at: DateTime<Utc>) -> bool {
        if self.is_unlocked {
            return false;
        }
        self.is_unlocked = true;
        self.unlocked_at = Some(at);
        self.current_progress = self.current_progress.max(self.target_value);
        true
    }

    /// Raise progress on a locked row. Returns true if it changed.
    pub fn record_progress(&mut self, value: u64) -> bool {
        if self.is_unlocked || value <= self.current_progress {
            return false;
        }
        self.current_progress = value;
        true
    }

    /// Progress towards the target in `0..=100`.
    pub fn progress_percentage(&self) -> u8 {
        if self.is_unlocked {
            return 100;
        }
        let pct = self.current_progress.saturating_mul(100) / self.target_value.max(1);
        pct.min(100) as u8
    }
}

/// Rows changed by one evaluation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvaluationPlan {
    /// Copies of rows unlocked in this pass, in evaluation order.
    pub unlocked: Vec<Achievement>,
    /// Every row that must be written, including the unlocked ones.
    pub changed: Vec<Achievement>,
}

impl EvaluationPlan {
    fn merge(mut self, other: EvaluationPlan) -> Self {
        self.unlocked.extend(other.unlocked);
        self.changed.extend(other.changed);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.changed.is_empty()
    }

    pub fn reward_xp(&self) -> u64 {
        self.unlocked.iter().map(|a| a.xp_reward).sum()
    }
}

/// Filter for listing a user's achievements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AchievementFilter {
    pub unlocked: Option<bool>,
    pub category: Option<AchievementCategory>,
}

impl AchievementFilter {
    fn matches(&self, row: &Achievement) -> bool {
        self.unlocked.map_or(true, |u| row.is_unlocked == u)
            && self.category.map_or(true, |c| row.category == c)
    }
}

/// Read-only summary over a user's achievements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementStats {
    pub total: u32,
    pub unlocked: u32,
    pub productivity_unlocked: u32,
    pub consistency_unlocked: u32,
    pub milestone_unlocked: u32,
    pub completion_percentage: u8,
}

impl AchievementStats {
    pub fn from_rows(rows: &[Achievement]) -> Self {
        let mut stats = Self {
            total: rows.len() as u32,
            ..Self::default()
        };
        for row in rows.iter().filter(|r| r.is_unlocked) {
            stats.unlocked += 1;
            match row.category {
                AchievementCategory::Productivity => stats.productivity_unlocked += 1,
                AchievementCategory::Consistency => stats.consistency_unlocked += 1,
                AchievementCategory::Milestone => stats.milestone_unlocked += 1,
            }
        }
        if stats.total > 0 {
            stats.completion_percentage =
                (f64::from(stats.unlocked) / f64::from(stats.total) * 100.0).round() as u8;
        }
        stats
    }
}

/// Evaluate one rule family against `rows`.
///
/// Rows missing from `rows` are skipped; the caller initializes the catalog
/// for the user first.
fn evaluate_family(
    catalog: &AchievementCatalog,
    family: RuleFamily,
    rows: &HashMap<&str, &Achievement>,
    counters: &CumulativeCounters,
    now: DateTime<Utc>,
) -> EvaluationPlan {
    let mut plan = EvaluationPlan::default();

    for def in catalog.family(family) {
        let Some(row) = rows.get(def.id) else {
            debug!(achievement = def.id, "no stored row, skipping");
            continue;
        };
        let Some(value) = def.rule.measure(counters) else {
            continue;
        };
        if row.is_unlocked {
            continue;
        }

        let mut updated = (*row).clone();
        if value >= row.target_value {
            updated.record_progress(value);
            updated.unlock(now);
            plan.unlocked.push(updated.clone());
            plan.changed.push(updated);
        } else if family.tracks_progress() && updated.record_progress(value) {
            plan.changed.push(updated);
        }
    }
    plan
}

/// Evaluate every counter-driven family in the fixed order and fold the
/// per-family results together. Pure: nothing is written.
pub fn plan_evaluation(
    catalog: &AchievementCatalog,
    rows: &[Achievement],
    counters: &CumulativeCounters,
    now: DateTime<Utc>,
) -> EvaluationPlan {
    let by_type: HashMap<&str, &Achievement> = rows
        .iter()
        .map(|r| (r.achievement_type.as_str(), r))
        .collect();

    RuleFamily::EVALUATION_ORDER
        .iter()
        .map(|&family| evaluate_family(catalog, family, &by_type, counters, now))
        .fold(EvaluationPlan::default(), EvaluationPlan::merge)
}

/// Plan an out-of-band unlock of a special achievement.
///
/// Returns `None` when the row is already unlocked.
pub fn plan_special_unlock(
    catalog: &AchievementCatalog,
    user_id: &str,
    rows: &[Achievement],
    achievement_type: &str,
    now: DateTime<Utc>,
) -> Result<Option<Achievement>> {
    let def = catalog
        .get(achievement_type)
        .ok_or_else(|| ValidationError::UnknownAchievement(achievement_type.to_string()))?;
    if def.family() != RuleFamily::Special {
        return Err(ValidationError::NotSpecial(achievement_type.to_string()).into());
    }
    let row = rows
        .iter()
        .find(|r| r.achievement_type == achievement_type)
        .ok_or_else(|| CoreError::NotInitialized {
            user_id: user_id.to_string(),
        })?;

    let mut updated = row.clone();
    Ok(updated.unlock(now).then_some(updated))
}

/// Catalog-backed unlock state for users.
pub struct AchievementEngine<'a, S: ProgressStore + ?Sized> {
    store: &'a S,
    catalog: &'a AchievementCatalog,
}

impl<'a, S: ProgressStore + ?Sized> AchievementEngine<'a, S> {
    pub fn new(store: &'a S, catalog: &'a AchievementCatalog) -> Self {
        Self { store, catalog }
    }

    /// Create missing rows for the user. Returns how many were inserted.
    ///
    /// Existing rows are never touched, so repeated calls are no-ops.
    pub fn initialize_catalog_for_user(&self, user_id: &str) -> Result<usize> {
        let existing = self.store.achievements(user_id)?;
        let missing: Vec<Achievement> = self
            .catalog
            .all()
            .iter()
            .filter(|def| !existing.iter().any(|row| row.achievement_type == def.id))
            .map(|def| Achievement::from_def(user_id, def))
            .collect();

        if !missing.is_empty() {
            self.store.put_achievements(&missing)?;
            info!(user_id, inserted = missing.len(), "initialized achievement rows");
        }
        Ok(missing.len())
    }

    fn rows(&self, user_id: &str) -> Result<Vec<Achievement>> {
        let rows = self.store.achievements(user_id)?;
        if rows.is_empty() {
            return Err(CoreError::NotInitialized {
                user_id: user_id.to_string(),
            });
        }
        Ok(rows)
    }

    /// Unlock every achievement whose threshold `counters` meet and return
    /// the newly unlocked ones.
    pub fn evaluate(&self, user_id: &str, counters: &CumulativeCounters) -> Result<Vec<Achievement>> {
        let rows = self.rows(user_id)?;
        let plan = plan_evaluation(self.catalog, &rows, counters, Utc::now());
        if !plan.is_empty() {
            self.store.put_achievements(&plan.changed)?;
        }
        for unlocked in &plan.unlocked {
            info!(user_id, achievement = %unlocked.achievement_type, "achievement unlocked");
        }
        Ok(plan.unlocked)
    }

    /// Unlock a special achievement. `None` if it was already unlocked.
    pub fn unlock_special(&self, user_id: &str, achievement_type: &str) -> Result<Option<Achievement>> {
        let rows = self.rows(user_id)?;
        let unlocked = plan_special_unlock(self.catalog, user_id, &rows, achievement_type, Utc::now())?;
        if let Some(row) = &unlocked {
            self.store.put_achievements(std::slice::from_ref(row))?;
            info!(user_id, achievement = achievement_type, "special achievement unlocked");
        }
        Ok(unlocked)
    }

    pub fn stats(&self, user_id: &str) -> Result<AchievementStats> {
        Ok(AchievementStats::from_rows(&self.store.achievements(user_id)?))
    }

    /// Rows matching `filter`, in catalog order.
    pub fn list(&self, user_id: &str, filter: AchievementFilter) -> Result<Vec<Achievement>> {
        let mut rows: Vec<Achievement> = self
            .store
            .achievements(user_id)?
            .into_iter()
            .filter(|r| filter.matches(r))
            .collect();
        let position = |r: &Achievement| {
            self.catalog
                .all()
                .iter()
                .position(|d| d.id == r.achievement_type)
                .unwrap_or(usize::MAX)
        };
        rows.sort_by_key(|r| position(r));
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn setup() -> (MemoryStore, AchievementCatalog) {
        let store = MemoryStore::new();
        let catalog = AchievementCatalog::standard().unwrap();
        AchievementEngine::new(&store, &catalog)
            .initialize_catalog_for_user("u")
            .unwrap();
        (store, catalog)
    }

    fn ids(rows: &[Achievement]) -> Vec<&str> {
        rows.iter().map(|r| r.achievement_type.as_str()).collect()
    }

    #[test]
    fn initialization_is_idempotent() {
        let (store, catalog) = setup();
        let engine = AchievementEngine::new(&store, &catalog);
        assert_eq!(engine.initialize_catalog_for_user("u").unwrap(), 0);
        assert_eq!(store.achievements("u").unwrap().len(), catalog.len());
    }

    #[test]
    fn evaluate_before_initialization_fails() {
        let store = MemoryStore::new();
        let catalog = AchievementCatalog::standard().unwrap();
        let engine = AchievementEngine::new(&store, &catalog);
        let err = engine
            .evaluate("nobody", &CumulativeCounters::default())
            .unwrap_err();
        assert!(matches!(err, CoreError::NotInitialized { .. }));
    }

    #[test]
    fn first_pomodoro_unlocks_once() {
        let (store, catalog) = setup();
        let engine = AchievementEngine::new(&store, &catalog);
        let counters = CumulativeCounters {
            total_pomodoros: 1,
            daily_pomodoros: 1,
            current_streak: 1,
            ..Default::default()
        };
        let first = engine.evaluate("u", &counters).unwrap();
        assert_eq!(ids(&first), vec!["FIRST_POMODORO"]);
        assert!(first[0].is_unlocked);
        assert!(first[0].unlocked_at.is_some());

        let again = engine.evaluate("u", &counters).unwrap();
        assert!(again.is_empty());
    }

    #[test]
    fn progress_tracks_locked_rows_only() {
        let (store, catalog) = setup();
        let engine = AchievementEngine::new(&store, &catalog);
        let counters = CumulativeCounters {
            total_pomodoros: 7,
            daily_pomodoros: 2,
            ..Default::default()
        };
        engine.evaluate("u", &counters).unwrap();

        let rows = store.achievements("u").unwrap();
        let get = |id: &str| rows.iter().find(|r| r.achievement_type == id).unwrap();
        assert_eq!(get("POMODORO_10").current_progress, 7);
        assert_eq!(get("POMODORO_10").progress_percentage(), 70);
        // Same-day rules are binary.
        assert_eq!(get("DAILY_POMODORO_3").current_progress, 0);
        // Unlocked rows are frozen.
        assert!(get("FIRST_POMODORO").is_unlocked);
        assert_eq!(get("FIRST_POMODORO").current_progress, 7);
    }

    #[test]
    fn progress_never_regresses() {
        let (store, catalog) = setup();
        let engine = AchievementEngine::new(&store, &catalog);
        engine
            .evaluate("u", &CumulativeCounters { total_tasks: 6, ..Default::default() })
            .unwrap();
        engine
            .evaluate("u", &CumulativeCounters { total_tasks: 2, ..Default::default() })
            .unwrap();
        let rows = store.achievements("u").unwrap();
        let tasks_10 = rows.iter().find(|r| r.achievement_type == "TASKS_10").unwrap();
        assert_eq!(tasks_10.current_progress, 6);
    }

    #[test]
    fn families_are_evaluated_in_fixed_order() {
        let (store, catalog) = setup();
        let engine = AchievementEngine::new(&store, &catalog);
        let counters = CumulativeCounters {
            total_pomodoros: 3,
            total_tasks: 1,
            total_focus_minutes: 75,
            current_streak: 3,
            daily_pomodoros: 3,
            daily_tasks: 1,
        };
        let unlocked = engine.evaluate("u", &counters).unwrap();
        assert_eq!(
            ids(&unlocked),
            vec![
                "FIRST_POMODORO",
                "FIRST_TASK",
                "FOCUS_1H",
                "STREAK_3",
                "DAILY_POMODORO_3"
            ]
        );
    }

    #[test]
    fn specials_are_never_unlocked_by_counters() {
        let (store, catalog) = setup();
        let engine = AchievementEngine::new(&store, &catalog);
        let huge = CumulativeCounters {
            total_pomodoros: 10_000,
            total_tasks: 10_000,
            total_focus_minutes: 1_000_000,
            current_streak: 1_000,
            daily_pomodoros: 100,
            daily_tasks: 100,
        };
        let unlocked = engine.evaluate("u", &huge).unwrap();
        assert_eq!(unlocked.len(), catalog.len() - 2);
        assert!(!ids(&unlocked).contains(&"EARLY_BIRD"));
    }

    #[test]
    fn unlock_special_is_one_way() {
        let (store, catalog) = setup();
        let engine = AchievementEngine::new(&store, &catalog);
        let first = engine.unlock_special("u", "NIGHT_OWL").unwrap();
        assert_eq!(first.unwrap().achievement_type, "NIGHT_OWL");
        assert!(engine.unlock_special("u", "NIGHT_OWL").unwrap().is_none());

        let err = engine.unlock_special("u", "POMODORO_10").unwrap_err();
        assert!(matches!(err, CoreError::Validation(ValidationError::NotSpecial(_))));
        let err = engine.unlock_special("u", "MOON_LANDING").unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::UnknownAchievement(_))
        ));
    }

    #[test]
    fn stats_round_completion_percentage() {
        let (store, catalog) = setup();
        let engine = AchievementEngine::new(&store, &catalog);
        engine
            .evaluate(
                "u",
                &CumulativeCounters {
                    total_pomodoros: 1,
                    current_streak: 3,
                    ..Default::default()
                },
            )
            .unwrap();
        let stats = engine.stats("u").unwrap();
        assert_eq!(stats.total, catalog.len() as u32);
        assert_eq!(stats.unlocked, 2);
        assert_eq!(stats.productivity_unlocked, 1);
        assert_eq!(stats.consistency_unlocked, 1);
        assert_eq!(stats.milestone_unlocked, 0);
        let expected = (2.0 / catalog.len() as f64 * 100.0).round() as u8;
        assert_eq!(stats.completion_percentage, expected);
    }

    #[test]
    fn list_filters_and_keeps_catalog_order() {
        let (store, catalog) = setup();
        let engine = AchievementEngine::new(&store, &catalog);
        engine.unlock_special("u", "EARLY_BIRD").unwrap();

        let unlocked = engine
            .list("u", AchievementFilter { unlocked: Some(true), category: None })
            .unwrap();
        assert_eq!(ids(&unlocked), vec!["EARLY_BIRD"]);

        let milestones = engine
            .list(
                "u",
                AchievementFilter {
                    unlocked: None,
                    category: Some(AchievementCategory::Milestone),
                },
            )
            .unwrap();
        assert_eq!(milestones[0].achievement_type, "POMODORO_100");
        assert!(milestones.iter().all(|r| r.category == AchievementCategory::Milestone));
    }
}
