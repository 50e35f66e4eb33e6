//! Composition root: turns one activity event into one committed progress
//! transition.
//!
//! Every call computes the whole transition in memory (daily record, XP,
//! unlocks, badges) and hands it to the store as a single [`ProgressCommit`].
//! A failed call therefore leaves no trace. Notifications go out only after
//! the commit succeeded.

use chrono::{DateTime, FixedOffset, Local, NaiveDate, Timelike, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::achievements::{
    plan_evaluation, plan_special_unlock, Achievement, AchievementCatalog, AchievementEngine,
    EvaluationPlan,
};
use crate::activity::{ActivityDelta, CumulativeCounters, DailyActivityAggregator, DailyStat};
use crate::error::{CoreError, Result, StorageError, ValidationError};
use crate::events::ProgressEvent;
use crate::notify::{dispatch, NoopNotifier, Notifier};
use crate::progression::{LevelCurve, LevelUpResult, ProgressionLedger, UserProgress};
use crate::storage::{Config, ProgressCommit, ProgressStore, XpConfig, LEVEL_CURVE_KEY};

/// Pomodoros finished before this hour unlock `EARLY_BIRD`.
const EARLY_BIRD_BEFORE_HOUR: u32 = 7;
/// Pomodoros finished at or after this hour unlock `NIGHT_OWL`.
const NIGHT_OWL_FROM_HOUR: u32 = 22;

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    PomodoroCompleted,
    TaskCompleted,
    TaskCreated,
    /// A day boundary passed; re-evaluates without adding activity.
    DayElapsed,
}

impl ActivityKind {
    pub fn label(self) -> &'static str {
        match self {
            ActivityKind::PomodoroCompleted => "pomodoro",
            ActivityKind::TaskCompleted => "task_completed",
            ActivityKind::TaskCreated => "task_created",
            ActivityKind::DayElapsed => "day_elapsed",
        }
    }
}

/// One activity as reported by the surrounding application.
///
/// `occurred_at` carries the user's UTC offset: its local date picks the
/// DailyStat and its local hour drives the time-of-day achievements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEvent {
    pub kind: ActivityKind,
    #[serde(default)]
    pub focus_minutes: u32,
    pub occurred_at: DateTime<FixedOffset>,
    /// Idempotency key. Events without one are never deduplicated.
    #[serde(default)]
    pub event_id: Option<Uuid>,
}

impl ActivityEvent {
    pub fn new(kind: ActivityKind, occurred_at: DateTime<FixedOffset>) -> Self {
        Self {
            kind,
            focus_minutes: 0,
            occurred_at,
            event_id: None,
        }
    }

    pub fn pomodoro(focus_minutes: u32, occurred_at: DateTime<FixedOffset>) -> Self {
        Self {
            focus_minutes,
            ..Self::new(ActivityKind::PomodoroCompleted, occurred_at)
        }
    }

    pub fn with_event_id(mut self, event_id: Uuid) -> Self {
        self.event_id = Some(event_id);
        self
    }

    /// Local calendar day of the event.
    pub fn day(&self) -> NaiveDate {
        self.occurred_at.date_naive()
    }

    /// Change to the day's record.
    pub fn delta(&self) -> ActivityDelta {
        match self.kind {
            ActivityKind::PomodoroCompleted => ActivityDelta::pomodoro(self.focus_minutes),
            ActivityKind::TaskCompleted => ActivityDelta::task_completed(),
            ActivityKind::TaskCreated => ActivityDelta::task_created(),
            ActivityKind::DayElapsed => ActivityDelta::default(),
        }
    }

    /// XP the event is worth before achievement rewards.
    pub fn base_xp(&self, xp: &XpConfig) -> u64 {
        match self.kind {
            ActivityKind::PomodoroCompleted => xp
                .pomodoro
                .saturating_add(xp.per_focus_minute.saturating_mul(u64::from(self.focus_minutes))),
            ActivityKind::TaskCompleted => xp.task_completed,
            ActivityKind::TaskCreated => xp.task_created,
            ActivityKind::DayElapsed => 0,
        }
    }

    /// Time-of-day special the event qualifies for, if any.
    fn special(&self) -> Option<&'static str> {
        if self.kind != ActivityKind::PomodoroCompleted {
            return None;
        }
        let hour = self.occurred_at.hour();
        if hour < EARLY_BIRD_BEFORE_HOUR {
            Some("EARLY_BIRD")
        } else if hour >= NIGHT_OWL_FROM_HOUR {
            Some("NIGHT_OWL")
        } else {
            None
        }
    }
}

/// Combined result of one orchestrated call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub user_id: String,
    /// Base XP plus every achievement reward granted by this call.
    pub xp_gained: u64,
    pub total_xp: u64,
    pub level: u32,
    pub title: String,
    /// Set only when the level after the call is above the level before it.
    pub level_up: Option<LevelUpResult>,
    pub unlocked: Vec<Achievement>,
    pub events: Vec<ProgressEvent>,
}

/// Result of [`GamificationOrchestrator::record_activity`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityReport {
    /// The day's record after the event. `None` for a day-elapsed event on a
    /// day without activity.
    pub daily_stat: Option<DailyStat>,
    pub score_delta: i16,
    pub counters: CumulativeCounters,
    pub outcome: Outcome,
}

/// Drives the aggregator, ledger and achievement engine over one store.
pub struct GamificationOrchestrator<S: ProgressStore, N: Notifier = NoopNotifier> {
    store: S,
    notifier: N,
    catalog: AchievementCatalog,
    curve: LevelCurve,
    xp: XpConfig,
    lookback_days: u32,
    notifications_enabled: bool,
}

impl<S: ProgressStore> GamificationOrchestrator<S> {
    /// Build an engine that sends no notifications.
    pub fn new(store: S, config: &Config) -> Result<Self> {
        Self::with_notifier(store, NoopNotifier, config)
    }
}

impl<S: ProgressStore, N: Notifier> GamificationOrchestrator<S, N> {
    /// Validate `config`, load the standard catalog and resolve the pinned
    /// level curve.
    ///
    /// # Errors
    ///
    /// Returns a catalog or configuration error when `config` is invalid and
    /// a storage error when the pinned curve cannot be read or written.
    pub fn with_notifier(store: S, notifier: N, config: &Config) -> Result<Self> {
        config.validate()?;
        let catalog = AchievementCatalog::standard()?;
        let curve = resolve_curve(&store, &config.level_curve)?;

        Ok(Self {
            store,
            notifier,
            catalog,
            curve,
            xp: config.xp.clone(),
            lookback_days: config.streak.lookback_days,
            notifications_enabled: config.notifications.enabled,
        })
    }

    /// Replace the standard catalog.
    pub fn with_catalog(mut self, catalog: AchievementCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn catalog(&self) -> &AchievementCatalog {
        &self.catalog
    }

    /// The level curve users are leveled with.
    pub fn curve(&self) -> &LevelCurve {
        &self.curve
    }

    pub fn aggregator(&self) -> DailyActivityAggregator<'_, S> {
        DailyActivityAggregator::new(&self.store, self.lookback_days)
    }

    pub fn ledger(&self) -> ProgressionLedger<'_, S> {
        ProgressionLedger::new(&self.store, &self.curve)
    }

    pub fn achievements(&self) -> AchievementEngine<'_, S> {
        AchievementEngine::new(&self.store, &self.catalog)
    }

    /// Create the user's progress record and achievement rows if missing.
    /// Safe to repeat; a partial earlier run is completed.
    pub fn ensure_user(&self, user_id: &str, now: DateTime<Utc>) -> Result<UserProgress> {
        validate_user_id(user_id)?;
        let progress = self.ledger().initialize(user_id, now)?;
        self.achievements().initialize_catalog_for_user(user_id)?;
        Ok(progress)
    }

    /// Grant `xp_to_add`, evaluate achievements against `counters` and grant
    /// their rewards, as one atomic transition dated today in local time.
    ///
    /// # Errors
    ///
    /// [`CoreError::NotInitialized`] when the user has no progress record or
    /// no achievement rows; storage errors otherwise. Nothing is written on
    /// error.
    pub fn on_activity_completed(
        &self,
        user_id: &str,
        xp_to_add: u64,
        counters: &CumulativeCounters,
    ) -> Result<Outcome> {
        let local = Local::now();
        let today = local.date_naive();
        self.on_activity_completed_at(user_id, xp_to_add, counters, today, local.with_timezone(&Utc))
    }

    /// [`Self::on_activity_completed`] with an explicit day and clock.
    pub fn on_activity_completed_at(
        &self,
        user_id: &str,
        xp_to_add: u64,
        counters: &CumulativeCounters,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Outcome> {
        let (progress, rows) = self.load_user(user_id)?;
        let plan = plan_evaluation(&self.catalog, &rows, counters, now);
        let transition = Transition {
            base_xp: xp_to_add,
            label: "activity",
            plan,
            active_on: Some(today),
            now,
        };
        self.apply(progress, &rows, transition, None, None)
    }

    /// Record one activity end to end: lazy user initialization, the day's
    /// record, base XP from config, achievement evaluation and rewards.
    ///
    /// # Errors
    ///
    /// [`CoreError::DuplicateEvent`] when the event id was already recorded
    /// for the user, [`ValidationError::EmptyUserId`] for an empty user id,
    /// storage errors otherwise. Nothing is written on error.
    pub fn record_activity(&self, user_id: &str, event: &ActivityEvent) -> Result<ActivityReport> {
        validate_user_id(user_id)?;
        if let Some(event_id) = event.event_id {
            if self.store.is_event_recorded(user_id, event_id)? {
                debug!(user_id, %event_id, "duplicate activity event");
                return Err(CoreError::DuplicateEvent {
                    user_id: user_id.to_string(),
                    event_id,
                });
            }
        }

        let now = Utc::now();
        self.ensure_user(user_id, now)?;

        let day = event.day();
        let delta = event.delta();
        let mut history = self.store.daily_stats(user_id, None, Some(day))?;

        let (daily_stat, score_delta, write_stat) = if delta.is_empty() {
            let existing = history.iter().find(|s| s.date == day).cloned();
            (existing, 0, false)
        } else {
            let (stat, previous_score) = self.aggregator().plan(user_id, day, &delta)?;
            let score_delta = i16::from(stat.productivity_score) - i16::from(previous_score);
            history.retain(|s| s.date != day);
            history.push(stat.clone());
            (Some(stat), score_delta, true)
        };
        let counters = CumulativeCounters::from_history(&history, day, self.lookback_days);
        debug!(user_id, kind = event.kind.label(), ?counters, "derived counters");

        let (progress, rows) = self.load_user(user_id)?;
        let mut plan = plan_evaluation(&self.catalog, &rows, &counters, now);
        if let Some(special) = event.special().filter(|s| self.catalog.get(s).is_some()) {
            if let Some(row) = plan_special_unlock(&self.catalog, user_id, &rows, special, now)? {
                plan.unlocked.push(row.clone());
                plan.changed.push(row);
            }
        }

        let transition = Transition {
            base_xp: event.base_xp(&self.xp),
            label: event.kind.label(),
            plan,
            active_on: Some(day),
            now,
        };
        let stat_to_write = if write_stat { daily_stat.clone() } else { None };
        let outcome = self.apply(progress, &rows, transition, stat_to_write, event.event_id)?;

        Ok(ActivityReport {
            daily_stat,
            score_delta,
            counters,
            outcome,
        })
    }

    /// Unlock a special achievement and grant its reward atomically.
    ///
    /// An already unlocked achievement yields an outcome with nothing
    /// unlocked and nothing written.
    pub fn unlock_special(&self, user_id: &str, achievement_type: &str) -> Result<Outcome> {
        let now = Utc::now();
        let (progress, rows) = self.load_user(user_id)?;
        let Some(row) = plan_special_unlock(&self.catalog, user_id, &rows, achievement_type, now)?
        else {
            debug!(user_id, achievement = achievement_type, "special already unlocked");
            return Ok(unchanged_outcome(&progress));
        };

        let transition = Transition {
            base_xp: 0,
            label: "special",
            plan: EvaluationPlan {
                unlocked: vec![row.clone()],
                changed: vec![row],
            },
            active_on: None,
            now,
        };
        self.apply(progress, &rows, transition, None, None)
    }

    /// Switch to `curve` and re-derive every user's level from their XP.
    /// Returns how many users changed level.
    ///
    /// XP totals are untouched, so levels can go down under a steeper curve.
    /// The re-leveled records and the new pin are written in one store
    /// transaction; on error the previous curve stays in effect.
    pub fn migrate_level_curve(&mut self, curve: LevelCurve) -> Result<usize> {
        curve.validate()?;
        let mut changed = 0;
        let mut releveled = Vec::new();
        for user_id in self.store.user_ids()? {
            let Some(mut progress) = self.store.user_progress(&user_id)? else {
                continue;
            };
            let previous_level = progress.current_level;
            progress.rederive(&curve);
            if progress.current_level != previous_level {
                changed += 1;
                debug!(
                    user_id = %user_id,
                    from = previous_level,
                    to = progress.current_level,
                    "re-leveled user"
                );
            }
            releveled.push(progress);
        }
        self.store
            .commit_level_curve(&releveled, &serde_json::to_string(&curve)?)?;
        self.curve = curve;
        info!(?curve, changed, "migrated level curve");
        Ok(changed)
    }

    /// Delete every record of the user.
    pub fn wipe_user(&self, user_id: &str) -> Result<()> {
        validate_user_id(user_id)?;
        self.store.wipe_user(user_id)?;
        info!(user_id, "wiped user data");
        Ok(())
    }

    fn load_user(&self, user_id: &str) -> Result<(UserProgress, Vec<Achievement>)> {
        let not_initialized = || CoreError::NotInitialized {
            user_id: user_id.to_string(),
        };
        let progress = self.store.user_progress(user_id)?.ok_or_else(not_initialized)?;
        let rows = self.store.achievements(user_id)?;
        if rows.is_empty() {
            return Err(not_initialized());
        }
        Ok((progress, rows))
    }

    /// Apply `transition` to `progress`, commit it with `daily_stat`, then
    /// notify.
    fn apply(
        &self,
        mut progress: UserProgress,
        rows: &[Achievement],
        transition: Transition,
        daily_stat: Option<DailyStat>,
        event_id: Option<Uuid>,
    ) -> Result<Outcome> {
        let Transition {
            base_xp,
            label,
            plan,
            active_on,
            now,
        } = transition;
        let user_id = progress.user_id.clone();
        let level_before = progress.current_level;

        progress.grant_xp(&self.curve, base_xp, now);

        let reward_xp = plan.reward_xp();
        if !plan.unlocked.is_empty() {
            progress.grant_xp(&self.curve, reward_xp, now);
            let previously_unlocked = rows.iter().filter(|r| r.is_unlocked).count();
            progress.total_achievements =
                u32::try_from(previously_unlocked + plan.unlocked.len()).unwrap_or(u32::MAX);
            for row in &plan.unlocked {
                progress.award_badge(&row.badge_icon);
            }
        }
        if let Some(day) = active_on {
            progress.last_active_date = Some(day);
        }
        progress.updated_at = now;

        let xp_gained = base_xp.saturating_add(reward_xp);
        let level_up = LevelUpResult::between(level_before, progress.current_level, xp_gained);
        let level_up = level_up.leveled_up.then_some(level_up);

        let mut events = Vec::with_capacity(plan.unlocked.len() + 2);
        if base_xp > 0 {
            events.push(ProgressEvent::XpGained {
                amount: base_xp,
                activity_label: label.to_string(),
                at: now,
            });
        }
        for row in &plan.unlocked {
            events.push(ProgressEvent::AchievementUnlocked {
                achievement_type: row.achievement_type.clone(),
                title: row.title.clone(),
                xp_reward: row.xp_reward,
                at: now,
            });
        }
        if let Some(up) = &level_up {
            events.push(ProgressEvent::LeveledUp {
                previous_level: up.previous_level,
                new_level: up.new_level,
                title: progress.title.clone(),
                xp_gained,
                at: now,
            });
        }

        let commit = ProgressCommit {
            daily_stat,
            progress,
            achievements: plan.changed,
            event_id,
        };
        self.store.commit(&commit).map_err(|e| {
            warn!(user_id = %user_id, error = %e, "progress commit failed");
            CoreError::from(e)
        })?;

        for row in &plan.unlocked {
            info!(user_id = %user_id, achievement = %row.achievement_type, "achievement unlocked");
        }
        if let Some(up) = &level_up {
            info!(user_id = %user_id, from = up.previous_level, to = up.new_level, "level up");
        }

        if self.notifications_enabled {
            let failed: usize = events.iter().map(|e| dispatch(&self.notifier, e)).sum();
            if failed > 0 {
                warn!(user_id = %user_id, failed, "some notifications were not delivered");
            }
        }

        let progress = commit.progress;
        Ok(Outcome {
            user_id,
            xp_gained,
            total_xp: progress.total_xp,
            level: progress.current_level,
            title: progress.title,
            level_up,
            unlocked: plan.unlocked,
            events,
        })
    }
}

/// Everything one call changes, before it is applied to a progress record.
struct Transition {
    base_xp: u64,
    label: &'static str,
    plan: EvaluationPlan,
    /// Day to record as `last_active_date`.
    active_on: Option<NaiveDate>,
    now: DateTime<Utc>,
}

fn unchanged_outcome(progress: &UserProgress) -> Outcome {
    Outcome {
        user_id: progress.user_id.clone(),
        xp_gained: 0,
        total_xp: progress.total_xp,
        level: progress.current_level,
        title: progress.title.clone(),
        level_up: None,
        unlocked: Vec::new(),
        events: Vec::new(),
    }
}

fn validate_user_id(user_id: &str) -> Result<(), ValidationError> {
    if user_id.trim().is_empty() {
        return Err(ValidationError::EmptyUserId);
    }
    Ok(())
}

/// The curve pinned in `store`, pinning `configured` when none is.
///
/// A configured curve that differs from the pinned one is ignored until
/// [`GamificationOrchestrator::migrate_level_curve`] runs.
fn resolve_curve<S: ProgressStore + ?Sized>(store: &S, configured: &LevelCurve) -> Result<LevelCurve> {
    match store.setting(LEVEL_CURVE_KEY)? {
        Some(raw) => {
            let pinned: LevelCurve =
                serde_json::from_str(&raw).map_err(|e| StorageError::Corrupt {
                    entity: "level_curve",
                    message: e.to_string(),
                })?;
            pinned.validate()?;
            if pinned != *configured {
                warn!(
                    ?pinned,
                    ?configured,
                    "configured level curve differs from the pinned one; run a curve migration to switch"
                );
            }
            Ok(pinned)
        }
        None => {
            store.put_setting(LEVEL_CURVE_KEY, &serde_json::to_string(configured)?)?;
            info!(curve = ?configured, "pinned level curve");
            Ok(*configured)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use chrono::TimeZone;

    fn at(day: u32, hour: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 5, day, hour, 0, 0)
            .unwrap()
    }

    fn engine() -> GamificationOrchestrator<MemoryStore> {
        GamificationOrchestrator::new(MemoryStore::new(), &Config::default()).unwrap()
    }

    #[test]
    fn on_activity_completed_requires_initialization() {
        let engine = engine();
        let err = engine
            .on_activity_completed("ghost", 25, &CumulativeCounters::default())
            .unwrap_err();
        assert!(matches!(err, CoreError::NotInitialized { .. }));
    }

    #[test]
    fn on_activity_completed_dates_activity_in_local_time() {
        let engine = engine();
        engine.ensure_user("u", Utc::now()).unwrap();
        let before = Local::now().date_naive();
        engine
            .on_activity_completed("u", 5, &CumulativeCounters::default())
            .unwrap();
        let after = Local::now().date_naive();

        let active = engine
            .store()
            .user_progress("u")
            .unwrap()
            .unwrap()
            .last_active_date
            .unwrap();
        assert!(active == before || active == after);
    }

    #[test]
    fn reward_xp_is_part_of_the_same_call() {
        let engine = engine();
        engine.ensure_user("u", Utc::now()).unwrap();
        let counters = CumulativeCounters {
            total_pomodoros: 1,
            daily_pomodoros: 1,
            current_streak: 1,
            ..CumulativeCounters::default()
        };
        let outcome = engine.on_activity_completed("u", 25, &counters).unwrap();
        assert_eq!(outcome.xp_gained, 35);
        assert_eq!(outcome.total_xp, 35);
        assert_eq!(outcome.unlocked.len(), 1);
        assert_eq!(outcome.unlocked[0].achievement_type, "FIRST_POMODORO");
        assert!(outcome.level_up.is_none());

        let progress = engine.ledger().progress("u").unwrap();
        assert_eq!(progress.total_achievements, 1);
        assert!(progress.badges.contains("tomato_seed"));
        assert_eq!(progress.last_active_date, Some(Utc::now().date_naive()));
    }

    #[test]
    fn first_pomodoro_of_fresh_day() {
        let engine = engine();
        let report = engine
            .record_activity("u", &ActivityEvent::pomodoro(0, at(1, 10)))
            .unwrap();
        let stat = report.daily_stat.unwrap();
        assert_eq!(stat.pomodoro_sessions_completed, 1);
        assert_eq!(stat.study_streak_days, 1);
        assert_eq!(stat.productivity_score, 5);
        assert_eq!(report.score_delta, 5);
        assert_eq!(report.outcome.unlocked[0].achievement_type, "FIRST_POMODORO");
    }

    #[test]
    fn early_pomodoro_unlocks_early_bird() {
        let engine = engine();
        let report = engine
            .record_activity("u", &ActivityEvent::pomodoro(25, at(1, 6)))
            .unwrap();
        let types: Vec<_> = report
            .outcome
            .unlocked
            .iter()
            .map(|a| a.achievement_type.as_str())
            .collect();
        assert_eq!(types, vec!["FIRST_POMODORO", "EARLY_BIRD"]);
        // 25 base + 10 + 25
        assert_eq!(report.outcome.xp_gained, 60);
    }

    #[test]
    fn day_elapsed_writes_no_daily_stat() {
        let engine = engine();
        let report = engine
            .record_activity("u", &ActivityEvent::new(ActivityKind::DayElapsed, at(2, 0)))
            .unwrap();
        assert!(report.daily_stat.is_none());
        assert_eq!(report.outcome.xp_gained, 0);
        assert!(engine.store().daily_stats("u", None, None).unwrap().is_empty());
    }

    #[test]
    fn unlock_special_grants_reward_once() {
        let engine = engine();
        engine.ensure_user("u", Utc::now()).unwrap();
        let first = engine.unlock_special("u", "NIGHT_OWL").unwrap();
        assert_eq!(first.xp_gained, 25);
        let second = engine.unlock_special("u", "NIGHT_OWL").unwrap();
        assert!(second.unlocked.is_empty());
        assert_eq!(second.total_xp, 25);

        assert!(matches!(
            engine.unlock_special("u", "POMODORO_10"),
            Err(CoreError::Validation(ValidationError::NotSpecial(_)))
        ));
    }

    #[test]
    fn empty_user_id_is_rejected() {
        let engine = engine();
        assert!(matches!(
            engine.record_activity(" ", &ActivityEvent::pomodoro(25, at(1, 10))),
            Err(CoreError::Validation(ValidationError::EmptyUserId))
        ));
    }

    #[test]
    fn base_xp_follows_config() {
        let xp = XpConfig {
            pomodoro: 20,
            per_focus_minute: 1,
            task_completed: 7,
            task_created: 1,
        };
        assert_eq!(ActivityEvent::pomodoro(25, at(1, 10)).base_xp(&xp), 45);
        assert_eq!(
            ActivityEvent::new(ActivityKind::TaskCompleted, at(1, 10)).base_xp(&xp),
            7
        );
        assert_eq!(
            ActivityEvent::new(ActivityKind::DayElapsed, at(1, 10)).base_xp(&xp),
            0
        );
    }
}
