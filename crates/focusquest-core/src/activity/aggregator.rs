use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::daily::{ActivityDelta, DailyStat};
use crate::error::{Result, StorageError};
use crate::storage::ProgressStore;

/// Counters the achievement engine evaluates against.
///
/// Totals are summed over a user's whole DailyStat history; the `daily_*`
/// fields are scoped to the day the event happened on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CumulativeCounters {
    pub total_pomodoros: u64,
    pub total_tasks: u64,
    pub total_focus_minutes: u64,
    pub current_streak: u64,
    pub daily_pomodoros: u64,
    pub daily_tasks: u64,
}

impl CumulativeCounters {
    /// Derive counters from `history` as seen on `day`.
    ///
    /// Records after `day` are ignored. The current streak is the streak of
    /// the most recent record no older than `lookback_days`.
    pub fn from_history(history: &[DailyStat], day: NaiveDate, lookback_days: u32) -> Self {
        let mut counters = Self::default();
        let window_start = day
            .checked_sub_days(Days::new(u64::from(lookback_days)))
            .unwrap_or(NaiveDate::MIN);
        let mut latest: Option<&DailyStat> = None;

        for stat in history.iter().filter(|s| s.date <= day) {
            counters.total_pomodoros += u64::from(stat.pomodoro_sessions_completed);
            counters.total_tasks += u64::from(stat.tasks_completed);
            counters.total_focus_minutes += u64::from(stat.total_focus_time_minutes);

            if stat.date == day {
                counters.daily_pomodoros = u64::from(stat.pomodoro_sessions_completed);
                counters.daily_tasks = u64::from(stat.tasks_completed);
            }
            if stat.date >= window_start && latest.map_or(true, |l| stat.date > l.date) {
                latest = Some(stat);
            }
        }

        counters.current_streak = latest.map_or(0, |s| u64::from(s.study_streak_days));
        counters
    }
}

/// Longest run of consecutive days with at least one pomodoro.
///
/// Sorts a copy of the dates first, so out-of-order history is fine.
pub fn longest_pomodoro_run(history: &[DailyStat]) -> u32 {
    let mut active: Vec<NaiveDate> = history
        .iter()
        .filter(|s| s.pomodoro_sessions_completed > 0)
        .map(|s| s.date)
        .collect();
    active.sort_unstable();
    active.dedup();

    let mut longest = 0u32;
    let mut running = 0u32;
    let mut previous: Option<NaiveDate> = None;

    for date in active {
        running = match previous {
            Some(prev) if prev.succ_opt() == Some(date) => running + 1,
            _ => 1,
        };
        longest = longest.max(running);
        previous = Some(date);
    }
    longest
}

/// Maintains the per-day activity records of a user.
pub struct DailyActivityAggregator<'a, S: ProgressStore + ?Sized> {
    store: &'a S,
    lookback_days: u32,
}

impl<'a, S: ProgressStore + ?Sized> DailyActivityAggregator<'a, S> {
    pub fn new(store: &'a S, lookback_days: u32) -> Self {
        Self {
            store,
            lookback_days,
        }
    }

    /// Compute the record `day` would hold after `delta`, without writing it.
    ///
    /// Returns the updated record and the score it had before.
    pub fn plan(
        &self,
        user_id: &str,
        day: NaiveDate,
        delta: &ActivityDelta,
    ) -> Result<(DailyStat, u8), StorageError> {
        let (mut stat, previous_score) = match self.store.daily_stat(user_id, day)? {
            Some(existing) => {
                let score = existing.productivity_score;
                (existing, score)
            }
            None => {
                let yesterday = match day.pred_opt() {
                    Some(prev_day) => self.store.daily_stat(user_id, prev_day)?,
                    None => None,
                };
                (DailyStat::start_day(user_id, day, yesterday.as_ref()), 0)
            }
        };
        stat.apply(delta);
        Ok((stat, previous_score))
    }

    /// Apply `delta` to the user's record for `day` and store it.
    pub fn record_activity(
        &self,
        user_id: &str,
        day: NaiveDate,
        delta: &ActivityDelta,
    ) -> Result<DailyStat> {
        let (stat, _) = self.plan(user_id, day, delta)?;
        self.store.put_daily_stat(&stat)?;
        debug!(
            user_id,
            date = %stat.date,
            score = stat.productivity_score,
            streak = stat.study_streak_days,
            "recorded daily activity"
        );
        Ok(stat)
    }

    /// Streak of the most recent record within the lookback window, or 0.
    pub fn current_streak(&self, user_id: &str, today: NaiveDate) -> Result<u32> {
        let from = today
            .checked_sub_days(Days::new(u64::from(self.lookback_days)))
            .unwrap_or(NaiveDate::MIN);
        let recent = self.store.daily_stats(user_id, Some(from), Some(today))?;
        Ok(recent
            .iter()
            .max_by_key(|s| s.date)
            .map_or(0, |s| s.study_streak_days))
    }

    /// Longest streak recomputed from the full history (O(days)).
    ///
    /// Counts consecutive pomodoro days. The result is never below any
    /// streak value stored in the history, so it bounds the current streak
    /// even when that streak was built from task-only days.
    pub fn longest_streak(&self, user_id: &str) -> Result<u32> {
        let history = self.store.daily_stats(user_id, None, None)?;
        let stored_max = history.iter().map(|s| s.study_streak_days).max().unwrap_or(0);
        Ok(longest_pomodoro_run(&history).max(stored_max))
    }

    /// Counters for achievement evaluation as of `day`.
    pub fn cumulative_counters(&self, user_id: &str, day: NaiveDate) -> Result<CumulativeCounters> {
        let history = self.store.daily_stats(user_id, None, Some(day))?;
        Ok(CumulativeCounters::from_history(
            &history,
            day,
            self.lookback_days,
        ))
    }

    /// Records between `from` and `to` inclusive, oldest first.
    pub fn history(
        &self,
        user_id: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<DailyStat>> {
        Ok(self.store.daily_stats(user_id, from, to)?)
    }
}
