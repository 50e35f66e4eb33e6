use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Storage and display format for calendar days.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const POMODORO_POINTS: u64 = 5;
const POMODORO_CAP: u64 = 40;
const FOCUS_MINUTES_PER_POINT: u64 = 8;
const FOCUS_CAP: u64 = 30;
const TASK_POINTS: u64 = 5;
const TASK_CAP: u64 = 30;
const MAX_SCORE: u64 = 100;

/// Parse a `YYYY-MM-DD` day string.
pub fn parse_day(value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| ValidationError::InvalidDate {
        value: value.to_string(),
    })
}

/// Daily productivity score in `0..=100`.
///
/// Pomodoros contribute up to 40 points, focus time up to 30 (one point per
/// 8 minutes) and completed tasks up to 30.
pub fn productivity_score(pomodoros: u32, focus_minutes: u32, tasks_completed: u32) -> u8 {
    let pomodoro_part = (u64::from(pomodoros) * POMODORO_POINTS).min(POMODORO_CAP);
    let focus_part = (u64::from(focus_minutes) / FOCUS_MINUTES_PER_POINT).min(FOCUS_CAP);
    let task_part = (u64::from(tasks_completed) * TASK_POINTS).min(TASK_CAP);

    (pomodoro_part + focus_part + task_part).min(MAX_SCORE) as u8
}

/// Activity to add to a day's record. Counts only ever grow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityDelta {
    #[serde(default)]
    pub pomodoros_completed: u32,
    #[serde(default)]
    pub focus_minutes: u32,
    #[serde(default)]
    pub tasks_completed: u32,
    #[serde(default)]
    pub tasks_created: u32,
}

impl ActivityDelta {
    /// One finished pomodoro with the given focus time.
    pub fn pomodoro(focus_minutes: u32) -> Self {
        Self {
            pomodoros_completed: 1,
            focus_minutes,
            ..Self::default()
        }
    }

    pub fn task_completed() -> Self {
        Self {
            tasks_completed: 1,
            ..Self::default()
        }
    }

    pub fn task_created() -> Self {
        Self {
            tasks_created: 1,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Activity counters for one user on one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStat {
    pub user_id: String,
    pub date: NaiveDate,
    pub pomodoro_sessions_completed: u32,
    pub total_focus_time_minutes: u32,
    pub tasks_completed: u32,
    pub tasks_created: u32,
    /// Derived from the four counters above, never carried between days.
    pub productivity_score: u8,
    pub study_streak_days: u32,
}

impl DailyStat {
    /// An empty record for `date` carrying the seeded streak.
    pub fn new(user_id: &str, date: NaiveDate, study_streak_days: u32) -> Self {
        Self {
            user_id: user_id.to_string(),
            date,
            pomodoro_sessions_completed: 0,
            total_focus_time_minutes: 0,
            tasks_completed: 0,
            tasks_created: 0,
            productivity_score: 0,
            study_streak_days,
        }
    }

    /// Start a new day, continuing the streak when the previous day had one.
    pub fn start_day(user_id: &str, date: NaiveDate, previous: Option<&DailyStat>) -> Self {
        let streak = match previous {
            Some(prev) if prev.study_streak_days > 0 => prev.study_streak_days.saturating_add(1),
            _ => 1,
        };
        Self::new(user_id, date, streak)
    }

    /// Add `delta` to the counters and rederive the score.
    pub fn apply(&mut self, delta: &ActivityDelta) {
        self.pomodoro_sessions_completed = self
            .pomodoro_sessions_completed
            .saturating_add(delta.pomodoros_completed);
        self.total_focus_time_minutes = self
            .total_focus_time_minutes
            .saturating_add(delta.focus_minutes);
        self.tasks_completed = self.tasks_completed.saturating_add(delta.tasks_completed);
        self.tasks_created = self.tasks_created.saturating_add(delta.tasks_created);
        self.recompute_score();
    }

    pub fn recompute_score(&mut self) {
        self.productivity_score = productivity_score(
            self.pomodoro_sessions_completed,
            self.total_focus_time_minutes,
            self.tasks_completed,
        );
    }

    /// Whether the stored score matches the stored counters.
    pub fn score_is_consistent(&self) -> bool {
        self.productivity_score
            == productivity_score(
                self.pomodoro_sessions_completed,
                self.total_focus_time_minutes,
                self.tasks_completed,
            )
    }

    pub fn date_string(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn day(s: &str) -> NaiveDate {
        parse_day(s).unwrap()
    }

    #[test]
    fn single_pomodoro_scores_five() {
        assert_eq!(productivity_score(1, 0, 0), 5);
    }

    #[test]
    fn each_component_is_capped() {
        assert_eq!(productivity_score(100, 0, 0), 40);
        assert_eq!(productivity_score(0, 10_000, 0), 30);
        assert_eq!(productivity_score(0, 0, 100), 30);
        assert_eq!(productivity_score(u32::MAX, u32::MAX, u32::MAX), 100);
    }

    #[test]
    fn focus_minutes_use_integer_division() {
        assert_eq!(productivity_score(0, 7, 0), 0);
        assert_eq!(productivity_score(0, 8, 0), 1);
        assert_eq!(productivity_score(0, 25, 0), 3);
    }

    #[test]
    fn start_day_continues_positive_streak() {
        let mut prev = DailyStat::new("u", day("2024-03-01"), 4);
        prev.apply(&ActivityDelta::pomodoro(25));
        let next = DailyStat::start_day("u", day("2024-03-02"), Some(&prev));
        assert_eq!(next.study_streak_days, 5);
    }

    #[test]
    fn start_day_resets_after_zero_or_missing_streak() {
        let prev = DailyStat::new("u", day("2024-03-01"), 0);
        assert_eq!(
            DailyStat::start_day("u", day("2024-03-02"), Some(&prev)).study_streak_days,
            1
        );
        assert_eq!(
            DailyStat::start_day("u", day("2024-03-02"), None).study_streak_days,
            1
        );
    }

    #[test]
    fn parse_day_rejects_garbage() {
        assert!(parse_day("2024-13-01").is_err());
        assert!(parse_day("yesterday").is_err());
        assert_eq!(day("2024-02-29").format(DATE_FORMAT).to_string(), "2024-02-29");
    }

    proptest! {
        #[test]
        fn score_stays_in_range_and_is_reproducible(
            deltas in proptest::collection::vec((0u32..5, 0u32..120, 0u32..5, 0u32..5), 0..20)
        ) {
            let mut stat = DailyStat::new("u", day("2024-01-01"), 1);
            for (p, f, tc, tn) in deltas {
                stat.apply(&ActivityDelta {
                    pomodoros_completed: p,
                    focus_minutes: f,
                    tasks_completed: tc,
                    tasks_created: tn,
                });
                prop_assert!(stat.productivity_score <= 100);
                prop_assert!(stat.score_is_consistent());
            }
        }
    }
}
