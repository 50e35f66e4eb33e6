//! In-process progress store, used by tests and embedders that persist
//! elsewhere.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;
use uuid::Uuid;

use super::{ProgressCommit, ProgressStore, LEVEL_CURVE_KEY};
use crate::achievements::Achievement;
use crate::activity::DailyStat;
use crate::error::StorageError;
use crate::progression::UserProgress;

#[derive(Default)]
struct State {
    daily: BTreeMap<(String, NaiveDate), DailyStat>,
    progress: BTreeMap<String, UserProgress>,
    /// Rows per user, in insertion order.
    achievements: HashMap<String, Vec<Achievement>>,
    events: HashSet<(String, Uuid)>,
    settings: HashMap<String, String>,
}

impl State {
    fn upsert_achievement(&mut self, row: &Achievement) {
        let rows = self.achievements.entry(row.user_id.clone()).or_default();
        match rows
            .iter_mut()
            .find(|r| r.achievement_type == row.achievement_type)
        {
            Some(existing) => *existing = row.clone(),
            None => rows.push(row.clone()),
        }
    }
}

/// Thread-safe in-memory [`ProgressStore`].
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, StorageError> {
        self.state.lock().map_err(|_| StorageError::Poisoned)
    }
}

impl ProgressStore for MemoryStore {
    fn daily_stat(&self, user_id: &str, date: NaiveDate) -> Result<Option<DailyStat>, StorageError> {
        Ok(self.lock()?.daily.get(&(user_id.to_string(), date)).cloned())
    }

    fn put_daily_stat(&self, stat: &DailyStat) -> Result<(), StorageError> {
        self.lock()?
            .daily
            .insert((stat.user_id.clone(), stat.date), stat.clone());
        Ok(())
    }

    fn daily_stats(
        &self,
        user_id: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<DailyStat>, StorageError> {
        let state = self.lock()?;
        let lower = (user_id.to_string(), from.unwrap_or(NaiveDate::MIN));
        let upper = (user_id.to_string(), to.unwrap_or(NaiveDate::MAX));
        if lower > upper {
            return Ok(Vec::new());
        }
        Ok(state
            .daily
            .range(lower..=upper)
            .map(|(_, stat)| stat.clone())
            .collect())
    }

    fn user_progress(&self, user_id: &str) -> Result<Option<UserProgress>, StorageError> {
        Ok(self.lock()?.progress.get(user_id).cloned())
    }

    fn put_user_progress(&self, progress: &UserProgress) -> Result<(), StorageError> {
        self.lock()?
            .progress
            .insert(progress.user_id.clone(), progress.clone());
        Ok(())
    }

    fn user_ids(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.lock()?.progress.keys().cloned().collect())
    }

    fn achievements(&self, user_id: &str) -> Result<Vec<Achievement>, StorageError> {
        Ok(self
            .lock()?
            .achievements
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }

    fn put_achievements(&self, rows: &[Achievement]) -> Result<(), StorageError> {
        let mut state = self.lock()?;
        for row in rows {
            state.upsert_achievement(row);
        }
        Ok(())
    }

    fn is_event_recorded(&self, user_id: &str, event_id: Uuid) -> Result<bool, StorageError> {
        Ok(self
            .lock()?
            .events
            .contains(&(user_id.to_string(), event_id)))
    }

    fn commit(&self, commit: &ProgressCommit) -> Result<(), StorageError> {
        let mut state = self.lock()?;
        let user_id = commit.progress.user_id.clone();

        if let Some(event_id) = commit.event_id {
            if state.events.contains(&(user_id.clone(), event_id)) {
                return Err(StorageError::WriteFailed(format!(
                    "event {event_id} already recorded for '{user_id}'"
                )));
            }
            state.events.insert((user_id.clone(), event_id));
        }
        if let Some(stat) = &commit.daily_stat {
            state
                .daily
                .insert((stat.user_id.clone(), stat.date), stat.clone());
        }
        state.progress.insert(user_id, commit.progress.clone());
        for row in &commit.achievements {
            state.upsert_achievement(row);
        }
        Ok(())
    }

    fn setting(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock()?.settings.get(key).cloned())
    }

    fn put_setting(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.lock()?
            .settings
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn commit_level_curve(&self, progress: &[UserProgress], curve: &str) -> Result<(), StorageError> {
        let mut state = self.lock()?;
        for record in progress {
            state.progress.insert(record.user_id.clone(), record.clone());
        }
        state
            .settings
            .insert(LEVEL_CURVE_KEY.to_string(), curve.to_string());
        Ok(())
    }

    fn wipe_user(&self, user_id: &str) -> Result<(), StorageError> {
        let mut state = self.lock()?;
        state.daily.retain(|(user, _), _| user != user_id);
        state.progress.remove(user_id);
        state.achievements.remove(user_id);
        state.events.retain(|(user, _)| user != user_id);
        Ok(())
    }
}
