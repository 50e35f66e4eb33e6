use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::curve::{title_for_level, LevelCurve, MAX_XP};
use crate::error::{CoreError, Result};
use crate::storage::ProgressStore;

/// Per-user XP, level and badge state.
///
/// `current_level`, `xp_to_next_level` and `title` are always derived from
/// `total_xp` through the level curve in use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProgress {
    pub user_id: String,
    pub total_xp: u64,
    pub current_level: u32,
    pub xp_to_next_level: u64,
    pub title: String,
    pub total_achievements: u32,
    pub badges: BTreeSet<String>,
    pub last_active_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Result of granting XP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelUpResult {
    pub leveled_up: bool,
    pub previous_level: u32,
    pub new_level: u32,
    pub xp_gained: u64,
    /// Title at the new level, only set on a level-up.
    pub new_title: Option<String>,
}

impl LevelUpResult {
    /// Describe the move from `previous_level` to `new_level`.
    pub fn between(previous_level: u32, new_level: u32, xp_gained: u64) -> Self {
        let leveled_up = new_level > previous_level;
        Self {
            leveled_up,
            previous_level,
            new_level,
            xp_gained,
            new_title: leveled_up.then(|| title_for_level(new_level).to_string()),
        }
    }
}

impl UserProgress {
    /// Fresh progress at zero XP.
    pub fn new(user_id: &str, curve: &LevelCurve, now: DateTime<Utc>) -> Self {
        let mut progress = Self {
            user_id: user_id.to_string(),
            total_xp: 0,
            current_level: 1,
            xp_to_next_level: 0,
            title: String::new(),
            total_achievements: 0,
            badges: BTreeSet::new(),
            last_active_date: None,
            created_at: now,
            updated_at: now,
        };
        progress.rederive(curve);
        progress
    }

    /// Recompute the level, next-level gap and title from `total_xp`.
    pub fn rederive(&mut self, curve: &LevelCurve) {
        self.current_level = curve.level_from_xp(self.total_xp);
        self.xp_to_next_level = curve.xp_to_next_level(self.total_xp);
        self.title = title_for_level(self.current_level).to_string();
    }

    /// Add `amount` XP. Never lowers the XP total or the level. The total
    /// saturates at [`MAX_XP`].
    pub fn grant_xp(&mut self, curve: &LevelCurve, amount: u64, now: DateTime<Utc>) -> LevelUpResult {
        let previous_level = self.current_level;
        self.total_xp = self.total_xp.saturating_add(amount).min(MAX_XP);
        self.rederive(curve);
        self.updated_at = now;
        LevelUpResult::between(previous_level, self.current_level, amount)
    }

    /// Add a badge; returns false when it was already held.
    pub fn award_badge(&mut self, badge: &str) -> bool {
        self.badges.insert(badge.to_string())
    }
}

/// Reads and updates [`UserProgress`] through a store.
pub struct ProgressionLedger<'a, S: ProgressStore + ?Sized> {
    store: &'a S,
    curve: &'a LevelCurve,
}

impl<'a, S: ProgressStore + ?Sized> ProgressionLedger<'a, S> {
    pub fn new(store: &'a S, curve: &'a LevelCurve) -> Self {
        Self { store, curve }
    }

    /// Create the user's progress record if it does not exist yet.
    pub fn initialize(&self, user_id: &str, now: DateTime<Utc>) -> Result<UserProgress> {
        if let Some(existing) = self.store.user_progress(user_id)? {
            return Ok(existing);
        }
        let progress = UserProgress::new(user_id, self.curve, now);
        self.store.put_user_progress(&progress)?;
        info!(user_id, "initialized user progress");
        Ok(progress)
    }

    pub fn progress(&self, user_id: &str) -> Result<UserProgress> {
        self.store
            .user_progress(user_id)?
            .ok_or_else(|| CoreError::NotInitialized {
                user_id: user_id.to_string(),
            })
    }

    /// Grant `amount` XP and persist the result.
    pub fn add_xp(&self, user_id: &str, amount: u64) -> Result<LevelUpResult> {
        let mut progress = self.progress(user_id)?;
        let result = progress.grant_xp(self.curve, amount, Utc::now());
        self.store.put_user_progress(&progress)?;
        if result.leveled_up {
            info!(
                user_id,
                from = result.previous_level,
                to = result.new_level,
                "level up"
            );
        }
        Ok(result)
    }

    /// Add a badge to the user's append-only badge set.
    pub fn award_badge(&self, user_id: &str, badge: &str) -> Result<bool> {
        let mut progress = self.progress(user_id)?;
        if !progress.award_badge(badge) {
            return Ok(false);
        }
        progress.updated_at = Utc::now();
        self.store.put_user_progress(&progress)?;
        Ok(true)
    }
}
