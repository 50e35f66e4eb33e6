mod config;
pub mod database;
mod memory;
pub mod migrations;

pub use config::{Config, NotificationsConfig, StreakConfig, XpConfig};
pub use database::Database;
pub use memory::MemoryStore;

use std::path::PathBuf;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::achievements::Achievement;
use crate::activity::DailyStat;
use crate::error::StorageError;
use crate::progression::UserProgress;

/// Key under which the level curve in use is pinned.
pub const LEVEL_CURVE_KEY: &str = "level_curve";

/// Returns the focusquest data directory.
///
/// `FOCUSQUEST_DATA_DIR` wins when set. Otherwise `~/.config/focusquest/`,
/// or `~/.config/focusquest-dev/` with `FOCUSQUEST_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let dir = match std::env::var_os("FOCUSQUEST_DATA_DIR") {
        Some(explicit) => PathBuf::from(explicit),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("FOCUSQUEST_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("focusquest-dev")
            } else {
                base_dir.join("focusquest")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Everything one orchestrated activity writes, applied atomically.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressCommit {
    pub daily_stat: Option<DailyStat>,
    pub progress: UserProgress,
    pub achievements: Vec<Achievement>,
    pub event_id: Option<Uuid>,
}

/// Durable record store for the three entity kinds.
///
/// Implementations must be immediately consistent: a read after a
/// successful write observes it. Multi-row writes are all-or-nothing.
pub trait ProgressStore: Send + Sync {
    fn daily_stat(&self, user_id: &str, date: NaiveDate) -> Result<Option<DailyStat>, StorageError>;

    fn put_daily_stat(&self, stat: &DailyStat) -> Result<(), StorageError>;

    /// Records within the inclusive date bounds, oldest first.
    fn daily_stats(
        &self,
        user_id: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<DailyStat>, StorageError>;

    fn user_progress(&self, user_id: &str) -> Result<Option<UserProgress>, StorageError>;

    fn put_user_progress(&self, progress: &UserProgress) -> Result<(), StorageError>;

    /// Every user with a progress record.
    fn user_ids(&self) -> Result<Vec<String>, StorageError>;

    fn achievements(&self, user_id: &str) -> Result<Vec<Achievement>, StorageError>;

    /// Upsert achievement rows in one transaction.
    fn put_achievements(&self, rows: &[Achievement]) -> Result<(), StorageError>;

    fn is_event_recorded(&self, user_id: &str, event_id: Uuid) -> Result<bool, StorageError>;

    /// Apply a [`ProgressCommit`] in one transaction.
    fn commit(&self, commit: &ProgressCommit) -> Result<(), StorageError>;

    fn setting(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn put_setting(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Write re-leveled progress records and pin `curve` under
    /// [`LEVEL_CURVE_KEY`] in one transaction.
    fn commit_level_curve(&self, progress: &[UserProgress], curve: &str) -> Result<(), StorageError>;

    /// Delete every record belonging to `user_id`.
    fn wipe_user(&self, user_id: &str) -> Result<(), StorageError>;
}
