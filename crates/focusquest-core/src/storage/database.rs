//! SQLite-backed progress store.
//!
//! Provides persistent storage for:
//! - Per-day activity records
//! - Per-user XP, level and badge state
//! - Per-user achievement rows
//! - Processed activity event ids and a key-value table for engine settings

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::{data_dir, migrations, ProgressCommit, ProgressStore, LEVEL_CURVE_KEY};
use crate::achievements::Achievement;
use crate::activity::{DailyStat, DATE_FORMAT};
use crate::error::StorageError;
use crate::progression::UserProgress;

const DAILY_STAT_COLUMNS: &str = "user_id, date, pomodoro_sessions_completed, total_focus_time_minutes,
     tasks_completed, tasks_created, productivity_score, study_streak_days";

const PROGRESS_COLUMNS: &str = "user_id, total_xp, current_level, xp_to_next_level, title,
     total_achievements, badges, last_active_date, created_at, updated_at";

const ACHIEVEMENT_COLUMNS: &str = "user_id, achievement_type, title, description, badge_icon,
     xp_reward, target_value, category, rarity, current_progress, is_unlocked, unlocked_at";

// === Helper Functions ===

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn corrupt(entity: &'static str, message: impl Into<String>) -> StorageError {
    StorageError::Corrupt {
        entity,
        message: message.into(),
    }
}

fn parse_date(entity: &'static str, value: &str) -> Result<NaiveDate, StorageError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|e| corrupt(entity, format!("bad date '{value}': {e}")))
}

fn parse_timestamp(entity: &'static str, value: &str) -> Result<DateTime<Utc>, StorageError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| corrupt(entity, format!("bad timestamp '{value}': {e}")))
}

/// Raw `daily_stats` row before date parsing.
struct DailyStatRow {
    stat: DailyStat,
    date: String,
}

fn row_to_daily_stat(row: &Row) -> rusqlite::Result<DailyStatRow> {
    Ok(DailyStatRow {
        stat: DailyStat {
            user_id: row.get(0)?,
            date: NaiveDate::MIN,
            pomodoro_sessions_completed: row.get(2)?,
            total_focus_time_minutes: row.get(3)?,
            tasks_completed: row.get(4)?,
            tasks_created: row.get(5)?,
            productivity_score: row.get(6)?,
            study_streak_days: row.get(7)?,
        },
        date: row.get(1)?,
    })
}

impl DailyStatRow {
    fn into_stat(self) -> Result<DailyStat, StorageError> {
        let mut stat = self.stat;
        stat.date = parse_date("daily_stat", &self.date)?;
        Ok(stat)
    }
}

struct ProgressRow {
    user_id: String,
    total_xp: u64,
    current_level: u32,
    xp_to_next_level: u64,
    title: String,
    total_achievements: u32,
    badges: String,
    last_active_date: Option<String>,
    created_at: String,
    updated_at: String,
}

fn row_to_progress(row: &Row) -> rusqlite::Result<ProgressRow> {
    Ok(ProgressRow {
        user_id: row.get(0)?,
        total_xp: row.get(1)?,
        current_level: row.get(2)?,
        xp_to_next_level: row.get(3)?,
        title: row.get(4)?,
        total_achievements: row.get(5)?,
        badges: row.get(6)?,
        last_active_date: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

impl ProgressRow {
    fn into_progress(self) -> Result<UserProgress, StorageError> {
        const ENTITY: &str = "user_progress";
        Ok(UserProgress {
            user_id: self.user_id,
            total_xp: self.total_xp,
            current_level: self.current_level,
            xp_to_next_level: self.xp_to_next_level,
            title: self.title,
            total_achievements: self.total_achievements,
            badges: serde_json::from_str(&self.badges)
                .map_err(|e| corrupt(ENTITY, format!("bad badges: {e}")))?,
            last_active_date: self
                .last_active_date
                .as_deref()
                .map(|d| parse_date(ENTITY, d))
                .transpose()?,
            created_at: parse_timestamp(ENTITY, &self.created_at)?,
            updated_at: parse_timestamp(ENTITY, &self.updated_at)?,
        })
    }
}

struct AchievementRow {
    user_id: String,
    achievement_type: String,
    title: String,
    description: String,
    badge_icon: String,
    xp_reward: u64,
    target_value: u64,
    category: String,
    rarity: String,
    current_progress: u64,
    is_unlocked: bool,
    unlocked_at: Option<String>,
}

fn row_to_achievement(row: &Row) -> rusqlite::Result<AchievementRow> {
    Ok(AchievementRow {
        user_id: row.get(0)?,
        achievement_type: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        badge_icon: row.get(4)?,
        xp_reward: row.get(5)?,
        target_value: row.get(6)?,
        category: row.get(7)?,
        rarity: row.get(8)?,
        current_progress: row.get(9)?,
        is_unlocked: row.get(10)?,
        unlocked_at: row.get(11)?,
    })
}

impl AchievementRow {
    fn into_achievement(self) -> Result<Achievement, StorageError> {
        const ENTITY: &str = "achievement";
        Ok(Achievement {
            user_id: self.user_id,
            achievement_type: self.achievement_type,
            title: self.title,
            description: self.description,
            badge_icon: self.badge_icon,
            xp_reward: self.xp_reward,
            target_value: self.target_value,
            category: self.category.parse().map_err(|e: String| corrupt(ENTITY, e))?,
            rarity: self.rarity.parse().map_err(|e: String| corrupt(ENTITY, e))?,
            current_progress: self.current_progress,
            is_unlocked: self.is_unlocked,
            unlocked_at: self
                .unlocked_at
                .as_deref()
                .map(|t| parse_timestamp(ENTITY, t))
                .transpose()?,
        })
    }
}

fn upsert_daily_stat(conn: &Connection, stat: &DailyStat) -> rusqlite::Result<()> {
    conn.execute(
        &format!(
            "INSERT INTO daily_stats ({DAILY_STAT_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(user_id, date) DO UPDATE SET
                pomodoro_sessions_completed = excluded.pomodoro_sessions_completed,
                total_focus_time_minutes = excluded.total_focus_time_minutes,
                tasks_completed = excluded.tasks_completed,
                tasks_created = excluded.tasks_created,
                productivity_score = excluded.productivity_score,
                study_streak_days = excluded.study_streak_days"
        ),
        params![
            stat.user_id,
            format_date(stat.date),
            stat.pomodoro_sessions_completed,
            stat.total_focus_time_minutes,
            stat.tasks_completed,
            stat.tasks_created,
            stat.productivity_score,
            stat.study_streak_days,
        ],
    )?;
    Ok(())
}

fn upsert_progress(conn: &Connection, progress: &UserProgress) -> Result<(), StorageError> {
    let badges = serde_json::to_string(&progress.badges)
        .map_err(|e| StorageError::WriteFailed(format!("cannot encode badges: {e}")))?;
    conn.execute(
        &format!(
            "INSERT INTO user_progress ({PROGRESS_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             ON CONFLICT(user_id) DO UPDATE SET
                total_xp = excluded.total_xp,
                current_level = excluded.current_level,
                xp_to_next_level = excluded.xp_to_next_level,
                title = excluded.title,
                total_achievements = excluded.total_achievements,
                badges = excluded.badges,
                last_active_date = excluded.last_active_date,
                created_at = excluded.created_at,
                updated_at = excluded.updated_at"
        ),
        params![
            progress.user_id,
            progress.total_xp,
            progress.current_level,
            progress.xp_to_next_level,
            progress.title,
            progress.total_achievements,
            badges,
            progress.last_active_date.map(format_date),
            progress.created_at.to_rfc3339(),
            progress.updated_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

fn upsert_achievement(conn: &Connection, row: &Achievement) -> rusqlite::Result<()> {
    conn.execute(
        &format!(
            "INSERT INTO achievements ({ACHIEVEMENT_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
             ON CONFLICT(user_id, achievement_type) DO UPDATE SET
                title = excluded.title,
                description = excluded.description,
                badge_icon = excluded.badge_icon,
                xp_reward = excluded.xp_reward,
                target_value = excluded.target_value,
                category = excluded.category,
                rarity = excluded.rarity,
                current_progress = excluded.current_progress,
                is_unlocked = excluded.is_unlocked,
                unlocked_at = excluded.unlocked_at"
        ),
        params![
            row.user_id,
            row.achievement_type,
            row.title,
            row.description,
            row.badge_icon,
            row.xp_reward,
            row.target_value,
            row.category.as_str(),
            row.rarity.as_str(),
            row.current_progress,
            row.is_unlocked,
            row.unlocked_at.map(|t| t.to_rfc3339()),
        ],
    )?;
    Ok(())
}

fn upsert_setting(conn: &Connection, key: &str, value: &str) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO kv (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![key, value],
    )?;
    Ok(())
}

/// SQLite database for progress storage.
///
/// The connection sits behind a mutex so one store can be shared between
/// threads; each call holds the lock for the duration of its statement or
/// transaction.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open the database at `<data dir>/focusquest.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, StorageError> {
        let dir = data_dir().map_err(|e| StorageError::QueryFailed(e.to_string()))?;
        Self::open_at(&dir.join("focusquest.db"))
    }

    /// Open (or create) a database file at `path`.
    pub fn open_at(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_connection(conn)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, StorageError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StorageError> {
        migrations::migrate(&conn).map_err(|e| StorageError::MigrationFailed(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn.lock().map_err(|_| StorageError::Poisoned)
    }
}

impl ProgressStore for Database {
    fn daily_stat(&self, user_id: &str, date: NaiveDate) -> Result<Option<DailyStat>, StorageError> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                &format!("SELECT {DAILY_STAT_COLUMNS} FROM daily_stats WHERE user_id = ?1 AND date = ?2"),
                params![user_id, format_date(date)],
                row_to_daily_stat,
            )
            .optional()?;
        row.map(DailyStatRow::into_stat).transpose()
    }

    fn put_daily_stat(&self, stat: &DailyStat) -> Result<(), StorageError> {
        let conn = self.lock()?;
        upsert_daily_stat(&conn, stat)?;
        Ok(())
    }

    fn daily_stats(
        &self,
        user_id: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<DailyStat>, StorageError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {DAILY_STAT_COLUMNS} FROM daily_stats
             WHERE user_id = ?1
               AND (?2 IS NULL OR date >= ?2)
               AND (?3 IS NULL OR date <= ?3)
             ORDER BY date ASC"
        ))?;
        let rows = stmt.query_map(
            params![user_id, from.map(format_date), to.map(format_date)],
            row_to_daily_stat,
        )?;

        let mut stats = Vec::new();
        for row in rows {
            stats.push(row?.into_stat()?);
        }
        Ok(stats)
    }

    fn user_progress(&self, user_id: &str) -> Result<Option<UserProgress>, StorageError> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                &format!("SELECT {PROGRESS_COLUMNS} FROM user_progress WHERE user_id = ?1"),
                params![user_id],
                row_to_progress,
            )
            .optional()?;
        row.map(ProgressRow::into_progress).transpose()
    }

    fn put_user_progress(&self, progress: &UserProgress) -> Result<(), StorageError> {
        let conn = self.lock()?;
        upsert_progress(&conn, progress)
    }

    fn user_ids(&self) -> Result<Vec<String>, StorageError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT user_id FROM user_progress ORDER BY user_id")?;
        let ids = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(ids)
    }

    fn achievements(&self, user_id: &str) -> Result<Vec<Achievement>, StorageError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {ACHIEVEMENT_COLUMNS} FROM achievements WHERE user_id = ?1 ORDER BY rowid"
        ))?;
        let rows = stmt.query_map(params![user_id], row_to_achievement)?;

        let mut achievements = Vec::new();
        for row in rows {
            achievements.push(row?.into_achievement()?);
        }
        Ok(achievements)
    }

    fn put_achievements(&self, rows: &[Achievement]) -> Result<(), StorageError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        for row in rows {
            upsert_achievement(&tx, row)?;
        }
        tx.commit()?;
        Ok(())
    }

    fn is_event_recorded(&self, user_id: &str, event_id: Uuid) -> Result<bool, StorageError> {
        let conn = self.lock()?;
        let found = conn
            .query_row(
                "SELECT 1 FROM processed_events WHERE user_id = ?1 AND event_id = ?2",
                params![user_id, event_id.to_string()],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn commit(&self, commit: &ProgressCommit) -> Result<(), StorageError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        if let Some(stat) = &commit.daily_stat {
            upsert_daily_stat(&tx, stat)?;
        }
        upsert_progress(&tx, &commit.progress)?;
        for row in &commit.achievements {
            upsert_achievement(&tx, row)?;
        }
        if let Some(event_id) = commit.event_id {
            tx.execute(
                "INSERT INTO processed_events (user_id, event_id, recorded_at) VALUES (?1, ?2, ?3)",
                params![
                    commit.progress.user_id,
                    event_id.to_string(),
                    commit.progress.updated_at.to_rfc3339(),
                ],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    fn setting(&self, key: &str) -> Result<Option<String>, StorageError> {
        let conn = self.lock()?;
        let value = conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    fn put_setting(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let conn = self.lock()?;
        upsert_setting(&conn, key, value)?;
        Ok(())
    }

    fn commit_level_curve(&self, progress: &[UserProgress], curve: &str) -> Result<(), StorageError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        for record in progress {
            upsert_progress(&tx, record)?;
        }
        upsert_setting(&tx, LEVEL_CURVE_KEY, curve)?;
        tx.commit()?;
        Ok(())
    }

    fn wipe_user(&self, user_id: &str) -> Result<(), StorageError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        for table in ["daily_stats", "user_progress", "achievements", "processed_events"] {
            tx.execute(&format!("DELETE FROM {table} WHERE user_id = ?1"), params![user_id])?;
        }
        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::achievements::{AchievementCatalog, STANDARD_ACHIEVEMENTS};
    use crate::activity::ActivityDelta;
    use crate::progression::LevelCurve;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    #[test]
    fn daily_stat_round_trip_and_range_query() {
        let db = Database::open_memory().unwrap();
        for (d, streak) in [("2024-04-01", 1), ("2024-04-02", 2), ("2024-04-04", 1)] {
            let mut stat = DailyStat::new("u", day(d), streak);
            stat.apply(&ActivityDelta::pomodoro(25));
            db.put_daily_stat(&stat).unwrap();
        }

        let stored = db.daily_stat("u", day("2024-04-02")).unwrap().unwrap();
        assert_eq!(stored.study_streak_days, 2);
        assert_eq!(stored.productivity_score, 8);
        assert!(db.daily_stat("u", day("2024-04-03")).unwrap().is_none());

        let all = db.daily_stats("u", None, None).unwrap();
        assert_eq!(all.len(), 3);
        assert!(all.windows(2).all(|w| w[0].date < w[1].date));

        let ranged = db
            .daily_stats("u", Some(day("2024-04-02")), Some(day("2024-04-03")))
            .unwrap();
        assert_eq!(ranged.len(), 1);
        assert!(db.daily_stats("other", None, None).unwrap().is_empty());
    }

    #[test]
    fn progress_round_trip_keeps_badges_and_dates() {
        let db = Database::open_memory().unwrap();
        let mut progress = UserProgress::new("u", &LevelCurve::default(), Utc::now());
        progress.award_badge("flame_small");
        progress.last_active_date = Some(day("2024-04-02"));
        db.put_user_progress(&progress).unwrap();

        let stored = db.user_progress("u").unwrap().unwrap();
        assert_eq!(stored.badges, progress.badges);
        assert_eq!(stored.last_active_date, progress.last_active_date);
        assert_eq!(stored.created_at.timestamp(), progress.created_at.timestamp());
        assert_eq!(db.user_ids().unwrap(), vec!["u".to_string()]);
    }

    #[test]
    fn saturated_progress_under_steep_curve_is_storable() {
        let db = Database::open_memory().unwrap();
        let curve = LevelCurve::Geometric {
            base: 1_000,
            factor: 10.0,
        };
        let mut progress = UserProgress::new("u", &curve, Utc::now());
        progress.grant_xp(&curve, u64::MAX, Utc::now());
        db.put_user_progress(&progress).unwrap();

        let stored = db.user_progress("u").unwrap().unwrap();
        assert_eq!(stored.total_xp, crate::progression::MAX_XP);
        assert_eq!(stored.current_level, progress.current_level);
    }

    #[test]
    fn achievements_round_trip_in_insert_order() {
        let db = Database::open_memory().unwrap();
        let catalog = AchievementCatalog::standard().unwrap();
        let mut rows: Vec<Achievement> = catalog
            .all()
            .iter()
            .map(|d| Achievement::from_def("u", d))
            .collect();
        db.put_achievements(&rows).unwrap();

        rows[0].unlock(Utc::now());
        db.put_achievements(&rows[..1]).unwrap();

        let stored = db.achievements("u").unwrap();
        assert_eq!(stored.len(), STANDARD_ACHIEVEMENTS.len());
        assert_eq!(stored[0].achievement_type, "FIRST_POMODORO");
        assert!(stored[0].is_unlocked);
        assert!(stored[0].unlocked_at.is_some());
        assert_eq!(stored[1].category, rows[1].category);
    }

    #[test]
    fn commit_writes_everything_and_records_event() {
        let db = Database::open_memory().unwrap();
        let event_id = Uuid::new_v4();
        let mut stat = DailyStat::new("u", day("2024-04-01"), 1);
        stat.apply(&ActivityDelta::pomodoro(25));
        let commit = ProgressCommit {
            daily_stat: Some(stat.clone()),
            progress: UserProgress::new("u", &LevelCurve::default(), Utc::now()),
            achievements: vec![Achievement::from_def("u", &STANDARD_ACHIEVEMENTS[0])],
            event_id: Some(event_id),
        };
        db.commit(&commit).unwrap();

        assert_eq!(db.daily_stat("u", stat.date).unwrap(), Some(stat));
        assert!(db.user_progress("u").unwrap().is_some());
        assert_eq!(db.achievements("u").unwrap().len(), 1);
        assert!(db.is_event_recorded("u", event_id).unwrap());
        assert!(!db.is_event_recorded("other", event_id).unwrap());

        // The same event id again violates the primary key; nothing lands.
        let mut second = commit.clone();
        second.progress.total_xp = 999;
        assert!(db.commit(&second).is_err());
        assert_eq!(db.user_progress("u").unwrap().unwrap().total_xp, 0);
    }

    #[test]
    fn wipe_user_removes_only_that_user() {
        let db = Database::open_memory().unwrap();
        for user in ["a", "b"] {
            db.put_daily_stat(&DailyStat::new(user, day("2024-04-01"), 1)).unwrap();
            db.put_user_progress(&UserProgress::new(user, &LevelCurve::default(), Utc::now()))
                .unwrap();
        }
        db.wipe_user("a").unwrap();
        assert!(db.user_progress("a").unwrap().is_none());
        assert!(db.daily_stats("a", None, None).unwrap().is_empty());
        assert!(db.user_progress("b").unwrap().is_some());
    }

    #[test]
    fn settings_store() {
        let db = Database::open_memory().unwrap();
        assert!(db.setting("level_curve").unwrap().is_none());
        db.put_setting("level_curve", "{}").unwrap();
        assert_eq!(db.setting("level_curve").unwrap().as_deref(), Some("{}"));
    }

    #[test]
    fn level_curve_commit_writes_progress_and_pin() {
        let db = Database::open_memory().unwrap();
        let mut progress = UserProgress::new("u", &LevelCurve::default(), Utc::now());
        db.put_user_progress(&progress).unwrap();

        progress.total_xp = 150;
        progress.rederive(&LevelCurve::default());
        db.commit_level_curve(&[progress.clone()], r#"{"kind":"linear","base":10,"step":10}"#)
            .unwrap();

        assert_eq!(db.user_progress("u").unwrap().unwrap().current_level, 2);
        assert_eq!(
            db.setting(LEVEL_CURVE_KEY).unwrap().as_deref(),
            Some(r#"{"kind":"linear","base":10,"step":10}"#)
        );
    }

    #[test]
    fn file_database_persists_between_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("focusquest.db");
        {
            let db = Database::open_at(&path).unwrap();
            db.put_setting("k", "v").unwrap();
        }
        let db = Database::open_at(&path).unwrap();
        assert_eq!(db.setting("k").unwrap().as_deref(), Some("v"));
    }
}
