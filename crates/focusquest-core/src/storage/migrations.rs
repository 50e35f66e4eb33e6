//! Database schema migrations for focusquest.
//!
//! Migrations are versioned and applied automatically when opening the database.
//! The `schema_version` table tracks the current migration version.

use rusqlite::{Connection, Result as SqliteResult};
use tracing::{debug, warn};

/// Current schema version.
///
/// Increment this when adding new migrations.
pub const SCHEMA_VERSION: i32 = 2;

/// Apply all pending migrations to bring the database to the current schema version.
///
/// # Errors
/// Returns an error if migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    create_schema_version_table(conn)?;

    let current_version = get_schema_version(conn);

    if current_version < 1 {
        migrate_v1(conn)?;
    }
    if current_version < 2 {
        migrate_v2(conn)?;
    }

    Ok(())
}

fn create_schema_version_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )
}

/// Get the current schema version from the database.
///
/// Returns 0 if no version is set (initial database).
pub fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row("SELECT version FROM schema_version", [], |row| {
        row.get::<_, i32>(0)
    })
    .unwrap_or_else(|e| {
        if !matches!(e, rusqlite::Error::QueryReturnedNoRows) {
            warn!(error = %e, "failed to read schema_version");
        }
        0
    })
}

fn set_schema_version(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    Ok(())
}

/// Migration v1: daily stats, user progress, achievements and the kv table.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS daily_stats (
            user_id                     TEXT NOT NULL,
            date                        TEXT NOT NULL,
            pomodoro_sessions_completed INTEGER NOT NULL DEFAULT 0,
            total_focus_time_minutes    INTEGER NOT NULL DEFAULT 0,
            tasks_completed             INTEGER NOT NULL DEFAULT 0,
            tasks_created               INTEGER NOT NULL DEFAULT 0,
            productivity_score          INTEGER NOT NULL DEFAULT 0,
            study_streak_days           INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (user_id, date)
        );

        CREATE TABLE IF NOT EXISTS user_progress (
            user_id            TEXT PRIMARY KEY,
            total_xp           INTEGER NOT NULL DEFAULT 0,
            current_level      INTEGER NOT NULL DEFAULT 1,
            xp_to_next_level   INTEGER NOT NULL DEFAULT 0,
            title              TEXT NOT NULL,
            total_achievements INTEGER NOT NULL DEFAULT 0,
            badges             TEXT NOT NULL DEFAULT '[]',
            last_active_date   TEXT,
            created_at         TEXT NOT NULL,
            updated_at         TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS achievements (
            user_id          TEXT NOT NULL,
            achievement_type TEXT NOT NULL,
            title            TEXT NOT NULL,
            description      TEXT NOT NULL DEFAULT '',
            badge_icon       TEXT NOT NULL DEFAULT '',
            xp_reward        INTEGER NOT NULL DEFAULT 0,
            target_value     INTEGER NOT NULL,
            category         TEXT NOT NULL,
            rarity           TEXT NOT NULL,
            current_progress INTEGER NOT NULL DEFAULT 0,
            is_unlocked      INTEGER NOT NULL DEFAULT 0,
            unlocked_at      TEXT,
            PRIMARY KEY (user_id, achievement_type)
        );

        CREATE TABLE IF NOT EXISTS kv (
            key   TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_achievements_unlocked ON achievements(user_id, is_unlocked);",
    )?;

    set_schema_version(&tx, 1)?;
    tx.commit()?;
    debug!("applied schema migration v1");
    Ok(())
}

/// Migration v2: processed activity event ids for idempotent delivery.
fn migrate_v2(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS processed_events (
            user_id     TEXT NOT NULL,
            event_id    TEXT NOT NULL,
            recorded_at TEXT NOT NULL,
            PRIMARY KEY (user_id, event_id)
        );",
    )?;

    set_schema_version(&tx, 2)?;
    tx.commit()?;
    debug!("applied schema migration v2");
    Ok(())
}
