pub mod achievements;
pub mod activity;
pub mod config;
pub mod data;
pub mod progress;
pub mod stats;

use focusquest_core::storage::Database;
use focusquest_core::{Config, GamificationOrchestrator};

use crate::notifier::ConsoleNotifier;

pub type Engine = GamificationOrchestrator<Database, ConsoleNotifier>;

/// Load the config and open the engine over the on-disk database.
pub fn open_engine() -> Result<(Engine, Config), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let db = Database::open()?;
    tracing::debug!(curve = ?config.level_curve, "opened database");
    let engine = GamificationOrchestrator::with_notifier(db, ConsoleNotifier, &config)?;
    Ok((engine, config))
}

/// `--user` when given, otherwise the configured default user.
pub fn resolve_user(user: Option<&str>, config: &Config) -> String {
    user.map_or_else(|| config.default_user.clone(), str::to_string)
}

pub fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
