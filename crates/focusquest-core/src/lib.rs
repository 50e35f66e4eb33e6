//! # FocusQuest Core Library
//!
//! This library turns raw daily activity (finished pomodoros, completed and
//! created tasks, focus minutes) into a productivity score, a streak, an XP
//! and level ladder, and a catalog of achievements that unlock exactly once.
//! Every operation is also available through the standalone CLI binary.
//!
//! ## Architecture
//!
//! - **Activity**: one [`DailyStat`] per user and calendar day, with a derived
//!   productivity score and a streak seeded from the previous day
//! - **Progression**: a validated [`LevelCurve`] mapping XP to levels and titles
//! - **Achievements**: a static catalog evaluated against cumulative counters
//! - **Orchestrator**: composes the three per activity event and commits the
//!   whole transition atomically
//! - **Storage**: SQLite persistence and TOML-based configuration
//!
//! ## Key Components
//!
//! - [`GamificationOrchestrator`]: entry point for activity events
//! - [`Database`]: durable [`ProgressStore`]
//! - [`Config`]: application configuration management
//! - [`Notifier`]: trait for level-up and unlock notifications

pub mod achievements;
pub mod activity;
pub mod error;
pub mod events;
pub mod notify;
pub mod orchestrator;
pub mod progression;
pub mod storage;

pub use achievements::{
    Achievement, AchievementCatalog, AchievementCategory, AchievementFilter, AchievementStats,
    Rarity,
};
pub use activity::{ActivityDelta, CumulativeCounters, DailyStat};
pub use error::{
    CatalogError, ConfigError, CoreError, NotifyError, Result, StorageError, ValidationError,
};
pub use events::ProgressEvent;
pub use notify::{LogNotifier, NoopNotifier, Notifier};
pub use orchestrator::{
    ActivityEvent, ActivityKind, ActivityReport, GamificationOrchestrator, Outcome,
};
pub use progression::{LevelCurve, LevelUpResult, UserProgress};
pub use storage::{Config, Database, MemoryStore, ProgressCommit, ProgressStore};
