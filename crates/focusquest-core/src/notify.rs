//! Notification collaborator.
//!
//! Notifiers are fire-and-forget: the orchestrator calls them only after a
//! progress transition is committed and logs their failures instead of
//! returning them.

use tracing::{info, warn};

use crate::error::NotifyError;
use crate::events::ProgressEvent;

/// Receives progress notifications. Every hook defaults to a no-op.
pub trait Notifier: Send + Sync {
    fn notify_level_up(&self, _new_level: u32, _xp_gained: u64) -> Result<(), NotifyError> {
        Ok(())
    }

    fn notify_achievement_unlocked(&self, _title: &str, _xp_reward: u64) -> Result<(), NotifyError> {
        Ok(())
    }

    fn notify_xp_gained(&self, _amount: u64, _activity_label: &str) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// Drops every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {}

/// Writes notifications to the `tracing` log at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify_level_up(&self, new_level: u32, xp_gained: u64) -> Result<(), NotifyError> {
        info!(new_level, xp_gained, "level up");
        Ok(())
    }

    fn notify_achievement_unlocked(&self, title: &str, xp_reward: u64) -> Result<(), NotifyError> {
        info!(title, xp_reward, "achievement unlocked");
        Ok(())
    }

    fn notify_xp_gained(&self, amount: u64, activity_label: &str) -> Result<(), NotifyError> {
        info!(amount, activity_label, "xp gained");
        Ok(())
    }
}

impl<N: Notifier + ?Sized> Notifier for Box<N> {
    fn notify_level_up(&self, new_level: u32, xp_gained: u64) -> Result<(), NotifyError> {
        (**self).notify_level_up(new_level, xp_gained)
    }

    fn notify_achievement_unlocked(&self, title: &str, xp_reward: u64) -> Result<(), NotifyError> {
        (**self).notify_achievement_unlocked(title, xp_reward)
    }

    fn notify_xp_gained(&self, amount: u64, activity_label: &str) -> Result<(), NotifyError> {
        (**self).notify_xp_gained(amount, activity_label)
    }
}

/// Deliver one event. Returns how many deliveries failed (0 or 1).
pub fn dispatch<N: Notifier + ?Sized>(notifier: &N, event: &ProgressEvent) -> usize {
    let result = match event {
        ProgressEvent::XpGained {
            amount,
            activity_label,
            ..
        } => notifier.notify_xp_gained(*amount, activity_label),
        ProgressEvent::LeveledUp {
            new_level,
            xp_gained,
            ..
        } => notifier.notify_level_up(*new_level, *xp_gained),
        ProgressEvent::AchievementUnlocked {
            title, xp_reward, ..
        } => notifier.notify_achievement_unlocked(title, *xp_reward),
    };

    match result {
        Ok(()) => 0,
        Err(e) => {
            warn!(error = %e, ?event, "notification failed");
            1
        }
    }
}
