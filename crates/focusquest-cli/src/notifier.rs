use focusquest_core::{Notifier, NotifyError};
use std::io::Write;

/// Prints level-ups and unlocks to stderr.
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    fn write_line(line: &str) -> Result<(), NotifyError> {
        writeln!(std::io::stderr(), "{line}").map_err(|e| NotifyError::DeliveryFailed(e.to_string()))
    }
}

impl Notifier for ConsoleNotifier {
    fn notify_level_up(&self, new_level: u32, xp_gained: u64) -> Result<(), NotifyError> {
        Self::write_line(&format!("Level up! You reached level {new_level} (+{xp_gained} XP)"))
    }

    fn notify_achievement_unlocked(&self, title: &str, xp_reward: u64) -> Result<(), NotifyError> {
        Self::write_line(&format!("Achievement unlocked: {title} (+{xp_reward} XP)"))
    }
}
