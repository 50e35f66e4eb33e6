use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Every progress change an activity produces.
/// UIs render these; the notifier receives them after the commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    XpGained {
        amount: u64,
        activity_label: String,
        at: DateTime<Utc>,
    },
    LeveledUp {
        previous_level: u32,
        new_level: u32,
        title: String,
        /// XP granted by the whole call that crossed the level.
        xp_gained: u64,
        at: DateTime<Utc>,
    },
    AchievementUnlocked {
        achievement_type: String,
        title: String,
        xp_reward: u64,
        at: DateTime<Utc>,
    },
}

impl ProgressEvent {
    pub fn at(&self) -> DateTime<Utc> {
        match self {
            ProgressEvent::XpGained { at, .. }
            | ProgressEvent::LeveledUp { at, .. }
            | ProgressEvent::AchievementUnlocked { at, .. } => *at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_snake_case_tag() {
        let at = Utc::now();
        let event = ProgressEvent::AchievementUnlocked {
            achievement_type: "FIRST_POMODORO".into(),
            title: "First Steps".into(),
            xp_reward: 10,
            at,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "achievement_unlocked");
        assert_eq!(json["xp_reward"], 10);

        let back: ProgressEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back.at(), at);
    }
}
