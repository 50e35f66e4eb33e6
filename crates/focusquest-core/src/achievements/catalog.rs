//! The static achievement catalog.
//!
//! Achievement type keys use SCREAMING_SNAKE_CASE and are stable across
//! versions: they are the primary key of every stored achievement row.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::activity::CumulativeCounters;
use crate::error::CatalogError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AchievementCategory {
    Productivity,
    Consistency,
    Milestone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

/// Groups of rules evaluated together, in [`RuleFamily::EVALUATION_ORDER`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleFamily {
    PomodoroCount,
    TaskCount,
    FocusTime,
    StreakLength,
    SameDayCompound,
    /// Unlocked out of band, never by counters.
    Special,
}

impl RuleFamily {
    pub const EVALUATION_ORDER: [RuleFamily; 5] = [
        RuleFamily::PomodoroCount,
        RuleFamily::TaskCount,
        RuleFamily::FocusTime,
        RuleFamily::StreakLength,
        RuleFamily::SameDayCompound,
    ];

    /// Whether locked rows in this family track `current_progress`.
    pub fn tracks_progress(self) -> bool {
        !matches!(self, RuleFamily::SameDayCompound | RuleFamily::Special)
    }
}

/// Which counter an achievement is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    TotalPomodoros,
    TotalTasks,
    TotalFocusMinutes,
    StreakDays,
    PomodorosInOneDay,
    TasksInOneDay,
    Special,
}

impl Rule {
    pub fn family(self) -> RuleFamily {
        match self {
            Rule::TotalPomodoros => RuleFamily::PomodoroCount,
            Rule::TotalTasks => RuleFamily::TaskCount,
            Rule::TotalFocusMinutes => RuleFamily::FocusTime,
            Rule::StreakDays => RuleFamily::StreakLength,
            Rule::PomodorosInOneDay | Rule::TasksInOneDay => RuleFamily::SameDayCompound,
            Rule::Special => RuleFamily::Special,
        }
    }

    /// The counter value this rule compares, `None` for special rules.
    pub fn measure(self, counters: &CumulativeCounters) -> Option<u64> {
        match self {
            Rule::TotalPomodoros => Some(counters.total_pomodoros),
            Rule::TotalTasks => Some(counters.total_tasks),
            Rule::TotalFocusMinutes => Some(counters.total_focus_minutes),
            Rule::StreakDays => Some(counters.current_streak),
            Rule::PomodorosInOneDay => Some(counters.daily_pomodoros),
            Rule::TasksInOneDay => Some(counters.daily_tasks),
            Rule::Special => None,
        }
    }
}

/// One catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AchievementDef {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub badge_icon: &'static str,
    pub xp_reward: u64,
    pub target_value: u64,
    pub category: AchievementCategory,
    pub rarity: Rarity,
    pub rule: Rule,
}

impl AchievementDef {
    pub fn family(&self) -> RuleFamily {
        self.rule.family()
    }
}

macro_rules! def {
    ($id:literal, $title:literal, $desc:literal, $badge:literal, $xp:expr, $target:expr, $cat:ident, $rarity:ident, $rule:ident) => {
        AchievementDef {
            id: $id,
            title: $title,
            description: $desc,
            badge_icon: $badge,
            xp_reward: $xp,
            target_value: $target,
            category: AchievementCategory::$cat,
            rarity: Rarity::$rarity,
            rule: Rule::$rule,
        }
    };
}

/// Built-in achievement definitions.
pub static STANDARD_ACHIEVEMENTS: &[AchievementDef] = &[
    // Pomodoro count
    def!("FIRST_POMODORO", "First Tomato", "Complete your first pomodoro.", "tomato_seed", 10, 1, Productivity, Common, TotalPomodoros),
    def!("POMODORO_10", "In the Zone", "Complete 10 pomodoros.", "tomato_sprout", 50, 10, Productivity, Common, TotalPomodoros),
    def!("POMODORO_50", "Focus Apprentice", "Complete 50 pomodoros.", "tomato_plant", 150, 50, Productivity, Uncommon, TotalPomodoros),
    def!("POMODORO_100", "Centurion", "Complete 100 pomodoros.", "tomato_basket", 300, 100, Milestone, Rare, TotalPomodoros),
    def!("POMODORO_500", "Pomodoro Master", "Complete 500 pomodoros.", "golden_tomato", 1000, 500, Milestone, Legendary, TotalPomodoros),
    // Task count
    def!("FIRST_TASK", "Off the Line", "Complete your first task.", "check_bronze", 10, 1, Productivity, Common, TotalTasks),
    def!("TASKS_10", "Task Tackler", "Complete 10 tasks.", "check_silver", 50, 10, Productivity, Common, TotalTasks),
    def!("TASKS_50", "Getting Things Done", "Complete 50 tasks.", "check_gold", 150, 50, Productivity, Uncommon, TotalTasks),
    def!("TASKS_100", "Task Master", "Complete 100 tasks.", "check_platinum", 300, 100, Milestone, Rare, TotalTasks),
    // Focus time, in minutes
    def!("FOCUS_1H", "Hour of Power", "Accumulate one hour of focus time.", "hourglass_bronze", 25, 60, Productivity, Common, TotalFocusMinutes),
    def!("FOCUS_10H", "Deep Worker", "Accumulate ten hours of focus time.", "hourglass_silver", 100, 600, Productivity, Uncommon, TotalFocusMinutes),
    def!("FOCUS_50H", "Flow State", "Accumulate fifty hours of focus time.", "hourglass_gold", 300, 3000, Milestone, Rare, TotalFocusMinutes),
    def!("FOCUS_100H", "Time Bender", "Accumulate a hundred hours of focus time.", "hourglass_diamond", 500, 6000, Milestone, Epic, TotalFocusMinutes),
    // Streak length, in days
    def!("STREAK_3", "Warming Up", "Stay active three days in a row.", "flame_small", 30, 3, Consistency, Common, StreakDays),
    def!("STREAK_7", "Week Warrior", "Stay active seven days in a row.", "flame_medium", 75, 7, Consistency, Uncommon, StreakDays),
    def!("STREAK_30", "Monthly Devotion", "Stay active thirty days in a row.", "flame_large", 300, 30, Consistency, Epic, StreakDays),
    def!("STREAK_100", "Unstoppable", "Stay active a hundred days in a row.", "flame_eternal", 1000, 100, Consistency, Legendary, StreakDays),
    // Same-day compound
    def!("DAILY_POMODORO_3", "Triple Tomato", "Complete 3 pomodoros in one day.", "tomato_trio", 25, 3, Productivity, Common, PomodorosInOneDay),
    def!("DAILY_POMODORO_8", "Marathon Day", "Complete 8 pomodoros in one day.", "running_shoe", 100, 8, Productivity, Rare, PomodorosInOneDay),
    def!("DAILY_TASKS_10", "Productive Day", "Complete 10 tasks in one day.", "lightning", 75, 10, Productivity, Uncommon, TasksInOneDay),
    // Special, unlocked out of band
    def!("EARLY_BIRD", "Early Bird", "Finish a pomodoro before 7 AM.", "sunrise", 25, 1, Consistency, Uncommon, Special),
    def!("NIGHT_OWL", "Night Owl", "Finish a pomodoro after 10 PM.", "owl", 25, 1, Consistency, Uncommon, Special),
];

/// A validated set of achievement definitions.
#[derive(Debug, Clone)]
pub struct AchievementCatalog {
    defs: Vec<AchievementDef>,
    index: HashMap<&'static str, usize>,
}

impl AchievementCatalog {
    /// Build a catalog, rejecting duplicate ids and zero thresholds.
    pub fn new(defs: Vec<AchievementDef>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(defs.len());
        for (position, def) in defs.iter().enumerate() {
            if def.id.is_empty() {
                return Err(CatalogError::InvalidThreshold {
                    achievement_type: String::new(),
                    message: "achievement type must not be empty".into(),
                });
            }
            if def.target_value == 0 {
                return Err(CatalogError::InvalidThreshold {
                    achievement_type: def.id.to_string(),
                    message: "target value must be at least 1".into(),
                });
            }
            if index.insert(def.id, position).is_some() {
                return Err(CatalogError::DuplicateType(def.id.to_string()));
            }
        }
        Ok(Self { defs, index })
    }

    /// The built-in catalog.
    pub fn standard() -> Result<Self, CatalogError> {
        Self::new(STANDARD_ACHIEVEMENTS.to_vec())
    }

    pub fn get(&self, id: &str) -> Option<&AchievementDef> {
        self.index.get(id).map(|&i| &self.defs[i])
    }

    pub fn all(&self) -> &[AchievementDef] {
        &self.defs
    }

    /// Entries of one family in catalog order.
    pub fn family(&self, family: RuleFamily) -> impl Iterator<Item = &AchievementDef> {
        self.defs.iter().filter(move |d| d.family() == family)
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

impl AchievementCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            AchievementCategory::Productivity => "PRODUCTIVITY",
            AchievementCategory::Consistency => "CONSISTENCY",
            AchievementCategory::Milestone => "MILESTONE",
        }
    }
}

impl fmt::Display for AchievementCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AchievementCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PRODUCTIVITY" => Ok(AchievementCategory::Productivity),
            "CONSISTENCY" => Ok(AchievementCategory::Consistency),
            "MILESTONE" => Ok(AchievementCategory::Milestone),
            other => Err(format!("unknown achievement category '{other}'")),
        }
    }
}

impl Rarity {
    pub fn as_str(self) -> &'static str {
        match self {
            Rarity::Common => "COMMON",
            Rarity::Uncommon => "UNCOMMON",
            Rarity::Rare => "RARE",
            Rarity::Epic => "EPIC",
            Rarity::Legendary => "LEGENDARY",
        }
    }
}

impl FromStr for Rarity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "COMMON" => Ok(Rarity::Common),
            "UNCOMMON" => Ok(Rarity::Uncommon),
            "RARE" => Ok(Rarity::Rare),
            "EPIC" => Ok(Rarity::Epic),
            "LEGENDARY" => Ok(Rarity::Legendary),
            other => Err(format!("unknown rarity '{other}'")),
        }
    }
}
