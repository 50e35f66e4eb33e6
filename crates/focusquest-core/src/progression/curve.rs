//! Level curve and title ladder.
//!
//! `xp_required_for_level(n)` is the XP needed to go from level `n - 1` to
//! level `n`. Level 1 is free. Cumulative requirements are summed from there.

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// Highest reachable level.
pub const MAX_LEVEL: u32 = 999;

/// Ceiling for XP totals and requirements. SQLite integers are signed.
pub const MAX_XP: u64 = i64::MAX as u64;

/// Display titles keyed by the first level that earns them.
const TITLES: &[(u32, &str)] = &[
    (1, "Novice"),
    (5, "Apprentice"),
    (10, "Focused"),
    (20, "Dedicated"),
    (35, "Expert"),
    (50, "Master"),
    (75, "Grandmaster"),
    (100, "Legend"),
];

/// Title for `level`. Every level maps to exactly one title.
pub fn title_for_level(level: u32) -> &'static str {
    TITLES
        .iter()
        .rev()
        .find(|(min_level, _)| level >= *min_level)
        .map_or(TITLES[0].1, |(_, title)| *title)
}

/// Maps accumulated XP to levels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LevelCurve {
    /// Level `n` costs `base + step * (n - 2)`.
    Linear { base: u64, step: u64 },
    /// Level `n` costs `base * factor^(n - 2)`, rounded.
    Geometric { base: u64, factor: f64 },
}

impl Default for LevelCurve {
    fn default() -> Self {
        LevelCurve::Linear {
            base: 100,
            step: 100,
        }
    }
}

impl LevelCurve {
    /// Reject curves that are not strictly increasing.
    pub fn validate(&self) -> Result<(), CatalogError> {
        match *self {
            LevelCurve::Linear { base, step } => {
                if base == 0 {
                    return Err(CatalogError::InvalidLevelCurve(
                        "linear base must be greater than zero".into(),
                    ));
                }
                if step == 0 {
                    return Err(CatalogError::InvalidLevelCurve(
                        "linear step must be greater than zero".into(),
                    ));
                }
            }
            LevelCurve::Geometric { base, factor } => {
                if base == 0 {
                    return Err(CatalogError::InvalidLevelCurve(
                        "geometric base must be greater than zero".into(),
                    ));
                }
                if !factor.is_finite() || factor <= 1.0 {
                    return Err(CatalogError::InvalidLevelCurve(format!(
                        "geometric factor must be a finite number above 1.0, got {factor}"
                    )));
                }
            }
        }

        // Rounding can flatten a geometric curve with a small base.
        for level in 2..MAX_LEVEL {
            let current = self.xp_required_for_level(level);
            let next = self.xp_required_for_level(level + 1);
            if next >= MAX_XP {
                break;
            }
            if next <= current {
                return Err(CatalogError::InvalidLevelCurve(format!(
                    "level {} costs {next} XP, not more than level {level} ({current} XP)",
                    level + 1
                )));
            }
        }
        Ok(())
    }

    /// XP needed to go from `level - 1` to `level`.
    pub fn xp_required_for_level(&self, level: u32) -> u64 {
        if level <= 1 {
            return 0;
        }
        let steps = u64::from(level - 2);
        let cost = match *self {
            LevelCurve::Linear { base, step } => base.saturating_add(step.saturating_mul(steps)),
            LevelCurve::Geometric { base, factor } => {
                let exponent = i32::try_from(steps).unwrap_or(i32::MAX);
                // Float-to-int casts saturate.
                (base as f64 * factor.powi(exponent)).round() as u64
            }
        };
        cost.min(MAX_XP)
    }

    /// Total XP needed to reach `level` from zero.
    pub fn cumulative_xp_for_level(&self, level: u32) -> u64 {
        (2..=level.min(MAX_LEVEL))
            .fold(0u64, |acc, n| acc.saturating_add(self.xp_required_for_level(n)))
            .min(MAX_XP)
    }

    /// Largest level whose cumulative requirement is covered by `total_xp`.
    pub fn level_from_xp(&self, total_xp: u64) -> u32 {
        let mut level = 1;
        let mut cumulative = 0u64;
        while level < MAX_LEVEL {
            let next = cumulative.saturating_add(self.xp_required_for_level(level + 1));
            if next > total_xp || next >= MAX_XP {
                break;
            }
            cumulative = next;
            level += 1;
        }
        level
    }

    /// XP still missing for the next level; 0 at the cap. Never above
    /// [`MAX_XP`].
    pub fn xp_to_next_level(&self, total_xp: u64) -> u64 {
        let level = self.level_from_xp(total_xp);
        if level >= MAX_LEVEL {
            return 0;
        }
        self.cumulative_xp_for_level(level + 1)
            .saturating_sub(total_xp)
    }
}
