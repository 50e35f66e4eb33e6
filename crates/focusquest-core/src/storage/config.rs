//! TOML-based application configuration.
//!
//! Stores engine preferences including:
//! - Base XP granted per activity kind
//! - The level curve new databases are pinned to
//! - Streak lookback window
//! - Notification toggle
//!
//! Configuration is stored at `<data dir>/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::error::{ConfigError, Result};
use crate::progression::LevelCurve;

/// Base XP per activity, before achievement rewards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XpConfig {
    #[serde(default = "default_pomodoro_xp")]
    pub pomodoro: u64,
    #[serde(default)]
    pub per_focus_minute: u64,
    #[serde(default = "default_task_completed_xp")]
    pub task_completed: u64,
    #[serde(default = "default_task_created_xp")]
    pub task_created: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakConfig {
    /// How far back the current streak looks for the latest record.
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data dir>/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// User the CLI acts for when `--user` is not given.
    #[serde(default = "default_user")]
    pub default_user: String,
    #[serde(default)]
    pub xp: XpConfig,
    #[serde(default)]
    pub level_curve: LevelCurve,
    #[serde(default)]
    pub streak: StreakConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
}

// Default functions
fn default_pomodoro_xp() -> u64 {
    25
}
fn default_task_completed_xp() -> u64 {
    10
}
fn default_task_created_xp() -> u64 {
    2
}
fn default_lookback_days() -> u32 {
    30
}
fn default_true() -> bool {
    true
}
fn default_user() -> String {
    "default".into()
}

impl Default for XpConfig {
    fn default() -> Self {
        Self {
            pomodoro: default_pomodoro_xp(),
            per_focus_minute: 0,
            task_completed: default_task_completed_xp(),
            task_created: default_task_created_xp(),
        }
    }
}

impl Default for StreakConfig {
    fn default() -> Self {
        Self {
            lookback_days: default_lookback_days(),
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_user: default_user(),
            xp: XpConfig::default(),
            level_curve: LevelCurve::default(),
            streak: StreakConfig::default(),
            notifications: NotificationsConfig::default(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> std::result::Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().map_or(true, |p| p.is_empty()) {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;
            let new_value = match existing {
                serde_json::Value::Bool(_) => serde_json::Value::Bool(
                    value
                        .parse::<bool>()
                        .map_err(|e| invalid(e.to_string()))?,
                ),
                serde_json::Value::Number(_) => {
                    if let Ok(n) = value.parse::<u64>() {
                        serde_json::Value::Number(n.into())
                    } else if let Ok(n) = value.parse::<f64>() {
                        serde_json::Number::from_f64(n)
                            .map(serde_json::Value::Number)
                            .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                    } else {
                        return Err(invalid(format!("cannot parse '{value}' as number")));
                    }
                }
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                    serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                }
                _ => serde_json::Value::String(value.into()),
            };

            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    /// Location of `config.toml` inside the data directory.
    pub fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk, writing and returning the defaults when no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let cfg: Config =
                    toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                        path: path.clone(),
                        message: e.to_string(),
                    })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path,
                message: e.to_string(),
            }
            .into()),
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<()> {
        let path = Self::path()?;
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.default_user.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "default_user".into(),
                message: "must not be empty".into(),
            }
            .into());
        }
        if self.streak.lookback_days == 0 {
            return Err(ConfigError::InvalidValue {
                key: "streak.lookback_days".into(),
                message: "must be at least 1".into(),
            }
            .into());
        }
        self.level_curve.validate()?;
        Ok(())
    }

    /// Get a config value by dot-separated key. Sections come back as
    /// objects.
    pub fn get(&self, key: &str) -> Option<serde_json::Value> {
        let json = serde_json::to_value(self).ok()?;
        Self::get_json_value_by_path(&json, key).cloned()
    }

    /// Set a config value by key and save. Returns error if key is unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// the result does not validate, or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let updated = self.with_value(key, value)?;
        updated.save()?;
        *self = updated;
        Ok(())
    }

    /// Copy of this config with one dotted key changed, validated.
    pub fn with_value(&self, key: &str, value: &str) -> Result<Self> {
        let mut json = serde_json::to_value(self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config =
            serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        updated.validate()?;
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
        assert!(toml_str.contains("kind = \"linear\""));
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str(
            "[xp]\npomodoro = 40\n\n[level_curve]\nkind = \"geometric\"\nbase = 150\nfactor = 1.25\n",
        )
        .unwrap();
        assert_eq!(parsed.xp.pomodoro, 40);
        assert_eq!(parsed.xp.task_completed, 10);
        assert_eq!(parsed.streak.lookback_days, 30);
        assert_eq!(
            parsed.level_curve,
            LevelCurve::Geometric {
                base: 150,
                factor: 1.25
            }
        );
        assert!(parsed.validate().is_ok());
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("xp.pomodoro"), Some(serde_json::json!(25)));
        assert_eq!(cfg.get("notifications.enabled"), Some(serde_json::json!(true)));
        assert_eq!(cfg.get("level_curve.kind"), Some(serde_json::json!("linear")));
        assert_eq!(cfg.get("default_user"), Some(serde_json::json!("default")));
        assert_eq!(cfg.get("streak"), Some(serde_json::json!({ "lookback_days": 30 })));
        assert!(cfg.get("xp.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn with_value_updates_nested_fields() {
        let cfg = Config::default();
        let updated = cfg.with_value("xp.task_completed", "15").unwrap();
        assert_eq!(updated.xp.task_completed, 15);
        let updated = updated.with_value("notifications.enabled", "false").unwrap();
        assert!(!updated.notifications.enabled);
        let updated = updated.with_value("default_user", "ada").unwrap();
        assert_eq!(updated.default_user, "ada");
    }

    #[test]
    fn with_value_rejects_unknown_keys_and_bad_types() {
        let cfg = Config::default();
        assert!(matches!(
            cfg.with_value("xp.bogus", "1"),
            Err(crate::CoreError::Config(ConfigError::UnknownKey(_)))
        ));
        assert!(matches!(
            cfg.with_value("notifications.enabled", "maybe"),
            Err(crate::CoreError::Config(ConfigError::InvalidValue { .. }))
        ));
    }

    #[test]
    fn with_value_validates_result() {
        let cfg = Config::default();
        assert!(cfg.with_value("streak.lookback_days", "0").is_err());
        assert!(matches!(
            cfg.with_value("level_curve.step", "0"),
            Err(crate::CoreError::Catalog(_))
        ));
    }
}
