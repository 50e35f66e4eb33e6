use clap::Subcommand;
use focusquest_core::Config;
use serde_json::json;

use super::print_json;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print one value as JSON
    Get {
        /// Dotted key (e.g. "xp.pomodoro", "streak.lookback_days")
        key: String,
    },
    /// Validate and store a value, then print it
    Set {
        /// Dotted key
        key: String,
        /// New value, parsed as JSON when possible
        value: String,
    },
    /// Print the whole config
    List,
    /// Overwrite the config with defaults and print them
    Reset,
    /// Print the config file location
    Path,
}

fn lookup(config: &Config, key: &str) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    config
        .get(key)
        .ok_or_else(|| format!("unknown key: {key}").into())
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            print_json(&lookup(&config, &key)?)?;
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            tracing::debug!(key = %key, "config updated");
            print_json(&json!({
                "key": key,
                "value": lookup(&config, &key)?,
            }))?;
        }
        ConfigAction::List => print_json(&Config::load()?)?,
        ConfigAction::Reset => {
            let config = Config::default();
            config.save()?;
            print_json(&config)?;
        }
        ConfigAction::Path => print_json(&json!({ "path": Config::path()? }))?,
    }
    Ok(())
}
