use chrono::Utc;
use clap::Subcommand;

use super::{open_engine, print_json, resolve_user};

#[derive(Subcommand)]
pub enum ProgressAction {
    /// Show XP, level, title and badges
    Show,
    /// Re-level every user with the level curve from the config
    MigrateCurve,
}

pub fn run(action: ProgressAction, user: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let (mut engine, config) = open_engine()?;

    match action {
        ProgressAction::Show => {
            let user_id = resolve_user(user, &config);
            let progress = engine.ensure_user(&user_id, Utc::now())?;
            print_json(&progress)?;
        }
        ProgressAction::MigrateCurve => {
            let changed = engine.migrate_level_curve(config.level_curve)?;
            print_json(&serde_json::json!({
                "level_curve": engine.curve(),
                "users_releveled": changed,
            }))?;
        }
    }
    Ok(())
}
