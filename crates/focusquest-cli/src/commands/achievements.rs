use chrono::Utc;
use clap::Subcommand;
use focusquest_core::{AchievementCategory, AchievementFilter};

use super::{open_engine, print_json, resolve_user};

#[derive(Subcommand)]
pub enum AchievementsAction {
    /// List achievements with progress
    List {
        /// Only unlocked achievements
        #[arg(long, conflicts_with = "locked")]
        unlocked: bool,
        /// Only locked achievements
        #[arg(long)]
        locked: bool,
        /// Filter by category (productivity, consistency, milestone)
        #[arg(long)]
        category: Option<AchievementCategory>,
    },
    /// Unlock counts and completion percentage
    Stats,
    /// Unlock a special achievement (e.g. EARLY_BIRD)
    UnlockSpecial {
        /// Achievement type
        achievement_type: String,
    },
}

pub fn run(action: AchievementsAction, user: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let (engine, config) = open_engine()?;
    let user_id = resolve_user(user, &config);
    engine.ensure_user(&user_id, Utc::now())?;

    match action {
        AchievementsAction::List {
            unlocked,
            locked,
            category,
        } => {
            let filter = AchievementFilter {
                unlocked: match (unlocked, locked) {
                    (true, _) => Some(true),
                    (_, true) => Some(false),
                    _ => None,
                },
                category,
            };
            let rows = engine.achievements().list(&user_id, filter)?;
            let listing: Vec<_> = rows
                .iter()
                .map(|row| {
                    serde_json::json!({
                        "achievement": row,
                        "progress_percentage": row.progress_percentage(),
                    })
                })
                .collect();
            print_json(&listing)?;
        }
        AchievementsAction::Stats => {
            let stats = engine.achievements().stats(&user_id)?;
            print_json(&stats)?;
        }
        AchievementsAction::UnlockSpecial { achievement_type } => {
            let outcome = engine.unlock_special(&user_id, &achievement_type)?;
            print_json(&outcome)?;
        }
    }
    Ok(())
}
