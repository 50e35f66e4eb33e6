use clap::Subcommand;

use super::{open_engine, resolve_user};

#[derive(Subcommand)]
pub enum DataAction {
    /// Delete every record of the user
    Wipe {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

pub fn run(action: DataAction, user: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        DataAction::Wipe { yes } => {
            let (engine, config) = open_engine()?;
            let user_id = resolve_user(user, &config);
            if !yes {
                return Err(format!("refusing to wipe '{user_id}' without --yes").into());
            }
            engine.wipe_user(&user_id)?;
            println!("wiped data for {user_id}");
        }
    }
    Ok(())
}
