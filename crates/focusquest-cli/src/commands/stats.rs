use chrono::{Local, NaiveDate};
use clap::Subcommand;
use focusquest_core::activity::parse_day;
use focusquest_core::ProgressStore;

use super::{open_engine, print_json, resolve_user};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Today's record
    Today {
        /// Day to show instead of today (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
    },
    /// Daily records, oldest first
    History {
        /// First day (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,
        /// Last day (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
    },
    /// Current and longest streak
    Streak,
    /// Counters achievements are evaluated against
    Counters,
}

fn parse_opt_day(value: Option<&str>) -> Result<Option<NaiveDate>, Box<dyn std::error::Error>> {
    Ok(value.map(parse_day).transpose()?)
}

pub fn run(action: StatsAction, user: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let (engine, config) = open_engine()?;
    let user_id = resolve_user(user, &config);
    let today = Local::now().date_naive();
    let aggregator = engine.aggregator();

    match action {
        StatsAction::Today { date } => {
            let day = parse_opt_day(date.as_deref())?.unwrap_or(today);
            let stat = engine.store().daily_stat(&user_id, day)?;
            print_json(&serde_json::json!({
                "date": day,
                "stat": stat,
            }))?;
        }
        StatsAction::History { from, to } => {
            let from = parse_opt_day(from.as_deref())?;
            let to = parse_opt_day(to.as_deref())?;
            let history = aggregator.history(&user_id, from, to)?;
            print_json(&history)?;
        }
        StatsAction::Streak => {
            let current = aggregator.current_streak(&user_id, today)?;
            let longest = aggregator.longest_streak(&user_id)?;
            print_json(&serde_json::json!({
                "current_streak": current,
                "longest_streak": longest,
            }))?;
        }
        StatsAction::Counters => {
            let counters = aggregator.cumulative_counters(&user_id, today)?;
            print_json(&counters)?;
        }
    }
    Ok(())
}
