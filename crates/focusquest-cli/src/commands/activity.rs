use chrono::{DateTime, FixedOffset, Local};
use clap::Subcommand;
use focusquest_core::{ActivityEvent, ActivityKind};
use uuid::Uuid;

use super::{open_engine, print_json, resolve_user};

#[derive(Subcommand)]
pub enum ActivityAction {
    /// Record a finished pomodoro
    Pomodoro {
        /// Focus minutes in the session
        #[arg(long, default_value_t = 25)]
        minutes: u32,
        /// When it finished (RFC 3339, defaults to now)
        #[arg(long)]
        at: Option<String>,
        /// Idempotency key; a repeated id is rejected
        #[arg(long)]
        event_id: Option<Uuid>,
    },
    /// Record a completed task
    TaskDone {
        #[arg(long)]
        at: Option<String>,
        #[arg(long)]
        event_id: Option<Uuid>,
    },
    /// Record a created task
    TaskCreated {
        #[arg(long)]
        at: Option<String>,
        #[arg(long)]
        event_id: Option<Uuid>,
    },
}

fn parse_at(at: Option<&str>) -> Result<DateTime<FixedOffset>, Box<dyn std::error::Error>> {
    match at {
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map_err(|e| format!("invalid --at '{raw}': {e}").into()),
        None => Ok(Local::now().fixed_offset()),
    }
}

pub fn run(action: ActivityAction, user: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let (kind, minutes, at, event_id) = match action {
        ActivityAction::Pomodoro {
            minutes,
            at,
            event_id,
        } => (ActivityKind::PomodoroCompleted, minutes, at, event_id),
        ActivityAction::TaskDone { at, event_id } => (ActivityKind::TaskCompleted, 0, at, event_id),
        ActivityAction::TaskCreated { at, event_id } => (ActivityKind::TaskCreated, 0, at, event_id),
    };

    let event = ActivityEvent {
        kind,
        focus_minutes: minutes,
        occurred_at: parse_at(at.as_deref())?,
        event_id,
    };

    let (engine, config) = open_engine()?;
    let user_id = resolve_user(user, &config);
    let report = engine.record_activity(&user_id, &event)?;
    print_json(&report)
}
