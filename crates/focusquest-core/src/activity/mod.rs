//! Daily activity aggregation.
//!
//! One [`DailyStat`] is kept per (user, calendar day). Recording activity
//! increments its counters, recomputes the productivity score from the same
//! record and seeds the streak from the previous day on first activity.

mod aggregator;
mod daily;

pub use aggregator::{longest_pomodoro_run, CumulativeCounters, DailyActivityAggregator};
pub use daily::{parse_day, productivity_score, ActivityDelta, DailyStat, DATE_FORMAT};
