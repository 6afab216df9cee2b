pub mod config;
pub mod empty;
pub mod fragment;
pub mod log;
pub mod partition;
pub mod render;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::path::Path;
use timetile_core::Activity;

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

pub fn minutes(n: u32) -> Duration {
    Duration::minutes(i64::from(n))
}

/// Read a JSON array of activities and sort it by start.
pub fn read_activities(path: &Path) -> Result<Vec<Activity>, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    let mut activities: Vec<Activity> = serde_json::from_str(&content)?;
    activities.sort_by_key(Activity::start);
    Ok(activities)
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn format_time(t: DateTime<Utc>) -> String {
    t.format("%Y-%m-%d %H:%M").to_string()
}
