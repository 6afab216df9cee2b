use chrono::{DateTime, Utc};
use clap::Args;
use std::path::PathBuf;
use timetile_core::{partition, Config};

use super::{minutes, print_json, read_activities, CliResult};

#[derive(Args)]
pub struct PartitionArgs {
    /// JSON file holding an array of activities
    #[arg(long)]
    input: PathBuf,
    #[arg(long)]
    start: DateTime<Utc>,
    #[arg(long)]
    end: DateTime<Utc>,
    /// Interval length (defaults to `display.interval_minutes`)
    #[arg(long)]
    interval_minutes: Option<u32>,
}

pub fn run(args: PartitionArgs) -> CliResult {
    let interval = match args.interval_minutes {
        Some(n) => minutes(n),
        None => Config::load()?.interval_duration(),
    };
    let activities = read_activities(&args.input)?;
    print_json(&partition(&activities, args.start, args.end, interval)?)
}
