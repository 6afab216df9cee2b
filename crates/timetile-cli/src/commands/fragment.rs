use chrono::{DateTime, Utc};
use clap::Args;
use timetile_core::{fragment, Activity, Config};

use super::{minutes, print_json, CliResult};

#[derive(Args)]
pub struct FragmentArgs {
    /// Activity name
    name: String,
    /// Start time (RFC 3339)
    #[arg(long)]
    start: DateTime<Utc>,
    /// End time (RFC 3339)
    #[arg(long)]
    end: DateTime<Utc>,
    /// Maximum fragment length (defaults to `fragments.max_fragment_minutes`)
    #[arg(long)]
    max_minutes: Option<u32>,
}

pub fn run(args: FragmentArgs) -> CliResult {
    let max = match args.max_minutes {
        Some(n) => minutes(n),
        None => Config::load()?.max_fragment_duration(),
    };
    let activity = Activity::new(args.name, args.start, args.end)?;
    print_json(&fragment(&activity, max)?)
}
