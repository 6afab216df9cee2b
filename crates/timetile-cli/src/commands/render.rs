use chrono::{DateTime, Utc};
use clap::Args;
use std::path::PathBuf;
use timetile_core::{render_range, Config};

use super::{minutes, print_json, read_activities, CliResult};

#[derive(Args)]
pub struct RenderArgs {
    /// JSON file holding an array of activities
    #[arg(long)]
    input: PathBuf,
    /// Range start; the range must be whole hours
    #[arg(long)]
    start: DateTime<Utc>,
    #[arg(long)]
    end: DateTime<Utc>,
    /// Shortest block the renderer may emit
    #[arg(long)]
    min_block_minutes: Option<u32>,
    /// Grid spacing for free time
    #[arg(long)]
    free_minutes: Option<u32>,
    /// Merge blocks shorter than this after rendering (0 disables)
    #[arg(long)]
    merge_minutes: Option<u32>,
}

pub fn run(args: RenderArgs) -> CliResult {
    let mut policy = Config::load()?.render_policy();
    if let Some(n) = args.min_block_minutes {
        policy.min_block = minutes(n);
    }
    if let Some(n) = args.free_minutes {
        policy.free_time_partition = minutes(n);
    }
    if let Some(n) = args.merge_minutes {
        policy.merge_min = (n > 0).then(|| minutes(n));
    }

    let activities = read_activities(&args.input)?;
    print_json(&render_range(&activities, args.start, args.end, &policy)?)
}
