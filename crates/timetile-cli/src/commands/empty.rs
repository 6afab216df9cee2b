use chrono::{DateTime, Utc};
use clap::Args;
use timetile_core::{make_empty_blocks, merge_too_small};

use super::{minutes, print_json, CliResult};

#[derive(Args)]
pub struct EmptyArgs {
    /// Grid anchor; must not be after the start
    #[arg(long)]
    reference: DateTime<Utc>,
    #[arg(long)]
    start: DateTime<Utc>,
    #[arg(long)]
    end: DateTime<Utc>,
    /// Grid spacing
    #[arg(long)]
    spacing_minutes: u32,
    /// Merge pieces shorter than this
    #[arg(long)]
    merge_minutes: Option<u32>,
}

pub fn run(args: EmptyArgs) -> CliResult {
    let mut blocks = make_empty_blocks(
        args.reference,
        args.start,
        args.end,
        minutes(args.spacing_minutes),
    )?;
    if let Some(n) = args.merge_minutes {
        blocks = merge_too_small(blocks, minutes(n))?;
    }
    print_json(&blocks)
}
