use chrono::{DateTime, Utc};
use clap::Subcommand;
use timetile_core::{Activity, Config, FragmentSource, MemoryStore};

use super::{format_time, print_json, CliResult};

#[derive(Subcommand)]
pub enum LogAction {
    /// Record a completed activity
    Add {
        /// Activity name
        name: String,
        /// Start time (RFC 3339)
        #[arg(long)]
        start: DateTime<Utc>,
        /// End time (RFC 3339)
        #[arg(long)]
        end: DateTime<Utc>,
    },
    /// List whole activities touching a range
    List {
        /// Range start (defaults to `display.hours_to_load` before the end)
        #[arg(long)]
        start: Option<DateTime<Utc>>,
        /// Range end (defaults to now)
        #[arg(long)]
        end: Option<DateTime<Utc>>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the stored fragments touching a range
    Fragments {
        #[arg(long)]
        start: Option<DateTime<Utc>>,
        #[arg(long)]
        end: Option<DateTime<Utc>>,
        /// Merge each activity's fragments into one
        #[arg(long)]
        coalesce: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn range(
    config: &Config,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> (DateTime<Utc>, DateTime<Utc>) {
    let end = end.unwrap_or_else(Utc::now);
    let start = start.unwrap_or_else(|| end - config.hours_to_load());
    (start, end)
}

pub fn run(action: LogAction) -> CliResult {
    let config = Config::load()?;
    let mut store = MemoryStore::open(config.max_fragment_duration())?;

    match action {
        LogAction::Add { name, start, end } => {
            let activity = Activity::new(name, start, end)?;
            let added = store.add_completed_activity(&activity)?;
            store.save()?;
            println!(
                "Logged {} ({} - {}) as {} fragment(s)",
                activity.name(),
                format_time(activity.start()),
                format_time(activity.end()),
                added.len()
            );
        }
        LogAction::List { start, end, json } => {
            let (start, end) = range(&config, start, end);
            let activities = store.activities_in_range(start, end)?;
            if json {
                print_json(&activities)?;
            } else if activities.is_empty() {
                println!("No activities.");
            } else {
                for activity in &activities {
                    println!(
                        "{} - {}  {} ({} min)",
                        format_time(activity.start()),
                        format_time(activity.end()),
                        activity.name(),
                        activity.duration().num_minutes()
                    );
                }
            }
        }
        LogAction::Fragments {
            start,
            end,
            coalesce,
            json,
        } => {
            let (start, end) = range(&config, start, end);
            let fragments = if coalesce {
                store.coalesced_in_range(start, end)?
            } else {
                store.fragments_in_range(start, end)?
            };
            if json {
                print_json(&fragments)?;
            } else {
                for fragment in &fragments {
                    println!(
                        "{} - {}  {} (of {} - {})",
                        format_time(fragment.start()),
                        format_time(fragment.end()),
                        fragment.activity_name(),
                        format_time(fragment.activity_start()),
                        format_time(fragment.activity_end())
                    );
                }
            }
        }
    }
    Ok(())
}
