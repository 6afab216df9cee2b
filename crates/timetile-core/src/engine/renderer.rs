//! Turning one interval into display blocks.
//!
//! Free time is cut along a grid anchored at the interval start as long as
//! the pieces stay at least `min_block` long; otherwise it is folded into a
//! neighbouring activity block. Fragments are never split here.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, trace};

use crate::error::{ensure, CoreError, Result};
use crate::timeline::{Interval, PartialBlock, RenderBlock};

/// Break `interval` into contiguous [`RenderBlock`]s, none shorter than
/// `min_block`, with free time split on the `free_time_partition` grid.
///
/// # Errors
/// `InvalidArgument` if either duration is not positive, `min_block` is not
/// shorter than the interval, or `free_time_partition` does not evenly
/// divide the interval.
pub fn render(
    interval: &Interval,
    min_block: Duration,
    free_time_partition: Duration,
) -> Result<Vec<RenderBlock>> {
    ensure(min_block > Duration::zero(), || {
        format!("The minimum block duration must be positive, got {min_block}")
    })?;
    ensure(free_time_partition > Duration::zero(), || {
        format!("The free time partition must be positive, got {free_time_partition}")
    })?;
    ensure(min_block < interval.duration(), || {
        format!(
            "The minimum block duration ({min_block}) must be shorter than the interval ({})",
            interval.duration()
        )
    })?;
    ensure(divides(free_time_partition, interval.duration()), || {
        format!(
            "The free time partition ({free_time_partition}) needs to evenly divide the interval ({})",
            interval.duration()
        )
    })?;

    // Past this point the rest of the interval is too short for its own block.
    let last_block_cutoff = interval.end() - min_block;

    let mut fragments = interval.fragments().iter().peekable();
    let mut grid_line = interval.start();
    let mut block = PartialBlock::starting_at(interval.start());
    let mut blocks = Vec::new();

    while block.end() < last_block_cutoff {
        grid_line = advance_past(grid_line, block.end(), free_time_partition)?;

        if block.duration() >= min_block {
            let (done, next) = block.close();
            trace!(start = %done.start(), end = %done.end(), "emitting block");
            blocks.push(done);
            block = next;
            continue;
        }

        let (block_start, block_end) = (block.start(), block.end());
        // Back to back, or too close for the free time before it to stand alone.
        let adjacent = fragments.next_if(|fragment| {
            fragment.start() == block_end || fragment.start() - block_start < min_block
        });

        block = match adjacent {
            Some(fragment) => block.absorb(fragment.clone())?,
            None => {
                // Free time up to whichever comes first: next fragment or grid line.
                let until = match fragments.peek() {
                    Some(fragment) if fragment.start() < grid_line => fragment.start(),
                    _ => grid_line,
                };
                block.with_end(until)?
            }
        };
    }

    // Too close to the end: everything that is left goes into the last block.
    if block.end() < interval.end() {
        for fragment in fragments {
            block = block.absorb(fragment.clone())?;
        }
        block = block.with_end(interval.end())?;
    }
    blocks.push(block.build());

    debug!(
        start = %interval.start(),
        fragments = interval.fragments().len(),
        blocks = blocks.len(),
        "rendered interval"
    );
    Ok(blocks)
}

/// First grid line strictly after `position`, moving forward from `line`.
fn advance_past(
    mut line: DateTime<Utc>,
    position: DateTime<Utc>,
    spacing: Duration,
) -> Result<DateTime<Utc>> {
    while line <= position {
        line = line.checked_add_signed(spacing).ok_or_else(|| {
            CoreError::invalid(format!("No grid line after {position} is representable"))
        })?;
    }
    Ok(line)
}

/// `whole mod part == 0`; `part` is positive.
fn divides(part: Duration, whole: Duration) -> bool {
    match (part.num_nanoseconds(), whole.num_nanoseconds()) {
        (Some(part), Some(whole)) => whole % part == 0,
        _ => whole.num_milliseconds() % part.num_milliseconds().max(1) == 0,
    }
}
