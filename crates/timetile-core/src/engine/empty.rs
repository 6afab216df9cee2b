//! Free time between activities, cut along a fixed grid.
//!
//! ```text
//! reference                start                end
//!     |-------|-------|-----[--|-------|-------|--]----|
//!                           ^first        last^  (clipped)
//! ```
//! Grid lines sit at `reference + k * spacing`; only the first and last
//! pieces can be shorter than `spacing`.

use chrono::{DateTime, Duration, Utc};
use tracing::trace;

use crate::error::{ensure, CoreError, Result};
use crate::timeline::Interval;

/// Cut `[start, end)` into empty intervals on the grid anchored at
/// `reference`.
///
/// # Errors
/// `InvalidArgument` unless `reference <= start < end` and `spacing` is
/// positive.
pub fn make_empty_blocks(
    reference: DateTime<Utc>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    spacing: Duration,
) -> Result<Vec<Interval>> {
    ensure(reference <= start, || {
        format!("The reference time ({reference}) must be earlier or equal to the start ({start})")
    })?;
    ensure(start < end, || {
        format!("The start ({start}) must be earlier than the end ({end})")
    })?;

    let mut blocks = Vec::new();
    let mut block_start = start;
    let mut grid_line = next_grid_line(reference, start, spacing)?;

    while grid_line < end {
        blocks.push(Interval::trusted(block_start, grid_line, Vec::new()));
        block_start = grid_line;
        // No line fits before the end of time, so none falls before `end`.
        let Some(next) = grid_line.checked_add_signed(spacing) else {
            break;
        };
        grid_line = next;
    }
    blocks.push(Interval::trusted(block_start, end, Vec::new()));

    trace!(%start, %end, blocks = blocks.len(), "made empty blocks");
    Ok(blocks)
}

/// The first grid line strictly after `after`, stepping from `reference` by
/// `spacing`.
///
/// # Errors
/// `InvalidArgument` if `spacing` is not positive.
pub fn next_grid_line(
    reference: DateTime<Utc>,
    after: DateTime<Utc>,
    spacing: Duration,
) -> Result<DateTime<Utc>> {
    ensure(spacing > Duration::zero(), || {
        format!("The grid spacing must be positive, got {spacing}")
    })?;

    let mut line = reference;
    while line <= after {
        line = line.checked_add_signed(spacing).ok_or_else(|| {
            CoreError::invalid(format!("No grid line after {after} is representable"))
        })?;
    }
    Ok(line)
}
