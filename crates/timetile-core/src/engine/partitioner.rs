//! Tiling a time range into fixed-size intervals.
//!
//! Activities that cross an interval boundary are cut into one fragment per
//! interval they touch; each fragment keeps the full activity bounds.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, trace};

use crate::error::{ensure, Result};
use crate::timeline::{Activity, Fragment, Interval};

/// Lazy sweep over `[range_start, range_end)` yielding one [`Interval`] per
/// step.
///
/// The only state carried between steps is the index of the first activity
/// not yet fully consumed and the start of the next interval. The cursor
/// moves forward only, so the whole sweep costs
/// O(#activities + #intervals).
#[derive(Debug, Clone)]
pub struct Partitions<'a> {
    activities: &'a [Activity],
    cursor: usize,
    interval_start: DateTime<Utc>,
    range_end: DateTime<Utc>,
    interval_duration: Duration,
}

impl<'a> Partitions<'a> {
    /// Prepare a sweep of `activities`, which must be sorted by start and
    /// non-overlapping.
    ///
    /// Activities ending at or before `range_start` are skipped up front.
    ///
    /// # Errors
    /// `InvalidArgument` if `interval_duration` is not positive,
    /// `range_start > range_end`, or the activities are unsorted or overlap.
    pub fn new(
        activities: &'a [Activity],
        range_start: DateTime<Utc>,
        range_end: DateTime<Utc>,
        interval_duration: Duration,
    ) -> Result<Self> {
        ensure(interval_duration > Duration::zero(), || {
            format!("The interval duration must be positive, got {interval_duration}")
        })?;
        ensure(range_start <= range_end, || {
            format!("The partition start ({range_start}) must not be after the end ({range_end})")
        })?;
        for pair in activities.windows(2) {
            ensure(pair[0].end() <= pair[1].start(), || {
                format!(
                    "Activities must be sorted and non-overlapping: {} ends at {} after {} starts at {}",
                    pair[0].name(),
                    pair[0].end(),
                    pair[1].name(),
                    pair[1].start()
                )
            })?;
        }

        // Sorted and non-overlapping means ends are sorted too.
        let cursor = activities.partition_point(|a| a.end() <= range_start);
        trace!(skipped = cursor, "skipped activities before the range");

        Ok(Self {
            activities,
            cursor,
            interval_start: range_start,
            range_end,
            interval_duration,
        })
    }

    /// Fragments for `[start, end)`, advancing the cursor past every activity
    /// that finishes inside it.
    fn fill(&mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<Fragment> {
        let mut fragments = Vec::new();

        while let Some(activity) = self.activities.get(self.cursor) {
            if activity.start() >= end {
                break;
            }

            let fragment_start = activity.start().max(start);
            let fragment_end = activity.end().min(end);
            fragments.push(Fragment::of(activity, fragment_start, fragment_end));

            if fragment_end < activity.end() {
                // Carries on into the next interval; stay on this activity.
                break;
            }
            self.cursor += 1;
        }

        fragments
    }
}

impl Iterator for Partitions<'_> {
    type Item = Interval;

    fn next(&mut self) -> Option<Interval> {
        if self.interval_start >= self.range_end {
            return None;
        }

        let start = self.interval_start;
        let end = start
            .checked_add_signed(self.interval_duration)
            .map_or(self.range_end, |end| end.min(self.range_end));
        let fragments = self.fill(start, end);
        self.interval_start = end;

        trace!(%start, %end, fragments = fragments.len(), "partitioned interval");
        Some(Interval::trusted(start, end, fragments))
    }
}

/// Split `[range_start, range_end)` into intervals of `interval_duration`,
/// clipping the sorted, non-overlapping `activities` into each of them.
///
/// When the range is not a multiple of the interval duration the last
/// interval is shorter and ends at `range_end`.
///
/// # Errors
/// See [`Partitions::new`].
pub fn partition(
    activities: &[Activity],
    range_start: DateTime<Utc>,
    range_end: DateTime<Utc>,
    interval_duration: Duration,
) -> Result<Vec<Interval>> {
    let intervals: Vec<Interval> =
        Partitions::new(activities, range_start, range_end, interval_duration)?.collect();
    debug!(
        activities = activities.len(),
        intervals = intervals.len(),
        "partitioned activities"
    );
    Ok(intervals)
}

/// Distribute already-stored fragments into intervals, splitting any
/// fragment that crosses an interval boundary.
///
/// Fragments must be sorted, non-overlapping and inside
/// `[range_start, range_end]`.
///
/// # Errors
/// `InvalidArgument` if the interval duration is not positive, the range is
/// inverted, or the fragments are out of order or outside the range.
pub fn partition_fragments(
    fragments: &[Fragment],
    range_start: DateTime<Utc>,
    range_end: DateTime<Utc>,
    interval_duration: Duration,
) -> Result<Vec<Interval>> {
    ensure(interval_duration > Duration::zero(), || {
        format!("The interval duration must be positive, got {interval_duration}")
    })?;
    ensure(range_start <= range_end, || {
        format!("The partition start ({range_start}) must not be after the end ({range_end})")
    })?;
    if let (Some(first), Some(last)) = (fragments.first(), fragments.last()) {
        ensure(first.start() >= range_start, || {
            "The first fragment cannot start before the partitioning period".into()
        })?;
        ensure(last.end() <= range_end, || {
            "The last fragment cannot end after the partitioning period".into()
        })?;
    }
    for pair in fragments.windows(2) {
        ensure(pair[0].end() <= pair[1].start(), || {
            format!("Fragments must be sorted and non-overlapping: {:?} / {:?}", pair[0], pair[1])
        })?;
    }

    let mut intervals = Vec::new();
    let mut remaining = fragments.iter().cloned();
    let mut pending = remaining.next();
    let mut interval_start = range_start;

    while interval_start < range_end {
        let interval_end = interval_start
            .checked_add_signed(interval_duration)
            .map_or(range_end, |end| end.min(range_end));
        let mut inside = Vec::new();

        while let Some(fragment) = pending.take() {
            if fragment.start() >= interval_end {
                pending = Some(fragment);
                break;
            }
            if fragment.end() > interval_end {
                let (head, tail) = fragment.split_at(interval_end)?;
                inside.push(head);
                pending = Some(tail);
                break;
            }
            inside.push(fragment);
            pending = remaining.next();
        }

        intervals.push(Interval::new(interval_start, interval_end, inside)?);
        interval_start = interval_end;
    }

    Ok(intervals)
}
