//! Hour-by-hour display model.
//!
//! A display shows one row per hour, each row made of two half-hour
//! intervals rendered side by side. This module wires the engine together
//! for that shape: partition a range into half hours, pair them, render.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::debug;

use crate::engine::{merge_too_small, partition, render};
use crate::error::{ensure, Result};
use crate::timeline::{Activity, Interval, RenderBlock};

/// Length of each interval in an hour row.
pub const HALF_HOUR_MINUTES: i64 = 30;

/// How intervals are turned into blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderPolicy {
    /// Shortest block the renderer may emit.
    pub min_block: Duration,
    /// Grid spacing for free time.
    pub free_time_partition: Duration,
    /// When set, blocks shorter than this are merged after rendering.
    pub merge_min: Option<Duration>,
}

impl Default for RenderPolicy {
    fn default() -> Self {
        Self {
            min_block: Duration::minutes(5),
            free_time_partition: Duration::minutes(10),
            merge_min: None,
        }
    }
}

impl RenderPolicy {
    /// Render one interval, then merge undersized blocks if configured.
    ///
    /// # Errors
    /// Whatever [`render`] or [`merge_too_small`] reject.
    pub fn apply(&self, interval: &Interval) -> Result<Vec<RenderBlock>> {
        let blocks = render(interval, self.min_block, self.free_time_partition)?;
        match self.merge_min {
            Some(min) => merge_too_small(blocks, min),
            None => Ok(blocks),
        }
    }
}

/// One display row: two consecutive half-hour intervals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HourView {
    first_half: Interval,
    second_half: Interval,
}

/// The blocks of one [`HourView`], ready for a display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedHour {
    pub start: DateTime<Utc>,
    pub first_half: Vec<RenderBlock>,
    pub second_half: Vec<RenderBlock>,
}

impl HourView {
    /// # Errors
    /// `InvalidArgument` unless `second_half` starts where `first_half` ends.
    pub fn new(first_half: Interval, second_half: Interval) -> Result<Self> {
        ensure(first_half.end() == second_half.start(), || {
            format!(
                "Hour halves must be adjacent: first ends at {}, second starts at {}",
                first_half.end(),
                second_half.start()
            )
        })?;
        Ok(Self {
            first_half,
            second_half,
        })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.first_half.start()
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.second_half.end()
    }

    pub fn first_half(&self) -> &Interval {
        &self.first_half
    }

    pub fn second_half(&self) -> &Interval {
        &self.second_half
    }

    /// Render both halves with the same policy.
    ///
    /// # Errors
    /// See [`RenderPolicy::apply`].
    pub fn render(&self, policy: &RenderPolicy) -> Result<RenderedHour> {
        Ok(RenderedHour {
            start: self.start(),
            first_half: policy.apply(&self.first_half)?,
            second_half: policy.apply(&self.second_half)?,
        })
    }
}

/// Pair consecutive intervals into hours.
///
/// # Errors
/// `InvalidArgument` if there is an odd number of intervals or a pair is not
/// adjacent.
pub fn hours(intervals: Vec<Interval>) -> Result<Vec<HourView>> {
    ensure(intervals.len() % 2 == 0, || {
        format!(
            "Hours need an even number of intervals, got {}",
            intervals.len()
        )
    })?;

    let mut views = Vec::with_capacity(intervals.len() / 2);
    let mut intervals = intervals.into_iter();
    while let (Some(first), Some(second)) = (intervals.next(), intervals.next()) {
        views.push(HourView::new(first, second)?);
    }
    Ok(views)
}

/// Render `[start, end)` hour by hour.
///
/// `activities` must be sorted and non-overlapping; the range must be a
/// whole number of hours.
///
/// # Errors
/// `InvalidArgument` for a range that is inverted or not whole hours, plus
/// anything the partitioner or renderer rejects.
pub fn render_range(
    activities: &[Activity],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    policy: &RenderPolicy,
) -> Result<Vec<RenderedHour>> {
    ensure(start <= end, || {
        format!("The range start ({start}) must not be after the end ({end})")
    })?;
    let span = end - start;
    ensure(span.num_milliseconds() % 3_600_000 == 0, || {
        format!("The range must cover whole hours, got {span}")
    })?;

    let intervals = partition(activities, start, end, Duration::minutes(HALF_HOUR_MINUTES))?;
    let rendered = hours(intervals)?
        .iter()
        .map(|hour| hour.render(policy))
        .collect::<Result<Vec<_>>>()?;

    debug!(%start, %end, hours = rendered.len(), "rendered range");
    Ok(rendered)
}
