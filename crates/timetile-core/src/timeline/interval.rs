//! Fixed-size timeline tiles and the fragments that fall into them.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{Fragment, TimeBlock};
use crate::error::{ensure, CoreError, Result};

/// A `[start, end)` tile holding the fragments that lie inside it, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "IntervalRecord")]
pub struct Interval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    fragments: Vec<Fragment>,
}

impl Interval {
    /// Create an interval.
    ///
    /// # Errors
    /// `InvalidArgument` if `start >= end`, or the fragments are not inside
    /// `[start, end)`, ascending and non-overlapping.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>, fragments: Vec<Fragment>) -> Result<Self> {
        ensure(start < end, || {
            format!("Interval start ({start}) must be before the end ({end})")
        })?;
        let mut previous_end = start;
        for fragment in &fragments {
            ensure(fragment.start() >= previous_end, || {
                format!(
                    "Fragment {fragment:?} starts before {previous_end}; fragments must be inside the interval, ascending and non-overlapping"
                )
            })?;
            previous_end = fragment.end();
        }
        ensure(previous_end <= end, || {
            format!("Fragments run until {previous_end}, past the interval end ({end})")
        })?;
        Ok(Self {
            start,
            end,
            fragments,
        })
    }

    /// Built by the engine from fragments it clipped itself.
    pub(crate) fn trusted(start: DateTime<Utc>, end: DateTime<Utc>, fragments: Vec<Fragment>) -> Self {
        debug_assert!(start < end);
        Self {
            start,
            end,
            fragments,
        }
    }

    /// A `[start, end)` interval without fragments.
    ///
    /// # Errors
    /// `InvalidArgument` if `start >= end`.
    pub fn empty(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        Self::new(start, end, Vec::new())
    }

    /// An interval exactly covering one fragment.
    pub fn from_fragment(fragment: Fragment) -> Self {
        Self {
            start: fragment.start(),
            end: fragment.end(),
            fragments: vec![fragment],
        }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn into_fragments(self) -> Vec<Fragment> {
        self.fragments
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

impl TimeBlock for Interval {
    fn start(&self) -> DateTime<Utc> {
        self.start
    }

    fn end(&self) -> DateTime<Utc> {
        self.end
    }

    fn is_free(&self) -> bool {
        self.fragments.is_empty()
    }

    fn extend_with(self, next: Self) -> Result<Self> {
        ensure(self.end == next.start, || {
            format!(
                "Extending interval has to start right after the current one. Current ends {}, next starts {}",
                self.end, next.start
            )
        })?;
        let mut fragments = self.fragments;
        fragments.extend(next.fragments);
        Ok(Self {
            start: self.start,
            end: next.end,
            fragments,
        })
    }
}

#[derive(Deserialize)]
struct IntervalRecord {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    #[serde(default)]
    fragments: Vec<Fragment>,
}

impl TryFrom<IntervalRecord> for Interval {
    type Error = CoreError;

    fn try_from(record: IntervalRecord) -> Result<Self> {
        Interval::new(record.start, record.end, record.fragments)
    }
}
