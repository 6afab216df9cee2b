//! Fragments: bounded pieces of an activity.
//!
//! An activity can be of any length, which makes "what was happening during
//! this hour" awkward to answer from storage. Cutting every activity into
//! fragments no longer than a fixed maximum means a query around an instant
//! only needs to look one maximum duration back. Each fragment remembers the
//! full bounds of its activity, so a single piece is enough to recover the
//! whole.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::Activity;
use crate::error::{ensure, CoreError, Result};

/// A sub-span of an [`Activity`] that also carries the activity's bounds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "FragmentRecord")]
pub struct Fragment {
    activity_name: String,
    activity_start: DateTime<Utc>,
    activity_end: DateTime<Utc>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl Fragment {
    /// Create a fragment of the activity `(name, activity_start, activity_end)`
    /// covering `[start, end)`.
    ///
    /// # Errors
    /// `InvalidArgument` if the name is empty, either span is empty or
    /// inverted, or the fragment lies outside its activity.
    pub fn new(
        activity_name: impl Into<String>,
        activity_start: DateTime<Utc>,
        activity_end: DateTime<Utc>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Self> {
        let activity_name = activity_name.into();
        ensure(!activity_name.is_empty(), || {
            "Activity name cannot be empty".into()
        })?;
        ensure(activity_start < activity_end, || {
            format!("Activity start ({activity_start}) must be before the activity end ({activity_end})")
        })?;
        ensure(start < end, || {
            format!("Fragment start ({start}) must be before the fragment end ({end})")
        })?;
        ensure(activity_start <= start, || {
            format!("Fragment start ({start}) cannot be earlier than the activity start ({activity_start})")
        })?;
        ensure(end <= activity_end, || {
            format!("Fragment end ({end}) cannot be later than the activity end ({activity_end})")
        })?;

        Ok(Self {
            activity_name,
            activity_start,
            activity_end,
            start,
            end,
        })
    }

    /// A fragment covering the whole activity.
    pub fn whole(activity: &Activity) -> Self {
        Self::of(activity, activity.start(), activity.end())
    }

    /// The part of `activity` in `[start, end)`. Callers guarantee the span is
    /// non-empty and inside the activity.
    pub(crate) fn of(activity: &Activity, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        debug_assert!(start < end);
        debug_assert!(activity.start() <= start && end <= activity.end());
        Self {
            activity_name: activity.name().to_string(),
            activity_start: activity.start(),
            activity_end: activity.end(),
            start,
            end,
        }
    }

    /// Same activity, new fragment bounds. Callers guarantee the bounds.
    fn with_bounds(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        debug_assert!(start < end);
        debug_assert!(self.activity_start <= start && end <= self.activity_end);
        Self {
            activity_name: self.activity_name.clone(),
            activity_start: self.activity_start,
            activity_end: self.activity_end,
            start,
            end,
        }
    }

    pub fn activity_name(&self) -> &str {
        &self.activity_name
    }

    pub fn activity_start(&self) -> DateTime<Utc> {
        self.activity_start
    }

    pub fn activity_end(&self) -> DateTime<Utc> {
        self.activity_end
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

    /// The activity this fragment belongs to.
    pub fn activity(&self) -> Activity {
        Activity::trusted(
            self.activity_name.clone(),
            self.activity_start,
            self.activity_end,
        )
    }

    /// Same `(name, activity_start, activity_end)`.
    pub fn is_same_activity_as(&self, other: &Fragment) -> bool {
        self.activity_name == other.activity_name
            && self.activity_start == other.activity_start
            && self.activity_end == other.activity_end
    }

    /// Whether this fragment belongs to `activity`.
    pub fn belongs_to(&self, activity: &Activity) -> bool {
        self.activity_name == activity.name()
            && self.activity_start == activity.start()
            && self.activity_end == activity.end()
    }

    /// Split into `[start, at)` and `[at, end)`.
    ///
    /// # Errors
    /// `InvalidArgument` unless `start < at < end`.
    pub fn split_at(&self, at: DateTime<Utc>) -> Result<(Fragment, Fragment)> {
        ensure(self.start < at, || {
            format!("Split time ({at}) has to be after the fragment start ({})", self.start)
        })?;
        ensure(at < self.end, || {
            format!("Split time ({at}) has to be before the fragment end ({})", self.end)
        })?;
        Ok((self.with_bounds(self.start, at), self.with_bounds(at, self.end)))
    }

    /// Move the start up to `start` if the fragment begins earlier.
    ///
    /// # Errors
    /// `InvalidArgument` if nothing of the fragment is left.
    pub fn clip_start(&self, start: DateTime<Utc>) -> Result<Fragment> {
        if self.start >= start {
            return Ok(self.clone());
        }
        ensure(start < self.end, || {
            format!("Clipping at {start} leaves nothing of a fragment ending at {}", self.end)
        })?;
        Ok(self.with_bounds(start, self.end))
    }

    /// Move the end back to `end` if the fragment finishes later.
    ///
    /// # Errors
    /// `InvalidArgument` if nothing of the fragment is left.
    pub fn clip_end(&self, end: DateTime<Utc>) -> Result<Fragment> {
        if self.end <= end {
            return Ok(self.clone());
        }
        ensure(self.start < end, || {
            format!("Clipping at {end} leaves nothing of a fragment starting at {}", self.start)
        })?;
        Ok(self.with_bounds(self.start, end))
    }

    /// Narrow to the intersection with `[start, end)`, keeping the activity.
    /// A fragment already inside the bounds comes back unchanged.
    ///
    /// # Errors
    /// `InvalidArgument` if the fragment does not intersect the range.
    pub fn clip(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Fragment> {
        self.clip_start(start)?.clip_end(end)
    }

    /// One fragment spanning `[first.start, second.end)`, absorbing any gap
    /// between the two.
    ///
    /// # Errors
    /// `InvalidArgument` if the fragments belong to different activities or
    /// `first` ends after `second` starts.
    pub fn merge_and_interpolate(first: &Fragment, second: &Fragment) -> Result<Fragment> {
        ensure(first.is_same_activity_as(second), || {
            format!("Merged fragments need to belong to the same activity. First={first:?} Second={second:?}")
        })?;
        ensure(first.end <= second.start, || {
            format!("The first fragment cannot end after the second one starts. First={first:?} Second={second:?}")
        })?;
        Ok(first.with_bounds(first.start, second.end))
    }
}

impl From<&Activity> for Fragment {
    fn from(activity: &Activity) -> Self {
        Fragment::whole(activity)
    }
}

#[derive(Deserialize)]
struct FragmentRecord {
    activity_name: String,
    activity_start: DateTime<Utc>,
    activity_end: DateTime<Utc>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TryFrom<FragmentRecord> for Fragment {
    type Error = CoreError;

    fn try_from(record: FragmentRecord) -> Result<Self> {
        Fragment::new(
            record.activity_name,
            record.activity_start,
            record.activity_end,
            record.start,
            record.end,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2014, 7, 17, 10, 30, 0).unwrap()
    }

    fn mins(n: i64) -> DateTime<Utc> {
        t0() + Duration::minutes(n)
    }

    fn sleeping(start: i64, end: i64) -> Fragment {
        Fragment::new("Sleeping", mins(start), mins(end), mins(start), mins(end)).unwrap()
    }

    #[test]
    fn test_constructor_invariants() {
        assert!(Fragment::new("", mins(0), mins(10), mins(0), mins(10)).is_err());
        assert!(Fragment::new("A", mins(10), mins(0), mins(0), mins(10)).is_err());
        assert!(Fragment::new("A", mins(0), mins(10), mins(5), mins(5)).is_err());
        assert!(Fragment::new("A", mins(0), mins(10), mins(-1), mins(5)).is_err());
        assert!(Fragment::new("A", mins(0), mins(10), mins(5), mins(11)).is_err());
        assert!(Fragment::new("A", mins(0), mins(10), mins(0), mins(10)).is_ok());
    }

    #[test]
    fn test_split_at() {
        let fragment = sleeping(0, 30);
        let (head, tail) = fragment.split_at(mins(10)).unwrap();
        assert_eq!((head.start(), head.end()), (mins(0), mins(10)));
        assert_eq!((tail.start(), tail.end()), (mins(10), mins(30)));
        assert!(head.is_same_activity_as(&tail));
        assert_eq!(head.activity_end(), mins(30));
    }

    #[test]
    fn test_split_at_boundaries_fails() {
        let fragment = sleeping(0, 30);
        assert!(fragment.split_at(mins(0)).is_err());
        assert!(fragment.split_at(mins(30)).is_err());
        assert!(fragment.split_at(mins(45)).is_err());
    }

    #[test]
    fn test_clip_is_noop_inside_bounds() {
        let fragment = sleeping(5, 10);
        assert_eq!(fragment.clip(mins(0), mins(15)).unwrap(), fragment);
    }

    #[test]
    fn test_clip_keeps_activity_identity() {
        let fragment = sleeping(-11, 4);
        let clipped = fragment.clip(mins(0), mins(10)).unwrap();
        assert_eq!((clipped.start(), clipped.end()), (mins(0), mins(4)));
        assert_eq!(clipped.activity_start(), mins(-11));
        assert!(clipped.is_same_activity_as(&fragment));
    }

    #[test]
    fn test_clip_outside_fails() {
        let fragment = sleeping(-20, -16);
        assert!(fragment.clip(mins(0), mins(15)).is_err());
    }

    #[test]
    fn test_merge_and_interpolate() {
        let whole = sleeping(0, 120);
        let (head, rest) = whole.split_at(mins(30)).unwrap();
        let (_, tail) = rest.split_at(mins(90)).unwrap();

        let merged = Fragment::merge_and_interpolate(&head, &tail).unwrap();
        assert_eq!(merged, whole);
        assert!(Fragment::merge_and_interpolate(&tail, &head).is_err());
        assert!(Fragment::merge_and_interpolate(&head, &sleeping(0, 60)).is_err());
    }

    #[test]
    fn test_activity_round_trip() {
        let activity = Activity::new("Eating", mins(0), mins(45)).unwrap();
        let fragment = Fragment::whole(&activity);
        assert_eq!((fragment.start(), fragment.end()), (activity.start(), activity.end()));
        assert!(fragment.belongs_to(&activity));
        assert_eq!(fragment.activity(), activity);
    }
}
