//! Activities: named, contiguous spans of user time.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ensure, CoreError, Result};

/// Something the user did over a period of time.
///
/// Activities can be of any duration. For storage they are cut into
/// [`Fragment`](super::Fragment)s, and for display they are clipped into
/// fixed-size [`Interval`](super::Interval)s.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "ActivityRecord")]
pub struct Activity {
    name: String,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl Activity {
    /// Create a new activity.
    ///
    /// # Errors
    /// `InvalidArgument` if the name is empty or `start >= end`.
    pub fn new(name: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        let name = name.into();
        ensure(!name.is_empty(), || "Activity name cannot be empty".into())?;
        ensure(start < end, || {
            format!("Activity start ({start}) must be before the end ({end})")
        })?;
        Ok(Self { name, start, end })
    }

    /// Rebuild from bounds that were already validated (e.g. by a fragment).
    pub(crate) fn trusted(name: String, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        debug_assert!(!name.is_empty() && start < end);
        Self { name, start, end }
    }

    pub fn name(&self) -> &str {
        &self.name
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

    /// Whether the activity shares any time with `[start, end)`.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start < end && start < self.end
    }
}

#[derive(Deserialize)]
struct ActivityRecord {
    name: String,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TryFrom<ActivityRecord> for Activity {
    type Error = CoreError;

    fn try_from(record: ActivityRecord) -> Result<Self> {
        Activity::new(record.name, record.start, record.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2014, 7, 17, 10, 30, 0).unwrap()
    }

    #[test]
    fn test_new_activity() {
        let activity = Activity::new("Code", t0(), t0() + Duration::minutes(90)).unwrap();
        assert_eq!(activity.name(), "Code");
        assert_eq!(activity.duration(), Duration::minutes(90));
    }

    #[test]
    fn test_rejects_empty_name() {
        let err = Activity::new("", t0(), t0() + Duration::minutes(1)).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_rejects_inverted_or_empty_span() {
        assert!(Activity::new("Code", t0(), t0()).is_err());
        assert!(Activity::new("Code", t0(), t0() - Duration::minutes(1)).is_err());
    }

    #[test]
    fn test_overlaps_is_half_open() {
        let activity = Activity::new("Code", t0(), t0() + Duration::minutes(30)).unwrap();
        assert!(activity.overlaps(t0() - Duration::minutes(5), t0() + Duration::minutes(1)));
        assert!(!activity.overlaps(t0() + Duration::minutes(30), t0() + Duration::minutes(60)));
        assert!(!activity.overlaps(t0() - Duration::minutes(30), t0()));
    }

    #[test]
    fn test_deserialize_validates() {
        let ok = r#"{"name":"Sleep","start":"2014-07-17T10:30:00Z","end":"2014-07-17T11:30:00Z"}"#;
        let activity: Activity = serde_json::from_str(ok).unwrap();
        assert_eq!(activity.duration(), Duration::hours(1));

        let inverted = r#"{"name":"Sleep","start":"2014-07-17T11:30:00Z","end":"2014-07-17T10:30:00Z"}"#;
        assert!(serde_json::from_str::<Activity>(inverted).is_err());
    }
}
