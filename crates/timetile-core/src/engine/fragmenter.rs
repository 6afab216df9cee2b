//! Splitting activities into fragments and putting them back together.
//!
//! ```text
//! activity   [----------]
//! fragments  [---|---|--]     every piece but the last is exactly max long
//! ```

use chrono::Duration;
use tracing::{debug, trace};

use crate::error::{ensure, CoreError, Result};
use crate::timeline::{Activity, Fragment};

/// Chop `activity` into fragments no longer than `max_duration`.
///
/// Fragments are laid out from the activity start; all but the last are
/// exactly `max_duration` long and the last covers the remainder. An
/// activity no longer than `max_duration` comes back as a single fragment.
///
/// # Errors
/// `InvalidArgument` if `max_duration` is not positive.
pub fn fragment(activity: &Activity, max_duration: Duration) -> Result<Vec<Fragment>> {
    ensure(max_duration > Duration::zero(), || {
        format!("The maximum fragment duration must be positive, got {max_duration}")
    })?;

    let mut fragments = Vec::new();
    let mut fragment_start = activity.start();
    // Fragments starting before this point still have a full max_duration ahead.
    let cutoff = activity
        .end()
        .checked_sub_signed(max_duration)
        .unwrap_or_else(|| activity.start());

    while fragment_start < cutoff {
        let fragment_end = fragment_start + max_duration;
        fragments.push(Fragment::of(activity, fragment_start, fragment_end));
        fragment_start = fragment_end;
    }
    fragments.push(Fragment::of(activity, fragment_start, activity.end()));

    debug!(
        activity = activity.name(),
        count = fragments.len(),
        "fragmented activity"
    );
    Ok(fragments)
}

/// Fragment every activity in order and concatenate the results.
///
/// # Errors
/// `InvalidArgument` if `max_duration` is not positive.
pub fn fragment_all(activities: &[Activity], max_duration: Duration) -> Result<Vec<Fragment>> {
    let mut fragments = Vec::new();
    for activity in activities {
        fragments.extend(fragment(activity, max_duration)?);
    }
    Ok(fragments)
}

/// Rebuild whole activities from fragments sorted by fragment start.
///
/// Consecutive fragments of the same `(name, start, end)` become one
/// activity. The activity bounds carried by the fragments are used, so a
/// lone head or tail fragment (e.g. one clipped by a query range) still
/// yields the complete activity.
///
/// # Errors
/// `InvalidArgument` if the fragments overlap, are out of order, or runs of
/// different activities interleave.
pub fn defragment(fragments: &[Fragment]) -> Result<Vec<Activity>> {
    let activities: Vec<Activity> = runs(fragments)?
        .into_iter()
        .map(|run| run[0].activity())
        .collect();

    debug!(
        fragments = fragments.len(),
        activities = activities.len(),
        "defragmented"
    );
    Ok(activities)
}

/// Collapse each run of fragments of one activity into a single fragment
/// spanning from the run's first start to its last end.
///
/// Unlike [`defragment`] the result keeps fragment bounds, so a run that
/// only covers part of its activity stays partial.
///
/// # Errors
/// Same preconditions as [`defragment`].
pub fn coalesce(fragments: &[Fragment]) -> Result<Vec<Fragment>> {
    runs(fragments)?
        .into_iter()
        .map(|run| match run {
            [single] => Ok(single.clone()),
            [first, .., last] => Fragment::merge_and_interpolate(first, last),
            [] => Err(CoreError::logic("Unexpected empty run while coalescing fragments")),
        })
        .collect()
}

/// Group sorted fragments into runs belonging to one activity each.
fn runs(fragments: &[Fragment]) -> Result<Vec<&[Fragment]>> {
    let mut runs = Vec::new();
    let mut run_start = 0;

    for (i, pair) in fragments.windows(2).enumerate() {
        let (previous, next) = (&pair[0], &pair[1]);
        ensure(next.start() >= previous.end(), || {
            format!(
                "Fragments must be sorted and non-overlapping: {next:?} starts before {previous:?} ends"
            )
        })?;

        if next.is_same_activity_as(previous) {
            trace!(activity = next.activity_name(), "fragment continues current run");
            continue;
        }

        ensure(next.activity_start() >= previous.activity_end(), || {
            format!(
                "Activities must not interleave or overlap: {} starts at {} before {} ends at {}",
                next.activity_name(),
                next.activity_start(),
                previous.activity_name(),
                previous.activity_end()
            )
        })?;
        trace!(activity = previous.activity_name(), "closing run");
        runs.push(&fragments[run_start..=i]);
        run_start = i + 1;
    }

    if run_start < fragments.len() {
        runs.push(&fragments[run_start..]);
    }
    Ok(runs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2014, 7, 17, 10, 30, 0).unwrap()
    }

    fn hours(n: i64) -> DateTime<Utc> {
        t0() + Duration::hours(n)
    }

    fn activity(name: &str, start: i64, end: i64) -> Activity {
        Activity::new(name, hours(start), hours(end)).unwrap()
    }

    fn piece(name: &str, a_start: i64, a_end: i64, start: i64, end: i64) -> Fragment {
        Fragment::new(name, hours(a_start), hours(a_end), hours(start), hours(end)).unwrap()
    }

    #[test]
    fn test_fragment_exactly_max_duration() {
        let code = activity("Code", 0, 1);
        let fragments = fragment(&code, Duration::hours(1)).unwrap();
        assert_eq!(fragments, vec![Fragment::whole(&code)]);
    }

    #[test]
    fn test_fragment_smaller_than_max_duration() {
        let code = Activity::new("Code", t0(), t0() + Duration::minutes(30)).unwrap();
        let fragments = fragment(&code, Duration::hours(1)).unwrap();
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].activity(), code);
        assert_eq!(fragments[0].duration(), code.duration());
    }

    #[test]
    fn test_fragment_even_multiple() {
        let code = activity("Code", 0, 2);
        let fragments = fragment(&code, Duration::hours(1)).unwrap();
        assert_eq!(fragments, vec![piece("Code", 0, 2, 0, 1), piece("Code", 0, 2, 1, 2)]);
    }

    #[test]
    fn test_fragment_uneven_multiple() {
        let code = Activity::new("Code", t0(), t0() + Duration::minutes(90)).unwrap();
        let fragments = fragment(&code, Duration::minutes(60)).unwrap();

        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0].start(), t0());
        assert_eq!(fragments[0].end(), t0() + Duration::minutes(60));
        assert_eq!(fragments[1].start(), t0() + Duration::minutes(60));
        assert_eq!(fragments[1].end(), t0() + Duration::minutes(90));
        for f in &fragments {
            assert_eq!(f.activity_start(), t0());
            assert_eq!(f.activity_end(), t0() + Duration::minutes(90));
        }
    }

    #[test]
    fn test_fragment_rejects_non_positive_max() {
        let code = activity("Code", 0, 2);
        assert!(fragment(&code, Duration::zero()).is_err());
        assert!(fragment(&code, Duration::minutes(-5)).is_err());
    }

    #[test]
    fn test_defragment_single_complete_fragment() {
        let sleep = activity("Sleep", 0, 1);
        assert_eq!(defragment(&[Fragment::whole(&sleep)]).unwrap(), vec![sleep]);
    }

    #[test]
    fn test_defragment_head_or_tail_only() {
        let tail = piece("Walk", 0, 3, 2, 3);
        assert_eq!(defragment(&[tail]).unwrap(), vec![activity("Walk", 0, 3)]);

        let head = piece("Walk", 0, 3, 0, 1);
        assert_eq!(defragment(&[head]).unwrap(), vec![activity("Walk", 0, 3)]);
    }

    #[test]
    fn test_defragment_split_activity() {
        let fragments = vec![piece("A", 0, 2, 0, 1), piece("A", 0, 2, 1, 2)];
        assert_eq!(defragment(&fragments).unwrap(), vec![activity("A", 0, 2)]);
    }

    #[test]
    fn test_defragment_split_with_head_and_tail() {
        let fragments = vec![
            piece("First", 0, 2, 1, 2),
            piece("Second", 5, 7, 5, 6),
            piece("Second", 5, 7, 6, 7),
            piece("Third", 7, 10, 7, 8),
        ];
        assert_eq!(
            defragment(&fragments).unwrap(),
            vec![
                activity("First", 0, 2),
                activity("Second", 5, 7),
                activity("Third", 7, 10)
            ]
        );
    }

    #[test]
    fn test_defragment_same_name_back_to_back() {
        // Two distinct activities that happen to share a name.
        let fragments = vec![piece("Run", 0, 1, 0, 1), piece("Run", 1, 2, 1, 2)];
        assert_eq!(
            defragment(&fragments).unwrap(),
            vec![activity("Run", 0, 1), activity("Run", 1, 2)]
        );
    }

    #[test]
    fn test_defragment_fragmented_and_clipped() {
        // [---][--][-][---]  ->  --[-][--][-][--]-
        let activities = vec![
            activity("A", 0, 3),
            activity("B", 3, 5),
            activity("C", 5, 6),
            activity("D", 6, 9),
        ];
        let mut fragments = fragment_all(&activities, Duration::hours(1)).unwrap();
        fragments.drain(..2);
        fragments.pop();
        assert_eq!(fragments.len(), 6);

        assert_eq!(defragment(&fragments).unwrap(), activities);
    }

    #[test]
    fn test_defragment_rejects_unsorted() {
        let fragments = vec![piece("B", 3, 5, 3, 4), piece("A", 0, 2, 0, 1)];
        assert!(defragment(&fragments).unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_defragment_rejects_interleaving() {
        let fragments = vec![
            piece("A", 0, 4, 0, 1),
            piece("B", 1, 2, 1, 2),
            piece("A", 0, 4, 2, 3),
        ];
        assert!(defragment(&fragments).is_err());
    }

    #[test]
    fn test_defragment_empty() {
        assert!(defragment(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_coalesce_keeps_partial_bounds() {
        let fragments = vec![
            piece("A", 0, 3, 1, 2),
            piece("A", 0, 3, 2, 3),
            piece("B", 3, 6, 3, 4),
        ];
        let coalesced = coalesce(&fragments).unwrap();
        assert_eq!(coalesced, vec![piece("A", 0, 3, 1, 3), piece("B", 3, 6, 3, 4)]);
    }
}
