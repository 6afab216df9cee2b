//! Integration tests for the fragmentation and rendering pipeline.

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use timetile_core::{
    defragment, fragment, make_empty_blocks, merge_too_small, partition, partition_fragments,
    render, Activity, Fragment, FragmentSource, Interval, MemoryStore, TimeBlock,
};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2014, 7, 17, 10, 30, 0).unwrap()
}

fn mins(n: i64) -> DateTime<Utc> {
    t0() + Duration::minutes(n)
}

/// Sorted, non-overlapping activities from `(gap, length)` pairs, starting
/// an hour before `t0`.
fn lay_out(shape: &[(i64, i64)]) -> Vec<Activity> {
    let mut cursor = -60;
    shape
        .iter()
        .enumerate()
        .map(|(i, &(gap, len))| {
            let start = cursor + gap;
            cursor = start + len;
            Activity::new(format!("a{i}"), mins(start), mins(cursor)).unwrap()
        })
        .collect()
}

fn assert_contiguous<B: TimeBlock>(blocks: &[B], start: DateTime<Utc>, end: DateTime<Utc>) {
    assert_eq!(blocks.first().unwrap().start(), start);
    assert_eq!(blocks.last().unwrap().end(), end);
    for pair in blocks.windows(2) {
        assert_eq!(pair[0].end(), pair[1].start());
    }
}

#[test]
fn test_fragment_ninety_minutes() {
    let code = Activity::new("Code", t0(), mins(90)).unwrap();
    let fragments = fragment(&code, Duration::minutes(60)).unwrap();
    assert_eq!(
        fragments,
        vec![
            Fragment::new("Code", t0(), mins(90), t0(), mins(60)).unwrap(),
            Fragment::new("Code", t0(), mins(90), mins(60), mins(90)).unwrap(),
        ]
    );
}

#[test]
fn test_empty_blocks_twelve_minutes() {
    let blocks = make_empty_blocks(t0(), t0(), mins(12), Duration::minutes(5)).unwrap();
    let spans: Vec<_> = blocks.iter().map(|b| (b.start(), b.end())).collect();
    assert_eq!(
        spans,
        vec![(mins(0), mins(5)), (mins(5), mins(10)), (mins(10), mins(12))]
    );
}

#[test]
fn test_partition_clips_leading_activity() {
    let a = Activity::new("A", mins(-10), mins(10)).unwrap();
    let intervals = partition(&[a], t0(), mins(30), Duration::minutes(30)).unwrap();
    assert_eq!(intervals.len(), 1);
    assert_eq!((intervals[0].start(), intervals[0].end()), (mins(0), mins(30)));
    let fragments = intervals[0].fragments();
    assert_eq!(fragments.len(), 1);
    assert_eq!((fragments[0].start(), fragments[0].end()), (mins(0), mins(10)));
    assert_eq!(fragments[0].activity_start(), mins(-10));
}

#[test]
fn test_defragment_two_contiguous_fragments() {
    let end = t0() + Duration::hours(2);
    let fragments = vec![
        Fragment::new("A", t0(), end, t0(), t0() + Duration::hours(1)).unwrap(),
        Fragment::new("A", t0(), end, t0() + Duration::hours(1), end).unwrap(),
    ];
    assert_eq!(
        defragment(&fragments).unwrap(),
        vec![Activity::new("A", t0(), end).unwrap()]
    );
}

#[test]
fn test_store_to_display_pipeline() {
    let mut store = MemoryStore::open_memory(Duration::minutes(60)).unwrap();
    for activity in lay_out(&[(0, 75), (5, 20), (0, 3), (40, 100)]) {
        store.add_completed_activity(&activity).unwrap();
    }

    // Query, then clip anything that started before the range.
    let (start, end) = (mins(0), mins(120));
    let fragments: Vec<Fragment> = store
        .fragments_in_range(start, end)
        .unwrap()
        .iter()
        .map(|f| f.clip_start(start))
        .collect::<Result<_, _>>()
        .unwrap();

    let intervals = partition_fragments(&fragments, start, end, Duration::minutes(30)).unwrap();
    assert_eq!(intervals.len(), 4);
    for interval in &intervals {
        let blocks = render(interval, Duration::minutes(5), Duration::minutes(10)).unwrap();
        assert_contiguous(&blocks, interval.start(), interval.end());
    }

    let activities = store.activities_in_range(start, end).unwrap();
    let names: Vec<&str> = activities.iter().map(Activity::name).collect();
    assert_eq!(names, vec!["a0", "a1", "a2", "a3"]);
}

proptest! {
    #[test]
    fn prop_fragment_round_trip(
        name in "[a-z]{1,12}",
        offset in -10_000i64..10_000,
        length in 1i64..20_000,
        max in 1i64..10_000,
    ) {
        let start = t0() + Duration::seconds(offset);
        let activity = Activity::new(name, start, start + Duration::seconds(length)).unwrap();
        let fragments = fragment(&activity, Duration::seconds(max)).unwrap();

        prop_assert!(fragments.iter().all(|f| f.duration() <= Duration::seconds(max)));
        prop_assert_eq!(defragment(&fragments).unwrap(), vec![activity]);
    }

    #[test]
    fn prop_partition_covers_range(
        shape in prop::collection::vec((0i64..40, 1i64..120), 0..12),
        tiles in 1i64..8,
    ) {
        let activities = lay_out(&shape);
        let (start, end) = (t0(), mins(30 * tiles));
        let intervals = partition(&activities, start, end, Duration::minutes(30)).unwrap();

        prop_assert_eq!(intervals.len() as i64, tiles);
        assert_contiguous(&intervals, start, end);

        for activity in &activities {
            let pieces: Vec<&Fragment> = intervals
                .iter()
                .flat_map(Interval::fragments)
                .filter(|f| f.belongs_to(activity))
                .collect();
            let (from, to) = (activity.start().max(start), activity.end().min(end));
            if from >= to {
                prop_assert!(pieces.is_empty());
                continue;
            }
            prop_assert_eq!(pieces.first().unwrap().start(), from);
            prop_assert_eq!(pieces.last().unwrap().end(), to);
            for pair in pieces.windows(2) {
                prop_assert_eq!(pair[0].end(), pair[1].start());
            }
        }
    }

    #[test]
    fn prop_render_is_total_and_respects_min_block(
        shape in prop::collection::vec((0i64..15, 1i64..40), 0..10),
    ) {
        let activities = lay_out(&shape);
        let min_block = Duration::minutes(5);
        for interval in partition(&activities, t0(), mins(120), Duration::minutes(30)).unwrap() {
            let blocks = render(&interval, min_block, Duration::minutes(10)).unwrap();

            assert_contiguous(&blocks, interval.start(), interval.end());
            let total = blocks.iter().fold(Duration::zero(), |sum, b| sum + b.duration());
            prop_assert_eq!(total, interval.duration());
            prop_assert!(blocks.iter().all(|b| b.duration() >= min_block));

            let rendered: Vec<Fragment> =
                blocks.iter().flat_map(|b| b.fragments().to_vec()).collect();
            prop_assert_eq!(rendered.as_slice(), interval.fragments());
        }
    }

    #[test]
    fn prop_merge_respects_min_duration(
        pieces in prop::collection::vec((1i64..30, any::<bool>()), 1..20),
        min in 1i64..20,
    ) {
        let mut cursor = 0;
        let blocks: Vec<Interval> = pieces
            .iter()
            .enumerate()
            .map(|(i, &(len, busy))| {
                let (start, end) = (mins(cursor), mins(cursor + len));
                cursor += len;
                if busy {
                    Interval::from_fragment(
                        Fragment::new(format!("b{i}"), start, end, start, end).unwrap(),
                    )
                } else {
                    Interval::empty(start, end).unwrap()
                }
            })
            .collect();
        let fragments_before: Vec<Fragment> =
            blocks.iter().flat_map(|b| b.fragments().to_vec()).collect();

        let merged = merge_too_small(blocks, Duration::minutes(min)).unwrap();

        assert_contiguous(&merged, mins(0), mins(cursor));
        if merged.len() > 1 {
            prop_assert!(merged.iter().all(|b| b.duration() >= Duration::minutes(min)));
        }
        let fragments_after: Vec<Fragment> =
            merged.iter().flat_map(|b| b.fragments().to_vec()).collect();
        prop_assert_eq!(fragments_after, fragments_before);
    }
}
