//! Tests for per-day interval merging and row construction.

use unlock_engine::merge::merge_day;
use unlock_engine::{build_rows, CellStatus, DayIntervals, TimeInterval, Weekday};

fn iv(start: &str, end: &str) -> TimeInterval {
    TimeInterval::new(start.parse().unwrap(), end.parse().unwrap()).unwrap()
}

#[test]
fn overlapping_fragments_merge() {
    let merged = merge_day(&[iv("10:00", "11:00"), iv("08:00", "09:30"), iv("09:00", "10:00")]);
    assert_eq!(merged, vec![iv("08:00", "11:00")]);
}

#[test]
fn touching_fragments_merge() {
    let merged = merge_day(&[iv("08:00", "09:00"), iv("09:00", "10:00")]);
    assert_eq!(merged, vec![iv("08:00", "10:00")]);
}

#[test]
fn disjoint_fragments_stay_apart() {
    let merged = merge_day(&[iv("13:00", "14:00"), iv("08:00", "09:00")]);
    assert_eq!(merged, vec![iv("08:00", "09:00"), iv("13:00", "14:00")]);
}

#[test]
fn contained_fragment_disappears() {
    let merged = merge_day(&[iv("08:00", "12:00"), iv("09:00", "10:00")]);
    assert_eq!(merged, vec![iv("08:00", "12:00")]);
}

#[test]
fn merging_is_idempotent() {
    let once = merge_day(&[
        iv("07:00", "07:30"),
        iv("07:15", "08:00"),
        iv("12:00", "13:00"),
        iv("22:00", "24:00"),
    ]);
    assert_eq!(merge_day(&once), once);
}

#[test]
fn identical_days_share_rows() {
    let days = DayIntervals::from_days(
        [Weekday::Mon, Weekday::Wed, Weekday::Fri]
            .into_iter()
            .map(|d| (d, vec![iv("08:00", "09:00")])),
    );
    let rows = build_rows(&days);

    assert_eq!(rows.len(), 3);
    assert_eq!(rows[1].interval, iv("08:00", "09:00"));
    assert_eq!(
        rows[1].open_days().collect::<Vec<_>>(),
        vec![Weekday::Mon, Weekday::Wed, Weekday::Fri]
    );
    assert_eq!(rows[0].cells, [CellStatus::Closed; 7]);
}

#[test]
fn full_day_yields_single_row() {
    let days = DayIntervals::from_days([(Weekday::Sun, vec![TimeInterval::FULL_DAY])]);
    let rows = build_rows(&days);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].status(Weekday::Sun), CellStatus::Open);
    assert!(rows[0].is_unlock());
}

#[test]
fn nested_intervals_split_rows_at_every_edge() {
    let days = DayIntervals::from_days([
        (Weekday::Mon, vec![iv("08:00", "12:00")]),
        (Weekday::Tue, vec![iv("09:00", "10:00")]),
    ]);
    let rows: Vec<String> = build_rows(&days)
        .iter()
        .map(|r| r.interval.to_string())
        .collect();
    assert_eq!(
        rows,
        vec![
            "[00:00, 08:00)",
            "[08:00, 09:00)",
            "[09:00, 10:00)",
            "[10:00, 12:00)",
            "[12:00, 24:00)",
        ]
    );
}
