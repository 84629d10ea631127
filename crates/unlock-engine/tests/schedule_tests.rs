//! Tests for end-to-end schedule generation.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use unlock_engine::error::ScheduleError;
use unlock_engine::{
    generate, run, AllDayPolicy, BuildMode, CellStatus, GenerateOptions, MemorySource, Padding,
    RawEvent, TimeInterval, TimeOfDay, Weekday, Window,
};

// ── Helpers ──────────────────────────────────────────────────────────────

const TZ: Tz = chrono_tz::America::New_York;

/// Local wall-clock time in New York during January 2026.
fn local(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    TZ.with_ymd_and_hms(2026, 1, day, hour, minute, 0)
        .unwrap()
        .with_timezone(&Utc)
}

fn timed(day: u32, from: (u32, u32), to: (u32, u32)) -> RawEvent {
    RawEvent::timed("event", local(day, from.0, from.1), local(day, to.0, to.1))
}

/// Week of Sunday 2026-01-04.
fn window(padding: Padding) -> Window {
    Window::containing(NaiveDate::from_ymd_opt(2026, 1, 7).unwrap(), TZ, padding)
}

fn t(s: &str) -> TimeOfDay {
    s.parse().unwrap()
}

fn iv(start: &str, end: &str) -> TimeInterval {
    TimeInterval::new(t(start), t(end)).unwrap()
}

/// Open days of the row covering `start..end`, Sunday first.
fn open_days_of(schedule: &unlock_engine::WeeklySchedule, start: &str, end: &str) -> Vec<Weekday> {
    let row = schedule
        .rows
        .iter()
        .find(|r| r.interval == iv(start, end))
        .unwrap_or_else(|| panic!("no row {}-{}", start, end));
    row.open_days().collect()
}

/// A family week: early Sunday service, school on weekdays, an afternoon
/// activity, a Monday appointment, and evening events on Tuesday and
/// Saturday.
fn busy_week() -> Vec<RawEvent> {
    let mut events = vec![timed(4, (6, 0), (7, 30))];
    for day in 5..=9 {
        events.push(timed(day, (8, 0), (12, 45)));
        events.push(timed(day, (11, 30), (12, 45)));
        events.push(timed(day, (13, 30), (14, 45)));
    }
    events.push(timed(5, (16, 45), (18, 0)));
    events.push(timed(6, (19, 0), (19, 20)));
    events.push(timed(6, (19, 0), (21, 0)));
    events.push(timed(10, (19, 0), (21, 0)));
    events
}

const WEEKDAYS: [Weekday; 5] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
];

// ── Maximal decomposition ────────────────────────────────────────────────

#[test]
fn busy_week_needs_five_unlock_rows() {
    let schedule = generate(&busy_week(), &window(Padding::NONE), &GenerateOptions::default()).unwrap();

    assert_eq!(schedule.mode, BuildMode::Maximal);
    assert_eq!(schedule.unlock_row_count(), 5);
    assert_eq!(schedule.rows.len(), 11, "closed gaps are rows too");

    assert_eq!(open_days_of(&schedule, "06:00", "07:30"), vec![Weekday::Sun]);
    assert_eq!(open_days_of(&schedule, "08:00", "12:45"), WEEKDAYS.to_vec());
    assert_eq!(open_days_of(&schedule, "13:30", "14:45"), WEEKDAYS.to_vec());
    assert_eq!(open_days_of(&schedule, "16:45", "18:00"), vec![Weekday::Mon]);
    assert_eq!(
        open_days_of(&schedule, "19:00", "21:00"),
        vec![Weekday::Tue, Weekday::Sat]
    );
    assert!(schedule.exceptions.is_empty());
    assert!(schedule.warnings.is_empty());
}

#[test]
fn rows_tile_the_whole_day() {
    let schedule = generate(&busy_week(), &window(Padding::NONE), &GenerateOptions::default()).unwrap();

    assert_eq!(schedule.rows.first().unwrap().start(), TimeOfDay::MIDNIGHT);
    assert_eq!(schedule.rows.last().unwrap().end(), TimeOfDay::END_OF_DAY);
    for pair in schedule.rows.windows(2) {
        assert_eq!(pair[0].end(), pair[1].start());
        assert_ne!(pair[0].cells, pair[1].cells);
    }
}

#[test]
fn empty_week_is_one_closed_row() {
    let schedule = generate(&[], &window(Padding::new(10, 10)), &GenerateOptions::default()).unwrap();

    assert_eq!(schedule.rows.len(), 1);
    assert_eq!(schedule.rows[0].interval, TimeInterval::FULL_DAY);
    assert_eq!(schedule.rows[0].cells, [CellStatus::Closed; 7]);
    assert_eq!(schedule.unlock_row_count(), 0);
}

#[test]
fn padding_widens_rows() {
    let events = vec![timed(5, (9, 0), (10, 0))];
    let schedule = generate(&events, &window(Padding::new(15, 5)), &GenerateOptions::default()).unwrap();

    assert_eq!(open_days_of(&schedule, "08:45", "10:05"), vec![Weekday::Mon]);
}

#[test]
fn malformed_events_become_warnings() {
    let mut events = vec![timed(5, (9, 0), (10, 0))];
    events.push(RawEvent::timed("backwards", local(6, 10, 0), local(6, 9, 0)));
    events.push(RawEvent::timed("instant", local(7, 10, 0), local(7, 10, 0)));

    let schedule = generate(&events, &window(Padding::NONE), &GenerateOptions::default()).unwrap();

    assert_eq!(schedule.warnings.len(), 2);
    assert_eq!(schedule.warnings[0].summary, "backwards");
    assert_eq!(schedule.unlock_row_count(), 1);
}

#[test]
fn all_day_policy_controls_full_day_rows() {
    let start = TZ.with_ymd_and_hms(2026, 1, 7, 0, 0, 0).unwrap().with_timezone(&Utc);
    let end = TZ.with_ymd_and_hms(2026, 1, 8, 0, 0, 0).unwrap().with_timezone(&Utc);
    let events = vec![RawEvent::all_day("holiday", start, end)];

    let ignored = generate(&events, &window(Padding::NONE), &GenerateOptions::default()).unwrap();
    assert_eq!(ignored.unlock_row_count(), 0);

    let options = GenerateOptions {
        all_day: AllDayPolicy::FullUnlock,
        ..GenerateOptions::default()
    };
    let unlocked = generate(&events, &window(Padding::new(30, 30)), &options).unwrap();
    assert_eq!(unlocked.rows.len(), 1);
    assert_eq!(unlocked.rows[0].status(Weekday::Wed), CellStatus::Open);
    assert_eq!(unlocked.rows[0].status(Weekday::Tue), CellStatus::Closed);
}

// ── Optimization ─────────────────────────────────────────────────────────

/// Monday has a short gap that padding already closes; Tuesday starts five
/// minutes later than Monday.
fn staggered_mornings() -> Vec<RawEvent> {
    vec![
        timed(5, (8, 0), (10, 0)),
        timed(5, (10, 20), (12, 0)),
        timed(6, (8, 5), (12, 0)),
    ]
}

#[test]
fn maximal_rows_follow_padding_exactly() {
    let schedule = generate(
        &staggered_mornings(),
        &window(Padding::new(10, 10)),
        &GenerateOptions::default(),
    )
    .unwrap();

    assert_eq!(schedule.mode, BuildMode::Maximal);
    assert_eq!(schedule.rows.len(), 4);
    assert_eq!(open_days_of(&schedule, "07:50", "07:55"), vec![Weekday::Mon]);
    assert_eq!(
        open_days_of(&schedule, "07:55", "12:10"),
        vec![Weekday::Mon, Weekday::Tue]
    );
}

#[test]
fn optimizer_aligns_boundaries_inside_padding() {
    let options = GenerateOptions {
        optimize: true,
        ..GenerateOptions::default()
    };
    let schedule = generate(&staggered_mornings(), &window(Padding::new(10, 10)), &options).unwrap();

    assert_eq!(schedule.mode, BuildMode::Optimized);
    assert_eq!(schedule.rows.len(), 3);
    assert_eq!(schedule.unlock_row_count(), 1);
    assert_eq!(
        open_days_of(&schedule, "08:00", "12:10"),
        vec![Weekday::Mon, Weekday::Tue]
    );
}

#[test]
fn optimizer_with_zero_padding_matches_maximal() {
    let maximal = generate(&busy_week(), &window(Padding::NONE), &GenerateOptions::default()).unwrap();
    let options = GenerateOptions {
        optimize: true,
        ..GenerateOptions::default()
    };
    let optimized = generate(&busy_week(), &window(Padding::NONE), &options).unwrap();

    assert_eq!(optimized.rows, maximal.rows);
    assert_eq!(optimized.days, maximal.days);
    assert_eq!(optimized.mode, BuildMode::Maximal);
}

#[test]
fn optimizer_never_locks_during_an_event() {
    let options = GenerateOptions {
        optimize: true,
        ..GenerateOptions::default()
    };
    let schedule = generate(&busy_week(), &window(Padding::new(20, 15)), &options).unwrap();

    let school = schedule
        .rows
        .iter()
        .filter(|r| r.status(Weekday::Wed) == CellStatus::Open)
        .map(|r| r.interval)
        .collect::<Vec<_>>();
    assert!(school.iter().any(|iv| iv.covers(t("08:00"), t("12:45"))));
    assert!(school.iter().any(|iv| iv.covers(t("13:30"), t("14:45"))));
    for iv in &school {
        assert!(iv.start() >= t("07:40") && iv.end() <= t("15:00"));
    }
}

// ── Controller limits ────────────────────────────────────────────────────

#[test]
fn over_limit_falls_back_to_optimizer() {
    let events = vec![
        timed(5, (8, 0), (9, 0)),
        timed(6, (8, 5), (9, 0)),
        timed(7, (8, 10), (9, 0)),
    ];
    let options = GenerateOptions {
        max_intervals: 2,
        ..GenerateOptions::default()
    };
    let schedule = generate(&events, &window(Padding::new(15, 0)), &options).unwrap();

    assert_eq!(schedule.mode, BuildMode::Optimized);
    assert_eq!(schedule.unlock_row_count(), 1);
    assert_eq!(
        open_days_of(&schedule, "08:00", "09:00"),
        vec![Weekday::Mon, Weekday::Tue, Weekday::Wed]
    );
}

#[test]
fn too_many_rows_is_reported() {
    let options = GenerateOptions {
        max_intervals: 4,
        ..GenerateOptions::default()
    };
    let err = generate(&busy_week(), &window(Padding::NONE), &options).unwrap_err();

    assert!(matches!(
        err,
        ScheduleError::TooManyIntervals { needed: 5, max: 4 }
    ));
    assert!(err.is_user_error());
}

// ── Daylight saving ──────────────────────────────────────────────────────

/// Week of Sunday 2026-11-01, when New York falls back at 02:00 EDT.
fn fall_back_window(padding: Padding) -> Window {
    Window::containing(NaiveDate::from_ymd_opt(2026, 11, 1).unwrap(), TZ, padding)
}

fn utc(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 11, 1, hour, minute, 0).unwrap()
}

#[test]
fn fall_back_event_unlocks_the_repeated_hour() {
    // 01:30 EDT to 01:10 EST.
    let events = vec![RawEvent::timed("night shift", utc(5, 30), utc(6, 10))];
    let schedule = generate(&events, &fall_back_window(Padding::NONE), &GenerateOptions::default()).unwrap();

    assert!(schedule.warnings.is_empty());
    assert_eq!(schedule.unlock_row_count(), 1);
    assert_eq!(schedule.rows.len(), 3);
    assert_eq!(open_days_of(&schedule, "01:00", "02:00"), vec![Weekday::Sun]);
}

#[test]
fn optimizer_accepts_padding_across_fall_back() {
    // 01:30 to 01:50 EDT; the after-padding runs into 01:30 EST.
    let events = vec![RawEvent::timed("night shift", utc(5, 30), utc(5, 50))];
    let window = fall_back_window(Padding::new(0, 40));

    for optimize in [false, true] {
        let options = GenerateOptions {
            optimize,
            ..GenerateOptions::default()
        };
        let schedule = generate(&events, &window, &options).unwrap();

        assert_eq!(schedule.unlock_row_count(), 1);
        let open = schedule
            .rows
            .iter()
            .find(|r| r.status(Weekday::Sun) == CellStatus::Open)
            .unwrap();
        assert!(open.interval.covers(t("01:30"), t("01:50")));
        assert!(open.interval.start() >= t("01:00") && open.interval.end() <= t("02:00"));
    }
}

// ── Pipeline with a source ───────────────────────────────────────────────

#[tokio::test]
async fn run_fetches_only_the_window() {
    let mut events = busy_week();
    // Previous and next Monday.
    events.push(RawEvent::timed("before", local(2, 8, 0), local(2, 9, 0)));
    events.push(RawEvent::timed("after", local(12, 8, 0), local(12, 9, 0)));
    let source = MemorySource::new(events);

    let schedule = run(&source, "primary", &window(Padding::NONE), &GenerateOptions::default())
        .await
        .unwrap();

    assert_eq!(schedule.unlock_row_count(), 5);
    assert_eq!(
        schedule.window.start(),
        TZ.with_ymd_and_hms(2026, 1, 4, 0, 0, 0).unwrap()
    );
}
