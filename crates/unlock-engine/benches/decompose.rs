use std::hint::black_box;

use chrono::{NaiveDate, TimeZone, Utc};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use unlock_engine::{generate, GenerateOptions, Padding, RawEvent, Window};

/// `per_day` staggered events on every day of the week of 2026-01-04 (UTC).
fn busy_week(per_day: u32) -> Vec<RawEvent> {
    let mut events = Vec::new();
    for day in 4..11 {
        for i in 0..per_day {
            let start_min = 6 * 60 + i * 37;
            let start = Utc
                .with_ymd_and_hms(2026, 1, day, start_min / 60 % 24, start_min % 60, 0)
                .unwrap();
            events.push(RawEvent::timed("bench", start, start + chrono::Duration::minutes(25)));
        }
    }
    events
}

fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");
    let reference = NaiveDate::from_ymd_opt(2026, 1, 7).unwrap();

    for per_day in [5u32, 20, 30] {
        let events = busy_week(per_day);
        let window = Window::containing(reference, chrono_tz::UTC, Padding::new(10, 10));
        let maximal = GenerateOptions {
            max_intervals: usize::MAX,
            ..GenerateOptions::default()
        };
        let optimized = GenerateOptions {
            optimize: true,
            ..maximal
        };

        group.bench_with_input(BenchmarkId::new("maximal", per_day), &events, |b, events| {
            b.iter(|| generate(black_box(events), &window, &maximal));
        });
        group.bench_with_input(BenchmarkId::new("optimized", per_day), &events, |b, events| {
            b.iter(|| generate(black_box(events), &window, &optimized));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_generate);
criterion_main!(benches);
