use chrono::{TimeZone, Utc};
use criterion::{criterion_group, criterion_main, Criterion};
use ride_goal::models::ActivitySummary;
use ride_goal::services::render_description;
use std::hint::black_box;

fn benchmark_render(c: &mut Criterion) {
    let now = Utc.with_ymd_and_hms(2024, 12, 1, 12, 0, 0).unwrap();
    let description = "Morning loop over the hills with the club.\nLegs felt good.";

    let mut group = c.benchmark_group("render_description");

    group.bench_function("in_progress", |b| {
        b.iter(|| {
            render_description(
                black_box(5_000_000.0),
                black_box(1_234_567.0),
                black_box(42_195.0),
                black_box(description),
                "-- ride-goal",
                now,
            )
        })
    });

    group.bench_function("goal_reached", |b| {
        b.iter(|| {
            render_description(
                black_box(1_000_000.0),
                black_box(1_234_567.0),
                black_box(42_195.0),
                black_box(""),
                "-- ride-goal",
                now,
            )
        })
    });

    group.finish();
}

fn benchmark_year_total(c: &mut Criterion) {
    // A busy year of listing pages
    let activities: Vec<ActivitySummary> = (0..2_000u64)
        .map(|id| {
            serde_json::from_value(serde_json::json!({
                "id": id,
                "sport_type": if id % 3 == 0 { "Run" } else { "Ride" },
                "distance": 25_000.0 + id as f64,
            }))
            .expect("Failed to build activity")
        })
        .collect();

    c.bench_function("filter_and_total_year", |b| {
        b.iter(|| {
            black_box(&activities)
                .iter()
                .filter(|a| a.is_cycling())
                .map(|a| a.distance)
                .sum::<f64>()
        })
    });
}

criterion_group!(benches, benchmark_render, benchmark_year_total);
criterion_main!(benches);
