use challenge_tracker::models::{
    WeeklyRecord, WeeklyTotals, WorkoutCategory, WorkoutEvent, WorkoutType,
};
use challenge_tracker::services::aggregator::{aggregate, WeeklyGrid};
use challenge_tracker::services::leaderboard::{rank_by_points, LeaderboardInput};
use challenge_tracker::services::weeks::all_weeks;
use challenge_tracker::services::WorkoutClassifier;
use challenge_tracker::time_utils::CivilClock;
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

const USERS: usize = 200;

fn classifier() -> WorkoutClassifier {
    WorkoutClassifier::from_maps(
        &[
            WorkoutCategory {
                id: "run".to_string(),
                type_id: "cardio".to_string(),
                name: "Run".to_string(),
            },
            WorkoutCategory {
                id: "lift".to_string(),
                type_id: "strength".to_string(),
                name: "Lift".to_string(),
            },
        ],
        &[
            WorkoutType {
                id: "cardio".to_string(),
                name: "CARDIO".to_string(),
            },
            WorkoutType {
                id: "strength".to_string(),
                name: "STRENGTH".to_string(),
            },
        ],
    )
}

fn benchmark_weekly_aggregation(c: &mut Criterion) {
    let start = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
    let end = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
    let weeks = all_weeks(start, end);
    let clock = CivilClock::default();
    let classifier = classifier();

    // Four workouts per user per day across the whole challenge
    let slots = weeks.len() * 7 * 4;
    let base = Utc.with_ymd_and_hms(2024, 1, 8, 0, 0, 0).unwrap();
    let events: Vec<WorkoutEvent> = (0..USERS)
        .flat_map(|u| {
            (0..slots).map(move |i| WorkoutEvent {
                id: format!("w-{}-{}", u, i),
                user_id: format!("u{}", u),
                category_id: if i % 3 == 0 { "lift" } else { "run" }.to_string(),
                timestamp: base + Duration::hours(i as i64 * 6),
                points: (i % 17) as f64 * 0.5,
                duration_minutes: Some(30),
            })
        })
        .collect();

    let week_list = &weeks;
    let records: Vec<WeeklyRecord> = (0..USERS)
        .flat_map(|u| {
            week_list.iter().flat_map(move |w| {
                // Every fifth week carries a duplicate written a day later
                let copies = if w.week_number % 5 == 0 { 2 } else { 1 };
                (0..copies).map(move |copy| WeeklyRecord {
                    id: format!("r-{}-{}-{}", u, w.week_number, copy),
                    user_id: format!("u{}", u),
                    start_date: w.start_date + Duration::days(copy),
                    end_date: w.end_date,
                    cardio_points_total: (u % 13) as f64 * 4.5,
                    strength_sessions_count: (u % 4) as u32,
                })
            })
        })
        .collect();

    let mut group = c.benchmark_group("weekly_aggregation");

    group.bench_function("aggregate_one_week_all_users", |b| {
        b.iter(|| aggregate(black_box(&events), &weeks[2], &classifier, &clock))
    });

    group.bench_function("grid_from_records", |b| {
        b.iter(|| WeeklyGrid::from_records(black_box(records.clone()), &weeks))
    });

    let grid = WeeklyGrid::from_records(records.clone(), &weeks);
    let inputs: Vec<LeaderboardInput> = (0..USERS)
        .map(|u| {
            let user_id = format!("u{}", u);
            let totals: WeeklyTotals = grid.cumulative(&user_id);
            LeaderboardInput {
                user_id,
                name: None,
                totals,
                weekly_record_id: None,
            }
        })
        .collect();

    group.bench_function("rank_cumulative", |b| {
        b.iter(|| rank_by_points(black_box(inputs.clone()), 20.0))
    });

    group.finish();
}

criterion_group!(benches, benchmark_weekly_aggregation);
criterion_main!(benches);
