use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

use puckcast::aggregate::aggregate_weighted;
use puckcast::combos::{analyze_co_scoring, CombinationParams, GroupSize};
use puckcast::head_to_head::head_to_head_report;
use puckcast::model::{MatchRecord, ScoringEvent, TeamSide};
use puckcast::weighting::RecencyWeight;

const ROSTER: [&str; 12] = [
    "Nathan MacKinnon",
    "Mikko Rantanen",
    "Cale Makar",
    "Valeri Nichushkin",
    "Artturi Lehkonen",
    "Devon Toews",
    "Casey Mittelstadt",
    "Ross Colton",
    "Logan O'Connor",
    "Joel Kiviranta",
    "Samuel Girard",
    "Miles Wood",
];

/// A season's worth of matches with busy scoresheets, deterministic so runs
/// are comparable.
fn season_matches(count: usize) -> Vec<MatchRecord> {
    (0..count)
        .map(|i| {
            let scorer_count = 4 + (i % 5); // 4..=8 qualifying scorers
            let scorers: Vec<ScoringEvent> = (0..scorer_count)
                .map(|j| ScoringEvent {
                    name: ROSTER[(i + j) % ROSTER.len()].to_string(),
                    goals: 1 + ((i + j) % 2) as u32,
                    assists: (j % 3) as u32,
                    side: Some(TeamSide::Home),
                })
                .collect();
            MatchRecord {
                game_id: format!("game-{i}"),
                date: format!("2024-{:02}-{:02}", 1 + (i / 27) % 12, 1 + i % 27),
                home_team: "Colorado Avalanche".to_string(),
                away_team: if i % 2 == 0 {
                    "Dallas Stars".to_string()
                } else {
                    "Seattle Kraken".to_string()
                },
                home_score: Some(3 + (i % 4) as u32),
                away_score: Some((i % 3) as u32),
                status: "FINAL".to_string(),
                scorers,
            }
        })
        .collect()
}

fn bench_duo_enumeration(c: &mut Criterion) {
    let matches = season_matches(82);
    c.bench_function("duo_enumeration", |b| {
        b.iter(|| {
            let report = analyze_co_scoring(
                black_box("Colorado Avalanche"),
                black_box(&matches),
                CombinationParams::new(GroupSize::Duo),
            )
            .unwrap();
            black_box(report.groups.len());
        })
    });
}

fn bench_quartet_enumeration(c: &mut Criterion) {
    let matches = season_matches(82);
    c.bench_function("quartet_enumeration", |b| {
        b.iter(|| {
            let report = analyze_co_scoring(
                black_box("Colorado Avalanche"),
                black_box(&matches),
                CombinationParams::new(GroupSize::Quartet),
            )
            .unwrap();
            black_box(report.groups.len());
        })
    });
}

fn bench_weighted_aggregation(c: &mut Criterion) {
    let matches = season_matches(82);
    let cfg = RecencyWeight::default();
    c.bench_function("weighted_aggregation", |b| {
        b.iter(|| {
            let agg = aggregate_weighted(black_box(&matches), black_box(&cfg));
            black_box(agg.players.len() + agg.synergy.len());
        })
    });
}

fn bench_head_to_head_reduce(c: &mut Criterion) {
    let matches = season_matches(82);
    c.bench_function("head_to_head_reduce", |b| {
        b.iter(|| {
            let report = head_to_head_report(
                black_box("Colorado Avalanche"),
                black_box("Dallas Stars"),
                black_box(&matches),
            )
            .unwrap();
            black_box(report.top_scorers.len());
        })
    });
}

criterion_group!(
    perf,
    bench_duo_enumeration,
    bench_quartet_enumeration,
    bench_weighted_aggregation,
    bench_head_to_head_reduce
);
criterion_main!(perf);
