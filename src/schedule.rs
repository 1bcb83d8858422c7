use std::collections::{BTreeMap, HashSet};
use std::env;

use anyhow::Result;
use chrono::{DateTime, Duration, Local, Utc};
use rayon::prelude::*;
use serde::Serialize;

use crate::model::is_final_status;
use crate::nhl_fetch::{fetch_schedule_day, ScheduledGame};
use crate::normalize::TeamAliases;
use crate::predict::{predict_scorers_between_teams, MatchupPrediction, PredictionSource};
use crate::store::MatchStore;

/// Days of schedule to look ahead.
pub const DEFAULT_LOOKAHEAD_DAYS: u32 = 10;

/// Game states that still count as upcoming even though they started.
const IN_PROGRESS_STATES: [&str; 2] = ["LIVE", "CRIT"];

#[derive(Debug, Clone, Serialize)]
pub struct UpcomingGame {
    pub game_id: String,
    pub start_time_utc: String,
    /// Viewer-local calendar date, the grouping key for schedule views.
    pub local_date: String,
    pub local_time: String,
    pub state: String,
    pub home_team: String,
    pub away_team: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GamePrediction {
    pub home: String,
    pub away: String,
    pub time: String,
    pub state: String,
    pub prediction: MatchupPrediction,
}

/// Fetch and filter the league schedule for the next `days` days. A failed
/// day fetch is logged and skipped; the rest of the window still loads.
pub fn fetch_upcoming_games(days: u32) -> Result<Vec<UpcomingGame>> {
    let today = Local::now().date_naive();
    let mut all: Vec<ScheduledGame> = Vec::new();
    for offset in 0..days {
        let date = today + Duration::days(i64::from(offset));
        let date_str = date.format("%Y-%m-%d").to_string();
        match fetch_schedule_day(&date_str) {
            Ok(mut games) => all.append(&mut games),
            Err(err) => log::warn!("schedule fetch failed for {date_str}: {err:#}"),
        }
    }
    Ok(filter_upcoming(all, Utc::now()))
}

/// Keep games that are not final and either start in the future or are in
/// progress; sort by start time and drop duplicates (the day windows of the
/// schedule endpoint overlap).
pub fn filter_upcoming(games: Vec<ScheduledGame>, now: DateTime<Utc>) -> Vec<UpcomingGame> {
    let mut upcoming: Vec<(DateTime<Utc>, ScheduledGame)> = Vec::new();
    for game in games {
        if is_final_status(&game.state) {
            continue;
        }
        let Ok(start) = DateTime::parse_from_rfc3339(&game.start_time_utc) else {
            continue;
        };
        let start = start.with_timezone(&Utc);
        let in_progress = IN_PROGRESS_STATES.contains(&game.state.as_str());
        if start < now && !in_progress {
            continue;
        }
        upcoming.push((start, game));
    }

    upcoming.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.game_id.cmp(&b.1.game_id)));

    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::with_capacity(upcoming.len());
    for (start, game) in upcoming {
        let key = format!("{}-{}-{}", game.start_time_utc, game.home_team, game.away_team);
        if !seen.insert(key) {
            continue;
        }
        let local = start.with_timezone(&Local);
        out.push(UpcomingGame {
            game_id: game.game_id,
            start_time_utc: game.start_time_utc,
            local_date: local.format("%Y-%m-%d").to_string(),
            local_time: local.format("%H:%M").to_string(),
            state: game.state,
            home_team: game.home_team,
            away_team: game.away_team,
        });
    }
    out
}

/// Predict every upcoming matchup, grouped by local date. Matchups are
/// independent, so they run on a small bounded pool; each worker thread
/// opens its own store connection. In-memory stores cannot be shared across
/// threads, so those run inline.
pub fn predictions_for_upcoming(
    store: &MatchStore,
    aliases: &TeamAliases,
    games: &[UpcomingGame],
    limit: usize,
) -> BTreeMap<String, Vec<GamePrediction>> {
    let rows: Vec<GamePrediction> = match (build_predict_pool(), store.path()) {
        // The connection itself cannot cross threads; only the path does.
        (Some(pool), Some(path)) => {
            let path = path.to_path_buf();
            pool.install(|| {
                games
                    .par_iter()
                    .map_init(
                        || MatchStore::open(&path),
                        |thread_store, game| match thread_store {
                            Ok(s) => predict_one(s, aliases, game, limit),
                            Err(err) => {
                                log::error!("per-thread store open failed: {err:#}");
                                degraded(game)
                            }
                        },
                    )
                    .collect()
            })
        }
        _ => games
            .iter()
            .map(|game| predict_one(store, aliases, game, limit))
            .collect(),
    };

    let mut by_date: BTreeMap<String, Vec<GamePrediction>> = BTreeMap::new();
    for (game, row) in games.iter().zip(rows) {
        by_date.entry(game.local_date.clone()).or_default().push(row);
    }
    by_date
}

fn predict_one(
    store: &MatchStore,
    aliases: &TeamAliases,
    game: &UpcomingGame,
    limit: usize,
) -> GamePrediction {
    let home = aliases.canonical(&game.home_team);
    let away = aliases.canonical(&game.away_team);
    let prediction = match predict_scorers_between_teams(store, aliases, &home, &away, limit) {
        Ok(p) => p,
        Err(err) => {
            log::warn!("prediction rejected for {home} vs {away}: {err:#}");
            MatchupPrediction::empty(PredictionSource::Error)
        }
    };
    GamePrediction {
        home,
        away,
        time: game.local_time.clone(),
        state: game.state.clone(),
        prediction,
    }
}

fn degraded(game: &UpcomingGame) -> GamePrediction {
    GamePrediction {
        home: game.home_team.clone(),
        away: game.away_team.clone(),
        time: game.local_time.clone(),
        state: game.state.clone(),
        prediction: MatchupPrediction::empty(PredictionSource::Error),
    }
}

fn build_predict_pool() -> Option<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(predict_parallelism())
        .build()
        .ok()
}

/// Small by design: each matchup hits the store several times, and the
/// upstream source behind it does not appreciate bursts.
fn predict_parallelism() -> usize {
    env::var("PREDICT_PARALLELISM")
        .ok()
        .and_then(|val| val.parse::<usize>().ok())
        .unwrap_or(4)
        .clamp(1, 8)
}
