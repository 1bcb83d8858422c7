use anyhow::{Context, Result};
use serde_json::Value;

use crate::http_cache::fetch_json_cached;
use crate::http_client::http_client;
use crate::model::{MatchRecord, ScoringEvent, TeamSide};
use crate::normalize::normalize_whitespace;
use crate::store::MatchStore;

const DEFAULT_API_BASE: &str = "https://api-web.nhle.com/v1";

/// Game state the schedule reports for games not yet started.
const STATE_FUTURE: &str = "FUT";

fn api_base() -> String {
    std::env::var("NHL_API_BASE")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
}

/// One row of a schedule payload, before any boxscore enrichment.
#[derive(Debug, Clone)]
pub struct ScheduledGame {
    pub game_id: String,
    pub game_date: String,
    pub start_time_utc: String,
    pub state: String,
    pub home_team: String,
    pub away_team: String,
}

#[derive(Debug, Clone, Default)]
pub struct BoxscoreSummary {
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
    pub scorers: Vec<ScoringEvent>,
}

#[derive(Debug, Clone, Default)]
pub struct IngestOutcome {
    pub fetched: usize,
    pub upserted: usize,
    pub skipped_existing: usize,
    pub errors: Vec<String>,
}

/// Full season schedule for one club.
pub fn fetch_club_schedule(team_abbr: &str, season: &str) -> Result<Vec<ScheduledGame>> {
    let client = http_client()?;
    let url = format!("{}/club-schedule-season/{team_abbr}/{season}", api_base());
    let body = fetch_json_cached(client, &url).context("club schedule request failed")?;
    parse_club_schedule_json(&body)
}

/// League-wide schedule for one calendar day (`YYYY-MM-DD`).
pub fn fetch_schedule_day(date: &str) -> Result<Vec<ScheduledGame>> {
    let client = http_client()?;
    let url = format!("{}/schedule/{date}", api_base());
    let body = fetch_json_cached(client, &url).context("day schedule request failed")?;
    parse_schedule_day_json(&body)
}

pub fn fetch_boxscore(game_id: &str) -> Result<BoxscoreSummary> {
    let client = http_client()?;
    let url = format!("{}/gamecenter/{game_id}/boxscore", api_base());
    let body = fetch_json_cached(client, &url).context("boxscore request failed")?;
    parse_boxscore_json(&body)
}

pub fn parse_club_schedule_json(raw: &str) -> Result<Vec<ScheduledGame>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let v: Value = serde_json::from_str(trimmed).context("invalid club schedule json")?;
    let mut out = Vec::new();
    if let Some(games) = v.get("games").and_then(|g| g.as_array()) {
        for game in games {
            if let Some(row) = parse_scheduled_game(game) {
                out.push(row);
            }
        }
    }
    Ok(out)
}

/// The day endpoint nests games inside `gameWeek`; every day entry is
/// flattened so callers do not depend on which slot the requested day
/// landed in.
pub fn parse_schedule_day_json(raw: &str) -> Result<Vec<ScheduledGame>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let v: Value = serde_json::from_str(trimmed).context("invalid day schedule json")?;
    let mut out = Vec::new();
    if let Some(days) = v.get("gameWeek").and_then(|w| w.as_array()) {
        for day in days {
            let Some(games) = day.get("games").and_then(|g| g.as_array()) else {
                continue;
            };
            for game in games {
                if let Some(row) = parse_scheduled_game(game) {
                    out.push(row);
                }
            }
        }
    }
    Ok(out)
}

pub fn parse_boxscore_json(raw: &str) -> Result<BoxscoreSummary> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(BoxscoreSummary::default());
    }
    let v: Value = serde_json::from_str(trimmed).context("invalid boxscore json")?;

    let mut out = BoxscoreSummary {
        home_score: v
            .get("homeTeam")
            .and_then(|t| t.get("score"))
            .and_then(Value::as_u64)
            .map(|n| n as u32),
        away_score: v
            .get("awayTeam")
            .and_then(|t| t.get("score"))
            .and_then(Value::as_u64)
            .map(|n| n as u32),
        scorers: Vec::new(),
    };

    let Some(stats) = v.get("playerByGameStats") else {
        return Ok(out);
    };
    for (roster_key, side) in [("homeTeam", TeamSide::Home), ("awayTeam", TeamSide::Away)] {
        let Some(roster) = stats.get(roster_key) else {
            continue;
        };
        for position_group in ["forwards", "defense", "goalies"] {
            let Some(players) = roster.get(position_group).and_then(|p| p.as_array()) else {
                continue;
            };
            for player in players {
                let goals = player.get("goals").and_then(Value::as_u64).unwrap_or(0) as u32;
                let assists = player.get("assists").and_then(Value::as_u64).unwrap_or(0) as u32;
                if goals == 0 && assists == 0 {
                    continue;
                }
                let name = player_name(player);
                if name.is_empty() {
                    log::warn!("boxscore player with goals/assists but no name");
                    continue;
                }
                out.scorers.push(ScoringEvent {
                    name,
                    goals,
                    assists,
                    side: Some(side),
                });
            }
        }
    }
    Ok(out)
}

/// Player identity arrives in several shapes across boxscore revisions;
/// `name.default` is the current one, first/last the older one.
fn player_name(player: &Value) -> String {
    if let Some(name) = player
        .get("name")
        .and_then(|n| n.get("default"))
        .and_then(Value::as_str)
    {
        return normalize_whitespace(name);
    }
    let first = player
        .get("firstName")
        .and_then(|n| n.get("default"))
        .and_then(Value::as_str)
        .unwrap_or_default();
    let last = player
        .get("lastName")
        .and_then(|n| n.get("default"))
        .and_then(Value::as_str)
        .unwrap_or_default();
    normalize_whitespace(&format!("{first} {last}"))
}

/// Assemble a display name from the team blob: `placeName` + `commonName`
/// when available, with progressively weaker fallbacks.
pub fn team_display_name(team: &Value) -> String {
    if let Some(name) = team
        .get("name")
        .and_then(|n| n.get("default"))
        .and_then(Value::as_str)
    {
        return normalize_whitespace(name);
    }
    let place = team
        .get("placeName")
        .and_then(|n| n.get("default"))
        .and_then(Value::as_str)
        .unwrap_or_default();
    let common = team
        .get("commonName")
        .and_then(|n| n.get("default"))
        .and_then(Value::as_str)
        .unwrap_or_default();
    let combined = normalize_whitespace(&format!("{place} {common}"));
    if !combined.is_empty() {
        return combined;
    }
    team.get("abbrev")
        .and_then(Value::as_str)
        .map(normalize_whitespace)
        .unwrap_or_default()
}

fn parse_scheduled_game(game: &Value) -> Option<ScheduledGame> {
    let game_id = match game.get("id") {
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) => s.clone(),
        _ => return None,
    };
    let home_team = team_display_name(game.get("homeTeam")?);
    let away_team = team_display_name(game.get("awayTeam")?);
    if home_team.is_empty() || away_team.is_empty() {
        return None;
    }
    let start_time_utc = game
        .get("startTimeUTC")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let game_date = game
        .get("gameDate")
        .and_then(Value::as_str)
        .map(|s| s.to_string())
        .or_else(|| start_time_utc.get(..10).map(|s| s.to_string()))
        .unwrap_or_default();
    let state = game
        .get("gameState")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    Some(ScheduledGame {
        game_id,
        game_date,
        start_time_utc,
        state,
        home_team,
        away_team,
    })
}

/// Ingest a club's most recent non-future games into the store. Per-game
/// failures are collected, not fatal; already-stored games are skipped.
pub fn ingest_recent_games(
    store: &mut MatchStore,
    team_abbr: &str,
    season: &str,
    limit: usize,
) -> Result<IngestOutcome> {
    let schedule = fetch_club_schedule(team_abbr, season)?;
    let played: Vec<&ScheduledGame> = schedule
        .iter()
        .filter(|g| g.state != STATE_FUTURE)
        .collect();

    let recent = &played[played.len().saturating_sub(limit)..];
    let mut outcome = IngestOutcome {
        fetched: recent.len(),
        ..IngestOutcome::default()
    };

    for game in recent {
        match store.contains_game(&game.game_id) {
            Ok(true) => {
                outcome.skipped_existing += 1;
                continue;
            }
            Ok(false) => {}
            Err(err) => {
                outcome.errors.push(format!("game {}: {err:#}", game.game_id));
                continue;
            }
        }

        let boxscore = match fetch_boxscore(&game.game_id) {
            Ok(b) => b,
            Err(err) => {
                log::warn!("boxscore fetch failed for game {}: {err:#}", game.game_id);
                outcome.errors.push(format!("game {}: {err:#}", game.game_id));
                continue;
            }
        };

        let record = MatchRecord {
            game_id: game.game_id.clone(),
            date: game.game_date.get(..10).unwrap_or(&game.game_date).to_string(),
            home_team: game.home_team.clone(),
            away_team: game.away_team.clone(),
            home_score: boxscore.home_score,
            away_score: boxscore.away_score,
            status: game.state.clone(),
            scorers: boxscore.scorers,
        };
        match store.upsert_match(&record) {
            Ok(()) => outcome.upserted += 1,
            Err(err) => {
                outcome.errors.push(format!("game {}: {err:#}", game.game_id));
            }
        }
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boxscore_scorers_carry_roster_side() {
        let raw = r#"{
            "homeTeam": {"score": 3},
            "awayTeam": {"score": 2},
            "playerByGameStats": {
                "homeTeam": {
                    "forwards": [
                        {"name": {"default": "Nathan MacKinnon"}, "goals": 2, "assists": 1},
                        {"name": {"default": "Quiet Fourth Liner"}, "goals": 0, "assists": 0}
                    ],
                    "defense": [
                        {"firstName": {"default": "Cale"}, "lastName": {"default": "Makar"}, "goals": 0, "assists": 2}
                    ],
                    "goalies": []
                },
                "awayTeam": {
                    "forwards": [
                        {"name": {"default": "Jason Robertson"}, "goals": 1, "assists": 0}
                    ]
                }
            }
        }"#;
        let box_score = parse_boxscore_json(raw).unwrap();
        assert_eq!(box_score.home_score, Some(3));
        assert_eq!(box_score.away_score, Some(2));
        assert_eq!(box_score.scorers.len(), 3);
        let makar = box_score
            .scorers
            .iter()
            .find(|s| s.name == "Cale Makar")
            .unwrap();
        assert_eq!(makar.side, Some(TeamSide::Home));
        assert_eq!(makar.assists, 2);
        let robertson = box_score
            .scorers
            .iter()
            .find(|s| s.name == "Jason Robertson")
            .unwrap();
        assert_eq!(robertson.side, Some(TeamSide::Away));
    }

    #[test]
    fn boxscore_null_is_empty() {
        let box_score = parse_boxscore_json("null").unwrap();
        assert!(box_score.scorers.is_empty());
        assert_eq!(box_score.home_score, None);
    }

    #[test]
    fn team_names_assemble_from_place_and_common() {
        let team: Value = serde_json::from_str(
            r#"{"placeName": {"default": "Colorado"}, "commonName": {"default": "Avalanche"}}"#,
        )
        .unwrap();
        assert_eq!(team_display_name(&team), "Colorado Avalanche");

        let abbrev_only: Value = serde_json::from_str(r#"{"abbrev": "COL"}"#).unwrap();
        assert_eq!(team_display_name(&abbrev_only), "COL");
    }

    #[test]
    fn schedule_day_flattens_game_week() {
        let raw = r#"{
            "gameWeek": [
                {"date": "2025-01-10", "games": [
                    {
                        "id": 2024020001,
                        "startTimeUTC": "2025-01-10T19:00:00Z",
                        "gameState": "FUT",
                        "homeTeam": {"placeName": {"default": "Colorado"}, "commonName": {"default": "Avalanche"}},
                        "awayTeam": {"placeName": {"default": "Dallas"}, "commonName": {"default": "Stars"}}
                    }
                ]},
                {"date": "2025-01-11", "games": []}
            ]
        }"#;
        let games = parse_schedule_day_json(raw).unwrap();
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].game_id, "2024020001");
        assert_eq!(games[0].game_date, "2025-01-10");
        assert_eq!(games[0].home_team, "Colorado Avalanche");
        assert_eq!(games[0].state, "FUT");
    }

    #[test]
    fn club_schedule_null_is_empty() {
        assert!(parse_club_schedule_json("null").unwrap().is_empty());
        assert!(parse_schedule_day_json("").unwrap().is_empty());
    }
}
