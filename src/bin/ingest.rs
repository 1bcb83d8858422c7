use std::path::PathBuf;

use anyhow::{Context, Result};

use puckcast::nhl_fetch;
use puckcast::store::{default_db_path, MatchStore};

/// Club abbreviations recognized by the schedule endpoint, one per
/// franchise.
const NHL_TEAM_ABBREVS: [&str; 32] = [
    "ANA", "BOS", "BUF", "CGY", "CAR", "CHI", "COL", "CBJ", "DAL", "DET", "EDM", "FLA", "LAK",
    "MIN", "MTL", "NSH", "NJD", "NYI", "NYR", "OTT", "PHI", "PIT", "SJS", "SEA", "STL", "TBL",
    "TOR", "UTA", "VAN", "VGK", "WSH", "WPG",
];

const DEFAULT_SEASON: &str = "20242025";
const DEFAULT_GAMES_PER_TEAM: usize = 15;

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let db_path = arg_value("--db")
        .map(PathBuf::from)
        .or_else(default_db_path)
        .context("unable to resolve sqlite path")?;
    let season = arg_value("--season").unwrap_or_else(|| DEFAULT_SEASON.to_string());
    let games_per_team = arg_value("--games")
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(DEFAULT_GAMES_PER_TEAM);
    let teams: Vec<String> = match arg_value("--teams") {
        Some(raw) => raw
            .split(',')
            .map(|t| t.trim().to_uppercase())
            .filter(|t| !t.is_empty())
            .collect(),
        None => NHL_TEAM_ABBREVS.iter().map(|t| t.to_string()).collect(),
    };

    let mut store = MatchStore::open(&db_path)?;
    println!("Ingesting season {season} into {}", db_path.display());

    let mut total_upserted = 0usize;
    let mut total_errors = 0usize;
    for abbr in &teams {
        match nhl_fetch::ingest_recent_games(&mut store, abbr, &season, games_per_team) {
            Ok(outcome) => {
                total_upserted += outcome.upserted;
                total_errors += outcome.errors.len();
                println!(
                    "{abbr}: fetched={} upserted={} skipped={} errors={}",
                    outcome.fetched,
                    outcome.upserted,
                    outcome.skipped_existing,
                    outcome.errors.len()
                );
                for err in outcome.errors.iter().take(3) {
                    println!("  - {err}");
                }
            }
            Err(err) => {
                total_errors += 1;
                println!("{abbr}: schedule fetch failed: {err:#}");
            }
        }
    }

    println!(
        "Done: {} matches upserted across {} teams ({} stored total), {} errors",
        total_upserted,
        teams.len(),
        store.match_count()?,
        total_errors
    );
    Ok(())
}

fn arg_value(flag: &str) -> Option<String> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&format!("{flag}=")) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == flag {
            if let Some(next) = args.get(idx + 1) {
                if !next.trim().is_empty() {
                    return Some(next.trim().to_string());
                }
            }
        }
    }
    None
}
