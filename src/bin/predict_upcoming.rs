use std::path::PathBuf;

use anyhow::{Context, Result};

use puckcast::normalize::nhl_aliases;
use puckcast::predict::DEFAULT_SCORER_LIMIT;
use puckcast::schedule::{fetch_upcoming_games, predictions_for_upcoming, DEFAULT_LOOKAHEAD_DAYS};
use puckcast::store::{default_db_path, MatchStore};

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let db_path = arg_value("--db")
        .map(PathBuf::from)
        .or_else(default_db_path)
        .context("unable to resolve sqlite path")?;
    let days = arg_value("--days")
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(DEFAULT_LOOKAHEAD_DAYS);

    let store = MatchStore::open(&db_path)?;
    let aliases = nhl_aliases();

    let upcoming = fetch_upcoming_games(days)?;
    if upcoming.is_empty() {
        println!("No upcoming games in the next {days} days.");
        return Ok(());
    }
    println!("{} upcoming games", upcoming.len());

    let by_date = predictions_for_upcoming(&store, aliases, &upcoming, DEFAULT_SCORER_LIMIT);
    for (date, rows) in &by_date {
        println!("\n=== {date} ===");
        for row in rows {
            println!(
                "{} @ {} ({} · {})",
                row.away, row.home, row.time, row.state
            );
            let p = &row.prediction;
            println!(
                "  source={:?} matches={} goals {:.1}-{:.1}",
                p.source, p.match_count, p.team_a_goals, p.team_b_goals
            );
            for scorer in &p.sorted_scorers {
                println!(
                    "  {} score={:.2} ({}G {}A in {} apps)",
                    scorer.name, scorer.score, scorer.goals, scorer.assists, scorer.appearances
                );
            }
            for pick in &p.top_synergy {
                println!(
                    "  synergy: {} + {} ({:.1} weighted matches)",
                    pick.pair[0], pick.pair[1], pick.matches_together
                );
            }
        }
    }
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
