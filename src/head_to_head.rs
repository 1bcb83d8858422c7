use std::collections::HashMap;

use anyhow::{bail, Result};
use serde::Serialize;

use crate::model::MatchRecord;
use crate::normalize::normalize_whitespace;

pub const DRAW_RESULT: &str = "Draw";

const TOP_SCORERS: usize = 10;
const TOP_DUOS: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct HeadToHeadEntry {
    pub date: String,
    pub home_team: String,
    pub away_team: String,
    pub score: String,
    /// Winning team's name, or `DRAW_RESULT`.
    pub result: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HeadToHeadStats {
    pub team_a: String,
    pub team_b: String,
    pub total_matches: usize,
    pub team_a_wins: u32,
    pub team_b_wins: u32,
    pub draws: u32,
    pub team_a_goals: u32,
    pub team_b_goals: u32,
    /// Two-decimal string, e.g. "3.00".
    pub avg_goals_per_match: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScorerTotals {
    pub name: String,
    pub goals: u32,
    pub assists: u32,
    pub matches: u32,
}

/// Scorer-plus-assister pairing. `goals_together` accumulates
/// `min(scorer goals, assister assists)` per shared match — a proxy, not a
/// true goal-to-assist attribution (the data has no such linkage).
#[derive(Debug, Clone, Serialize)]
pub struct DuoProxy {
    pub duo: String,
    pub goals_together: u32,
    pub matches: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct HeadToHeadReport {
    pub history: Vec<HeadToHeadEntry>,
    pub stats: HeadToHeadStats,
    pub top_scorers: Vec<ScorerTotals>,
    pub top_duos: Vec<DuoProxy>,
}

/// Reduce a match list already filtered to two teams into their mutual
/// record. Which side is "team A" is decided per match by case-insensitive
/// substring containment of team A's name in the home team — deliberately
/// looser than canonical equality, and used only here.
///
/// Missing scores count as zero throughout this reducer. An empty match
/// list reduces to an all-zero report so callers can tell "no history" from
/// a failure.
pub fn head_to_head_report(
    team_a: &str,
    team_b: &str,
    matches: &[MatchRecord],
) -> Result<HeadToHeadReport> {
    let team_a = normalize_whitespace(team_a);
    let team_b = normalize_whitespace(team_b);
    if team_a.is_empty() || team_b.is_empty() {
        bail!("both team names are required");
    }

    let team_a_lower = team_a.to_lowercase();

    let mut team_a_wins = 0u32;
    let mut team_b_wins = 0u32;
    let mut draws = 0u32;
    let mut team_a_goals = 0u32;
    let mut team_b_goals = 0u32;
    let mut history = Vec::with_capacity(matches.len());

    for m in matches {
        let home_score = m.home_score.unwrap_or(0);
        let away_score = m.away_score.unwrap_or(0);
        let is_team_a_home = m.home_team.to_lowercase().contains(&team_a_lower);

        let (a_score, b_score) = if is_team_a_home {
            (home_score, away_score)
        } else {
            (away_score, home_score)
        };

        history.push(HeadToHeadEntry {
            date: m.date.clone(),
            home_team: m.home_team.clone(),
            away_team: m.away_team.clone(),
            score: format!("{home_score}-{away_score}"),
            result: if a_score > b_score {
                team_a.clone()
            } else if b_score > a_score {
                team_b.clone()
            } else {
                DRAW_RESULT.to_string()
            },
        });

        team_a_goals += a_score;
        team_b_goals += b_score;
        if a_score > b_score {
            team_a_wins += 1;
        } else if b_score > a_score {
            team_b_wins += 1;
        } else {
            draws += 1;
        }
    }

    let mut scorer_totals: HashMap<String, ScorerTotals> = HashMap::new();
    let mut duo_stats: HashMap<String, DuoProxy> = HashMap::new();

    for m in matches {
        if m.scorers.is_empty() {
            continue;
        }

        // Last write wins for duplicate names within one match, matching
        // the per-match participant snapshot the duo pass works from.
        let mut participants: HashMap<String, (u32, u32)> = HashMap::new();

        for event in &m.scorers {
            let name = normalize_whitespace(&event.name);
            if name.is_empty() {
                continue;
            }
            let entry = scorer_totals
                .entry(name.clone())
                .or_insert_with(|| ScorerTotals {
                    name: name.clone(),
                    goals: 0,
                    assists: 0,
                    matches: 0,
                });
            entry.goals += event.goals;
            entry.assists += event.assists;
            entry.matches += 1;
            participants.insert(name, (event.goals, event.assists));
        }

        for (scorer, &(goals, _)) in &participants {
            if goals == 0 {
                continue;
            }
            for (assister, &(_, assists)) in &participants {
                if scorer == assister || assists == 0 {
                    continue;
                }
                let key = format!("{scorer} + {assister}");
                let entry = duo_stats.entry(key.clone()).or_insert_with(|| DuoProxy {
                    duo: key,
                    goals_together: 0,
                    matches: 0,
                });
                entry.goals_together += goals.min(assists);
                entry.matches += 1;
            }
        }
    }

    let mut top_scorers: Vec<ScorerTotals> = scorer_totals.into_values().collect();
    top_scorers.sort_by(|a, b| {
        b.goals
            .cmp(&a.goals)
            .then_with(|| b.assists.cmp(&a.assists))
            .then_with(|| a.name.cmp(&b.name))
    });
    top_scorers.truncate(TOP_SCORERS);

    let mut top_duos: Vec<DuoProxy> = duo_stats.into_values().collect();
    top_duos.sort_by(|a, b| {
        b.goals_together
            .cmp(&a.goals_together)
            .then_with(|| a.duo.cmp(&b.duo))
    });
    top_duos.truncate(TOP_DUOS);

    let total_matches = matches.len();
    let avg_goals_per_match = if total_matches > 0 {
        format!(
            "{:.2}",
            f64::from(team_a_goals + team_b_goals) / total_matches as f64
        )
    } else {
        "0.00".to_string()
    };

    Ok(HeadToHeadReport {
        history,
        stats: HeadToHeadStats {
            team_a,
            team_b,
            total_matches,
            team_a_wins,
            team_b_wins,
            draws,
            team_a_goals,
            team_b_goals,
            avg_goals_per_match,
        },
        top_scorers,
        top_duos,
    })
}
