use std::collections::HashMap;

use anyhow::{bail, Result};
use serde::Serialize;

use crate::attribution::AttributionPolicy;
use crate::combos::OpponentCount;
use crate::model::{MatchRecord, TeamSide};
use crate::normalize::normalize_whitespace;

const TOP_OPPONENTS: usize = 5;
const TOP_STREAKS: usize = 5;
const TOP_EFFICIENCY: usize = 5;
const EFFICIENCY_MIN_MATCHES: u32 = 3;

#[derive(Debug, Clone, Serialize)]
pub struct PlayerTotals {
    pub name: String,
    pub goals: u32,
    pub assists: u32,
    pub matches: u32,
    pub points: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct StreakLine {
    pub name: String,
    /// Longest run of consecutive matches with at least one goal.
    pub max: u32,
    /// Run still open after the newest match.
    pub current: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct EfficiencyLine {
    pub name: String,
    pub goals: u32,
    pub matches: u32,
    /// Goals per match, two decimals.
    pub efficiency: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamAdvancedStats {
    pub team: String,
    pub games_played: usize,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goals_for_avg: f64,
    pub goals_against_avg: f64,
    pub best_scorer: Option<PlayerTotals>,
    pub top_points: Option<PlayerTotals>,
    pub top_assist: Option<PlayerTotals>,
    pub top_opponents: Vec<OpponentCount>,
    pub top_streaks: Vec<StreakLine>,
    pub efficiency: Vec<EfficiencyLine>,
}

/// One team's season-to-date report over its final-match history. Streaks
/// require chronological order, so the input is re-sorted by date here
/// whatever order the store returned.
pub fn team_advanced_stats(
    team: &str,
    matches: &[MatchRecord],
    policy: AttributionPolicy,
) -> Result<TeamAdvancedStats> {
    let team = normalize_whitespace(team);
    if team.is_empty() {
        bail!("team name is required");
    }

    let mut ordered: Vec<&MatchRecord> = matches.iter().collect();
    ordered.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.game_id.cmp(&b.game_id)));

    let mut totals: HashMap<String, PlayerTotals> = HashMap::new();
    let mut streaks: HashMap<String, StreakLine> = HashMap::new();
    let mut matchups: HashMap<String, u32> = HashMap::new();
    let mut goals_for = 0u32;
    let mut goals_against = 0u32;

    for m in &ordered {
        let side = m.side_of(&team).unwrap_or(TeamSide::Away);
        *matchups.entry(m.opponent(side).to_string()).or_insert(0) += 1;

        if let (Some(_), Some(_)) = (m.home_score, m.away_score) {
            goals_for += m.score_for(side).unwrap_or(0);
            goals_against += m.score_against(side).unwrap_or(0);
        }

        for event in &m.scorers {
            if !policy.claims(event.side, side) {
                continue;
            }
            let name = normalize_whitespace(&event.name);
            if name.is_empty() {
                continue;
            }

            let entry = totals.entry(name.clone()).or_insert_with(|| PlayerTotals {
                name: name.clone(),
                goals: 0,
                assists: 0,
                matches: 0,
                points: 0,
            });
            entry.goals += event.goals;
            entry.assists += event.assists;
            entry.matches += 1;
            entry.points = entry.goals + entry.assists;

            let streak = streaks.entry(name.clone()).or_insert_with(|| StreakLine {
                name,
                max: 0,
                current: 0,
            });
            if event.goals > 0 {
                streak.current += 1;
                streak.max = streak.max.max(streak.current);
            } else {
                streak.current = 0;
            }
        }
    }

    let games_played = ordered.len();
    let per_game = |total: u32| {
        if games_played == 0 {
            0.0
        } else {
            let avg = f64::from(total) / games_played as f64;
            (avg * 100.0).round() / 100.0
        }
    };

    let best_scorer = pick_best(&totals, |p| (p.goals, p.assists));
    let top_points = pick_best(&totals, |p| (p.points, p.goals));
    let top_assist = pick_best(&totals, |p| (p.assists, p.goals));

    let mut top_opponents: Vec<OpponentCount> = matchups
        .into_iter()
        .map(|(opponent, count)| OpponentCount { opponent, count })
        .collect();
    top_opponents.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.opponent.cmp(&b.opponent)));
    top_opponents.truncate(TOP_OPPONENTS);

    let mut top_streaks: Vec<StreakLine> = streaks.into_values().collect();
    top_streaks.sort_by(|a, b| b.max.cmp(&a.max).then_with(|| a.name.cmp(&b.name)));
    top_streaks.truncate(TOP_STREAKS);

    let mut efficiency: Vec<EfficiencyLine> = totals
        .values()
        .filter(|p| p.matches >= EFFICIENCY_MIN_MATCHES && p.goals > 0)
        .map(|p| EfficiencyLine {
            name: p.name.clone(),
            goals: p.goals,
            matches: p.matches,
            efficiency: (f64::from(p.goals) / f64::from(p.matches) * 100.0).round() / 100.0,
        })
        .collect();
    efficiency.sort_by(|a, b| {
        b.efficiency
            .partial_cmp(&a.efficiency)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
    });
    efficiency.truncate(TOP_EFFICIENCY);

    Ok(TeamAdvancedStats {
        team,
        games_played,
        goals_for,
        goals_against,
        goals_for_avg: per_game(goals_for),
        goals_against_avg: per_game(goals_against),
        best_scorer,
        top_points,
        top_assist,
        top_opponents,
        top_streaks,
        efficiency,
    })
}

fn pick_best<K: Ord>(
    totals: &HashMap<String, PlayerTotals>,
    key: impl Fn(&PlayerTotals) -> K,
) -> Option<PlayerTotals> {
    totals
        .values()
        .max_by(|a, b| key(a).cmp(&key(b)).then_with(|| b.name.cmp(&a.name)))
        .cloned()
}
