use std::collections::HashMap;

use serde::Serialize;

use crate::attribution::AttributionPolicy;
use crate::model::{MatchRecord, TeamSide};
use crate::normalize::normalize_whitespace;
use crate::weighting::{latest_match_date, parse_match_date, RecencyWeight};

const PAIR_DELIMITER: &str = "|||";

/// Cumulative per-player line across a match set. The weighted fields scale
/// each match's contribution by its recency weight; the raw counters do not.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PlayerAggregateStats {
    pub goals: u32,
    pub assists: u32,
    pub appearances: u32,
    pub weighted_goals: f64,
    pub weighted_assists: f64,
}

/// Two players both credited with a goal in the same match. The score is
/// frequency-weighted — each shared match adds that match's recency weight,
/// regardless of how many goals either player scored.
#[derive(Debug, Clone, Serialize)]
pub struct SynergyPair {
    pub players: [String; 2],
    pub weighted_score: f64,
}

#[derive(Debug, Clone, Default)]
pub struct WeightedAggregation {
    pub players: HashMap<String, PlayerAggregateStats>,
    pub synergy: HashMap<String, SynergyPair>,
}

impl WeightedAggregation {
    /// Synergy pairs ranked by weighted score, ties broken by pair name so
    /// output is deterministic.
    pub fn ranked_synergy(&self) -> Vec<&SynergyPair> {
        let mut pairs: Vec<&SynergyPair> = self.synergy.values().collect();
        pairs.sort_by(|a, b| {
            b.weighted_score
                .partial_cmp(&a.weighted_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.players.cmp(&b.players))
        });
        pairs
    }
}

pub fn pair_key(a: &str, b: &str) -> String {
    let mut names = [a, b];
    names.sort_unstable();
    names.join(PAIR_DELIMITER)
}

/// Recency-weighted aggregation over a match set already scoped to the
/// relevant team(s). Every scorer in every match contributes to the player
/// map; synergy pairs are built from scorers with at least one goal.
///
/// A single malformed match (unparseable date, no scorers) is skipped and
/// logged; it never aborts the rest of the set.
pub fn aggregate_weighted(matches: &[MatchRecord], cfg: &RecencyWeight) -> WeightedAggregation {
    let mut out = WeightedAggregation::default();
    let Some(latest) = latest_match_date(matches) else {
        if !matches.is_empty() {
            log::warn!("no parseable match dates in a set of {}", matches.len());
        }
        return out;
    };

    for m in matches {
        let Some(date) = parse_match_date(&m.date) else {
            log::warn!("skipping match {}: unparseable date {:?}", m.game_id, m.date);
            continue;
        };
        if m.scorers.is_empty() {
            log::debug!("match {} has no scorer records", m.game_id);
            continue;
        }
        let weight = cfg.weight((latest - date).num_days());

        let mut active: Vec<String> = Vec::new();
        for event in &m.scorers {
            let name = normalize_whitespace(&event.name);
            if name.is_empty() {
                log::warn!("skipping unnamed scorer in match {}", m.game_id);
                continue;
            }
            let entry = out.players.entry(name.clone()).or_default();
            entry.goals += event.goals;
            entry.assists += event.assists;
            entry.appearances += 1;
            entry.weighted_goals += f64::from(event.goals) * weight;
            entry.weighted_assists += f64::from(event.assists) * weight;

            if event.goals > 0 {
                active.push(name);
            }
        }

        for i in 0..active.len() {
            for j in (i + 1)..active.len() {
                if active[i] == active[j] {
                    continue;
                }
                let key = pair_key(&active[i], &active[j]);
                let mut names = [active[i].clone(), active[j].clone()];
                names.sort_unstable();
                out.synergy
                    .entry(key)
                    .or_insert_with(|| SynergyPair {
                        players: names,
                        weighted_score: 0.0,
                    })
                    .weighted_score += weight;
            }
        }
    }

    out
}

/// Unweighted per-player line used by the recent-form prediction fallback.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct FormLine {
    pub goals: u32,
    pub assists: u32,
    pub appearances: u32,
}

#[derive(Debug, Clone, Default)]
pub struct RecentForm {
    pub players: HashMap<String, FormLine>,
    pub team_goals: u32,
    pub matches: usize,
}

impl RecentForm {
    /// Average goals per game over the window, rounded to one decimal. The
    /// divisor is the full window, including matches missing a score.
    pub fn avg_goals(&self) -> f64 {
        if self.matches == 0 {
            return 0.0;
        }
        let avg = f64::from(self.team_goals) / self.matches as f64;
        (avg * 10.0).round() / 10.0
    }
}

/// Plain (unweighted) aggregation of one team's recent matches. Events are
/// filtered to the analyzed team per the attribution policy; team goals sum
/// the team's own side of each scoreline, skipping matches missing either
/// score.
pub fn aggregate_recent_form(
    matches: &[MatchRecord],
    variants: &[String],
    policy: AttributionPolicy,
) -> RecentForm {
    let mut out = RecentForm {
        matches: matches.len(),
        ..RecentForm::default()
    };

    for m in matches {
        // A match fetched by alias-set query always contains the team; if
        // the record somehow does not, read it from the away side.
        let side = m.side_of_any(variants).unwrap_or(TeamSide::Away);

        if let (Some(_), Some(_)) = (m.home_score, m.away_score) {
            out.team_goals += m.score_for(side).unwrap_or(0);
        }

        for event in &m.scorers {
            if !policy.claims(event.side, side) {
                continue;
            }
            let name = normalize_whitespace(&event.name);
            if name.is_empty() {
                continue;
            }
            let line = out.players.entry(name).or_default();
            line.goals += event.goals;
            line.assists += event.assists;
            line.appearances += 1;
        }
    }

    out
}
