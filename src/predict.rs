use anyhow::{bail, Result};
use serde::Serialize;

use crate::aggregate::{aggregate_recent_form, aggregate_weighted, RecentForm};
use crate::attribution::AttributionPolicy;
use crate::model::MatchRecord;
use crate::normalize::{normalize_whitespace, TeamAliases};
use crate::store::MatchStore;
use crate::weighting::RecencyWeight;

pub const DEFAULT_SCORER_LIMIT: usize = 3;
/// Matches per team in the recent-form fallback window.
pub const RECENT_FORM_WINDOW: usize = 10;
const ASSIST_WEIGHT: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionSource {
    /// Derived from actual head-to-head history between the two teams.
    Direct,
    /// Derived from each team's independent recent form.
    Individual,
    /// A runtime failure degraded the prediction to an empty result.
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScorerPrediction {
    pub name: String,
    pub score: f64,
    pub goals: u32,
    pub assists: u32,
    pub appearances: u32,
    pub efficiency: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SynergyPick {
    pub pair: [String; 2],
    /// Recency-weighted shared-match count, one decimal. A float presented
    /// as a match count — kept as the source system reported it.
    pub matches_together: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchupPrediction {
    pub sorted_scorers: Vec<ScorerPrediction>,
    pub top_synergy: Vec<SynergyPick>,
    pub match_count: usize,
    /// Direct mode: goals summed over the head-to-head set. Individual
    /// mode: average goals per game over the recent window, one decimal.
    pub team_a_goals: f64,
    pub team_b_goals: f64,
    pub source: PredictionSource,
}

impl MatchupPrediction {
    pub fn empty(source: PredictionSource) -> Self {
        Self {
            sorted_scorers: Vec::new(),
            top_synergy: Vec::new(),
            match_count: 0,
            team_a_goals: 0.0,
            team_b_goals: 0.0,
            source,
        }
    }
}

/// Predict likely scorers and the top synergy pair for a matchup.
///
/// Direct head-to-head history is preferred; with none, each team's last
/// `RECENT_FORM_WINDOW` finals stand in. Blank team names are rejected;
/// any failure past validation degrades to `MatchupPrediction::empty`
/// tagged `Error`, so schedule-wide batch callers can keep going.
pub fn predict_scorers_between_teams(
    store: &MatchStore,
    aliases: &TeamAliases,
    team_a: &str,
    team_b: &str,
    limit: usize,
) -> Result<MatchupPrediction> {
    let team_a = normalize_whitespace(team_a);
    let team_b = normalize_whitespace(team_b);
    if team_a.is_empty() || team_b.is_empty() {
        bail!("both team names are required");
    }

    let a_variants = aliases.variants(&team_a);
    let b_variants = aliases.variants(&team_b);

    let prediction = run_prediction(store, &a_variants, &b_variants, limit);
    Ok(prediction.unwrap_or_else(|err| {
        log::error!("prediction failed for {team_a} vs {team_b}: {err:#}");
        MatchupPrediction::empty(PredictionSource::Error)
    }))
}

fn run_prediction(
    store: &MatchStore,
    a_variants: &[String],
    b_variants: &[String],
    limit: usize,
) -> Result<MatchupPrediction> {
    let direct = store.head_to_head_finals(a_variants, b_variants)?;
    if !direct.is_empty() {
        return Ok(predict_from_head_to_head(
            &direct,
            a_variants,
            b_variants,
            limit,
            &RecencyWeight::default(),
        ));
    }

    log::debug!("no direct history; falling back to recent form");
    let a_recent = store.recent_final_matches(a_variants, RECENT_FORM_WINDOW)?;
    let b_recent = store.recent_final_matches(b_variants, RECENT_FORM_WINDOW)?;
    Ok(predict_from_recent_form(
        &a_recent, &b_recent, a_variants, b_variants, limit,
    ))
}

/// Direct-history prediction: recency-weighted aggregation over the mutual
/// match set. Every scorer in those matches enters the pool (no team
/// filter — these matches contain only the two teams in question).
pub fn predict_from_head_to_head(
    matches: &[MatchRecord],
    a_variants: &[String],
    b_variants: &[String],
    limit: usize,
    cfg: &RecencyWeight,
) -> MatchupPrediction {
    let agg = aggregate_weighted(matches, cfg);

    let mut sorted_scorers: Vec<ScorerPrediction> = agg
        .players
        .iter()
        .map(|(name, s)| ScorerPrediction {
            name: name.clone(),
            score: s.weighted_goals + s.weighted_assists * ASSIST_WEIGHT,
            goals: s.goals,
            assists: s.assists,
            appearances: s.appearances,
            efficiency: efficiency(s.goals, s.appearances),
        })
        .collect();
    rank_scorers(&mut sorted_scorers, limit);

    let top_synergy: Vec<SynergyPick> = agg
        .ranked_synergy()
        .into_iter()
        .take(1)
        .map(|pair| SynergyPick {
            pair: pair.players.clone(),
            matches_together: (pair.weighted_score * 10.0).round() / 10.0,
        })
        .collect();

    // Matches with a missing score on either side are skipped here rather
    // than read as zero.
    let mut team_a_goals = 0u32;
    let mut team_b_goals = 0u32;
    for m in matches {
        let (Some(_), Some(_)) = (m.home_score, m.away_score) else {
            continue;
        };
        if let Some(side) = m.side_of_any(a_variants) {
            team_a_goals += m.score_for(side).unwrap_or(0);
        }
        if let Some(side) = m.side_of_any(b_variants) {
            team_b_goals += m.score_for(side).unwrap_or(0);
        }
    }

    MatchupPrediction {
        sorted_scorers,
        top_synergy,
        match_count: matches.len(),
        team_a_goals: f64::from(team_a_goals),
        team_b_goals: f64::from(team_b_goals),
        source: PredictionSource::Direct,
    }
}

/// Recent-form fallback: unweighted totals over each team's own window,
/// combined into one ranked pool. No synergy pairs are computed in this
/// mode — recent opponents vary too much for pair history to mean anything.
pub fn predict_from_recent_form(
    a_matches: &[MatchRecord],
    b_matches: &[MatchRecord],
    a_variants: &[String],
    b_variants: &[String],
    limit: usize,
) -> MatchupPrediction {
    let policy = AttributionPolicy::OptimisticOwnTeam;
    let a_form = aggregate_recent_form(a_matches, a_variants, policy);
    let b_form = aggregate_recent_form(b_matches, b_variants, policy);

    let mut sorted_scorers: Vec<ScorerPrediction> = Vec::new();
    collect_form_lines(&mut sorted_scorers, &a_form);
    collect_form_lines(&mut sorted_scorers, &b_form);
    rank_scorers(&mut sorted_scorers, limit);

    MatchupPrediction {
        sorted_scorers,
        top_synergy: Vec::new(),
        match_count: a_matches.len().max(b_matches.len()),
        team_a_goals: a_form.avg_goals(),
        team_b_goals: b_form.avg_goals(),
        source: PredictionSource::Individual,
    }
}

fn collect_form_lines(out: &mut Vec<ScorerPrediction>, form: &RecentForm) {
    for (name, line) in &form.players {
        out.push(ScorerPrediction {
            name: name.clone(),
            score: f64::from(line.goals) + f64::from(line.assists) * ASSIST_WEIGHT,
            goals: line.goals,
            assists: line.assists,
            appearances: line.appearances,
            efficiency: efficiency(line.goals, line.appearances),
        });
    }
}

fn rank_scorers(scorers: &mut Vec<ScorerPrediction>, limit: usize) {
    scorers.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
    });
    scorers.truncate(limit);
}

fn efficiency(goals: u32, appearances: u32) -> f64 {
    if appearances == 0 {
        0.0
    } else {
        f64::from(goals) / f64::from(appearances)
    }
}
