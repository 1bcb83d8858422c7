use std::collections::HashMap;

use anyhow::{bail, Result};
use serde::Serialize;

use crate::attribution::AttributionPolicy;
use crate::model::{MatchRecord, ScoringEvent, TeamSide};
use crate::normalize::normalize_whitespace;

/// Joins sorted player names into a group key. Chosen because it cannot
/// appear inside a player name, unlike a space or a plus sign.
pub const GROUP_DELIMITER: &str = "|||";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupSize {
    Duo,
    Trio,
    Quartet,
}

impl GroupSize {
    pub fn count(self) -> usize {
        match self {
            GroupSize::Duo => 2,
            GroupSize::Trio => 3,
            GroupSize::Quartet => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GroupSize::Duo => "duo",
            GroupSize::Trio => "trio",
            GroupSize::Quartet => "quartet",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CombinationParams {
    pub size: GroupSize,
    /// Minimum goals per player for trio/quartet qualification. Duos always
    /// require exactly one goal or more, whatever this is set to.
    pub min_goals: u32,
    pub policy: AttributionPolicy,
}

impl CombinationParams {
    pub fn new(size: GroupSize) -> Self {
        Self {
            size,
            min_goals: 1,
            policy: AttributionPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OpponentCount {
    pub opponent: String,
    pub count: u32,
}

/// One match seen from the analyzed team's perspective, as recorded in a
/// group's match list.
#[derive(Debug, Clone, Serialize)]
pub struct GroupMatch {
    pub date: String,
    pub opponent: String,
    pub is_home: bool,
    pub score: String,
    pub win: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CoScoringGroup {
    pub players: Vec<String>,
    pub matches_together: u32,
    pub total_goals: u32,
    pub wins: u32,
    /// Percent, one decimal.
    pub win_rate: f64,
    /// Two decimals; only computed for trios and quartets.
    pub goals_per_match: Option<f64>,
    pub opponents: Vec<OpponentCount>,
    pub match_list: Vec<GroupMatch>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScorerLine {
    pub name: String,
    pub goals: u32,
    pub assists: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchGroupLine {
    pub players: Vec<String>,
    pub goals: u32,
}

/// Per-match breakdown for matches that produced at least one group.
#[derive(Debug, Clone, Serialize)]
pub struct MatchWithGroups {
    pub date: String,
    pub opponent: String,
    pub is_home: bool,
    pub score: String,
    pub scorers: Vec<ScorerLine>,
    pub groups: Vec<MatchGroupLine>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CombinationReport {
    pub team: String,
    pub size: GroupSize,
    pub match_count: usize,
    pub groups: Vec<CoScoringGroup>,
    pub matches_with_groups: Vec<MatchWithGroups>,
}

struct GroupAccumulator {
    players: Vec<String>,
    matches_together: u32,
    total_goals: u32,
    wins: u32,
    opponents: HashMap<String, u32>,
    match_list: Vec<GroupMatch>,
}

/// Enumerate all k-subsets of players who scored together for one team and
/// accumulate their shared record across the team's match history.
///
/// `matches` is expected to be the team's final-match history, newest
/// first, as returned by the store. No-data input yields an empty report,
/// not an error.
pub fn analyze_co_scoring(
    team: &str,
    matches: &[MatchRecord],
    params: CombinationParams,
) -> Result<CombinationReport> {
    let team = normalize_whitespace(team);
    if team.is_empty() {
        bail!("team name is required");
    }
    if params.min_goals == 0 {
        bail!("min_goals must be at least 1");
    }

    let k = params.size.count();
    let threshold = match params.size {
        GroupSize::Duo => 1,
        _ => params.min_goals,
    };

    let mut stats: HashMap<String, GroupAccumulator> = HashMap::new();
    let mut matches_with_groups: Vec<MatchWithGroups> = Vec::new();

    for m in matches {
        let side = match m.side_of(&team) {
            Some(side) => side,
            // Alias drift between the query and the stored name; the source
            // system fell back to treating the team as the away side.
            None => TeamSide::Away,
        };
        let opponent = m.opponent(side).to_string();

        let team_scorers: Vec<&ScoringEvent> = m
            .scorers
            .iter()
            .filter(|e| params.policy.claims(e.side, side))
            .filter(|e| !normalize_whitespace(&e.name).is_empty())
            .collect();

        let qualifying: Vec<&ScoringEvent> = team_scorers
            .iter()
            .copied()
            .filter(|e| e.goals >= threshold)
            .collect();

        if qualifying.len() < k {
            continue;
        }

        let win = m.is_win_for(side);
        let score = m.score_seen_from(side);
        let mut match_groups: Vec<MatchGroupLine> = Vec::new();

        for_each_combination(qualifying.len(), k, |idx| {
            let mut players: Vec<String> = idx
                .iter()
                .map(|&i| normalize_whitespace(&qualifying[i].name))
                .collect();
            players.sort_unstable();
            let goals: u32 = idx.iter().map(|&i| qualifying[i].goals).sum();
            let key = players.join(GROUP_DELIMITER);

            let entry = stats.entry(key).or_insert_with(|| GroupAccumulator {
                players: players.clone(),
                matches_together: 0,
                total_goals: 0,
                wins: 0,
                opponents: HashMap::new(),
                match_list: Vec::new(),
            });
            entry.matches_together += 1;
            entry.total_goals += goals;
            if win {
                entry.wins += 1;
            }
            *entry.opponents.entry(opponent.clone()).or_insert(0) += 1;
            entry.match_list.push(GroupMatch {
                date: m.date.clone(),
                opponent: opponent.clone(),
                is_home: side == TeamSide::Home,
                score: score.clone(),
                win,
            });

            match_groups.push(MatchGroupLine { players, goals });
        });

        if !match_groups.is_empty() {
            matches_with_groups.push(MatchWithGroups {
                date: m.date.clone(),
                opponent,
                is_home: side == TeamSide::Home,
                score,
                scorers: team_scorers
                    .iter()
                    .map(|e| ScorerLine {
                        name: normalize_whitespace(&e.name),
                        goals: e.goals,
                        assists: e.assists,
                    })
                    .collect(),
                groups: match_groups,
            });
        }
    }

    let mut groups: Vec<CoScoringGroup> = stats
        .into_values()
        .map(|acc| finalize_group(acc, params.size))
        .collect();
    // Primary rank is shared matches; ties break deterministically instead
    // of inheriting map iteration order.
    groups.sort_by(|a, b| {
        b.matches_together
            .cmp(&a.matches_together)
            .then_with(|| b.total_goals.cmp(&a.total_goals))
            .then_with(|| a.players.cmp(&b.players))
    });

    matches_with_groups.sort_by(|a, b| b.date.cmp(&a.date));

    Ok(CombinationReport {
        team,
        size: params.size,
        match_count: matches.len(),
        groups,
        matches_with_groups,
    })
}

fn finalize_group(acc: GroupAccumulator, size: GroupSize) -> CoScoringGroup {
    let win_rate = if acc.matches_together > 0 {
        let rate = f64::from(acc.wins) / f64::from(acc.matches_together) * 100.0;
        (rate * 10.0).round() / 10.0
    } else {
        0.0
    };
    let goals_per_match = match size {
        GroupSize::Duo => None,
        _ if acc.matches_together > 0 => {
            let per = f64::from(acc.total_goals) / f64::from(acc.matches_together);
            Some((per * 100.0).round() / 100.0)
        }
        _ => Some(0.0),
    };

    let mut opponents: Vec<OpponentCount> = acc
        .opponents
        .into_iter()
        .map(|(opponent, count)| OpponentCount { opponent, count })
        .collect();
    opponents.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.opponent.cmp(&b.opponent)));

    CoScoringGroup {
        players: acc.players,
        matches_together: acc.matches_together,
        total_goals: acc.total_goals,
        wins: acc.wins,
        win_rate,
        goals_per_match,
        opponents,
        match_list: acc.match_list,
    }
}

/// Visits every k-element index combination of 0..n in lexicographic order.
/// Correct for any n; per-match scorer counts are small in practice, so the
/// C(n,k) growth is not a concern there.
fn for_each_combination<F: FnMut(&[usize])>(n: usize, k: usize, mut visit: F) {
    if k == 0 || k > n {
        return;
    }
    let mut idx: Vec<usize> = (0..k).collect();
    loop {
        visit(&idx);
        // Find the rightmost index that can still advance.
        let mut i = k;
        loop {
            if i == 0 {
                return;
            }
            i -= 1;
            if idx[i] != i + n - k {
                break;
            }
            if i == 0 {
                return;
            }
        }
        idx[i] += 1;
        for j in (i + 1)..k {
            idx[j] = idx[j - 1] + 1;
        }
    }
}
