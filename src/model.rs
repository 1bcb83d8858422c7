use serde::{Deserialize, Serialize};

/// Game states the NHL API reports for concluded games. Only matches in one
/// of these states are eligible for aggregation.
pub const FINAL_STATUSES: [&str; 5] = ["FINAL", "OFFICIAL", "OFF", "F", "7"];

pub fn is_final_status(status: &str) -> bool {
    FINAL_STATUSES.contains(&status.trim())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamSide {
    Home,
    Away,
}

impl TeamSide {
    pub fn opposite(self) -> TeamSide {
        match self {
            TeamSide::Home => TeamSide::Away,
            TeamSide::Away => TeamSide::Home,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TeamSide::Home => "home",
            TeamSide::Away => "away",
        }
    }

    pub fn parse(raw: &str) -> Option<TeamSide> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "home" => Some(TeamSide::Home),
            "away" => Some(TeamSide::Away),
            _ => None,
        }
    }
}

/// One player's scoring line in one game. `side` is frequently absent in
/// older records; consumers apply an `AttributionPolicy` instead of failing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringEvent {
    pub name: String,
    pub goals: u32,
    pub assists: u32,
    pub side: Option<TeamSide>,
}

/// A stored game. Scores are optional because some upstream records arrive
/// without them; a missing score is a data-quality gap, not a real 0-0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRecord {
    pub game_id: String,
    pub date: String,
    pub home_team: String,
    pub away_team: String,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
    pub status: String,
    pub scorers: Vec<ScoringEvent>,
}

impl MatchRecord {
    pub fn is_final(&self) -> bool {
        is_final_status(&self.status)
    }

    /// Which side of this match a team plays on, by exact name match.
    pub fn side_of(&self, team: &str) -> Option<TeamSide> {
        if self.home_team == team {
            Some(TeamSide::Home)
        } else if self.away_team == team {
            Some(TeamSide::Away)
        } else {
            None
        }
    }

    /// Which side of this match a team plays on, by alias-set membership.
    pub fn side_of_any(&self, variants: &[String]) -> Option<TeamSide> {
        if variants.iter().any(|v| *v == self.home_team) {
            Some(TeamSide::Home)
        } else if variants.iter().any(|v| *v == self.away_team) {
            Some(TeamSide::Away)
        } else {
            None
        }
    }

    pub fn opponent(&self, side: TeamSide) -> &str {
        match side {
            TeamSide::Home => &self.away_team,
            TeamSide::Away => &self.home_team,
        }
    }

    pub fn score_for(&self, side: TeamSide) -> Option<u32> {
        match side {
            TeamSide::Home => self.home_score,
            TeamSide::Away => self.away_score,
        }
    }

    pub fn score_against(&self, side: TeamSide) -> Option<u32> {
        self.score_for(side.opposite())
    }

    /// Missing scores count as 0 here, so a score-less record never reads
    /// as a win.
    pub fn is_win_for(&self, side: TeamSide) -> bool {
        self.score_for(side).unwrap_or(0) > self.score_against(side).unwrap_or(0)
    }

    /// "own-opponent" score string from one side's perspective.
    pub fn score_seen_from(&self, side: TeamSide) -> String {
        format!(
            "{}-{}",
            self.score_for(side).unwrap_or(0),
            self.score_against(side).unwrap_or(0)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(status: &str, home_score: Option<u32>, away_score: Option<u32>) -> MatchRecord {
        MatchRecord {
            game_id: "g1".to_string(),
            date: "2025-01-15".to_string(),
            home_team: "Colorado Avalanche".to_string(),
            away_team: "Dallas Stars".to_string(),
            home_score,
            away_score,
            status: status.to_string(),
            scorers: Vec::new(),
        }
    }

    #[test]
    fn final_status_set_matches_known_states() {
        for s in ["FINAL", "OFFICIAL", "OFF", "F", "7"] {
            assert!(is_final_status(s), "{s} should be final");
        }
        assert!(!is_final_status("FUT"));
        assert!(!is_final_status("LIVE"));
        assert!(is_final_status(" FINAL "));
    }

    #[test]
    fn side_lookup_is_exact() {
        let m = record("FINAL", Some(3), Some(2));
        assert_eq!(m.side_of("Colorado Avalanche"), Some(TeamSide::Home));
        assert_eq!(m.side_of("Dallas Stars"), Some(TeamSide::Away));
        assert_eq!(m.side_of("Avalanche"), None);
    }

    #[test]
    fn missing_scores_never_read_as_a_win() {
        let m = record("FINAL", None, None);
        assert!(!m.is_win_for(TeamSide::Home));
        assert!(!m.is_win_for(TeamSide::Away));
        assert_eq!(m.score_seen_from(TeamSide::Away), "0-0");
    }

    #[test]
    fn perspective_score_string_flips_for_away() {
        let m = record("FINAL", Some(4), Some(1));
        assert_eq!(m.score_seen_from(TeamSide::Home), "4-1");
        assert_eq!(m.score_seen_from(TeamSide::Away), "1-4");
        assert!(m.is_win_for(TeamSide::Home));
        assert!(!m.is_win_for(TeamSide::Away));
    }
}
