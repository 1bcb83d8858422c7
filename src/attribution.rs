use serde::{Deserialize, Serialize};

use crate::model::TeamSide;

/// What to do with a scoring event whose team side is absent. The upstream
/// feed frequently omits the side, so every team-scoped filter goes through
/// this policy rather than deciding ad hoc.
///
/// `OptimisticOwnTeam` counts every unattributed scorer toward whichever
/// team is being analyzed. Calling the same aggregate for both sides of a
/// match therefore double-counts unattributed events — a known precision
/// gap, preserved deliberately. `ExcludeUnattributed` drops those events
/// instead; nothing in this crate switches to it silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AttributionPolicy {
    #[default]
    OptimisticOwnTeam,
    ExcludeUnattributed,
}

impl AttributionPolicy {
    /// Whether an event with the given side tag counts for the side under
    /// analysis.
    pub fn claims(self, event_side: Option<TeamSide>, analyzed: TeamSide) -> bool {
        match event_side {
            Some(side) => side == analyzed,
            None => matches!(self, AttributionPolicy::OptimisticOwnTeam),
        }
    }
}
