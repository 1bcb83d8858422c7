use chrono::NaiveDate;

use crate::model::MatchRecord;

/// Linear recency decay with a floor, applied per match relative to the
/// newest match in the set under analysis. A match a full window (or more)
/// old still contributes at `floor * multiplier` — historical data is
/// sparse, so old matches keep signal instead of decaying to zero.
#[derive(Debug, Clone, Copy)]
pub struct RecencyWeight {
    pub floor: f64,
    pub multiplier: f64,
    pub window_days: f64,
}

impl Default for RecencyWeight {
    fn default() -> Self {
        Self {
            floor: 0.5,
            multiplier: 1.5,
            window_days: 365.0,
        }
    }
}

impl RecencyWeight {
    pub fn weight(&self, days_since: i64) -> f64 {
        let days = days_since.max(0) as f64;
        (1.0 - days / self.window_days).max(self.floor) * self.multiplier
    }
}

/// Stored dates are `YYYY-MM-DD`; some upstream records carry a full
/// timestamp, so only the leading date segment is parsed.
pub fn parse_match_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    let head = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

/// Newest parseable date in the set. Records with missing or invalid dates
/// never win this scan.
pub fn latest_match_date(matches: &[MatchRecord]) -> Option<NaiveDate> {
    matches
        .iter()
        .filter_map(|m| parse_match_date(&m.date))
        .max()
}
