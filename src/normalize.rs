use std::collections::HashMap;

use once_cell::sync::Lazy;

/// Trim and collapse internal whitespace runs to single spaces. Total over
/// all inputs; empty stays empty.
pub fn normalize_whitespace(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Team-name alias table: city nickname, 3-letter abbreviation, and full
/// franchise name all map to one canonical full name. A single shared table
/// is passed to every consumer; there are no per-module copies.
///
/// Lookup is a pure table match after whitespace normalization — no fuzzy
/// matching. Unknown names pass through normalized but otherwise unchanged.
#[derive(Debug, Clone, Default)]
pub struct TeamAliases {
    canonical_by_alias: HashMap<String, String>,
    variants_by_canonical: HashMap<String, Vec<String>>,
}

impl TeamAliases {
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut table = TeamAliases::default();
        for (alias, canonical) in pairs {
            table.insert(alias, canonical);
        }
        table
    }

    fn insert(&mut self, alias: &str, canonical: &str) {
        let alias = normalize_whitespace(alias);
        let canonical = normalize_whitespace(canonical);
        if alias.is_empty() || canonical.is_empty() {
            return;
        }
        self.canonical_by_alias
            .insert(alias.clone(), canonical.clone());
        let variants = self.variants_by_canonical.entry(canonical.clone()).or_default();
        if !variants.contains(&canonical) {
            variants.push(canonical);
        }
        if !variants.contains(&alias) {
            variants.push(alias);
        }
    }

    /// Canonical full name for any known alias; unknown input is returned
    /// whitespace-normalized.
    pub fn canonical(&self, name: &str) -> String {
        let normalized = normalize_whitespace(name);
        match self.canonical_by_alias.get(&normalized) {
            Some(canonical) => canonical.clone(),
            None => normalized,
        }
    }

    /// Every known spelling of a team, canonical form included. Unknown
    /// teams yield just their normalized name, so alias-set queries still
    /// work for teams missing from the table.
    pub fn variants(&self, name: &str) -> Vec<String> {
        let canonical = self.canonical(name);
        match self.variants_by_canonical.get(&canonical) {
            Some(variants) => variants.clone(),
            None => vec![canonical],
        }
    }

    pub fn is_known(&self, name: &str) -> bool {
        self.canonical_by_alias
            .contains_key(&normalize_whitespace(name))
    }

    /// Full 32-franchise NHL table.
    pub fn nhl() -> Self {
        let mut table = TeamAliases::default();
        for (full, nickname, abbr) in NHL_FRANCHISES {
            table.insert(full, full);
            table.insert(nickname, full);
            table.insert(abbr, full);
        }
        // Spellings seen in upstream feeds that differ from the canonical row.
        table.insert("Montréal Canadiens", "Montreal Canadiens");
        table.insert("St Louis Blues", "St. Louis Blues");
        table.insert("UHC", "Utah Hockey Club");
        table
    }
}

/// Shared default table; callers that want a custom alias set construct
/// their own `TeamAliases` and pass it instead.
pub fn nhl_aliases() -> &'static TeamAliases {
    static TABLE: Lazy<TeamAliases> = Lazy::new(TeamAliases::nhl);
    &TABLE
}

const NHL_FRANCHISES: [(&str, &str, &str); 32] = [
    ("Anaheim Ducks", "Ducks", "ANA"),
    ("Boston Bruins", "Bruins", "BOS"),
    ("Buffalo Sabres", "Sabres", "BUF"),
    ("Calgary Flames", "Flames", "CGY"),
    ("Carolina Hurricanes", "Hurricanes", "CAR"),
    ("Chicago Blackhawks", "Blackhawks", "CHI"),
    ("Colorado Avalanche", "Avalanche", "COL"),
    ("Columbus Blue Jackets", "Blue Jackets", "CBJ"),
    ("Dallas Stars", "Stars", "DAL"),
    ("Detroit Red Wings", "Red Wings", "DET"),
    ("Edmonton Oilers", "Oilers", "EDM"),
    ("Florida Panthers", "Panthers", "FLA"),
    ("Los Angeles Kings", "Kings", "LAK"),
    ("Minnesota Wild", "Wild", "MIN"),
    ("Montreal Canadiens", "Canadiens", "MTL"),
    ("Nashville Predators", "Predators", "NSH"),
    ("New Jersey Devils", "Devils", "NJD"),
    ("New York Islanders", "Islanders", "NYI"),
    ("New York Rangers", "Rangers", "NYR"),
    ("Ottawa Senators", "Senators", "OTT"),
    ("Philadelphia Flyers", "Flyers", "PHI"),
    ("Pittsburgh Penguins", "Penguins", "PIT"),
    ("San Jose Sharks", "Sharks", "SJS"),
    ("Seattle Kraken", "Kraken", "SEA"),
    ("St. Louis Blues", "Blues", "STL"),
    ("Tampa Bay Lightning", "Lightning", "TBL"),
    ("Toronto Maple Leafs", "Maple Leafs", "TOR"),
    ("Utah Hockey Club", "Utah", "UTA"),
    ("Vancouver Canucks", "Canucks", "VAN"),
    ("Vegas Golden Knights", "Golden Knights", "VGK"),
    ("Washington Capitals", "Capitals", "WSH"),
    ("Winnipeg Jets", "Jets", "WPG"),
];
