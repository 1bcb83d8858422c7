use puckcast::model::{MatchRecord, ScoringEvent, TeamSide};
use puckcast::store::MatchStore;

fn event(name: &str, goals: u32, assists: u32, side: Option<TeamSide>) -> ScoringEvent {
    ScoringEvent {
        name: name.to_string(),
        goals,
        assists,
        side,
    }
}

fn record(
    game_id: &str,
    date: &str,
    home: &str,
    away: &str,
    score: (u32, u32),
    status: &str,
    scorers: Vec<ScoringEvent>,
) -> MatchRecord {
    MatchRecord {
        game_id: game_id.to_string(),
        date: date.to_string(),
        home_team: home.to_string(),
        away_team: away.to_string(),
        home_score: Some(score.0),
        away_score: Some(score.1),
        status: status.to_string(),
        scorers,
    }
}

#[test]
fn upsert_round_trips_matches_and_scorers() {
    let mut store = MatchStore::open_in_memory().unwrap();
    let m = record(
        "g1",
        "2025-01-10",
        "Colorado Avalanche",
        "Dallas Stars",
        (4, 2),
        "FINAL",
        vec![
            event("Nathan MacKinnon", 2, 1, Some(TeamSide::Home)),
            event("Jason Robertson", 1, 0, Some(TeamSide::Away)),
            event("Legacy Import", 1, 1, None),
        ],
    );
    store.upsert_match(&m).unwrap();

    let vars = vec!["Colorado Avalanche".to_string()];
    let loaded = store.final_matches_for_team(&vars).unwrap();
    assert_eq!(loaded.len(), 1);
    let got = &loaded[0];
    assert_eq!(got.game_id, "g1");
    assert_eq!(got.home_score, Some(4));
    assert_eq!(got.scorers.len(), 3);
    assert_eq!(got.scorers[0].name, "Nathan MacKinnon");
    assert_eq!(got.scorers[0].side, Some(TeamSide::Home));
    assert_eq!(got.scorers[2].side, None);
}

#[test]
fn reupsert_replaces_scorers_instead_of_duplicating() {
    let mut store = MatchStore::open_in_memory().unwrap();
    let mut m = record(
        "g1",
        "2025-01-10",
        "Colorado Avalanche",
        "Dallas Stars",
        (1, 0),
        "LIVE",
        vec![event("Early Scorer", 1, 0, Some(TeamSide::Home))],
    );
    store.upsert_match(&m).unwrap();

    // Game finishes; scores and scorers get their final values.
    m.status = "FINAL".to_string();
    m.home_score = Some(3);
    m.scorers = vec![
        event("Early Scorer", 2, 0, Some(TeamSide::Home)),
        event("Late Scorer", 1, 1, Some(TeamSide::Home)),
    ];
    store.upsert_match(&m).unwrap();

    assert_eq!(store.match_count().unwrap(), 1);
    let vars = vec!["Colorado Avalanche".to_string()];
    let loaded = store.final_matches_for_team(&vars).unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].home_score, Some(3));
    assert_eq!(loaded[0].scorers.len(), 2);
    assert_eq!(loaded[0].scorers[0].goals, 2);
}

#[test]
fn non_final_matches_are_invisible_to_final_queries() {
    let mut store = MatchStore::open_in_memory().unwrap();
    store
        .upsert_match(&record(
            "g1",
            "2025-01-10",
            "Colorado Avalanche",
            "Dallas Stars",
            (1, 1),
            "LIVE",
            vec![],
        ))
        .unwrap();
    store
        .upsert_match(&record(
            "g2",
            "2025-01-08",
            "Colorado Avalanche",
            "Dallas Stars",
            (3, 2),
            "OFF",
            vec![],
        ))
        .unwrap();

    let a = vec!["Colorado Avalanche".to_string()];
    let b = vec!["Dallas Stars".to_string()];
    let finals = store.head_to_head_finals(&a, &b).unwrap();
    assert_eq!(finals.len(), 1);
    assert_eq!(finals[0].game_id, "g2");

    // The looser substring lookup ignores status entirely.
    let all = store.matches_between_like("Avalanche", "Stars").unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].game_id, "g2"); // oldest first
}

#[test]
fn alias_set_queries_match_any_spelling() {
    let mut store = MatchStore::open_in_memory().unwrap();
    store
        .upsert_match(&record(
            "g1",
            "2025-01-10",
            "COL",
            "Dallas Stars",
            (2, 0),
            "FINAL",
            vec![],
        ))
        .unwrap();
    store
        .upsert_match(&record(
            "g2",
            "2025-01-08",
            "Seattle Kraken",
            "Colorado Avalanche",
            (0, 1),
            "FINAL",
            vec![],
        ))
        .unwrap();

    let vars = vec!["Colorado Avalanche".to_string(), "COL".to_string()];
    let matches = store.final_matches_for_team(&vars).unwrap();
    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0].game_id, "g1"); // newest first

    let recent = store.recent_final_matches(&vars, 1).unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].game_id, "g1");
}

#[test]
fn head_to_head_covers_both_home_away_orders() {
    let mut store = MatchStore::open_in_memory().unwrap();
    store
        .upsert_match(&record(
            "g1",
            "2025-01-10",
            "Colorado Avalanche",
            "Dallas Stars",
            (2, 1),
            "FINAL",
            vec![],
        ))
        .unwrap();
    store
        .upsert_match(&record(
            "g2",
            "2025-01-05",
            "Dallas Stars",
            "Colorado Avalanche",
            (4, 1),
            "FINAL",
            vec![],
        ))
        .unwrap();
    store
        .upsert_match(&record(
            "g3",
            "2025-01-03",
            "Colorado Avalanche",
            "Seattle Kraken",
            (3, 0),
            "FINAL",
            vec![],
        ))
        .unwrap();

    let a = vec!["Colorado Avalanche".to_string()];
    let b = vec!["Dallas Stars".to_string()];
    let matches = store.head_to_head_finals(&a, &b).unwrap();
    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0].game_id, "g1");
    assert_eq!(matches[1].game_id, "g2");
}

#[test]
fn empty_variant_lists_return_no_data() {
    let store = MatchStore::open_in_memory().unwrap();
    assert!(store.final_matches_for_team(&[]).unwrap().is_empty());
    assert!(store.head_to_head_finals(&[], &[]).unwrap().is_empty());
    assert!(store.matches_between_like("", "Stars").unwrap().is_empty());
}

#[test]
fn file_backed_store_reopens_for_worker_threads() {
    let dir = std::env::temp_dir().join("puckcast-store-test");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(format!("reopen-{}.sqlite", std::process::id()));
    let _ = std::fs::remove_file(&path);

    let mut store = MatchStore::open(&path).unwrap();
    store
        .upsert_match(&record(
            "g1",
            "2025-01-10",
            "Colorado Avalanche",
            "Dallas Stars",
            (2, 1),
            "FINAL",
            vec![],
        ))
        .unwrap();

    let reopened = store.reopen().unwrap();
    assert_eq!(reopened.match_count().unwrap(), 1);

    let in_memory = MatchStore::open_in_memory().unwrap();
    assert!(in_memory.reopen().is_err());

    drop(store);
    drop(reopened);
    let _ = std::fs::remove_file(&path);
}
