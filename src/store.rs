use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::Utc;
use rusqlite::{params, params_from_iter, Connection};

use crate::http_cache::app_cache_dir;
use crate::model::{MatchRecord, ScoringEvent, TeamSide, FINAL_STATUSES};

pub fn default_db_path() -> Option<PathBuf> {
    app_cache_dir().map(|dir| dir.join("matches.sqlite"))
}

/// SQLite-backed match store. Holds finalized match facts plus their
/// per-game scoring events, and exposes exactly the query shapes the
/// aggregation core consumes.
pub struct MatchStore {
    conn: Connection,
    path: Option<PathBuf>,
}

impl MatchStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let conn = Connection::open(path)
            .with_context(|| format!("open match db {}", path.display()))?;
        init_schema(&conn)?;
        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory match db")?;
        init_schema(&conn)?;
        Ok(Self { conn, path: None })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Fresh connection to the same database, for per-thread use. In-memory
    /// stores have nothing to reopen.
    pub fn reopen(&self) -> Result<MatchStore> {
        match &self.path {
            Some(path) => MatchStore::open(path),
            None => bail!("cannot reopen an in-memory store"),
        }
    }

    pub fn upsert_match(&mut self, m: &MatchRecord) -> Result<()> {
        let tx = self.conn.transaction().context("begin upsert transaction")?;
        upsert_in_tx(&tx, m)?;
        tx.commit().context("commit upsert transaction")
    }

    pub fn upsert_matches(&mut self, matches: &[MatchRecord]) -> Result<usize> {
        let tx = self.conn.transaction().context("begin upsert transaction")?;
        for m in matches {
            upsert_in_tx(&tx, m)?;
        }
        tx.commit().context("commit upsert transaction")?;
        Ok(matches.len())
    }

    pub fn contains_game(&self, game_id: &str) -> Result<bool> {
        let count: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM matches WHERE game_id = ?1",
                params![game_id],
                |row| row.get(0),
            )
            .context("query game existence")?;
        Ok(count > 0)
    }

    pub fn match_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM matches", [], |row| row.get(0))
            .context("query match count")?;
        Ok(count as usize)
    }

    /// All final matches involving any spelling of one team, newest first.
    pub fn final_matches_for_team(&self, variants: &[String]) -> Result<Vec<MatchRecord>> {
        self.recent_final_matches(variants, usize::MAX)
    }

    /// The newest `limit` final matches involving any spelling of one team.
    pub fn recent_final_matches(
        &self,
        variants: &[String],
        limit: usize,
    ) -> Result<Vec<MatchRecord>> {
        if variants.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }
        let marks = placeholders(variants.len());
        let sql = format!(
            "SELECT {MATCH_COLUMNS} FROM matches
             WHERE (home_team IN ({marks}) OR away_team IN ({marks}))
               AND {final_filter}
             ORDER BY date DESC, game_id DESC
             LIMIT {limit}",
            final_filter = final_status_filter(),
            limit = limit.min(i64::MAX as usize),
        );
        let params: Vec<&str> = variants
            .iter()
            .chain(variants.iter())
            .map(String::as_str)
            .collect();
        self.load_matches(&sql, &params)
    }

    /// All final matches where the two alias sets met, in either home/away
    /// order, newest first.
    pub fn head_to_head_finals(
        &self,
        a_variants: &[String],
        b_variants: &[String],
    ) -> Result<Vec<MatchRecord>> {
        if a_variants.is_empty() || b_variants.is_empty() {
            return Ok(Vec::new());
        }
        let a_marks = placeholders(a_variants.len());
        let b_marks = placeholders(b_variants.len());
        let sql = format!(
            "SELECT {MATCH_COLUMNS} FROM matches
             WHERE ((home_team IN ({a_marks}) AND away_team IN ({b_marks}))
                 OR (home_team IN ({b_marks}) AND away_team IN ({a_marks})))
               AND {final_filter}
             ORDER BY date DESC, game_id DESC",
            final_filter = final_status_filter(),
        );
        let params: Vec<&str> = a_variants
            .iter()
            .chain(b_variants.iter())
            .chain(b_variants.iter())
            .chain(a_variants.iter())
            .map(String::as_str)
            .collect();
        self.load_matches(&sql, &params)
    }

    /// Case-insensitive substring lookup between two names, oldest first,
    /// with no status filter — the deliberately looser match used only by
    /// the head-to-head reducer.
    pub fn matches_between_like(&self, team_a: &str, team_b: &str) -> Result<Vec<MatchRecord>> {
        let a = team_a.trim();
        let b = team_b.trim();
        if a.is_empty() || b.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT {MATCH_COLUMNS} FROM matches
             WHERE (home_team LIKE '%' || ?1 || '%' AND away_team LIKE '%' || ?2 || '%')
                OR (home_team LIKE '%' || ?2 || '%' AND away_team LIKE '%' || ?1 || '%')
             ORDER BY date ASC, game_id ASC"
        );
        self.load_matches(&sql, &[a, b])
    }

    fn load_matches(&self, sql: &str, params: &[&str]) -> Result<Vec<MatchRecord>> {
        let mut stmt = self.conn.prepare(sql).context("prepare match query")?;
        let rows = stmt
            .query_map(params_from_iter(params.iter()), |row| {
                Ok(MatchRecord {
                    game_id: row.get(0)?,
                    date: row.get(1)?,
                    home_team: row.get(2)?,
                    away_team: row.get(3)?,
                    home_score: row.get(4)?,
                    away_score: row.get(5)?,
                    status: row.get(6)?,
                    scorers: Vec::new(),
                })
            })
            .context("query matches")?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row.context("decode match row")?);
        }

        let mut scorer_stmt = self
            .conn
            .prepare(
                "SELECT name, goals, assists, side FROM scorers
                 WHERE game_id = ?1 ORDER BY ord ASC",
            )
            .context("prepare scorer query")?;
        for m in &mut out {
            let events = scorer_stmt
                .query_map(params![m.game_id], |row| {
                    let side: Option<String> = row.get(3)?;
                    Ok(ScoringEvent {
                        name: row.get(0)?,
                        goals: row.get(1)?,
                        assists: row.get(2)?,
                        side: side.as_deref().and_then(TeamSide::parse),
                    })
                })
                .context("query scorers")?;
            for event in events {
                m.scorers.push(event.context("decode scorer row")?);
            }
        }
        Ok(out)
    }
}

const MATCH_COLUMNS: &str =
    "game_id, date, home_team, away_team, home_score, away_score, status";

fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        CREATE TABLE IF NOT EXISTS matches (
            game_id TEXT PRIMARY KEY,
            date TEXT NOT NULL,
            home_team TEXT NOT NULL,
            away_team TEXT NOT NULL,
            home_score INTEGER NULL,
            away_score INTEGER NULL,
            status TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_matches_home ON matches(home_team);
        CREATE INDEX IF NOT EXISTS idx_matches_away ON matches(away_team);
        CREATE INDEX IF NOT EXISTS idx_matches_date ON matches(date);

        CREATE TABLE IF NOT EXISTS scorers (
            game_id TEXT NOT NULL REFERENCES matches(game_id) ON DELETE CASCADE,
            ord INTEGER NOT NULL,
            name TEXT NOT NULL,
            goals INTEGER NOT NULL,
            assists INTEGER NOT NULL,
            side TEXT NULL,
            PRIMARY KEY (game_id, ord)
        );
        "#,
    )
    .context("create match store schema")?;
    Ok(())
}

fn upsert_in_tx(tx: &rusqlite::Transaction<'_>, m: &MatchRecord) -> Result<()> {
    tx.execute(
        r#"
        INSERT INTO matches (
            game_id, date, home_team, away_team,
            home_score, away_score, status, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        ON CONFLICT(game_id) DO UPDATE SET
            date = excluded.date,
            home_team = excluded.home_team,
            away_team = excluded.away_team,
            home_score = excluded.home_score,
            away_score = excluded.away_score,
            status = excluded.status,
            updated_at = excluded.updated_at
        "#,
        params![
            m.game_id,
            m.date,
            m.home_team,
            m.away_team,
            m.home_score,
            m.away_score,
            m.status,
            Utc::now().to_rfc3339(),
        ],
    )
    .context("upsert match")?;

    // Replace the scorer list wholesale; partial scorer updates never occur
    // upstream.
    tx.execute("DELETE FROM scorers WHERE game_id = ?1", params![m.game_id])
        .context("clear scorers")?;
    for (ord, event) in m.scorers.iter().enumerate() {
        tx.execute(
            "INSERT INTO scorers (game_id, ord, name, goals, assists, side)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                m.game_id,
                ord as i64,
                event.name,
                event.goals,
                event.assists,
                event.side.map(TeamSide::as_str),
            ],
        )
        .context("insert scorer")?;
    }
    Ok(())
}

fn final_status_filter() -> String {
    let quoted: Vec<String> = FINAL_STATUSES.iter().map(|s| format!("'{s}'")).collect();
    format!("status IN ({})", quoted.join(", "))
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}
