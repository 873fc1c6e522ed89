// ═══════════════════════════════════════════════════════════════════════
// Database — SQLite storage for tournament reports and strategy standings
// ═══════════════════════════════════════════════════════════════════════

use conquest_engine::tournament::TournamentReport;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};

pub struct Database {
    conn: Connection,
}

/// One stored tournament, without its per-game rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TournamentSummary {
    pub id: i64,
    pub seed: u64,
    pub maps: Vec<String>,
    pub strategies: Vec<String>,
    pub games: u32,
    pub max_turns: u32,
    pub played_at: String,
}

/// Aggregate record of one strategy over every stored game it played.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Standing {
    pub strategy: String,
    pub games: u32,
    pub wins: u32,
    pub draws: u32,
}

impl Standing {
    pub fn win_rate(&self) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            self.wins as f64 / self.games as f64
        }
    }
}

impl Database {
    /// Open (or create) a database at the given path.
    pub fn open(path: &str) -> rusqlite::Result<Self> {
        let db = Database { conn: Connection::open(path)? };
        db.create_schema()?;
        Ok(db)
    }

    /// In-memory database (useful for tests).
    pub fn in_memory() -> rusqlite::Result<Self> {
        let db = Database { conn: Connection::open_in_memory()? };
        db.create_schema()?;
        Ok(db)
    }

    fn create_schema(&self) -> rusqlite::Result<()> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS tournaments (
                id          INTEGER PRIMARY KEY,
                seed        INTEGER NOT NULL,
                maps        TEXT NOT NULL,
                strategies  TEXT NOT NULL,
                games       INTEGER NOT NULL,
                max_turns   INTEGER NOT NULL,
                report_json TEXT NOT NULL,
                played_at   TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE IF NOT EXISTS participants (
                tournament_id INTEGER NOT NULL REFERENCES tournaments(id),
                strategy      TEXT NOT NULL,
                PRIMARY KEY (tournament_id, strategy)
            );

            CREATE TABLE IF NOT EXISTS game_results (
                id            INTEGER PRIMARY KEY,
                tournament_id INTEGER NOT NULL REFERENCES tournaments(id),
                map           TEXT NOT NULL,
                game          INTEGER NOT NULL,
                winner        TEXT NOT NULL,
                turns         INTEGER NOT NULL
            );
            ",
        )
    }

    /// Store a finished tournament and every game in it. Returns its id.
    pub fn store_report(&self, report: &TournamentReport) -> rusqlite::Result<i64> {
        let json = serde_json::to_string(report)
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO tournaments (seed, maps, strategies, games, max_turns, report_json)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                report.seed as i64,
                report.maps.join(","),
                report.strategies.join(","),
                report.games as i64,
                report.max_turns as i64,
                json,
            ],
        )?;
        let tournament_id = tx.last_insert_rowid();

        for strategy in &report.strategies {
            tx.execute(
                "INSERT OR IGNORE INTO participants (tournament_id, strategy) VALUES (?1, ?2)",
                params![tournament_id, strategy],
            )?;
        }
        for record in &report.records {
            tx.execute(
                "INSERT INTO game_results (tournament_id, map, game, winner, turns)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    tournament_id,
                    record.map,
                    record.game as i64,
                    record.winner,
                    record.turns as i64,
                ],
            )?;
        }
        tx.commit()?;

        log::info!(
            "stored tournament {} ({} games)",
            tournament_id,
            report.records.len()
        );
        Ok(tournament_id)
    }

    /// The full report exactly as it was stored.
    pub fn load_report(&self, id: i64) -> rusqlite::Result<Option<TournamentReport>> {
        let json: Option<String> = self
            .conn
            .query_row(
                "SELECT report_json FROM tournaments WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        json.map(|j| {
            serde_json::from_str(&j)
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))
        })
        .transpose()
    }

    /// Stored tournaments, newest first.
    pub fn tournaments(&self) -> rusqlite::Result<Vec<TournamentSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, seed, maps, strategies, games, max_turns, played_at
             FROM tournaments ORDER BY id DESC",
        )?;
        let rows = stmt.query_map([], |row| {
            let maps: String = row.get(2)?;
            let strategies: String = row.get(3)?;
            Ok(TournamentSummary {
                id: row.get(0)?,
                seed: row.get::<_, i64>(1)? as u64,
                maps: split_list(&maps),
                strategies: split_list(&strategies),
                games: row.get(4)?,
                max_turns: row.get(5)?,
                played_at: row.get(6)?,
            })
        })?;
        rows.collect()
    }

    /// Win counts per strategy, best first. Draws count as played games.
    pub fn leaderboard(&self) -> rusqlite::Result<Vec<Standing>> {
        let mut stmt = self.conn.prepare(
            "SELECT p.strategy,
                    COUNT(g.id),
                    SUM(CASE WHEN g.winner = p.strategy THEN 1 ELSE 0 END),
                    SUM(CASE WHEN g.winner = 'Draw' THEN 1 ELSE 0 END)
             FROM participants p
             JOIN game_results g ON g.tournament_id = p.tournament_id
             GROUP BY p.strategy
             ORDER BY 3 DESC, p.strategy ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(Standing {
                strategy: row.get(0)?,
                games: row.get(1)?,
                wins: row.get(2)?,
                draws: row.get(3)?,
            })
        })?;
        rows.collect()
    }

    pub fn tournament_count(&self) -> rusqlite::Result<u32> {
        self.conn.query_row("SELECT COUNT(*) FROM tournaments", [], |row| row.get(0))
    }

    pub fn game_count(&self) -> rusqlite::Result<u32> {
        self.conn.query_row("SELECT COUNT(*) FROM game_results", [], |row| row.get(0))
    }
}

fn split_list(joined: &str) -> Vec<String> {
    joined
        .split(',')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
