use rusqlite::{Connection, Result, params};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

pub struct Database {
    conn: Connection,
}

/// One stored capture: a URL and the image file it produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureRow {
    pub id: i64,
    pub run_id: Option<String>,
    pub url: String,
    pub image_path: String,
    pub captured_at: i64,
}

fn current_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}

impl Database {
    pub fn drop(path: &Path) {
        fs::remove_file(path).unwrap();
    }
    pub fn exists(path: &Path) -> bool {
        path.exists()
    }
    pub fn new(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        // Optimize for concurrent writes
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
            PRAGMA foreign_keys = ON;
            ",
        )?;

        let db = Database { conn };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            "
            -- Capture runs
            CREATE TABLE IF NOT EXISTS runs (
    id TEXT PRIMARY KEY,
    seed_url TEXT NOT NULL,
    started_at INTEGER NOT NULL,
    ended_at INTEGER,
    status TEXT NOT NULL CHECK(status IN ('running', 'completed', 'failed'))
);

-- One row per captured page
CREATE TABLE IF NOT EXISTS captures (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id TEXT,
    url TEXT NOT NULL,
    image_path TEXT NOT NULL,
    captured_at INTEGER NOT NULL,

    FOREIGN KEY(run_id) REFERENCES runs(id) ON DELETE SET NULL
);

CREATE INDEX IF NOT EXISTS idx_captures_run ON captures(run_id);
CREATE INDEX IF NOT EXISTS idx_captures_captured_at ON captures(captured_at);
            ",
        )?;
        Ok(())
    }

    // Run management
    pub fn create_run(&self, seed_url: &str) -> Result<String> {
        let run_id = uuid::Uuid::new_v4().to_string();
        let timestamp = current_timestamp();

        self.conn.execute(
            "INSERT INTO runs (id, seed_url, started_at, status) VALUES (?1, ?2, ?3, ?4)",
            params![&run_id, seed_url, timestamp, "running"],
        )?;

        Ok(run_id)
    }

    pub fn complete_run(&self, run_id: &str) -> Result<()> {
        let timestamp = current_timestamp();
        self.conn.execute(
            "UPDATE runs SET status = ?1, ended_at = ?2 WHERE id = ?3",
            params!["completed", timestamp, run_id],
        )?;
        Ok(())
    }

    pub fn fail_run(&self, run_id: &str) -> Result<()> {
        let timestamp = current_timestamp();
        self.conn.execute(
            "UPDATE runs SET status = ?1, ended_at = ?2 WHERE id = ?3",
            params!["failed", timestamp, run_id],
        )?;
        Ok(())
    }

    pub fn get_run_status(&self, run_id: &str) -> Result<String> {
        self.conn.query_row(
            "SELECT status FROM runs WHERE id = ?1",
            params![run_id],
            |row| row.get(0),
        )
    }

    // Capture operations
    pub fn insert_capture(&self, run_id: Option<&str>, url: &str, image_path: &str) -> Result<i64> {
        let timestamp = current_timestamp();

        self.conn.execute(
            "INSERT INTO captures (run_id, url, image_path, captured_at) VALUES (?1, ?2, ?3, ?4)",
            params![run_id, url, image_path, timestamp],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    /// All stored captures, newest first.
    pub fn list_captures(&self) -> Result<Vec<CaptureRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, run_id, url, image_path, captured_at
             FROM captures
             ORDER BY captured_at DESC, id DESC",
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok(CaptureRow {
                    id: row.get(0)?,
                    run_id: row.get(1)?,
                    url: row.get(2)?,
                    image_path: row.get(3)?,
                    captured_at: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>>>()?;

        Ok(rows)
    }

    pub fn list_captures_for_run(&self, run_id: &str) -> Result<Vec<CaptureRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, run_id, url, image_path, captured_at
             FROM captures
             WHERE run_id = ?1
             ORDER BY id",
        )?;

        let rows = stmt
            .query_map(params![run_id], |row| {
                Ok(CaptureRow {
                    id: row.get(0)?,
                    run_id: row.get(1)?,
                    url: row.get(2)?,
                    image_path: row.get(3)?,
                    captured_at: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>>>()?;

        Ok(rows)
    }

    /// Escape hatch for ad-hoc queries the typed API does not cover.
    pub fn get_connection(&self) -> &Connection {
        &self.conn
    }
}
