use rusqlite::{Connection, Result, params};
use std::fs;
use std::path::Path;
use warden_engine::batch::{BatchState, BatchSummary};
use warden_engine::scan::ScanResult;

/// Rows kept in the scans table; older rows are pruned on insert.
const DEFAULT_MAX_HISTORY: usize = 1000;

/// SQLite-backed scan history. Always an explicit dependency of whoever
/// records results - there is no ambient global store.
pub struct Database {
    conn: Connection,
    max_history: usize,
}

/// One row of the scans table, in the canonical export field shape.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub id: i64,
    pub url: String,
    pub verdict: String,
    pub threat_types: Vec<String>,
    pub rule_score: u32,
    pub api_available: bool,
    pub reasons: Vec<String>,
    pub timestamp: String,
    pub batch_id: Option<String>,
}

impl Database {
    pub fn drop_db(path: &Path) -> std::io::Result<()> {
        fs::remove_file(path)
    }

    pub fn exists(path: &Path) -> bool {
        path.exists()
    }

    pub fn new(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
            PRAGMA foreign_keys = ON;
            ",
        )?;

        let db = Database {
            conn,
            max_history: DEFAULT_MAX_HISTORY,
        };
        db.init_schema()?;
        Ok(db)
    }

    pub fn with_max_history(mut self, max_history: usize) -> Self {
        self.max_history = max_history;
        self
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS batch_sessions (
                id TEXT PRIMARY KEY,
                started_at TEXT NOT NULL,
                finished_at TEXT,
                status TEXT NOT NULL CHECK(status IN ('running', 'completed', 'cancelled')),
                total INTEGER NOT NULL DEFAULT 0,
                safe INTEGER NOT NULL DEFAULT 0,
                suspicious INTEGER NOT NULL DEFAULT 0,
                dangerous INTEGER NOT NULL DEFAULT 0,
                errored INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS scans (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                batch_id TEXT,
                url TEXT NOT NULL,
                verdict TEXT NOT NULL CHECK(verdict IN ('safe', 'suspicious', 'dangerous')),
                threat_types TEXT NOT NULL,  -- JSON array
                rule_score INTEGER NOT NULL,
                api_available BOOLEAN NOT NULL,
                reasons TEXT NOT NULL,       -- JSON array
                created_at TEXT NOT NULL,
                FOREIGN KEY(batch_id) REFERENCES batch_sessions(id) ON DELETE SET NULL
            );

            CREATE INDEX IF NOT EXISTS idx_scans_batch ON scans(batch_id);
            CREATE INDEX IF NOT EXISTS idx_scans_verdict ON scans(verdict);
            ",
        )?;
        Ok(())
    }

    pub fn insert_scan(&self, result: &ScanResult, batch_id: Option<&str>) -> Result<i64> {
        let threat_types =
            serde_json::to_string(&result.intelligence.threat_types).unwrap_or_default();
        let reasons = serde_json::to_string(&result.reasons).unwrap_or_default();

        self.conn.execute(
            "INSERT INTO scans (
                batch_id, url, verdict, threat_types, rule_score,
                api_available, reasons, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                batch_id,
                &result.url,
                result.verdict.as_str(),
                threat_types,
                result.risk.normalized as i64,
                result.api_available(),
                reasons,
                result.scanned_at.to_rfc3339(),
            ],
        )?;
        let id = self.conn.last_insert_rowid();

        self.prune()?;
        Ok(id)
    }

    fn prune(&self) -> Result<()> {
        self.conn.execute(
            "DELETE FROM scans WHERE id NOT IN (
                SELECT id FROM scans ORDER BY id DESC LIMIT ?1
            )",
            params![self.max_history as i64],
        )?;
        Ok(())
    }

    /// Most recent scans first.
    pub fn recent_scans(&self, limit: usize) -> Result<Vec<HistoryEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, url, verdict, threat_types, rule_score, api_available,
                    reasons, created_at, batch_id
             FROM scans ORDER BY id DESC LIMIT ?1",
        )?;

        let entries = stmt
            .query_map(params![limit as i64], |row| {
                let threat_types: String = row.get(3)?;
                let reasons: String = row.get(6)?;
                Ok(HistoryEntry {
                    id: row.get(0)?,
                    url: row.get(1)?,
                    verdict: row.get(2)?,
                    threat_types: serde_json::from_str(&threat_types).unwrap_or_default(),
                    rule_score: row.get::<_, i64>(4)? as u32,
                    api_available: row.get(5)?,
                    reasons: serde_json::from_str(&reasons).unwrap_or_default(),
                    timestamp: row.get(7)?,
                    batch_id: row.get(8)?,
                })
            })?
            .collect::<Result<Vec<_>>>()?;

        Ok(entries)
    }

    pub fn count_scans(&self) -> Result<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM scans", [], |row| row.get(0))
    }

    pub fn clear_history(&self) -> Result<()> {
        self.conn.execute("DELETE FROM scans", [])?;
        self.conn.execute("DELETE FROM batch_sessions", [])?;
        Ok(())
    }

    // Batch session lifecycle

    pub fn create_batch_session(&self, total: usize) -> Result<String> {
        let session_id = uuid::Uuid::new_v4().to_string();
        self.conn.execute(
            "INSERT INTO batch_sessions (id, started_at, status, total)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                &session_id,
                chrono::Utc::now().to_rfc3339(),
                "running",
                total as i64
            ],
        )?;
        Ok(session_id)
    }

    pub fn finish_batch_session(
        &self,
        session_id: &str,
        state: BatchState,
        summary: &BatchSummary,
    ) -> Result<()> {
        let status = match state {
            BatchState::Cancelled => "cancelled",
            _ => "completed",
        };
        self.conn.execute(
            "UPDATE batch_sessions
             SET status = ?1, finished_at = ?2, safe = ?3, suspicious = ?4,
                 dangerous = ?5, errored = ?6
             WHERE id = ?7",
            params![
                status,
                chrono::Utc::now().to_rfc3339(),
                summary.safe as i64,
                summary.suspicious as i64,
                summary.dangerous as i64,
                summary.errored as i64,
                session_id,
            ],
        )?;
        Ok(())
    }

    pub fn batch_session_status(&self, session_id: &str) -> Result<String> {
        self.conn.query_row(
            "SELECT status FROM batch_sessions WHERE id = ?1",
            params![session_id],
            |row| row.get(0),
        )
    }

    pub fn get_connection(&self) -> &Connection {
        &self.conn
    }
}
