// src/memory/store.rs — SQLite operations

use std::path::Path;
use std::sync::Mutex;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use super::{order_records, schema, IterationStore};
use crate::core::types::{FeedbackReport, IterationRecord};
use crate::infra::errors::SpecloopError;

/// Low-level SQLite operations.
pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Open (or create) the database and bring the schema up to date.
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        schema::run_migrations(&conn)?;
        Ok(Self::new(conn))
    }

    pub fn in_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::run_migrations(&conn)?;
        Ok(Self::new(conn))
    }

    // -- Iteration records --

    /// Insert a record. A repeat of the same (session, iteration) keeps the
    /// first row and returns its id.
    pub fn insert_record(&self, id: &str, record: &IterationRecord) -> anyhow::Result<String> {
        let json = serde_json::to_string(record)?;
        let inserted = self.conn.execute(
            "INSERT INTO iteration_records
                (id, session_id, iteration_number, prompt, score_before, score_after,
                 reward, improvement, record_json, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             ON CONFLICT (session_id, iteration_number) DO NOTHING",
            params![
                id,
                record.session_id,
                record.iteration_number,
                record.prompt,
                record.score_before(),
                record.score_after(),
                record.reward,
                record.improvement,
                json,
                record.timestamp.to_rfc3339(),
            ],
        )?;
        if inserted == 1 {
            return Ok(id.to_string());
        }
        let existing: Option<String> = self
            .conn
            .query_row(
                "SELECT id FROM iteration_records WHERE session_id = ?1 AND iteration_number = ?2",
                params![record.session_id, record.iteration_number],
                |r| r.get(0),
            )
            .optional()?;
        Ok(existing.unwrap_or_else(|| id.to_string()))
    }

    pub fn query_records(&self, session_id: &str) -> anyhow::Result<Vec<IterationRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT record_json FROM iteration_records
             WHERE session_id = ?1 ORDER BY iteration_number ASC",
        )?;
        let rows = stmt.query_map(params![session_id], |r| r.get::<_, String>(0))?;

        let mut records = Vec::new();
        for row in rows {
            let json = row?;
            match serde_json::from_str::<IterationRecord>(&json) {
                Ok(r) => records.push(r),
                Err(e) => debug!("skipping unreadable record: {e}"),
            }
        }
        Ok(records)
    }

    pub fn query_sessions(&self) -> anyhow::Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT session_id FROM iteration_records
             GROUP BY session_id ORDER BY MIN(created_at) ASC",
        )?;
        let rows = stmt.query_map([], |r| r.get::<_, String>(0))?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    // -- Feedback audit --

    pub fn insert_feedback(
        &self,
        session_id: &str,
        iteration: u32,
        feedback: &FeedbackReport,
    ) -> anyhow::Result<()> {
        self.conn.execute(
            "INSERT INTO feedback_log
                (id, session_id, iteration_number, source, confidence, suggestions_json, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                uuid::Uuid::new_v4().to_string(),
                session_id,
                iteration,
                feedback.source.to_string(),
                feedback.confidence,
                serde_json::to_string(&feedback.suggestions)?,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn count_feedback(&self, session_id: &str) -> anyhow::Result<i64> {
        let n = self.conn.query_row(
            "SELECT COUNT(*) FROM feedback_log WHERE session_id = ?1",
            params![session_id],
            |r| r.get(0),
        )?;
        Ok(n)
    }
}

/// `IterationStore` over a single SQLite connection.
pub struct SqliteIterationStore {
    store: Mutex<Store>,
}

impl SqliteIterationStore {
    pub fn new(store: Store) -> Self {
        Self {
            store: Mutex::new(store),
        }
    }

    pub fn open(path: &Path) -> Result<Self, SpecloopError> {
        Ok(Self::new(Store::open(path)?))
    }

    pub fn in_memory() -> Result<Self, SpecloopError> {
        Ok(Self::new(Store::in_memory()?))
    }

    fn with_store<T>(
        &self,
        f: impl FnOnce(&Store) -> anyhow::Result<T>,
    ) -> Result<T, SpecloopError> {
        let store = self
            .store
            .lock()
            .map_err(|_| SpecloopError::Storage("sqlite store lock poisoned".into()))?;
        Ok(f(&*store)?)
    }

    pub fn feedback_count(&self, session_id: &str) -> Result<i64, SpecloopError> {
        self.with_store(|s| s.count_feedback(session_id))
    }
}

impl IterationStore for SqliteIterationStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn append(&self, session_id: &str, record: &IterationRecord) -> Result<String, SpecloopError> {
        if record.session_id != session_id {
            return Err(SpecloopError::Storage(format!(
                "record belongs to session {}, not {session_id}",
                record.session_id
            )));
        }
        let id = uuid::Uuid::new_v4().to_string();
        self.with_store(|s| s.insert_record(&id, record))
    }

    fn list(&self, session_id: &str) -> Result<Vec<IterationRecord>, SpecloopError> {
        let records = self.with_store(|s| s.query_records(session_id))?;
        Ok(order_records(records))
    }

    fn sessions(&self) -> Result<Vec<String>, SpecloopError> {
        self.with_store(|s| s.query_sessions())
    }

    /// Skipped rather than waiting when another write holds the connection.
    fn log_feedback(
        &self,
        session_id: &str,
        iteration: u32,
        feedback: &FeedbackReport,
    ) -> Result<(), SpecloopError> {
        let Ok(store) = self.store.try_lock() else {
            debug!(session_id, iteration, "feedback audit skipped, store busy");
            return Ok(());
        };
        store.insert_feedback(session_id, iteration, feedback)?;
        Ok(())
    }
}
