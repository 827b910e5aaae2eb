// src/memory/mod.rs — Iteration record persistence

pub mod fallback;
pub mod jsonl;
pub mod schema;
pub mod store;
pub mod volatile;

use std::sync::Arc;

use tracing::warn;

use crate::core::types::{FeedbackReport, IterationRecord};
use crate::infra::config::{StorageBackend, StorageConfig};
use crate::infra::errors::SpecloopError;

pub use fallback::FallbackStore;
pub use jsonl::JsonlStore;
pub use store::SqliteIterationStore;
pub use volatile::VolatileStore;

/// Where the orchestrator sends finished iteration records.
///
/// Delivery is at-least-once. `iteration_number` is the ordering authority,
/// so `list` sorts by it and collapses repeats regardless of arrival order.
pub trait IterationStore: Send + Sync {
    fn name(&self) -> &str;

    /// Returns the id of the stored record.
    fn append(&self, session_id: &str, record: &IterationRecord) -> Result<String, SpecloopError>;

    fn list(&self, session_id: &str) -> Result<Vec<IterationRecord>, SpecloopError>;

    /// Known session ids, oldest first.
    fn sessions(&self) -> Result<Vec<String>, SpecloopError>;

    /// Audit trail for synthesized feedback. Best-effort; backends that do
    /// not keep one accept and drop it.
    fn log_feedback(
        &self,
        _session_id: &str,
        _iteration: u32,
        _feedback: &FeedbackReport,
    ) -> Result<(), SpecloopError> {
        Ok(())
    }
}

/// Sort by iteration number and keep the first copy of each.
pub fn order_records(mut records: Vec<IterationRecord>) -> Vec<IterationRecord> {
    records.sort_by_key(|r| r.iteration_number);
    records.dedup_by_key(|r| r.iteration_number);
    records
}

/// Build the configured backend. Durable backends are wrapped so a write
/// failure lands in memory instead of failing the run; if the backend cannot
/// even be opened, the volatile store is used alone.
pub fn open_store(cfg: &StorageConfig) -> Arc<dyn IterationStore> {
    let path = cfg.resolved_path();
    let primary: Result<Arc<dyn IterationStore>, SpecloopError> = match cfg.backend {
        StorageBackend::Memory => return Arc::new(VolatileStore::new()),
        StorageBackend::Sqlite => {
            SqliteIterationStore::open(&path).map(|s| Arc::new(s) as Arc<dyn IterationStore>)
        }
        StorageBackend::Jsonl => {
            JsonlStore::open(&path).map(|s| Arc::new(s) as Arc<dyn IterationStore>)
        }
    };

    match primary {
        Ok(store) => Arc::new(FallbackStore::new(store)),
        Err(e) => {
            warn!(path = %path.display(), "storage unavailable, keeping records in memory: {e}");
            Arc::new(VolatileStore::new())
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::core::types::{DesignSpec, EvaluationResult, FeedbackReport, IterationRecord};

    pub fn record(session_id: &str, n: u32, after: f64) -> IterationRecord {
        let eval = |score: f64| EvaluationResult {
            score,
            completeness: score,
            format_validity: score,
            feasibility: score,
            suggestions: vec!["Specification looks good!".into()],
            feedback: vec![],
        };
        IterationRecord::new(
            session_id,
            n,
            "a warehouse",
            DesignSpec::default(),
            DesignSpec::default(),
            eval(after - 5.0),
            eval(after),
            FeedbackReport::default(),
            0.5,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::record;
    use super::*;

    #[test]
    fn test_order_records_sorts_and_dedups() {
        let ordered = order_records(vec![
            record("s", 3, 70.0),
            record("s", 1, 50.0),
            record("s", 3, 99.0),
            record("s", 2, 60.0),
        ]);
        let numbers: Vec<u32> = ordered.iter().map(|r| r.iteration_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(ordered[2].score_after(), 70.0);
    }

    #[test]
    fn test_open_store_memory() {
        let store = open_store(&StorageConfig {
            backend: StorageBackend::Memory,
            path: None,
        });
        assert_eq!(store.name(), "memory");
    }

    #[test]
    fn test_open_store_sqlite_wrapped() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&StorageConfig {
            backend: StorageBackend::Sqlite,
            path: Some(dir.path().join("db.sqlite").to_string_lossy().into_owned()),
        });
        assert_eq!(store.name(), "fallback");
        store.append("s", &record("s", 1, 40.0)).unwrap();
        assert_eq!(store.list("s").unwrap().len(), 1);
    }
}
