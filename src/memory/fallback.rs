// src/memory/fallback.rs — Primary store with an in-memory safety net

use std::sync::Arc;

use tracing::warn;

use super::{order_records, IterationStore, VolatileStore};
use crate::core::types::{FeedbackReport, IterationRecord};
use crate::infra::errors::SpecloopError;

/// Writes go to the primary; anything the primary rejects is kept in memory.
/// Reads merge both, so a session stays listable after a primary failure.
pub struct FallbackStore {
    primary: Arc<dyn IterationStore>,
    fallback: VolatileStore,
}

impl FallbackStore {
    pub fn new(primary: Arc<dyn IterationStore>) -> Self {
        Self {
            primary,
            fallback: VolatileStore::new(),
        }
    }

    pub fn primary_name(&self) -> &str {
        self.primary.name()
    }
}

impl IterationStore for FallbackStore {
    fn name(&self) -> &str {
        "fallback"
    }

    fn append(&self, session_id: &str, record: &IterationRecord) -> Result<String, SpecloopError> {
        match self.primary.append(session_id, record) {
            Ok(id) => Ok(id),
            Err(e) => {
                warn!(
                    store = self.primary.name(),
                    session_id,
                    iteration = record.iteration_number,
                    "append failed, keeping record in memory: {e}"
                );
                self.fallback.append(session_id, record)
            }
        }
    }

    fn list(&self, session_id: &str) -> Result<Vec<IterationRecord>, SpecloopError> {
        let mut records = match self.primary.list(session_id) {
            Ok(r) => r,
            Err(e) => {
                warn!(store = self.primary.name(), session_id, "list failed: {e}");
                Vec::new()
            }
        };
        records.extend(self.fallback.list(session_id)?);
        Ok(order_records(records))
    }

    fn sessions(&self) -> Result<Vec<String>, SpecloopError> {
        let mut ids = self.primary.sessions().unwrap_or_default();
        for id in self.fallback.sessions()? {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        Ok(ids)
    }

    fn log_feedback(
        &self,
        session_id: &str,
        iteration: u32,
        feedback: &FeedbackReport,
    ) -> Result<(), SpecloopError> {
        if self
            .primary
            .log_feedback(session_id, iteration, feedback)
            .is_err()
        {
            return self.fallback.log_feedback(session_id, iteration, feedback);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::test_support::record;

    /// Rejects every write.
    struct Broken;

    impl IterationStore for Broken {
        fn name(&self) -> &str {
            "broken"
        }
        fn append(&self, _: &str, _: &IterationRecord) -> Result<String, SpecloopError> {
            Err(SpecloopError::Storage("disk full".into()))
        }
        fn list(&self, _: &str) -> Result<Vec<IterationRecord>, SpecloopError> {
            Err(SpecloopError::Storage("disk gone".into()))
        }
        fn sessions(&self) -> Result<Vec<String>, SpecloopError> {
            Err(SpecloopError::Storage("disk gone".into()))
        }
    }

    #[test]
    fn test_broken_primary_still_listable() {
        let store = FallbackStore::new(Arc::new(Broken));
        store.append("s", &record("s", 1, 50.0)).unwrap();
        store.append("s", &record("s", 2, 55.0)).unwrap();
        assert_eq!(store.list("s").unwrap().len(), 2);
        assert_eq!(store.sessions().unwrap(), vec!["s"]);
        assert_eq!(store.primary_name(), "broken");
    }

    #[test]
    fn test_healthy_primary_used() {
        let primary = Arc::new(VolatileStore::new());
        let store = FallbackStore::new(primary.clone());
        store.append("s", &record("s", 1, 50.0)).unwrap();
        assert_eq!(primary.list("s").unwrap().len(), 1);
        assert_eq!(store.list("s").unwrap().len(), 1);
    }
}
