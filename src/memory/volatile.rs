// src/memory/volatile.rs — In-process record store

use std::collections::HashMap;
use std::sync::RwLock;

use super::{order_records, IterationStore};
use crate::core::types::{FeedbackReport, IterationRecord};
use crate::infra::errors::SpecloopError;

#[derive(Default)]
struct Inner {
    records: HashMap<String, Vec<(String, IterationRecord)>>,
    feedback: HashMap<String, Vec<(u32, FeedbackReport)>>,
    order: Vec<String>,
}

/// Always-available store. Lost on exit.
#[derive(Default)]
pub struct VolatileStore {
    inner: RwLock<Inner>,
}

impl VolatileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feedback(&self, session_id: &str) -> Vec<(u32, FeedbackReport)> {
        self.inner
            .read()
            .ok()
            .and_then(|i| i.feedback.get(session_id).cloned())
            .unwrap_or_default()
    }

    fn poisoned() -> SpecloopError {
        SpecloopError::Storage("volatile store lock poisoned".into())
    }
}

impl IterationStore for VolatileStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn append(&self, session_id: &str, record: &IterationRecord) -> Result<String, SpecloopError> {
        let mut inner = self.inner.write().map_err(|_| Self::poisoned())?;
        if !inner.records.contains_key(session_id) {
            inner.order.push(session_id.to_string());
        }
        let slot = inner.records.entry(session_id.to_string()).or_default();
        if let Some((id, _)) = slot
            .iter()
            .find(|(_, r)| r.iteration_number == record.iteration_number)
        {
            return Ok(id.clone());
        }
        let id = uuid::Uuid::new_v4().to_string();
        slot.push((id.clone(), record.clone()));
        Ok(id)
    }

    fn list(&self, session_id: &str) -> Result<Vec<IterationRecord>, SpecloopError> {
        let inner = self.inner.read().map_err(|_| Self::poisoned())?;
        let records = inner
            .records
            .get(session_id)
            .map(|rs| rs.iter().map(|(_, r)| r.clone()).collect())
            .unwrap_or_default();
        Ok(order_records(records))
    }

    fn sessions(&self) -> Result<Vec<String>, SpecloopError> {
        let inner = self.inner.read().map_err(|_| Self::poisoned())?;
        Ok(inner.order.clone())
    }

    fn log_feedback(
        &self,
        session_id: &str,
        iteration: u32,
        feedback: &FeedbackReport,
    ) -> Result<(), SpecloopError> {
        let mut inner = self.inner.write().map_err(|_| Self::poisoned())?;
        inner
            .feedback
            .entry(session_id.to_string())
            .or_default()
            .push((iteration, feedback.clone()));
        Ok(())
    }
}
