// src/core/cost.rs — Token usage ledger for generative collaborators

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::provider::TokenUsage;

#[derive(Debug, Clone, Serialize)]
pub struct UsageEntry {
    pub iteration: u32,
    pub stage: String,
    pub usage: TokenUsage,
    pub at: DateTime<Utc>,
}

/// Append-only usage log keyed by session.
///
/// The outer map is only write-locked when a session key is first seen;
/// appends for an existing session take that session's own mutex, so
/// concurrent sessions never contend on a global lock.
#[derive(Default)]
pub struct UsageLedger {
    sessions: RwLock<HashMap<String, Arc<Mutex<Vec<UsageEntry>>>>>,
}

impl UsageLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, session_id: &str) -> Option<Arc<Mutex<Vec<UsageEntry>>>> {
        if let Ok(map) = self.sessions.read() {
            if let Some(slot) = map.get(session_id) {
                return Some(slot.clone());
            }
        }
        let mut map = self.sessions.write().ok()?;
        Some(map.entry(session_id.to_string()).or_default().clone())
    }

    pub fn record(&self, session_id: &str, iteration: u32, stage: &str, usage: TokenUsage) {
        if usage.total() == 0 {
            return;
        }
        let Some(slot) = self.slot(session_id) else {
            return;
        };
        if let Ok(mut entries) = slot.lock() {
            entries.push(UsageEntry {
                iteration,
                stage: stage.to_string(),
                usage,
                at: Utc::now(),
            });
        };
    }

    pub fn total(&self, session_id: &str) -> TokenUsage {
        let mut total = TokenUsage::default();
        for entry in self.entries(session_id) {
            total.add(&entry.usage);
        }
        total
    }

    /// Total for a finished session; its entries are dropped.
    pub fn take(&self, session_id: &str) -> TokenUsage {
        let total = self.total(session_id);
        if let Ok(mut map) = self.sessions.write() {
            map.remove(session_id);
        }
        total
    }

    pub fn entries(&self, session_id: &str) -> Vec<UsageEntry> {
        let slot = match self.sessions.read() {
            Ok(map) => map.get(session_id).cloned(),
            Err(_) => None,
        };
        slot.and_then(|s| s.lock().ok().map(|e| e.clone()))
            .unwrap_or_default()
    }

    pub fn sessions(&self) -> usize {
        self.sessions.read().map(|m| m.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usage(i: u32, o: u32) -> TokenUsage {
        TokenUsage {
            input_tokens: i,
            output_tokens: o,
        }
    }

    #[test]
    fn test_record_and_total() {
        let ledger = UsageLedger::new();
        ledger.record("a", 1, "feedback", usage(100, 20));
        ledger.record("a", 2, "feedback", usage(50, 10));
        ledger.record("b", 1, "feedback", usage(7, 3));

        let total = ledger.total("a");
        assert_eq!(total.input_tokens, 150);
        assert_eq!(total.output_tokens, 30);
        assert_eq!(ledger.entries("b").len(), 1);
        assert_eq!(ledger.sessions(), 2);
    }

    #[test]
    fn test_zero_usage_ignored() {
        let ledger = UsageLedger::new();
        ledger.record("a", 1, "feedback", TokenUsage::default());
        assert!(ledger.entries("a").is_empty());
        assert_eq!(ledger.total("missing").total(), 0);
    }

    #[test]
    fn test_take_releases_session() {
        let ledger = UsageLedger::new();
        ledger.record("a", 0, "generate", usage(500, 200));
        ledger.record("a", 1, "mutate", usage(500, 200));
        ledger.record("b", 1, "feedback", usage(1, 1));

        assert_eq!(ledger.take("a").total(), 1400);
        assert_eq!(ledger.sessions(), 1);
        assert!(ledger.entries("a").is_empty());
        assert_eq!(ledger.take("a").total(), 0);
        ledger.take("b");
        assert_eq!(ledger.sessions(), 0);
    }

    #[test]
    fn test_concurrent_appends() {
        let ledger = Arc::new(UsageLedger::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let ledger = ledger.clone();
                std::thread::spawn(move || {
                    for i in 0..50 {
                        ledger.record(&format!("s{}", t % 2), i, "feedback", usage(1, 1));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(ledger.entries("s0").len(), 200);
        assert_eq!(ledger.total("s1").total(), 400);
    }
}
