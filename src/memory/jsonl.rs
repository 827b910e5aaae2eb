// src/memory/jsonl.rs — File-backed store: one append-only JSONL file per session
//
// Each line is a full IterationRecord. The format is additive-only: unknown
// fields are ignored on read and unreadable lines are skipped.

use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use super::{order_records, IterationStore};
use crate::core::types::{FeedbackReport, IterationRecord};
use crate::infra::errors::SpecloopError;

const RECORDS_EXT: &str = "jsonl";
const FEEDBACK_SUFFIX: &str = ".feedback.jsonl";

pub struct JsonlStore {
    dir: PathBuf,
}

#[derive(Serialize)]
struct FeedbackLine<'a> {
    iteration_number: u32,
    #[serde(flatten)]
    feedback: &'a FeedbackReport,
    logged_at: String,
}

impl JsonlStore {
    pub fn open(dir: &Path) -> Result<Self, SpecloopError> {
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn session_file(&self, session_id: &str, suffix: &str) -> Result<PathBuf, SpecloopError> {
        let valid = !session_id.is_empty()
            && session_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(SpecloopError::Storage(format!(
                "invalid session id '{session_id}'"
            )));
        }
        Ok(self.dir.join(format!("{session_id}{suffix}")))
    }

    fn append_line(path: &Path, line: &str) -> Result<(), SpecloopError> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{line}")?;
        Ok(())
    }

    /// Timestamp of the first readable record in a session file.
    fn first_timestamp(path: &Path) -> Option<DateTime<Utc>> {
        let reader = BufReader::new(std::fs::File::open(path).ok()?);
        reader
            .lines()
            .map_while(Result::ok)
            .find_map(|line| serde_json::from_str::<IterationRecord>(&line).ok())
            .map(|r| r.timestamp)
    }
}

impl IterationStore for JsonlStore {
    fn name(&self) -> &str {
        "jsonl"
    }

    fn append(&self, session_id: &str, record: &IterationRecord) -> Result<String, SpecloopError> {
        let path = self.session_file(session_id, &format!(".{RECORDS_EXT}"))?;
        let line = serde_json::to_string(record)?;
        Self::append_line(&path, &line)?;
        Ok(format!("{session_id}#{}", record.iteration_number))
    }

    fn list(&self, session_id: &str) -> Result<Vec<IterationRecord>, SpecloopError> {
        let path = self.session_file(session_id, &format!(".{RECORDS_EXT}"))?;
        if !path.exists() {
            return Ok(Vec::new());
        }
        let reader = BufReader::new(std::fs::File::open(&path)?);
        let mut records = Vec::new();
        for (n, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<IterationRecord>(&line) {
                Ok(r) => records.push(r),
                Err(e) => warn!(file = %path.display(), line = n + 1, "skipping bad record: {e}"),
            }
        }
        Ok(order_records(records))
    }

    /// Sessions ordered by when their first record was written.
    fn sessions(&self) -> Result<Vec<String>, SpecloopError> {
        let mut found: Vec<(DateTime<Utc>, String)> = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.ends_with(FEEDBACK_SUFFIX) {
                continue;
            }
            let Some(id) = name.strip_suffix(&format!(".{RECORDS_EXT}")) else {
                continue;
            };
            let started = match Self::first_timestamp(&entry.path()) {
                Some(at) => at,
                None => entry
                    .metadata()
                    .and_then(|m| m.modified())
                    .map(DateTime::<Utc>::from)
                    .unwrap_or(DateTime::<Utc>::MIN_UTC),
            };
            found.push((started, id.to_string()));
        }
        found.sort();
        Ok(found.into_iter().map(|(_, id)| id).collect())
    }

    fn log_feedback(
        &self,
        session_id: &str,
        iteration: u32,
        feedback: &FeedbackReport,
    ) -> Result<(), SpecloopError> {
        let path = self.session_file(session_id, FEEDBACK_SUFFIX)?;
        let line = serde_json::to_string(&FeedbackLine {
            iteration_number: iteration,
            feedback,
            logged_at: chrono::Utc::now().to_rfc3339(),
        })?;
        Self::append_line(&path, &line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::test_support::record;

    #[test]
    fn test_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonlStore::open(dir.path()).unwrap();
        store.append("s-1", &record("s-1", 2, 60.0)).unwrap();
        store.append("s-1", &record("s-1", 1, 55.0)).unwrap();

        let listed = store.list("s-1").unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].iteration_number, 1);
        assert_eq!(store.sessions().unwrap(), vec!["s-1"]);
    }

    #[test]
    fn test_tolerates_bad_and_extended_lines() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonlStore::open(dir.path()).unwrap();
        store.append("s", &record("s", 1, 50.0)).unwrap();

        let mut extended = serde_json::to_value(record("s", 2, 65.0)).unwrap();
        extended["added_later"] = serde_json::json!("ignored");
        let path = dir.path().join("s.jsonl");
        let mut f = OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(f, "not json").unwrap();
        writeln!(f, "{extended}").unwrap();

        let listed = store.list("s").unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[1].score_after(), 65.0);
    }

    #[test]
    fn test_sessions_ordered_by_first_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonlStore::open(dir.path()).unwrap();
        let at = |secs: i64| DateTime::<Utc>::from_timestamp(1_700_000_000 + secs, 0).unwrap();
        let stamped = |id: &str, n: u32, secs: i64| {
            let mut r = record(id, n, 50.0);
            r.timestamp = at(secs);
            r
        };

        store.append("b", &stamped("b", 1, 10)).unwrap();
        store.append("a", &stamped("a", 1, 0)).unwrap();
        // A later write to "a" must not move it behind "b".
        store.append("a", &stamped("a", 2, 20)).unwrap();

        assert_eq!(store.sessions().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_rejects_path_like_session_id() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonlStore::open(dir.path()).unwrap();
        assert!(store.append("../x", &record("../x", 1, 50.0)).is_err());
    }

    #[test]
    fn test_feedback_file_not_a_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonlStore::open(dir.path()).unwrap();
        store.log_feedback("s", 1, &FeedbackReport::default()).unwrap();
        assert!(store.sessions().unwrap().is_empty());
        assert!(dir.path().join("s.feedback.jsonl").exists());
    }
}
