// src/core/outcome.rs — Tagged results for timeout-bounded collaborator calls

use std::future::Future;
use std::time::Duration;

use crate::infra::errors::SpecloopError;

/// What came back from an external collaborator. Callers branch on the
/// variant to pick a fallback path instead of catching errors.
#[derive(Debug)]
pub enum Outcome<T> {
    Ready(T),
    TimedOut { after: Duration },
    Failed(String),
    /// The capability is not configured.
    Unavailable,
}

impl<T> Outcome<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, Outcome::Ready(_))
    }

    pub fn ready(self) -> Option<T> {
        match self {
            Outcome::Ready(v) => Some(v),
            _ => None,
        }
    }

    /// Short reason for logs and progress events. Empty for `Ready`.
    pub fn reason(&self) -> String {
        match self {
            Outcome::Ready(_) => String::new(),
            Outcome::TimedOut { after } => format!("timed out after {}ms", after.as_millis()),
            Outcome::Failed(msg) => msg.clone(),
            Outcome::Unavailable => "unavailable".into(),
        }
    }
}

impl<T> From<Result<T, SpecloopError>> for Outcome<T> {
    fn from(result: Result<T, SpecloopError>) -> Self {
        match result {
            Ok(v) => Outcome::Ready(v),
            Err(SpecloopError::Timeout { after_ms, .. }) => Outcome::TimedOut {
                after: Duration::from_millis(after_ms),
            },
            Err(e) => Outcome::Failed(e.to_string()),
        }
    }
}

/// Await `fut` for at most `timeout`.
pub async fn bounded<T, F>(timeout: Duration, fut: F) -> Outcome<T>
where
    F: Future<Output = Result<T, SpecloopError>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result.into(),
        Err(_) => Outcome::TimedOut { after: timeout },
    }
}
