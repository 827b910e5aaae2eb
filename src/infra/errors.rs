// src/infra/errors.rs — Error types for specloop

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpecloopError {
    // Collaborator errors
    #[error("Provider '{provider}' error: {message}")]
    Provider { provider: String, message: String },

    #[error("Generator error: {0}")]
    Generator(String),

    #[error("{operation} timed out after {after_ms}ms")]
    Timeout { operation: String, after_ms: u64 },

    #[error("Malformed collaborator output: {0}")]
    MalformedOutput(String),

    // Run errors
    #[error("Baseline generation failed: {0}")]
    Baseline(String),

    // Infra
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let e = SpecloopError::Timeout {
            operation: "generative feedback".into(),
            after_ms: 1500,
        };
        assert_eq!(e.to_string(), "generative feedback timed out after 1500ms");
        assert_eq!(
            SpecloopError::Baseline("offline".into()).to_string(),
            "Baseline generation failed: offline"
        );
        let e = SpecloopError::Provider {
            provider: "ollama".into(),
            message: "connection refused".into(),
        };
        assert_eq!(e.to_string(), "Provider 'ollama' error: connection refused");
    }
}
