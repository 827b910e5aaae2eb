// src/provider/mod.rs — Model provider layer

pub mod ollama;
pub mod openai_compat;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::infra::config::FeedbackConfig;
use crate::infra::errors::SpecloopError;

/// Core trait that all model providers implement.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    fn id(&self) -> &str;
    fn name(&self) -> &str;

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, SpecloopError>;
}

#[derive(Debug, Clone, Default)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub system: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub content: String,
    pub usage: TokenUsage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl TokenUsage {
    pub fn total(&self) -> u32 {
        self.input_tokens.saturating_add(self.output_tokens)
    }

    pub fn add(&mut self, other: &TokenUsage) {
        self.input_tokens = self.input_tokens.saturating_add(other.input_tokens);
        self.output_tokens = self.output_tokens.saturating_add(other.output_tokens);
    }

    /// Counts as reported by a provider, clamped to `u32`.
    pub fn from_counts(input: Option<u64>, output: Option<u64>) -> Self {
        let clamp = |n: Option<u64>| u32::try_from(n.unwrap_or(0)).unwrap_or(u32::MAX);
        Self {
            input_tokens: clamp(input),
            output_tokens: clamp(output),
        }
    }
}

/// Reference to a specific model on a specific provider.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct ModelRef {
    pub provider: String,
    pub model: String,
}

impl ModelRef {
    pub fn new(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
        }
    }

    /// Parse "provider/model" format
    pub fn parse(s: &str) -> Option<Self> {
        let (provider, model) = s.split_once('/')?;
        if provider.is_empty() || model.is_empty() {
            return None;
        }
        Some(Self {
            provider: provider.to_string(),
            model: model.to_string(),
        })
    }
}

impl std::fmt::Display for ModelRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.provider, self.model)
    }
}

/// Build the provider named by the feedback config.
pub fn from_config(cfg: &FeedbackConfig) -> Option<(Arc<dyn ModelProvider>, ModelRef)> {
    from_model(&cfg.model, cfg.base_url.clone())
}

/// Build a provider for a "provider/model" string.
///
/// Returns `None` when the provider is unknown or missing credentials; the
/// caller then falls back to its offline path.
pub fn from_model(
    model: &str,
    base_url: Option<String>,
) -> Option<(Arc<dyn ModelProvider>, ModelRef)> {
    let Some(model_ref) = ModelRef::parse(model) else {
        tracing::warn!(model, "Model must be 'provider/model'");
        return None;
    };

    let provider: Arc<dyn ModelProvider> = match model_ref.provider.as_str() {
        "ollama" => Arc::new(ollama::OllamaProvider::new(base_url)),
        "openai" => {
            let Ok(api_key) = std::env::var("OPENAI_API_KEY") else {
                tracing::warn!("OPENAI_API_KEY not set; openai models unavailable");
                return None;
            };
            Arc::new(openai_compat::OpenAICompatProvider::new(
                "openai",
                "OpenAI",
                api_key,
                base_url.unwrap_or_else(|| "https://api.openai.com/v1".into()),
            ))
        }
        other => {
            tracing::warn!(provider = other, "Unknown model provider");
            return None;
        }
    };

    Some((provider, model_ref))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_ref_parse() {
        let r = ModelRef::parse("ollama/llama3.1").unwrap();
        assert_eq!(r.provider, "ollama");
        assert_eq!(r.model, "llama3.1");
        assert_eq!(r.to_string(), "ollama/llama3.1");
    }

    #[test]
    fn test_model_ref_parse_rejects_bare_name() {
        assert!(ModelRef::parse("llama3.1").is_none());
        assert!(ModelRef::parse("/llama").is_none());
    }

    #[test]
    fn test_token_usage_add() {
        let mut u = TokenUsage {
            input_tokens: 10,
            output_tokens: 5,
        };
        u.add(&TokenUsage {
            input_tokens: 1,
            output_tokens: 2,
        });
        assert_eq!(u.total(), 18);
    }

    #[test]
    fn test_token_usage_saturates() {
        let mut u = TokenUsage {
            input_tokens: u32::MAX - 1,
            output_tokens: 10,
        };
        assert_eq!(u.total(), u32::MAX);
        u.add(&TokenUsage {
            input_tokens: 5,
            output_tokens: 1,
        });
        assert_eq!(u.input_tokens, u32::MAX);
        assert_eq!(u.output_tokens, 11);

        let clamped = TokenUsage::from_counts(Some(u64::from(u32::MAX) + 7), None);
        assert_eq!(clamped.input_tokens, u32::MAX);
        assert_eq!(clamped.output_tokens, 0);
    }

    #[test]
    fn test_from_config_unknown_provider() {
        let cfg = FeedbackConfig {
            model: "acme/model-x".into(),
            ..Default::default()
        };
        assert!(from_config(&cfg).is_none());
    }

    #[test]
    fn test_from_config_ollama() {
        let cfg = FeedbackConfig {
            model: "ollama/llama3.1".into(),
            ..Default::default()
        };
        let (provider, model) = from_config(&cfg).unwrap();
        assert_eq!(provider.id(), "ollama");
        assert_eq!(model.model, "llama3.1");
    }

    #[test]
    fn test_from_model_rejects_bare_name() {
        assert!(from_model("gpt-4o", None).is_none());
    }
}
