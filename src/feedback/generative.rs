// src/feedback/generative.rs — Model-backed suggestion strategy

use std::sync::Arc;

use async_trait::async_trait;

use super::parser::parse_suggestions;
use crate::core::types::{DesignSpec, EvaluationResult};
use crate::infra::errors::SpecloopError;
use crate::provider::{ChatRequest, Message, ModelProvider, ModelRef, TokenUsage};
use crate::util::truncate_str;

const MAX_SPEC_CHARS: usize = 6000;

#[derive(Debug, Clone, Default)]
pub struct GenerativeSuggestions {
    pub suggestions: Vec<String>,
    pub usage: TokenUsage,
}

/// An external text-generation collaborator that proposes improvements.
#[async_trait]
pub trait GenerativeFeedback: Send + Sync {
    fn name(&self) -> &str;

    async fn synthesize(
        &self,
        prompt: &str,
        spec: &DesignSpec,
        evaluation: &EvaluationResult,
    ) -> Result<GenerativeSuggestions, SpecloopError>;
}

/// Asks a chat model for a JSON list of suggestions.
pub struct ProviderFeedback {
    provider: Arc<dyn ModelProvider>,
    model: ModelRef,
    label: String,
}

impl ProviderFeedback {
    pub fn new(provider: Arc<dyn ModelProvider>, model: ModelRef) -> Self {
        let label = model.to_string();
        Self {
            provider,
            model,
            label,
        }
    }
}

pub(crate) fn build_prompt(prompt: &str, spec: &DesignSpec, evaluation: &EvaluationResult) -> String {
    let spec_json = serde_json::to_string(spec).unwrap_or_default();
    format!(
        "Analyze this design specification and provide 2-3 specific improvement suggestions.\n\n\
         Original prompt: {prompt}\n\
         Current spec: {}\n\
         Evaluation score: {:.2} (completeness {:.0}, format {:.0}, feasibility {:.0})\n\n\
         Respond with a JSON array of strings only.",
        truncate_str(&spec_json, MAX_SPEC_CHARS),
        evaluation.score,
        evaluation.completeness,
        evaluation.format_validity,
        evaluation.feasibility,
    )
}

#[async_trait]
impl GenerativeFeedback for ProviderFeedback {
    fn name(&self) -> &str {
        &self.label
    }

    async fn synthesize(
        &self,
        prompt: &str,
        spec: &DesignSpec,
        evaluation: &EvaluationResult,
    ) -> Result<GenerativeSuggestions, SpecloopError> {
        let request = ChatRequest {
            model: self.model.model.clone(),
            messages: vec![Message::user(build_prompt(prompt, spec, evaluation))],
            max_tokens: Some(300),
            temperature: Some(0.3),
            system: Some("You review product and building design specifications.".into()),
        };

        let response = self.provider.chat(request).await?;
        let suggestions = parse_suggestions(&response.content);
        if suggestions.is_empty() {
            return Err(SpecloopError::MalformedOutput(format!(
                "{} returned no suggestions",
                self.label
            )));
        }

        Ok(GenerativeSuggestions {
            suggestions,
            usage: response.usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ChatResponse;

    struct CannedProvider(&'static str);

    #[async_trait]
    impl ModelProvider for CannedProvider {
        fn id(&self) -> &str {
            "canned"
        }
        fn name(&self) -> &str {
            "Canned"
        }
        async fn chat(&self, _request: ChatRequest) -> Result<ChatResponse, SpecloopError> {
            Ok(ChatResponse {
                content: self.0.into(),
                usage: TokenUsage {
                    input_tokens: 40,
                    output_tokens: 12,
                },
            })
        }
    }

    fn eval() -> EvaluationResult {
        EvaluationResult {
            score: 55.0,
            completeness: 50.0,
            format_validity: 60.0,
            feasibility: 55.0,
            suggestions: vec![],
            feedback: vec![],
        }
    }

    #[tokio::test]
    async fn test_provider_feedback_parses_array() {
        let fb = ProviderFeedback::new(
            Arc::new(CannedProvider(r#"["Add a steel frame", "Add parking"]"#)),
            ModelRef::new("canned", "m"),
        );
        let out = fb
            .synthesize("office", &DesignSpec::default(), &eval())
            .await
            .unwrap();
        assert_eq!(out.suggestions.len(), 2);
        assert_eq!(out.usage.total(), 52);
        assert_eq!(fb.name(), "canned/m");
    }

    #[tokio::test]
    async fn test_provider_feedback_empty_is_malformed() {
        let fb = ProviderFeedback::new(Arc::new(CannedProvider("")), ModelRef::new("canned", "m"));
        let err = fb
            .synthesize("office", &DesignSpec::default(), &eval())
            .await
            .unwrap_err();
        assert!(matches!(err, SpecloopError::MalformedOutput(_)));
    }

    #[test]
    fn test_prompt_mentions_score() {
        let p = build_prompt("a red car", &DesignSpec::default(), &eval());
        assert!(p.contains("a red car"));
        assert!(p.contains("55.00"));
        assert!(p.contains("JSON array"));
    }
}
