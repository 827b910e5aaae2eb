// src/feedback/mod.rs — Feedback synthesis (generative first, heuristic always)

pub mod generative;
pub mod heuristic;
pub mod parser;

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::core::outcome::{bounded, Outcome};
use crate::core::types::{DesignSpec, EvaluationResult, FeedbackReport, FeedbackSource};
use crate::infra::config::FeedbackConfig;
use crate::provider::TokenUsage;
use generative::{GenerativeFeedback, ProviderFeedback};

/// Hard cap on suggestions per round.
pub const MAX_SUGGESTIONS: usize = 3;

pub const GENERATIVE_CONFIDENCE: f64 = 0.9;
pub const HEURISTIC_CONFIDENCE: f64 = 0.7;
/// Heuristic result after the generative strategy was tried and failed.
pub const FALLBACK_CONFIDENCE: f64 = 0.5;

/// Produces the suggestions that drive the next mutation.
///
/// The generative strategy is only tried when one is attached. Any failure,
/// timeout or empty answer lands on the heuristic path; callers see it only
/// as a lower confidence.
pub struct FeedbackSynthesizer {
    generative: Option<Arc<dyn GenerativeFeedback>>,
    timeout: Duration,
    max_suggestions: usize,
}

impl Default for FeedbackSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedbackSynthesizer {
    /// Heuristic-only synthesizer.
    pub fn new() -> Self {
        Self {
            generative: None,
            timeout: Duration::from_secs(20),
            max_suggestions: MAX_SUGGESTIONS,
        }
    }

    pub fn from_config(cfg: &FeedbackConfig) -> Self {
        let mut synth = Self::new()
            .with_timeout(Duration::from_secs(cfg.timeout_seconds))
            .with_max_suggestions(cfg.max_suggestions);
        if cfg.generative {
            match crate::provider::from_config(cfg) {
                Some((provider, model)) => {
                    synth = synth.with_generative(Arc::new(ProviderFeedback::new(provider, model)));
                }
                None => warn!(model = %cfg.model, "generative feedback unavailable, using heuristics"),
            }
        }
        synth
    }

    pub fn with_generative(mut self, generative: Arc<dyn GenerativeFeedback>) -> Self {
        self.generative = Some(generative);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Clamped to [1, 3].
    pub fn with_max_suggestions(mut self, n: usize) -> Self {
        self.max_suggestions = n.clamp(1, MAX_SUGGESTIONS);
        self
    }

    pub fn has_generative(&self) -> bool {
        self.generative.is_some()
    }

    pub async fn synthesize(
        &self,
        spec: &DesignSpec,
        prompt: &str,
        evaluation: &EvaluationResult,
    ) -> FeedbackReport {
        let outcome = match &self.generative {
            Some(g) => bounded(self.timeout, g.synthesize(prompt, spec, evaluation)).await,
            None => Outcome::Unavailable,
        };

        let confidence = match outcome {
            Outcome::Ready(out) if !out.suggestions.is_empty() => {
                return FeedbackReport {
                    suggestions: self.cap(out.suggestions),
                    confidence: GENERATIVE_CONFIDENCE,
                    source: FeedbackSource::Generative,
                    usage: out.usage,
                };
            }
            Outcome::Ready(_) => {
                warn!("generative feedback returned nothing, using heuristics");
                FALLBACK_CONFIDENCE
            }
            Outcome::Unavailable => HEURISTIC_CONFIDENCE,
            other => {
                warn!(reason = %other.reason(), "generative feedback failed, using heuristics");
                FALLBACK_CONFIDENCE
            }
        };

        let suggestions = heuristic::suggestions(spec, prompt, evaluation);
        debug!(count = suggestions.len(), "heuristic suggestions");
        FeedbackReport {
            suggestions: self.cap(suggestions),
            confidence,
            source: FeedbackSource::Heuristic,
            usage: TokenUsage::default(),
        }
    }

    fn cap(&self, mut suggestions: Vec<String>) -> Vec<String> {
        suggestions.truncate(self.max_suggestions);
        suggestions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::errors::SpecloopError;
    use async_trait::async_trait;
    use generative::GenerativeSuggestions;

    struct Fixed(Result<Vec<&'static str>, &'static str>);

    #[async_trait]
    impl GenerativeFeedback for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }
        async fn synthesize(
            &self,
            _prompt: &str,
            _spec: &DesignSpec,
            _evaluation: &EvaluationResult,
        ) -> Result<GenerativeSuggestions, SpecloopError> {
            match &self.0 {
                Ok(list) => Ok(GenerativeSuggestions {
                    suggestions: list.iter().map(|s| s.to_string()).collect(),
                    usage: TokenUsage {
                        input_tokens: 10,
                        output_tokens: 5,
                    },
                }),
                Err(msg) => Err(SpecloopError::Generator(msg.to_string())),
            }
        }
    }

    fn eval() -> EvaluationResult {
        EvaluationResult {
            score: 30.0,
            completeness: 0.0,
            format_validity: 12.5,
            feasibility: 75.0,
            suggestions: vec![
                "Add material specifications".into(),
                "Add design features".into(),
            ],
            feedback: vec![],
        }
    }

    #[tokio::test]
    async fn test_heuristic_only() {
        let report = FeedbackSynthesizer::new()
            .synthesize(&DesignSpec::default(), "a lamp", &eval())
            .await;
        assert_eq!(report.source, FeedbackSource::Heuristic);
        assert_eq!(report.confidence, HEURISTIC_CONFIDENCE);
        assert_eq!(report.suggestions.len(), 3);
        assert_eq!(report.suggestions[0], "Add material specifications");
    }

    #[tokio::test]
    async fn test_generative_capped() {
        let synth = FeedbackSynthesizer::new()
            .with_generative(Arc::new(Fixed(Ok(vec!["a", "b", "c", "d", "e"]))));
        let report = synth.synthesize(&DesignSpec::default(), "x", &eval()).await;
        assert_eq!(report.source, FeedbackSource::Generative);
        assert_eq!(report.confidence, GENERATIVE_CONFIDENCE);
        assert_eq!(report.suggestions, vec!["a", "b", "c"]);
        assert_eq!(report.usage.total(), 15);
    }

    #[tokio::test]
    async fn test_generative_failure_falls_back() {
        let synth =
            FeedbackSynthesizer::new().with_generative(Arc::new(Fixed(Err("model offline"))));
        let report = synth.synthesize(&DesignSpec::default(), "x", &eval()).await;
        assert_eq!(report.source, FeedbackSource::Heuristic);
        assert_eq!(report.confidence, FALLBACK_CONFIDENCE);
        assert!(!report.suggestions.is_empty());
    }

    #[tokio::test]
    async fn test_generative_empty_falls_back() {
        let synth = FeedbackSynthesizer::new().with_generative(Arc::new(Fixed(Ok(vec![]))));
        let report = synth.synthesize(&DesignSpec::default(), "x", &eval()).await;
        assert_eq!(report.source, FeedbackSource::Heuristic);
        assert_eq!(report.confidence, FALLBACK_CONFIDENCE);
    }

    #[test]
    fn test_max_suggestions_clamped() {
        assert_eq!(
            FeedbackSynthesizer::new()
                .with_max_suggestions(10)
                .max_suggestions,
            3
        );
        assert_eq!(
            FeedbackSynthesizer::new().with_max_suggestions(0).max_suggestions,
            1
        );
    }

    #[test]
    fn test_from_config_heuristic_default() {
        let synth = FeedbackSynthesizer::from_config(&FeedbackConfig::default());
        assert!(!synth.has_generative());
    }
}
