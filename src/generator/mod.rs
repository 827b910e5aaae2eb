// src/generator/mod.rs — Spec generator interface

pub mod model;
pub mod rules;

use std::sync::Arc;

use async_trait::async_trait;

use crate::core::types::DesignSpec;
use crate::infra::config::GeneratorConfig;
use crate::infra::errors::SpecloopError;
use crate::provider::TokenUsage;

pub use model::ModelGenerator;
pub use rules::RuleGenerator;

/// A spec plus the tokens spent producing it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Generated {
    pub spec: DesignSpec,
    pub usage: TokenUsage,
}

impl Generated {
    /// Produced without a model call.
    pub fn offline(spec: DesignSpec) -> Self {
        Self {
            spec,
            usage: TokenUsage::default(),
        }
    }
}

/// Produces and revises design specs. Calls may suspend on network or
/// model inference; the orchestrator bounds them with a timeout.
#[async_trait]
pub trait Generator: Send + Sync {
    fn name(&self) -> &str;

    /// Baseline spec for a prompt, with optional extra context.
    async fn generate(&self, prompt: &str, context: Option<&str>) -> Result<Generated, SpecloopError>;

    /// Revise `spec` according to `suggestions`. May regenerate from scratch
    /// or edit in place; callers do not care which.
    async fn mutate(
        &self,
        spec: &DesignSpec,
        suggestions: &[String],
        prompt: &str,
    ) -> Result<Generated, SpecloopError>;
}

/// Model-backed generator when one is configured,
/// otherwise the offline keyword generator.
pub fn from_config(cfg: &GeneratorConfig) -> Arc<dyn Generator> {
    let built = cfg
        .model
        .as_deref()
        .and_then(|m| crate::provider::from_model(m, cfg.base_url.clone()));
    match built {
        Some((provider, model)) => Arc::new(ModelGenerator::new(provider, model)),
        None => Arc::new(RuleGenerator::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_defaults_to_rules() {
        let generator = from_config(&GeneratorConfig::default());
        assert_eq!(generator.name(), "rules");
    }

    #[test]
    fn test_from_config_model() {
        let generator = from_config(&GeneratorConfig {
            model: Some("ollama/qwen2.5".into()),
            base_url: None,
        });
        assert_eq!(generator.name(), "ollama/qwen2.5");
    }
}
