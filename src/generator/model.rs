// src/generator/model.rs — Chat-model generator returning JSON specs

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::{Generated, Generator};
use crate::core::types::DesignSpec;
use crate::infra::errors::SpecloopError;
use crate::provider::{ChatRequest, Message, ModelProvider, ModelRef};

const SYSTEM: &str = "You write structured design specifications as JSON objects with the keys \
design_type (building, vehicle, electronics, appliance, furniture or general), stories (buildings only), \
category, materials (list of {type, grade}), dimensions ({length, width, height, area, weight, units}), \
features, requirements, components and constraints. Reply with the JSON object only.";

/// Asks a chat model for a design spec. Replies are parsed leniently, so a
/// partially valid object still yields a usable spec.
pub struct ModelGenerator {
    provider: Arc<dyn ModelProvider>,
    model: ModelRef,
    label: String,
}

impl ModelGenerator {
    pub fn new(provider: Arc<dyn ModelProvider>, model: ModelRef) -> Self {
        let label = model.to_string();
        Self {
            provider,
            model,
            label,
        }
    }

    async fn ask(&self, user: String) -> Result<Generated, SpecloopError> {
        let request = ChatRequest {
            model: self.model.model.clone(),
            messages: vec![Message::user(user)],
            max_tokens: Some(1200),
            temperature: Some(0.2),
            system: Some(SYSTEM.into()),
        };
        let response = self.provider.chat(request).await?;
        debug!(
            generator = %self.label,
            tokens = response.usage.total(),
            "model spec response"
        );
        Ok(Generated {
            spec: parse_spec(&response.content)?,
            usage: response.usage,
        })
    }
}

/// Extract the outermost JSON object from a reply.
pub fn parse_spec(content: &str) -> Result<DesignSpec, SpecloopError> {
    let start = content.find('{');
    let end = content.rfind('}');
    let (Some(start), Some(end)) = (start, end) else {
        return Err(SpecloopError::MalformedOutput("no JSON object in reply".into()));
    };
    if end <= start {
        return Err(SpecloopError::MalformedOutput("no JSON object in reply".into()));
    }
    let value: serde_json::Value = serde_json::from_str(&content[start..=end])
        .map_err(|e| SpecloopError::MalformedOutput(format!("invalid spec JSON: {e}")))?;
    Ok(DesignSpec::from_value(&value))
}

#[async_trait]
impl Generator for ModelGenerator {
    fn name(&self) -> &str {
        &self.label
    }

    async fn generate(&self, prompt: &str, context: Option<&str>) -> Result<Generated, SpecloopError> {
        let mut user = format!("Design request: {prompt}");
        if let Some(ctx) = context {
            user.push_str(&format!("\nContext: {ctx}"));
        }
        self.ask(user).await
    }

    async fn mutate(
        &self,
        spec: &DesignSpec,
        suggestions: &[String],
        prompt: &str,
    ) -> Result<Generated, SpecloopError> {
        let current = serde_json::to_string(spec)?;
        let user = format!(
            "Design request: {prompt}\nCurrent spec: {current}\nApply these improvements:\n- {}\n\
             Return the full revised spec.",
            suggestions.join("\n- ")
        );
        self.ask(user).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::DesignType;
    use crate::provider::{ChatResponse, TokenUsage};

    struct Echo(String);

    #[async_trait]
    impl ModelProvider for Echo {
        fn id(&self) -> &str {
            "echo"
        }
        fn name(&self) -> &str {
            "Echo"
        }
        async fn chat(&self, _request: ChatRequest) -> Result<ChatResponse, SpecloopError> {
            Ok(ChatResponse {
                content: self.0.clone(),
                usage: TokenUsage::default(),
            })
        }
    }

    #[test]
    fn test_parse_spec_fenced() {
        let reply = "```json\n{\"design_type\": \"building\", \"stories\": 3, \"category\": \"office\"}\n```";
        let spec = parse_spec(reply).unwrap();
        assert_eq!(spec.design_type, DesignType::Building { stories: Some(3) });
        assert_eq!(spec.category, "office");
    }

    #[test]
    fn test_parse_spec_rejects_prose() {
        assert!(matches!(
            parse_spec("I cannot help with that."),
            Err(SpecloopError::MalformedOutput(_))
        ));
        assert!(parse_spec("{ not json }").is_err());
    }

    #[tokio::test]
    async fn test_model_generator_mutate() {
        let generator = ModelGenerator::new(
            Arc::new(Echo(r#"{"design_type":"vehicle","category":"car","features":["gps"]}"#.into())),
            ModelRef::new("echo", "m"),
        );
        let spec = generator
            .mutate(&DesignSpec::default(), &["Add design features".into()], "a car")
            .await
            .unwrap()
            .spec;
        assert_eq!(spec.design_type, DesignType::Vehicle);
        assert_eq!(spec.features, vec!["gps"]);
        assert_eq!(generator.name(), "echo/m");
    }
}
