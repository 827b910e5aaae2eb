// src/provider/openai_compat.rs — Generic OpenAI-compatible provider
//
// Used for OpenAI itself and any endpoint speaking `/chat/completions`.

use async_trait::async_trait;

use super::{ChatRequest, ChatResponse, Message, ModelProvider, TokenUsage};
use crate::infra::errors::SpecloopError;

pub struct OpenAICompatProvider {
    id_str: String,
    name_str: String,
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAICompatProvider {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        api_key: String,
        base_url: String,
    ) -> Self {
        Self {
            id_str: id.into(),
            name_str: name.into(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn error(&self, message: impl Into<String>) -> SpecloopError {
        SpecloopError::Provider {
            provider: self.id_str.clone(),
            message: message.into(),
        }
    }
}

/// Build the `/chat/completions` request body.
fn request_body(request: &ChatRequest) -> serde_json::Value {
    let system = request.system.as_deref().map(Message::system);
    let mut messages = Vec::new();
    for m in system.iter().chain(&request.messages) {
        messages.push(serde_json::json!({
            "role": m.role.as_str(),
            "content": m.content,
        }));
    }

    let mut body = serde_json::json!({
        "model": request.model,
        "messages": messages,
    });
    if let Some(max_tokens) = request.max_tokens {
        body["max_tokens"] = serde_json::json!(max_tokens);
    }
    if let Some(temp) = request.temperature {
        body["temperature"] = serde_json::json!(temp);
    }
    body
}

fn parse_response(resp: &serde_json::Value) -> ChatResponse {
    let content = resp["choices"][0]["message"]["content"]
        .as_str()
        .unwrap_or("")
        .to_string();

    let usage = TokenUsage::from_counts(
        resp["usage"]["prompt_tokens"].as_u64(),
        resp["usage"]["completion_tokens"].as_u64(),
    );

    ChatResponse { content, usage }
}

#[async_trait]
impl ModelProvider for OpenAICompatProvider {
    fn id(&self) -> &str {
        &self.id_str
    }

    fn name(&self) -> &str {
        &self.name_str
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, SpecloopError> {
        let body = request_body(&request);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| self.error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(self.error(format!("HTTP {}: {}", status.as_u16(), error_body)));
        }

        let resp: serde_json::Value = response
            .json()
            .await
            .map_err(|e| self.error(format!("Failed to parse response: {e}")))?;

        Ok(parse_response(&resp))
    }
}
