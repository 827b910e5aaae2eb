// src/provider/ollama.rs — Ollama local model provider

use async_trait::async_trait;

use super::{ChatRequest, ChatResponse, Message, ModelProvider, TokenUsage};
use crate::infra::errors::SpecloopError;

pub struct OllamaProvider {
    base_url: String,
    client: reqwest::Client,
}

impl OllamaProvider {
    pub fn new(base_url: Option<String>) -> Self {
        Self {
            base_url: base_url.unwrap_or_else(|| "http://localhost:11434".into()),
            client: reqwest::Client::new(),
        }
    }

    fn error(&self, message: impl Into<String>) -> SpecloopError {
        SpecloopError::Provider {
            provider: "ollama".into(),
            message: message.into(),
        }
    }
}

impl Default for OllamaProvider {
    fn default() -> Self {
        Self::new(None)
    }
}

fn request_body(request: &ChatRequest) -> serde_json::Value {
    let system = request.system.as_deref().map(Message::system);
    let mut msgs = Vec::new();
    for m in system.iter().chain(&request.messages) {
        msgs.push(serde_json::json!({
            "role": m.role.as_str(),
            "content": m.content,
        }));
    }

    let mut body = serde_json::json!({
        "model": request.model,
        "messages": msgs,
        "stream": false,
    });

    let mut options = serde_json::Map::new();
    if let Some(temp) = request.temperature {
        options.insert("temperature".into(), serde_json::json!(temp));
    }
    if let Some(max_tokens) = request.max_tokens {
        options.insert("num_predict".into(), serde_json::json!(max_tokens));
    }
    if !options.is_empty() {
        body["options"] = serde_json::Value::Object(options);
    }
    body
}

#[async_trait]
impl ModelProvider for OllamaProvider {
    fn id(&self) -> &str {
        "ollama"
    }

    fn name(&self) -> &str {
        "Ollama"
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, SpecloopError> {
        let body = request_body(&request);

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| self.error(e.to_string()))?;

        if !response.status().is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(self.error(format!("HTTP error: {}", error_body)));
        }

        let resp: serde_json::Value = response
            .json()
            .await
            .map_err(|e| self.error(format!("Failed to parse response: {}", e)))?;

        let content = resp["message"]["content"]
            .as_str()
            .unwrap_or("")
            .to_string();

        let usage = TokenUsage::from_counts(
            resp["prompt_eval_count"].as_u64(),
            resp["eval_count"].as_u64(),
        );

        Ok(ChatResponse { content, usage })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::Message;

    #[test]
    fn test_default_base_url() {
        let p = OllamaProvider::default();
        assert_eq!(p.base_url, "http://localhost:11434");
        assert_eq!(p.name(), "Ollama");
    }

    #[test]
    fn test_request_body_options() {
        let req = ChatRequest {
            model: "llama3.1".into(),
            messages: vec![Message::user("suggest")],
            temperature: Some(0.1),
            max_tokens: Some(256),
            system: None,
        };
        let body = request_body(&req);
        assert_eq!(body["stream"], false);
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
        assert_eq!(body["options"]["num_predict"], 256);
    }

    #[test]
    fn test_request_body_system_first() {
        let req = ChatRequest {
            model: "llama3.1".into(),
            messages: vec![Message::user("suggest")],
            system: Some("answer in JSON".into()),
            ..Default::default()
        };
        let body = request_body(&req);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "answer in JSON");
        assert_eq!(body["messages"][1]["role"], "user");
    }

    #[test]
    fn test_request_body_without_options() {
        let req = ChatRequest {
            model: "llama3.1".into(),
            messages: vec![Message::user("suggest")],
            ..Default::default()
        };
        assert!(request_body(&req).get("options").is_none());
    }
}
