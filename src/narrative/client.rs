//! Hosted completion backend
//!
//! HTTP client for an OpenAI-compatible chat completions API.

use super::error::CompletionError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A text-completion backend
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Complete `prompt` given structured `context`, returning raw model text
    async fn complete(
        &self,
        prompt: &str,
        context: &serde_json::Value,
    ) -> Result<String, CompletionError>;

    /// Model identifier reported in results
    fn model_name(&self) -> &str;
}

const SYSTEM_PROMPT: &str = "You are a wellness analyst. You turn physiological statistics into short, \
grounded narratives. Never invent numbers that are not in the context. Reply with a single JSON \
object with the keys \"narrative\", \"summary\" and \"key_takeaways\" (an array of at most three strings).";

/// Configuration for the completion client
#[derive(Debug, Clone)]
pub struct CompletionClientConfig {
    /// Base URL, e.g. "https://api.openai.com/v1"
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    /// Request timeout in milliseconds
    pub timeout_ms: u64,
    pub temperature: f32,
}

impl Default for CompletionClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
            timeout_ms: 8000,
            temperature: 0.4,
        }
    }
}

/// reqwest-backed chat completions client
pub struct HttpCompletionClient {
    client: Client,
    config: CompletionClientConfig,
}

impl HttpCompletionClient {
    /// Create a client; fails only if the TLS backend cannot initialize
    pub fn new(config: CompletionClientConfig) -> Result<Self, CompletionError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| CompletionError::Config(e.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &CompletionClientConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl CompletionBackend for HttpCompletionClient {
    async fn complete(
        &self,
        prompt: &str,
        context: &serde_json::Value,
    ) -> Result<String, CompletionError> {
        let context_text = serde_json::to_string_pretty(context)
            .map_err(|e| CompletionError::Malformed(e.to_string()))?;

        let body = ChatRequest {
            model: &self.config.model,
            temperature: self.config.temperature,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: format!("{}\n\nContext:\n{}", prompt, context_text),
                },
            ],
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CompletionError::Timeout(self.config.timeout_ms)
                } else {
                    CompletionError::Transport(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(CompletionError::Api {
                status: status.as_u16(),
                message: text,
            });
        }

        let reply: ChatResponse = response
            .json()
            .await
            .map_err(|e| CompletionError::Malformed(e.to_string()))?;

        reply
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| CompletionError::Malformed("empty completion".to_string()))
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

// ============================================
// Request/Response DTOs
// ============================================

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ChatReplyMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CompletionClientConfig::default();
        assert_eq!(config.base_url, "https://api.openai.com/v1");
        assert_eq!(config.timeout_ms, 8000);
        assert!(config.api_key.is_empty());
    }

    #[test]
    fn test_endpoint_trims_slash() {
        let client = HttpCompletionClient::new(CompletionClientConfig {
            base_url: "http://localhost:9000/v1/".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(client.endpoint(), "http://localhost:9000/v1/chat/completions");
        assert_eq!(client.model_name(), "gpt-4o-mini");
    }

    #[test]
    fn test_chat_response_parsing() {
        let json = r#"{"choices":[{"message":{"role":"assistant","content":"{\"narrative\":\"hi\"}"}}]}"#;
        let reply: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(reply.choices[0].message.content.as_deref(), Some("{\"narrative\":\"hi\"}"));

        let empty: ChatResponse = serde_json::from_str("{}").unwrap();
        assert!(empty.choices.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let client = HttpCompletionClient::new(CompletionClientConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            api_key: "test".to_string(),
            timeout_ms: 2000,
            ..Default::default()
        })
        .unwrap();

        let err = client
            .complete("prompt", &serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, CompletionError::Transport(_) | CompletionError::Timeout(_)));
    }
}
