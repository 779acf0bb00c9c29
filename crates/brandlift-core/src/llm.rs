//! LLM completion provider.
//!
//! The analysis only needs single-turn text completion, so providers sit
//! behind a small trait and the Anthropic Messages API is the one
//! implementation.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::LlmConfig;

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Text returned by a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    pub model: String,
}

/// A single-turn text completion backend.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Model name requests are sent to.
    fn model(&self) -> &str;

    /// Complete a prompt.
    async fn complete(&self, prompt: &str) -> Result<Completion>;
}

/// Client for the Anthropic Messages API.
pub struct AnthropicClient {
    api_key: String,
    model: String,
    base_url: String,
    max_tokens: u32,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ResponseContent>,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(rename = "type")]
    content_type: String,
    text: Option<String>,
}

impl AnthropicClient {
    /// Create a new client with the given API key and model.
    pub fn new(api_key: &str, model: &str, base_url: &str, max_tokens: u32, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();

        Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            max_tokens,
            client,
        }
    }

    /// Build a client from config; `None` when no API key is set.
    pub fn from_config(config: &LlmConfig) -> Option<Self> {
        let api_key = config.api_key.as_deref()?;
        Some(Self::new(
            api_key,
            &config.model,
            &config.base_url,
            config.max_tokens,
            Duration::from_secs(config.timeout_secs),
        ))
    }
}

#[async_trait]
impl CompletionProvider for AnthropicClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &str) -> Result<Completion> {
        let request = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        debug!(model = %self.model, prompt_len = prompt.len(), "Calling Anthropic Messages API");
        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .context("Failed to call Anthropic API")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Anthropic API error (HTTP {}): {}", status, body);
        }

        let body: MessagesResponse = response
            .json()
            .await
            .context("Failed to parse Anthropic API response")?;

        let text: String = body
            .content
            .iter()
            .filter(|c| c.content_type == "text")
            .filter_map(|c| c.text.as_deref())
            .collect::<Vec<_>>()
            .join("");
        if text.trim().is_empty() {
            anyhow::bail!("No text content in Anthropic API response");
        }

        Ok(Completion {
            text,
            model: body.model.unwrap_or_else(|| self.model.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> AnthropicClient {
        AnthropicClient::new("sk-test", "claude-test", &server.uri(), 512, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_complete_joins_text_blocks() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "sk-test"))
            .and(header("anthropic-version", ANTHROPIC_VERSION))
            .and(body_partial_json(serde_json::json!({
                "model": "claude-test",
                "max_tokens": 512,
                "messages": [{"role": "user", "content": "hello"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "model": "claude-test-20250101",
                "content": [
                    {"type": "text", "text": "{\"summary\":"},
                    {"type": "text", "text": "\"ok\"}"}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let completion = client(&server).complete("hello").await.unwrap();
        assert_eq!(completion.text, "{\"summary\":\"ok\"}");
        assert_eq!(completion.model, "claude-test-20250101");
    }

    #[tokio::test]
    async fn test_http_error_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(529).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let err = client(&server).complete("hello").await.unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("529"));
        assert!(msg.contains("overloaded"));
    }

    #[tokio::test]
    async fn test_empty_content_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": []
            })))
            .mount(&server)
            .await;

        assert!(client(&server).complete("hello").await.is_err());
    }

    #[test]
    fn test_from_config_requires_key() {
        let mut config = LlmConfig::default();
        assert!(AnthropicClient::from_config(&config).is_none());
        config.api_key = Some("sk".to_string());
        let client = AnthropicClient::from_config(&config).unwrap();
        assert_eq!(client.model(), config.model);
    }
}
