//! OpenAI-style synchronous image generation.

use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::{GeneratedImage, ImageBackend, ImageRequest};
use crate::config::ImagesConfig;

/// Client for `POST /v1/images/generations`.
pub struct OpenAiImages {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct GenerationRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    size: &'a str,
    n: u8,
    response_format: &'a str,
}

#[derive(Deserialize)]
struct GenerationResponse {
    data: Vec<GenerationData>,
}

#[derive(Deserialize)]
struct GenerationData {
    b64_json: Option<String>,
    url: Option<String>,
    revised_prompt: Option<String>,
}

impl OpenAiImages {
    pub fn new(api_key: &str, model: &str, base_url: &str, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();

        Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Build from config; `None` when no API key is set.
    pub fn from_config(config: &ImagesConfig) -> Option<Self> {
        let key = config.openai_api_key.as_deref()?;
        Some(Self::new(
            key,
            &config.openai_model,
            &config.openai_base_url,
            Duration::from_secs(config.timeout_secs),
        ))
    }
}

#[async_trait]
impl ImageBackend for OpenAiImages {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn generate(&self, request: &ImageRequest) -> Result<GeneratedImage> {
        let body = GenerationRequest {
            model: &self.model,
            prompt: &request.prompt,
            size: request.size.dimensions(),
            n: 1,
            response_format: "b64_json",
        };

        debug!(model = %self.model, size = body.size, "Requesting image generation");
        let response = self
            .client
            .post(format!("{}/v1/images/generations", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("Failed to call image generation API")?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            anyhow::bail!("Image generation API error (HTTP {}): {}", status, text);
        }

        let parsed: GenerationResponse = response
            .json()
            .await
            .context("Failed to parse image generation response")?;
        let image = parsed
            .data
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("Image generation response contained no images"))?;

        if let Some(b64) = &image.b64_json {
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(b64)
                .context("Image data is not valid base64")?;
            if bytes.is_empty() {
                anyhow::bail!("Image generation returned an empty image");
            }
            debug!(bytes = bytes.len(), "Image generated");
        } else if image.url.is_none() {
            anyhow::bail!("Image generation response had neither data nor URL");
        }

        Ok(GeneratedImage {
            backend: self.name().to_string(),
            prompt: request.prompt.clone(),
            url: image.url,
            b64_png: image.b64_json,
            job_id: None,
            revised_prompt: image.revised_prompt,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::images::ImageSize;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> ImageRequest {
        ImageRequest {
            prompt: "fresh bread on a table".to_string(),
            size: ImageSize::Landscape,
        }
    }

    #[tokio::test]
    async fn test_generate_returns_inline_image() {
        let server = MockServer::start().await;
        let png = base64::engine::general_purpose::STANDARD.encode(b"\x89PNG\r\n\x1a\nfake");
        Mock::given(method("POST"))
            .and(path("/v1/images/generations"))
            .and(header("authorization", "Bearer sk-img"))
            .and(body_partial_json(serde_json::json!({
                "model": "dall-e-3",
                "size": "1792x1024",
                "response_format": "b64_json"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"b64_json": png, "revised_prompt": "warm bread"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = OpenAiImages::new("sk-img", "dall-e-3", &server.uri(), Duration::from_secs(5));
        let image = client.generate(&request()).await.unwrap();
        assert_eq!(image.backend, "openai");
        assert_eq!(image.b64_png.as_deref(), Some(png.as_str()));
        assert_eq!(image.revised_prompt.as_deref(), Some("warm bread"));
    }

    #[tokio::test]
    async fn test_invalid_base64_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"b64_json": "%%%not base64%%%"}]
            })))
            .mount(&server)
            .await;

        let client = OpenAiImages::new("k", "dall-e-3", &server.uri(), Duration::from_secs(5));
        assert!(client.generate(&request()).await.is_err());
    }

    #[tokio::test]
    async fn test_policy_rejection_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("content_policy_violation"))
            .mount(&server)
            .await;

        let client = OpenAiImages::new("k", "dall-e-3", &server.uri(), Duration::from_secs(5));
        let err = client.generate(&request()).await.unwrap_err();
        assert!(err.to_string().contains("content_policy_violation"));
    }
}
