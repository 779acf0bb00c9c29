//! Replicate-style asynchronous image generation.
//!
//! A prediction is created, then polled until it reaches a terminal status
//! (`succeeded`, `failed` or `canceled`) or the attempt budget runs out.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

use super::{GeneratedImage, ImageBackend, ImageRequest};
use crate::config::ImagesConfig;

/// Client for the predictions API.
pub struct ReplicateImages {
    api_token: String,
    model: String,
    base_url: String,
    poll_interval: Duration,
    max_poll_attempts: u32,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct PredictionRequest<'a> {
    input: PredictionInput<'a>,
}

#[derive(Serialize)]
struct PredictionInput<'a> {
    prompt: &'a str,
    aspect_ratio: &'a str,
    output_format: &'a str,
}

#[derive(Debug, Deserialize)]
struct Prediction {
    id: String,
    status: String,
    #[serde(default)]
    output: Value,
    #[serde(default)]
    error: Option<Value>,
}

enum PredictionState {
    Pending,
    Succeeded(String),
}

impl Prediction {
    fn state(&self) -> Result<PredictionState> {
        match self.status.as_str() {
            "succeeded" => {
                let url = match &self.output {
                    Value::String(s) => Some(s.clone()),
                    Value::Array(items) => items.iter().find_map(|v| v.as_str().map(str::to_string)),
                    _ => None,
                };
                url.map(PredictionState::Succeeded)
                    .ok_or_else(|| anyhow::anyhow!("Prediction {} succeeded without output", self.id))
            }
            "failed" | "canceled" => {
                let reason = match &self.error {
                    Some(Value::String(s)) => s.clone(),
                    Some(other) => other.to_string(),
                    None => "no error message".to_string(),
                };
                anyhow::bail!("Prediction {} {}: {}", self.id, self.status, reason)
            }
            _ => Ok(PredictionState::Pending),
        }
    }
}

impl ReplicateImages {
    pub fn new(
        api_token: &str,
        model: &str,
        base_url: &str,
        poll_interval: Duration,
        max_poll_attempts: u32,
        timeout: Duration,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();

        Self {
            api_token: api_token.to_string(),
            model: model.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            poll_interval,
            max_poll_attempts,
            client,
        }
    }

    /// Build from config; `None` when no API token is set.
    pub fn from_config(config: &ImagesConfig) -> Option<Self> {
        let token = config.replicate_api_token.as_deref()?;
        Some(Self::new(
            token,
            &config.replicate_model,
            &config.replicate_base_url,
            config.poll_interval(),
            config.max_poll_attempts,
            Duration::from_secs(config.timeout_secs),
        ))
    }

    async fn read_prediction(response: reqwest::Response) -> Result<Prediction> {
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            anyhow::bail!("Prediction API error (HTTP {}): {}", status, text);
        }
        response
            .json()
            .await
            .context("Failed to parse prediction response")
    }

    async fn create(&self, request: &ImageRequest) -> Result<Prediction> {
        let body = PredictionRequest {
            input: PredictionInput {
                prompt: &request.prompt,
                aspect_ratio: request.size.aspect_ratio(),
                output_format: "png",
            },
        };
        let response = self
            .client
            .post(format!("{}/v1/models/{}/predictions", self.base_url, self.model))
            .bearer_auth(&self.api_token)
            .json(&body)
            .send()
            .await
            .context("Failed to create prediction")?;
        Self::read_prediction(response).await
    }

    async fn fetch(&self, id: &str) -> Result<Prediction> {
        let response = self
            .client
            .get(format!("{}/v1/predictions/{}", self.base_url, id))
            .bearer_auth(&self.api_token)
            .send()
            .await
            .context("Failed to poll prediction")?;
        Self::read_prediction(response).await
    }
}

#[async_trait]
impl ImageBackend for ReplicateImages {
    fn name(&self) -> &'static str {
        "replicate"
    }

    async fn generate(&self, request: &ImageRequest) -> Result<GeneratedImage> {
        let mut prediction = self.create(request).await?;
        let id = prediction.id.clone();
        info!(prediction_id = %id, model = %self.model, "Prediction created");

        let mut attempts = 0;
        let url = loop {
            if let PredictionState::Succeeded(url) = prediction.state()? {
                break url;
            }
            if attempts >= self.max_poll_attempts {
                anyhow::bail!(
                    "Prediction {} did not finish after {} polls (last status: {})",
                    id,
                    attempts,
                    prediction.status
                );
            }
            attempts += 1;
            tokio::time::sleep(self.poll_interval).await;
            prediction = self.fetch(&id).await?;
            debug!(prediction_id = %id, status = %prediction.status, attempts, "Polled prediction");
        };

        Ok(GeneratedImage {
            backend: self.name().to_string(),
            prompt: request.prompt.clone(),
            url: Some(url),
            b64_png: None,
            job_id: Some(id),
            revised_prompt: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::images::ImageSize;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer, max_polls: u32) -> ReplicateImages {
        ReplicateImages::new(
            "r8_test",
            "acme/flux",
            &server.uri(),
            Duration::from_millis(5),
            max_polls,
            Duration::from_secs(5),
        )
    }

    fn request() -> ImageRequest {
        ImageRequest {
            prompt: "bakery storefront at dawn".to_string(),
            size: ImageSize::Portrait,
        }
    }

    async fn mount_create(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/v1/models/acme/flux/predictions"))
            .and(header("authorization", "Bearer r8_test"))
            .and(body_partial_json(serde_json::json!({
                "input": {"aspect_ratio": "9:16", "output_format": "png"}
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "id": "p1", "status": "starting"
            })))
            .expect(1)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_polls_until_succeeded() {
        let server = MockServer::start().await;
        mount_create(&server).await;
        Mock::given(method("GET"))
            .and(path("/v1/predictions/p1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "p1", "status": "processing"
            })))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/predictions/p1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "p1", "status": "succeeded", "output": ["https://cdn.test/p1.png"]
            })))
            .mount(&server)
            .await;

        let image = client(&server, 10).generate(&request()).await.unwrap();
        assert_eq!(image.url.as_deref(), Some("https://cdn.test/p1.png"));
        assert_eq!(image.job_id.as_deref(), Some("p1"));
        assert_eq!(image.backend, "replicate");
    }

    #[tokio::test]
    async fn test_failed_prediction_reports_error() {
        let server = MockServer::start().await;
        mount_create(&server).await;
        Mock::given(method("GET"))
            .and(path("/v1/predictions/p1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "p1", "status": "failed", "error": "NSFW content detected"
            })))
            .mount(&server)
            .await;

        let err = client(&server, 10).generate(&request()).await.unwrap_err();
        assert!(err.to_string().contains("NSFW content detected"));
    }

    #[tokio::test]
    async fn test_gives_up_after_max_polls() {
        let server = MockServer::start().await;
        mount_create(&server).await;
        Mock::given(method("GET"))
            .and(path("/v1/predictions/p1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "p1", "status": "processing"
            })))
            .expect(3)
            .mount(&server)
            .await;

        let err = client(&server, 3).generate(&request()).await.unwrap_err();
        assert!(err.to_string().contains("did not finish after 3 polls"));
    }

    #[test]
    fn test_succeeded_output_as_string() {
        let prediction = Prediction {
            id: "p".to_string(),
            status: "succeeded".to_string(),
            output: Value::String("https://cdn.test/x.png".to_string()),
            error: None,
        };
        assert!(matches!(prediction.state(), Ok(PredictionState::Succeeded(u)) if u.ends_with("x.png")));
    }
}
