//! Lead forwarding to CRM and automation webhooks.
//!
//! Deliveries never fail the submission. Each configured URL gets the lead
//! JSON; server errors and transport failures are retried once, and the
//! outcome per URL is reported back to the caller.

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::analysis::BrandAnalysis;
use crate::config::WebhookConfig;
use crate::profile::{BusinessProfile, ContactInfo};

const MAX_ATTEMPTS: u32 = 2;

/// Business details included in the lead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadBusiness {
    pub name: String,
    pub website: Option<String>,
    pub industry: String,
    pub location: Option<String>,
}

/// JSON body posted to each webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadPayload {
    pub event: String,
    pub lead_id: String,
    pub result_id: String,
    pub submitted_at: String,
    pub contact: ContactInfo,
    pub business: LeadBusiness,
    pub monthly_budget: String,
    pub primary_goal: String,
    pub tier: String,
    pub score: u8,
    pub max_score: u8,
    pub share_url: String,
    pub source: String,
}

impl LeadPayload {
    pub fn new(
        lead_id: &str,
        result_id: &str,
        profile: &BusinessProfile,
        analysis: &BrandAnalysis,
        share_url: &str,
    ) -> Self {
        Self {
            event: "lead.created".to_string(),
            lead_id: lead_id.to_string(),
            result_id: result_id.to_string(),
            submitted_at: chrono::Utc::now().to_rfc3339(),
            contact: profile.contact.clone(),
            business: LeadBusiness {
                name: profile.business_name.clone(),
                website: profile.website.clone(),
                industry: profile.industry.clone(),
                location: profile.location.clone(),
            },
            monthly_budget: profile.monthly_budget.as_str().to_string(),
            primary_goal: profile.primary_goal.as_str().to_string(),
            tier: analysis.tier.as_str().to_string(),
            score: analysis.score.points,
            max_score: analysis.score.max_points,
            share_url: share_url.to_string(),
            source: analysis.source.as_str().to_string(),
        }
    }
}

/// Outcome of delivering to one webhook.
///
/// Webhook URLs usually embed a secret token, so `url` and `error` (which
/// repeats the URL for transport failures) stay out of serialized output and
/// only reach the logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookDelivery {
    #[serde(skip_serializing, default)]
    pub url: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub attempts: u32,
    #[serde(skip_serializing, default)]
    pub error: Option<String>,
}

/// Posts leads to the configured webhook URLs.
#[derive(Clone)]
pub struct WebhookForwarder {
    client: reqwest::Client,
    urls: Vec<String>,
    retry_delay: Duration,
}

impl WebhookForwarder {
    pub fn new(urls: Vec<String>, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            urls,
            retry_delay: Duration::from_millis(500),
        }
    }

    pub fn from_config(config: &WebhookConfig) -> Self {
        Self::new(config.urls.clone(), Duration::from_secs(config.timeout_secs))
    }

    /// Set the pause before a retry.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn is_enabled(&self) -> bool {
        !self.urls.is_empty()
    }

    /// Deliver the lead to every URL concurrently.
    pub async fn forward(&self, payload: &LeadPayload) -> Vec<WebhookDelivery> {
        if self.urls.is_empty() {
            debug!(lead_id = %payload.lead_id, "No webhooks configured");
            return Vec::new();
        }

        let deliveries = join_all(self.urls.iter().map(|url| self.deliver(url, payload))).await;

        let delivered = deliveries.iter().filter(|d| d.ok).count();
        info!(
            lead_id = %payload.lead_id,
            delivered,
            total = deliveries.len(),
            "Lead forwarded to webhooks"
        );
        deliveries
    }

    async fn deliver(&self, url: &str, payload: &LeadPayload) -> WebhookDelivery {
        let mut attempts = 0;
        loop {
            attempts += 1;
            let (retryable, delivery) = match self.client.post(url).json(payload).send().await {
                Ok(response) => {
                    let status = response.status();
                    let delivery = WebhookDelivery {
                        url: url.to_string(),
                        ok: status.is_success(),
                        status: Some(status.as_u16()),
                        attempts,
                        error: (!status.is_success())
                            .then(|| format!("webhook responded with HTTP {}", status)),
                    };
                    (status.is_server_error(), delivery)
                }
                Err(e) => (
                    true,
                    WebhookDelivery {
                        url: url.to_string(),
                        ok: false,
                        status: None,
                        attempts,
                        error: Some(e.to_string()),
                    },
                ),
            };

            if delivery.ok || !retryable || attempts >= MAX_ATTEMPTS {
                if !delivery.ok {
                    warn!(
                        url = %url,
                        lead_id = %payload.lead_id,
                        attempts,
                        error = delivery.error.as_deref().unwrap_or(""),
                        "Webhook delivery failed"
                    );
                }
                return delivery;
            }
            tokio::time::sleep(self.retry_delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::generate_fallback_analysis;
    use crate::profile::tests_support::sample_profile;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn payload() -> LeadPayload {
        let profile = sample_profile();
        let analysis = generate_fallback_analysis(&profile);
        LeadPayload::new("lead-1", "res-1", &profile, &analysis, "https://lift.test/r/res-1")
    }

    fn forwarder(urls: Vec<String>) -> WebhookForwarder {
        WebhookForwarder::new(urls, Duration::from_secs(2)).with_retry_delay(Duration::from_millis(1))
    }

    #[test]
    fn test_payload_shape() {
        let json = serde_json::to_value(payload()).unwrap();
        assert_eq!(json["event"], "lead.created");
        assert_eq!(json["contact"]["email"], "dana@acmebakery.com");
        assert_eq!(json["business"]["name"], "Acme Bakery");
        assert_eq!(json["tier"], "developing");
        assert_eq!(json["monthly_budget"], "from_2k_to_5k");
    }

    #[tokio::test]
    async fn test_delivers_to_every_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({"lead_id": "lead-1"})))
            .respond_with(ResponseTemplate::new(200))
            .expect(2)
            .mount(&server)
            .await;

        let urls = vec![format!("{}/crm", server.uri()), format!("{}/zap", server.uri())];
        let deliveries = forwarder(urls).forward(&payload()).await;
        assert_eq!(deliveries.len(), 2);
        assert!(deliveries.iter().all(|d| d.ok && d.attempts == 1));
    }

    #[tokio::test]
    async fn test_retries_server_errors_once() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(202))
            .mount(&server)
            .await;

        let deliveries = forwarder(vec![format!("{}/flaky", server.uri())])
            .forward(&payload())
            .await;
        assert!(deliveries[0].ok);
        assert_eq!(deliveries[0].attempts, 2);
        assert_eq!(deliveries[0].status, Some(202));
    }

    #[tokio::test]
    async fn test_client_errors_are_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(410))
            .expect(1)
            .mount(&server)
            .await;

        let deliveries = forwarder(vec![server.uri()]).forward(&payload()).await;
        assert!(!deliveries[0].ok);
        assert_eq!(deliveries[0].attempts, 1);
        assert_eq!(deliveries[0].status, Some(410));
    }

    #[tokio::test]
    async fn test_unreachable_url_reports_error() {
        let deliveries = forwarder(vec!["http://127.0.0.1:9/hook".to_string()])
            .forward(&payload())
            .await;
        assert!(!deliveries[0].ok);
        assert_eq!(deliveries[0].attempts, 2);
        assert!(deliveries[0].error.is_some());
    }

    #[tokio::test]
    async fn test_serialized_delivery_hides_url() {
        let url = "http://127.0.0.1:9/hooks/catch/123/SECRETTOKEN".to_string();
        let deliveries = forwarder(vec![url]).forward(&payload()).await;
        assert!(deliveries[0].error.as_deref().unwrap().contains("SECRETTOKEN"));

        let json = serde_json::to_string(&deliveries).unwrap();
        assert!(!json.contains("SECRETTOKEN"));
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["ok"], false);
        assert_eq!(value[0]["attempts"], 2);
        assert!(value[0].get("url").is_none());
    }

    #[tokio::test]
    async fn test_no_urls() {
        assert!(forwarder(Vec::new()).forward(&payload()).await.is_empty());
    }
}
