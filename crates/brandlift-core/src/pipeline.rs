//! Lead submission pipeline.
//!
//! validate -> analyze -> persist -> record lead -> webhooks + email.
//! Only validation and persistence can fail a submission; delivery problems
//! are logged and reported in the [`Submission`].

use brandlift_store::{LeadRow, ResultRow, ResultStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

use crate::analysis::{Analyzer, BrandAnalysis};
use crate::config::Config;
use crate::email::{render_internal_notification, render_results_email, EmailClient};
use crate::error::{BrandliftError, BrandliftResult};
use crate::images::CreativeBrief;
use crate::llm::{AnthropicClient, CompletionProvider};
use crate::profile::BusinessProfile;
use crate::webhook::{LeadPayload, WebhookDelivery, WebhookForwarder};

/// The publicly shareable part of a submission. Contact details are not
/// included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedResult {
    pub id: String,
    pub business_name: String,
    pub industry: String,
    pub website: Option<String>,
    #[serde(default)]
    pub target_audience: Option<String>,
    pub analysis: BrandAnalysis,
    pub created_at: String,
}

impl SharedResult {
    /// Create from a stored row.
    pub fn from_row(row: ResultRow) -> BrandliftResult<Self> {
        Ok(serde_json::from_str(&row.data)?)
    }

    /// Context for generating ad creatives from this result.
    pub fn brief(&self) -> CreativeBrief {
        CreativeBrief {
            business_name: self.business_name.clone(),
            industry: self.industry.clone(),
            target_audience: self.target_audience.clone(),
        }
    }
}

/// Outcome of a submission.
#[derive(Debug, Clone, Serialize)]
pub struct Submission {
    pub result_id: String,
    pub lead_id: String,
    pub share_url: String,
    pub analysis: BrandAnalysis,
    pub webhooks: Vec<WebhookDelivery>,
    pub email_sent: bool,
}

/// Email settings for the pipeline.
#[derive(Clone, Default)]
pub struct Mailer {
    pub client: Option<Arc<EmailClient>>,
    /// Internal recipient for new-lead notifications.
    pub notify: Option<String>,
}

/// Runs lead submissions end to end.
#[derive(Clone)]
pub struct LeadPipeline {
    analyzer: Analyzer,
    store: Arc<dyn ResultStore>,
    webhooks: WebhookForwarder,
    mailer: Mailer,
    public_url: String,
    result_ttl: Duration,
}

impl LeadPipeline {
    pub fn new(
        analyzer: Analyzer,
        store: Arc<dyn ResultStore>,
        webhooks: WebhookForwarder,
        mailer: Mailer,
        public_url: &str,
        result_ttl: Duration,
    ) -> Self {
        Self {
            analyzer,
            store,
            webhooks,
            mailer,
            public_url: public_url.trim_end_matches('/').to_string(),
            result_ttl,
        }
    }

    /// Wire every integration that has credentials in `config`.
    pub fn from_config(config: &Config, store: Arc<dyn ResultStore>) -> Self {
        let provider = AnthropicClient::from_config(&config.llm)
            .map(|c| Arc::new(c) as Arc<dyn CompletionProvider>);
        let mailer = Mailer {
            client: EmailClient::from_config(&config.email).map(Arc::new),
            notify: config.email.notify.clone(),
        };
        Self::new(
            Analyzer::new(provider),
            store,
            WebhookForwarder::from_config(&config.webhooks),
            mailer,
            &config.server.public_url(),
            config.store.result_ttl(),
        )
    }

    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    pub fn store(&self) -> &Arc<dyn ResultStore> {
        &self.store
    }

    pub fn email_enabled(&self) -> bool {
        self.mailer.client.is_some()
    }

    pub fn share_url(&self, result_id: &str) -> String {
        format!("{}/r/{}", self.public_url, result_id)
    }

    /// Run a submission end to end.
    pub async fn submit(&self, profile: BusinessProfile) -> BrandliftResult<Submission> {
        let profile = profile.normalize();
        profile.validate()?;

        let analysis = self.analyzer.analyze(&profile).await;

        let result_id = Uuid::new_v4().to_string();
        let lead_id = Uuid::new_v4().to_string();
        let share_url = self.share_url(&result_id);
        let now = chrono::Utc::now().to_rfc3339();

        let shared = SharedResult {
            id: result_id.clone(),
            business_name: profile.business_name.clone(),
            industry: profile.industry.clone(),
            website: profile.website.clone(),
            target_audience: profile.target_audience.clone(),
            analysis: analysis.clone(),
            created_at: now.clone(),
        };
        let row = ResultRow {
            id: result_id.clone(),
            business_name: profile.business_name.clone(),
            tier: analysis.tier.as_str().to_string(),
            data: serde_json::to_string(&shared)?,
            created_at: now.clone(),
        };
        self.store.save_result(&row, self.result_ttl).await?;

        self.store
            .record_lead(&LeadRow {
                id: lead_id.clone(),
                result_id: result_id.clone(),
                email: profile.contact.email.clone(),
                business_name: profile.business_name.clone(),
                tier: analysis.tier.as_str().to_string(),
                created_at: now,
            })
            .await?;

        info!(
            lead_id = %lead_id,
            result_id = %result_id,
            tier = %analysis.tier,
            source = analysis.source.as_str(),
            "Lead recorded"
        );

        let payload = LeadPayload::new(&lead_id, &result_id, &profile, &analysis, &share_url);
        let (webhooks, email_sent) = tokio::join!(
            self.webhooks.forward(&payload),
            self.send_emails(&profile, &analysis, &share_url, &lead_id)
        );

        Ok(Submission {
            result_id,
            lead_id,
            share_url,
            analysis,
            webhooks,
            email_sent,
        })
    }

    /// Send the results email and the internal notification. Returns whether
    /// the prospect's email was accepted.
    async fn send_emails(
        &self,
        profile: &BusinessProfile,
        analysis: &BrandAnalysis,
        share_url: &str,
        lead_id: &str,
    ) -> bool {
        let Some(client) = &self.mailer.client else {
            return false;
        };

        if let Some(notify) = &self.mailer.notify {
            match render_internal_notification(profile, analysis, share_url, lead_id, notify) {
                Ok(message) => {
                    if let Err(e) = client.send(&message).await {
                        warn!(lead_id = %lead_id, error = %e, "Internal notification not sent");
                    }
                }
                Err(e) => warn!(error = %e, "Failed to render internal notification"),
            }
        }

        let message = match render_results_email(profile, analysis, share_url) {
            Ok(m) => m,
            Err(e) => {
                warn!(error = %e, "Failed to render results email");
                return false;
            }
        };
        match client.send(&message).await {
            Ok(_) => true,
            Err(e) => {
                warn!(lead_id = %lead_id, error = %e, "Results email not sent");
                false
            }
        }
    }

    /// Load a shared result by id.
    pub async fn get_result(&self, id: &str) -> BrandliftResult<SharedResult> {
        let row = self
            .store
            .get_result(id)
            .await?
            .ok_or_else(|| BrandliftError::ResultNotFound(id.to_string()))?;
        SharedResult::from_row(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::AnalysisSource;
    use crate::profile::tests_support::sample_profile;
    use brandlift_store::MemoryStore;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn pipeline(store: Arc<MemoryStore>, webhooks: Vec<String>, mailer: Mailer) -> LeadPipeline {
        LeadPipeline::new(
            Analyzer::fallback_only(),
            store,
            WebhookForwarder::new(webhooks, Duration::from_secs(2))
                .with_retry_delay(Duration::from_millis(1)),
            mailer,
            "https://lift.test/",
            Duration::from_secs(3600),
        )
    }

    #[tokio::test]
    async fn test_submit_persists_and_shares() {
        let store = Arc::new(MemoryStore::new());
        let p = pipeline(store.clone(), Vec::new(), Mailer::default());

        let submission = p.submit(sample_profile()).await.unwrap();
        assert_eq!(
            submission.share_url,
            format!("https://lift.test/r/{}", submission.result_id)
        );
        assert_eq!(submission.analysis.source, AnalysisSource::Fallback);
        assert!(!submission.email_sent);
        assert!(submission.webhooks.is_empty());

        let shared = p.get_result(&submission.result_id).await.unwrap();
        assert_eq!(shared.business_name, "Acme Bakery");
        assert_eq!(shared.analysis, submission.analysis);

        let leads = store.list_leads(10).await.unwrap();
        assert_eq!(leads.len(), 1);
        assert_eq!(leads[0].result_id, submission.result_id);
    }

    #[tokio::test]
    async fn test_shared_result_has_no_contact_details() {
        let store = Arc::new(MemoryStore::new());
        let p = pipeline(store.clone(), Vec::new(), Mailer::default());
        let submission = p.submit(sample_profile()).await.unwrap();
        let row = store.get_result(&submission.result_id).await.unwrap().unwrap();
        assert!(!row.data.contains("dana@acmebakery.com"));
        assert!(!row.data.contains("Dana Baker"));
    }

    #[tokio::test]
    async fn test_invalid_profile_is_rejected_before_storage() {
        let store = Arc::new(MemoryStore::new());
        let p = pipeline(store.clone(), Vec::new(), Mailer::default());
        let mut profile = sample_profile();
        profile.contact.email = "not-an-email".to_string();

        let err = p.submit(profile).await.unwrap_err();
        assert!(matches!(err, BrandliftError::Validation(_)));
        assert!(store.list_leads(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_result() {
        let p = pipeline(Arc::new(MemoryStore::new()), Vec::new(), Mailer::default());
        assert!(matches!(
            p.get_result("nope").await,
            Err(BrandliftError::ResultNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delivery_failures_do_not_fail_submission() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/emails"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let mailer = Mailer {
            client: Some(Arc::new(
                EmailClient::new("re_test", &server.uri(), "Lift <a@lift.test>")
                    .with_retry_delay(Duration::from_millis(1)),
            )),
            notify: Some("sales@lift.test".to_string()),
        };
        let p = pipeline(
            Arc::new(MemoryStore::new()),
            vec![format!("{}/hook", server.uri())],
            mailer,
        );

        let submission = p.submit(sample_profile()).await.unwrap();
        assert!(!submission.email_sent);
        assert_eq!(submission.webhooks.len(), 1);
        assert!(!submission.webhooks[0].ok);
    }

    #[tokio::test]
    async fn test_emails_sent_to_prospect_and_team() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/emails"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "m"})))
            .expect(2)
            .mount(&server)
            .await;

        let mailer = Mailer {
            client: Some(Arc::new(
                EmailClient::new("re_test", &server.uri(), "Lift <a@lift.test>")
                    .with_retry_delay(Duration::from_millis(1)),
            )),
            notify: Some("sales@lift.test".to_string()),
        };
        let p = pipeline(Arc::new(MemoryStore::new()), Vec::new(), mailer);
        assert!(p.submit(sample_profile()).await.unwrap().email_sent);
    }
}
