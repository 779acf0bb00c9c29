//! Transactional email through a Resend-compatible API.

use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tera::{Context, Tera};
use tracing::{debug, warn};

use crate::analysis::BrandAnalysis;
use crate::config::EmailConfig;
use crate::error::{BrandliftError, BrandliftResult};
use crate::profile::BusinessProfile;

const RESULTS_TEMPLATE: &str = r#"<!doctype html>
<html>
<body style="font-family: Helvetica, Arial, sans-serif; color: #1f2937; max-width: 600px; margin: 0 auto;">
  <h1 style="font-size: 22px;">Hi {{ name }}, your Brand Lift results are ready</h1>
  <p>Brand maturity for <strong>{{ business }}</strong>: <strong>{{ tier_label }}</strong> ({{ points }}/{{ max_points }}).</p>
  <p>{{ summary }}</p>
  <h2 style="font-size: 18px;">Recommended monthly budget: ${{ budget }}</h2>
  <ul>
  {% for a in allocations %}<li>{{ a.stage | capitalize }}: {{ a.percent }}% (${{ a.amount }})</li>
  {% endfor %}</ul>
  {% if headline %}<p>Your lead ad angle: <em>{{ headline }}</em></p>{% endif %}
  <p><a href="{{ share_url | safe }}" style="background: #4f46e5; color: #ffffff; padding: 12px 20px; border-radius: 6px; text-decoration: none;">View your full report</a></p>
  <p style="font-size: 12px; color: #6b7280;">You can download the report as a PDF from the results page.</p>
</body>
</html>"#;

const NOTIFICATION_TEMPLATE: &str = r#"<!doctype html>
<html>
<body style="font-family: Helvetica, Arial, sans-serif;">
  <h1 style="font-size: 20px;">New Brand Lift lead: {{ business }}</h1>
  <table cellpadding="4">
    <tr><td>Contact</td><td>{{ name }} &lt;{{ email }}&gt;</td></tr>
    {% if phone %}<tr><td>Phone</td><td>{{ phone }}</td></tr>{% endif %}
    {% if website %}<tr><td>Website</td><td>{{ website }}</td></tr>{% endif %}
    <tr><td>Industry</td><td>{{ industry }}</td></tr>
    <tr><td>Budget</td><td>{{ budget_label }}</td></tr>
    <tr><td>Goal</td><td>{{ goal_label }}</td></tr>
    <tr><td>Tier</td><td>{{ tier_label }} ({{ points }}/{{ max_points }})</td></tr>
    <tr><td>Analysis</td><td>{{ source }}</td></tr>
    <tr><td>Lead ID</td><td>{{ lead_id }}</td></tr>
  </table>
  <p><a href="{{ share_url | safe }}">Open report</a></p>
</body>
</html>"#;

/// A rendered email ready to send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailMessage {
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
}

#[derive(Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: &'a [String],
    subject: &'a str,
    html: &'a str,
}

#[derive(Deserialize)]
struct SendResponse {
    id: String,
}

const MAX_ATTEMPTS: u32 = 2;

/// Client for the transactional email provider.
pub struct EmailClient {
    api_key: String,
    base_url: String,
    from: String,
    retry_delay: Duration,
    client: reqwest::Client,
}

/// Why one send attempt failed, and whether another is worth making.
struct AttemptError {
    retryable: bool,
    error: anyhow::Error,
}

impl EmailClient {
    pub fn new(api_key: &str, base_url: &str, from: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_default();

        Self {
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            from: from.to_string(),
            retry_delay: Duration::from_millis(500),
            client,
        }
    }

    /// Set the pause before a retry.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Build from config; `None` when no API key is set.
    pub fn from_config(config: &EmailConfig) -> Option<Self> {
        let key = config.api_key.as_deref()?;
        Some(Self::new(key, &config.base_url, &config.from))
    }

    /// Send a message, returning the provider's message id. Server errors
    /// and transport failures are retried once.
    pub async fn send(&self, message: &EmailMessage) -> Result<String> {
        let mut attempts = 0;
        loop {
            attempts += 1;
            match self.try_send(message).await {
                Ok(id) => return Ok(id),
                Err(e) if e.retryable && attempts < MAX_ATTEMPTS => {
                    warn!(attempts, error = %e.error, "Email send failed, retrying");
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(e) => return Err(e.error),
            }
        }
    }

    async fn try_send(&self, message: &EmailMessage) -> std::result::Result<String, AttemptError> {
        let request = SendRequest {
            from: &self.from,
            to: &message.to,
            subject: &message.subject,
            html: &message.html,
        };

        let response = self
            .client
            .post(format!("{}/emails", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to call email API")
            .map_err(|error| AttemptError {
                retryable: true,
                error,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AttemptError {
                retryable: status.is_server_error(),
                error: anyhow::anyhow!("Email API error (HTTP {}): {}", status, body),
            });
        }

        let sent: SendResponse = response
            .json()
            .await
            .context("Failed to parse email API response")
            .map_err(|error| AttemptError {
                retryable: false,
                error,
            })?;
        debug!(message_id = %sent.id, recipients = message.to.len(), "Email accepted");
        Ok(sent.id)
    }
}

fn render(template: &str, context: &Context) -> BrandliftResult<String> {
    Tera::one_off(template, context, true).map_err(|e| BrandliftError::Template(e.to_string()))
}

fn base_context(profile: &BusinessProfile, analysis: &BrandAnalysis, share_url: &str) -> Context {
    let mut context = Context::new();
    context.insert("name", &profile.contact.name);
    context.insert("business", &profile.business_name);
    context.insert("tier_label", analysis.tier.label());
    context.insert("points", &analysis.score.points);
    context.insert("max_points", &analysis.score.max_points);
    context.insert("share_url", share_url);
    context
}

/// Email sent to the prospect with a link to their results.
pub fn render_results_email(
    profile: &BusinessProfile,
    analysis: &BrandAnalysis,
    share_url: &str,
) -> BrandliftResult<EmailMessage> {
    let mut context = base_context(profile, analysis, share_url);
    context.insert("summary", &analysis.summary);
    context.insert("budget", &analysis.budget.monthly_budget);
    context.insert("allocations", &analysis.budget.allocations);
    context.insert(
        "headline",
        &analysis.ad_angles.first().map(|a| a.headline.as_str()),
    );

    Ok(EmailMessage {
        to: vec![profile.contact.email.clone()],
        subject: format!("Your Brand Lift report for {}", profile.business_name),
        html: render(RESULTS_TEMPLATE, &context)?,
    })
}

/// Email sent to the internal team for each new lead.
pub fn render_internal_notification(
    profile: &BusinessProfile,
    analysis: &BrandAnalysis,
    share_url: &str,
    lead_id: &str,
    notify: &str,
) -> BrandliftResult<EmailMessage> {
    let mut context = base_context(profile, analysis, share_url);
    context.insert("email", &profile.contact.email);
    context.insert("phone", &profile.contact.phone);
    context.insert("website", &profile.website);
    context.insert("industry", &profile.industry);
    context.insert("budget_label", profile.monthly_budget.label());
    context.insert("goal_label", profile.primary_goal.label());
    context.insert("source", analysis.source.as_str());
    context.insert("lead_id", lead_id);

    Ok(EmailMessage {
        to: vec![notify.to_string()],
        subject: format!(
            "New lead: {} ({})",
            profile.business_name,
            analysis.tier.label()
        ),
        html: render(NOTIFICATION_TEMPLATE, &context)?,
    })
}
