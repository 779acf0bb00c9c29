//! Service configuration.
//!
//! Loaded from defaults, then an optional `brandlift.toml`, then environment
//! variables. Every integration is optional: a missing credential disables
//! it rather than failing startup.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{BrandliftError, BrandliftResult};

/// Config file looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "brandlift.toml";

/// Longest result retention accepted, in days.
pub const MAX_RESULT_TTL_DAYS: u64 = 3650;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Base URL used in share links. Defaults to `http://{host}:{port}`.
    pub public_url: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3040,
            public_url: None,
        }
    }
}

impl ServerConfig {
    pub fn public_url(&self) -> String {
        self.public_url
            .as_deref()
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| format!("http://{}:{}", self.host, self.port))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "claude-3-5-sonnet-latest".to_string(),
            base_url: "https://api.anthropic.com".to_string(),
            max_tokens: 2048,
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImagesConfig {
    /// Backend used when a request does not name one.
    pub default_backend: Option<String>,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_model: String,
    pub replicate_api_token: Option<String>,
    pub replicate_base_url: String,
    pub replicate_model: String,
    pub poll_interval_ms: u64,
    pub max_poll_attempts: u32,
    pub timeout_secs: u64,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            default_backend: None,
            openai_api_key: None,
            openai_base_url: "https://api.openai.com".to_string(),
            openai_model: "dall-e-3".to_string(),
            replicate_api_token: None,
            replicate_base_url: "https://api.replicate.com".to_string(),
            replicate_model: "black-forest-labs/flux-schnell".to_string(),
            poll_interval_ms: 1_000,
            max_poll_attempts: 60,
            timeout_secs: 60,
        }
    }
}

impl ImagesConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub from: String,
    /// Internal address that receives a copy of every new lead.
    pub notify: Option<String>,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.resend.com".to_string(),
            from: "Brandlift <results@brandlift.app>".to_string(),
            notify: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Redis URL; results stay in memory when unset.
    pub redis_url: Option<String>,
    pub result_ttl_days: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            redis_url: None,
            result_ttl_days: 90,
        }
    }
}

impl StoreConfig {
    /// Result retention, clamped to 1..=`MAX_RESULT_TTL_DAYS` days.
    pub fn result_ttl(&self) -> Duration {
        let days = self.result_ttl_days.clamp(1, MAX_RESULT_TTL_DAYS);
        Duration::from_secs(days * 24 * 60 * 60)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookConfig {
    pub urls: Vec<String>,
    pub timeout_secs: u64,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            urls: Vec::new(),
            timeout_secs: 10,
        }
    }
}

/// Complete service configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub images: ImagesConfig,
    pub email: EmailConfig,
    pub store: StoreConfig,
    pub webhooks: WebhookConfig,
}

fn set_string(target: &mut Option<String>, value: Option<String>) {
    if let Some(v) = value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
        *target = Some(v);
    }
}

impl Config {
    /// Parse TOML config text.
    pub fn from_toml(text: &str) -> BrandliftResult<Self> {
        toml::from_str(text).map_err(|e| BrandliftError::Config(e.to_string()))
    }

    /// Load config from `path`, or from `brandlift.toml` in the working
    /// directory if present, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> BrandliftResult<Self> {
        let mut config = match path {
            Some(p) => {
                let text = std::fs::read_to_string(p).map_err(|e| {
                    BrandliftError::Config(format!("cannot read {}: {}", p.display(), e))
                })?;
                Self::from_toml(&text)?
            }
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_toml(&std::fs::read_to_string(default_path)?)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Override settings from environment-style lookups.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        set_string(&mut self.llm.api_key, lookup("ANTHROPIC_API_KEY"));
        if let Some(model) = lookup("BRANDLIFT_LLM_MODEL").filter(|m| !m.trim().is_empty()) {
            self.llm.model = model.trim().to_string();
        }
        set_string(&mut self.images.openai_api_key, lookup("OPENAI_API_KEY"));
        set_string(&mut self.images.replicate_api_token, lookup("REPLICATE_API_TOKEN"));
        set_string(&mut self.email.api_key, lookup("RESEND_API_KEY"));
        if let Some(from) = lookup("BRANDLIFT_EMAIL_FROM").filter(|f| !f.trim().is_empty()) {
            self.email.from = from.trim().to_string();
        }
        set_string(&mut self.email.notify, lookup("BRANDLIFT_NOTIFY_EMAIL"));
        set_string(&mut self.store.redis_url, lookup("REDIS_URL"));
        if let Some(days) = lookup("BRANDLIFT_RESULT_TTL_DAYS").and_then(|d| d.trim().parse().ok()) {
            self.store.result_ttl_days = days;
        }
        if let Some(urls) = lookup("BRANDLIFT_WEBHOOK_URLS") {
            self.webhooks.urls = urls
                .split(',')
                .map(str::trim)
                .filter(|u| !u.is_empty())
                .map(str::to_string)
                .collect();
        }
        set_string(&mut self.server.public_url, lookup("BRANDLIFT_PUBLIC_URL"));
    }

    /// Which integrations are enabled, for logs and health checks.
    pub fn integrations(&self) -> Integrations {
        Integrations {
            llm: self.llm.api_key.is_some(),
            openai_images: self.images.openai_api_key.is_some(),
            replicate_images: self.images.replicate_api_token.is_some(),
            email: self.email.api_key.is_some(),
            redis: self.store.redis_url.is_some(),
            webhooks: self.webhooks.urls.len(),
        }
    }
}

/// Enabled integrations, without any secrets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Integrations {
    pub llm: bool,
    pub openai_images: bool,
    pub replicate_images: bool,
    pub email: bool,
    pub redis: bool,
    pub webhooks: usize,
}
