//! Ad-creative image generation.
//!
//! Two third-party backends are supported: an OpenAI-style synchronous API
//! that returns the image inline, and a Replicate-style job API that is
//! submitted and then polled until the prediction settles.

pub mod openai;
pub mod replicate;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::analysis::AdAngle;
use crate::budget::FunnelStage;
use crate::config::ImagesConfig;
use crate::error::{BrandliftError, BrandliftResult};
use crate::profile::BusinessProfile;

pub use openai::OpenAiImages;
pub use replicate::ReplicateImages;

/// Output aspect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageSize {
    #[default]
    Square,
    Landscape,
    Portrait,
}

impl ImageSize {
    /// Pixel size string for OpenAI-style APIs.
    pub fn dimensions(&self) -> &'static str {
        match self {
            Self::Square => "1024x1024",
            Self::Landscape => "1792x1024",
            Self::Portrait => "1024x1792",
        }
    }

    /// Aspect ratio string for Replicate-style APIs.
    pub fn aspect_ratio(&self) -> &'static str {
        match self {
            Self::Square => "1:1",
            Self::Landscape => "16:9",
            Self::Portrait => "9:16",
        }
    }
}

/// What to generate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRequest {
    pub prompt: String,
    #[serde(default)]
    pub size: ImageSize,
}

/// A generated image, either inline or hosted by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedImage {
    pub backend: String,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub b64_png: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revised_prompt: Option<String>,
}

/// An image generation provider.
#[async_trait]
pub trait ImageBackend: Send + Sync {
    /// Backend name used for selection (`openai`, `replicate`).
    fn name(&self) -> &'static str;

    async fn generate(&self, request: &ImageRequest) -> Result<GeneratedImage>;
}

/// Business context for creative prompts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreativeBrief {
    pub business_name: String,
    pub industry: String,
    pub target_audience: Option<String>,
}

impl From<&BusinessProfile> for CreativeBrief {
    fn from(profile: &BusinessProfile) -> Self {
        Self {
            business_name: profile.business_name.clone(),
            industry: profile.industry.clone(),
            target_audience: profile.target_audience.clone(),
        }
    }
}

/// Image prompt for an ad angle.
pub fn creative_prompt(brief: &CreativeBrief, angle: &AdAngle) -> String {
    let mood = match angle.funnel_stage {
        FunnelStage::Awareness => "bold, eye-catching and aspirational",
        FunnelStage::Consideration => "warm, trustworthy and informative",
        FunnelStage::Conversion => "clean, focused and action-oriented",
    };
    let mut prompt = format!(
        "Professional advertising photograph for {}, a {} business. Theme: \"{}\". {}. Mood: {}.",
        brief.business_name,
        brief.industry.to_lowercase(),
        angle.headline,
        angle.value_proposition.trim_end_matches('.'),
        mood
    );
    if let Some(audience) = &brief.target_audience {
        prompt.push_str(&format!(" Appeals to {}.", audience.trim_end_matches('.')));
    }
    prompt.push_str(" High quality, natural lighting, no text, no logos, no watermarks.");
    prompt
}

/// Configured image backends.
#[derive(Clone, Default)]
pub struct ImageService {
    backends: Vec<Arc<dyn ImageBackend>>,
    default_backend: Option<String>,
}

impl ImageService {
    pub fn new(backends: Vec<Arc<dyn ImageBackend>>, default_backend: Option<String>) -> Self {
        Self {
            backends,
            default_backend,
        }
    }

    /// Build the backends that have credentials configured.
    pub fn from_config(config: &ImagesConfig) -> Self {
        let mut backends: Vec<Arc<dyn ImageBackend>> = Vec::new();
        if let Some(openai) = OpenAiImages::from_config(config) {
            backends.push(Arc::new(openai));
        }
        if let Some(replicate) = ReplicateImages::from_config(config) {
            backends.push(Arc::new(replicate));
        }
        Self::new(backends, config.default_backend.clone())
    }

    pub fn is_enabled(&self) -> bool {
        !self.backends.is_empty()
    }

    /// Names of the configured backends.
    pub fn backend_names(&self) -> Vec<&'static str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    /// Pick a backend by name, else the configured default, else the first.
    pub fn select(&self, name: Option<&str>) -> BrandliftResult<Arc<dyn ImageBackend>> {
        if self.backends.is_empty() {
            return Err(BrandliftError::ImagesUnavailable(
                "no image backend configured".to_string(),
            ));
        }
        let wanted = name.or(self.default_backend.as_deref());
        match wanted {
            Some(n) => self
                .backends
                .iter()
                .find(|b| b.name().eq_ignore_ascii_case(n.trim()))
                .cloned()
                .ok_or_else(|| {
                    BrandliftError::ImagesUnavailable(format!("backend '{}' is not configured", n))
                }),
            None => Ok(self.backends[0].clone()),
        }
    }

    /// Generate an image with the selected backend.
    pub async fn generate(
        &self,
        backend: Option<&str>,
        request: &ImageRequest,
    ) -> BrandliftResult<GeneratedImage> {
        let backend = self.select(backend)?;
        info!(backend = backend.name(), size = ?request.size, "Generating ad creative");
        backend.generate(request).await.map_err(|e| {
            warn!(backend = backend.name(), error = %e, "Image generation failed");
            BrandliftError::Upstream(format!("{:#}", e))
        })
    }
}
