//! Brand lift analysis: LLM-generated with a rule-based fallback.

pub mod fallback;
pub mod model;
pub mod parse;
pub mod prompt;

use std::sync::Arc;
use tracing::{info, warn};

use crate::error::BrandliftResult;
use crate::llm::CompletionProvider;
use crate::profile::BusinessProfile;
use crate::scoring::calculate_brand_tier;

pub use fallback::generate_fallback_analysis;
pub use model::{AdAngle, AnalysisSource, BrandAnalysis};

/// Produces analyses, preferring the LLM when one is configured.
#[derive(Clone)]
pub struct Analyzer {
    provider: Option<Arc<dyn CompletionProvider>>,
}

impl Analyzer {
    pub fn new(provider: Option<Arc<dyn CompletionProvider>>) -> Self {
        Self { provider }
    }

    /// An analyzer that never calls an LLM.
    pub fn fallback_only() -> Self {
        Self { provider: None }
    }

    pub fn has_llm(&self) -> bool {
        self.provider.is_some()
    }

    /// Analyze a profile. Never fails: any LLM problem yields the fallback.
    pub async fn analyze(&self, profile: &BusinessProfile) -> BrandAnalysis {
        let Some(provider) = &self.provider else {
            info!(business = %profile.business_name, "No LLM configured, using fallback analysis");
            return generate_fallback_analysis(profile);
        };

        match self.analyze_with_llm(provider.as_ref(), profile).await {
            Ok(analysis) => {
                info!(
                    business = %profile.business_name,
                    tier = %analysis.tier,
                    model = analysis.model.as_deref().unwrap_or(""),
                    "LLM analysis complete"
                );
                analysis
            }
            Err(e) => {
                warn!(
                    business = %profile.business_name,
                    error = %e,
                    "LLM analysis failed, using fallback"
                );
                generate_fallback_analysis(profile)
            }
        }
    }

    async fn analyze_with_llm(
        &self,
        provider: &dyn CompletionProvider,
        profile: &BusinessProfile,
    ) -> BrandliftResult<BrandAnalysis> {
        let score = calculate_brand_tier(&profile.signals);
        let prompt = prompt::build_analysis_prompt(profile, &score)?;
        let completion = provider
            .complete(&prompt)
            .await
            .map_err(|e| crate::error::BrandliftError::llm_response(format!("{:#}", e)))?;
        parse::parse_llm_analysis(&completion.text, profile, &score, Some(&completion.model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Completion;
    use crate::profile::tests_support::sample_profile;
    use async_trait::async_trait;

    struct Canned(Option<&'static str>);

    #[async_trait]
    impl CompletionProvider for Canned {
        fn model(&self) -> &str {
            "canned"
        }

        async fn complete(&self, _prompt: &str) -> anyhow::Result<Completion> {
            match self.0 {
                Some(text) => Ok(Completion {
                    text: text.to_string(),
                    model: "canned".to_string(),
                }),
                None => anyhow::bail!("connection refused"),
            }
        }
    }

    fn analyzer(reply: Option<&'static str>) -> Analyzer {
        Analyzer::new(Some(Arc::new(Canned(reply))))
    }

    #[tokio::test]
    async fn test_without_provider_uses_fallback() {
        let analysis = Analyzer::fallback_only().analyze(&sample_profile()).await;
        assert_eq!(analysis.source, AnalysisSource::Fallback);
    }

    #[tokio::test]
    async fn test_llm_success() {
        let reply = r#"{"summary": "Strong local brand.", "ad_angles": [{"headline": "Fresh", "funnel_stage": "awareness"}]}"#;
        let analysis = analyzer(Some(reply)).analyze(&sample_profile()).await;
        assert_eq!(analysis.source, AnalysisSource::Llm);
        assert_eq!(analysis.summary, "Strong local brand.");
        assert_eq!(analysis.model.as_deref(), Some("canned"));
    }

    #[tokio::test]
    async fn test_llm_failure_falls_back() {
        let analysis = analyzer(None).analyze(&sample_profile()).await;
        assert_eq!(analysis.source, AnalysisSource::Fallback);
    }

    #[tokio::test]
    async fn test_unparseable_reply_falls_back() {
        let analysis = analyzer(Some("Sorry, I can't do that.")).analyze(&sample_profile()).await;
        assert_eq!(analysis.source, AnalysisSource::Fallback);
        assert_eq!(analysis.ad_angles.len(), 3);
    }
}
