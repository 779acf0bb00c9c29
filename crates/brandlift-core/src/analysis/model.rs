//! Analysis domain models.

use serde::{Deserialize, Serialize};

use crate::budget::{BudgetRecommendation, FunnelStage};
use crate::scoring::{BrandScore, BrandTier};

/// A short messaging unit for one funnel stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdAngle {
    pub headline: String,
    pub subheadline: String,
    pub value_proposition: String,
    pub call_to_action: String,
    pub funnel_stage: FunnelStage,
}

/// Where an analysis came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisSource {
    Llm,
    Fallback,
}

impl AnalysisSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Llm => "llm",
            Self::Fallback => "fallback",
        }
    }
}

/// Structured marketing analysis for a business.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandAnalysis {
    pub tier: BrandTier,
    pub score: BrandScore,
    pub summary: String,
    pub budget: BudgetRecommendation,
    pub ad_angles: Vec<AdAngle>,
    pub recommendations: Vec<String>,
    pub source: AnalysisSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub generated_at: String,
}

impl BrandAnalysis {
    /// Create from stored JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// First ad angle for a stage.
    pub fn angle_for(&self, stage: FunnelStage) -> Option<&AdAngle> {
        self.ad_angles.iter().find(|a| a.funnel_stage == stage)
    }

    /// Format as compact markdown for terminal output and email previews.
    pub fn to_markdown(&self, business_name: &str) -> String {
        let mut md = String::new();
        md.push_str(&format!("# {}: {}\n\n", business_name, self.tier.label()));
        md.push_str(&format!(
            "Score: {}/{} ({}%)\n\n",
            self.score.points,
            self.score.max_points,
            self.score.percent()
        ));
        md.push_str(&format!("{}\n\n", self.summary));

        md.push_str(&format!(
            "## Budget (${}/month)\n\n",
            self.budget.monthly_budget
        ));
        for a in &self.budget.allocations {
            md.push_str(&format!(
                "- **{}**: {}% (${})",
                a.stage.label(),
                a.percent,
                a.amount
            ));
            if !a.channels.is_empty() {
                md.push_str(&format!(" via {}", a.channels.join(", ")));
            }
            md.push('\n');
        }

        if !self.ad_angles.is_empty() {
            md.push_str("\n## Ad Angles\n\n");
            for angle in &self.ad_angles {
                md.push_str(&format!(
                    "- [{}] **{}**: {} ({})\n",
                    angle.funnel_stage.label(),
                    angle.headline,
                    angle.subheadline,
                    angle.call_to_action
                ));
            }
        }

        if !self.recommendations.is_empty() {
            md.push_str("\n## Recommendations\n\n");
            for r in &self.recommendations {
                md.push_str(&format!("- {}\n", r));
            }
        }

        md
    }
}
