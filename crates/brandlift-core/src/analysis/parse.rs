//! Parsing of the LLM's analysis response.
//!
//! The model is asked for bare JSON but often wraps it in prose or code
//! fences, drops fields, or returns percentages that do not add up. Parsing
//! is lenient about shape and strict about the parts the result page needs.

use serde::Deserialize;
use serde_json::Value;

use crate::budget::{recommend_budget, BudgetRecommendation, FunnelStage, StageAllocation};
use crate::error::{BrandliftError, BrandliftResult};
use crate::profile::BusinessProfile;
use crate::scoring::{BrandScore, BrandTier};

use super::fallback;
use super::model::{AdAngle, AnalysisSource, BrandAnalysis};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawAnalysis {
    tier: Option<String>,
    summary: Option<String>,
    budget: Option<RawBudget>,
    #[serde(alias = "angles")]
    ad_angles: Vec<RawAngle>,
    recommendations: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawBudget {
    allocations: Vec<RawAllocation>,
    recommended_channels: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawAllocation {
    stage: String,
    percent: Value,
    channels: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawAngle {
    headline: String,
    subheadline: String,
    value_proposition: String,
    #[serde(alias = "cta")]
    call_to_action: String,
    #[serde(alias = "stage")]
    funnel_stage: String,
}

/// Pull the JSON document out of a model reply. Replies are usually a
/// fenced block, sometimes an object surrounded by prose.
pub fn extract_json(text: &str) -> String {
    let text = text.trim();
    if let Some(body) = fenced_block(text) {
        return body.to_string();
    }
    match (text.find('{'), text.rfind('}')) {
        (Some(open), Some(close)) if open < close => text[open..=close].to_string(),
        _ => text.to_string(),
    }
}

/// Contents of the first complete code fence, minus its language tag.
fn fenced_block(text: &str) -> Option<&str> {
    let (_, rest) = text.split_once("```")?;
    let (body, _) = rest.split_once("```")?;
    let body = match body.split_once('\n') {
        Some((tag, tail)) if tag.trim().chars().all(|c| c.is_ascii_alphanumeric()) => tail,
        _ => body,
    };
    Some(body.trim())
}

/// Read a percentage given as a number or a string like `"40%"`.
fn percent_value(value: &Value) -> Option<f64> {
    let pct = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse().ok(),
        _ => None,
    };
    pct.filter(|p| p.is_finite() && *p > 0.0)
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn budget_from_raw(raw: Option<RawBudget>, monthly_budget: u32) -> Option<BudgetRecommendation> {
    let raw = raw?;
    let mut allocations: Vec<StageAllocation> = Vec::new();
    for a in raw.allocations {
        let Some(stage) = FunnelStage::parse(&a.stage) else {
            continue;
        };
        if allocations.iter().any(|x| x.stage == stage) {
            continue;
        }
        let Some(pct) = percent_value(&a.percent) else {
            continue;
        };
        allocations.push(StageAllocation {
            stage,
            percent: pct.round().clamp(1.0, 100.0) as u8,
            amount: 0,
            channels: clean_list(a.channels),
        });
    }
    if allocations.is_empty() {
        return None;
    }
    allocations.sort_by_key(|a| a.stage);

    let mut recommended_channels = clean_list(raw.recommended_channels);
    if recommended_channels.is_empty() {
        for channel in allocations.iter().flat_map(|a| a.channels.iter()) {
            if !recommended_channels.contains(channel) {
                recommended_channels.push(channel.clone());
            }
        }
    }

    Some(
        BudgetRecommendation {
            monthly_budget,
            allocations,
            recommended_channels,
        }
        .normalized(),
    )
}

fn angles_from_raw(raw: Vec<RawAngle>) -> Vec<AdAngle> {
    raw.into_iter()
        .filter(|a| !a.headline.trim().is_empty())
        .enumerate()
        .map(|(i, a)| AdAngle {
            headline: a.headline.trim().to_string(),
            subheadline: a.subheadline.trim().to_string(),
            value_proposition: a.value_proposition.trim().to_string(),
            call_to_action: match a.call_to_action.trim() {
                "" => "Learn More".to_string(),
                cta => cta.to_string(),
            },
            funnel_stage: FunnelStage::parse(&a.funnel_stage)
                .unwrap_or(FunnelStage::ALL[i % FunnelStage::ALL.len()]),
        })
        .collect()
}

/// Turn the LLM's text into an analysis.
///
/// The score always comes from `score`. The model's tier is kept when it
/// names a known tier. Missing or unusable budgets and recommendations are
/// filled in from the rule-based generator; a missing summary or zero usable
/// ad angles is an error.
pub fn parse_llm_analysis(
    text: &str,
    profile: &BusinessProfile,
    score: &BrandScore,
    model: Option<&str>,
) -> BrandliftResult<BrandAnalysis> {
    let json = extract_json(text);
    let raw: RawAnalysis = serde_json::from_str(&json)
        .map_err(|e| BrandliftError::llm_response(format!("not a JSON analysis: {}", e)))?;

    let summary = raw
        .summary
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| BrandliftError::llm_response("missing summary"))?
        .to_string();

    let ad_angles = angles_from_raw(raw.ad_angles);
    if ad_angles.is_empty() {
        return Err(BrandliftError::llm_response("no usable ad angles"));
    }

    let tier = raw
        .tier
        .as_deref()
        .and_then(BrandTier::parse)
        .unwrap_or(score.tier);

    let monthly_budget = profile.monthly_budget.amount();
    let budget = budget_from_raw(raw.budget, monthly_budget)
        .unwrap_or_else(|| recommend_budget(monthly_budget, tier, profile.primary_goal));

    let mut recommendations = clean_list(raw.recommendations);
    if recommendations.is_empty() {
        recommendations = fallback::recommendations(profile, tier);
    }

    Ok(BrandAnalysis {
        tier,
        score: score.clone(),
        summary,
        budget,
        ad_angles,
        recommendations,
        source: AnalysisSource::Llm,
        model: model.map(str::to_string),
        generated_at: chrono::Utc::now().to_rfc3339(),
    })
}
