//! Prompt construction for the analysis request.

use serde::Serialize;
use tera::{Context, Tera};

use crate::error::{BrandliftError, BrandliftResult};
use crate::profile::BusinessProfile;
use crate::scoring::BrandScore;

const ANALYSIS_TEMPLATE: &str = r#"You are a senior brand strategist at a performance marketing agency. Assess the business below and produce a marketing analysis.

Business: {{ profile.business_name }}
Industry: {{ profile.industry }}
{% if profile.website %}Website: {{ profile.website }}
{% endif %}{% if profile.location %}Location: {{ profile.location }}
{% endif %}{% if profile.target_audience %}Target audience: {{ profile.target_audience }}
{% endif %}{% if profile.differentiators %}Differentiators: {{ profile.differentiators }}
{% endif %}{% if competitors %}Competitors: {{ competitors }}
{% endif %}Monthly marketing budget: {{ budget_label }} (plan around ${{ budget_amount }})
Primary goal: {{ goal_label }}

Brand recognition signals:
{% for s in score.breakdown %}- {{ s.signal }}: {{ s.level }}
{% endfor %}
Our scoring model rates this brand {{ score.points }}/{{ score.max_points }}, which is the "{{ tier }}" tier (emerging, developing, established, dominant). Use that tier unless the details above clearly contradict it.

Return ONLY a valid JSON object (no markdown, no explanation) with this exact structure:

{
  "tier": "emerging | developing | established | dominant",
  "summary": "2-3 sentences on where the brand stands and what to focus on",
  "budget": {
    "allocations": [
      {"stage": "awareness", "percent": 40, "channels": ["channel", "channel"]},
      {"stage": "consideration", "percent": 30, "channels": ["channel"]},
      {"stage": "conversion", "percent": 30, "channels": ["channel"]}
    ],
    "recommended_channels": ["channel"]
  },
  "ad_angles": [
    {
      "headline": "max 8 words",
      "subheadline": "max 15 words",
      "value_proposition": "one sentence",
      "call_to_action": "2-4 words",
      "funnel_stage": "awareness | consideration | conversion"
    }
  ],
  "recommendations": ["specific, actionable recommendation"]
}

Instructions:
- Percentages must add up to 100
- Write exactly 3 ad angles, one per funnel stage, in the brand's voice
- Give 3 to 5 recommendations that fit the budget and goal
- Return ONLY the JSON object, nothing else"#;

#[derive(Serialize)]
struct PromptProfile<'a> {
    business_name: &'a str,
    industry: &'a str,
    website: Option<&'a str>,
    location: Option<&'a str>,
    target_audience: Option<&'a str>,
    differentiators: Option<&'a str>,
}

/// Render the analysis prompt for a profile and its computed score.
pub fn build_analysis_prompt(profile: &BusinessProfile, score: &BrandScore) -> BrandliftResult<String> {
    let mut context = Context::new();
    context.insert(
        "profile",
        &PromptProfile {
            business_name: &profile.business_name,
            industry: &profile.industry,
            website: profile.website.as_deref(),
            location: profile.location.as_deref(),
            target_audience: profile.target_audience.as_deref(),
            differentiators: profile.differentiators.as_deref(),
        },
    );
    context.insert("competitors", &profile.competitors.join(", "));
    context.insert("budget_label", profile.monthly_budget.label());
    context.insert("budget_amount", &profile.monthly_budget.amount());
    context.insert("goal_label", profile.primary_goal.label());
    context.insert("score", score);
    context.insert("tier", score.tier.as_str());

    // Prompts are plain text, so autoescaping stays off.
    Tera::one_off(ANALYSIS_TEMPLATE, &context, false)
        .map_err(|e| BrandliftError::Template(e.to_string()))
}
