//! Rule-based analysis used when the LLM is unavailable.

use crate::budget::{recommend_budget, FunnelStage};
use crate::profile::{BusinessProfile, PrimaryGoal};
use crate::scoring::{calculate_brand_tier, BrandTier};

use super::model::{AdAngle, AnalysisSource, BrandAnalysis};

/// Build a complete analysis from the profile alone.
pub fn generate_fallback_analysis(profile: &BusinessProfile) -> BrandAnalysis {
    let score = calculate_brand_tier(&profile.signals);
    let tier = score.tier;
    let budget = recommend_budget(profile.monthly_budget.amount(), tier, profile.primary_goal);

    BrandAnalysis {
        tier,
        summary: summary(profile, tier),
        budget,
        ad_angles: ad_angles(profile),
        recommendations: recommendations(profile, tier),
        score,
        source: AnalysisSource::Fallback,
        model: None,
        generated_at: chrono::Utc::now().to_rfc3339(),
    }
}

fn summary(profile: &BusinessProfile, tier: BrandTier) -> String {
    let focus = match profile.primary_goal {
        PrimaryGoal::BrandAwareness => "growing recognition",
        PrimaryGoal::LeadGeneration => "turning attention into qualified leads",
        PrimaryGoal::Sales => "converting demand into revenue",
        PrimaryGoal::CustomerRetention => "keeping existing customers coming back",
        PrimaryGoal::MarketExpansion => "reaching new markets",
    };
    let label = tier.label().to_lowercase();
    let article = if label.starts_with(['a', 'e', 'i', 'o', 'u']) {
        "an"
    } else {
        "a"
    };
    format!(
        "{} is {} {} in {}. {} With your focus on {}, the budget below weights the funnel stages that move you there fastest.",
        profile.business_name,
        article,
        label,
        profile.industry,
        tier.description(),
        focus
    )
}

fn call_to_action(goal: PrimaryGoal, stage: FunnelStage) -> &'static str {
    match (stage, goal) {
        (FunnelStage::Awareness, _) => "Learn More",
        (FunnelStage::Consideration, PrimaryGoal::CustomerRetention) => "See What's New",
        (FunnelStage::Consideration, _) => "See How It Works",
        (FunnelStage::Conversion, PrimaryGoal::LeadGeneration) => "Get a Free Quote",
        (FunnelStage::Conversion, PrimaryGoal::Sales) => "Shop Now",
        (FunnelStage::Conversion, PrimaryGoal::CustomerRetention) => "Come Back Today",
        (FunnelStage::Conversion, _) => "Get Started",
    }
}

/// Three templated angles, one per funnel stage.
pub fn ad_angles(profile: &BusinessProfile) -> Vec<AdAngle> {
    let name = &profile.business_name;
    let industry = profile.industry.to_lowercase();
    let audience = profile
        .target_audience
        .as_deref()
        .unwrap_or("customers who expect more");
    let edge = profile
        .differentiators
        .as_deref()
        .unwrap_or("a better experience from start to finish");
    let place = profile
        .location
        .as_deref()
        .map(|l| format!(" in {}", l))
        .unwrap_or_default();
    let goal = profile.primary_goal;

    vec![
        AdAngle {
            headline: format!("Meet {}", name),
            subheadline: format!("The {} name people{} are starting to talk about", industry, place),
            value_proposition: format!("{} delivers {}.", name, edge),
            call_to_action: call_to_action(goal, FunnelStage::Awareness).to_string(),
            funnel_stage: FunnelStage::Awareness,
        },
        AdAngle {
            headline: format!("Why {} Choose {}", title_case(audience), name),
            subheadline: format!("See how we compare before you decide on {}", industry),
            value_proposition: format!("Built for {}, with {}.", audience, edge),
            call_to_action: call_to_action(goal, FunnelStage::Consideration).to_string(),
            funnel_stage: FunnelStage::Consideration,
        },
        AdAngle {
            headline: format!("Ready When You Are, {}", name),
            subheadline: "Take the next step today, it only takes a minute".to_string(),
            value_proposition: format!("Join the people who already trust {}.", name),
            call_to_action: call_to_action(goal, FunnelStage::Conversion).to_string(),
            funnel_stage: FunnelStage::Conversion,
        },
    ]
}

/// Tier specific recommendations, 3 to 5 items.
pub fn recommendations(profile: &BusinessProfile, tier: BrandTier) -> Vec<String> {
    let mut recs: Vec<String> = match tier {
        BrandTier::Emerging => vec![
            "Claim and complete your Google Business Profile and ask every happy customer for a review.".to_string(),
            "Run broad-reach social campaigns with short video to introduce the brand to your core audience.".to_string(),
            "Keep conversion spend on high-intent search terms only until awareness builds.".to_string(),
        ],
        BrandTier::Developing => vec![
            "Publish customer stories and reviews in your ads to build social proof.".to_string(),
            "Retarget site visitors and video viewers with consideration messaging.".to_string(),
            "Start tracking branded search volume monthly as your awareness KPI.".to_string(),
        ],
        BrandTier::Established => vec![
            "Protect branded search terms so competitors cannot buy your demand.".to_string(),
            "Shift creative testing toward offers and conversion angles.".to_string(),
            "Use email and CRM audiences to build lookalike prospecting campaigns.".to_string(),
        ],
        BrandTier::Dominant => vec![
            "Defend category leadership with always-on upper funnel video.".to_string(),
            "Invest in incrementality testing before scaling any channel further.".to_string(),
            "Grow lifetime value with loyalty and referral programs.".to_string(),
        ],
    };

    if profile.competitors.is_empty() {
        recs.push("Identify your top three competitors and review their active ads for gaps.".to_string());
    }
    if profile.website.is_none() {
        recs.push("Launch a simple landing page so paid traffic has somewhere to convert.".to_string());
    }
    recs.truncate(5);
    recs
}

fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
