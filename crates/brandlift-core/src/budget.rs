//! Budget allocation across funnel stages.

use serde::{Deserialize, Serialize};

use crate::profile::PrimaryGoal;
use crate::scoring::BrandTier;

/// No stage is allocated less than this share.
const MIN_STAGE_PERCENT: u8 = 10;

/// Percentage points a goal moves between stages.
const GOAL_SHIFT: u8 = 10;

/// Marketing funnel stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunnelStage {
    Awareness,
    Consideration,
    Conversion,
}

impl FunnelStage {
    pub const ALL: [FunnelStage; 3] = [Self::Awareness, Self::Consideration, Self::Conversion];

    /// Parse from string, accepting common funnel vocabulary.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "awareness" | "top" | "tofu" | "top of funnel" => Some(Self::Awareness),
            "consideration" | "interest" | "middle" | "mofu" | "middle of funnel" => {
                Some(Self::Consideration)
            }
            "conversion" | "decision" | "action" | "bottom" | "bofu" | "bottom of funnel" => {
                Some(Self::Conversion)
            }
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Awareness => "awareness",
            Self::Consideration => "consideration",
            Self::Conversion => "conversion",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Awareness => "Awareness",
            Self::Consideration => "Consideration",
            Self::Conversion => "Conversion",
        }
    }

    fn index(&self) -> usize {
        match self {
            Self::Awareness => 0,
            Self::Consideration => 1,
            Self::Conversion => 2,
        }
    }
}

impl std::fmt::Display for FunnelStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Budget share for one stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageAllocation {
    pub stage: FunnelStage,
    pub percent: u8,
    pub amount: u32,
    #[serde(default)]
    pub channels: Vec<String>,
}

/// Recommended monthly budget split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetRecommendation {
    pub monthly_budget: u32,
    pub allocations: Vec<StageAllocation>,
    pub recommended_channels: Vec<String>,
}

impl BudgetRecommendation {
    /// Share for a stage, 0 when absent.
    pub fn percent_for(&self, stage: FunnelStage) -> u8 {
        self.allocations
            .iter()
            .find(|a| a.stage == stage)
            .map(|a| a.percent)
            .unwrap_or(0)
    }

    /// Rescale the allocations so percentages sum to 100 and amounts sum to
    /// the monthly budget.
    pub fn normalized(self) -> Self {
        let weights: Vec<(FunnelStage, f64)> = self
            .allocations
            .iter()
            .map(|a| (a.stage, f64::from(a.percent)))
            .collect();
        let channels: Vec<Vec<String>> =
            self.allocations.into_iter().map(|a| a.channels).collect();
        let mut allocations = allocate(self.monthly_budget, &weights);
        for (allocation, ch) in allocations.iter_mut().zip(channels) {
            allocation.channels = ch;
        }
        Self {
            monthly_budget: self.monthly_budget,
            allocations,
            recommended_channels: self.recommended_channels,
        }
    }
}

/// Base awareness / consideration / conversion split for a tier.
pub fn base_split(tier: BrandTier) -> [u8; 3] {
    match tier {
        BrandTier::Emerging => [60, 25, 15],
        BrandTier::Developing => [45, 30, 25],
        BrandTier::Established => [35, 30, 35],
        BrandTier::Dominant => [25, 25, 50],
    }
}

/// Shift the split toward the stage the goal cares about.
pub fn adjust_for_goal(split: [u8; 3], goal: PrimaryGoal) -> [u8; 3] {
    use FunnelStage::*;
    let (from, to) = match goal {
        PrimaryGoal::BrandAwareness | PrimaryGoal::MarketExpansion => (Conversion, Awareness),
        PrimaryGoal::LeadGeneration | PrimaryGoal::Sales => (Awareness, Conversion),
        PrimaryGoal::CustomerRetention => (Awareness, Consideration),
    };
    let mut split = split;
    let available = split[from.index()].saturating_sub(MIN_STAGE_PERCENT);
    let moved = GOAL_SHIFT.min(available);
    split[from.index()] -= moved;
    split[to.index()] += moved;
    split
}

/// Channels suited to a stage at a given maturity.
pub fn channels_for(stage: FunnelStage, tier: BrandTier) -> &'static [&'static str] {
    match (stage, tier) {
        (FunnelStage::Awareness, BrandTier::Emerging) => {
            &["Meta reach campaigns", "Local SEO & Google Business Profile"]
        }
        (FunnelStage::Awareness, BrandTier::Developing) => &["Meta video views", "YouTube in-stream"],
        (FunnelStage::Awareness, BrandTier::Established) => &["YouTube", "Connected TV"],
        (FunnelStage::Awareness, BrandTier::Dominant) => &["Connected TV", "Sponsorships & PR"],
        (FunnelStage::Consideration, BrandTier::Emerging | BrandTier::Developing) => {
            &["Google Search (category keywords)", "Social proof content"]
        }
        (FunnelStage::Consideration, _) => &["Content marketing", "Email nurture"],
        (FunnelStage::Conversion, BrandTier::Emerging) => &["Google Search (high intent)"],
        (FunnelStage::Conversion, _) => &["Google Search (branded)", "Retargeting"],
    }
}

/// Split `monthly_budget` by weights. Percentages are rounded with the
/// largest remainder method so they sum to 100; dollar rounding leftovers go
/// to the largest stage so amounts sum to the budget.
pub fn allocate(monthly_budget: u32, weights: &[(FunnelStage, f64)]) -> Vec<StageAllocation> {
    if weights.is_empty() {
        return Vec::new();
    }

    let clean: Vec<f64> = weights
        .iter()
        .map(|(_, w)| if w.is_finite() && *w > 0.0 { *w } else { 0.0 })
        .collect();
    let total: f64 = clean.iter().sum();
    let exact: Vec<f64> = if total > 0.0 {
        clean.iter().map(|w| w * 100.0 / total).collect()
    } else {
        vec![100.0 / clean.len() as f64; clean.len()]
    };

    let mut percents: Vec<u8> = exact.iter().map(|e| e.floor() as u8).collect();
    let assigned: u32 = percents.iter().map(|p| u32::from(*p)).sum();
    let mut order: Vec<usize> = (0..exact.len()).collect();
    order.sort_by(|&a, &b| {
        let ra = exact[a] - exact[a].floor();
        let rb = exact[b] - exact[b].floor();
        rb.partial_cmp(&ra).unwrap_or(std::cmp::Ordering::Equal).then(a.cmp(&b))
    });
    for &i in order.iter().take(100u32.saturating_sub(assigned) as usize) {
        percents[i] += 1;
    }

    let mut allocations: Vec<StageAllocation> = weights
        .iter()
        .zip(&percents)
        .map(|((stage, _), pct)| StageAllocation {
            stage: *stage,
            percent: *pct,
            amount: (u64::from(monthly_budget) * u64::from(*pct) / 100) as u32,
            channels: Vec::new(),
        })
        .collect();

    let spent: u32 = allocations.iter().map(|a| a.amount).sum();
    let remainder = monthly_budget.saturating_sub(spent);
    if remainder > 0 {
        if let Some(largest) = allocations.iter_mut().max_by_key(|a| a.percent) {
            largest.amount += remainder;
        }
    }

    allocations
}

/// Deterministic budget recommendation for a tier and goal.
pub fn recommend_budget(
    monthly_budget: u32,
    tier: BrandTier,
    goal: PrimaryGoal,
) -> BudgetRecommendation {
    let split = adjust_for_goal(base_split(tier), goal);
    let weights: Vec<(FunnelStage, f64)> = FunnelStage::ALL
        .iter()
        .map(|s| (*s, f64::from(split[s.index()])))
        .collect();

    let mut allocations = allocate(monthly_budget, &weights);
    let mut recommended_channels = Vec::new();
    for allocation in &mut allocations {
        allocation.channels = channels_for(allocation.stage, tier)
            .iter()
            .map(|c| c.to_string())
            .collect();
        for channel in &allocation.channels {
            if !recommended_channels.contains(channel) {
                recommended_channels.push(channel.clone());
            }
        }
    }

    BudgetRecommendation {
        monthly_budget,
        allocations,
        recommended_channels,
    }
}
