//! Score brand signals offline.

use anyhow::Result;
use brandlift_core::budget::recommend_budget;
use brandlift_core::profile::{
    BrandAwareness, BrandSignals, BusinessAge, MonthlyBudget, PrimaryGoal, ReviewVolume,
    SearchPresence, SocialFollowing,
};
use brandlift_core::scoring::calculate_brand_tier;
use clap::Args;

use crate::output;

#[derive(Args)]
pub struct ScoreArgs {
    /// Brand awareness (unknown, local, regional, national)
    #[arg(long)]
    pub awareness: BrandAwareness,

    /// Social following (under_1k, from_1k_to_10k, from_10k_to_100k, over_100k)
    #[arg(long)]
    pub social: SocialFollowing,

    /// Review volume (none, under_50, from_50_to_250, over_250)
    #[arg(long)]
    pub reviews: ReviewVolume,

    /// Years in business (under_1_year, from_1_to_3_years, from_3_to_10_years, over_10_years)
    #[arg(long)]
    pub age: BusinessAge,

    /// Branded search presence (none, low, moderate, high)
    #[arg(long)]
    pub search: SearchPresence,

    /// Monthly budget band; with --goal, also prints the budget split
    #[arg(long, requires = "goal")]
    pub budget: Option<MonthlyBudget>,

    /// Primary goal
    #[arg(long, requires = "budget")]
    pub goal: Option<PrimaryGoal>,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

pub fn execute(args: ScoreArgs) -> Result<()> {
    let signals = BrandSignals {
        awareness: args.awareness,
        social_following: args.social,
        reviews: args.reviews,
        business_age: args.age,
        search_presence: args.search,
    };
    let score = calculate_brand_tier(&signals);
    let budget = match (args.budget, args.goal) {
        (Some(budget), Some(goal)) => Some(recommend_budget(budget.amount(), score.tier, goal)),
        _ => None,
    };

    if args.json {
        let value = serde_json::json!({ "score": score, "budget": budget });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    output::print_score(&score);
    if let Some(budget) = &budget {
        println!();
        output::print_budget(budget);
    }
    Ok(())
}
