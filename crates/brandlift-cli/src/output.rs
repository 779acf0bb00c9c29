//! Terminal output formatting.

use brandlift_core::analysis::{AnalysisSource, BrandAnalysis};
use brandlift_core::budget::BudgetRecommendation;
use brandlift_core::profile::ValidationErrors;
use brandlift_core::scoring::{BrandScore, BrandTier};
use brandlift_store::LeadRow;
use colored::{ColoredString, Colorize};

fn tier_colored(tier: BrandTier) -> ColoredString {
    match tier {
        BrandTier::Emerging => tier.label().red(),
        BrandTier::Developing => tier.label().yellow(),
        BrandTier::Established => tier.label().cyan(),
        BrandTier::Dominant => tier.label().green(),
    }
}

/// Print a score with its per-signal breakdown.
pub fn print_score(score: &BrandScore) {
    println!(
        "{} {}",
        tier_colored(score.tier).bold(),
        format!("({}/{}, {}%)", score.points, score.max_points, score.percent()).dimmed()
    );
    println!("{}", score.tier.description());
    println!();

    println!("{:<18} {:<20} {:>6} {:>6} {:>8}", "Signal", "Answer", "Points", "Weight", "Weighted");
    println!("{}", "─".repeat(62));
    for s in &score.breakdown {
        println!(
            "{:<18} {:<20} {:>6} {:>6} {:>8}",
            s.signal,
            truncate(&s.level, 20),
            s.points,
            s.weight,
            s.weighted
        );
    }
}

/// Print a budget split as a table.
pub fn print_budget(budget: &BudgetRecommendation) {
    println!("{} ${}/month", "Budget".bold(), budget.monthly_budget);
    for a in &budget.allocations {
        println!(
            "  {:<14} {:>3}%  {:>8}  {}",
            a.stage.label(),
            a.percent,
            format!("${}", a.amount),
            a.channels.join(", ").dimmed()
        );
    }
}

/// Print a full analysis.
pub fn print_analysis(business_name: &str, analysis: &BrandAnalysis) {
    let source = match analysis.source {
        AnalysisSource::Llm => analysis.model.as_deref().unwrap_or("llm").blue(),
        AnalysisSource::Fallback => "rule-based".dimmed(),
    };
    println!("{} {}", business_name.cyan().bold(), format!("[{}]", source).dimmed());
    println!();
    print_score(&analysis.score);
    println!();
    println!("{}", analysis.summary);
    println!();
    print_budget(&analysis.budget);

    if !analysis.ad_angles.is_empty() {
        println!();
        println!("{}", "Ad Angles".bold());
        for (i, angle) in analysis.ad_angles.iter().enumerate() {
            println!(
                "  {}. {} {}",
                i,
                angle.headline.bold(),
                format!("[{}]", angle.funnel_stage.label()).dimmed()
            );
            println!("     {}", angle.subheadline);
            println!("     {} {}", "CTA:".dimmed(), angle.call_to_action);
        }
    }

    if !analysis.recommendations.is_empty() {
        println!();
        println!("{}", "Recommendations".bold());
        for (i, r) in analysis.recommendations.iter().enumerate() {
            println!("  {}. {}", i + 1, r);
        }
    }
}

/// Print form validation problems.
pub fn print_validation_errors(errors: &ValidationErrors) {
    println!("{} {}", "✗".red().bold(), "Profile is incomplete".bold());
    for e in &errors.errors {
        println!("  {:<10} {:<28} {}", e.step.label().dimmed(), e.field.yellow(), e.message);
    }
}

/// Print leads as a table.
pub fn print_leads_table(leads: &[LeadRow]) {
    if leads.is_empty() {
        println!("{}", "No leads found.".dimmed());
        return;
    }

    println!(
        "{:<10} {:<28} {:<30} {:<18} {:<20}",
        "Result", "Business", "Email", "Tier", "Submitted"
    );
    println!("{}", "─".repeat(110));

    for lead in leads {
        let tier = BrandTier::parse(&lead.tier)
            .map(tier_colored)
            .unwrap_or_else(|| lead.tier.normal());
        println!(
            "{:<10} {:<28} {:<30} {:<18} {:<20}",
            truncate(&lead.result_id, 8),
            truncate(&lead.business_name, 28),
            truncate(&lead.email, 30),
            tier,
            truncate(&lead.created_at, 19)
        );
    }

    println!();
    println!("{} lead(s)", leads.len());
}

/// Shorten to `max_chars`, marking the cut with an ellipsis.
fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let keep = max_chars.saturating_sub(1);
    let mut out: String = s.chars().take(keep).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("bakery", 10), "bakery");
        assert_eq!(truncate("Crème brûlée café", 8), "Crème b…");
        assert_eq!(truncate("abc", 0), "…");
    }
}
