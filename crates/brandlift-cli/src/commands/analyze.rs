//! Analyze a profile file without storing it.

use anyhow::{bail, Context, Result};
use brandlift_core::analysis::Analyzer;
use brandlift_core::llm::{AnthropicClient, CompletionProvider};
use brandlift_core::profile::ProfileDraft;
use brandlift_core::Config;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

use crate::output;

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Path to a profile JSON file (same shape as POST /api/analyze)
    pub profile: PathBuf,

    /// Skip the LLM and use the rule-based analysis
    #[arg(long)]
    pub offline: bool,

    /// Print JSON instead of formatted text
    #[arg(long)]
    pub json: bool,
}

pub async fn execute(args: AnalyzeArgs, config: &Config) -> Result<()> {
    let text = std::fs::read_to_string(&args.profile)
        .with_context(|| format!("cannot read {}", args.profile.display()))?;
    let draft: ProfileDraft = serde_json::from_str(&text)
        .with_context(|| format!("{} is not a valid profile", args.profile.display()))?;

    let profile = match draft.into_profile() {
        Ok(p) => p,
        Err(errors) => {
            output::print_validation_errors(&errors);
            bail!("{} field(s) need attention", errors.errors.len());
        }
    };

    let analyzer = if args.offline {
        Analyzer::fallback_only()
    } else {
        let provider = AnthropicClient::from_config(&config.llm)
            .map(|c| Arc::new(c) as Arc<dyn CompletionProvider>);
        Analyzer::new(provider)
    };
    let analysis = analyzer.analyze(&profile).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    } else {
        output::print_analysis(&profile.business_name, &analysis);
    }
    Ok(())
}
