//! Show a stored result.

use anyhow::Result;
use brandlift_core::{Config, LeadPipeline};
use clap::Args;
use colored::Colorize;

use crate::output;

#[derive(Args)]
pub struct ResultArgs {
    /// Result id
    pub id: String,

    /// Print markdown instead of formatted text
    #[arg(long, conflicts_with = "json")]
    pub markdown: bool,

    /// Print JSON instead of formatted text
    #[arg(long)]
    pub json: bool,
}

pub async fn execute(args: ResultArgs, config: &Config) -> Result<()> {
    let store = brandlift_store::open_store(config.store.redis_url.as_deref()).await?;
    let pipeline = LeadPipeline::from_config(config, store);
    let result = pipeline.get_result(&args.id).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if args.markdown {
        println!("{}", result.analysis.to_markdown(&result.business_name));
    } else {
        output::print_analysis(&result.business_name, &result.analysis);
        println!();
        println!("{} {}", "Share:".dimmed(), pipeline.share_url(&result.id));
    }
    Ok(())
}
