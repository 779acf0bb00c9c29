//! List recent leads.

use anyhow::Result;
use brandlift_core::Config;
use clap::Args;

use crate::output;

#[derive(Args)]
pub struct LeadsArgs {
    /// Maximum number of leads to show
    #[arg(short, long, default_value = "20")]
    pub limit: usize,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

pub async fn execute(args: LeadsArgs, config: &Config) -> Result<()> {
    let store = brandlift_store::open_store(config.store.redis_url.as_deref()).await?;
    let leads = store.list_leads(args.limit).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&leads)?);
    } else {
        output::print_leads_table(&leads);
    }
    Ok(())
}
