//! CLI command definitions and handlers.

use anyhow::Result;
use brandlift_core::Config;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod analyze;
pub mod leads;
pub mod result;
pub mod score;
pub mod serve;

/// Brandlift - Brand lift assessments with budget and creative recommendations
#[derive(Parser)]
#[command(name = "brandlift")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a TOML config file (defaults to ./brandlift.toml if present)
    #[arg(short, long, global = true, env = "BRANDLIFT_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server
    Serve(serve::ServeArgs),

    /// Score brand signals and show the tier
    Score(score::ScoreArgs),

    /// Analyze a profile JSON file without storing it
    Analyze(analyze::AnalyzeArgs),

    /// Show a stored result
    Result(result::ResultArgs),

    /// List recent leads
    Leads(leads::LeadsArgs),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let config = Config::load(self.config.as_deref())?;

        match self.command {
            Commands::Serve(args) => serve::execute(args, config).await,
            Commands::Score(args) => score::execute(args),
            Commands::Analyze(args) => analyze::execute(args, &config).await,
            Commands::Result(args) => result::execute(args, &config).await,
            Commands::Leads(args) => leads::execute(args, &config).await,
        }
    }
}
