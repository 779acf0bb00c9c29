//! Web server command.

use anyhow::Result;
use brandlift_core::Config;
use brandlift_web::AppState;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

#[derive(Args)]
pub struct ServeArgs {
    /// Port to listen on (defaults to the configured port, 3040)
    #[arg(long)]
    pub port: Option<u16>,

    /// Host to bind to (defaults to the configured host, 127.0.0.1)
    #[arg(long)]
    pub host: Option<String>,

    /// Also write logs to a file
    #[arg(long)]
    pub log: bool,

    /// Log file path used with --log (default: logs/brandlift.log)
    #[arg(long, requires = "log")]
    pub log_file: Option<PathBuf>,
}

fn status(enabled: bool) -> colored::ColoredString {
    if enabled {
        "on".green()
    } else {
        "off".dimmed()
    }
}

pub async fn execute(args: ServeArgs, mut config: Config) -> Result<()> {
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    let host = config.server.host.clone();
    let port = config.server.port;
    let integrations = config.integrations();

    let store = brandlift_store::open_store(config.store.redis_url.as_deref()).await?;
    let backend = store.backend();
    let state = AppState::from_config(config, store);

    println!();
    println!("  {} {}", "Brandlift".cyan().bold(), "Web Server".bold());
    println!();
    println!("  {}        http://{}:{}/api", "API".green(), host, port);
    println!("  {}     http://{}:{}/health", "Health".green(), host, port);
    println!("  {}     {}", "Shares".green(), state.pipeline.share_url("{id}"));
    println!();
    println!("  {}      {}", "Store".bold(), backend);
    println!("  {}        {}", "LLM".bold(), status(integrations.llm));
    println!(
        "  {}     openai {} / replicate {}",
        "Images".bold(),
        status(integrations.openai_images),
        status(integrations.replicate_images)
    );
    println!("  {}      {}", "Email".bold(), status(integrations.email));
    println!("  {}   {}", "Webhooks".bold(), integrations.webhooks);
    println!();
    println!("  {}", "Ctrl+C to stop".dimmed());
    println!();

    brandlift_web::run_server(state, &host, port).await?;

    Ok(())
}
