//! Brandlift CLI
//!
//! Runs the brand lift assessment server and offers offline scoring and
//! analysis from the terminal.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

mod commands;
mod output;

use commands::{Cli, Commands};

const DEFAULT_FILTER: &str = "brandlift=info,brandlift_web=debug,brandlift_core=info,brandlift_store=info";
const VERBOSE_FILTER: &str = "brandlift=debug,brandlift_web=debug,brandlift_core=debug,brandlift_store=debug,tower_http=debug";

/// Initialize tracing with optional file logging.
///
/// Only `serve` logs to stdout; every other command logs to stderr so its
/// output can be piped. The returned guard must live until exit to flush
/// the log file.
fn init_tracing(log_file: Option<&Path>, verbose: bool, to_stdout: bool) -> Result<Option<WorkerGuard>> {
    let default = if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default.into());

    let console = if to_stdout {
        tracing_subscriber::fmt::layer().boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .boxed()
    };

    let Some(path) = log_file else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(console)
            .init();
        return Ok(None);
    };

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)
        .with_context(|| format!("cannot create log directory {}", dir.display()))?;
    let file_name = path
        .file_name()
        .with_context(|| format!("invalid log file path {}", path.display()))?;

    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));

    // Log to both the console and the file when --log is used
    tracing_subscriber::registry()
        .with(env_filter)
        .with(console)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false),
        )
        .init();
    Ok(Some(guard))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_file = match &cli.command {
        Commands::Serve(args) if args.log => Some(
            args.log_file
                .clone()
                .unwrap_or_else(|| Path::new("logs").join("brandlift.log")),
        ),
        _ => None,
    };

    let is_serve = matches!(&cli.command, Commands::Serve(_));
    let _guard = init_tracing(log_file.as_deref(), cli.verbose, is_serve)?;

    cli.execute().await
}
