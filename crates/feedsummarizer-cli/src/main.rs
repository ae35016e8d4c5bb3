use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter};

use feedsummarizer_core::AppConfig;

mod commands;

const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Parser)]
#[command(name = "feedsummarizer")]
#[command(author, version, about = "Summarize the week's RSS entries into a chat digest")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to a TOML config file (defaults to ~/.config/feedsummarizer/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, summarize and deliver the digest
    Run {
        /// Cutoff as RFC 3339 or epoch seconds (default: now minus the configured window)
        #[arg(long, value_parser = commands::parse_since)]
        since: Option<i64>,
        /// Print the digest instead of posting it to the webhook
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the feed items inside the window as JSON lines
    Items {
        /// Cutoff as RFC 3339 or epoch seconds (default: now minus the configured window)
        #[arg(long, value_parser = commands::parse_since)]
        since: Option<i64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging before config so loading is visible
    let rust_log = std::env::var("RUST_LOG").ok().filter(|v| !v.trim().is_empty());
    let (filter, filter_handle) = reload::Layer::new(EnvFilter::new(log_directive(
        rust_log.as_deref(),
        DEFAULT_LOG_LEVEL,
    )));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Load configuration
    let config = AppConfig::load(cli.config.as_deref())?;

    if rust_log.is_none() {
        filter_handle.reload(EnvFilter::new(log_directive(None, &config.general.log_level)))?;
    }

    match cli.command {
        Some(Commands::Run { since, dry_run }) => commands::run::run(&config, since, dry_run).await,
        None => commands::run::run(&config, None, false).await,
        Some(Commands::Items { since }) => commands::items::run(&config, since).await,
    }
}

/// `RUST_LOG` wins over the configured level
fn log_directive(rust_log: Option<&str>, configured: &str) -> String {
    rust_log
        .map(str::trim)
        .filter(|directive| !directive.is_empty())
        .unwrap_or(configured)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_directive_prefers_rust_log() {
        assert_eq!(log_directive(Some("feedsummarizer_core=debug"), "warn"), "feedsummarizer_core=debug");
        assert_eq!(log_directive(None, "warn"), "warn");
        assert_eq!(log_directive(Some("  "), DEFAULT_LOG_LEVEL), "info");
    }
}
