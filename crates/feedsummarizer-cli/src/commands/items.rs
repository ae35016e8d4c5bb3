use anyhow::Result;
use chrono::Utc;

use feedsummarizer_core::{
    feed::{cutoff_before, filter_since, FeedFetcher, FeedParser, FeedSource},
    AppConfig,
};

pub async fn run(config: &AppConfig, since: Option<i64>) -> Result<()> {
    let fetcher = FeedFetcher::new(config)?;
    let parser = FeedParser::new(config.feed.max_description_length);

    let cutoff = since.unwrap_or_else(|| cutoff_before(Utc::now(), config.window()));

    let content = fetcher.fetch().await?;
    let items = filter_since(parser.parse(&content)?, cutoff)?;

    for item in &items {
        println!("{}", serde_json::to_string(item)?);
    }

    tracing::info!("{} items published after {}", items.len(), cutoff);

    Ok(())
}
