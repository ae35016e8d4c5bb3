//! The fetch → parse → filter → summarize → deliver run.
//!
//! Every stage is awaited before the next one starts and nothing is retried
//! here. A failure before summarization means nothing is delivered.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::ai::{DigestSummarizer, Summarizer};
use crate::config::AppConfig;
use crate::delivery::{DigestSink, SlackWebhook};
use crate::feed::{cutoff_before, filter_since, oldest, FeedFetcher, FeedItem, FeedParser, FeedSource};
use crate::Result;

/// Tunables for a pipeline run
#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    pub max_description_length: usize,
    pub window: Duration,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            max_description_length: crate::feed::DEFAULT_MAX_DESCRIPTION_LENGTH,
            window: Duration::days(i64::from(crate::feed::DEFAULT_WINDOW_DAYS)),
        }
    }
}

impl From<&AppConfig> for PipelineOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            max_description_length: config.feed.max_description_length,
            window: config.window(),
        }
    }
}

/// Result of a completed run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// No item was published after the cutoff; nothing was summarized or sent
    NothingNew { cutoff: i64 },
    /// The digest was delivered
    Delivered { items: usize, categories: usize },
}

pub struct DigestPipeline {
    source: Arc<dyn FeedSource>,
    summarizer: Arc<dyn DigestSummarizer>,
    sink: Arc<dyn DigestSink>,
    options: PipelineOptions,
}

impl DigestPipeline {
    pub fn new(
        source: Arc<dyn FeedSource>,
        summarizer: Arc<dyn DigestSummarizer>,
        sink: Arc<dyn DigestSink>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            source,
            summarizer,
            sink,
            options,
        }
    }

    /// Wire the production fetcher, summarizer and webhook from configuration
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let sink = Arc::new(SlackWebhook::new(config)?);
        Self::from_config_with_sink(config, sink)
    }

    /// Same as [`DigestPipeline::from_config`] with a custom delivery sink
    pub fn from_config_with_sink(config: &AppConfig, sink: Arc<dyn DigestSink>) -> Result<Self> {
        let source = Arc::new(FeedFetcher::new(config)?);
        let summarizer = Arc::new(Summarizer::new(config)?);

        Ok(Self::new(source, summarizer, sink, PipelineOptions::from(config)))
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Cutoff for a run starting at `now`
    pub fn cutoff_at(&self, now: DateTime<Utc>) -> i64 {
        cutoff_before(now, self.options.window)
    }

    /// Fetch, parse and keep the items published after `cutoff`
    pub async fn collect(&self, cutoff: i64) -> Result<Vec<FeedItem>> {
        let content = self.source.fetch().await?;

        let parser = FeedParser::new(self.options.max_description_length);
        let items = parser.parse(&content)?;
        let total = items.len();

        let items = filter_since(items, cutoff)?;

        match oldest(&items) {
            Some(item) => tracing::debug!(
                total,
                kept = items.len(),
                cutoff,
                oldest = %item.pub_date,
                max_description_length = self.options.max_description_length,
                "Filtered feed items"
            ),
            None => tracing::debug!(total, kept = 0, cutoff, "Filtered feed items"),
        }

        Ok(items)
    }

    /// Run with the configured look-back window ending now
    pub async fn run(&self) -> Result<RunOutcome> {
        self.run_since(self.cutoff_at(Utc::now())).await
    }

    /// Run for items published strictly after `cutoff` (epoch seconds)
    pub async fn run_since(&self, cutoff: i64) -> Result<RunOutcome> {
        let items = self.collect(cutoff).await?;

        if items.is_empty() {
            tracing::info!("No items published since {}, skipping digest", describe(cutoff));
            return Ok(RunOutcome::NothingNew { cutoff });
        }

        tracing::info!("{} new items since {}", items.len(), describe(cutoff));

        let digest = self.summarizer.summarize(&items).await?;
        self.sink.deliver(&digest).await?;

        Ok(RunOutcome::Delivered {
            items: items.len(),
            categories: digest.categories.len(),
        })
    }
}

fn describe(cutoff: i64) -> String {
    Utc.timestamp_opt(cutoff, 0)
        .single()
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| cutoff.to_string())
}
