use std::sync::Arc;

use anyhow::Result;

use feedsummarizer_core::{
    delivery::ConsoleSink,
    AppConfig, DigestPipeline, RunOutcome,
};

pub async fn run(config: &AppConfig, since: Option<i64>, dry_run: bool) -> Result<()> {
    let pipeline = if dry_run {
        DigestPipeline::from_config_with_sink(config, Arc::new(ConsoleSink::new(config.delivery.style)))?
    } else {
        DigestPipeline::from_config(config)?
    };

    let outcome = match since {
        Some(cutoff) => pipeline.run_since(cutoff).await?,
        None => pipeline.run().await?,
    };

    match outcome {
        RunOutcome::NothingNew { .. } => {
            println!("Nothing new in the feed since the cutoff; no digest sent.");
        }
        RunOutcome::Delivered { items, categories } => {
            let verb = if dry_run { "Rendered" } else { "Delivered" };
            println!("{} digest: {} items in {} categories.", verb, items, categories);
        }
    }

    Ok(())
}
