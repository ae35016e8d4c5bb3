use std::sync::Arc;

use super::providers::{ClaudeApiProvider, DigestSummarizer, OpenAiProvider};
use crate::config::AppConfig;
use crate::digest::Digest;
use crate::feed::FeedItem;
use crate::Result;

/// Digest summarizer that wraps the configured provider
pub struct Summarizer {
    provider: Arc<dyn DigestSummarizer>,
}

impl Summarizer {
    /// Create a new summarizer based on configuration
    pub fn new(config: &AppConfig) -> Result<Self> {
        let ai = &config.ai;
        let model = config.model()?;

        let provider: Arc<dyn DigestSummarizer> = match ai.provider.as_str() {
            "claude_api" => {
                let api_key = ai.api_key.as_ref()
                    .ok_or_else(|| crate::Error::Config("Claude API key not configured (set ANTHROPIC_API_KEY)".to_string()))?;
                let mut provider = ClaudeApiProvider::new(api_key, model, &ai.system_prompt)?
                    .with_sampling(ai.temperature, ai.max_tokens);
                if let Some(base_url) = &ai.base_url {
                    provider = provider.with_base_url(base_url);
                }
                Arc::new(provider)
            }
            "openai" => {
                let api_key = ai.api_key.as_ref()
                    .ok_or_else(|| crate::Error::Config("OpenAI API key not configured (set OPENAI_API_KEY)".to_string()))?;
                Arc::new(
                    OpenAiProvider::new(api_key, model, &ai.system_prompt, ai.base_url.as_deref())
                        .with_sampling(ai.temperature, ai.max_tokens),
                )
            }
            other => {
                return Err(crate::Error::Config(format!("Unknown summarization provider: {}", other)));
            }
        };

        Ok(Self { provider })
    }

    /// Wrap an existing provider
    pub fn from_provider(provider: Arc<dyn DigestSummarizer>) -> Self {
        Self { provider }
    }
}

#[async_trait::async_trait]
impl DigestSummarizer for Summarizer {
    async fn summarize(&self, items: &[FeedItem]) -> Result<Digest> {
        tracing::info!("Summarizing {} items with {}", items.len(), self.provider.name());

        let digest = self.provider.summarize(items).await?;

        tracing::info!(
            "Got digest with {} categories, {} entries",
            digest.categories.len(),
            digest.entry_count()
        );
        Ok(digest)
    }

    fn name(&self) -> &str {
        self.provider.name()
    }
}
