mod claude_api;
mod openai;

pub use claude_api::ClaudeApiProvider;
pub use openai::OpenAiProvider;

use crate::digest::Digest;
use crate::feed::FeedItem;
use crate::Result;

/// Turns a batch of feed items into a categorized digest
///
/// Implementations own everything about the model call; callers only rely
/// on the returned structure.
#[async_trait::async_trait]
pub trait DigestSummarizer: Send + Sync {
    /// Summarize `items` into a digest
    async fn summarize(&self, items: &[FeedItem]) -> Result<Digest>;

    /// Short provider name for logs
    fn name(&self) -> &str;
}
