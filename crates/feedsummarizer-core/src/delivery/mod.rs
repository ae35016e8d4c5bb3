mod console;
mod webhook;

pub use console::ConsoleSink;
pub use webhook::SlackWebhook;

use crate::digest::Digest;
use crate::Result;

/// Destination for a finished digest
#[async_trait::async_trait]
pub trait DigestSink: Send + Sync {
    /// Deliver the digest, one message per category in order
    async fn deliver(&self, digest: &Digest) -> Result<()>;
}
