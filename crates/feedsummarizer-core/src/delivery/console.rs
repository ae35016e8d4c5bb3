use super::DigestSink;
use crate::digest::{render_digest, Digest, MessageStyle};
use crate::Result;

/// Prints rendered messages to stdout instead of posting them
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSink {
    style: MessageStyle,
}

impl ConsoleSink {
    pub fn new(style: MessageStyle) -> Self {
        Self { style }
    }
}

#[async_trait::async_trait]
impl DigestSink for ConsoleSink {
    async fn deliver(&self, digest: &Digest) -> Result<()> {
        for message in render_digest(digest, self.style) {
            println!("{}\n", message);
        }
        Ok(())
    }
}
