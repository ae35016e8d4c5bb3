use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use url::Url;

use super::DigestSink;
use crate::config::AppConfig;
use crate::digest::{render_category, Digest, MessageStyle};
use crate::{Error, Result};

const WEBHOOK_TIMEOUT_SECS: u64 = 30;

#[derive(Serialize)]
struct WebhookMessage<'a> {
    text: &'a str,
}

/// Slack-compatible incoming webhook
///
/// Posts one message per category. Delivery stops at the first failure;
/// messages already posted stay posted.
pub struct SlackWebhook {
    client: Client,
    url: Url,
    style: MessageStyle,
}

impl SlackWebhook {
    /// Create a webhook sink from configuration
    pub fn new(config: &AppConfig) -> Result<Self> {
        Self::with_url(config.webhook_url()?, config.delivery.style)
    }

    pub fn with_url(url: &str, style: MessageStyle) -> Result<Self> {
        let url = Url::parse(url)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(WEBHOOK_TIMEOUT_SECS))
            .build()?;

        Ok(Self { client, url, style })
    }

    async fn send(&self, text: &str) -> Result<()> {
        let response = self
            .client
            .post(self.url.clone())
            .json(&WebhookMessage { text })
            .send()
            .await
            .map_err(|e| Error::Delivery(format!("Webhook request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = failure_detail(response.text().await);
            return Err(Error::Delivery(format!("Webhook returned {}: {}", status, detail)));
        }

        Ok(())
    }
}

/// Body of a rejected post, or why it could not be read
fn failure_detail<E: std::fmt::Display>(body: std::result::Result<String, E>) -> String {
    match body {
        Ok(body) => body.trim().to_string(),
        Err(e) => format!("<failed to read response body: {}>", e),
    }
}

#[async_trait::async_trait]
impl DigestSink for SlackWebhook {
    async fn deliver(&self, digest: &Digest) -> Result<()> {
        if digest.is_empty() {
            tracing::warn!("Digest has no categories, nothing to post");
            return Ok(());
        }

        let total = digest.categories.len();

        for (sent, category) in digest.categories.iter().enumerate() {
            let message = render_category(category, self.style);

            self.send(&message).await.map_err(|e| match e {
                Error::Delivery(msg) => Error::Delivery(format!(
                    "Category '{}' failed after {} of {} categories were posted: {}",
                    category.title, sent, total, msg
                )),
                other => other,
            })?;

            tracing::info!("Posted category '{}' ({}/{})", category.title, sent + 1, total);
        }

        Ok(())
    }
}
