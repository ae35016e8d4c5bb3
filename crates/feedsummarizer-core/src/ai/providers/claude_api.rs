use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::DigestSummarizer;
use crate::ai::prompt::{build_system_prompt, build_user_message, parse_digest_response};
use crate::digest::Digest;
use crate::feed::FeedItem;
use crate::{Error, Result};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const AI_REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Serialize)]
struct ClaudeRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<ClaudeMessage<'a>>,
}

#[derive(Serialize)]
struct ClaudeMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ClaudeResponse {
    content: Option<Vec<ClaudeContent>>,
    error: Option<ClaudeError>,
}

#[derive(Deserialize)]
struct ClaudeContent {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct ClaudeError {
    message: String,
}

/// Claude/Anthropic Messages API provider
pub struct ClaudeApiProvider {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    temperature: f32,
    max_tokens: u32,
    system_prompt: String,
}

impl ClaudeApiProvider {
    pub fn new(api_key: &str, model: &str, instructions: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(AI_REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            temperature: 0.5,
            max_tokens: 4096,
            system_prompt: build_system_prompt(instructions),
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_sampling(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    async fn chat(&self, prompt: &str) -> Result<String> {
        let request = ClaudeRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            system: &self.system_prompt,
            messages: vec![ClaudeMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Summarizer(format!("Claude API request failed: {}", e)))?;

        let status = response.status();
        tracing::debug!(status = %status, "Got Claude response");

        let claude_response: ClaudeResponse = response
            .json()
            .await
            .map_err(|e| Error::Summarizer(format!("Failed to parse Claude response ({}): {}", status, e)))?;

        if let Some(error) = claude_response.error {
            return Err(Error::Summarizer(format!("Claude API error: {}", error.message)));
        }

        if !status.is_success() {
            return Err(Error::Summarizer(format!("Claude API returned {}", status)));
        }

        let text = claude_response
            .content
            .unwrap_or_default()
            .into_iter()
            .map(|c| c.text)
            .collect::<String>();

        Ok(text)
    }
}

#[async_trait::async_trait]
impl DigestSummarizer for ClaudeApiProvider {
    async fn summarize(&self, items: &[FeedItem]) -> Result<Digest> {
        if items.is_empty() {
            return Ok(Digest::default());
        }

        let prompt = build_user_message(items)?;
        tracing::debug!(model = %self.model, items = items.len(), "Invoking Claude");

        let reply = self.chat(&prompt).await?;
        parse_digest_response(&reply)
    }

    fn name(&self) -> &str {
        "claude_api"
    }
}
