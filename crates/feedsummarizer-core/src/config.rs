use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::ai::DEFAULT_SYSTEM_PROMPT;
use crate::digest::MessageStyle;
use crate::feed::{DEFAULT_MAX_DESCRIPTION_LENGTH, DEFAULT_WINDOW_DAYS};
use crate::{Error, Result};

/// Value some deployments leave in place of a real webhook URL
const WEBHOOK_PLACEHOLDER: &str = "not-set";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default)]
    pub delivery: DeliveryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level, used when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// RSS feed to summarize
    #[serde(default = "default_feed_url")]
    pub url: String,
    /// Maximum description length (chars) after HTML stripping
    #[serde(default = "default_max_description_length")]
    pub max_description_length: usize,
    /// Look-back window in days
    #[serde(default = "default_cutoff_days")]
    pub cutoff_days: u32,
    /// User-Agent sent with the feed request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: default_feed_url(),
            max_description_length: default_max_description_length(),
            cutoff_days: default_cutoff_days(),
            user_agent: default_user_agent(),
            request_timeout_secs: default_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// Summarization provider: "claude_api" or "openai"
    #[serde(default = "default_ai_provider")]
    pub provider: String,
    /// Model identifier (required)
    #[serde(default)]
    pub model: Option<String>,
    /// API key for the provider
    #[serde(default)]
    pub api_key: Option<String>,
    /// Override for the provider's API endpoint
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Max tokens for the digest response
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Instructions given to the model ahead of the feed items
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: default_ai_provider(),
            model: None,
            api_key: None,
            base_url: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            system_prompt: default_system_prompt(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// Incoming-webhook URL of the chat channel
    #[serde(default)]
    pub webhook_url: Option<String>,
    #[serde(default)]
    pub style: MessageStyle,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_feed_url() -> String {
    "https://aws.amazon.com/about-aws/whats-new/recent/feed/".to_string()
}

fn default_max_description_length() -> usize {
    DEFAULT_MAX_DESCRIPTION_LENGTH
}

fn default_cutoff_days() -> u32 {
    DEFAULT_WINDOW_DAYS
}

fn default_user_agent() -> String {
    format!("feedsummarizer/{}", env!("CARGO_PKG_VERSION"))
}

fn default_timeout() -> u64 {
    30
}

fn default_ai_provider() -> String {
    "claude_api".to_string()
}

fn default_temperature() -> f32 {
    0.5
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.to_string()
}

fn parse_var<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| Error::Config(format!("Invalid value for {}: '{}' ({})", key, value, e)))
}

impl AppConfig {
    /// Load configuration: file (explicit path or the default location if it
    /// exists), then environment overrides, then validation
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                tracing::debug!("Loading config from {}", path.display());
                Self::from_file(path)?
            }
            None => {
                let default_path = Self::config_path();
                if default_path.exists() {
                    tracing::debug!("Loading config from {}", default_path.display());
                    Self::from_file(&default_path)?
                } else {
                    tracing::debug!("No config file at {}, using defaults", default_path.display());
                    Self::default()
                }
            }
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;

        Ok(config)
    }

    /// Read a TOML configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Get the default configuration file path
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("feedsummarizer")
            .join("config.toml")
    }

    /// Override settings from environment-style variables
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("LOG_LEVEL") {
            self.general.log_level = v;
        }

        if let Some(v) = get("FEED_URL") {
            self.feed.url = v;
        }
        if let Some(v) = get("MAXLEN_DESCRIPTION") {
            self.feed.max_description_length = parse_var("MAXLEN_DESCRIPTION", &v)?;
        }
        if let Some(v) = get("CUTOFF_DAYS") {
            self.feed.cutoff_days = parse_var("CUTOFF_DAYS", &v)?;
        }
        if let Some(v) = get("USER_AGENT") {
            self.feed.user_agent = v;
        }
        if let Some(v) = get("REQUEST_TIMEOUT_SECS") {
            self.feed.request_timeout_secs = parse_var("REQUEST_TIMEOUT_SECS", &v)?;
        }

        if let Some(v) = get("SUMMARY_PROVIDER") {
            self.ai.provider = v.trim().to_string();
        }
        if let Some(v) = get("SUMMARY_MODEL") {
            self.ai.model = Some(v);
        }
        if let Some(v) = get("SUMMARY_BASE_URL") {
            self.ai.base_url = Some(v);
        }
        if let Some(v) = get("SUMMARY_TEMPERATURE") {
            self.ai.temperature = parse_var("SUMMARY_TEMPERATURE", &v)?;
        }
        if let Some(v) = get("SUMMARY_MAX_TOKENS") {
            self.ai.max_tokens = parse_var("SUMMARY_MAX_TOKENS", &v)?;
        }
        if let Some(v) = get("SYSTEM_PROMPT") {
            self.ai.system_prompt = v;
        }

        let provider_key = match self.ai.provider.as_str() {
            "claude_api" => "ANTHROPIC_API_KEY",
            "openai" => "OPENAI_API_KEY",
            _ => "SUMMARY_API_KEY",
        };
        if let Some(v) = get("SUMMARY_API_KEY").or_else(|| get(provider_key)) {
            self.ai.api_key = Some(v);
        }

        if let Some(v) = get("SLACK_WEBHOOK_URL") {
            self.delivery.webhook_url = Some(v);
        }
        if let Some(v) = get("MESSAGE_STYLE") {
            self.delivery.style = v.parse()?;
        }

        Ok(())
    }

    /// Check settings every run needs. The webhook is checked separately by
    /// [`AppConfig::webhook_url`] so dry runs can go without one.
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.feed.url)
            .map_err(|e| Error::Config(format!("Invalid feed URL '{}': {}", self.feed.url, e)))?;

        if self.feed.max_description_length == 0 {
            return Err(Error::Config("max_description_length must be greater than 0".to_string()));
        }
        if self.feed.cutoff_days == 0 {
            return Err(Error::Config("cutoff_days must be greater than 0".to_string()));
        }
        if self.feed.user_agent.trim().is_empty() {
            return Err(Error::Config("user_agent must not be empty".to_string()));
        }
        if self.feed.request_timeout_secs == 0 {
            return Err(Error::Config("request_timeout_secs must be greater than 0".to_string()));
        }

        match self.ai.provider.as_str() {
            "claude_api" | "openai" => {}
            other => return Err(Error::Config(format!("Unknown summarization provider: {}", other))),
        }
        if self.ai.model.as_deref().map_or(true, |m| m.trim().is_empty()) {
            return Err(Error::Config(
                "Summarization model not configured (set SUMMARY_MODEL)".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.ai.temperature) {
            return Err(Error::Config(format!(
                "temperature must be between 0 and 2, got {}",
                self.ai.temperature
            )));
        }
        if let Some(base_url) = &self.ai.base_url {
            Url::parse(base_url)
                .map_err(|e| Error::Config(format!("Invalid summarizer base URL '{}': {}", base_url, e)))?;
        }

        if let Some(webhook) = self.configured_webhook() {
            Url::parse(webhook)
                .map_err(|e| Error::Config(format!("Invalid webhook URL: {}", e)))?;
        }

        Ok(())
    }

    /// Model identifier, guaranteed present after validation
    pub fn model(&self) -> Result<&str> {
        self.ai
            .model
            .as_deref()
            .ok_or_else(|| Error::Config("Summarization model not configured".to_string()))
    }

    /// Webhook URL for delivery; missing or placeholder values are an error
    pub fn webhook_url(&self) -> Result<&str> {
        self.configured_webhook().ok_or_else(|| {
            Error::Config("No chat webhook URL is set (set SLACK_WEBHOOK_URL)".to_string())
        })
    }

    fn configured_webhook(&self) -> Option<&str> {
        self.delivery
            .webhook_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty() && *url != WEBHOOK_PLACEHOLDER)
    }

    /// Look-back window for the time filter
    pub fn window(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.feed.cutoff_days))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn from_env(pairs: &[(&str, &str)]) -> Result<AppConfig> {
        let vars = env(pairs);
        let mut config = AppConfig::default();
        config.apply_env(|key| vars.get(key).cloned())?;
        config.validate()?;
        Ok(config)
    }

    #[test]
    fn test_defaults() {
        let config = from_env(&[("SUMMARY_MODEL", "claude-sonnet-4-20250514")]).unwrap();
        assert_eq!(config.feed.max_description_length, 2500);
        assert_eq!(config.feed.cutoff_days, 7);
        assert_eq!(config.window(), chrono::Duration::days(7));
        assert!(config.feed.user_agent.starts_with("feedsummarizer/"));
        assert_eq!(config.ai.provider, "claude_api");
        assert_eq!(config.delivery.style, MessageStyle::Plain);
    }

    #[test]
    fn test_env_overrides() {
        let config = from_env(&[
            ("FEED_URL", "https://example.com/rss"),
            ("MAXLEN_DESCRIPTION", "300"),
            ("CUTOFF_DAYS", "14"),
            ("USER_AGENT", "digest-bot/2.0"),
            ("SUMMARY_PROVIDER", "openai"),
            ("SUMMARY_MODEL", "gpt-4o-mini"),
            ("OPENAI_API_KEY", "sk-test"),
            ("SLACK_WEBHOOK_URL", "https://hooks.slack.com/services/T/B/X"),
            ("MESSAGE_STYLE", "slack"),
        ])
        .unwrap();

        assert_eq!(config.feed.url, "https://example.com/rss");
        assert_eq!(config.feed.max_description_length, 300);
        assert_eq!(config.feed.cutoff_days, 14);
        assert_eq!(config.feed.user_agent, "digest-bot/2.0");
        assert_eq!(config.ai.provider, "openai");
        assert_eq!(config.ai.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.webhook_url().unwrap(), "https://hooks.slack.com/services/T/B/X");
        assert_eq!(config.delivery.style, MessageStyle::Slack);
    }

    #[test]
    fn test_generic_api_key_wins() {
        let config = from_env(&[
            ("SUMMARY_MODEL", "m"),
            ("SUMMARY_API_KEY", "generic"),
            ("ANTHROPIC_API_KEY", "specific"),
        ])
        .unwrap();
        assert_eq!(config.ai.api_key.as_deref(), Some("generic"));
    }

    #[test]
    fn test_missing_model_is_config_error() {
        let err = from_env(&[]).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_invalid_numbers_rejected() {
        assert!(matches!(
            from_env(&[("SUMMARY_MODEL", "m"), ("MAXLEN_DESCRIPTION", "lots")]),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            from_env(&[("SUMMARY_MODEL", "m"), ("CUTOFF_DAYS", "0")]),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            from_env(&[("SUMMARY_MODEL", "m"), ("SUMMARY_TEMPERATURE", "3.5")]),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_unknown_provider_rejected() {
        assert!(matches!(
            from_env(&[("SUMMARY_MODEL", "m"), ("SUMMARY_PROVIDER", "bedrock")]),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_webhook_placeholder_counts_as_missing() {
        let config = from_env(&[("SUMMARY_MODEL", "m"), ("SLACK_WEBHOOK_URL", "not-set")]).unwrap();
        assert!(matches!(config.webhook_url(), Err(Error::Config(_))));

        let config = from_env(&[("SUMMARY_MODEL", "m")]).unwrap();
        assert!(config.webhook_url().is_err());
    }

    #[test]
    fn test_toml_file_sections() {
        let config: AppConfig = toml::from_str(
            r#"
[feed]
url = "https://example.com/feed.xml"
max_description_length = 1000

[ai]
provider = "openai"
model = "gpt-4o-mini"

[delivery]
webhook_url = "https://hooks.example.com/x"
style = "slack"
"#,
        )
        .unwrap();

        assert!(config.validate().is_ok());
        assert_eq!(config.feed.max_description_length, 1000);
        assert_eq!(config.feed.cutoff_days, 7);
        assert_eq!(config.ai.temperature, 0.5);
        assert_eq!(config.delivery.style, MessageStyle::Slack);
    }
}
