use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::models::{CategoryDigest, Digest};
use crate::Error;

/// Text layout used for chat messages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStyle {
    /// `<emoji> <title>` followed by `  • <headline> - <link>` lines
    #[default]
    Plain,
    /// Slack mrkdwn: bold title and `Learn More` links
    Slack,
}

impl FromStr for MessageStyle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" => Ok(Self::Plain),
            "slack" | "mrkdwn" => Ok(Self::Slack),
            other => Err(Error::Config(format!("Unknown message style: {}", other))),
        }
    }
}

impl fmt::Display for MessageStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain => f.write_str("plain"),
            Self::Slack => f.write_str("slack"),
        }
    }
}

/// Render one category as a single chat message
pub fn render_category(category: &CategoryDigest, style: MessageStyle) -> String {
    let mut message = match style {
        MessageStyle::Plain => format!("{} {}", category.emoji, category.title),
        MessageStyle::Slack => format!("{} *{}*", category.emoji, category.title),
    };

    for entry in &category.entries {
        let line = match style {
            MessageStyle::Plain => format!("\n  • {} - {}", entry.headline, entry.link),
            MessageStyle::Slack => format!("\n • {} - <{}|Learn More>", entry.headline, entry.link),
        };
        message.push_str(&line);
    }

    message
}

/// Render every category, one message each, in digest order
pub fn render_digest(digest: &Digest, style: MessageStyle) -> Vec<String> {
    digest
        .categories
        .iter()
        .map(|category| render_category(category, style))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digest::CategoryDigestEntry;

    fn category() -> CategoryDigest {
        CategoryDigest {
            emoji: ":rocket:".to_string(),
            title: "Launches".to_string(),
            entries: vec![
                CategoryDigestEntry {
                    headline: "Service A is generally available.".to_string(),
                    link: "https://e.com/a".to_string(),
                },
                CategoryDigestEntry {
                    headline: "Service B adds a region (Preview).".to_string(),
                    link: "https://e.com/b".to_string(),
                },
            ],
        }
    }

    #[test]
    fn test_plain_rendering() {
        assert_eq!(
            render_category(&category(), MessageStyle::Plain),
            ":rocket: Launches\n  • Service A is generally available. - https://e.com/a\n  • Service B adds a region (Preview). - https://e.com/b"
        );
    }

    #[test]
    fn test_slack_rendering() {
        assert_eq!(
            render_category(&category(), MessageStyle::Slack),
            ":rocket: *Launches*\n • Service A is generally available. - <https://e.com/a|Learn More>\n • Service B adds a region (Preview). - <https://e.com/b|Learn More>"
        );
    }

    #[test]
    fn test_one_message_per_category() {
        let mut second = category();
        second.title = "Other".to_string();
        second.entries.clear();
        let digest = Digest {
            categories: vec![category(), second],
        };

        let messages = render_digest(&digest, MessageStyle::Plain);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1], ":rocket: Other");
    }

    #[test]
    fn test_style_from_str() {
        assert_eq!("Slack".parse::<MessageStyle>().unwrap(), MessageStyle::Slack);
        assert_eq!("plain".parse::<MessageStyle>().unwrap(), MessageStyle::Plain);
        assert!("html".parse::<MessageStyle>().is_err());
    }
}
