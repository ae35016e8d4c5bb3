use crate::digest::Digest;
use crate::feed::FeedItem;
use crate::{Error, Result};

/// Default instructions for the weekly digest
pub const DEFAULT_SYSTEM_PROMPT: &str = "\
Using the following entries from an RSS feed, create a once-per-week message \
to post to a team chat channel to keep people up to date with what they should know.

Group related entries into categories. Ensure that anything which is in preview \
is clearly marked as such.

Categories should have a relevant Slack emoji code, and individual entries should \
link to the article's page.";

/// Output contract appended to every system prompt
const OUTPUT_CONTRACT: &str = r#"Respond with a single JSON object and nothing else, in exactly this shape:
{"categories": [{"emoji": ":emoji_code:", "title": "Category title", "entries": [{"headline": "Headline of up to two sentences.", "link": "https://link-to-the-source"}]}]}"#;

/// Full system prompt: configured instructions plus the JSON output contract
pub fn build_system_prompt(instructions: &str) -> String {
    format!("{}\n\n{}", instructions.trim_end(), OUTPUT_CONTRACT)
}

/// User message: one JSON record per feed item
pub fn build_user_message(items: &[FeedItem]) -> Result<String> {
    let lines = items
        .iter()
        .map(serde_json::to_string)
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(lines.join("\n"))
}

/// Parse a model reply into a validated [`Digest`].
///
/// Models sometimes wrap JSON in code fences or add a sentence around it, so
/// the outermost `{ ... }` span is used.
pub fn parse_digest_response(text: &str) -> Result<Digest> {
    let json = match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => {
            return Err(Error::Summarizer(
                "Model response contained no JSON object".to_string(),
            ))
        }
    };

    let digest: Digest = serde_json::from_str(json).map_err(|e| {
        Error::Summarizer(format!("Model response did not match the digest structure: {}", e))
    })?;
    digest.validate()?;

    Ok(digest)
}
