mod prompt;
pub mod providers;
mod summarizer;

pub use prompt::{build_system_prompt, build_user_message, parse_digest_response, DEFAULT_SYSTEM_PROMPT};
pub use providers::DigestSummarizer;
pub use summarizer::Summarizer;
