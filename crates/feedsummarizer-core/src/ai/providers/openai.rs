use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs, ResponseFormat,
    },
    Client,
};

use super::DigestSummarizer;
use crate::ai::prompt::{build_system_prompt, build_user_message, parse_digest_response};
use crate::digest::Digest;
use crate::feed::FeedItem;
use crate::{Error, Result};

/// OpenAI chat completions provider, using JSON response mode
pub struct OpenAiProvider {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: f32,
    max_tokens: u32,
    system_prompt: String,
}

impl OpenAiProvider {
    pub fn new(api_key: &str, model: &str, instructions: &str, base_url: Option<&str>) -> Self {
        let mut config = OpenAIConfig::new().with_api_key(api_key);
        if let Some(base) = base_url {
            config = config.with_api_base(base);
        }

        Self {
            client: Client::with_config(config),
            model: model.to_string(),
            temperature: 0.5,
            max_tokens: 4096,
            system_prompt: build_system_prompt(instructions),
        }
    }

    pub fn with_sampling(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    fn messages(&self, prompt: &str) -> Result<Vec<ChatCompletionRequestMessage>> {
        let system = ChatCompletionRequestSystemMessageArgs::default()
            .content(self.system_prompt.as_str())
            .build()
            .map_err(|e| Error::Summarizer(e.to_string()))?;
        let user = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(|e| Error::Summarizer(e.to_string()))?;

        Ok(vec![system.into(), user.into()])
    }

    async fn chat(&self, prompt: &str) -> Result<String> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(self.messages(prompt)?)
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .response_format(ResponseFormat::JsonObject)
            .build()
            .map_err(|e| Error::Summarizer(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| Error::Summarizer(format!("OpenAI request failed: {}", e)))?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| Error::Summarizer("OpenAI response had no content".to_string()))
    }
}

#[async_trait::async_trait]
impl DigestSummarizer for OpenAiProvider {
    async fn summarize(&self, items: &[FeedItem]) -> Result<Digest> {
        if items.is_empty() {
            return Ok(Digest::default());
        }

        let prompt = build_user_message(items)?;
        tracing::debug!(model = %self.model, items = items.len(), "Invoking OpenAI");

        let reply = self.chat(&prompt).await?;
        parse_digest_response(&reply)
    }

    fn name(&self) -> &str {
        "openai"
    }
}
