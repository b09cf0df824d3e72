//! OpenAI chat-completions backend
//!
//! Issues one non-streaming chat completion per exchange:
//! `POST {base_url}/chat/completions` with the full turn list and
//! returns `choices[0].message.content`.

use crate::client::{transport_error, ChatBackend};
use async_trait::async_trait;
use counterscope_core::{BackendConfig, ChatRole, ChatTurn, Error, Result};
use serde::{Deserialize, Serialize};

/// OpenAI-compatible chat backend
pub struct OpenAiBackend {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl OpenAiBackend {
    /// Create a backend from the resolved configuration
    pub fn new(config: &BackendConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(Error::config("openai api key is empty"));
        }
        Ok(Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }

    fn wire_messages(turns: &[ChatTurn]) -> Vec<WireMessage<'_>> {
        turns
            .iter()
            .map(|turn| WireMessage {
                role: match turn.role {
                    ChatRole::System => "system",
                    ChatRole::User => "user",
                    ChatRole::Assistant => "assistant",
                },
                content: &turn.content,
            })
            .collect()
    }
}

#[async_trait]
impl ChatBackend for OpenAiBackend {
    async fn complete(&self, turns: &[ChatTurn]) -> Result<String> {
        let request = ChatCompletionRequest {
            model: &self.model,
            temperature: self.temperature,
            messages: Self::wire_messages(turns),
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::backend(format!("openai returned {status}: {body}")));
        }

        let completion: ChatCompletionResponse =
            response.json().await.map_err(transport_error)?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| Error::backend("openai response had no choices"))
    }

    fn name(&self) -> &str {
        "openai"
    }
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<WireMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}
