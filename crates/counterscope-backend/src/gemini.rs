//! Gemini generateContent backend
//!
//! Issues one non-streaming generation per exchange:
//! `POST {base_url}/models/{model}:generateContent`. Gemini has no
//! system role, so a leading system turn is folded into the first user
//! part; assistant turns map to role `model`.
//!
//! Safety filters are disabled via `BLOCK_NONE` — the whole point is
//! classifying hateful text — but a candidate can still come back
//! blocked, in which case the reply degrades to a neutral sentinel
//! instead of erroring.

use crate::client::{transport_error, ChatBackend};
use async_trait::async_trait;
use counterscope_core::{BackendConfig, ChatRole, ChatTurn, Error, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Reply substituted when Gemini blocks or truncates a candidate
const BLOCKED_SENTINEL: &str = "neutral speech, because the candidate was blocked";

const HARM_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

/// Gemini generative-language backend
pub struct GeminiBackend {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl GeminiBackend {
    /// Create a backend from the resolved configuration
    pub fn new(config: &BackendConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(Error::config("gemini api key is empty"));
        }
        Ok(Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }

    /// Map conversation turns to Gemini contents, folding a leading
    /// system turn into the first user part
    fn wire_contents(turns: &[ChatTurn]) -> Vec<Content> {
        let mut contents: Vec<Content> = Vec::new();
        let mut pending_system: Option<&str> = None;

        for turn in turns {
            match turn.role {
                ChatRole::System => pending_system = Some(&turn.content),
                ChatRole::User => {
                    let text = match pending_system.take() {
                        Some(system) => format!("{system}\n\n{}", turn.content),
                        None => turn.content.clone(),
                    };
                    contents.push(Content::new("user", text));
                }
                ChatRole::Assistant => {
                    contents.push(Content::new("model", turn.content.clone()));
                }
            }
        }

        // system turn with no following user turn still has to be sent
        if let Some(system) = pending_system {
            contents.push(Content::new("user", system.to_string()));
        }

        contents
    }

    /// Extract the candidate text, degrading blocked candidates to the
    /// neutral sentinel
    fn extract_text(response: GenerateContentResponse) -> String {
        let Some(candidate) = response.candidates.into_iter().next() else {
            warn!("gemini returned no candidates, degrading to neutral");
            return BLOCKED_SENTINEL.to_string();
        };

        let text = candidate
            .content
            .and_then(|content| content.parts.into_iter().next())
            .map(|part| part.text);

        match text {
            Some(text) if !text.is_empty() => text,
            _ => {
                warn!(
                    finish_reason = candidate.finish_reason.as_deref().unwrap_or("unknown"),
                    "gemini candidate had no text, degrading to neutral"
                );
                BLOCKED_SENTINEL.to_string()
            }
        }
    }
}

#[async_trait]
impl ChatBackend for GeminiBackend {
    async fn complete(&self, turns: &[ChatTurn]) -> Result<String> {
        let request = GenerateContentRequest {
            contents: Self::wire_contents(turns),
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: 2560,
                top_p: 0.8,
                top_k: 1,
                candidate_count: 1,
            },
            safety_settings: HARM_CATEGORIES
                .iter()
                .map(|category| SafetySetting {
                    category,
                    threshold: "BLOCK_NONE",
                })
                .collect(),
        };

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let response = self
            .http
            .post(url)
            .json(&request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::backend(format!("gemini returned {status}: {body}")));
        }

        let parsed: GenerateContentResponse =
            response.json().await.map_err(transport_error)?;

        Ok(Self::extract_text(parsed))
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
    #[serde(rename = "safetySettings")]
    safety_settings: Vec<SafetySetting>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    role: String,
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn new(role: &str, text: String) -> Self {
        Self {
            role: role.to_string(),
            parts: vec![Part { text }],
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
    #[serde(rename = "topP")]
    top_p: f32,
    #[serde(rename = "topK")]
    top_k: u32,
    #[serde(rename = "candidateCount")]
    candidate_count: u32,
}

#[derive(Debug, Serialize)]
struct SafetySetting {
    category: &'static str,
    threshold: &'static str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}
