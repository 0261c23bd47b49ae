//! OpenAI chat-completions backend.
//!
//! Works against any server exposing an OpenAI-compatible
//! `/chat/completions` endpoint; `apiBase` in the config points it elsewhere.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::payload::parse_decision;
use super::prompt::{classification_system_prompt, compose_user_message, COMPOSE_SYSTEM_PROMPT};
use super::{post_json_with_retry, RemoteClassifier};
use crate::error::{ClassifyError, Result};
use crate::inquiry::{AnalysisResult, Decision, Inquiry};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

const CLASSIFY_TEMPERATURE: f32 = 0.3;
const COMPOSE_TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 500;

pub struct OpenAiClassifier {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiClassifier {
    /// Create a new backend.
    ///
    /// # Arguments
    /// * `api_key` - API key for authentication
    /// * `api_base` - Custom base URL (defaults to the OpenAI API)
    /// * `model` - Model identifier, e.g. "gpt-4o-mini"
    pub fn new(api_key: &str, api_base: Option<&str>, model: &str, client: Client) -> Self {
        let base_url = api_base
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
            .to_string();

        debug!(base_url = %base_url, model, "Initialized OpenAI classifier");

        Self {
            client,
            api_key: api_key.to_string(),
            base_url,
            model: model.to_string(),
        }
    }

    async fn complete(&self, system: &str, user: &str, temperature: f32) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = CompletionRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature,
            max_tokens: MAX_TOKENS,
        };

        let body = post_json_with_retry(&self.client, "openai", &url, &self.api_key, &request).await?;
        extract_content(&body)
    }
}

// ── OpenAI API request/response types ───────────────────────────────

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: MessageResponse,
}

#[derive(Deserialize)]
struct MessageResponse {
    content: Option<String>,
}

/// The first choice's message content.
fn extract_content(body: &str) -> Result<String> {
    let completion: CompletionResponse = serde_json::from_str(body)
        .map_err(|e| ClassifyError::Parse(format!("invalid completion response: {e}")))?;
    completion
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ClassifyError::Parse("completion has no content".into()))
}

// ── RemoteClassifier implementation ─────────────────────────────────

#[async_trait]
impl RemoteClassifier for OpenAiClassifier {
    fn name(&self) -> &str {
        "openai"
    }

    async fn classify(&self, inquiry: &Inquiry) -> Result<Decision> {
        let content = self
            .complete(&classification_system_prompt(), &inquiry.text, CLASSIFY_TEMPERATURE)
            .await?;
        parse_decision(&content)
    }

    async fn compose_response(&self, result: &AnalysisResult) -> Result<String> {
        self.complete(COMPOSE_SYSTEM_PROMPT, &compose_user_message(result), COMPOSE_TEMPERATURE)
            .await
    }
}
