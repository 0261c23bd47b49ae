//! Remote classifier trait and backend selection.
//!
//! Defines the `RemoteClassifier` trait every LLM backend implements. Two
//! backends exist: [`openai::OpenAiClassifier`] (chat completions) and
//! [`huggingface::HuggingFaceClassifier`] (text-generation inference). The
//! configured active provider decides which one is bound.

pub mod huggingface;
pub mod openai;
pub mod payload;
pub mod prompt;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::{ProviderKind, ProvidersConfig};
use crate::error::{ClassifyError, Result};
use crate::inquiry::{AnalysisResult, Decision, Inquiry};
use huggingface::HuggingFaceClassifier;
use openai::OpenAiClassifier;

/// A backend that classifies inquiries with an LLM.
#[async_trait]
pub trait RemoteClassifier: Send + Sync {
    /// Provider identifier used in logs (e.g., "openai").
    fn name(&self) -> &str;

    /// Ask the backend for a decision on one inquiry.
    async fn classify(&self, inquiry: &Inquiry) -> Result<Decision>;

    /// Write a customer-facing reply for an already classified inquiry.
    async fn compose_response(&self, result: &AnalysisResult) -> Result<String>;
}

/// Build the backend for the active provider.
///
/// Fails with `RemoteUnavailable` when the active provider has no real key.
pub fn from_config(
    providers: &ProvidersConfig,
    client: Client,
) -> Result<Arc<dyn RemoteClassifier>> {
    let (kind, entry) = providers.find_active().ok_or_else(|| {
        let kind = providers.active.unwrap_or(ProviderKind::OpenAi);
        ClassifyError::RemoteUnavailable(format!("no API key configured for {kind}"))
    })?;

    let model = entry.model.as_deref().unwrap_or(kind.default_model());
    let api_base = entry.api_base.as_deref();

    let classifier: Arc<dyn RemoteClassifier> = match kind {
        ProviderKind::OpenAi => Arc::new(OpenAiClassifier::new(&entry.api_key, api_base, model, client)),
        ProviderKind::HuggingFace => {
            Arc::new(HuggingFaceClassifier::new(&entry.api_key, api_base, model, client))
        }
    };
    Ok(classifier)
}

/// Maximum number of attempts for transient errors.
const MAX_RETRIES: u32 = 3;

/// Base delay for exponential backoff (milliseconds).
const BASE_DELAY_MS: u64 = 500;

/// POST `body` as JSON with bearer auth and return the successful body text.
///
/// Retries transport failures (sending or reading the body) and transient
/// statuses (429, 5xx) with exponential backoff; any other non-success
/// status fails immediately. After the last attempt the last error is
/// returned as is.
pub(crate) async fn post_json_with_retry<B: Serialize + ?Sized>(
    client: &Client,
    provider: &'static str,
    url: &str,
    api_key: &str,
    body: &B,
) -> Result<String> {
    let mut attempt = 0;
    loop {
        let err = match post_once(client, provider, url, api_key, body).await {
            Ok(text) => return Ok(text),
            Err(e) => e,
        };
        attempt += 1;

        if !err.is_retryable() {
            return Err(err);
        }
        if attempt >= MAX_RETRIES {
            warn!(provider, attempts = attempt, error = %err, "Remote API retries exhausted");
            return Err(err);
        }

        let delay = BASE_DELAY_MS * 2u64.pow(attempt - 1);
        warn!(provider, attempt, delay_ms = delay, error = %err, "Transient remote API error, retrying");
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }
}

/// One request: transport errors map to `Transport`, non-success to `Status`.
async fn post_once<B: Serialize + ?Sized>(
    client: &Client,
    provider: &'static str,
    url: &str,
    api_key: &str,
    body: &B,
) -> Result<String> {
    let response = client.post(url).bearer_auth(api_key).json(body).send().await?;

    let status = response.status();
    let text = response.text().await?;

    if status.is_success() {
        debug!(provider, status = status.as_u16(), bytes = text.len(), "Remote API responded");
        return Ok(text);
    }

    Err(ClassifyError::Status {
        provider,
        status: status.as_u16(),
        message: error_message(&text)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string()),
    })
}

/// Pull a human-readable message out of an error body.
///
/// Understands `{"error": {"message": ..}}` and `{"error": ".."}`.
fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let error = value.get("error")?;
    error
        .as_str()
        .or_else(|| error.get("message").and_then(|m| m.as_str()))
        .map(str::to_string)
}
