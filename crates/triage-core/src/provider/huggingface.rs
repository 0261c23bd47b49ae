//! Hugging Face inference backend.
//!
//! Sends a single templated prompt to a text-generation model and reads
//! `generated_text` back. Instruction models rarely return bare JSON, so the
//! reply goes through the tolerant payload parser.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::payload::parse_decision;
use super::prompt::{
    classification_system_prompt, compose_user_message, instruct_template, COMPOSE_SYSTEM_PROMPT,
};
use super::{post_json_with_retry, RemoteClassifier};
use crate::error::{ClassifyError, Result};
use crate::inquiry::{AnalysisResult, Decision, Inquiry};

const DEFAULT_BASE_URL: &str = "https://api-inference.huggingface.co";

const CLASSIFY_TEMPERATURE: f32 = 0.3;
const COMPOSE_TEMPERATURE: f32 = 0.7;
const MAX_NEW_TOKENS: u32 = 512;
const TOP_P: f32 = 0.95;

pub struct HuggingFaceClassifier {
    client: Client,
    api_key: String,
    url: String,
}

impl HuggingFaceClassifier {
    pub fn new(api_key: &str, api_base: Option<&str>, model: &str, client: Client) -> Self {
        let base_url = api_base.unwrap_or(DEFAULT_BASE_URL).trim_end_matches('/');
        let url = format!("{}/models/{}", base_url, model);

        debug!(url = %url, "Initialized Hugging Face classifier");

        Self {
            client,
            api_key: api_key.to_string(),
            url,
        }
    }

    async fn generate(&self, system: &str, user: &str, temperature: f32) -> Result<String> {
        let prompt = instruct_template(system, user);
        let request = GenerationRequest {
            inputs: &prompt,
            parameters: GenerationParameters {
                max_new_tokens: MAX_NEW_TOKENS,
                temperature,
                top_p: TOP_P,
                return_full_text: false,
            },
        };

        let body =
            post_json_with_retry(&self.client, "huggingface", &self.url, &self.api_key, &request).await?;
        extract_generated_text(&body)
    }
}

// ── Inference API request/response types ────────────────────────────

#[derive(Serialize)]
struct GenerationRequest<'a> {
    inputs: &'a str,
    parameters: GenerationParameters,
}

#[derive(Serialize)]
struct GenerationParameters {
    max_new_tokens: u32,
    temperature: f32,
    top_p: f32,
    return_full_text: bool,
}

#[derive(Deserialize)]
struct Generation {
    #[serde(default)]
    generated_text: String,
}

/// The inference API answers with a list; some deployments return one object.
#[derive(Deserialize)]
#[serde(untagged)]
enum GenerationResponse {
    Many(Vec<Generation>),
    One(Generation),
}

fn extract_generated_text(body: &str) -> Result<String> {
    let response: GenerationResponse = serde_json::from_str(body)
        .map_err(|e| ClassifyError::Parse(format!("invalid generation response: {e}")))?;
    let text = match response {
        GenerationResponse::Many(list) => list.into_iter().next().map(|g| g.generated_text),
        GenerationResponse::One(g) => Some(g.generated_text),
    };
    text.map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ClassifyError::Parse("empty generated_text".into()))
}

// ── RemoteClassifier implementation ─────────────────────────────────

#[async_trait]
impl RemoteClassifier for HuggingFaceClassifier {
    fn name(&self) -> &str {
        "huggingface"
    }

    async fn classify(&self, inquiry: &Inquiry) -> Result<Decision> {
        let text = self
            .generate(&classification_system_prompt(), &inquiry.text, CLASSIFY_TEMPERATURE)
            .await?;
        parse_decision(&text)
    }

    async fn compose_response(&self, result: &AnalysisResult) -> Result<String> {
        self.generate(COMPOSE_SYSTEM_PROMPT, &compose_user_message(result), COMPOSE_TEMPERATURE)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inquiry::Category;

    #[test]
    fn test_model_url() {
        let p = HuggingFaceClassifier::new(
            "hf_test",
            None,
            "meta-llama/Meta-Llama-3-8B-Instruct",
            Client::new(),
        );
        assert_eq!(
            p.url,
            "https://api-inference.huggingface.co/models/meta-llama/Meta-Llama-3-8B-Instruct"
        );

        let p = HuggingFaceClassifier::new("hf_test", Some("http://tgi.local/"), "m", Client::new());
        assert_eq!(p.url, "http://tgi.local/models/m");
    }

    #[test]
    fn test_request_shape() {
        let request = GenerationRequest {
            inputs: "prompt",
            parameters: GenerationParameters {
                max_new_tokens: MAX_NEW_TOKENS,
                temperature: CLASSIFY_TEMPERATURE,
                top_p: TOP_P,
                return_full_text: false,
            },
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["inputs"], "prompt");
        assert_eq!(value["parameters"]["max_new_tokens"], 512);
        assert_eq!(value["parameters"]["return_full_text"], false);
    }

    #[test]
    fn test_generated_text_with_prose() {
        let body = r#"[{"generated_text": " Hier die Antwort: {\"recommendedProductCategory\": \"general-ai\", \"confidence\": 0.66, \"analysis\": \"Mehrere Kanäle.\"} Danke."}]"#;
        let text = extract_generated_text(body).unwrap();
        let d = parse_decision(&text).unwrap();
        assert_eq!(d.category, Category::GeneralAi);
        assert_eq!(d.confidence, 0.66);
    }

    #[test]
    fn test_single_object_response() {
        let body = r#"{"generated_text": "Guten Tag!"}"#;
        assert_eq!(extract_generated_text(body).unwrap(), "Guten Tag!");
    }

    #[test]
    fn test_empty_generation_is_error() {
        assert!(matches!(extract_generated_text("[]"), Err(ClassifyError::Parse(_))));
        assert!(matches!(
            extract_generated_text(r#"[{"generated_text": "  "}]"#),
            Err(ClassifyError::Parse(_))
        ));
    }
}
