//! Parsing of LLM replies into a [`Decision`].
//!
//! Models wrap their JSON in prose or markdown fences, so the parser scans
//! for the first well-formed JSON object instead of parsing the whole text.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{ClassifyError, Result};
use crate::inquiry::{Category, Decision};

const DEFAULT_REMOTE_CONFIDENCE: f64 = 0.5;
const DEFAULT_REMOTE_ANALYSIS: &str = "Keine Analyse verfügbar.";

/// The fields a backend is asked to return. All optional on the wire.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemotePayload {
    recommended_product_category: Option<String>,
    confidence: Option<f64>,
    analysis: Option<String>,
    follow_up_question: Option<String>,
}

/// Key that marks a JSON object as a classification payload.
const CATEGORY_KEY: &str = "recommendedProductCategory";

/// Find the first JSON object embedded in `text`.
pub fn extract_first_object(text: &str) -> Option<serde_json::Map<String, Value>> {
    objects(text).next()
}

/// Find the first embedded JSON object that carries a category.
///
/// Example objects in prose and wrapper objects are skipped; scanning
/// continues into nested objects.
pub fn extract_payload_object(text: &str) -> Option<serde_json::Map<String, Value>> {
    objects(text).find(|map| map.contains_key(CATEGORY_KEY))
}

/// Every well-formed JSON object starting at some `{` in `text`, in order.
fn objects(text: &str) -> impl Iterator<Item = serde_json::Map<String, Value>> + '_ {
    text.char_indices()
        .filter(|&(_, c)| c == '{')
        .filter_map(move |(i, _)| {
            let mut stream = serde_json::Deserializer::from_str(&text[i..]).into_iter::<Value>();
            match stream.next() {
                Some(Ok(Value::Object(map))) => Some(map),
                _ => None,
            }
        })
}

/// Parse a backend reply into a decision.
///
/// The payload is the first JSON object with a `recommendedProductCategory`
/// key. Other missing fields fall back to defaults (0.5, a stock analysis);
/// confidence is clamped into `[0, 1]`. A reply without such an object, or
/// with an unknown category name, is a parse error.
pub fn parse_decision(text: &str) -> Result<Decision> {
    let object = extract_payload_object(text)
        .ok_or_else(|| ClassifyError::Parse("no classification payload in response".into()))?;
    let payload: RemotePayload = serde_json::from_value(Value::Object(object))
        .map_err(|e| ClassifyError::Parse(format!("malformed payload: {e}")))?;

    let category = match payload.recommended_product_category.as_deref() {
        None => Category::Unclear,
        Some(name) => Category::parse(name)
            .ok_or_else(|| ClassifyError::Parse(format!("unknown category '{name}'")))?,
    };

    let confidence = payload
        .confidence
        .filter(|c| c.is_finite())
        .unwrap_or(DEFAULT_REMOTE_CONFIDENCE)
        .clamp(0.0, 1.0);

    let analysis = payload
        .analysis
        .filter(|a| !a.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_REMOTE_ANALYSIS.to_string());

    let follow_up_question = payload
        .follow_up_question
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty());

    Ok(Decision {
        category,
        confidence,
        analysis,
        follow_up_question,
    })
}
