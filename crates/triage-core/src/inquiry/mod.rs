//! Inquiry data model.
//!
//! These types define the contract between the engine and its callers:
//! callers hand in [`Inquiry`] values and receive one [`AnalysisResult`]
//! per inquiry. Everything here serializes as camelCase JSON so results can
//! be exported or fed back in unchanged.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where an inquiry came from. Decided by the caller, never inferred from text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InquiryOrigin {
    /// Typed in by a person; gets a customer-facing reply.
    Manual,
    /// Extracted from an uploaded file.
    #[default]
    Upload,
    /// One of the built-in sample inquiries.
    Sample,
}

/// A single customer inquiry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inquiry {
    /// Caller-assigned, unique within a batch.
    pub id: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
    #[serde(default)]
    pub origin: InquiryOrigin,
}

impl Inquiry {
    pub fn new(id: impl Into<String>, text: impl Into<String>, origin: InquiryOrigin) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            customer: None,
            date: None,
            source_file: None,
            origin,
        }
    }

    pub fn manual(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(id, text, InquiryOrigin::Manual)
    }

    pub fn with_customer(mut self, customer: impl Into<String>) -> Self {
        self.customer = Some(customer.into());
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn with_source_file(mut self, source_file: impl Into<String>) -> Self {
        self.source_file = Some(source_file.into());
        self
    }

    pub fn is_manual(&self) -> bool {
        self.origin == InquiryOrigin::Manual
    }
}

/// Recommended product category.
///
/// The first five variants are product categories in their fixed
/// enumeration order; that order decides ties when scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Voicebot,
    Chatbot,
    Livechat,
    SpeechToText,
    GeneralAi,
    Unclear,
}

impl Category {
    /// Product categories in enumeration order (excludes `Unclear`).
    pub const PRODUCTS: [Category; 5] = [
        Category::Voicebot,
        Category::Chatbot,
        Category::Livechat,
        Category::SpeechToText,
        Category::GeneralAi,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Voicebot => "voicebot",
            Category::Chatbot => "chatbot",
            Category::Livechat => "livechat",
            Category::SpeechToText => "speech-to-text",
            Category::GeneralAi => "general-ai",
            Category::Unclear => "unclear",
        }
    }

    /// Parse the wire name of a category. Case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();
        Self::PRODUCTS
            .iter()
            .copied()
            .chain(std::iter::once(Category::Unclear))
            .find(|c| c.as_str() == s)
    }

    pub fn is_unclear(&self) -> bool {
        matches!(self, Category::Unclear)
    }

    /// Position in [`Category::PRODUCTS`], `None` for `Unclear`.
    pub fn product_index(&self) -> Option<usize> {
        Self::PRODUCTS.iter().position(|c| c == self)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The decision shape shared by the local policy and the remote backends.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub category: Category,
    pub confidence: f64,
    pub analysis: String,
    pub follow_up_question: Option<String>,
}

/// Final analysis of one inquiry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub inquiry: Inquiry,
    pub recommended_product_category: Category,
    pub confidence: f64,
    pub analysis: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follow_up_question: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_response: Option<String>,
}

impl AnalysisResult {
    pub fn from_decision(inquiry: &Inquiry, decision: Decision) -> Self {
        Self {
            inquiry: inquiry.clone(),
            recommended_product_category: decision.category,
            confidence: decision.confidence,
            analysis: decision.analysis,
            follow_up_question: decision.follow_up_question,
            customer_response: None,
        }
    }

    /// The decision part of this result, without inquiry or reply.
    pub fn decision(&self) -> Decision {
        Decision {
            category: self.recommended_product_category,
            confidence: self.confidence,
            analysis: self.analysis.clone(),
            follow_up_question: self.follow_up_question.clone(),
        }
    }
}
