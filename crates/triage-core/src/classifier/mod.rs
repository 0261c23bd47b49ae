//! Local rule-based classifier.
//!
//! Pipeline: [`scorer::score`] produces one score per category, then
//! [`policy::decide`] turns the scores into a [`Decision`]. Both steps are
//! pure, so classifying the same text twice always yields the same result.

pub mod policy;
pub mod rules;
pub mod scorer;

use tracing::debug;

use crate::catalog::product_for;
use crate::inquiry::{AnalysisResult, Category, Decision, Inquiry};

/// Classify text with the rule table only.
pub fn decide_text(text: &str) -> Decision {
    let scores = scorer::score(text);
    let decision = policy::decide(&scores);
    debug!(
        scores = %scores,
        category = %decision.category,
        confidence = decision.confidence,
        "Local classification"
    );
    decision
}

/// Classify an inquiry locally, attaching a templated customer reply for
/// manually entered inquiries.
pub fn classify_local(inquiry: &Inquiry) -> AnalysisResult {
    let mut result = AnalysisResult::from_decision(inquiry, decide_text(&inquiry.text));
    if inquiry.is_manual() {
        result.customer_response = Some(customer_response(&result));
    }
    result
}

/// Templated customer-facing reply, used when no remote backend writes one.
pub fn customer_response(result: &AnalysisResult) -> String {
    let follow_up = result.follow_up_question.as_deref();
    let product = product_for(result.recommended_product_category);

    match (result.recommended_product_category, product) {
        (Category::Unclear, _) | (_, None) => format!(
            "Vielen Dank für Ihre Anfrage. Um Ihnen besser helfen zu können, hätten wir noch eine Frage: {} Mit diesen Informationen können wir Ihnen eine maßgeschneiderte Lösung anbieten.",
            follow_up.unwrap_or(policy::GENERIC_FOLLOW_UP)
        ),
        (_, Some(product)) if result.confidence < 0.6 => {
            let mut reply = format!(
                "Vielen Dank für Ihr Interesse an unseren KI-Lösungen. Basierend auf Ihrer Anfrage könnte {} für Sie interessant sein.",
                product.name
            );
            if let Some(q) = follow_up {
                reply.push_str(&format!(
                    " Um sicherzustellen, dass wir Ihre Anforderungen optimal verstehen: {q}"
                ));
            }
            reply
        }
        (_, Some(product)) => {
            let mut reply = format!(
                "Vielen Dank für Ihre Anfrage. Basierend auf Ihren Anforderungen empfehlen wir Ihnen {}. {}",
                product.name, product.description
            );
            if let Some(q) = follow_up {
                reply.push_str(&format!("\n\nZur weiteren Optimierung unseres Angebots: {q}"));
            }
            reply
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inquiry::InquiryOrigin;

    #[test]
    fn test_manual_inquiry_gets_customer_response() {
        let inquiry = Inquiry::manual("m-1", "Wir brauchen einen Chatbot für unsere Website mit FAQ");
        let result = classify_local(&inquiry);
        assert_eq!(result.recommended_product_category, Category::Chatbot);
        let reply = result.customer_response.unwrap();
        assert!(reply.contains("empfehlen wir Ihnen NFON Chatbot"));
        assert!(reply.contains("Zur weiteren Optimierung"));
    }

    #[test]
    fn test_uploaded_inquiry_has_no_customer_response() {
        let inquiry = Inquiry::new("csv-1", "Wir brauchen einen Chatbot", InquiryOrigin::Upload);
        let result = classify_local(&inquiry);
        assert!(result.customer_response.is_none());
        assert_eq!(result.inquiry, inquiry);
    }

    #[test]
    fn test_unclear_reply_repeats_question() {
        let result = classify_local(&Inquiry::manual("m-2", "Hallo"));
        let reply = result.customer_response.unwrap();
        assert!(reply.starts_with("Vielen Dank für Ihre Anfrage. Um Ihnen besser helfen"));
        assert!(reply.contains(policy::GENERIC_FOLLOW_UP));
    }

    #[test]
    fn test_low_confidence_reply() {
        let inquiry = Inquiry::manual("m-3", "x");
        let result = AnalysisResult::from_decision(
            &inquiry,
            Decision {
                category: Category::Livechat,
                confidence: 0.5,
                analysis: String::new(),
                follow_up_question: None,
            },
        );
        let reply = customer_response(&result);
        assert!(reply.contains("könnte NFON LiveChat für Sie interessant sein."));
        assert!(!reply.contains("Um sicherzustellen"));
    }

    #[test]
    fn test_local_is_deterministic() {
        let inquiry = Inquiry::manual("m-4", "Wir möchten Gespräche aufzeichnen und transkribieren.");
        assert_eq!(classify_local(&inquiry), classify_local(&inquiry));
    }
}
