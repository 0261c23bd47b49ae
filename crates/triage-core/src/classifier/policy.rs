//! Classification decision policy: scores → category, confidence, texts.
//!
//! The constants below are empirical and kept exactly as tuned.

use super::scorer::CategoryScores;
use crate::catalog::product_for;
use crate::inquiry::{Category, Decision};

/// Confidence when nothing matched at all.
pub const BASE_CONFIDENCE: f64 = 0.3;
/// Upper bound for locally computed confidence.
pub const MAX_CONFIDENCE: f64 = 0.95;
/// Highest score below this is treated as unclear.
pub const MIN_SCORE: f64 = 1.5;
/// Confidence ceiling for unclear results.
pub const UNCLEAR_CONFIDENCE_CAP: f64 = 0.4;

const CONFIDENT_ABOVE: f64 = 0.6;
const POSSIBLE_ABOVE: f64 = 0.4;
const SPECIFIC_QUESTION_FROM: f64 = 0.7;
const NO_QUESTION_FROM: f64 = 0.9;

pub const UNCLEAR_ANALYSIS: &str = "Die Anfrage ist nicht eindeutig einem bestimmten Produktbereich zuzuordnen. Eine allgemeine Beratung wird empfohlen.";

pub const GENERIC_FOLLOW_UP: &str = "Könnten Sie näher erläutern, welche spezifischen Kommunikationsherausforderungen Sie aktuell in Ihrem Unternehmen bewältigen möchten?";

/// Canned follow-up question for a category.
pub fn follow_up_for(category: Category) -> &'static str {
    match category {
        Category::Voicebot => "Wie viele Anrufe erhalten Sie täglich und welche Art von Anfragen kommen am häufigsten vor?",
        Category::Chatbot => "Welche spezifischen Funktionen erwarten Sie von einem Chatbot und in welche Systeme soll er integriert werden?",
        Category::Livechat => "Wie groß ist Ihr Support-Team und wie möchten Sie den Live-Chat in Ihre bestehenden Prozesse integrieren?",
        Category::SpeechToText => "Welche Art von Analysen möchten Sie mit den transkribierten Gesprächen durchführen?",
        Category::GeneralAi => "Welche Kommunikationskanäle sind für Ihr Unternehmen am wichtigsten?",
        Category::Unclear => "Können Sie näher erläutern, welche spezifischen Herausforderungen Sie mit einer KI-Lösung angehen möchten?",
    }
}

/// Confidence from the best score and the sum of all scores.
pub fn confidence_for(highest: f64, total: f64) -> f64 {
    if highest <= 0.0 || total <= 0.0 {
        return BASE_CONFIDENCE;
    }
    let dominance = highest / total;
    (0.4 + (highest / 5.0) * 0.3 + dominance * 0.3).min(MAX_CONFIDENCE)
}

/// Turn a score vector into a decision. Pure.
pub fn decide(scores: &CategoryScores) -> Decision {
    let (mut category, highest) = scores.best();
    let mut confidence = confidence_for(highest, scores.total());

    if highest < MIN_SCORE {
        category = Category::Unclear;
        confidence = confidence.min(UNCLEAR_CONFIDENCE_CAP);
    }

    let analysis = match product_for(category) {
        Some(product) if confidence > CONFIDENT_ABOVE => format!(
            "Die Anfrage deutet auf Bedarf an {} hin. Die Kundenanforderungen passen zu unserer {} Lösung.",
            product.name, category
        ),
        Some(_) if confidence > POSSIBLE_ABOVE => format!(
            "Die Anfrage könnte auf Bedarf an {}-Lösungen hinweisen, aber weitere Klärung ist empfehlenswert.",
            category
        ),
        _ => {
            category = Category::Unclear;
            UNCLEAR_ANALYSIS.to_string()
        }
    };

    let follow_up_question = if category.is_unclear() || confidence < SPECIFIC_QUESTION_FROM {
        Some(GENERIC_FOLLOW_UP.to_string())
    } else if confidence < NO_QUESTION_FROM {
        Some(follow_up_for(category).to_string())
    } else {
        None
    };

    Decision {
        category,
        confidence,
        analysis,
        follow_up_question,
    }
}
