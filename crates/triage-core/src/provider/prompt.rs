//! Prompt texts shared by all remote backends.

use crate::catalog::{product_for, render_catalog};
use crate::inquiry::AnalysisResult;

/// System prompt asking for a classification in the fixed result shape.
pub fn classification_system_prompt() -> String {
    format!(
        "Du bist ein KI-Assistent für NFON, ein Anbieter von Kommunikationslösungen.\n\
         Deine Aufgabe ist es, Kundenanfragen zu analysieren und das am besten geeignete NFON-Produkt zu empfehlen.\n\
         \n\
         Hier sind die verfügbaren Produkte mit ihren Beschreibungen:\n\
         {}\n\
         \n\
         Bitte analysiere die Anfrage und gib folgende Informationen zurück:\n\
         1. recommendedProductCategory: Die Kategorie des empfohlenen Produkts (voicebot, chatbot, livechat, speech-to-text, general-ai oder unclear)\n\
         2. confidence: Eine Zahl zwischen 0 und 1, die deine Zuversicht in die Empfehlung darstellt\n\
         3. analysis: Eine kurze Analyse der Anfrage (max. 2 Sätze)\n\
         4. followUpQuestion: Eine Folgefrage, um mehr Informationen zu erhalten (optional)\n\
         \n\
         Antwortformat: JSON mit den oben genannten Feldern.",
        render_catalog()
    )
}

pub const COMPOSE_SYSTEM_PROMPT: &str = "Du bist ein freundlicher Vertriebsmitarbeiter von NFON. Formuliere eine personalisierte Antwort auf die Kundenanfrage.\n\
Die Antwort sollte höflich, professionell und auf Deutsch sein. Wenn ein passendes Produkt gefunden wurde,\n\
beschreibe dessen Vorteile und wie es die Bedürfnisse des Kunden erfüllen kann.\n\
Stelle bei Bedarf eine Folgefrage, um weitere Informationen zu erhalten.";

/// User message for reply composition: inquiry, analysis and product data.
pub fn compose_user_message(result: &AnalysisResult) -> String {
    let product_info = product_for(result.recommended_product_category)
        .map(|p| {
            format!(
                "{}: {}\nHauptmerkmale: {}\nAnwendungsfälle: {}",
                p.name,
                p.description,
                p.key_features.join(", "),
                p.use_cases.join(", ")
            )
        })
        .unwrap_or_else(|| "Es konnte kein passendes Produkt identifiziert werden.".to_string());

    format!(
        "Kundenanfrage: \"{}\"\n\
         \n\
         Analyseergebnis:\n\
         Empfohlenes Produkt: {}\n\
         Zuversicht: {}\n\
         Analyse: {}\n\
         \n\
         Produktinformationen:\n\
         {}\n\
         \n\
         Folgefrage (falls vorhanden): {}\n\
         \n\
         Bitte generiere eine personalisierte Antwort für diesen Kunden.",
        result.inquiry.text,
        result.recommended_product_category,
        result.confidence,
        result.analysis,
        product_info,
        result.follow_up_question.as_deref().unwrap_or("")
    )
}

/// Single-string chat template for instruction-tuned text-generation models.
pub fn instruct_template(system: &str, user: &str) -> String {
    format!("<|system|>\n{system}\n<|user|>\n{user}\n<|assistant|>")
}
