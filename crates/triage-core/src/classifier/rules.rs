//! Category rule table.
//!
//! Each product category owns a list of trigger phrases (explicit product
//! vocabulary) and a list of looser business-need phrases. Phrases are
//! matched as lower-case substrings. On top of that every category has one
//! context booster: a word-boundary regex covering synonyms the phrase lists
//! miss.

use regex::Regex;
use std::sync::LazyLock;
use tracing::error;

use crate::inquiry::Category;

/// Phrase lists for one product category.
#[derive(Debug, Clone, Copy)]
pub struct CategoryRule {
    pub category: Category,
    pub trigger_phrases: &'static [&'static str],
    pub business_need_phrases: &'static [&'static str],
}

/// A fixed regex that adds `bonus` to `category` when it matches.
#[derive(Debug)]
pub struct Booster {
    pub category: Category,
    pub bonus: f64,
    pub pattern: Regex,
}

pub const RULES: &[CategoryRule] = &[
    CategoryRule {
        category: Category::Voicebot,
        trigger_phrases: &[
            "anrufe", "telefonanrufe", "call center", "callcenter", "telefonisch",
            "anrufbeantworter", "sprachassistent", "voicebot", "spracherkennung",
            "anruf", "telefonie", "telefonieren", "stimme", "automatisch beantworten",
            "anrufvolumen", "telefonservice", "ivr", "interactive voice response",
        ],
        business_need_phrases: &[
            "anrufvolumen", "viele anrufe", "24/7", "call-center", "kundenservice telefon",
            "telefonische anfragen", "telefonische beratung", "automatisierte anrufannahme",
            "anrufe außerhalb der geschäftszeiten", "telefonische bestellungen",
            "telefonhotline", "sprachgesteuertes menü", "kundenanrufe", "warteschlange",
            "automatisierte anrufweiterleitung", "sprachgesteuerte selbstbedienung",
        ],
    },
    CategoryRule {
        category: Category::Chatbot,
        trigger_phrases: &[
            "chatbot", "chat-bot", "automatische antworten", "automatisierte chats",
            "chat automation", "bot für website", "website bot", "textbot",
            "chat-assistent", "automatische textantworten", "webseiten-bot",
            "messengern", "messaging", "nachrichtenbot",
        ],
        business_need_phrases: &[
            "website support", "faq beantwortung", "automatische antworten", "digitaler assistent",
            "textnachrichten automatisieren", "website interaktion", "online kundenservice",
            "häufige fragen", "selbstbedienung online", "kundenanfragen auf der website",
            "digitale kundenbetreuung", "automatisches messaging", "schnelle reaktionszeiten",
            "beratung auf der website", "online-hilfe", "rund um die uhr verfügbar",
        ],
    },
    CategoryRule {
        category: Category::Livechat,
        trigger_phrases: &[
            "live chat", "livechat", "live-chat", "chat mit mitarbeitern", "echten mitarbeitern",
            "echtzeit-chat", "echtzeit chat", "menschlicher chat", "chat support",
            "support chat", "chat-support", "berater im chat", "chat-berater",
            "chat-beratung", "live beratung", "live-beratung", "sofortige unterstützung",
            "sofortige hilfe",
        ],
        business_need_phrases: &[
            "persönliche beratung", "echte mitarbeiter", "direkte kommunikation", "sofortige hilfe",
            "menschliche interaktion", "personalisierter service", "beratungsgespräche",
            "vertriebsgespräche online", "komplexe anfragen", "individuelle fälle",
            "verkaufsgespräche", "kundenbeziehungen", "direkter kundenkontakt",
            "professionelle beratung", "höherwertiger support", "online-verkauf",
        ],
    },
    CategoryRule {
        category: Category::SpeechToText,
        trigger_phrases: &[
            "transkribieren", "transkription", "speech-to-text", "speech to text",
            "spracherkennung", "gesprächstranskription", "gespräche aufzeichnen",
            "aufgezeichnete gespräche", "aufzeichnung", "anrufanalyse", "call recording",
            "mitschnitt", "mitschrift", "gesprächsmitschrift", "protokoll", "gesprächsprotokoll",
        ],
        business_need_phrases: &[
            "dokumentation", "protokollierung", "qualitätssicherung", "schulungsmaterial",
            "barrierefreiheit", "compliance", "aufzeichnungspflicht", "gerichtsverwertbarkeit",
            "besprechungsprotokolle", "analyse von kundengesprächen", "auswertung",
            "nachverfolgung", "beweissicherung", "nacharbeit", "rechtliche anforderungen",
            "zugänglichkeit", "gesprächsanalyse", "mehrsprachige kommunikation",
        ],
    },
    CategoryRule {
        category: Category::GeneralAi,
        trigger_phrases: &[
            "ki-lösung", "ki lösung", "künstliche intelligenz", "ai solution", "ai-lösung",
            "ai lösung", "umfassende lösung", "komplettlösung", "gesamtlösung", "alles-in-einem",
            "alles in einem", "plattform", "suite", "mehrere kanäle", "omnichannel", "alle kanäle",
        ],
        business_need_phrases: &[
            "digitale transformation", "prozessoptimierung", "mehrere kommunikationskanäle",
            "ganzheitliche lösung", "durchgängige kundenerfahrung", "omnichannel",
            "prozessautomatisierung", "effizienzsteigerung", "kostenreduktion",
            "wettbewerbsvorteil", "innovativ", "zukunftssicher", "skalierbar",
            "unternehmensweite lösung", "strategische neuausrichtung", "moderne kommunikation",
            "end-to-end", "datenanalyse", "kundenerfahrung verbessern",
        ],
    },
];

const BOOSTER_PATTERNS: &[(Category, f64, &str)] = &[
    (
        Category::Voicebot,
        1.0,
        r"\bhoh(es|e)?\s+anrufvolumen\b|\bviel(e)?\s+anrufe\b|\b24/7\b|\brund\s+um\s+die\s+uhr\b",
    ),
    (
        Category::Chatbot,
        0.8,
        r"\bwebsite\b|\bonline\b|\bdigital\b|\bfaq\b|\bhäufig(e)?\s+fragen\b",
    ),
    (
        Category::Livechat,
        1.0,
        r"\bpersönlich\b|\bindividuell\b|\bkomplex\b|\bechtzeit\b|\bsofort\b|\bberater\b|\bberaten\b|\bberatung\b",
    ),
    (
        Category::SpeechToText,
        1.0,
        r"\bdokumentation\b|\bprotokoll\b|\baufzeichnung\b|\baufzeichnen\b|\btranskrib\w+\b|\bmitschnitt\b|\bgeschäftlich\b|\brechtlich\b|\banalyse\b",
    ),
    (
        Category::GeneralAi,
        1.0,
        r"\bmehrere\s+kanäle\b|\bomnichannel\b|\bverschiedene\s+wege\b|\btransformation\b|\bganzheitlich\b|\bkomplett\b|\ball(es)?\b|\bintegriert\b",
    ),
];

static BOOSTERS: LazyLock<Vec<Booster>> = LazyLock::new(|| {
    BOOSTER_PATTERNS
        .iter()
        .filter_map(|&(category, bonus, pattern)| match Regex::new(pattern) {
            Ok(pattern) => Some(Booster {
                category,
                bonus,
                pattern,
            }),
            Err(e) => {
                error!(%category, error = %e, "Invalid booster pattern, skipping");
                None
            }
        })
        .collect()
});

/// The compiled context boosters, one per product category.
pub fn boosters() -> &'static [Booster] {
    &BOOSTERS
}

/// The rule for a product category. `None` for `Unclear`.
pub fn rule_for(category: Category) -> Option<&'static CategoryRule> {
    RULES.iter().find(|r| r.category == category)
}
