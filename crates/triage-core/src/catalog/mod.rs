//! Product catalog and built-in sample inquiries.
//!
//! The catalog is the domain vocabulary the remote backends see in their
//! prompt, and the source of product names used in analysis texts.

use crate::inquiry::{Category, Inquiry, InquiryOrigin};

/// A product offered for one category.
#[derive(Debug, Clone, Copy)]
pub struct Product {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub category: Category,
    pub key_features: &'static [&'static str],
    pub use_cases: &'static [&'static str],
}

pub const PRODUCTS: &[Product] = &[
    Product {
        id: "botario-voicebot",
        name: "Botario Voicebot",
        description: "AI-powered voice assistants that can handle customer calls, answer questions, and route callers to the right department.",
        category: Category::Voicebot,
        key_features: &[
            "Natural language processing",
            "24/7 availability",
            "Seamless call routing",
            "Multi-language support",
            "Integration with CRM systems",
        ],
        use_cases: &[
            "Customer service automation",
            "Appointment scheduling",
            "FAQ handling",
            "Order status inquiries",
        ],
    },
    Product {
        id: "nfon-chatbot",
        name: "NFON Chatbot",
        description: "Intelligent text-based virtual assistants that can engage with customers on websites and messaging platforms.",
        category: Category::Chatbot,
        key_features: &[
            "Intuitive conversation flows",
            "Omnichannel deployment",
            "Custom knowledge base integration",
            "Handoff to human agents",
            "Analytics dashboard",
        ],
        use_cases: &[
            "Website customer support",
            "Lead qualification",
            "Product recommendations",
            "Technical troubleshooting",
        ],
    },
    Product {
        id: "nfon-livechat",
        name: "NFON LiveChat",
        description: "Real-time chat solution with AI-assistance for customer service teams to engage with website visitors efficiently.",
        category: Category::Livechat,
        key_features: &[
            "AI-suggested responses",
            "Visitor tracking",
            "File sharing",
            "Chat transcript analysis",
            "Proactive chat initiation",
        ],
        use_cases: &[
            "Sales support",
            "Customer onboarding",
            "Technical assistance",
            "Service upgrades",
        ],
    },
    Product {
        id: "nfon-speech-to-text",
        name: "NFON Speech-to-Text",
        description: "Advanced transcription technology that converts spoken language into written text for analysis and documentation.",
        category: Category::SpeechToText,
        key_features: &[
            "High accuracy transcription",
            "Multiple language support",
            "Speaker identification",
            "Custom vocabulary",
            "Real-time processing",
        ],
        use_cases: &[
            "Call center analytics",
            "Meeting transcription",
            "Compliance documentation",
            "Customer insight generation",
        ],
    },
    Product {
        id: "nfon-ai-suite",
        name: "NFON AI Suite",
        description: "Comprehensive AI solution that combines multiple technologies to create a unified customer communication experience.",
        category: Category::GeneralAi,
        key_features: &[
            "Unified analytics platform",
            "Cross-channel customer journey mapping",
            "AI-powered workflow automation",
            "Sentiment analysis",
            "Predictive customer service",
        ],
        use_cases: &[
            "Enterprise communication strategy",
            "Customer experience optimization",
            "Business intelligence",
            "Operational efficiency improvements",
        ],
    },
];

/// Look up the product for a category. `None` for `Unclear`.
pub fn product_for(category: Category) -> Option<&'static Product> {
    PRODUCTS.iter().find(|p| p.category == category)
}

impl Product {
    /// Multi-line description block used inside LLM prompts.
    pub fn render(&self) -> String {
        format!(
            "{} ({}):\n{}\nHauptmerkmale: {}\nAnwendungsfälle: {}",
            self.name,
            self.category,
            self.description,
            self.key_features.join(", "),
            self.use_cases.join(", ")
        )
    }
}

/// Render the whole catalog, one block per product.
pub fn render_catalog() -> String {
    PRODUCTS
        .iter()
        .map(Product::render)
        .collect::<Vec<_>>()
        .join("\n\n")
}

const SAMPLES: &[(&str, &str, &str, &str)] = &[
    (
        "1",
        "Wir suchen nach einer Lösung, die automatisch Kundenanrufe beantworten kann. Unser Call Center ist überlastet und wir würden gerne einige der häufigsten Anfragen automatisieren.",
        "Versicherung AG",
        "2023-10-15",
    ),
    (
        "2",
        "Unsere Website-Besucher benötigen oft sofortige Unterstützung. Gibt es eine Möglichkeit, einen Chat einzurichten, der von echten Mitarbeitern betreut wird, aber auch KI-Unterstützung hat?",
        "Online Shop GmbH",
        "2023-10-18",
    ),
    (
        "3",
        "Wir möchten unsere Kundengespräche analysieren, um Trends zu erkennen. Haben Sie ein Tool, das Anrufe transkribieren kann?",
        "Marktforschung KG",
        "2023-10-20",
    ),
    (
        "4",
        "Wir interessieren uns für eine KI-Lösung, die uns helfen kann, Kundenanfragen auf verschiedenen Kanälen zu beantworten. Was können Sie uns anbieten?",
        "Multinationale GmbH",
        "2023-10-22",
    ),
    (
        "5",
        "Unsere Webseite braucht einen Chatbot, der Kunden bei der Produktauswahl beraten kann. Haben Sie so etwas im Angebot?",
        "TechRetail AG",
        "2023-10-25",
    ),
];

/// The built-in demo inquiries.
pub fn sample_inquiries() -> Vec<Inquiry> {
    SAMPLES
        .iter()
        .map(|(id, text, customer, date)| {
            Inquiry::new(*id, *text, InquiryOrigin::Sample)
                .with_customer(*customer)
                .with_date(*date)
        })
        .collect()
}
