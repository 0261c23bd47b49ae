//! 📨 triage-core: Core library for routing customer inquiries to products.
//!
//! Every inquiry ends up with a recommended product category, a confidence,
//! a short analysis and, when the case is not clear-cut, a follow-up question.
//!
//! - [`inquiry`]: Inquiry, category and analysis result types
//! - [`catalog`]: Product catalog and sample inquiries
//! - [`classifier`]: Deterministic keyword scoring and decision policy
//! - [`provider`]: Remote LLM classifier trait with OpenAI and Hugging Face backends
//! - [`engine`]: Remote-first classification with local fallback, plus batches
//! - [`config`]: Typed configuration loading from JSON
//! - [`error`]: Error type for remote classification
//!
//! # Quick Start
//!
//! ```no_run
//! use triage_core::config::Config;
//! use triage_core::engine::TriageEngine;
//! use triage_core::inquiry::Inquiry;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = Config::load()?;
//! let engine = TriageEngine::from_config(&config, reqwest::Client::new());
//!
//! let inquiry = Inquiry::manual("m1", "Wir brauchen einen Chatbot für unsere Website");
//! let result = engine.classify(&inquiry).await;
//! println!("{} ({:.0}%)", result.recommended_product_category, result.confidence * 100.0);
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod classifier;
pub mod config;
pub mod engine;
pub mod error;
pub mod inquiry;
pub mod provider;
