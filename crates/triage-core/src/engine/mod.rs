//! Classification entry point.
//!
//! [`TriageEngine::classify`] is the one place remote and local
//! classification meet:
//! 1. If a remote backend is bound and the text is not blank, ask it first
//!    (bounded by the request timeout and the caller's cancellation token)
//! 2. On any remote error, log it and fall back to the local rules
//! 3. If anything panics, resolve the inquiry to a fixed `unclear` result
//!
//! Callers always get exactly one [`AnalysisResult`] back, never an error.

pub mod batch;

use futures::FutureExt;
use reqwest::Client;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::classifier::{self, policy};
use crate::config::{ClassifierConfig, Config};
use crate::error::{ClassifyError, Result};
use crate::inquiry::{AnalysisResult, Category, Decision, Inquiry};
use crate::provider::{self, RemoteClassifier};

pub use batch::BatchProgress;

/// Analysis text for an inquiry whose classification crashed.
pub const FAILURE_ANALYSIS: &str = "Bei der Analyse dieser Anfrage ist ein Fehler aufgetreten. Eine manuelle Prüfung wird empfohlen.";

/// Remote-first classifier with local fallback.
pub struct TriageEngine {
    remote: Option<Arc<dyn RemoteClassifier>>,
    settings: ClassifierConfig,
    request_timeout: Duration,
}

impl TriageEngine {
    pub fn new(remote: Option<Arc<dyn RemoteClassifier>>, settings: ClassifierConfig) -> Self {
        let request_timeout = settings.request_timeout();
        Self {
            remote,
            settings,
            request_timeout,
        }
    }

    /// An engine that only ever uses the local rules.
    pub fn local(settings: ClassifierConfig) -> Self {
        Self::new(None, settings)
    }

    /// Wire the engine from a resolved configuration.
    ///
    /// A missing credential is not an error: the engine runs locally.
    pub fn from_config(config: &Config, client: Client) -> Self {
        if !config.classifier.use_remote {
            info!("Remote classification disabled, using local rules");
            return Self::local(config.classifier.clone());
        }

        match provider::from_config(&config.providers, client) {
            Ok(remote) => {
                info!(provider = remote.name(), "Remote classifier bound");
                Self::new(Some(remote), config.classifier.clone())
            }
            Err(e) => {
                info!(reason = %e, "No remote classifier, using local rules");
                Self::local(config.classifier.clone())
            }
        }
    }

    /// Override the per-request timeout of remote calls.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Name of the bound remote backend, if any.
    pub fn remote_name(&self) -> Option<&str> {
        self.remote.as_deref().map(|r| r.name())
    }

    pub fn settings(&self) -> &ClassifierConfig {
        &self.settings
    }

    /// Classify one inquiry. Never fails.
    pub async fn classify(&self, inquiry: &Inquiry) -> AnalysisResult {
        self.classify_with_cancel(inquiry, &CancellationToken::new()).await
    }

    /// Classify one inquiry; cancelling `cancel` abandons the remote call and
    /// returns the local result instead.
    pub async fn classify_with_cancel(
        &self,
        inquiry: &Inquiry,
        cancel: &CancellationToken,
    ) -> AnalysisResult {
        match AssertUnwindSafe(self.classify_inner(inquiry, cancel))
            .catch_unwind()
            .await
        {
            Ok(result) => result,
            Err(_) => {
                error!(inquiry_id = %inquiry.id, "Classification panicked, marking inquiry unclear");
                failure_result(inquiry)
            }
        }
    }

    async fn classify_inner(&self, inquiry: &Inquiry, cancel: &CancellationToken) -> AnalysisResult {
        if let Some(remote) = self.remote.as_deref() {
            if inquiry.text.trim().is_empty() {
                debug!(inquiry_id = %inquiry.id, "Blank inquiry, skipping remote classifier");
            } else {
                match self.classify_remote(remote, inquiry, cancel).await {
                    Ok(result) => return result,
                    Err(e) => warn!(
                        inquiry_id = %inquiry.id,
                        provider = remote.name(),
                        error = %e,
                        "Remote classification failed, falling back to local rules"
                    ),
                }
            }
        }

        if let Some(delay) = self.settings.simulated_latency() {
            tokio::time::sleep(delay).await;
        }
        let result = classifier::classify_local(inquiry);
        info!(
            inquiry_id = %inquiry.id,
            category = %result.recommended_product_category,
            confidence = result.confidence,
            "Classified locally"
        );
        result
    }

    async fn classify_remote(
        &self,
        remote: &dyn RemoteClassifier,
        inquiry: &Inquiry,
        cancel: &CancellationToken,
    ) -> Result<AnalysisResult> {
        let decision = self.bounded(cancel, remote.classify(inquiry)).await?;
        let mut result = AnalysisResult::from_decision(inquiry, normalize(decision));

        info!(
            inquiry_id = %inquiry.id,
            provider = remote.name(),
            category = %result.recommended_product_category,
            confidence = result.confidence,
            "Classified remotely"
        );

        if inquiry.is_manual() {
            let reply = match self.bounded(cancel, remote.compose_response(&result)).await {
                Ok(reply) => reply,
                Err(e) => {
                    warn!(
                        inquiry_id = %inquiry.id,
                        provider = remote.name(),
                        error = %e,
                        "Reply composition failed, using template"
                    );
                    classifier::customer_response(&result)
                }
            };
            result.customer_response = Some(reply);
        }

        Ok(result)
    }

    /// Run a remote future under the request timeout and cancellation token.
    async fn bounded<T, F>(&self, cancel: &CancellationToken, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let timeout = self.request_timeout;
        tokio::select! {
            _ = cancel.cancelled() => Err(ClassifyError::Cancelled),
            outcome = tokio::time::timeout(timeout, fut) => {
                outcome.unwrap_or(Err(ClassifyError::Timeout(timeout)))
            }
        }
    }
}

/// Keep remote decisions within the invariants of local ones: an unclear
/// result never carries more than the unclear confidence cap.
fn normalize(mut decision: Decision) -> Decision {
    if decision.category.is_unclear() {
        decision.confidence = decision.confidence.min(policy::UNCLEAR_CONFIDENCE_CAP);
        if decision.follow_up_question.is_none() {
            decision.follow_up_question = Some(policy::GENERIC_FOLLOW_UP.to_string());
        }
    }
    decision
}

/// The fixed result for an inquiry whose classification crashed.
pub fn failure_result(inquiry: &Inquiry) -> AnalysisResult {
    AnalysisResult::from_decision(
        inquiry,
        Decision {
            category: Category::Unclear,
            confidence: policy::BASE_CONFIDENCE,
            analysis: FAILURE_ANALYSIS.to_string(),
            follow_up_question: Some(policy::GENERIC_FOLLOW_UP.to_string()),
        },
    )
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted remote backend for engine tests.
    pub(crate) struct FakeRemote {
        pub behavior: Behavior,
        pub compose_ok: bool,
        pub calls: AtomicUsize,
    }

    #[derive(Clone)]
    pub(crate) enum Behavior {
        Answer(Category, f64),
        Fail,
        Hang,
        /// Panics when the inquiry text equals the given string, else answers chatbot.
        PanicOn(&'static str),
        /// Sleeps `base - 10ms per text byte`, so longer texts finish first.
        DelayMs(u64),
    }

    impl FakeRemote {
        pub(crate) fn new(behavior: Behavior) -> Self {
            Self {
                behavior,
                compose_ok: true,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl RemoteClassifier for FakeRemote {
        fn name(&self) -> &str {
            "fake"
        }

        async fn classify(&self, inquiry: &Inquiry) -> Result<Decision> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let answer = |category, confidence| Decision {
                category,
                confidence,
                analysis: format!("remote: {}", inquiry.text),
                follow_up_question: None,
            };
            match &self.behavior {
                Behavior::Answer(c, conf) => Ok(answer(*c, *conf)),
                Behavior::Fail => Err(ClassifyError::Status {
                    provider: "fake",
                    status: 503,
                    message: "down".into(),
                }),
                Behavior::Hang => std::future::pending().await,
                Behavior::PanicOn(text) => {
                    if inquiry.text == *text {
                        panic!("backend exploded");
                    }
                    Ok(answer(Category::Chatbot, 0.8))
                }
                Behavior::DelayMs(base) => {
                    let delay = base.saturating_sub(inquiry.text.len() as u64 * 10);
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                    Ok(answer(Category::Livechat, 0.75))
                }
            }
        }

        async fn compose_response(&self, result: &AnalysisResult) -> Result<String> {
            if self.compose_ok {
                Ok(format!("Antwort zu {}", result.recommended_product_category))
            } else {
                Err(ClassifyError::Parse("no reply".into()))
            }
        }
    }

    pub(crate) fn engine_with(remote: FakeRemote) -> (TriageEngine, Arc<FakeRemote>) {
        let remote = Arc::new(remote);
        let engine = TriageEngine::new(
            Some(remote.clone() as Arc<dyn RemoteClassifier>),
            ClassifierConfig::default(),
        );
        (engine, remote)
    }

    #[tokio::test]
    async fn test_local_only_engine() {
        let engine = TriageEngine::local(ClassifierConfig::default());
        assert!(engine.remote_name().is_none());
        let inquiry = Inquiry::manual("m1", "Hallo");
        let result = engine.classify(&inquiry).await;
        assert_eq!(result, classifier::classify_local(&inquiry));
    }

    #[tokio::test]
    async fn test_remote_result_preferred() {
        let (engine, remote) = engine_with(FakeRemote::new(Behavior::Answer(Category::GeneralAi, 0.8)));
        let inquiry = Inquiry::manual("m1", "Hallo");
        let result = engine.classify(&inquiry).await;
        assert_eq!(result.recommended_product_category, Category::GeneralAi);
        assert_eq!(result.analysis, "remote: Hallo");
        assert_eq!(result.customer_response.as_deref(), Some("Antwort zu general-ai"));
        assert_eq!(remote.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_remote_failure_falls_back_to_local() {
        let (engine, _) = engine_with(FakeRemote::new(Behavior::Fail));
        let inquiry = Inquiry::manual("m1", "Wir brauchen einen Chatbot für unsere Website mit FAQ");
        assert_eq!(engine.classify(&inquiry).await, classifier::classify_local(&inquiry));
    }

    #[tokio::test]
    async fn test_remote_timeout_falls_back_to_local() {
        let (engine, _) = engine_with(FakeRemote::new(Behavior::Hang));
        let engine = engine.with_request_timeout(Duration::from_millis(20));
        let inquiry = Inquiry::manual("m1", "Wir möchten Anrufe transkribieren.");
        assert_eq!(engine.classify(&inquiry).await, classifier::classify_local(&inquiry));
    }

    #[tokio::test]
    async fn test_cancellation_falls_back_to_local() {
        let (engine, _) = engine_with(FakeRemote::new(Behavior::Hang));
        let cancel = CancellationToken::new();
        cancel.cancel();
        let inquiry = Inquiry::manual("m1", "Omnichannel Plattform gesucht");
        let result = engine.classify_with_cancel(&inquiry, &cancel).await;
        assert_eq!(result, classifier::classify_local(&inquiry));
    }

    #[tokio::test]
    async fn test_blank_text_skips_remote() {
        let (engine, remote) = engine_with(FakeRemote::new(Behavior::Answer(Category::Chatbot, 0.9)));
        let result = engine.classify(&Inquiry::manual("m1", "   ")).await;
        assert_eq!(result.recommended_product_category, Category::Unclear);
        assert_eq!(result.confidence, policy::BASE_CONFIDENCE);
        assert_eq!(remote.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_compose_failure_uses_template() {
        let mut fake = FakeRemote::new(Behavior::Answer(Category::Chatbot, 0.8));
        fake.compose_ok = false;
        let (engine, _) = engine_with(fake);
        let result = engine.classify(&Inquiry::manual("m1", "Hallo")).await;
        let reply = result.customer_response.clone().unwrap();
        assert_eq!(reply, classifier::customer_response(&result));
        assert!(reply.contains("NFON Chatbot"));
    }

    #[tokio::test]
    async fn test_uploaded_inquiry_gets_no_reply_from_remote() {
        let (engine, _) = engine_with(FakeRemote::new(Behavior::Answer(Category::Chatbot, 0.8)));
        let inquiry = Inquiry::new("csv-1", "Hallo", crate::inquiry::InquiryOrigin::Upload);
        assert!(engine.classify(&inquiry).await.customer_response.is_none());
    }

    #[tokio::test]
    async fn test_remote_unclear_is_capped() {
        let (engine, _) = engine_with(FakeRemote::new(Behavior::Answer(Category::Unclear, 0.9)));
        let result = engine.classify(&Inquiry::new("u1", "Hallo", Default::default())).await;
        assert_eq!(result.confidence, policy::UNCLEAR_CONFIDENCE_CAP);
        assert_eq!(result.follow_up_question.as_deref(), Some(policy::GENERIC_FOLLOW_UP));
    }

    #[tokio::test]
    async fn test_panic_resolves_to_failure_result() {
        let (engine, _) = engine_with(FakeRemote::new(Behavior::PanicOn("boom")));
        let inquiry = Inquiry::manual("m1", "boom");
        let result = engine.classify(&inquiry).await;
        assert_eq!(result, failure_result(&inquiry));
        assert_eq!(result.analysis, FAILURE_ANALYSIS);
    }

    #[tokio::test]
    async fn test_from_config_without_key_is_local() {
        let engine = TriageEngine::from_config(&Config::default(), Client::new());
        assert!(engine.remote_name().is_none());
    }

    #[tokio::test]
    async fn test_from_config_respects_use_remote() {
        let json = r#"{"providers": {"openai": {"apiKey": "sk-test"}}, "classifier": {"useRemote": false}}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        let engine = TriageEngine::from_config(&config, Client::new());
        assert!(engine.remote_name().is_none());

        let json = r#"{"providers": {"openai": {"apiKey": "sk-test"}}}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        let engine = TriageEngine::from_config(&config, Client::new());
        assert_eq!(engine.remote_name(), Some("openai"));
    }
}
