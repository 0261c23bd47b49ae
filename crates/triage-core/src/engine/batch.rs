//! Batch orchestration.
//!
//! Inquiries are classified in input order. With `maxConcurrency = 1` (the
//! default) one inquiry is processed at a time; higher values keep up to
//! that many in flight while still yielding results in input order. Each
//! completed result can be reported to an observer as it arrives.

use futures::stream::{self, StreamExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::TriageEngine;
use crate::inquiry::{AnalysisResult, Inquiry};

/// Emitted once per completed inquiry, in input order.
#[derive(Debug, Clone)]
pub struct BatchProgress {
    /// Position of the inquiry in the input.
    pub index: usize,
    /// Results completed so far, including this one.
    pub completed: usize,
    pub total: usize,
    pub result: AnalysisResult,
}

impl TriageEngine {
    /// Classify every inquiry; one result per input, same order.
    pub async fn classify_all(&self, inquiries: &[Inquiry]) -> Vec<AnalysisResult> {
        self.classify_all_with(inquiries, None, &CancellationToken::new())
            .await
    }

    /// Like [`classify_all`](Self::classify_all), reporting each result to
    /// `progress` and honoring `cancel` for the remote calls.
    ///
    /// Cancellation does not shorten the batch: remaining inquiries are
    /// classified with the local rules.
    pub async fn classify_all_with(
        &self,
        inquiries: &[Inquiry],
        progress: Option<mpsc::Sender<BatchProgress>>,
        cancel: &CancellationToken,
    ) -> Vec<AnalysisResult> {
        let total = inquiries.len();
        let concurrency = self.settings.max_concurrency.max(1);
        info!(
            total,
            concurrency,
            remote = self.remote_name().unwrap_or("none"),
            "Starting batch classification"
        );

        let mut results = Vec::with_capacity(total);
        let mut stream = stream::iter(inquiries)
            .map(|inquiry| self.classify_with_cancel(inquiry, cancel))
            .buffered(concurrency);

        while let Some(result) = stream.next().await {
            let index = results.len();
            if let Some(tx) = &progress {
                let event = BatchProgress {
                    index,
                    completed: index + 1,
                    total,
                    result: result.clone(),
                };
                if tx.send(event).await.is_err() {
                    debug!("Progress receiver dropped");
                }
            }
            results.push(result);
        }

        info!(total = results.len(), "Batch classification finished");
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::sample_inquiries;
    use crate::classifier::classify_local;
    use crate::config::ClassifierConfig;
    use crate::engine::tests::{engine_with, Behavior, FakeRemote};
    use crate::engine::{failure_result, FAILURE_ANALYSIS};
    use crate::inquiry::{Category, InquiryOrigin};
    use crate::provider::RemoteClassifier;
    use std::sync::Arc;

    fn inquiries(texts: &[&str]) -> Vec<Inquiry> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| Inquiry::new(format!("q{i}"), *t, InquiryOrigin::Upload))
            .collect()
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let engine = TriageEngine::local(ClassifierConfig::default());
        assert!(engine.classify_all(&[]).await.is_empty());
    }

    #[tokio::test]
    async fn test_results_follow_input_order() {
        let engine = TriageEngine::local(ClassifierConfig::default());
        let batch = inquiries(&["Chatbot für die Website", "Hallo", "Anrufe transkribieren"]);
        let results = engine.classify_all(&batch).await;
        let ids: Vec<_> = results.iter().map(|r| r.inquiry.id.as_str()).collect();
        assert_eq!(ids, ["q0", "q1", "q2"]);
        assert_eq!(results[1].recommended_product_category, Category::Unclear);
    }

    #[tokio::test]
    async fn test_failing_remote_matches_local_only() {
        let (engine, remote) = engine_with(FakeRemote::new(Behavior::Fail));
        let mut batch = sample_inquiries();
        batch.push(Inquiry::manual("m1", "Wir brauchen einen Chatbot für unsere Website mit FAQ"));

        let with_remote = engine.classify_all(&batch).await;
        let local_only = TriageEngine::local(ClassifierConfig::default())
            .classify_all(&batch)
            .await;

        assert_eq!(with_remote, local_only);
        assert_eq!(
            with_remote,
            batch.iter().map(classify_local).collect::<Vec<_>>()
        );
        assert_eq!(remote.calls.load(std::sync::atomic::Ordering::SeqCst), batch.len());
    }

    #[tokio::test]
    async fn test_panicking_item_does_not_abort_batch() {
        let (engine, _) = engine_with(FakeRemote::new(Behavior::PanicOn("boom")));
        let batch = inquiries(&["erste", "boom", "dritte"]);
        let results = engine.classify_all(&batch).await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].recommended_product_category, Category::Chatbot);
        assert_eq!(results[1], failure_result(&batch[1]));
        assert_eq!(results[1].analysis, FAILURE_ANALYSIS);
        assert_eq!(results[2].recommended_product_category, Category::Chatbot);
    }

    #[tokio::test]
    async fn test_concurrent_batch_preserves_order() {
        let settings = ClassifierConfig {
            max_concurrency: 4,
            ..Default::default()
        };
        let remote: Arc<dyn RemoteClassifier> = Arc::new(FakeRemote::new(Behavior::DelayMs(80)));
        let engine = TriageEngine::new(Some(remote), settings);

        // Later inquiries are longer and therefore finish first.
        let batch = inquiries(&["a", "bbb", "ccccc", "ddddddd"]);
        let results = engine.classify_all(&batch).await;
        let ids: Vec<_> = results.iter().map(|r| r.inquiry.id.as_str()).collect();
        assert_eq!(ids, ["q0", "q1", "q2", "q3"]);
        assert!(results
            .iter()
            .all(|r| r.recommended_product_category == Category::Livechat));
    }

    #[tokio::test]
    async fn test_progress_events() {
        let engine = TriageEngine::local(ClassifierConfig::default());
        let batch = inquiries(&["Chatbot", "Hallo", "Protokoll"]);
        let (tx, mut rx) = mpsc::channel(8);

        let results = engine
            .classify_all_with(&batch, Some(tx), &CancellationToken::new())
            .await;

        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        assert_eq!(events.len(), 3);
        for (i, event) in events.iter().enumerate() {
            assert_eq!(event.index, i);
            assert_eq!(event.completed, i + 1);
            assert_eq!(event.total, 3);
            assert_eq!(event.result, results[i]);
        }
    }

    #[tokio::test]
    async fn test_dropped_progress_receiver_is_harmless() {
        let engine = TriageEngine::local(ClassifierConfig::default());
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let results = engine
            .classify_all_with(&inquiries(&["a", "b"]), Some(tx), &CancellationToken::new())
            .await;
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn test_cancelled_batch_completes_locally() {
        let (engine, _) = engine_with(FakeRemote::new(Behavior::Hang));
        let batch = sample_inquiries();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let results = engine.classify_all_with(&batch, None, &cancel).await;
        assert_eq!(results, batch.iter().map(classify_local).collect::<Vec<_>>());
    }
}
