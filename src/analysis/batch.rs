use std::sync::Arc;

use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;

use crate::config::BatchConfig;
use crate::models::{AnalysisResult, Item};

use super::analyzer::SentimentAnalyzer;

/// Bounded-concurrency batch runner. Submission is paced by a fixed delay
/// so the remote API never sees a burst, whatever the pool width; each
/// worker's result lands in the slot matching its submission index, so
/// output order equals input order regardless of completion order. A
/// failed item degrades to the canonical empty result; the batch itself
/// always completes with one result per input.
pub struct BatchOrchestrator {
    analyzer: Arc<SentimentAnalyzer>,
    config: BatchConfig,
}

impl BatchOrchestrator {
    pub fn new(analyzer: Arc<SentimentAnalyzer>, config: BatchConfig) -> Self {
        Self { analyzer, config }
    }

    pub async fn run(&self, items: &[Item]) -> Vec<AnalysisResult> {
        let total = items.len();
        if total == 0 {
            return Vec::new();
        }

        let semaphore = Arc::new(Semaphore::new(self.config.max_workers));

        let pb = ProgressBar::new(total as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} items")
                .unwrap()
                .progress_chars("#>-"),
        );

        let progress_interval = std::cmp::max(1, total / 5);
        let completed = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let mut handles = Vec::with_capacity(total);

        for (index, item) in items.iter().enumerate() {
            let sem = semaphore.clone();
            let analyzer = self.analyzer.clone();
            let text = item.text();
            let kind = item.kind;
            let id = item.id.clone();
            let pb = pb.clone();
            let completed = completed.clone();

            handles.push(tokio::spawn(async move {
                let _permit = sem.acquire_owned().await.expect("semaphore closed");

                let result = match analyzer.analyze(&text, kind).await {
                    Ok(analysis) => analysis,
                    Err(err) => {
                        tracing::warn!("Analysis failed for item {}: {}", id, err);
                        analyzer.empty_result()
                    }
                };

                pb.inc(1);
                let done = completed.fetch_add(1, std::sync::atomic::Ordering::SeqCst) + 1;
                if done % progress_interval == 0 || done == total {
                    tracing::info!("Batch progress: {}/{} items processed", done, total);
                }

                (index, result)
            }));

            // Pacing applies to submission, not completion: even with a
            // wide pool, requests enter the system at a bounded rate.
            if index + 1 < total && !self.config.request_delay.is_zero() {
                tokio::time::sleep(self.config.request_delay).await;
            }
        }

        let mut slots: Vec<Option<AnalysisResult>> = Vec::with_capacity(total);
        slots.resize_with(total, || None);

        for handle in join_all(handles).await {
            match handle {
                Ok((index, result)) => {
                    slots[index] = Some(result);
                }
                Err(err) => {
                    // A panicked worker degrades like any other item-level
                    // failure; its slot is backfilled below.
                    tracing::error!("Batch worker panicked: {}", err);
                }
            }
        }

        pb.finish_with_message("Batch analysis complete");

        slots
            .into_iter()
            .map(|slot| slot.unwrap_or_else(|| self.analyzer.empty_result()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use serde_json::{json, Value};

    use super::*;
    use crate::config::AnalysisConfig;
    use crate::error::{Error, Result};
    use crate::llm::LlmProvider;
    use crate::models::{ItemKind, ItemMetadata, Sentiment};

    /// Fails every prompt containing the word "broken"; answers the rest
    /// with a sentiment keyed on a marker word that appears nowhere in the
    /// prompt template.
    struct ScriptedProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        async fn generate(&self, prompt: &str) -> Result<Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if prompt.contains("broken") {
                return Err(Error::Provider {
                    status: 500,
                    message: "boom".into(),
                });
            }
            let sentiment = if prompt.contains("splendid") {
                "positive"
            } else {
                "negative"
            };
            Ok(json!({
                "overall_sentiment": sentiment,
                "reasoning": "scripted"
            }))
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    fn item(id: &str, body: &str) -> Item {
        Item {
            id: id.into(),
            title: String::new(),
            body: body.into(),
            kind: ItemKind::Comment,
            metadata: ItemMetadata::default(),
        }
    }

    fn orchestrator(workers: usize) -> (BatchOrchestrator, Arc<ScriptedProvider>) {
        let provider = Arc::new(ScriptedProvider {
            calls: AtomicUsize::new(0),
        });
        let analyzer = Arc::new(SentimentAnalyzer::new(
            provider.clone(),
            AnalysisConfig::default(),
        ));
        let config = BatchConfig {
            max_workers: workers,
            request_delay: Duration::ZERO,
        };
        (BatchOrchestrator::new(analyzer, config), provider)
    }

    #[tokio::test]
    async fn results_match_input_order_with_mid_batch_failure() {
        let (orchestrator, _) = orchestrator(2);
        let items = vec![
            item("a", "a splendid dashboard"),
            item("b", "this one is broken"),
            item("c", "terrible clickbait ads"),
        ];

        let results = orchestrator.run(&items).await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].overall_sentiment, Sentiment::Positive);
        // The failed item degrades to the canonical empty result in place.
        assert_eq!(results[1].overall_sentiment, Sentiment::Neutral);
        assert_eq!(results[1].reasoning, "Empty or invalid text");
        assert_eq!(results[2].overall_sentiment, Sentiment::Negative);
    }

    #[tokio::test]
    async fn empty_batch_returns_empty() {
        let (orchestrator, provider) = orchestrator(2);
        let results = orchestrator.run(&[]).await;
        assert!(results.is_empty());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn every_item_gets_exactly_one_result() {
        let (orchestrator, provider) = orchestrator(3);
        let items: Vec<Item> = (0..17)
            .map(|i| item(&format!("item{i}"), "splendid indeed"))
            .collect();

        let results = orchestrator.run(&items).await;

        assert_eq!(results.len(), 17);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 17);
        assert!(results
            .iter()
            .all(|r| r.overall_sentiment == Sentiment::Positive));
    }

    #[tokio::test(start_paused = true)]
    async fn submission_pacing_is_honored() {
        let provider = Arc::new(ScriptedProvider {
            calls: AtomicUsize::new(0),
        });
        let analyzer = Arc::new(SentimentAnalyzer::new(
            provider.clone(),
            AnalysisConfig::default(),
        ));
        let orchestrator = BatchOrchestrator::new(
            analyzer,
            BatchConfig {
                max_workers: 4,
                request_delay: Duration::from_millis(250),
            },
        );

        let items: Vec<Item> = (0..5).map(|i| item(&format!("i{i}"), "splendid")).collect();
        let started = tokio::time::Instant::now();
        let results = orchestrator.run(&items).await;

        // Four inter-submission pauses of 250ms under a paused clock.
        assert!(started.elapsed() >= Duration::from_millis(1000));
        assert_eq!(results.len(), 5);
    }
}
