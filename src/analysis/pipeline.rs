use std::sync::Arc;

use crate::config::BatchConfig;
use crate::filter::StagedRouter;
use crate::models::{FilterMetadata, Item, ProcessedItem, ProcessedOutcome};

use super::analyzer::SentimentAnalyzer;
use super::batch::BatchOrchestrator;

/// End-to-end staged pipeline: heuristic routing first, the expensive
/// semantic model only for items the heuristic could not settle.
/// Rejected items are dropped (and counted); auto-accepted items carry
/// synthetic filter metadata and never touch the gateway; needs-review
/// items run through the batch orchestrator. The merged output preserves
/// the input order of every surviving item.
pub struct SentimentPipeline {
    router: StagedRouter,
    orchestrator: BatchOrchestrator,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineStats {
    pub total: usize,
    pub rejected: usize,
    pub auto_accepted: usize,
    pub analyzed: usize,
}

impl SentimentPipeline {
    pub fn new(
        router: StagedRouter,
        analyzer: Arc<SentimentAnalyzer>,
        batch_config: BatchConfig,
    ) -> Self {
        Self {
            router,
            orchestrator: BatchOrchestrator::new(analyzer, batch_config),
        }
    }

    pub async fn run(&self, items: Vec<Item>) -> (Vec<ProcessedItem>, PipelineStats) {
        let total = items.len();

        // Remember each item's submission position so the merged payload
        // can be restored to input order after the buckets are processed.
        let positions: std::collections::HashMap<String, usize> = items
            .iter()
            .enumerate()
            .map(|(i, item)| (item.id.clone(), i))
            .collect();

        tracing::info!("Stage 1: routing {} items through the quick filter", total);
        let outcome = self.router.route(items);

        let stats = PipelineStats {
            total,
            rejected: outcome.rejected.len(),
            auto_accepted: outcome.auto_accepted.len(),
            analyzed: outcome.needs_review.len(),
        };

        let llm_share = stats.analyzed as f64 / std::cmp::max(1, total) as f64;
        tracing::info!(
            "Routing: {} rejected, {} auto-accepted, {} need semantic review ({:.1}% of input reaches the LLM)",
            stats.rejected,
            stats.auto_accepted,
            stats.analyzed,
            llm_share * 100.0
        );

        let mut processed = Vec::with_capacity(stats.auto_accepted + stats.analyzed);

        tracing::info!(
            "Stage 2: tagging {} auto-accepted items (no LLM calls)",
            stats.auto_accepted
        );
        let product_token = self.router.scorer().config().product_token.clone();
        for (item, reason) in outcome.auto_accepted {
            let mentions_product = item.text().to_lowercase().contains(&product_token);
            let metadata = FilterMetadata::auto_accepted(mentions_product, &reason);
            processed.push(ProcessedItem {
                item,
                outcome: ProcessedOutcome::FilterAccepted(metadata),
            });
        }

        tracing::info!(
            "Stage 3: analyzing {} items with the semantic model",
            stats.analyzed
        );
        let results = self.orchestrator.run(&outcome.needs_review).await;
        for (item, analysis) in outcome.needs_review.into_iter().zip(results) {
            processed.push(ProcessedItem {
                item,
                outcome: ProcessedOutcome::Analyzed(analysis),
            });
        }

        processed.sort_by_key(|p| positions.get(&p.item.id).copied().unwrap_or(usize::MAX));

        (processed, stats)
    }
}
