use crate::filter::scorer::RelevanceScorer;
use crate::models::{Item, ScoreResult};

/// Partition of a candidate set into disjoint buckets. Every input item
/// lands in exactly one bucket, in input order. Rejected and auto-accepted
/// items carry the scorer's reason for audit logging.
#[derive(Debug, Default)]
pub struct RoutingOutcome {
    pub rejected: Vec<(Item, String)>,
    pub auto_accepted: Vec<(Item, String)>,
    pub needs_review: Vec<Item>,
}

impl RoutingOutcome {
    pub fn total(&self) -> usize {
        self.rejected.len() + self.auto_accepted.len() + self.needs_review.len()
    }
}

/// Telemetry hooks fired once per routed item. Implementations must not
/// influence routing; the router ignores anything they do.
pub trait RoutingObserver {
    fn on_rejected(&self, _item: &Item, _reason: &str) {}
    fn on_auto_accepted(&self, _item: &Item, _confidence: f64, _reason: &str) {}
    fn on_needs_review(&self, _item: &Item, _confidence: f64, _reason: &str) {}
}

struct LogObserver;

impl RoutingObserver for LogObserver {
    fn on_rejected(&self, item: &Item, reason: &str) {
        tracing::debug!("Rejected {}: {}", item.id, reason);
    }

    fn on_auto_accepted(&self, item: &Item, confidence: f64, reason: &str) {
        tracing::info!("Auto-accept {} (conf={:.2}): {}", item.id, confidence, reason);
    }

    fn on_needs_review(&self, item: &Item, confidence: f64, reason: &str) {
        tracing::info!("Needs review {} (conf={:.2}): {}", item.id, confidence, reason);
    }
}

pub struct StagedRouter {
    scorer: RelevanceScorer,
    auto_accept_threshold: f64,
}

impl StagedRouter {
    pub fn new(scorer: RelevanceScorer, auto_accept_threshold: f64) -> Self {
        Self {
            scorer,
            auto_accept_threshold,
        }
    }

    pub fn scorer(&self) -> &RelevanceScorer {
        &self.scorer
    }

    /// Route with tracing-based telemetry.
    pub fn route(&self, items: Vec<Item>) -> RoutingOutcome {
        self.route_observed(items, &LogObserver)
    }

    pub fn route_observed(
        &self,
        items: Vec<Item>,
        observer: &dyn RoutingObserver,
    ) -> RoutingOutcome {
        let mut outcome = RoutingOutcome::default();

        for item in items {
            let ScoreResult {
                accept,
                confidence,
                reason,
            } = self.scorer.score(&item);

            if !accept {
                observer.on_rejected(&item, &reason);
                outcome.rejected.push((item, reason));
            } else if confidence >= self.auto_accept_threshold {
                observer.on_auto_accepted(&item, confidence, &reason);
                outcome.auto_accepted.push((item, reason));
            } else {
                observer.on_needs_review(&item, confidence, &reason);
                outcome.needs_review.push(item);
            }
        }

        outcome
    }
}
