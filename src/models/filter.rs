use serde::{Deserialize, Serialize};

/// Verdict of the heuristic relevance scorer for a single item. `reason`
/// names the phrase/term/signal that fired, for audit logging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub accept: bool,
    pub confidence: f64,
    pub reason: String,
}

impl ScoreResult {
    pub fn accept(confidence: f64, reason: impl Into<String>) -> Self {
        Self {
            accept: true,
            confidence,
            reason: reason.into(),
        }
    }

    pub fn reject(confidence: f64, reason: impl Into<String>) -> Self {
        Self {
            accept: false,
            confidence,
            reason: reason.into(),
        }
    }
}

/// Relevance metadata attached to items the heuristic filter accepted with
/// high confidence. Shape-compatible with what a semantic relevance check
/// would produce, but tagged so downstream consumers can tell it apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterMetadata {
    pub is_relevant: bool,
    pub mentions_brand: bool,
    pub mentions_product: bool,
    pub relevance_score: f64,
    pub raw_model_response: String,
    pub filter_auto_accepted: bool,
}

impl FilterMetadata {
    /// Synthetic metadata for an item that bypassed the LLM.
    pub fn auto_accepted(mentions_product: bool, filter_reason: &str) -> Self {
        Self {
            is_relevant: true,
            mentions_brand: true,
            mentions_product,
            relevance_score: 9.0,
            raw_model_response: format!("Auto-accepted by filter: {}", filter_reason),
            filter_auto_accepted: true,
        }
    }
}
