use std::sync::Arc;

use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::llm::prompts::build_sentiment_prompt;
use crate::llm::LlmProvider;
use crate::models::{AnalysisResult, ItemKind};

use super::repair;

/// Single-item semantic analysis: prompt construction, one gateway call,
/// schema repair. Depends only on the [`LlmProvider`] interface, never on
/// a concrete provider.
pub struct SentimentAnalyzer {
    provider: Arc<dyn LlmProvider>,
    config: AnalysisConfig,
}

impl SentimentAnalyzer {
    pub fn new(provider: Arc<dyn LlmProvider>, config: AnalysisConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// The canonical empty result for this analyzer's field set.
    pub fn empty_result(&self) -> AnalysisResult {
        repair::empty_result(&self.config.fields)
    }

    /// Analyze one text. Empty input short-circuits to the canonical empty
    /// result without a network call. Malformed model output is repaired,
    /// never surfaced; the returned `Err` covers only gateway failures
    /// that survived the retry policy.
    pub async fn analyze(&self, text: &str, context: ItemKind) -> Result<AnalysisResult> {
        if text.trim().is_empty() {
            return Ok(self.empty_result());
        }

        let prompt = build_sentiment_prompt(text, context, &self.config.fields);
        let raw = self.provider.generate(&prompt).await?;

        Ok(repair::repair(raw, &self.config.fields))
    }
}
