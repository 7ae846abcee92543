use std::collections::BTreeMap;
use std::collections::HashMap;

use serde::Serialize;

use crate::config::AnalysisConfig;
use crate::models::{ItemKind, ProcessedItem, Sentiment};

use super::engine::{AggregationEngine, FieldDistribution, ThemeSummary};

#[derive(Debug, Clone, Serialize)]
pub struct DateRange {
    pub earliest: i64,
    pub latest: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Totals {
    pub total_items: usize,
    pub total_posts: usize,
    pub total_comments: usize,
    pub unique_communities: usize,
    pub date_range: DateRange,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct EdgeCaseCounts {
    pub sarcastic_count: usize,
    pub mixed_sentiment_count: usize,
    pub non_english_count: usize,
    pub spam_count: usize,
}

/// One-shot roll-up of a processed run, ready for JSON export and the
/// console summary.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryReport {
    pub totals: Totals,
    pub overall_sentiment_distribution: BTreeMap<Sentiment, f64>,
    pub field_distributions: BTreeMap<String, FieldDistribution>,
    pub edge_cases: EdgeCaseCounts,
    /// Top five languages by analyzed-item count.
    pub language_distribution: Vec<(String, usize)>,
    pub top_themes_by_field: BTreeMap<String, Vec<ThemeSummary>>,
}

impl SummaryReport {
    pub fn build(items: &[ProcessedItem], config: &AnalysisConfig) -> Self {
        let engine = AggregationEngine::new(items, config);

        let total_posts = items
            .iter()
            .filter(|p| p.item.kind == ItemKind::Post)
            .count();

        let communities: std::collections::HashSet<&str> = items
            .iter()
            .map(|p| p.item.metadata.community.as_str())
            .collect();

        let timestamps: Vec<i64> = items
            .iter()
            .map(|p| p.item.metadata.created_utc)
            .filter(|ts| *ts != 0)
            .collect();

        let mut edge_cases = EdgeCaseCounts::default();
        let mut languages: HashMap<String, usize> = HashMap::new();
        for item in items {
            if let Some(analysis) = item.analysis() {
                if analysis.edge_cases.is_sarcastic {
                    edge_cases.sarcastic_count += 1;
                }
                if analysis.edge_cases.has_mixed_sentiment {
                    edge_cases.mixed_sentiment_count += 1;
                }
                if analysis.edge_cases.is_non_english {
                    edge_cases.non_english_count += 1;
                }
                if analysis.edge_cases.is_spam {
                    edge_cases.spam_count += 1;
                }
                *languages
                    .entry(analysis.edge_cases.language.clone())
                    .or_insert(0) += 1;
            }
        }

        let mut language_distribution: Vec<(String, usize)> = languages.into_iter().collect();
        language_distribution.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        language_distribution.truncate(5);

        Self {
            totals: Totals {
                total_items: items.len(),
                total_posts,
                total_comments: items.len() - total_posts,
                unique_communities: communities.len(),
                date_range: DateRange {
                    earliest: timestamps.iter().copied().min().unwrap_or(0),
                    latest: timestamps.iter().copied().max().unwrap_or(0),
                },
            },
            overall_sentiment_distribution: engine.overall_distribution(),
            field_distributions: engine.field_distributions(),
            edge_cases,
            language_distribution,
            top_themes_by_field: engine.top_themes(),
        }
    }

    /// Strongest sentiment per field with at least one mention, for the
    /// console summary.
    pub fn top_sentiment_per_field(&self) -> Vec<(String, Sentiment, f64, usize)> {
        self.field_distributions
            .iter()
            .filter(|(_, dist)| dist.total_mentions > 0)
            .filter_map(|(field, dist)| {
                dist.shares
                    .iter()
                    .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
                    .map(|(sentiment, pct)| {
                        (field.clone(), *sentiment, *pct, dist.total_mentions)
                    })
            })
            .collect()
    }
}
