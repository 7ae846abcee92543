use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::Serialize;

use crate::config::AnalysisConfig;
use crate::models::{ProcessedItem, Sentiment};

/// Read-only aggregation over processed items. Only items that went
/// through full semantic analysis contribute; auto-accepted items carry
/// filter metadata, not sentiment, and are skipped.
pub struct AggregationEngine<'a> {
    items: &'a [ProcessedItem],
    config: &'a AnalysisConfig,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FieldDistribution {
    /// Percentage per sentiment over qualifying mentions.
    pub shares: BTreeMap<Sentiment, f64>,
    pub total_mentions: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ThemeQuote {
    pub text: String,
    pub sentiment: Sentiment,
    pub score: i64,
    pub link: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ThemeSummary {
    pub theme: String,
    pub frequency: usize,
    pub representative_quotes: Vec<ThemeQuote>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendPeriod {
    Day,
    Week,
}

impl std::str::FromStr for TrendPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "day" => Ok(TrendPeriod::Day),
            "week" => Ok(TrendPeriod::Week),
            other => Err(format!("unknown trend period: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldTrend {
    pub mentions: usize,
    pub shares: BTreeMap<Sentiment, f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendBucket {
    pub period: NaiveDate,
    pub total_items: usize,
    pub avg_score: f64,
    pub overall: BTreeMap<Sentiment, f64>,
    /// Only fields with at least one qualifying mention in the bucket.
    pub fields: BTreeMap<String, FieldTrend>,
}

impl<'a> AggregationEngine<'a> {
    pub fn new(items: &'a [ProcessedItem], config: &'a AnalysisConfig) -> Self {
        Self { items, config }
    }

    fn analyzed(&self) -> impl Iterator<Item = &ProcessedItem> {
        self.items.iter().filter(|p| p.analysis().is_some())
    }

    /// Overall sentiment distribution as percentages over all analyzed
    /// items.
    pub fn overall_distribution(&self) -> BTreeMap<Sentiment, f64> {
        let mut counts: BTreeMap<Sentiment, usize> = BTreeMap::new();
        let mut total = 0usize;

        for item in self.analyzed() {
            let analysis = item.analysis().unwrap();
            *counts.entry(analysis.overall_sentiment).or_insert(0) += 1;
            total += 1;
        }

        percentages(&counts, total)
    }

    /// Per-field distribution restricted to entries above the low
    /// confidence threshold. Every configured field is present; fields
    /// with no qualifying mentions report zero.
    pub fn field_distributions(&self) -> BTreeMap<String, FieldDistribution> {
        let mut distributions = BTreeMap::new();

        for field in &self.config.fields {
            let mut counts: BTreeMap<Sentiment, usize> = BTreeMap::new();
            let mut total = 0usize;

            for item in self.analyzed() {
                let analysis = item.analysis().unwrap();
                if let Some(fs) = analysis.field_sentiments.get(field) {
                    if fs.confidence > self.config.low_confidence_threshold {
                        *counts.entry(fs.sentiment).or_insert(0) += 1;
                        total += 1;
                    }
                }
            }

            distributions.insert(
                field.clone(),
                FieldDistribution {
                    shares: percentages(&counts, total),
                    total_mentions: total,
                },
            );
        }

        distributions
    }

    /// Top themes per field, built from key phrases of confident entries.
    /// Ranked by (frequency, summed source score) descending; each theme
    /// keeps its top quotes by score. Fields with no qualifying phrases
    /// are omitted.
    pub fn top_themes(&self) -> BTreeMap<String, Vec<ThemeSummary>> {
        let mut by_field: BTreeMap<String, BTreeMap<String, Vec<ThemeQuote>>> = BTreeMap::new();

        for item in self.analyzed() {
            let analysis = item.analysis().unwrap();
            for field in &self.config.fields {
                let Some(fs) = analysis.field_sentiments.get(field) else {
                    continue;
                };
                if fs.confidence <= self.config.medium_confidence_threshold {
                    continue;
                }

                // Only the first couple of phrases per item; models repeat
                // themselves past that.
                for phrase in fs.key_phrases.iter().take(2) {
                    let text: String = item.item.text().chars().take(200).collect();
                    by_field
                        .entry(field.clone())
                        .or_default()
                        .entry(phrase.clone())
                        .or_default()
                        .push(ThemeQuote {
                            text,
                            sentiment: fs.sentiment,
                            score: item.item.metadata.score,
                            link: item.item.metadata.url.clone(),
                        });
                }
            }
        }

        let mut top = BTreeMap::new();
        for (field, themes) in by_field {
            let mut ranked: Vec<(String, Vec<ThemeQuote>)> = themes.into_iter().collect();
            ranked.sort_by_key(|(_, quotes)| {
                let score_sum: i64 = quotes.iter().map(|q| q.score).sum();
                std::cmp::Reverse((quotes.len(), score_sum))
            });
            ranked.truncate(self.config.top_themes);

            let summaries = ranked
                .into_iter()
                .map(|(theme, mut quotes)| {
                    let frequency = quotes.len();
                    quotes.sort_by_key(|q| std::cmp::Reverse(q.score));
                    quotes.truncate(3);
                    ThemeSummary {
                        theme,
                        frequency,
                        representative_quotes: quotes,
                    }
                })
                .collect();

            top.insert(field, summaries);
        }

        top
    }

    /// Sentiment trends bucketed by day or ISO week (the bucket key is
    /// the week's Monday). Items without a timestamp are skipped; empty
    /// buckets are omitted rather than zero-filled.
    pub fn trends(&self, period: TrendPeriod) -> Vec<TrendBucket> {
        let mut buckets: BTreeMap<NaiveDate, Vec<&ProcessedItem>> = BTreeMap::new();

        for item in self.analyzed() {
            let ts = item.item.metadata.created_utc;
            if ts == 0 {
                continue;
            }
            let Some(date) = DateTime::<Utc>::from_timestamp(ts, 0) else {
                continue;
            };
            let date = date.date_naive();
            let key = match period {
                TrendPeriod::Day => date,
                TrendPeriod::Week => {
                    date - Duration::days(date.weekday().num_days_from_monday() as i64)
                }
            };
            buckets.entry(key).or_default().push(item);
        }

        buckets
            .into_iter()
            .map(|(period, members)| self.build_bucket(period, &members))
            .collect()
    }

    fn build_bucket(&self, period: NaiveDate, members: &[&ProcessedItem]) -> TrendBucket {
        let total_items = members.len();

        let mut overall_counts: BTreeMap<Sentiment, usize> = BTreeMap::new();
        let mut score_sum = 0i64;
        for member in members {
            let analysis = member.analysis().unwrap();
            *overall_counts
                .entry(analysis.overall_sentiment)
                .or_insert(0) += 1;
            score_sum += member.item.metadata.score;
        }

        let mut fields = BTreeMap::new();
        for field in &self.config.fields {
            let mut counts: BTreeMap<Sentiment, usize> = BTreeMap::new();
            let mut mentions = 0usize;
            for member in members {
                let analysis = member.analysis().unwrap();
                if let Some(fs) = analysis.field_sentiments.get(field) {
                    if fs.confidence > self.config.low_confidence_threshold {
                        *counts.entry(fs.sentiment).or_insert(0) += 1;
                        mentions += 1;
                    }
                }
            }
            if mentions > 0 {
                fields.insert(
                    field.clone(),
                    FieldTrend {
                        mentions,
                        shares: percentages(&counts, mentions),
                    },
                );
            }
        }

        TrendBucket {
            period,
            total_items,
            avg_score: score_sum as f64 / total_items.max(1) as f64,
            overall: percentages(&overall_counts, total_items),
            fields,
        }
    }
}

fn percentages(counts: &BTreeMap<Sentiment, usize>, total: usize) -> BTreeMap<Sentiment, f64> {
    if total == 0 {
        return BTreeMap::new();
    }
    counts
        .iter()
        .map(|(sentiment, count)| (*sentiment, (*count as f64 / total as f64) * 100.0))
        .collect()
}
