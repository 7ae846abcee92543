use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
    Mixed,
}

impl Sentiment {
    /// Parse a model-supplied label; anything outside the four canonical
    /// categories is absent.
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "positive" => Some(Sentiment::Positive),
            "neutral" => Some(Sentiment::Neutral),
            "negative" => Some(Sentiment::Negative),
            "mixed" => Some(Sentiment::Mixed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
            Sentiment::Mixed => "mixed",
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSentiment {
    pub sentiment: Sentiment,
    pub confidence: f64,
    pub key_phrases: Vec<String>,
}

impl Default for FieldSentiment {
    fn default() -> Self {
        Self {
            sentiment: Sentiment::Neutral,
            confidence: 0.0,
            key_phrases: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeCases {
    pub is_sarcastic: bool,
    pub has_mixed_sentiment: bool,
    pub is_non_english: bool,
    pub language: String,
    pub is_spam: bool,
}

impl Default for EdgeCases {
    fn default() -> Self {
        Self {
            is_sarcastic: false,
            has_mixed_sentiment: false,
            is_non_english: false,
            language: "en".to_string(),
            is_spam: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub theme: String,
    pub relevance: f64,
}

/// Fully repaired sentiment judgment. Every configured analysis field is
/// present in `field_sentiments`; consumers never check for absence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub overall_sentiment: Sentiment,
    pub field_sentiments: BTreeMap<String, FieldSentiment>,
    pub edge_cases: EdgeCases,
    pub themes: Vec<Theme>,
    pub reasoning: String,
}
