use std::collections::HashSet;
use std::env;
use std::time::Duration;

use crate::error::{Error, Result};

/// The six aspects every analysis result covers. Repair backfills any the
/// model leaves out, so downstream code can index them unconditionally.
pub const DEFAULT_ANALYSIS_FIELDS: [&str; 6] = [
    "product_quality",
    "user_experience",
    "business_practices",
    "financial_performance",
    "publisher_relations",
    "advertiser_value",
];

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-5.1";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAi,
    Gemini,
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::OpenAi => write!(f, "openai"),
            ProviderKind::Gemini => write!(f, "gemini"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub provider: ProviderKind,
    pub openai_api_key: String,
    pub openai_model: String,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub max_workers: usize,
    pub request_delay: Duration,
    pub request_timeout: Duration,
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub max_retry_delay: Duration,
    pub auto_accept_threshold: f64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let provider = match env::var("LLM_PROVIDER")
            .unwrap_or_else(|_| "openai".to_string())
            .to_lowercase()
            .as_str()
        {
            "openai" => ProviderKind::OpenAi,
            "gemini" => ProviderKind::Gemini,
            other => {
                return Err(Error::Config(format!("Unknown LLM provider: {}", other)));
            }
        };

        let openai_api_key = env::var("OPENAI_API_KEY").unwrap_or_default();
        let gemini_api_key = env::var("GEMINI_API_KEY").unwrap_or_default();

        // The selected provider must have a credential before any batch
        // work starts; the other provider's key may be absent.
        match provider {
            ProviderKind::OpenAi if openai_api_key.is_empty() => {
                return Err(Error::Config(
                    "OPENAI_API_KEY environment variable not set".to_string(),
                ));
            }
            ProviderKind::Gemini if gemini_api_key.is_empty() => {
                return Err(Error::Config(
                    "GEMINI_API_KEY environment variable not set".to_string(),
                ));
            }
            _ => {}
        }

        let openai_model =
            env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_OPENAI_MODEL.to_string());
        let gemini_model =
            env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string());

        let max_workers = env::var("LLM_MAX_WORKERS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(2);

        let request_delay = env::var("LLM_REQUEST_DELAY")
            .ok()
            .and_then(|v| v.parse::<f64>().ok())
            .map(Duration::from_secs_f64)
            .unwrap_or(Duration::from_millis(250));

        let request_timeout = env::var("LLM_TIMEOUT")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(60));

        Ok(Self {
            provider,
            openai_api_key,
            openai_model,
            gemini_api_key,
            gemini_model,
            max_workers,
            request_delay,
            request_timeout,
            max_retries: 3,
            retry_delay: Duration::from_secs(2),
            max_retry_delay: Duration::from_secs(60),
            auto_accept_threshold: 0.8,
        })
    }
}

/// Heuristic-filter vocabulary. All of it is data, not logic: the defaults
/// reproduce the Taboola social-listening deployment, and a caller tracking a
/// different brand swaps the lists without touching the scorer.
#[derive(Debug, Clone)]
pub struct FilterConfig {
    pub brand_tokens: Vec<String>,
    pub product_token: String,
    pub generic_phrases: Vec<String>,
    pub strong_indicators: Vec<String>,
    pub relevant_terms: Vec<String>,
    pub relevant_communities: HashSet<String>,
    pub min_content_length: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        Self {
            brand_tokens: owned(&["taboola"]),
            product_token: "realize".to_string(),
            generic_phrases: owned(&[
                "i realize",
                "i realized",
                "just realized",
                "didn't realize",
                "don't realize",
                "never realized",
                "finally realized",
                "suddenly realized",
                "now realize",
                "people realize",
                "you realize",
                "we realize",
                "they realize",
            ]),
            strong_indicators: owned(&[
                "taboola realize",
                "realize by taboola",
                "taboola's realize",
                "taboola platform",
                "taboola widget",
                "taboola advertising",
                "taboola ad",
                "taboola sponsored",
                "work at taboola",
                "working for taboola",
                "taboola sucks",
                "taboola spam",
                "block taboola",
                "remove taboola",
                "taboola monetization",
                "taboola revenue",
            ]),
            relevant_terms: owned(&[
                "advertising",
                "ad network",
                "sponsored",
                "native ad",
                "monetize",
                "monetization",
                "revenue",
                "publisher",
                "cpc",
                "cpm",
                "impressions",
                "clicks",
                "outbrain",
                "revcontent",
                "mgid",
                "widget",
                "recommendation",
                "content discovery",
                "banner",
                "display",
                "campaign",
            ]),
            relevant_communities: [
                "advertising",
                "adops",
                "marketing",
                "digital_marketing",
                "webdev",
                "web_design",
                "blogging",
                "contentcreation",
                "entrepreneur",
                "smallbusiness",
                "ppc",
                "seo",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            min_content_length: 150,
        }
    }
}

/// Aggregation-side knobs. The confidence cut-offs are asymmetric on
/// purpose: distributions admit anything above the low bar, themes only
/// above the medium one.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub fields: Vec<String>,
    pub low_confidence_threshold: f64,
    pub medium_confidence_threshold: f64,
    pub top_themes: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            fields: DEFAULT_ANALYSIS_FIELDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            low_confidence_threshold: 0.3,
            medium_confidence_threshold: 0.45,
            top_themes: 3,
        }
    }
}

/// Narrowed view of [`Config`] for the batch orchestrator.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub max_workers: usize,
    pub request_delay: Duration,
}

impl From<&Config> for BatchConfig {
    fn from(config: &Config) -> Self {
        Self {
            max_workers: config.max_workers.max(1),
            request_delay: config.request_delay,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_config_keeps_brand_vocabulary() {
        let config = FilterConfig::default();
        assert!(config.brand_tokens.contains(&"taboola".to_string()));
        assert!(config
            .strong_indicators
            .contains(&"taboola realize".to_string()));
        assert!(config.relevant_communities.contains("adops"));
        assert_eq!(config.min_content_length, 150);
    }

    #[test]
    fn analysis_config_has_canonical_fields() {
        let config = AnalysisConfig::default();
        assert_eq!(config.fields.len(), 6);
        assert!(config.fields.iter().any(|f| f == "product_quality"));
        assert!(config.low_confidence_threshold < config.medium_confidence_threshold);
    }
}
