pub mod aggregate;
pub mod analysis;
pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod ingest;
pub mod llm;
pub mod models;

pub use aggregate::{AggregationEngine, SummaryReport, TrendPeriod};
pub use analysis::{BatchOrchestrator, SentimentAnalyzer, SentimentPipeline};
pub use config::{AnalysisConfig, BatchConfig, Config, FilterConfig, ProviderKind};
pub use error::{Error, Result};
pub use filter::{RelevanceScorer, StagedRouter};
pub use llm::{GeminiProvider, LlmProvider, OpenAiProvider};
