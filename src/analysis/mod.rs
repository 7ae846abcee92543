pub mod analyzer;
pub mod batch;
pub mod pipeline;
pub mod repair;

pub use analyzer::SentimentAnalyzer;
pub use batch::BatchOrchestrator;
pub use pipeline::SentimentPipeline;
