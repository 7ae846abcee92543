use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use brandpulse::aggregate::{AggregationEngine, SummaryReport, TrendPeriod};
use brandpulse::analysis::{SentimentAnalyzer, SentimentPipeline};
use brandpulse::config::{AnalysisConfig, BatchConfig, Config, FilterConfig, ProviderKind};
use brandpulse::filter::{RelevanceScorer, StagedRouter};
use brandpulse::llm::{GeminiProvider, LlmProvider, OpenAiProvider, RetryPolicy};
use brandpulse::{export, ingest};

#[derive(Parser, Debug)]
#[command(name = "brandpulse")]
#[command(version = "0.1.0")]
#[command(about = "Analyze brand sentiment in social media posts and comments")]
struct Args {
    /// Path to the ingestion dump JSON
    #[arg(short, long)]
    input: PathBuf,

    /// Directory for result files
    #[arg(short, long, default_value = "output")]
    output_dir: PathBuf,

    /// Limit number of items to process (for testing)
    #[arg(long)]
    limit: Option<usize>,

    /// Override the configured model identifier
    #[arg(long)]
    model: Option<String>,

    /// Trend bucketing: day or week
    #[arg(long, default_value = "week")]
    period: TrendPeriod,

    /// Auto-accept threshold for the quick filter
    #[arg(long)]
    auto_accept_threshold: Option<f64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("brandpulse=info".parse()?)
                .add_directive("reqwest=warn".parse()?),
        )
        .init();

    dotenvy::dotenv().ok();

    let args = Args::parse();
    let config = Config::from_env()?;

    let retry = RetryPolicy {
        max_attempts: config.max_retries,
        initial_delay: config.retry_delay,
        max_delay: config.max_retry_delay,
    };

    let provider: Arc<dyn LlmProvider> = match config.provider {
        ProviderKind::OpenAi => Arc::new(OpenAiProvider::new(
            config.openai_api_key.clone(),
            args.model.clone().unwrap_or_else(|| config.openai_model.clone()),
            config.request_timeout,
            retry,
        )?),
        ProviderKind::Gemini => Arc::new(GeminiProvider::new(
            config.gemini_api_key.clone(),
            args.model.clone().unwrap_or_else(|| config.gemini_model.clone()),
            config.request_timeout,
            retry,
        )?),
    };

    tracing::info!(
        "LLM provider: {} (workers={}, request delay={:?})",
        provider.name(),
        config.max_workers,
        config.request_delay
    );

    tracing::info!("Loading dump from {}", args.input.display());
    let dump = ingest::load_dump(&args.input)?;
    let mut items = ingest::extract_items(&dump);
    tracing::info!("Extracted {} unique items", items.len());

    if let Some(limit) = args.limit {
        items.truncate(limit);
        tracing::info!("Limited to {} items", items.len());
    }

    let analysis_config = AnalysisConfig::default();
    let analyzer = Arc::new(SentimentAnalyzer::new(
        provider,
        analysis_config.clone(),
    ));
    let router = StagedRouter::new(
        RelevanceScorer::new(FilterConfig::default()),
        args.auto_accept_threshold
            .unwrap_or(config.auto_accept_threshold),
    );
    let pipeline = SentimentPipeline::new(router, analyzer, BatchConfig::from(&config));

    let (processed, stats) = pipeline.run(items).await;

    let report = SummaryReport::build(&processed, &analysis_config);
    let trends = AggregationEngine::new(&processed, &analysis_config).trends(args.period);
    let files = export::write_outputs(
        &args.output_dir,
        &processed,
        &report,
        &trends,
        &analysis_config,
    )?;

    print_summary(&report, &stats, &files);

    Ok(())
}

fn print_summary(
    report: &SummaryReport,
    stats: &brandpulse::analysis::pipeline::PipelineStats,
    files: &export::ExportedFiles,
) {
    let mut output = String::new();

    output.push_str("\n=== Sentiment Analysis Summary ===\n\n");
    output.push_str(&format!("Items routed: {}\n", stats.total));
    output.push_str(&format!("  Rejected by filter: {}\n", stats.rejected));
    output.push_str(&format!("  Auto-accepted: {}\n", stats.auto_accepted));
    output.push_str(&format!("  Semantically analyzed: {}\n", stats.analyzed));

    output.push_str(&format!(
        "\nPosts: {}  Comments: {}  Communities: {}\n",
        report.totals.total_posts,
        report.totals.total_comments,
        report.totals.unique_communities
    ));

    if !report.overall_sentiment_distribution.is_empty() {
        output.push_str("\nOverall sentiment:\n");
        for (sentiment, pct) in &report.overall_sentiment_distribution {
            output.push_str(&format!("  {}: {:.1}%\n", sentiment, pct));
        }
    }

    output.push_str("\nEdge cases detected:\n");
    output.push_str(&format!(
        "  Sarcastic: {}\n",
        report.edge_cases.sarcastic_count
    ));
    output.push_str(&format!(
        "  Mixed sentiment: {}\n",
        report.edge_cases.mixed_sentiment_count
    ));
    output.push_str(&format!(
        "  Non-English: {}\n",
        report.edge_cases.non_english_count
    ));
    output.push_str(&format!("  Spam/bots: {}\n", report.edge_cases.spam_count));

    let tops = report.top_sentiment_per_field();
    if !tops.is_empty() {
        output.push_str("\nTop sentiment by field:\n");
        for (field, sentiment, pct, mentions) in tops {
            output.push_str(&format!(
                "  {}: {} ({:.1}%) [{} mentions]\n",
                field, sentiment, pct, mentions
            ));
        }
    }

    output.push_str("\nOutput files:\n");
    output.push_str(&format!("  results: {}\n", files.detailed_results.display()));
    output.push_str(&format!("  summary: {}\n", files.summary.display()));
    output.push_str(&format!(
        "  distributions: {}\n",
        files.distributions.display()
    ));
    if let Some(trends) = &files.trends {
        output.push_str(&format!("  trends: {}\n", trends.display()));
    }
    output.push_str(&format!("  themes: {}\n", files.themes.display()));

    println!("{}", output);
}
