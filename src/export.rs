use std::fs;
use std::path::{Path, PathBuf};

use crate::aggregate::engine::TrendBucket;
use crate::aggregate::SummaryReport;
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::models::{ProcessedItem, Sentiment};

/// Paths of everything a run wrote, for the closing console summary.
#[derive(Debug)]
pub struct ExportedFiles {
    pub detailed_results: PathBuf,
    pub summary: PathBuf,
    pub distributions: PathBuf,
    pub trends: Option<PathBuf>,
    pub themes: PathBuf,
}

pub fn write_outputs(
    output_dir: &Path,
    items: &[ProcessedItem],
    report: &SummaryReport,
    trends: &[TrendBucket],
    config: &AnalysisConfig,
) -> Result<ExportedFiles> {
    fs::create_dir_all(output_dir)?;

    let detailed_results = output_dir.join("sentiment_results.json");
    fs::write(&detailed_results, serde_json::to_string_pretty(items)?)?;
    tracing::info!("Saved detailed results to {}", detailed_results.display());

    let summary = output_dir.join("summary_report.json");
    fs::write(&summary, serde_json::to_string_pretty(report)?)?;
    tracing::info!("Saved summary report to {}", summary.display());

    let distributions = output_dir.join("field_distributions.csv");
    write_distributions_csv(&distributions, report)?;
    tracing::info!("Saved field distributions to {}", distributions.display());

    let trends_path = if trends.is_empty() {
        tracing::info!("No time-based trends to save (insufficient dated items)");
        None
    } else {
        let path = output_dir.join("sentiment_trends.csv");
        write_trends_csv(&path, trends, config)?;
        tracing::info!("Saved trends to {}", path.display());
        Some(path)
    };

    let themes = output_dir.join("top_themes.json");
    fs::write(
        &themes,
        serde_json::to_string_pretty(&report.top_themes_by_field)?,
    )?;
    tracing::info!("Saved top themes to {}", themes.display());

    Ok(ExportedFiles {
        detailed_results,
        summary,
        distributions,
        trends: trends_path,
        themes,
    })
}

const SENTIMENT_COLUMNS: [Sentiment; 4] = [
    Sentiment::Positive,
    Sentiment::Neutral,
    Sentiment::Negative,
    Sentiment::Mixed,
];

fn write_distributions_csv(path: &Path, report: &SummaryReport) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;

    let mut header = vec!["field".to_string()];
    header.extend(SENTIMENT_COLUMNS.iter().map(|s| format!("{}_pct", s)));
    header.push("total_mentions".to_string());
    writer.write_record(&header)?;

    for (field, dist) in &report.field_distributions {
        let mut record = vec![field.clone()];
        for sentiment in &SENTIMENT_COLUMNS {
            let pct = dist.shares.get(sentiment).copied().unwrap_or(0.0);
            record.push(format!("{:.1}", pct));
        }
        record.push(dist.total_mentions.to_string());
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

fn write_trends_csv(path: &Path, trends: &[TrendBucket], config: &AnalysisConfig) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;

    let mut header = vec![
        "period".to_string(),
        "total_items".to_string(),
        "avg_score".to_string(),
    ];
    for sentiment in &SENTIMENT_COLUMNS {
        header.push(format!("overall_{}_pct", sentiment));
    }
    for field in &config.fields {
        header.push(format!("{}_mentions", field));
        for sentiment in &SENTIMENT_COLUMNS {
            header.push(format!("{}_{}_pct", field, sentiment));
        }
    }
    writer.write_record(&header)?;

    for bucket in trends {
        let mut record = vec![
            bucket.period.to_string(),
            bucket.total_items.to_string(),
            format!("{:.2}", bucket.avg_score),
        ];
        for sentiment in &SENTIMENT_COLUMNS {
            let pct = bucket.overall.get(sentiment).copied().unwrap_or(0.0);
            record.push(format!("{:.1}", pct));
        }
        for field in &config.fields {
            match bucket.fields.get(field) {
                Some(trend) => {
                    record.push(trend.mentions.to_string());
                    for sentiment in &SENTIMENT_COLUMNS {
                        let pct = trend.shares.get(sentiment).copied().unwrap_or(0.0);
                        record.push(format!("{:.1}", pct));
                    }
                }
                None => {
                    record.push("0".to_string());
                    for _ in &SENTIMENT_COLUMNS {
                        record.push(String::new());
                    }
                }
            }
        }
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}
