pub mod engine;
pub mod report;

pub use engine::{AggregationEngine, TrendPeriod};
pub use report::SummaryReport;
