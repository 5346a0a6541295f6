mod aggregator;
mod analyze;
pub mod filter;
pub mod report;

pub use aggregator::StatsAggregator;
pub use analyze::{sample_std_dev, AggregationError};
pub use report::{FileReporter, Reporter};
