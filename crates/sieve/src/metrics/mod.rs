//! Quality metrics, descriptive statistics, and dataset profiling.

mod computer;
pub mod fuzzy;
mod profiler;
mod stats;

pub use computer::{MetricsComputer, MetricsConfig, OutlierDenominator, QualityWeights};
pub use fuzzy::FuzzyConfig;
pub use profiler::DatasetProfiler;
pub use stats::{ColumnSummary, StreamingStats};
