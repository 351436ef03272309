//! Whole-dataset profiling: detection plus metrics for every column.

use indexmap::IndexMap;
use tracing::debug;

use crate::inference::{DetectorConfig, TypeDetector};
use crate::input::Dataset;
use crate::schema::DatasetProfile;

use super::computer::{MetricsComputer, MetricsConfig};
use super::stats::ColumnSummary;

/// Runs the type detector and metrics computer over each column.
pub struct DatasetProfiler {
    detector: TypeDetector,
    computer: MetricsComputer,
    row_cap: usize,
}

impl DatasetProfiler {
    /// Create a profiler with default configuration.
    pub fn new() -> Self {
        Self::with_config(DetectorConfig::default(), MetricsConfig::default(), 1000)
    }

    /// Create a profiler with custom configuration.
    ///
    /// Only the first `row_cap` rows are profiled.
    pub fn with_config(detector: DetectorConfig, metrics: MetricsConfig, row_cap: usize) -> Self {
        let options = detector.parse_options();
        Self {
            detector: TypeDetector::with_config(detector),
            computer: MetricsComputer::with_config(metrics, options),
            row_cap,
        }
    }

    /// Profile a dataset.
    pub fn profile(&self, dataset: &Dataset) -> DatasetProfile {
        let profiled_rows = dataset.row_count().min(self.row_cap);

        let columns = dataset
            .columns()
            .map(|(name, values)| {
                let values = &values[..profiled_rows];
                let detected_type = self.detector.detect(values);
                debug!(column = name, detected_type = %detected_type, "detected column type");
                self.computer.compute_profile(name, values, detected_type)
            })
            .collect();

        DatasetProfile::new(columns, dataset.row_count(), profiled_rows)
    }

    /// Descriptive statistics per column, over the same rows as [`profile`](Self::profile).
    pub fn summarize(&self, dataset: &Dataset) -> IndexMap<String, ColumnSummary> {
        let profiled_rows = dataset.row_count().min(self.row_cap);
        dataset
            .columns()
            .map(|(name, values)| (name.to_string(), ColumnSummary::compute(&values[..profiled_rows])))
            .collect()
    }
}

impl Default for DatasetProfiler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Value;
    use crate::schema::DetectedType;

    #[test]
    fn test_profile_dataset() {
        let ds = Dataset::from_columns(vec![
            ("email", vec![Value::text("a@b.com"), Value::text("bad")]),
            ("age", vec![Value::text("30"), Value::Null]),
        ])
        .unwrap();

        let profile = DatasetProfiler::new().profile(&ds);
        assert_eq!(profile.columns.len(), 2);
        assert_eq!(profile.row_count, 2);
        assert_eq!(profile.column("age").unwrap().detected_type, DetectedType::Number);
        assert_eq!(profile.column("age").unwrap().missing_pct, 50.0);
    }

    #[test]
    fn test_row_cap() {
        let values: Vec<Value> = (0..10).map(|i| Value::Number(i as f64)).collect();
        let ds = Dataset::from_columns(vec![("n", values)]).unwrap();

        let profiler =
            DatasetProfiler::with_config(DetectorConfig::default(), MetricsConfig::default(), 4);
        let profile = profiler.profile(&ds);
        assert_eq!(profile.profiled_rows, 4);
        assert_eq!(profile.row_count, 10);
    }

    #[test]
    fn test_summarize() {
        let ds = Dataset::from_columns(vec![
            ("age", vec![Value::text("30"), Value::text("40"), Value::Null]),
            ("city", vec![Value::text("Paris"), Value::text("Lyon"), Value::text("Paris")]),
        ])
        .unwrap();

        let summaries = DatasetProfiler::new().summarize(&ds);
        assert!(matches!(summaries["age"], ColumnSummary::Numeric { count: 2, .. }));
        match &summaries["city"] {
            ColumnSummary::Categorical { top, top_count, .. } => {
                assert_eq!(top.as_deref(), Some("Paris"));
                assert_eq!(*top_count, 2);
            }
            other => panic!("expected categorical summary, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_dataset() {
        let profile = DatasetProfiler::new().profile(&Dataset::empty());
        assert!(profile.columns.is_empty());
        assert_eq!(profile.global_score, 0.0);
    }
}
