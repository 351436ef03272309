//! Per-column quality metrics and the composite score.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SieveError};
use crate::input::Value;
use crate::inference::recognizers::{self, parse_number, ParseOptions};
use crate::schema::{ColumnProfile, DetectedType};

use super::fuzzy::{near_duplicate_pct, FuzzyConfig};
use super::stats::{percent, StreamingStats};

/// Weights applied to each metric when computing the quality score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityWeights {
    pub missing: f64,
    pub duplicate: f64,
    pub invalid: f64,
    pub outlier: f64,
}

impl Default for QualityWeights {
    fn default() -> Self {
        Self {
            missing: 0.4,
            duplicate: 0.25,
            invalid: 0.25,
            outlier: 0.1,
        }
    }
}

impl QualityWeights {
    /// `clamp(100 - weighted penalty, 0, 100)`.
    pub fn score(&self, missing: f64, duplicate: f64, invalid: f64, outlier: f64) -> f64 {
        let penalty = self.missing * missing
            + self.duplicate * duplicate
            + self.invalid * invalid
            + self.outlier * outlier;
        (100.0 - penalty).clamp(0.0, 100.0)
    }

    /// Weights must be finite, non-negative and not all zero.
    pub fn validate(&self) -> Result<()> {
        let all = [self.missing, self.duplicate, self.invalid, self.outlier];
        if all.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(SieveError::Config(
                "quality weights must be finite and non-negative".to_string(),
            ));
        }
        if all.iter().sum::<f64>() <= 0.0 {
            return Err(SieveError::Config(
                "quality weights must not all be zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Population the outlier percentage is divided by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutlierDenominator {
    /// Count of values that parsed as numbers.
    #[default]
    NumericValues,
    /// Every row of the column, blanks included.
    Rows,
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub weights: QualityWeights,
    /// |z| above this marks an outlier.
    pub outlier_z_threshold: f64,
    pub outlier_denominator: OutlierDenominator,
    pub fuzzy: FuzzyConfig,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            weights: QualityWeights::default(),
            outlier_z_threshold: 3.0,
            outlier_denominator: OutlierDenominator::default(),
            fuzzy: FuzzyConfig::default(),
        }
    }
}

/// Computes a [`ColumnProfile`] from a column's values and detected type.
pub struct MetricsComputer {
    config: MetricsConfig,
    options: ParseOptions,
}

impl MetricsComputer {
    /// Create a computer with default configuration.
    pub fn new() -> Self {
        Self::with_config(MetricsConfig::default(), ParseOptions::default())
    }

    /// Create a computer with custom configuration.
    pub fn with_config(config: MetricsConfig, options: ParseOptions) -> Self {
        Self { config, options }
    }

    /// Profile one column. Never fails: bad cells only move the metrics.
    pub fn compute_profile(
        &self,
        name: &str,
        values: &[Value],
        detected_type: DetectedType,
    ) -> ColumnProfile {
        let total = values.len();

        let missing_pct = percent(values.iter().filter(|v| v.is_blank()).count(), total);
        let duplicate_pct = percent(duplicate_count(values), total);
        let invalid_pct = percent(self.invalid_count(values, detected_type), total);
        let outlier_pct = if detected_type == DetectedType::Number {
            self.outlier_pct(values)
        } else {
            0.0
        };

        let near_duplicate_pct = (self.config.fuzzy.enabled
            && detected_type == DetectedType::Text)
            .then(|| near_duplicate_pct(values, &self.config.fuzzy));

        let quality_score =
            self.config
                .weights
                .score(missing_pct, duplicate_pct, invalid_pct, outlier_pct);

        ColumnProfile {
            name: name.to_string(),
            detected_type,
            missing_pct,
            duplicate_pct,
            invalid_pct,
            outlier_pct,
            quality_score,
            near_duplicate_pct,
        }
    }

    fn invalid_count(&self, values: &[Value], detected_type: DetectedType) -> usize {
        if !detected_type.is_validated() {
            return 0;
        }
        values
            .iter()
            .filter(|v| !v.is_blank())
            .filter(|v| !recognizers::validate(detected_type, v, self.options))
            .count()
    }

    fn outlier_pct(&self, values: &[Value]) -> f64 {
        let numbers: Vec<f64> = values
            .iter()
            .filter(|v| !v.is_blank())
            .filter_map(parse_number)
            .collect();

        let denominator = match self.config.outlier_denominator {
            OutlierDenominator::NumericValues => numbers.len(),
            OutlierDenominator::Rows => values.len(),
        };

        let stats: StreamingStats = numbers.iter().copied().collect();
        let std = stats.std_dev();
        if numbers.is_empty() || std == 0.0 || !std.is_finite() {
            return 0.0;
        }

        let mean = stats.mean();
        let threshold = self.config.outlier_z_threshold;
        let outliers = numbers
            .iter()
            .filter(|&&x| ((x - mean) / std).abs() > threshold)
            .count();

        percent(outliers, denominator)
    }
}

impl Default for MetricsComputer {
    fn default() -> Self {
        Self::new()
    }
}

/// Cells whose key already appeared earlier; every blank shares one key.
fn duplicate_count(values: &[Value]) -> usize {
    let mut seen: HashSet<Option<String>> = HashSet::with_capacity(values.len());
    values.iter().filter(|v| !seen.insert(v.key())).count()
}
