//! Descriptive column statistics.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::input::Value;
use crate::inference::recognizers::parse_number;

// =============================================================================
// STREAMING STATISTICS
// =============================================================================
// Welford's online algorithm for computing mean and variance in a single pass.

/// Single-pass mean/variance accumulator.
#[derive(Debug, Clone)]
pub struct StreamingStats {
    count: usize,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl StreamingStats {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self {
            count: 0,
            mean: 0.0,
            m2: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    /// Add a value using Welford's online algorithm.
    pub fn add(&mut self, value: f64) {
        self.count += 1;

        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        let delta2 = value - self.mean;
        self.m2 += delta * delta2;

        if value < self.min {
            self.min = value;
        }
        if value > self.max {
            self.max = value;
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Population variance.
    pub fn variance(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.m2 / self.count as f64
        }
    }

    /// Population standard deviation.
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> Option<f64> {
        (self.count > 0).then_some(self.min)
    }

    pub fn max(&self) -> Option<f64> {
        (self.count > 0).then_some(self.max)
    }
}

impl Default for StreamingStats {
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<f64> for StreamingStats {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut stats = StreamingStats::new();
        for v in iter {
            stats.add(v);
        }
        stats
    }
}

// =============================================================================
// COLUMN SUMMARY
// =============================================================================

/// Share of non-blank values that must parse as numbers for a numeric summary.
const NUMERIC_SHARE: f64 = 0.6;

/// Descriptive statistics for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnSummary {
    Numeric {
        count: usize,
        mean: f64,
        median: f64,
        min: f64,
        max: f64,
        std_dev: f64,
        missing_pct: f64,
    },
    Categorical {
        unique: usize,
        top: Option<String>,
        top_count: usize,
        missing_pct: f64,
    },
}

impl ColumnSummary {
    /// Summarize a column.
    pub fn compute(values: &[Value]) -> Self {
        let total = values.len();
        let non_blank: Vec<&Value> = values.iter().filter(|v| !v.is_blank()).collect();
        let missing_pct = percent(total - non_blank.len(), total);

        let mut numbers: Vec<f64> = non_blank.iter().filter_map(|v| parse_number(v)).collect();

        if !non_blank.is_empty() && numbers.len() as f64 >= NUMERIC_SHARE * non_blank.len() as f64 {
            let stats: StreamingStats = numbers.iter().copied().collect();
            numbers.sort_by(f64::total_cmp);
            return ColumnSummary::Numeric {
                count: numbers.len(),
                mean: stats.mean(),
                median: median_sorted(&numbers),
                min: stats.min().unwrap_or(0.0),
                max: stats.max().unwrap_or(0.0),
                std_dev: stats.std_dev(),
                missing_pct,
            };
        }

        let mut counts: IndexMap<String, usize> = IndexMap::new();
        for v in &non_blank {
            if let Some(key) = v.key() {
                *counts.entry(key).or_insert(0) += 1;
            }
        }

        let mut top: Option<(&String, usize)> = None;
        for (key, &count) in &counts {
            if top.is_none_or(|(_, best)| count > best) {
                top = Some((key, count));
            }
        }

        ColumnSummary::Categorical {
            unique: counts.len(),
            top: top.map(|(k, _)| k.clone()),
            top_count: top.map(|(_, c)| c).unwrap_or(0),
            missing_pct,
        }
    }
}

fn median_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n == 0 {
        0.0
    } else if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// `100 * part / whole`, 0 for an empty whole.
pub(crate) fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        100.0 * part as f64 / whole as f64
    }
}
