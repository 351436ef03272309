//! Per-column and per-dataset quality profiles.

use serde::{Deserialize, Serialize};

use super::types::DetectedType;

/// Quality metrics for a single column.
///
/// All percentages are in `[0, 100]`. A profile is derived data: it is
/// replaced wholesale whenever the dataset is re-profiled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnProfile {
    /// Column name.
    pub name: String,
    /// Detected semantic type.
    pub detected_type: DetectedType,
    /// Share of blank cells.
    pub missing_pct: f64,
    /// Share of cells repeating an earlier cell.
    pub duplicate_pct: f64,
    /// Share of non-blank cells failing the type's validator.
    pub invalid_pct: f64,
    /// Share of numeric values beyond the z-score threshold.
    pub outlier_pct: f64,
    /// Composite score (higher is better).
    pub quality_score: f64,
    /// Share of near-identical value pairs, when fuzzy detection ran.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub near_duplicate_pct: Option<f64>,
}

impl ColumnProfile {
    /// True when any metric is non-zero.
    pub fn has_issues(&self) -> bool {
        self.missing_pct > 0.0
            || self.duplicate_pct > 0.0
            || self.invalid_pct > 0.0
            || self.outlier_pct > 0.0
            || self.near_duplicate_pct.is_some_and(|p| p > 0.0)
    }

    /// One-line description of the column's worst problems.
    pub fn insight(&self) -> String {
        let mut parts = Vec::new();
        if self.missing_pct > 0.0 {
            parts.push(format!("{:.1}% missing", self.missing_pct));
        }
        if self.duplicate_pct > 0.0 {
            parts.push(format!("{:.1}% duplicates", self.duplicate_pct));
        }
        if self.invalid_pct > 0.0 {
            parts.push(format!(
                "{:.1}% invalid {} values",
                self.invalid_pct,
                self.detected_type.label()
            ));
        }
        if self.outlier_pct > 0.0 {
            parts.push(format!("{:.1}% outliers", self.outlier_pct));
        }
        if let Some(p) = self.near_duplicate_pct.filter(|p| *p > 0.0) {
            parts.push(format!("{:.1}% near-duplicate pairs", p));
        }

        if parts.is_empty() {
            format!("{}: no issues detected", self.name)
        } else {
            format!("{}: {}", self.name, parts.join(", "))
        }
    }
}

/// Profiles for every column of a dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetProfile {
    /// One profile per column, in schema order.
    pub columns: Vec<ColumnProfile>,
    /// Mean of the column scores (0 with no columns).
    pub global_score: f64,
    /// Rows in the dataset.
    pub row_count: usize,
    /// Rows the metrics were computed over.
    pub profiled_rows: usize,
}

impl DatasetProfile {
    /// Assemble a dataset profile and compute the global score.
    pub fn new(columns: Vec<ColumnProfile>, row_count: usize, profiled_rows: usize) -> Self {
        let global_score = if columns.is_empty() {
            0.0
        } else {
            columns.iter().map(|c| c.quality_score).sum::<f64>() / columns.len() as f64
        };

        Self {
            columns,
            global_score,
            row_count,
            profiled_rows,
        }
    }

    /// Look up a column profile by name.
    pub fn column(&self, name: &str) -> Option<&ColumnProfile> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Columns with at least one non-zero metric.
    pub fn issues(&self) -> Vec<&ColumnProfile> {
        self.columns.iter().filter(|c| c.has_issues()).collect()
    }

    /// Issue columns ordered from lowest to highest score.
    pub fn worst_columns(&self) -> Vec<&ColumnProfile> {
        let mut issues = self.issues();
        issues.sort_by(|a, b| a.quality_score.total_cmp(&b.quality_score));
        issues
    }

    /// Templated insight lines, worst column first.
    pub fn insights(&self) -> Vec<String> {
        self.worst_columns().iter().map(|c| c.insight()).collect()
    }

    /// Headline figures.
    pub fn kpis(&self) -> ProfileKpis {
        let n = self.columns.len();
        let avg = |f: fn(&ColumnProfile) -> f64| {
            if n == 0 {
                0.0
            } else {
                self.columns.iter().map(f).sum::<f64>() / n as f64
            }
        };

        ProfileKpis {
            global_score: self.global_score,
            rows: self.row_count,
            columns: n,
            avg_missing_pct: avg(|c| c.missing_pct),
            avg_duplicate_pct: avg(|c| c.duplicate_pct),
            avg_invalid_pct: avg(|c| c.invalid_pct),
            columns_with_outliers: self.columns.iter().filter(|c| c.outlier_pct > 0.0).count(),
            columns_with_issues: self.issues().len(),
        }
    }
}

/// Headline figures for a dataset profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileKpis {
    pub global_score: f64,
    pub rows: usize,
    pub columns: usize,
    pub avg_missing_pct: f64,
    pub avg_duplicate_pct: f64,
    pub avg_invalid_pct: f64,
    pub columns_with_outliers: usize,
    pub columns_with_issues: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_profile(name: &str, missing: f64, score: f64) -> ColumnProfile {
        ColumnProfile {
            name: name.to_string(),
            detected_type: DetectedType::Text,
            missing_pct: missing,
            duplicate_pct: 0.0,
            invalid_pct: 0.0,
            outlier_pct: 0.0,
            quality_score: score,
            near_duplicate_pct: None,
        }
    }

    #[test]
    fn test_global_score_is_mean() {
        let profile = DatasetProfile::new(
            vec![make_profile("a", 0.0, 100.0), make_profile("b", 50.0, 80.0)],
            10,
            10,
        );
        assert!((profile.global_score - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_profile_scores_zero() {
        let profile = DatasetProfile::new(Vec::new(), 0, 0);
        assert_eq!(profile.global_score, 0.0);
        assert!(profile.insights().is_empty());
        assert_eq!(profile.kpis().avg_missing_pct, 0.0);
    }

    #[test]
    fn test_insights_worst_first() {
        let profile = DatasetProfile::new(
            vec![
                make_profile("ok", 0.0, 100.0),
                make_profile("mild", 10.0, 96.0),
                make_profile("bad", 50.0, 80.0),
            ],
            10,
            10,
        );
        let insights = profile.insights();
        assert_eq!(insights.len(), 2);
        assert_eq!(insights[0], "bad: 50.0% missing");
        assert_eq!(insights[1], "mild: 10.0% missing");
        assert_eq!(profile.kpis().columns_with_issues, 2);
    }
}
