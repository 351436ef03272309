//! Semantic type detection from a bounded sample of column values.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::input::Value;
use crate::schema::DetectedType;

use super::recognizers::{ParseOptions, TYPE_RULES};

/// Type detector configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Non-blank values examined per column.
    pub sample_size: usize,
    /// Read ambiguous numeric dates as day/month/year.
    pub day_first: bool,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            sample_size: 200,
            day_first: false,
        }
    }
}

impl DetectorConfig {
    /// Parsing options derived from this configuration.
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            day_first: self.day_first,
        }
    }
}

/// Classifies columns by majority vote of the type recognizers.
pub struct TypeDetector {
    config: DetectorConfig,
}

impl TypeDetector {
    /// Create a detector with default configuration.
    pub fn new() -> Self {
        Self::with_config(DetectorConfig::default())
    }

    /// Create a detector with custom configuration.
    pub fn with_config(config: DetectorConfig) -> Self {
        Self { config }
    }

    /// Detect the semantic type of a column.
    ///
    /// Each recognizer scores one point per matching sample. The highest
    /// score wins and ties go to the earlier type in the priority order.
    /// A column with values but no matches is text; one with no non-blank
    /// values is unknown.
    pub fn detect(&self, values: &[Value]) -> DetectedType {
        let options = self.config.parse_options();
        let sample: Vec<&Value> = values
            .iter()
            .filter(|v| !v.is_blank())
            .take(self.config.sample_size)
            .collect();

        if sample.is_empty() {
            return DetectedType::Unknown;
        }

        let scores = self.scores(&sample, options);
        trace!(?scores, sample = sample.len(), "type scores");

        let mut best = DetectedType::Text;
        let mut best_score = 0;
        for (detected_type, score) in scores {
            if score > best_score {
                best = detected_type;
                best_score = score;
            }
        }
        best
    }

    /// Score of every recognizer over the sample, in priority order.
    pub fn scores(&self, sample: &[&Value], options: ParseOptions) -> Vec<(DetectedType, usize)> {
        TYPE_RULES
            .iter()
            .map(|rule| {
                let score = sample
                    .iter()
                    .filter(|v| (rule.validator)(v, options))
                    .count();
                (rule.detected_type, score)
            })
            .collect()
    }

    /// Parsing options used by this detector.
    pub fn parse_options(&self) -> ParseOptions {
        self.config.parse_options()
    }
}

impl Default for TypeDetector {
    fn default() -> Self {
        Self::new()
    }
}
