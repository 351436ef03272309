//! Top-level configuration, loadable from TOML.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SieveError};
use crate::inference::DetectorConfig;
use crate::input::IngestConfig;
use crate::metrics::{DatasetProfiler, MetricsConfig};
use crate::suggestion::{SuggestionEngine, SuggestionRules};
use crate::transform::{ApplierConfig, CorrectionApplier};

/// Every tunable of the profiling and correction pipeline.
///
/// Missing sections fall back to their defaults, so an empty file is a
/// valid configuration.
///
/// ```toml
/// profile_row_cap = 500
///
/// [detector]
/// day_first = true
///
/// [metrics.weights]
/// missing = 0.5
/// duplicate = 0.2
/// invalid = 0.2
/// outlier = 0.1
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SieveConfig {
    pub ingest: IngestConfig,
    pub detector: DetectorConfig,
    pub metrics: MetricsConfig,
    pub suggestions: SuggestionRules,
    pub applier: ApplierConfig,
    /// Rows profiled per dataset; corrections always cover every row.
    pub profile_row_cap: usize,
}

impl Default for SieveConfig {
    fn default() -> Self {
        Self {
            ingest: IngestConfig::default(),
            detector: DetectorConfig::default(),
            metrics: MetricsConfig::default(),
            suggestions: SuggestionRules::default(),
            applier: ApplierConfig::default(),
            profile_row_cap: 1000,
        }
    }
}

impl SieveConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| SieveError::Config(e.message().to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| SieveError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml_str(&content)
    }

    /// Reject configurations that cannot produce meaningful scores.
    pub fn validate(&self) -> Result<()> {
        self.metrics.weights.validate()?;

        let threshold = self.metrics.fuzzy.similarity_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(SieveError::Config(format!(
                "fuzzy similarity_threshold must be within [0, 1], got {}",
                threshold
            )));
        }
        if self.metrics.fuzzy.row_cap == 0 {
            return Err(SieveError::Config("fuzzy row_cap must be positive".into()));
        }
        if self.profile_row_cap == 0 {
            return Err(SieveError::Config("profile_row_cap must be positive".into()));
        }
        Ok(())
    }

    /// Profiler honoring the detector, metrics, and row cap settings.
    pub fn profiler(&self) -> DatasetProfiler {
        DatasetProfiler::with_config(
            self.detector.clone(),
            self.metrics.clone(),
            self.profile_row_cap,
        )
    }

    /// Suggestion engine offering fuzzy dedupe at the metric's threshold.
    pub fn suggestion_engine(&self) -> SuggestionEngine {
        SuggestionEngine::with_rules(self.suggestions.clone()).with_fuzzy(&self.metrics.fuzzy)
    }

    /// Applier sharing the detector's date parsing options and the fuzzy row cap.
    pub fn applier(&self) -> CorrectionApplier {
        CorrectionApplier::with_config(self.applier.clone(), self.detector.parse_options())
            .with_fuzzy(&self.metrics.fuzzy)
    }
}
