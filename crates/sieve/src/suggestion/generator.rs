//! Rule-based suggestion generation from column profiles.
//!
//! Each rule inspects the detected type and metrics of a column and emits
//! zero or one suggestion. Rules run in a fixed order and that order is the
//! ranking shown to users.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::metrics::FuzzyConfig;
use crate::schema::{ColumnProfile, DatasetProfile, DetectedType};

use super::{CorrectionAction, CorrectionSuggestion, StandardizeKind};

/// Tunables for the suggestion rules.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestionRules {
    /// Extra columns combined with the column itself for composite dedupe.
    pub composite_keys: Vec<String>,
}

/// Generates suggestions from column profiles using rule-based logic.
pub struct SuggestionEngine {
    rules: SuggestionRules,
    fuzzy_threshold: f64,
}

impl SuggestionEngine {
    /// Create an engine with default rules.
    pub fn new() -> Self {
        Self::with_rules(SuggestionRules::default())
    }

    /// Create an engine with custom rules.
    pub fn with_rules(rules: SuggestionRules) -> Self {
        Self {
            rules,
            fuzzy_threshold: FuzzyConfig::default().similarity_threshold,
        }
    }

    /// Offer fuzzy dedupe at the threshold the near-duplicate metric used.
    pub fn with_fuzzy(mut self, fuzzy: &FuzzyConfig) -> Self {
        self.fuzzy_threshold = fuzzy.similarity_threshold;
        self
    }

    /// Ranked suggestions for a single column.
    pub fn suggest(&self, profile: &ColumnProfile) -> Vec<CorrectionSuggestion> {
        self.suggest_with_keys(profile, &self.rules.composite_keys)
    }

    /// Suggestions for every column, keyed by column name.
    ///
    /// Composite keys that are not columns of the profile are ignored.
    pub fn suggest_all(&self, profile: &DatasetProfile) -> IndexMap<String, Vec<CorrectionSuggestion>> {
        let available: Vec<String> = self
            .rules
            .composite_keys
            .iter()
            .filter(|k| profile.column(k).is_some())
            .cloned()
            .collect();

        profile
            .columns
            .iter()
            .map(|col| (col.name.clone(), self.suggest_with_keys(col, &available)))
            .collect()
    }

    fn suggest_with_keys(
        &self,
        profile: &ColumnProfile,
        composite_keys: &[String],
    ) -> Vec<CorrectionSuggestion> {
        let col = profile.name.as_str();
        let mut suggestions = Vec::new();

        if profile.duplicate_pct > 0.0 {
            suggestions.push(CorrectionSuggestion::new(
                format!("dedupe-{}", col),
                col,
                CorrectionAction::Dedupe {
                    keys: vec![col.to_string()],
                },
                true,
            ));

            let extra: Vec<String> = composite_keys
                .iter()
                .filter(|k| k.as_str() != col)
                .cloned()
                .collect();
            if !extra.is_empty() {
                let mut keys = vec![col.to_string()];
                keys.extend(extra);
                suggestions.push(CorrectionSuggestion::new(
                    format!("dedupe-composite-{}", col),
                    col,
                    CorrectionAction::Dedupe { keys },
                    false,
                ));
            }
        }

        if profile.near_duplicate_pct.is_some_and(|p| p > 0.0) {
            suggestions.push(CorrectionSuggestion::new(
                format!("dedupe-fuzzy-{}", col),
                col,
                CorrectionAction::DedupeFuzzy {
                    threshold: self.fuzzy_threshold,
                },
                false,
            ));
        }

        if profile.missing_pct > 0.0 {
            let (id, action) = if profile.detected_type == DetectedType::Number {
                (format!("impute-mean-{}", col), CorrectionAction::ImputeMean)
            } else {
                (format!("impute-mode-{}", col), CorrectionAction::ImputeMode)
            };
            suggestions.push(CorrectionSuggestion::new(id, col, action, true));
        }

        if let Some(kind) = StandardizeKind::for_type(profile.detected_type) {
            suggestions.push(CorrectionSuggestion::new(
                format!("standardize-{}-{}", kind.label(), col),
                col,
                CorrectionAction::Standardize { kind },
                profile.invalid_pct > 0.0,
            ));
        }

        if profile.detected_type == DetectedType::Text {
            suggestions.push(CorrectionSuggestion::new(
                format!("normalize-text-{}", col),
                col,
                CorrectionAction::NormalizeText,
                true,
            ));
        }

        suggestions.push(CorrectionSuggestion::new(
            format!("keep-{}", col),
            col,
            CorrectionAction::KeepAsIs,
            false,
        ));

        suggestions
    }
}

impl Default for SuggestionEngine {
    fn default() -> Self {
        Self::new()
    }
}
