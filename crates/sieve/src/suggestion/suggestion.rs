//! Correction suggestion types.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::schema::DetectedType;

/// Formats a standardization can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StandardizeKind {
    /// Trimmed, lowercase address.
    Email,
    /// ISO 8601 calendar date.
    Date,
    /// E.164-style `+` prefixed digits.
    Phone,
    /// Compact uppercase IBAN.
    Iban,
}

impl StandardizeKind {
    /// The standardization for a detected type, if one exists.
    pub fn for_type(detected_type: DetectedType) -> Option<Self> {
        match detected_type {
            DetectedType::Email => Some(StandardizeKind::Email),
            DetectedType::Date => Some(StandardizeKind::Date),
            DetectedType::Phone => Some(StandardizeKind::Phone),
            DetectedType::Iban => Some(StandardizeKind::Iban),
            _ => None,
        }
    }

    /// The detected type this standardization belongs to.
    pub fn detected_type(&self) -> DetectedType {
        match self {
            StandardizeKind::Email => DetectedType::Email,
            StandardizeKind::Date => DetectedType::Date,
            StandardizeKind::Phone => DetectedType::Phone,
            StandardizeKind::Iban => DetectedType::Iban,
        }
    }

    pub fn label(&self) -> &'static str {
        self.detected_type().label()
    }
}

/// What a suggestion does when applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "args", rename_all = "snake_case")]
pub enum CorrectionAction {
    /// Drop rows whose key repeats an earlier row.
    Dedupe { keys: Vec<String> },
    /// Drop rows whose value is nearly identical to an earlier row.
    DedupeFuzzy { threshold: f64 },
    /// Fill blanks with the column mean.
    ImputeMean,
    /// Fill blanks with the most frequent value.
    ImputeMode,
    /// Rewrite values into a canonical format.
    Standardize { kind: StandardizeKind },
    /// Strip accents and surrounding whitespace.
    NormalizeText,
    /// Leave the column alone.
    KeepAsIs,
}

impl CorrectionAction {
    /// Short snake_case name of the action.
    pub fn kind(&self) -> &'static str {
        match self {
            CorrectionAction::Dedupe { .. } => "dedupe",
            CorrectionAction::DedupeFuzzy { .. } => "dedupe_fuzzy",
            CorrectionAction::ImputeMean => "impute_mean",
            CorrectionAction::ImputeMode => "impute_mode",
            CorrectionAction::Standardize { .. } => "standardize",
            CorrectionAction::NormalizeText => "normalize_text",
            CorrectionAction::KeepAsIs => "keep_as_is",
        }
    }

    /// Get a human-readable label.
    pub fn label(&self) -> String {
        match self {
            CorrectionAction::Dedupe { keys } if keys.len() > 1 => {
                format!("Remove duplicates on {}", keys.join(" + "))
            }
            CorrectionAction::Dedupe { .. } => "Remove duplicates".to_string(),
            CorrectionAction::DedupeFuzzy { threshold } => {
                format!("Merge near-duplicates ({:.0}% similar)", threshold * 100.0)
            }
            CorrectionAction::ImputeMean => "Fill blanks with the mean".to_string(),
            CorrectionAction::ImputeMode => "Fill blanks with the most frequent value".to_string(),
            CorrectionAction::Standardize { kind } => match kind {
                StandardizeKind::Email => "Standardize emails (trim, lowercase)".to_string(),
                StandardizeKind::Date => "Standardize dates (ISO 8601)".to_string(),
                StandardizeKind::Phone => "Standardize phones (E.164)".to_string(),
                StandardizeKind::Iban => "Standardize IBANs".to_string(),
            },
            CorrectionAction::NormalizeText => "Normalize text (accents, spaces)".to_string(),
            CorrectionAction::KeepAsIs => "Keep as is".to_string(),
        }
    }

    /// Actions that rewrite values in place.
    pub fn is_normalizer(&self) -> bool {
        matches!(
            self,
            CorrectionAction::Standardize { .. } | CorrectionAction::NormalizeText
        )
    }
}

impl fmt::Display for CorrectionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// A proposed correction for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectionSuggestion {
    /// Stable identifier, unique within the column.
    pub id: String,
    /// Column the suggestion targets.
    pub column: String,
    /// Human-readable label.
    pub label: String,
    /// The action and its arguments.
    pub action: CorrectionAction,
    /// Whether a fresh plan includes this suggestion.
    pub selected_by_default: bool,
}

impl CorrectionSuggestion {
    /// Create a suggestion labelled after its action.
    pub fn new(
        id: impl Into<String>,
        column: impl Into<String>,
        action: CorrectionAction,
        selected_by_default: bool,
    ) -> Self {
        Self {
            id: id.into(),
            column: column.into(),
            label: action.label(),
            action,
            selected_by_default,
        }
    }
}
