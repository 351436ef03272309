//! Semantic column types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Semantic type detected for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectedType {
    /// Decimal or integer numbers.
    Number,
    /// Calendar dates.
    Date,
    /// Email addresses.
    Email,
    /// Telephone numbers.
    Phone,
    /// Web addresses.
    Url,
    /// International bank account numbers.
    Iban,
    /// true/false style flags.
    Boolean,
    /// Free text (nothing more specific matched).
    Text,
    /// No non-blank values to look at.
    Unknown,
}

impl DetectedType {
    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            DetectedType::Number => "number",
            DetectedType::Date => "date",
            DetectedType::Email => "email",
            DetectedType::Phone => "phone",
            DetectedType::Url => "url",
            DetectedType::Iban => "iban",
            DetectedType::Boolean => "boolean",
            DetectedType::Text => "text",
            DetectedType::Unknown => "unknown",
        }
    }

    /// Returns true if this type is numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(self, DetectedType::Number)
    }

    /// Returns true if values of this type have a validity check.
    pub fn is_validated(&self) -> bool {
        !matches!(self, DetectedType::Text | DetectedType::Unknown)
    }
}

impl Default for DetectedType {
    fn default() -> Self {
        DetectedType::Unknown
    }
}

impl fmt::Display for DetectedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
