//! Correction plans: the suggestions a caller chose to apply.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SieveError};
use crate::suggestion::{CorrectionAction, CorrectionSuggestion};

/// Selected suggestions per column, in the order they were chosen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorrectionPlan {
    columns: IndexMap<String, Vec<CorrectionSuggestion>>,
}

impl CorrectionPlan {
    /// An empty plan.
    pub fn new() -> Self {
        Self::default()
    }

    /// A plan made of every suggestion selected by default.
    pub fn from_defaults(suggestions: &IndexMap<String, Vec<CorrectionSuggestion>>) -> Self {
        let mut plan = Self::new();
        for (column, list) in suggestions {
            for suggestion in list.iter().filter(|s| s.selected_by_default) {
                plan.select(column, suggestion.clone());
            }
        }
        plan
    }

    /// Add a suggestion for a column. Re-selecting the same id is a no-op.
    pub fn select(&mut self, column: impl Into<String>, suggestion: CorrectionSuggestion) {
        let entry = self.columns.entry(column.into()).or_default();
        if !entry.iter().any(|s| s.id == suggestion.id) {
            entry.push(suggestion);
        }
    }

    /// Builder form of [`select`](Self::select) for an ad-hoc action.
    pub fn with_action(mut self, column: &str, action: CorrectionAction) -> Self {
        let id = format!("{}-{}", action.kind().replace('_', "-"), column);
        self.select(column, CorrectionSuggestion::new(id, column, action, true));
        self
    }

    /// Remove a suggestion by id. Returns whether anything was removed.
    pub fn deselect(&mut self, column: &str, id: &str) -> bool {
        let Some(entry) = self.columns.get_mut(column) else {
            return false;
        };
        let before = entry.len();
        entry.retain(|s| s.id != id);
        let removed = entry.len() != before;
        if entry.is_empty() {
            self.columns.shift_remove(column);
        }
        removed
    }

    /// True when nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.columns.values().all(|v| v.is_empty())
    }

    /// Number of selected suggestions.
    pub fn len(&self) -> usize {
        self.columns.values().map(|v| v.len()).sum()
    }

    /// Columns with at least one selection.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(|k| k.as_str())
    }

    /// Selections for one column.
    pub fn suggestions_for(&self, column: &str) -> &[CorrectionSuggestion] {
        self.columns.get(column).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// All `(column, suggestion)` pairs in plan order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CorrectionSuggestion)> {
        self.columns
            .iter()
            .flat_map(|(col, list)| list.iter().map(move |s| (col.as_str(), s)))
    }

    /// Value-rewriting actions planned for a column, in plan order.
    pub fn normalizers_for(&self, column: &str) -> Vec<&CorrectionAction> {
        self.suggestions_for(column)
            .iter()
            .map(|s| &s.action)
            .filter(|a| a.is_normalizer())
            .collect()
    }

    /// Every column the plan reads, including composite dedupe keys.
    pub fn referenced_columns(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for (col, suggestion) in self.iter() {
            if !names.contains(&col) {
                names.push(col);
            }
            if let CorrectionAction::Dedupe { keys } = &suggestion.action {
                for key in keys {
                    if !names.contains(&key.as_str()) {
                        names.push(key.as_str());
                    }
                }
            }
        }
        names
    }

    /// Load a plan from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| SieveError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save the plan as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|e| SieveError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }
}
