//! Compact, serializable view of a profile for an assistant.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::schema::{DatasetProfile, DetectedType};

/// Number of issue columns included by default.
pub const DEFAULT_TOP_ISSUES: usize = 5;

/// One problematic column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueDigest {
    pub column: String,
    pub detected_type: DetectedType,
    pub quality_score: f64,
    pub insight: String,
}

/// What the assistant is told about the dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantSummary {
    pub global_score: f64,
    pub rows: usize,
    pub columns: usize,
    /// Worst columns first.
    pub top_issues: Vec<IssueDigest>,
}

impl AssistantSummary {
    /// Summarize a profile, keeping the `top_n` lowest-scoring issue columns.
    pub fn from_profile(profile: &DatasetProfile, top_n: usize) -> Self {
        let top_issues = profile
            .worst_columns()
            .into_iter()
            .take(top_n)
            .map(|c| IssueDigest {
                column: c.name.clone(),
                detected_type: c.detected_type,
                quality_score: c.quality_score,
                insight: c.insight(),
            })
            .collect();

        Self {
            global_score: profile.global_score,
            rows: profile.row_count,
            columns: profile.columns.len(),
            top_issues,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Prompt text combining the summary and a question.
    pub fn prompt(&self, question: &str) -> Result<String> {
        Ok(format!(
            "You are a data quality advisor. Answer briefly and concretely.\n\n\
             Dataset summary (JSON):\n{}\n\n\
             Question: {}",
            self.to_json()?,
            question.trim()
        ))
    }
}

impl From<&DatasetProfile> for AssistantSummary {
    fn from(profile: &DatasetProfile) -> Self {
        Self::from_profile(profile, DEFAULT_TOP_ISSUES)
    }
}
