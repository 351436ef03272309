//! Assistant trait and the never-failing `ask` wrapper.

use tracing::warn;

use crate::error::Result;

use super::summary::AssistantSummary;

/// Shown whenever the assistant is unreachable or returns nothing useful.
pub const FALLBACK_MESSAGE: &str = "The assistant is unavailable right now. General advice: \
remove duplicate rows first, then standardize emails to lowercase, \
dates to ISO 8601 (YYYY-MM-DD), and phone numbers to E.164 (+ and digits).";

/// Answers free-text questions about a dataset summary.
///
/// Implementations must be thread-safe (Send + Sync).
pub trait ChatAssistant: Send + Sync {
    /// Provider name for logs.
    fn name(&self) -> &str;

    fn answer(&self, summary: &AssistantSummary, question: &str) -> Result<String>;
}

/// Ask a question, degrading to [`FALLBACK_MESSAGE`] instead of failing.
pub fn ask(assistant: &dyn ChatAssistant, summary: &AssistantSummary, question: &str) -> String {
    match assistant.answer(summary, question) {
        Ok(answer) if !answer.trim().is_empty() => answer,
        Ok(_) => {
            warn!(assistant = assistant.name(), "empty answer; using fallback");
            FALLBACK_MESSAGE.to_string()
        }
        Err(e) => {
            warn!(assistant = assistant.name(), error = %e, "assistant failed; using fallback");
            FALLBACK_MESSAGE.to_string()
        }
    }
}
