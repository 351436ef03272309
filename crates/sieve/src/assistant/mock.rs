//! Offline assistant with predictable answers.

use crate::error::{Result, SieveError};

use super::provider::ChatAssistant;
use super::summary::AssistantSummary;

#[derive(Debug, Clone)]
enum Reply {
    Templated,
    Canned(String),
    Fail(String),
}

/// Assistant that answers from the summary alone, for tests and offline use.
#[derive(Debug, Clone)]
pub struct MockAssistant {
    reply: Reply,
}

impl MockAssistant {
    /// Answers with a templated digest of the worst columns.
    pub fn new() -> Self {
        Self {
            reply: Reply::Templated,
        }
    }

    /// Always answers `answer`.
    pub fn with_answer(answer: impl Into<String>) -> Self {
        Self {
            reply: Reply::Canned(answer.into()),
        }
    }

    /// Always fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            reply: Reply::Fail(message.into()),
        }
    }
}

impl Default for MockAssistant {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatAssistant for MockAssistant {
    fn name(&self) -> &str {
        "mock"
    }

    fn answer(&self, summary: &AssistantSummary, _question: &str) -> Result<String> {
        match &self.reply {
            Reply::Canned(answer) => Ok(answer.clone()),
            Reply::Fail(message) => Err(SieveError::Assistant(message.clone())),
            Reply::Templated => {
                let mut answer = format!(
                    "Overall quality is {:.1}/100 across {} rows and {} columns.",
                    summary.global_score, summary.rows, summary.columns
                );
                match summary.top_issues.first() {
                    Some(worst) => answer.push_str(&format!(
                        " Start with column '{}' ({}).",
                        worst.column, worst.insight
                    )),
                    None => answer.push_str(" No column needs attention."),
                }
                Ok(answer)
            }
        }
    }
}
