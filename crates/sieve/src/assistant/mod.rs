//! Advisory chat assistant.
//!
//! The assistant only sees an [`AssistantSummary`]; it never touches data and
//! its failures never reach the caller. No network provider ships with the
//! library: implement [`ChatAssistant`] to plug one in.

mod mock;
mod provider;
mod summary;

pub use mock::MockAssistant;
pub use provider::{ask, ChatAssistant, FALLBACK_MESSAGE};
pub use summary::{AssistantSummary, IssueDigest, DEFAULT_TOP_ISSUES};
