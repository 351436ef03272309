//! Correction suggestions derived from column profiles.

mod generator;
#[allow(clippy::module_inception)]
mod suggestion;

pub use generator::{SuggestionEngine, SuggestionRules};
pub use suggestion::{CorrectionAction, CorrectionSuggestion, StandardizeKind};
