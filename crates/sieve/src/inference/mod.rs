//! Semantic type inference.

mod dates;
mod detector;
pub mod recognizers;

pub use dates::parse_date;
pub use detector::{DetectorConfig, TypeDetector};
pub use recognizers::{ParseOptions, TypeRule, TYPE_RULES};
