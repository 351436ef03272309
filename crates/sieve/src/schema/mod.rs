//! Detected types and quality profiles.

mod profile;
mod types;

pub use profile::{ColumnProfile, DatasetProfile, ProfileKpis};
pub use types::DetectedType;
