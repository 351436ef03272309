//! Correction plans and the applier that executes them.

mod cancel;
mod engine;
pub mod operations;
mod plan;

pub use cancel::CancelToken;
pub use engine::{AppliedChange, ApplierConfig, ApplyOutcome, CorrectionApplier, Stage};
pub use plan::CorrectionPlan;
