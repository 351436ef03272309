//! Sieve: profiling and correction engine for tabular data.
//!
//! Sieve infers a semantic type for every column of a table, scores each
//! column's quality on four axes (missing, duplicate, invalid, outlier),
//! proposes correction actions, and applies a selected plan to produce a
//! cleaned table that can be profiled again.
//!
//! # Core Principles
//!
//! - **Non-destructive**: every correction produces a new dataset snapshot
//! - **Deterministic**: detection, scoring, and corrections have no randomness
//! - **Idempotent**: applying a plan twice equals applying it once
//!
//! # Example
//!
//! ```no_run
//! use sieve::ProfileOrchestrator;
//!
//! let mut orchestrator = ProfileOrchestrator::new();
//! orchestrator.ingest_file("contacts.csv")?;
//! println!("score: {:.1}", orchestrator.profile().unwrap().global_score);
//!
//! let report = orchestrator.apply()?;
//! for line in &report.log {
//!     println!("{}", line);
//! }
//! # Ok::<(), sieve::SieveError>(())
//! ```

pub mod assistant;
pub mod config;
pub mod error;
pub mod export;
pub mod inference;
pub mod input;
pub mod jobs;
pub mod metrics;
pub mod schema;
pub mod suggestion;
pub mod transform;

mod orchestrator;

pub use crate::orchestrator::{ApplyReport, Comparison, OrchestratorState, ProfileOrchestrator};
pub use config::SieveConfig;
pub use error::{Result, SieveError};
pub use export::{ExportFormat, Exporter};
pub use inference::TypeDetector;
pub use input::{Dataset, DeclaredFormat, Ingestor, SourceMetadata, Value};
pub use metrics::{DatasetProfiler, MetricsComputer};
pub use schema::{ColumnProfile, DatasetProfile, DetectedType};
pub use suggestion::{CorrectionAction, CorrectionSuggestion, SuggestionEngine};
pub use transform::{CancelToken, CorrectionApplier, CorrectionPlan};
