//! Export of cleaned data and quality reports.

mod report;
mod writer;

pub use writer::{ExportFormat, Exporter};
