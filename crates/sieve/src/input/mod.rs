//! Input parsing and the dataset model.

mod dataset;
mod parser;
mod source;
mod value;

pub use dataset::{Dataset, Row};
pub use parser::{IngestConfig, Ingestor};
pub use source::{DeclaredFormat, SourceMetadata};
pub use value::Value;
