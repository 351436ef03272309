//! Source formats and ingestion metadata.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SieveError};

/// Format a caller declares for a byte stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclaredFormat {
    Csv,
    Tsv,
    Json,
    Xlsx,
}

impl DeclaredFormat {
    /// Infer the format from a file extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "csv" => Ok(DeclaredFormat::Csv),
            "tsv" | "txt" | "tab" => Ok(DeclaredFormat::Tsv),
            "json" => Ok(DeclaredFormat::Json),
            "xlsx" | "xls" => Ok(DeclaredFormat::Xlsx),
            _ => Err(SieveError::UnsupportedFormat(format!(
                "cannot infer format of '{}'",
                path.display()
            ))),
        }
    }

    /// Short lowercase name.
    pub fn label(&self) -> &'static str {
        match self {
            DeclaredFormat::Csv => "csv",
            DeclaredFormat::Tsv => "tsv",
            DeclaredFormat::Json => "json",
            DeclaredFormat::Xlsx => "xlsx",
        }
    }
}

/// Metadata about an ingested source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// Display name (file name, or a caller-supplied label).
    pub name: String,
    /// Declared format.
    pub format: DeclaredFormat,
    /// SHA-256 hash of the raw bytes.
    pub hash: String,
    /// Size of the raw input in bytes.
    pub size_bytes: u64,
    /// Number of data rows.
    pub row_count: usize,
    /// Number of columns.
    pub column_count: usize,
    /// When ingestion happened.
    pub ingested_at: DateTime<Utc>,
}

impl SourceMetadata {
    /// Create metadata for a freshly ingested source.
    pub fn new(
        name: impl Into<String>,
        format: DeclaredFormat,
        hash: String,
        size_bytes: u64,
        row_count: usize,
        column_count: usize,
    ) -> Self {
        Self {
            name: name.into(),
            format,
            hash,
            size_bytes,
            row_count,
            column_count,
            ingested_at: Utc::now(),
        }
    }
}
