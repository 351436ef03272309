//! Byte-stream ingestion for delimited text and JSON.

use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::error::{Result, SieveError};
use super::dataset::{Dataset, Row};
use super::source::{DeclaredFormat, SourceMetadata};
use super::value::Value;

/// Delimiters to try when auto-detecting.
const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

/// Ingestion configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Reject inputs larger than this many bytes.
    pub max_bytes: u64,
    /// Rows scanned to build the column set.
    pub schema_sample_rows: usize,
    /// Delimiter for CSV input (None = auto-detect).
    pub delimiter: Option<char>,
    /// Extra cell contents read as missing, compared case-insensitively.
    pub null_tokens: Vec<String>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_bytes: 50 * 1024 * 1024,
            schema_sample_rows: 1000,
            delimiter: None,
            null_tokens: Vec::new(),
        }
    }
}

/// Turns raw bytes into a [`Dataset`].
pub struct Ingestor {
    config: IngestConfig,
}

impl Ingestor {
    /// Create an ingestor with default configuration.
    pub fn new() -> Self {
        Self {
            config: IngestConfig::default(),
        }
    }

    /// Create an ingestor with custom configuration.
    pub fn with_config(config: IngestConfig) -> Self {
        Self { config }
    }

    /// Read a file and parse it according to its extension.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<(Dataset, SourceMetadata)> {
        let path = path.as_ref();
        let format = DeclaredFormat::from_path(path)?;

        let size = fs::metadata(path)
            .map_err(|e| SieveError::Io {
                path: path.to_path_buf(),
                source: e,
            })?
            .len();
        self.check_size(size)?;

        let contents = fs::read(path).map_err(|e| SieveError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let name = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        self.parse_named(&contents, format, name)
    }

    /// Parse an in-memory byte stream.
    pub fn parse(&self, bytes: &[u8], format: DeclaredFormat) -> Result<(Dataset, SourceMetadata)> {
        self.parse_named(bytes, format, format!("input.{}", format.label()))
    }

    fn parse_named(
        &self,
        bytes: &[u8],
        format: DeclaredFormat,
        name: String,
    ) -> Result<(Dataset, SourceMetadata)> {
        self.check_size(bytes.len() as u64)?;

        let dataset = match format {
            DeclaredFormat::Csv => {
                let delimiter = match self.config.delimiter {
                    Some(d) => delimiter_byte(d)?,
                    None => detect_delimiter(bytes),
                };
                self.parse_delimited(bytes, delimiter)?
            }
            DeclaredFormat::Tsv => self.parse_delimited(bytes, b'\t')?,
            DeclaredFormat::Json => self.parse_json(bytes)?,
            DeclaredFormat::Xlsx => {
                return Err(SieveError::UnsupportedFormat(
                    "xlsx workbooks are not supported; export the sheet as CSV".to_string(),
                ));
            }
        };

        let mut hasher = Sha256::new();
        hasher.update(bytes);
        let hash = format!("sha256:{:x}", hasher.finalize());

        info!(
            source = %name,
            format = format.label(),
            rows = dataset.row_count(),
            columns = dataset.column_count(),
            "ingested dataset"
        );

        let metadata = SourceMetadata::new(
            name,
            format,
            hash,
            bytes.len() as u64,
            dataset.row_count(),
            dataset.column_count(),
        );

        Ok((dataset, metadata))
    }

    fn check_size(&self, size: u64) -> Result<()> {
        if size > self.config.max_bytes {
            return Err(SieveError::SizeExceeded {
                size,
                limit: self.config.max_bytes,
            });
        }
        Ok(())
    }

    /// Parse delimited text with a header row.
    fn parse_delimited(&self, bytes: &[u8], delimiter: u8) -> Result<Dataset> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(bytes);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|s| s.trim().to_string())
            .collect();

        if headers.iter().all(|h| h.is_empty()) {
            return Ok(Dataset::empty());
        }

        let expected_cols = headers.len();
        let mut columns: Vec<Vec<Value>> = vec![Vec::new(); expected_cols];

        for result in reader.records() {
            let record = result?;
            for (idx, column) in columns.iter_mut().enumerate() {
                // Short rows are padded, long rows truncated
                let cell = record.get(idx).unwrap_or("");
                column.push(self.cell_value(cell));
            }
        }

        debug!(delimiter = %(delimiter as char).escape_default(), columns = expected_cols, "parsed delimited input");

        Dataset::from_columns(dedupe_headers(headers).into_iter().zip(columns))
    }

    /// Parse a JSON array of objects, a `{"data": [...]}` wrapper, or a single object.
    fn parse_json(&self, bytes: &[u8]) -> Result<Dataset> {
        if bytes.iter().all(|b| b.is_ascii_whitespace()) {
            return Ok(Dataset::empty());
        }

        let json: serde_json::Value = serde_json::from_slice(bytes)?;

        let records: Vec<serde_json::Value> = match json {
            serde_json::Value::Array(items) => items,
            serde_json::Value::Object(mut map) => match map.remove("data") {
                Some(serde_json::Value::Array(items)) => items,
                Some(other) => {
                    map.insert("data".to_string(), other);
                    vec![serde_json::Value::Object(map)]
                }
                None => vec![serde_json::Value::Object(map)],
            },
            _ => {
                return Err(SieveError::Parse {
                    row: 0,
                    column: 0,
                    message: "expected an array of objects".to_string(),
                });
            }
        };

        let mut rows: Vec<Row> = Vec::with_capacity(records.len());
        for (idx, record) in records.iter().enumerate() {
            let object = record.as_object().ok_or_else(|| SieveError::Parse {
                row: idx + 1,
                column: 0,
                message: "record is not an object".to_string(),
            })?;

            let row: Row = object
                .iter()
                .map(|(key, value)| {
                    let cell = match value {
                        serde_json::Value::String(s) => self.cell_value(s),
                        other => Value::from(other),
                    };
                    (key.clone(), cell)
                })
                .collect::<IndexMap<_, _>>();
            rows.push(row);
        }

        Ok(Dataset::from_rows(&rows, self.config.schema_sample_rows))
    }

    /// Map a raw text cell to a value.
    fn cell_value(&self, raw: &str) -> Value {
        if raw.is_empty() || self.is_null_token(raw) {
            Value::Null
        } else {
            Value::Text(raw.to_string())
        }
    }

    fn is_null_token(&self, raw: &str) -> bool {
        let trimmed = raw.trim();
        self.config
            .null_tokens
            .iter()
            .any(|t| trimmed.eq_ignore_ascii_case(t))
    }
}

impl Default for Ingestor {
    fn default() -> Self {
        Self::new()
    }
}

fn delimiter_byte(c: char) -> Result<u8> {
    if c.is_ascii() {
        Ok(c as u8)
    } else {
        Err(SieveError::Config(format!("delimiter '{}' is not ASCII", c)))
    }
}

/// Empty or repeated header names get positional fallbacks.
fn dedupe_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::with_capacity(headers.len());
    for (idx, header) in headers.into_iter().enumerate() {
        let base = if header.is_empty() {
            format!("column_{}", idx + 1)
        } else {
            header
        };
        let mut name = base.clone();
        let mut suffix = 2;
        while seen.contains(&name) {
            name = format!("{}_{}", base, suffix);
            suffix += 1;
        }
        seen.push(name);
    }
    seen
}

/// Detect the delimiter by analyzing the first few lines.
fn detect_delimiter(bytes: &[u8]) -> u8 {
    let reader = BufReader::new(bytes);
    let lines: Vec<String> = reader
        .lines()
        .take(10)
        .filter_map(|l| l.ok())
        .filter(|l| !l.trim().is_empty())
        .collect();

    let mut best_delimiter = b',';
    let mut best_score = 0;

    for &delim in DELIMITERS {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| count_delimiter_in_line(line, delim))
            .collect();

        let first_count = match counts.first() {
            Some(&c) if c > 0 => c,
            _ => continue,
        };

        let consistent = counts.iter().all(|&c| c == first_count);
        let score = if consistent {
            first_count * 1000 + (if delim == b'\t' { 100 } else { 0 })
        } else {
            first_count
        };

        if score > best_score {
            best_score = score;
            best_delimiter = delim;
        }
    }

    best_delimiter
}

/// Count delimiter occurrences in a line, respecting quotes.
fn count_delimiter_in_line(line: &str, delimiter: u8) -> usize {
    let delim_char = delimiter as char;
    let mut count = 0;
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            c if c == delim_char && !in_quotes => count += 1,
            _ => {}
        }
    }

    count
}
