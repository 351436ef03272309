//! Dataset serialization to delimited text and JSON.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SieveError};
use crate::input::{Dataset, Row, Value};

/// Output formats for cleaned data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    Csv,
    Tsv,
    Json,
}

impl ExportFormat {
    /// Infer from a file extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "csv" => Ok(Self::Csv),
            "tsv" | "tab" | "txt" => Ok(Self::Tsv),
            "json" => Ok(Self::Json),
            _ => Err(SieveError::UnsupportedFormat(format!(
                "cannot export to '{}'",
                path.display()
            ))),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Tsv => "tsv",
            Self::Json => "json",
        }
    }
}

/// Read-only serializers for datasets and profiles.
pub struct Exporter;

impl Exporter {
    /// Header plus one record per row; blanks become empty fields.
    pub fn to_delimited(dataset: &Dataset, delimiter: u8) -> Result<Vec<u8>> {
        if dataset.column_count() == 0 {
            return Ok(Vec::new());
        }

        let mut writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(Vec::new());

        writer.write_record(dataset.column_names())?;
        for row in 0..dataset.row_count() {
            let record = dataset
                .columns()
                .map(|(_, values)| cell(&values[row]));
            writer.write_record(record)?;
        }

        writer
            .into_inner()
            .map_err(|e| SieveError::Csv(csv::Error::from(e.into_error())))
    }

    /// Array of objects in column order; blanks are `null`.
    pub fn to_json(dataset: &Dataset) -> Result<Vec<u8>> {
        let rows: Vec<Row> = dataset
            .rows()
            .map(|row| {
                row.into_iter()
                    .map(|(k, v)| if v.is_blank() { (k, Value::Null) } else { (k, v) })
                    .collect()
            })
            .collect();
        Ok(serde_json::to_vec_pretty(&rows)?)
    }

    /// Serialize in `format`.
    pub fn write(dataset: &Dataset, format: ExportFormat) -> Result<Vec<u8>> {
        match format {
            ExportFormat::Csv => Self::to_delimited(dataset, b','),
            ExportFormat::Tsv => Self::to_delimited(dataset, b'\t'),
            ExportFormat::Json => Self::to_json(dataset),
        }
    }

    /// Serialize in `format` and write to `path`.
    pub fn save(dataset: &Dataset, path: impl AsRef<Path>, format: ExportFormat) -> Result<()> {
        let path = path.as_ref();
        let bytes = Self::write(dataset, format)?;
        fs::write(path, bytes).map_err(|e| SieveError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

fn cell(value: &Value) -> String {
    if value.is_blank() {
        String::new()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample() -> Dataset {
        Dataset::from_columns(vec![
            ("name", vec![Value::text("Ann, Jr."), Value::Null]),
            ("age", vec![Value::Number(31.0), Value::Number(2.5)]),
            (
                "joined",
                vec![
                    Value::Date(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()),
                    Value::text("  "),
                ],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_csv() {
        let out = String::from_utf8(Exporter::to_delimited(&sample(), b',').unwrap()).unwrap();
        assert_eq!(out, "name,age,joined\n\"Ann, Jr.\",31,2024-01-05\n,2.5,\n");
    }

    #[test]
    fn test_tsv() {
        let out = String::from_utf8(Exporter::write(&sample(), ExportFormat::Tsv).unwrap()).unwrap();
        assert!(out.starts_with("name\tage\tjoined\n"));
    }

    #[test]
    fn test_json_types() {
        let bytes = Exporter::to_json(&sample()).unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed[0]["age"], serde_json::json!(31));
        assert_eq!(parsed[0]["joined"], serde_json::json!("2024-01-05"));
        assert_eq!(parsed[1]["name"], serde_json::Value::Null);
        assert_eq!(parsed[1]["joined"], serde_json::Value::Null);

        let text = String::from_utf8(bytes).unwrap();
        assert!(text.find("\"name\"").unwrap() < text.find("\"age\"").unwrap());
    }

    #[test]
    fn test_empty_dataset() {
        assert!(Exporter::to_delimited(&Dataset::empty(), b',').unwrap().is_empty());
        assert_eq!(Exporter::to_json(&Dataset::empty()).unwrap(), b"[]");
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(ExportFormat::from_path("a.JSON").unwrap(), ExportFormat::Json);
        assert!(ExportFormat::from_path("a.xlsx").is_err());
    }
}
