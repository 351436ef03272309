//! Column-oriented dataset snapshots.

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::{Result, SieveError};

use super::value::Value;

/// A single record, keyed by column name in schema order.
pub type Row = IndexMap<String, Value>;

/// An immutable-by-convention table of values.
///
/// Columns are stored contiguously and always have exactly `row_count`
/// cells; the validating constructors are the only way to build one.
/// Corrections produce a new `Dataset` rather than editing an existing one.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dataset {
    columns: IndexMap<String, Vec<Value>>,
    row_count: usize,
}

impl Dataset {
    /// An empty dataset with no columns and no rows.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a dataset from named columns.
    ///
    /// Fails when the columns disagree on length or a name repeats.
    pub fn from_columns<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Vec<Value>)>,
        S: Into<String>,
    {
        let mut map: IndexMap<String, Vec<Value>> = IndexMap::new();
        let mut row_count: Option<usize> = None;

        for (name, values) in columns {
            let name = name.into();
            match row_count {
                None => row_count = Some(values.len()),
                Some(expected) if expected != values.len() => {
                    return Err(SieveError::MalformedDataset(format!(
                        "column '{}' has {} values, expected {}",
                        name,
                        values.len(),
                        expected
                    )));
                }
                Some(_) => {}
            }
            if map.contains_key(&name) {
                return Err(SieveError::MalformedDataset(format!(
                    "duplicate column '{}'",
                    name
                )));
            }
            map.insert(name, values);
        }

        Ok(Self {
            columns: map,
            row_count: row_count.unwrap_or(0),
        })
    }

    /// Build a dataset from records.
    ///
    /// The schema is the union of keys seen in the first `schema_sample_rows`
    /// records, in order of first appearance. Keys absent from a record become
    /// `Null`; keys first seen after the sample window are dropped.
    pub fn from_rows(rows: &[Row], schema_sample_rows: usize) -> Self {
        let mut names: Vec<String> = Vec::new();
        for row in rows.iter().take(schema_sample_rows) {
            for key in row.keys() {
                if !names.iter().any(|n| n == key) {
                    names.push(key.clone());
                }
            }
        }

        let columns = names
            .into_iter()
            .map(|name| {
                let values = rows
                    .iter()
                    .map(|row| row.get(&name).cloned().unwrap_or(Value::Null))
                    .collect();
                (name, values)
            })
            .collect();

        Self {
            columns,
            row_count: rows.len(),
        }
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// True when the dataset has no rows or no columns.
    pub fn is_empty(&self) -> bool {
        self.row_count == 0 || self.columns.is_empty()
    }

    /// Column names in schema order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(|k| k.as_str())
    }

    /// Whether a column exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// All values of a column.
    pub fn column(&self, name: &str) -> Option<&[Value]> {
        self.columns.get(name).map(|v| v.as_slice())
    }

    /// Iterate over `(name, values)` pairs in schema order.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &[Value])> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// A single cell.
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        self.columns.get(column).and_then(|values| values.get(row))
    }

    /// Materialize one record.
    pub fn row(&self, index: usize) -> Option<Row> {
        if index >= self.row_count {
            return None;
        }
        Some(
            self.columns
                .iter()
                .map(|(name, values)| (name.clone(), values[index].clone()))
                .collect(),
        )
    }

    /// Iterate over materialized records.
    pub fn rows(&self) -> impl Iterator<Item = Row> + '_ {
        (0..self.row_count).filter_map(move |i| self.row(i))
    }

    /// Total number of blank cells across all columns.
    pub fn blank_cells(&self) -> usize {
        self.columns
            .values()
            .map(|values| values.iter().filter(|v| v.is_blank()).count())
            .sum()
    }

    /// Keep only the rows at `indices`, in the order given.
    pub(crate) fn select_rows(&self, indices: &[usize]) -> Dataset {
        Dataset {
            columns: self
                .columns
                .iter()
                .map(|(name, values)| {
                    (
                        name.clone(),
                        indices.iter().map(|&i| values[i].clone()).collect(),
                    )
                })
                .collect(),
            row_count: indices.len(),
        }
    }

    /// Mutable access to a column's cells. Length is fixed.
    pub(crate) fn column_mut(&mut self, name: &str) -> Option<&mut [Value]> {
        self.columns.get_mut(name).map(|v| v.as_mut_slice())
    }
}
