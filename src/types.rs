//! Core data model types for ingestion.
//!
//! A loaded sheet becomes a [`TabularDataset`]: the header row as column names plus row-major
//! storage of typed [`Cell`]s, aligned to the header.

use serde::Serialize;

/// A single typed value in a [`TabularDataset`].
///
/// Serializes untagged: `Missing` as `null`, numbers as JSON numbers, text as a string.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    /// Empty (or whitespace-only) cell, or padding for a short row.
    Missing,
    /// Integral number with no fractional part.
    Int(i64),
    /// Decimal number.
    Float(f64),
    /// Anything that did not convert to a number, including leading-zero identifiers.
    Text(String),
}

impl Cell {
    /// Returns `true` for [`Cell::Missing`].
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// Returns `true` for [`Cell::Int`] and [`Cell::Float`].
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Int(_) | Self::Float(_))
    }

    /// Numeric value as `f64`, if this cell is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Text value, if this cell is text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

/// Stand-in for cells a hand-built ragged row does not have.
pub(crate) static MISSING: Cell = Cell::Missing;

/// Non-fatal condition raised while parsing a sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum LoadWarning {
    /// A row had more fields than the header; the extra fields were dropped.
    ExtraFields {
        /// 0-based data row index (header excluded).
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// In-memory tabular dataset built from one CSV export.
///
/// Every row has exactly `columns.len()` cells. Column names keep header order and may repeat;
/// name lookups resolve to the first matching column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TabularDataset {
    /// Header row, in sheet order.
    pub columns: Vec<String>,
    /// Row-major cell storage.
    pub rows: Vec<Vec<Cell>>,
    /// Non-fatal conditions raised while parsing.
    pub warnings: Vec<LoadWarning>,
}

impl TabularDataset {
    /// Create a dataset from a header and rows, with no warnings.
    ///
    /// # Panics
    ///
    /// Panics if a row's length differs from the header length.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let width = columns.len();
        for (i, row) in rows.iter().enumerate() {
            assert!(
                row.len() == width,
                "row {i} has {} cells but the header has {width} columns",
                row.len()
            );
        }
        Self {
            columns,
            rows,
            warnings: Vec::new(),
        }
    }

    /// Number of data rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns in the header.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Index of the first column named `name`.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell at `(row, column index)`.
    pub fn cell_at(&self, row: usize, column: usize) -> Option<&Cell> {
        self.rows.get(row)?.get(column)
    }

    /// Cell at `(row, column name)`.
    pub fn cell(&self, row: usize, column: &str) -> Option<&Cell> {
        self.cell_at(row, self.index_of(column)?)
    }

    /// Create a new dataset containing only rows that match `predicate`.
    ///
    /// The returned dataset keeps the header and the warnings of the source.
    pub fn filter_rows<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&[Cell]) -> bool,
    {
        let rows = self
            .rows
            .iter()
            .filter(|row| predicate(row.as_slice()))
            .cloned()
            .collect();
        Self {
            columns: self.columns.clone(),
            rows,
            warnings: self.warnings.clone(),
        }
    }

    /// JSON form for a rendering surface: `{"columns": [...], "rows": [[...], ...], "warnings": [...]}`.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "columns": self.columns,
            "rows": self.rows,
            "warnings": self.warnings,
        })
    }
}
