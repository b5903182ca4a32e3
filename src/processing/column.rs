//! Column access for [`crate::types::TabularDataset`]: by name, by position, or by spreadsheet
//! column letter (`A`, `Z`, `AA`, `AM`, ...).

use thiserror::Error;

use crate::ingestion::csv::parse_number;
use crate::types::{Cell, TabularDataset, MISSING};

/// Errors from column-letter lookups.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColumnLetterError {
    #[error("invalid column letter '{0}'")]
    Invalid(String),

    #[error("column letter {letter} out of range for dataset with {columns} columns")]
    OutOfRange { letter: String, columns: usize },
}

/// Convert a spreadsheet column letter to a 0-based index.
///
/// `A` → 0, `Z` → 25, `AA` → 26, `AM` → 38. Case-insensitive; surrounding whitespace ignored.
pub fn column_index_from_letter(letter: &str) -> Result<usize, ColumnLetterError> {
    let trimmed = letter.trim();
    if trimmed.is_empty() {
        return Err(ColumnLetterError::Invalid(letter.to_owned()));
    }

    let mut value: usize = 0;
    for ch in trimmed.chars() {
        let ch = ch.to_ascii_uppercase();
        if !ch.is_ascii_uppercase() {
            return Err(ColumnLetterError::Invalid(letter.to_owned()));
        }
        value = value
            .checked_mul(26)
            .and_then(|v| v.checked_add(ch as usize - 'A' as usize + 1))
            .ok_or_else(|| ColumnLetterError::Invalid(letter.to_owned()))?;
    }
    Ok(value - 1)
}

/// Best-effort numeric view of a cell.
///
/// Numeric cells pass through; text cells are re-parsed with the same currency and
/// thousands-separator rules used at load time, except that leading zeros are accepted
/// (`"007"` → 7). Missing and unparseable cells give `None`.
pub fn coerce_numeric(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Int(_) | Cell::Float(_) => cell.as_f64(),
        Cell::Missing => None,
        Cell::Text(s) => {
            let t = s.trim();
            parse_number(t)
                .or_else(|| parse_number(&without_leading_zeros(t)))
                .and_then(|c| c.as_f64())
        }
    }
}

fn without_leading_zeros(s: &str) -> String {
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", s),
    };
    let rest = digits.trim_start_matches('0');
    if rest.is_empty() || rest.starts_with('.') {
        format!("{sign}0{rest}")
    } else {
        format!("{sign}{rest}")
    }
}

impl TabularDataset {
    /// Index of the column at spreadsheet letter `letter`, checked against the header width.
    pub fn column_by_letter(&self, letter: &str) -> Result<usize, ColumnLetterError> {
        let idx = column_index_from_letter(letter)?;
        if idx >= self.column_count() {
            return Err(ColumnLetterError::OutOfRange {
                letter: letter.trim().to_owned(),
                columns: self.column_count(),
            });
        }
        Ok(idx)
    }

    /// All cells of the column at `idx`, in row order. A row too short to reach `idx`
    /// contributes [`Cell::Missing`].
    pub fn column_at(&self, idx: usize) -> Option<Vec<&Cell>> {
        if idx >= self.column_count() {
            return None;
        }
        Some(
            self.rows
                .iter()
                .map(|row| row.get(idx).unwrap_or(&MISSING))
                .collect(),
        )
    }

    /// All cells of the first column named `name`, in row order.
    pub fn column_values(&self, name: &str) -> Option<Vec<&Cell>> {
        self.column_at(self.index_of(name)?)
    }

    /// Numeric view of the column at `idx` (see [`coerce_numeric`]).
    pub fn numeric_column_at(&self, idx: usize) -> Option<Vec<Option<f64>>> {
        Some(
            self.column_at(idx)?
                .into_iter()
                .map(coerce_numeric)
                .collect(),
        )
    }

    /// Numeric view of the first column named `name`.
    pub fn numeric_column(&self, name: &str) -> Option<Vec<Option<f64>>> {
        self.numeric_column_at(self.index_of(name)?)
    }
}
