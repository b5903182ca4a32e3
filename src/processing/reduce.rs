//! Reduction operations for [`crate::types::TabularDataset`].

use crate::types::{Cell, TabularDataset, MISSING};

/// Built-in reduction operations over a single column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReduceOp {
    /// Count all rows (including missing cells).
    Count,
    /// Sum numeric cells.
    Sum,
    /// Minimum numeric cell.
    Min,
    /// Maximum numeric cell.
    Max,
    /// Last numeric cell in row order (the latest value of a time series).
    Last,
}

/// Reduce a column using a built-in [`ReduceOp`].
///
/// - Returns `None` if `column` does not exist in the header.
/// - Numeric ops skip missing and text cells, and return `Some(Cell::Missing)` if no numeric
///   cell remains.
/// - `Sum` stays [`Cell::Int`] while every input is an integer and the total fits in `i64`.
/// - For `Count`, always returns `Some(Cell::Int(row_count))`.
pub fn reduce(dataset: &TabularDataset, column: &str, op: ReduceOp) -> Option<Cell> {
    let idx = dataset.index_of(column)?;
    let cells = dataset.rows.iter().map(|row| row.get(idx).unwrap_or(&MISSING));

    Some(match op {
        ReduceOp::Count => Cell::Int(dataset.row_count() as i64),
        ReduceOp::Sum => sum(cells.filter(|c| c.is_numeric())),
        ReduceOp::Min => extreme(cells, |candidate, best| candidate < best),
        ReduceOp::Max => extreme(cells, |candidate, best| candidate > best),
        ReduceOp::Last => cells.filter(|c| c.is_numeric()).last().cloned().unwrap_or(Cell::Missing),
    })
}

fn sum<'a>(cells: impl Iterator<Item = &'a Cell>) -> Cell {
    let mut int_acc: Option<i64> = Some(0);
    let mut float_acc = 0.0;
    let mut seen = false;
    for cell in cells {
        seen = true;
        match cell {
            Cell::Int(v) => int_acc = int_acc.and_then(|a| a.checked_add(*v)),
            _ => int_acc = None,
        }
        float_acc += cell.as_f64().unwrap_or(0.0);
    }
    match (seen, int_acc) {
        (false, _) => Cell::Missing,
        (true, Some(v)) => Cell::Int(v),
        (true, None) => Cell::Float(float_acc),
    }
}

fn extreme<'a>(cells: impl Iterator<Item = &'a Cell>, better: impl Fn(f64, f64) -> bool) -> Cell {
    let mut best: Option<(&Cell, f64)> = None;
    for cell in cells {
        let Some(v) = cell.as_f64() else { continue };
        match best {
            Some((_, b)) if !better(v, b) => {}
            _ => best = Some((cell, v)),
        }
    }
    best.map(|(c, _)| c.clone()).unwrap_or(Cell::Missing)
}
