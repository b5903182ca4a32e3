//! Row filtering for [`crate::types::TabularDataset`].

use crate::types::{Cell, TabularDataset};

/// Returns a new [`TabularDataset`] containing only rows for which `predicate` returns `true`.
///
/// This is a convenience wrapper around [`TabularDataset::filter_rows`].
pub fn filter<F>(dataset: &TabularDataset, predicate: F) -> TabularDataset
where
    F: FnMut(&[Cell]) -> bool,
{
    dataset.filter_rows(predicate)
}
