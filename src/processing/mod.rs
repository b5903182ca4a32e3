//! In-memory helpers over a loaded [`crate::types::TabularDataset`].
//!
//! Currently implemented:
//!
//! - [`column`]: column lookup by name, position, or spreadsheet letter; numeric views
//! - [`filter()`]: row filtering by predicate
//! - [`reduce()`]: common reductions (count/sum/min/max/last)
//!
//! ## Example: latest month-over-month change of a column
//!
//! ```rust
//! use sheet_ingest::ingestion::csv::ingest_csv_from_str;
//! use sheet_ingest::processing::{reduce, ReduceOp};
//! use sheet_ingest::types::Cell;
//!
//! let ds = ingest_csv_from_str("inline", "month,net worth\nJan,\"1,000\"\nFeb,\"1,250\"\n").unwrap();
//!
//! let idx = ds.column_by_letter("B").unwrap();
//! let series: Vec<f64> = ds.numeric_column_at(idx).unwrap().into_iter().flatten().collect();
//! assert_eq!(series, vec![1000.0, 1250.0]);
//!
//! assert_eq!(reduce(&ds, "net worth", ReduceOp::Last), Some(Cell::Int(1250)));
//! assert_eq!(reduce(&ds, "net worth", ReduceOp::Sum), Some(Cell::Int(2250)));
//! ```

pub mod column;
pub mod filter;
pub mod reduce;

pub use column::{coerce_numeric, column_index_from_letter, ColumnLetterError};
pub use filter::filter;
pub use reduce::{reduce, ReduceOp};
