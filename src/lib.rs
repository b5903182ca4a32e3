//! `sheet-ingest` turns a Google Sheets URL, as a user would paste it from the browser, into an
//! in-memory [`types::TabularDataset`] of typed cells, or into an [`IngestionError`] that says
//! what went wrong in terms a dashboard can act on.
//!
//! The primary entrypoint is [`ingestion::ingest_from_url`]:
//!
//! 1. [`resolve::resolve`] maps the URL to a spreadsheet id + tab (`gid`)
//! 2. [`resolve::to_endpoint`] derives the tab's CSV export URL
//! 3. [`ingestion::load`] fetches it once, classifies the response, and parses the CSV
//!
//! ## What you get back
//!
//! The header row becomes [`types::TabularDataset::columns`] (order preserved, duplicates kept).
//! Every row is aligned to the header and holds [`types::Cell`]s:
//!
//! - [`types::Cell::Int`] / [`types::Cell::Float`] for numbers, including formatted amounts
//!   like `$1,234.50` or `₩1,000,000`
//! - [`types::Cell::Text`] for everything else, including identifiers with leading zeros
//! - [`types::Cell::Missing`] for empty cells and for padding short rows
//!
//! Rows longer than the header are truncated and reported in
//! [`types::TabularDataset::warnings`].
//!
//! ## What can go wrong
//!
//! | [`ErrorKind`] | cause | retry? |
//! |---|---|---|
//! | `InvalidUrl` | no spreadsheet id in the input, or a bad `gid` | after the user fixes the input |
//! | `NetworkFailure` | DNS, refused connection, timeout, 5xx | yes, with backoff |
//! | `PermissionDenied` | sheet not shared (HTML sign-in page, 401/403/404) | after sharing changes |
//! | `EmptyResponse` | header only, or no rows at all | no, show "no data" |
//! | `MalformedCsv` | broken quoting or invalid UTF-8 | no |
//!
//! ## Quick example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use sheet_ingest::ingestion::load;
//! use sheet_ingest::resolve::{resolve, to_endpoint};
//!
//! # fn main() -> Result<(), sheet_ingest::IngestionError> {
//! let sheet = resolve("https://docs.google.com/spreadsheets/d/ABC123/edit?gid=42#gid=42")?;
//! let ds = load(&to_endpoint(&sheet), Duration::from_secs(10))?;
//! println!("rows={} columns={:?}", ds.row_count(), ds.columns);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`resolve`]: URL → sheet reference → export endpoint
//! - [`ingestion`]: fetching, response classification, CSV parsing, observers
//! - [`types`]: the dataset and cell types
//! - [`processing`]: column lookup, filtering, and reductions over a loaded dataset
//! - [`error`]: the error taxonomy

pub mod error;
pub mod ingestion;
pub mod processing;
pub mod resolve;
pub mod types;

pub use error::{ErrorKind, IngestionError, IngestionResult};
