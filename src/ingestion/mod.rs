//! Ingestion entrypoints and implementations.
//!
//! Most callers should use [`ingest_from_url`] (from [`loader`]) which:
//!
//! - resolves the pasted URL to a tab and its CSV export endpoint
//! - fetches the export once and classifies the response
//! - parses it into an in-memory [`crate::types::TabularDataset`]
//! - optionally reports success/warnings/failure/alerts to an [`IngestionObserver`]
//!
//! The stages are also available on their own under:
//! - [`fetch`]
//! - [`csv`]

pub mod csv;
pub mod fetch;
pub mod loader;
pub mod observability;

pub use fetch::{classify_response, HttpResponse};
pub use loader::{
    ingest_from_url, load, load_with_options, LoadOptions, SheetRequest, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT,
};
pub use observability::{
    CompositeObserver, IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats, TracingObserver,
};
