//! Loading a sheet: fetch, classify, parse.
//!
//! Most callers should use [`ingest_from_url`], which takes the URL the user pasted. Callers
//! that already hold a [`CanonicalEndpoint`] use [`load`] or [`load_with_options`].
//!
//! Every call performs exactly one HTTP request. Nothing is cached and nothing is retried;
//! a caller may retry when [`crate::IngestionError::is_retryable`] says so.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::error::IngestionResult;
use crate::resolve::{resolve, CanonicalEndpoint, DEFAULT_BASE_URL};
use crate::types::TabularDataset;

use super::csv::ingest_csv_from_bytes;
use super::fetch::{classify_response, fetch};
use super::observability::{IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats};

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// User agent sent with every export request.
pub const DEFAULT_USER_AGENT: &str = concat!("Mozilla/5.0 (compatible; sheet-ingest/", env!("CARGO_PKG_VERSION"), ")");

/// Options controlling a load.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct LoadOptions {
    /// Upper bound on the whole request, connect through body.
    pub timeout: Duration,
    pub user_agent: String,
    /// Base URL export endpoints are derived against by [`ingest_from_url`].
    pub base_url: String,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn IngestionObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: IngestionSeverity,
}

impl fmt::Debug for LoadOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadOptions")
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .field("base_url", &self.base_url)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            observer: None,
            alert_at_or_above: IngestionSeverity::Critical,
        }
    }
}

/// Load one endpoint with the given timeout and default options otherwise.
pub fn load(endpoint: &CanonicalEndpoint, timeout: Duration) -> IngestionResult<TabularDataset> {
    let options = LoadOptions {
        timeout,
        ..Default::default()
    };
    load_with_options(endpoint, &options)
}

/// Load one endpoint.
///
/// When an observer is configured, this function reports:
///
/// - `on_warning` for each non-fatal warning, then `on_success`, on success
/// - `on_failure` on failure, with a computed severity
/// - `on_alert` on failure when the computed severity is >= `options.alert_at_or_above`
pub fn load_with_options(
    endpoint: &CanonicalEndpoint,
    options: &LoadOptions,
) -> IngestionResult<TabularDataset> {
    let ctx = IngestionContext {
        input: endpoint.to_string(),
        endpoint: Some(endpoint.to_string()),
    };
    let result = fetch_and_parse(endpoint, options);
    report(options, &ctx, &result);
    result
}

/// Resolve a pasted URL and load the tab it names.
///
/// ```no_run
/// use sheet_ingest::ingestion::{ingest_from_url, LoadOptions};
/// use sheet_ingest::ErrorKind;
///
/// let url = "https://docs.google.com/spreadsheets/d/ABC123/edit?gid=42#gid=42";
/// match ingest_from_url(url, &LoadOptions::default()) {
///     Ok(ds) => println!("rows={} columns={}", ds.row_count(), ds.column_count()),
///     Err(e) if e.kind() == ErrorKind::PermissionDenied => {
///         eprintln!("share the sheet as 'anyone with the link' and retry");
///     }
///     Err(e) => eprintln!("{e}"),
/// }
/// ```
pub fn ingest_from_url(raw_url: &str, options: &LoadOptions) -> IngestionResult<TabularDataset> {
    ingest(raw_url, None, options)
}

fn ingest(raw_url: &str, gid: Option<&str>, options: &LoadOptions) -> IngestionResult<TabularDataset> {
    let mut ctx = IngestionContext {
        input: raw_url.to_owned(),
        endpoint: None,
    };

    let endpoint = resolve(raw_url)
        .and_then(|r| match gid {
            Some(g) => r.with_gid(g),
            None => Ok(r),
        })
        .and_then(|r| CanonicalEndpoint::with_base(&r, &options.base_url));

    let result = match endpoint {
        Ok(endpoint) => {
            ctx.endpoint = Some(endpoint.to_string());
            fetch_and_parse(&endpoint, options)
        }
        Err(e) => Err(e),
    };
    report(options, &ctx, &result);
    result
}

fn fetch_and_parse(endpoint: &CanonicalEndpoint, options: &LoadOptions) -> IngestionResult<TabularDataset> {
    let response = fetch(endpoint, options.timeout, &options.user_agent)?;
    classify_response(endpoint.as_str(), &response)?;
    ingest_csv_from_bytes(endpoint.as_str(), &response.body)
}

fn report(options: &LoadOptions, ctx: &IngestionContext, result: &IngestionResult<TabularDataset>) {
    let Some(obs) = options.observer.as_ref() else {
        return;
    };
    match result {
        Ok(ds) => {
            for w in &ds.warnings {
                obs.on_warning(ctx, w);
            }
            obs.on_success(
                ctx,
                IngestionStats {
                    rows: ds.row_count(),
                    columns: ds.column_count(),
                    warnings: ds.warnings.len(),
                },
            );
        }
        Err(e) => {
            let sev = IngestionSeverity::for_error(e);
            obs.on_failure(ctx, sev, e);
            if sev >= options.alert_at_or_above {
                obs.on_alert(ctx, sev, e);
            }
        }
    }
}

/// An owned load request, for callers that queue loads (e.g. a main tab plus a second tab of
/// the same spreadsheet).
#[derive(Debug, Clone)]
pub struct SheetRequest {
    /// URL (or bare id) as pasted.
    pub url: String,
    /// Tab to load instead of the one named in `url`.
    pub gid: Option<String>,
    pub options: LoadOptions,
}

impl SheetRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            gid: None,
            options: LoadOptions::default(),
        }
    }

    /// Target another tab of the same spreadsheet.
    pub fn with_gid(mut self, gid: impl Into<String>) -> Self {
        self.gid = Some(gid.into());
        self
    }

    /// Execute the request.
    pub fn run(&self) -> IngestionResult<TabularDataset> {
        ingest(&self.url, self.gid.as_deref(), &self.options)
    }
}
