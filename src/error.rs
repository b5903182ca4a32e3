use serde::Serialize;
use thiserror::Error;

/// Convenience result type for ingestion operations.
pub type IngestionResult<T> = Result<T, IngestionError>;

/// Classification of an ingestion failure, without the diagnostic payload.
///
/// A rendering surface keys its guidance off this (e.g. "share the sheet as
/// anyone-with-link" for [`ErrorKind::PermissionDenied`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    InvalidUrl,
    NetworkFailure,
    PermissionDenied,
    EmptyResponse,
    MalformedCsv,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::InvalidUrl => "invalid url",
            Self::NetworkFailure => "network failure",
            Self::PermissionDenied => "permission denied",
            Self::EmptyResponse => "empty response",
            Self::MalformedCsv => "malformed csv",
        };
        f.write_str(s)
    }
}

/// Error type returned by resolution and loading.
///
/// Every variant carries `input`: the raw URL for [`IngestionError::InvalidUrl`], the export
/// endpoint for everything else.
#[derive(Debug, Error)]
pub enum IngestionError {
    /// The input cannot be mapped to a spreadsheet id + tab.
    #[error("invalid sheet url '{input}': {message}")]
    InvalidUrl { input: String, message: String },

    /// Transport failure (DNS, refused connection, timeout) or a transient upstream status.
    #[error("network failure fetching '{input}': {message}")]
    NetworkFailure {
        input: String,
        message: String,
        /// `true` when the configured timeout elapsed.
        timed_out: bool,
        #[source]
        source: Option<reqwest::Error>,
    },

    /// The sheet is not shared publicly, or Google answered with a sign-in page instead of CSV.
    #[error("permission denied for '{input}': {message}")]
    PermissionDenied {
        input: String,
        message: String,
        status: Option<u16>,
    },

    /// The fetch and parse succeeded but there are no data rows.
    #[error("sheet at '{input}' has no data rows ({} columns)", .columns.len())]
    EmptyResponse { input: String, columns: Vec<String> },

    /// The body is not well-formed CSV (bad quoting, invalid UTF-8).
    #[error("malformed csv from '{input}': {message}")]
    MalformedCsv {
        input: String,
        message: String,
        /// 1-based line of the first offending byte, when known.
        line: Option<u64>,
    },
}

impl IngestionError {
    /// The failure classification.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidUrl { .. } => ErrorKind::InvalidUrl,
            Self::NetworkFailure { .. } => ErrorKind::NetworkFailure,
            Self::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            Self::EmptyResponse { .. } => ErrorKind::EmptyResponse,
            Self::MalformedCsv { .. } => ErrorKind::MalformedCsv,
        }
    }

    /// The input the failing operation was given (raw URL or export endpoint).
    pub fn input(&self) -> &str {
        match self {
            Self::InvalidUrl { input, .. }
            | Self::NetworkFailure { input, .. }
            | Self::PermissionDenied { input, .. }
            | Self::EmptyResponse { input, .. }
            | Self::MalformedCsv { input, .. } => input,
        }
    }

    /// Human-readable detail, without the input prefix of the `Display` form.
    pub fn message(&self) -> String {
        match self {
            Self::InvalidUrl { message, .. }
            | Self::NetworkFailure { message, .. }
            | Self::PermissionDenied { message, .. }
            | Self::MalformedCsv { message, .. } => message.clone(),
            Self::EmptyResponse { .. } => "no data rows".to_string(),
        }
    }

    /// Only network failures are transient. Every other kind is determined by the input
    /// (or the sheet's sharing settings) and repeats until the user changes something.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::NetworkFailure { .. })
    }

    pub(crate) fn invalid_url(input: &str, message: impl Into<String>) -> Self {
        Self::InvalidUrl {
            input: input.to_owned(),
            message: message.into(),
        }
    }

    pub(crate) fn malformed(input: &str, message: impl Into<String>, line: Option<u64>) -> Self {
        Self::MalformedCsv {
            input: input.to_owned(),
            message: message.into(),
            line,
        }
    }

    pub(crate) fn permission_denied(
        input: &str,
        message: impl Into<String>,
        status: Option<u16>,
    ) -> Self {
        Self::PermissionDenied {
            input: input.to_owned(),
            message: message.into(),
            status,
        }
    }
}
