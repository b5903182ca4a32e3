//! Mapping a pasted Google Sheets URL to a [`SheetReference`] and its CSV export endpoint.
//!
//! Accepted inputs:
//!
//! - edit URLs: `https://docs.google.com/spreadsheets/d/<id>/edit?gid=<n>#gid=<n>`
//! - export URLs: `https://docs.google.com/spreadsheets/d/<id>/export?format=csv&gid=<n>`
//! - the same without a scheme: `docs.google.com/spreadsheets/d/<id>/edit`
//! - a bare id, optionally with a tab: `<id>`, `<id>#gid=<n>`, `<id>?gid=<n>`
//!
//! Everything here is pure string work; nothing touches the network.

use std::fmt;

use serde::Serialize;
use url::Url;

use crate::error::{IngestionError, IngestionResult};

/// Base URL of the export endpoints.
pub const DEFAULT_BASE_URL: &str = "https://docs.google.com";

/// Tab loaded when the input names none (the first tab of the spreadsheet).
pub const DEFAULT_GID: &str = "0";

/// One tab of one spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SheetReference {
    spreadsheet_id: String,
    gid: String,
}

impl SheetReference {
    /// Build a reference from its parts, validating both.
    pub fn new(spreadsheet_id: &str, gid: &str) -> IngestionResult<Self> {
        let input = format!("{spreadsheet_id}#gid={gid}");
        if !is_id_token(spreadsheet_id) {
            return Err(IngestionError::invalid_url(
                &input,
                format!("'{spreadsheet_id}' is not a spreadsheet id"),
            ));
        }
        if !is_gid(gid) {
            return Err(IngestionError::invalid_url(
                &input,
                format!("gid '{gid}' is not a non-negative integer"),
            ));
        }
        Ok(Self {
            spreadsheet_id: spreadsheet_id.to_owned(),
            gid: gid.to_owned(),
        })
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    pub fn gid(&self) -> &str {
        &self.gid
    }

    /// The same spreadsheet, another tab.
    pub fn with_gid(&self, gid: &str) -> IngestionResult<Self> {
        Self::new(&self.spreadsheet_id, gid)
    }

    /// Shorthand for [`to_endpoint`].
    pub fn endpoint(&self) -> CanonicalEndpoint {
        to_endpoint(self)
    }
}

impl fmt::Display for SheetReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#gid={}", self.spreadsheet_id, self.gid)
    }
}

/// Fully-qualified CSV export URL for one [`SheetReference`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalEndpoint {
    url: String,
}

impl CanonicalEndpoint {
    /// Export URL rooted at another base (a mock server, a mirror).
    ///
    /// `base` must be an absolute http(s) URL; a trailing slash is ignored.
    pub fn with_base(reference: &SheetReference, base: &str) -> IngestionResult<Self> {
        let parsed = Url::parse(base)
            .map_err(|e| IngestionError::invalid_url(base, format!("bad base url: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(IngestionError::invalid_url(
                base,
                format!("unsupported scheme '{}'", parsed.scheme()),
            ));
        }
        Ok(Self::build(base, reference))
    }

    fn build(base: &str, reference: &SheetReference) -> Self {
        Self {
            url: format!(
                "{}/spreadsheets/d/{}/export?format=csv&gid={}",
                base.trim_end_matches('/'),
                reference.spreadsheet_id,
                reference.gid
            ),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.url
    }
}

impl fmt::Display for CanonicalEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

/// Parse a user-supplied sheet URL (or bare id) into a [`SheetReference`].
///
/// The gid comes from the query string, then the fragment, then defaults to `"0"`.
///
/// ```
/// use sheet_ingest::resolve::{resolve, to_endpoint};
///
/// let r = resolve("https://docs.google.com/spreadsheets/d/ABC123/edit?gid=42#gid=42").unwrap();
/// assert_eq!((r.spreadsheet_id(), r.gid()), ("ABC123", "42"));
/// assert_eq!(
///     to_endpoint(&r).as_str(),
///     "https://docs.google.com/spreadsheets/d/ABC123/export?format=csv&gid=42"
/// );
/// ```
pub fn resolve(raw_url: &str) -> IngestionResult<SheetReference> {
    let input = raw_url.trim();
    if input.is_empty() {
        return Err(IngestionError::invalid_url(raw_url, "no url given"));
    }

    let reference = if input.contains("://") {
        resolve_url(raw_url, input)?
    } else if input.contains('/') {
        resolve_url(raw_url, &format!("https://{input}"))?
    } else {
        resolve_bare(raw_url, input)?
    };

    tracing::debug!(input = raw_url, sheet = %reference, "resolved sheet reference");
    Ok(reference)
}

/// Canonical CSV export endpoint for `reference` on `docs.google.com`.
pub fn to_endpoint(reference: &SheetReference) -> CanonicalEndpoint {
    CanonicalEndpoint::build(DEFAULT_BASE_URL, reference)
}

fn resolve_url(raw: &str, candidate: &str) -> IngestionResult<SheetReference> {
    let url = Url::parse(candidate).map_err(|e| IngestionError::invalid_url(raw, e.to_string()))?;

    let mut segments = url.path_segments().into_iter().flatten();
    let id = segments
        .by_ref()
        .position(|s| s == "d")
        .and_then(|_| segments.next())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| IngestionError::invalid_url(raw, "spreadsheet id not found (expected /d/<id>/)"))?;

    // Published-to-web links (/d/e/<token>/pub) carry a publish token, not the spreadsheet id.
    if id == "e" {
        return Err(IngestionError::invalid_url(
            raw,
            "published-to-web links are not supported; use the sheet's edit url",
        ));
    }
    if !is_id_token(id) {
        return Err(IngestionError::invalid_url(raw, format!("'{id}' is not a spreadsheet id")));
    }

    let from_query = url
        .query_pairs()
        .find(|(k, _)| k == "gid")
        .map(|(_, v)| v.into_owned());
    let gid = from_query.or_else(|| url.fragment().and_then(|f| gid_param(f.split('&'))));

    finish(raw, id, gid)
}

fn resolve_bare(raw: &str, input: &str) -> IngestionResult<SheetReference> {
    let (id, rest) = match input.find(['?', '#', '&']) {
        Some(i) => input.split_at(i),
        None => (input, ""),
    };
    if !is_id_token(id) {
        return Err(IngestionError::invalid_url(raw, "spreadsheet id not found"));
    }
    let gid = gid_param(rest.split(['?', '#', '&']));
    finish(raw, id, gid)
}

fn finish(raw: &str, id: &str, gid: Option<String>) -> IngestionResult<SheetReference> {
    let gid = gid.unwrap_or_else(|| DEFAULT_GID.to_string());
    if !is_gid(&gid) {
        return Err(IngestionError::invalid_url(
            raw,
            format!("gid '{gid}' is not a non-negative integer"),
        ));
    }
    Ok(SheetReference {
        spreadsheet_id: id.to_owned(),
        gid,
    })
}

fn gid_param<'a>(params: impl Iterator<Item = &'a str>) -> Option<String> {
    params
        .filter_map(|p| p.strip_prefix("gid="))
        .map(str::to_owned)
        .next()
}

fn is_id_token(s: &str) -> bool {
    !s.is_empty()
        && s.bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

fn is_gid(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}
