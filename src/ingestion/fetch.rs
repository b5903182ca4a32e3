//! HTTP retrieval of an export endpoint and classification of the response.
//!
//! [`fetch`] performs exactly one GET. [`classify_response`] decides, before any parsing,
//! whether the response is CSV at all; Google answers unshared sheets with an HTML sign-in
//! page (often with status 200), so the body is sniffed in addition to the status.

use std::time::Duration;

use url::Url;

use crate::error::{IngestionError, IngestionResult};
use crate::resolve::CanonicalEndpoint;

const SIGN_IN_HOST: &str = "accounts.google.com";

const CSV_CONTENT_TYPES: [&str; 5] = [
    "text/csv",
    "application/csv",
    "text/comma-separated-values",
    "text/plain",
    "application/octet-stream",
];

/// A completed HTTP exchange, reduced to what classification needs.
///
/// Public so callers using their own HTTP stack can still run [`classify_response`] and the
/// CSV parser on what they fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    /// Raw `Content-Type` header value, if any.
    pub content_type: Option<String>,
    /// URL after redirects.
    pub final_url: Option<String>,
    pub body: Vec<u8>,
}

/// GET `endpoint` once, bounded by `timeout`.
///
/// Only transport-level problems are errors here; every HTTP status comes back as a response.
pub fn fetch(
    endpoint: &CanonicalEndpoint,
    timeout: Duration,
    user_agent: &str,
) -> IngestionResult<HttpResponse> {
    let source = endpoint.as_str();
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .user_agent(user_agent)
        .build()
        .map_err(|e| network_error(source, "failed to build HTTP client", e))?;

    tracing::debug!(endpoint = source, ?timeout, "requesting csv export");
    let resp = client
        .get(source)
        .send()
        .map_err(|e| network_error(source, "request failed", e))?;

    let status = resp.status().as_u16();
    let final_url = Some(resp.url().to_string());
    let content_type = resp
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let body = resp
        .bytes()
        .map_err(|e| network_error(source, "failed to read response body", e))?
        .to_vec();

    tracing::debug!(
        endpoint = source,
        status,
        content_type = content_type.as_deref().unwrap_or(""),
        bytes = body.len(),
        "received response"
    );

    Ok(HttpResponse {
        status,
        content_type,
        final_url,
        body,
    })
}

/// Classify a response before parsing. `Ok(())` means the body should be parsed as CSV.
///
/// Checked in order:
///
/// 1. HTML body (`<!DOCTYPE html`, `<html`) → `PermissionDenied`, whatever the status
/// 2. redirected to the Google sign-in host → `PermissionDenied`
/// 3. 401 / 403 / 404 → `PermissionDenied`
/// 4. any other non-2xx → `NetworkFailure`
/// 5. a `Content-Type` that is not CSV-like → `PermissionDenied`
pub fn classify_response(source: &str, response: &HttpResponse) -> IngestionResult<()> {
    let status = response.status;

    if looks_like_html(&response.body) {
        return Err(IngestionError::permission_denied(
            source,
            format!("received an HTML page instead of CSV (HTTP {status}); the sheet is probably not shared"),
            Some(status),
        ));
    }

    let signed_out = response
        .final_url
        .as_deref()
        .and_then(|u| Url::parse(u).ok())
        .is_some_and(|u| u.host_str() == Some(SIGN_IN_HOST));
    if signed_out {
        return Err(IngestionError::permission_denied(
            source,
            "redirected to the Google sign-in page",
            Some(status),
        ));
    }

    match status {
        200..=299 => {}
        401 | 403 | 404 => {
            return Err(IngestionError::permission_denied(
                source,
                format!("HTTP {status}: the sheet does not exist or is not shared"),
                Some(status),
            ));
        }
        _ => {
            return Err(IngestionError::NetworkFailure {
                input: source.to_owned(),
                message: format!("unexpected HTTP status {status}"),
                timed_out: false,
                source: None,
            });
        }
    }

    if let Some(ct) = response.content_type.as_deref() {
        let mime = ct.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
        if !mime.is_empty() && !CSV_CONTENT_TYPES.contains(&mime.as_str()) {
            return Err(IngestionError::permission_denied(
                source,
                format!("expected CSV but the response content type is '{mime}'"),
                Some(status),
            ));
        }
    }

    Ok(())
}

fn looks_like_html(body: &[u8]) -> bool {
    let body = body.strip_prefix("\u{feff}".as_bytes()).unwrap_or(body);
    let start = body
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(body.len());
    let head: Vec<u8> = body[start..]
        .iter()
        .take(16)
        .map(u8::to_ascii_lowercase)
        .collect();
    head.starts_with(b"<!doctype html") || head.starts_with(b"<html")
}

fn network_error(source: &str, context: &str, err: reqwest::Error) -> IngestionError {
    let timed_out = err.is_timeout();
    let message = if timed_out {
        format!("{context}: timed out")
    } else {
        format!("{context}: {err}")
    };
    IngestionError::NetworkFailure {
        input: source.to_owned(),
        message,
        timed_out,
        source: Some(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn response(status: u16, content_type: Option<&str>, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            content_type: content_type.map(str::to_owned),
            final_url: None,
            body: body.as_bytes().to_vec(),
        }
    }

    fn kind(r: IngestionResult<()>) -> Option<ErrorKind> {
        r.err().map(|e| e.kind())
    }

    #[test]
    fn html_body_is_permission_denied_for_any_status() {
        for status in [200, 302, 404, 500] {
            let r = response(status, Some("text/html"), "<!DOCTYPE html><html></html>");
            assert_eq!(kind(classify_response("ep", &r)), Some(ErrorKind::PermissionDenied));
        }
        let r = response(200, Some("text/csv"), "\u{feff}\n  <HTML><body>sign in</body>");
        assert_eq!(kind(classify_response("ep", &r)), Some(ErrorKind::PermissionDenied));
    }

    #[test]
    fn status_classification() {
        let csv = "A,B\n1,2\n";
        assert_eq!(kind(classify_response("ep", &response(200, Some("text/csv; charset=utf-8"), csv))), None);
        assert_eq!(kind(classify_response("ep", &response(403, None, csv))), Some(ErrorKind::PermissionDenied));
        assert_eq!(kind(classify_response("ep", &response(401, None, ""))), Some(ErrorKind::PermissionDenied));
        assert_eq!(kind(classify_response("ep", &response(503, None, ""))), Some(ErrorKind::NetworkFailure));
        assert_eq!(kind(classify_response("ep", &response(429, None, ""))), Some(ErrorKind::NetworkFailure));
    }

    #[test]
    fn non_csv_content_type_is_permission_denied() {
        let r = response(200, Some("application/json"), "{\"a\":1}");
        assert_eq!(kind(classify_response("ep", &r)), Some(ErrorKind::PermissionDenied));
        let r = response(200, None, "A,B\n1,2\n");
        assert_eq!(kind(classify_response("ep", &r)), None);
    }

    #[test]
    fn sign_in_redirect_is_permission_denied() {
        let mut r = response(200, Some("text/plain"), "whatever");
        r.final_url = Some("https://accounts.google.com/v3/signin/identifier?continue=x".into());
        assert_eq!(kind(classify_response("ep", &r)), Some(ErrorKind::PermissionDenied));
    }
}
