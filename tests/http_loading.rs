use std::time::Duration;

use httpmock::prelude::*;

use sheet_ingest::ingestion::{ingest_from_url, load, load_with_options, LoadOptions, SheetRequest, DEFAULT_USER_AGENT};
use sheet_ingest::resolve::{CanonicalEndpoint, SheetReference};
use sheet_ingest::types::Cell;
use sheet_ingest::{ErrorKind, IngestionError};

const EXPORT_PATH: &str = "/spreadsheets/d/ABC123/export";
const TIMEOUT: Duration = Duration::from_secs(5);

fn endpoint(server: &MockServer, gid: &str) -> CanonicalEndpoint {
    let sheet = SheetReference::new("ABC123", gid).unwrap();
    CanonicalEndpoint::with_base(&sheet, &server.base_url()).unwrap()
}

fn sign_in_page() -> String {
    std::fs::read_to_string("tests/fixtures/sign_in.html").unwrap()
}

#[test]
fn loads_csv_export() {
    let server = MockServer::start();
    let export = server.mock(|when, then| {
        when.method(GET)
            .path(EXPORT_PATH)
            .query_param("format", "csv")
            .query_param("gid", "42")
            .header("user-agent", DEFAULT_USER_AGENT);
        then.status(200)
            .header("content-type", "text/csv; charset=utf-8")
            .body("A,B\n1,x\n2,y\n");
    });

    let ds = load(&endpoint(&server, "42"), TIMEOUT).unwrap();

    export.assert();
    assert_eq!(ds.row_count(), 2);
    assert_eq!(ds.cell(0, "A"), Some(&Cell::Int(1)));
    assert_eq!(ds.cell(1, "B"), Some(&Cell::Text("y".to_string())));
}

#[test]
fn html_sign_in_page_with_200_is_permission_denied() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path(EXPORT_PATH);
        then.status(200)
            .header("content-type", "text/html; charset=utf-8")
            .body(sign_in_page());
    });

    let err = load(&endpoint(&server, "0"), TIMEOUT).unwrap_err();
    assert!(matches!(err, IngestionError::PermissionDenied { status: Some(200), .. }));
    assert!(!err.is_retryable());
}

#[test]
fn redirect_to_sign_in_is_permission_denied() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path(EXPORT_PATH);
        then.status(302).header("location", "/ServiceLogin?continue=export");
    });
    server.mock(|when, then| {
        when.method(GET).path("/ServiceLogin");
        then.status(200).header("content-type", "text/html").body(sign_in_page());
    });

    let err = load(&endpoint(&server, "0"), TIMEOUT).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PermissionDenied);
}

#[test]
fn forbidden_is_permission_denied() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path(EXPORT_PATH);
        then.status(403).body("forbidden");
    });

    let err = load(&endpoint(&server, "0"), TIMEOUT).unwrap_err();
    assert!(matches!(err, IngestionError::PermissionDenied { status: Some(403), .. }));
}

#[test]
fn server_error_is_retryable_network_failure() {
    let server = MockServer::start();
    let export = server.mock(|when, then| {
        when.method(GET).path(EXPORT_PATH);
        then.status(503).body("unavailable");
    });

    let err = load(&endpoint(&server, "0"), TIMEOUT).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NetworkFailure);
    assert!(err.is_retryable());
    // No built-in retries: exactly one request per load.
    export.assert();
}

#[test]
fn header_only_export_is_empty_response() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path(EXPORT_PATH);
        then.status(200).header("content-type", "text/csv").body("A,B\n");
    });

    let err = load(&endpoint(&server, "0"), TIMEOUT).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EmptyResponse);
}

#[test]
fn broken_quoting_is_malformed_csv() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path(EXPORT_PATH);
        then.status(200).header("content-type", "text/csv").body("A,B\n1,\"oops\n");
    });

    let err = load(&endpoint(&server, "0"), TIMEOUT).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedCsv);
}

#[test]
fn slow_response_times_out() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path(EXPORT_PATH);
        then.status(200)
            .header("content-type", "text/csv")
            .body("A\n1\n")
            .delay(Duration::from_secs(3));
    });

    let err = load(&endpoint(&server, "0"), Duration::from_millis(200)).unwrap_err();
    assert!(matches!(err, IngestionError::NetworkFailure { timed_out: true, .. }));
}

#[test]
fn refused_connection_is_network_failure() {
    let sheet = SheetReference::new("ABC123", "0").unwrap();
    let endpoint = CanonicalEndpoint::with_base(&sheet, "http://127.0.0.1:1").unwrap();

    let err = load(&endpoint, TIMEOUT).unwrap_err();
    assert!(matches!(err, IngestionError::NetworkFailure { timed_out: false, .. }));
    assert_eq!(err.input(), endpoint.as_str());
}

#[test]
fn ingest_from_pasted_edit_url() {
    let server = MockServer::start();
    let export = server.mock(|when, then| {
        when.method(GET).path(EXPORT_PATH).query_param("gid", "42");
        then.status(200)
            .header("content-type", "text/csv")
            .body("month,total\nJan,\"$1,000\"\nFeb,\"$1,100\",extra\n");
    });

    let options = LoadOptions {
        base_url: server.base_url(),
        ..Default::default()
    };
    let ds = ingest_from_url("https://docs.google.com/spreadsheets/d/ABC123/edit?gid=42#gid=42", &options).unwrap();

    export.assert();
    assert_eq!(ds.cell(1, "total"), Some(&Cell::Int(1100)));
    assert_eq!(ds.warnings.len(), 1);
}

#[test]
fn sheet_request_loads_another_tab() {
    let server = MockServer::start();
    let stock = server.mock(|when, then| {
        when.method(GET).path(EXPORT_PATH).query_param("gid", "172728277");
        then.status(200).header("content-type", "text/csv").body("ticker,qty\n005930,10\n");
    });

    let mut request = SheetRequest::new("https://docs.google.com/spreadsheets/d/ABC123/edit?gid=462380555")
        .with_gid("172728277");
    request.options.base_url = server.base_url();
    let ds = request.run().unwrap();

    stock.assert();
    // Ticker codes keep their leading zeros.
    assert_eq!(ds.cell(0, "ticker"), Some(&Cell::Text("005930".to_string())));
    assert_eq!(ds.cell(0, "qty"), Some(&Cell::Int(10)));
}

#[test]
fn every_load_fetches_again() {
    let server = MockServer::start();
    let export = server.mock(|when, then| {
        when.method(GET).path(EXPORT_PATH);
        then.status(200).header("content-type", "text/csv").body("A\n1\n");
    });

    let ep = endpoint(&server, "0");
    let options = LoadOptions::default();
    let first = load_with_options(&ep, &options).unwrap();
    let second = load_with_options(&ep, &options).unwrap();

    assert_eq!(first, second);
    export.assert_calls(2);
}
