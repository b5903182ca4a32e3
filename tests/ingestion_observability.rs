use std::sync::{Arc, Mutex};

use httpmock::prelude::*;

use sheet_ingest::ingestion::{
    ingest_from_url, CompositeObserver, IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats,
    LoadOptions, TracingObserver,
};
use sheet_ingest::types::LoadWarning;
use sheet_ingest::IngestionError;

#[derive(Default)]
struct RecordingObserver {
    successes: Mutex<Vec<IngestionStats>>,
    warnings: Mutex<Vec<LoadWarning>>,
    failures: Mutex<Vec<IngestionSeverity>>,
    alerts: Mutex<Vec<IngestionSeverity>>,
    contexts: Mutex<Vec<IngestionContext>>,
}

impl IngestionObserver for RecordingObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        self.contexts.lock().unwrap().push(ctx.clone());
        self.successes.lock().unwrap().push(stats);
    }

    fn on_warning(&self, _ctx: &IngestionContext, warning: &LoadWarning) {
        self.warnings.lock().unwrap().push(warning.clone());
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, _error: &IngestionError) {
        self.contexts.lock().unwrap().push(ctx.clone());
        self.failures.lock().unwrap().push(severity);
    }

    fn on_alert(&self, _ctx: &IngestionContext, severity: IngestionSeverity, _error: &IngestionError) {
        self.alerts.lock().unwrap().push(severity);
    }
}

fn options_with(obs: Arc<RecordingObserver>, base_url: &str) -> LoadOptions {
    LoadOptions {
        base_url: base_url.to_string(),
        observer: Some(obs),
        alert_at_or_above: IngestionSeverity::Critical,
        ..Default::default()
    }
}

#[test]
fn observer_receives_failure_and_alert_on_network_failure() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = options_with(obs.clone(), "http://127.0.0.1:1");

    // Refused connection -> NetworkFailure -> Critical
    let _ = ingest_from_url("ABC123", &opts).unwrap_err();

    assert_eq!(*obs.failures.lock().unwrap(), vec![IngestionSeverity::Critical]);
    assert_eq!(*obs.alerts.lock().unwrap(), vec![IngestionSeverity::Critical]);
}

#[test]
fn observer_receives_failure_without_alert_for_invalid_url() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = options_with(obs.clone(), "http://127.0.0.1:1");

    let _ = ingest_from_url("https://example.com/nope", &opts).unwrap_err();

    assert_eq!(*obs.failures.lock().unwrap(), vec![IngestionSeverity::Error]);
    assert!(obs.alerts.lock().unwrap().is_empty());
    let contexts = obs.contexts.lock().unwrap();
    assert_eq!(contexts[0].input, "https://example.com/nope");
    assert_eq!(contexts[0].endpoint, None);
}

#[test]
fn empty_sheet_is_a_warning_level_failure() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/spreadsheets/d/ABC123/export");
        then.status(200).header("content-type", "text/csv").body("A,B\n");
    });

    let obs = Arc::new(RecordingObserver::default());
    let mut opts = options_with(obs.clone(), &server.base_url());
    opts.alert_at_or_above = IngestionSeverity::Error;

    let _ = ingest_from_url("ABC123", &opts).unwrap_err();

    assert_eq!(*obs.failures.lock().unwrap(), vec![IngestionSeverity::Warning]);
    assert!(obs.alerts.lock().unwrap().is_empty());
}

#[test]
fn observer_receives_warnings_then_success() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/spreadsheets/d/ABC123/export");
        then.status(200).header("content-type", "text/csv").body("A,B\n1,2,3\n4,5\n");
    });

    let obs = Arc::new(RecordingObserver::default());
    let members: Vec<Arc<dyn IngestionObserver>> = vec![obs.clone(), Arc::new(TracingObserver)];
    let composite = Arc::new(CompositeObserver::new(members));
    let opts = LoadOptions {
        base_url: server.base_url(),
        observer: Some(composite),
        ..Default::default()
    };

    let ds = ingest_from_url("https://docs.google.com/spreadsheets/d/ABC123/edit", &opts).unwrap();

    assert_eq!(ds.row_count(), 2);
    assert_eq!(
        *obs.warnings.lock().unwrap(),
        vec![LoadWarning::ExtraFields {
            row: 0,
            expected: 2,
            found: 3
        }]
    );
    assert_eq!(
        *obs.successes.lock().unwrap(),
        vec![IngestionStats {
            rows: 2,
            columns: 2,
            warnings: 1
        }]
    );
    let contexts = obs.contexts.lock().unwrap();
    assert_eq!(
        contexts[0].endpoint.as_deref(),
        Some(format!("{}/spreadsheets/d/ABC123/export?format=csv&gid=0", server.base_url()).as_str())
    );
}
