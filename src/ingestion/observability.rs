use std::fmt;
use std::sync::Arc;

use crate::error::IngestionError;
use crate::types::LoadWarning;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IngestionSeverity {
    /// Informational event.
    Info,
    /// Warning-level event (non-fatal, or nothing to show).
    Warning,
    /// Error-level event (the load failed because of the input or the sheet).
    Error,
    /// Critical error (network/infrastructure failures).
    Critical,
}

impl IngestionSeverity {
    /// Severity of a failed load.
    pub fn for_error(error: &IngestionError) -> Self {
        match error {
            IngestionError::NetworkFailure { .. } => Self::Critical,
            IngestionError::EmptyResponse { .. } => Self::Warning,
            IngestionError::InvalidUrl { .. }
            | IngestionError::PermissionDenied { .. }
            | IngestionError::MalformedCsv { .. } => Self::Error,
        }
    }
}

/// Context about a load attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestionContext {
    /// What the caller passed in: the pasted URL, or the endpoint for direct loads.
    pub input: String,
    /// Export endpoint, once resolution succeeded.
    pub endpoint: Option<String>,
}

/// Minimal stats reported on a successful load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestionStats {
    pub rows: usize,
    pub columns: usize,
    pub warnings: usize,
}

/// Observer interface for load outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait IngestionObserver: Send + Sync {
    /// Called when a load succeeds.
    fn on_success(&self, _ctx: &IngestionContext, _stats: IngestionStats) {}

    /// Called once per non-fatal warning of a successful load, before `on_success`.
    fn on_warning(&self, _ctx: &IngestionContext, _warning: &LoadWarning) {}

    /// Called when a load fails.
    fn on_failure(&self, _ctx: &IngestionContext, _severity: IngestionSeverity, _error: &IngestionError) {}

    /// Called when a failure meets an alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        self.on_failure(ctx, severity, error)
    }
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn IngestionObserver>>,
}

impl CompositeObserver {
    pub fn new(observers: Vec<Arc<dyn IngestionObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl IngestionObserver for CompositeObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        for o in &self.observers {
            o.on_success(ctx, stats);
        }
    }

    fn on_warning(&self, ctx: &IngestionContext, warning: &LoadWarning) {
        for o in &self.observers {
            o.on_warning(ctx, warning);
        }
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }
}

/// Emits load events as `tracing` events under the `sheet_ingest` target.
///
/// Installing a subscriber is left to the application.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl IngestionObserver for TracingObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        tracing::info!(
            target: "sheet_ingest",
            input = %ctx.input,
            endpoint = ctx.endpoint.as_deref().unwrap_or(""),
            rows = stats.rows,
            columns = stats.columns,
            warnings = stats.warnings,
            "sheet loaded"
        );
    }

    fn on_warning(&self, ctx: &IngestionContext, warning: &LoadWarning) {
        tracing::warn!(target: "sheet_ingest", input = %ctx.input, ?warning, "sheet load warning");
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        tracing::warn!(
            target: "sheet_ingest",
            input = %ctx.input,
            ?severity,
            kind = %error.kind(),
            error = %error,
            "sheet load failed"
        );
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        tracing::error!(
            target: "sheet_ingest",
            input = %ctx.input,
            ?severity,
            kind = %error.kind(),
            error = %error,
            "ALERT: sheet load failed"
        );
    }
}
