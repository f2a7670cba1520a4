/// Monitoring boundary.
///
/// The routing core never formats or writes to a console. It emits discrete
/// diagnostic events through the `Monitor` trait and lets the embedding
/// process decide where they go (the daemon bridges them onto `tracing`).

use serde_json::Value;

/// Severity of a diagnostic event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Debug,
    Info,
    Warn,
    Error,
}

/// A single diagnostic event: severity, human-readable message, and
/// optional structured detail (e.g. the discarded split definition).
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub detail: Option<Value>,
}

impl Diagnostic {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            detail: None,
        }
    }

    pub fn debug(message: impl Into<String>) -> Self {
        Self::new(Severity::Debug, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }

    pub fn warn(message: impl Into<String>) -> Self {
        Self::new(Severity::Warn, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn with_detail(mut self, detail: Value) -> Self {
        self.detail = Some(detail);
        self
    }
}

/// Sink for diagnostic events emitted by the core.
pub trait Monitor: Send + Sync {
    fn emit(&self, event: Diagnostic);
}

/// Monitor that discards every event. Useful in tests and for callers
/// that do not care about diagnostics.
pub struct NullMonitor;

impl Monitor for NullMonitor {
    fn emit(&self, _event: Diagnostic) {}
}
