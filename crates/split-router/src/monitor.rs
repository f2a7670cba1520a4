/// Bridges split-core diagnostics onto the tracing stack.

use tracing::{debug, error, info, warn};

use split_core::monitor::{Diagnostic, Monitor, Severity};

pub struct TracingMonitor;

impl Monitor for TracingMonitor {
    fn emit(&self, event: Diagnostic) {
        match (event.severity, event.detail) {
            (Severity::Debug, Some(detail)) => debug!(detail = %detail, "{}", event.message),
            (Severity::Debug, None) => debug!("{}", event.message),
            (Severity::Info, Some(detail)) => info!(detail = %detail, "{}", event.message),
            (Severity::Info, None) => info!("{}", event.message),
            (Severity::Warn, Some(detail)) => warn!(detail = %detail, "{}", event.message),
            (Severity::Warn, None) => warn!("{}", event.message),
            (Severity::Error, Some(detail)) => error!(detail = %detail, "{}", event.message),
            (Severity::Error, None) => error!("{}", event.message),
        }
    }
}
