//! Diagnostic sink for protocol anomalies
//!
//! The quorum policy reports locally detected inconsistencies here. Entries
//! are informational only and never influence the quorum outcome.

use tracing::error;

/// Error-level diagnostic sink
pub trait ConsensusLogger: Send + Sync {
    fn error(&self, message: &str);
}

/// Forwards diagnostics to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl ConsensusLogger for TracingLogger {
    fn error(&self, message: &str) {
        error!(target: "ibft::validator", "{}", message);
    }
}
