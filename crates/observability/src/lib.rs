//! Logging setup and the log-backed reconciliation observer.

/// Initialize process-wide observability (tracing/logging).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init();
}

/// Tracing configuration (filters, layers).
pub mod tracing;

/// Reconciliation checkpoints rendered as log records.
pub mod reconciliation;

pub use reconciliation::TracingObserver;
