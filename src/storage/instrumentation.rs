//! Logging and metrics capabilities injected into the store.
//!
//! Both are traits so callers can route events into their own logging and
//! metrics systems. The defaults forward to `tracing` and the `metrics`
//! facade, which are no-ops until a subscriber or recorder is installed
//! (see [`crate::observability`]).

use crate::Result;
use std::time::{Duration, Instant};

/// Operation name recorded for `open`.
pub const OPEN_OPERATION: &str = "store.open";

/// Operation name recorded for `close`.
pub const CLOSE_OPERATION: &str = "store.close";

/// Context attached to retry events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryContext<'a> {
    /// The statement that failed.
    pub query: &'a str,
    /// The engine error message.
    pub error: &'a str,
}

/// Sink for the store's informational events.
pub trait StoreLogger: Send + Sync {
    /// Records an informational event about a failed query.
    fn info(&self, message: &str, context: &QueryContext<'_>);
}

/// [`StoreLogger`] that emits `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl StoreLogger for TracingLogger {
    fn info(&self, message: &str, context: &QueryContext<'_>) {
        tracing::info!(query = context.query, error = context.error, "{message}");
    }
}

/// Sink for lifecycle timings.
///
/// Implementations are observational only and must not panic.
pub trait StoreMetrics: Send + Sync {
    /// Records one completed operation.
    ///
    /// `status` is `"success"` or `"error"`.
    fn record(&self, operation: &str, status: &'static str, elapsed: Duration);
}

/// [`StoreMetrics`] that forwards to the global `metrics` recorder.
///
/// Records two series per operation:
/// 1. `localstore_operations_total` - counter by operation and status
/// 2. `localstore_operation_duration_ms` - histogram of latency
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalMetrics;

impl StoreMetrics for GlobalMetrics {
    fn record(&self, operation: &str, status: &'static str, elapsed: Duration) {
        metrics::counter!(
            "localstore_operations_total",
            "operation" => operation.to_string(),
            "status" => status
        )
        .increment(1);
        metrics::histogram!(
            "localstore_operation_duration_ms",
            "operation" => operation.to_string(),
            "status" => status
        )
        .record(elapsed.as_secs_f64() * 1000.0);
    }
}

/// Runs `work` and records its wall-clock duration under `operation`.
///
/// The status label is derived from the result; the result itself is
/// returned untouched.
///
/// # Errors
///
/// Returns whatever error `work` returns.
pub fn benchmark<T>(
    metrics: &dyn StoreMetrics,
    operation: &str,
    work: impl FnOnce() -> Result<T>,
) -> Result<T> {
    let start = Instant::now();
    let result = work();
    let status = if result.is_ok() { "success" } else { "error" };
    metrics.record(operation, status, start.elapsed());
    result
}
