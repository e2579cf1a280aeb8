//! Lock-contention retry loop shared by reads and writes.
//!
//! # States
//!
//! ```text
//!                 locked
//!            +-------------+
//!            v             |
//!      +------------+      |      +-------+
//!      | Attempting | -----+----> | Retry |
//!      +------------+             +-------+
//!        |        |
//!   ok   |        |  any other failure
//!        v        v
//!   +---------+ +-------+
//!   | Success | | Fatal |
//!   +---------+ +-------+
//! ```
//!
//! The loop has no attempt cap and never sleeps. The only pacing between
//! attempts is the engine busy handler, and `SQLite` does not always call it:
//!
//! - A connection that already holds a read transaction (an explicit `BEGIN`
//!   followed by a read) and then needs the write lock gets `SQLITE_BUSY`
//!   immediately while another connection holds `RESERVED`. Waiting could
//!   deadlock, so the engine skips the busy handler.
//! - In WAL mode, `SQLITE_BUSY_SNAPSHOT` and recovery-related busy results
//!   are also returned without waiting.
//!
//! In those cases the loop spins at full speed, logging [`RETRYING_MESSAGE`]
//! and counting `localstore_lock_retries_total` on every pass, until the
//! other connection lets go. If the other connection is itself waiting on
//! this one (two writers that each hold a read transaction), neither ever
//! does and the loop never ends. Callers that open explicit transactions
//! should use `BEGIN IMMEDIATE` to take the write lock up front.

use super::instrumentation::{QueryContext, StoreLogger};
use super::traits::{EngineFailure, FailureKind};
use crate::{Error, Result};

/// Event message logged before retrying a locked statement.
pub const RETRYING_MESSAGE: &str = "Query failed, retrying";

/// Event message logged before giving up on a statement.
pub const NOT_RETRYING_MESSAGE: &str = "Query failed, not retrying";

/// Outcome of a single attempt.
#[derive(Debug)]
enum Attempt<T> {
    Success(T),
    Retry(EngineFailure),
    Fatal(EngineFailure),
}

impl<T> Attempt<T> {
    fn classify(result: std::result::Result<T, EngineFailure>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(failure) => match failure.kind {
                FailureKind::LockContention => Self::Retry(failure),
                FailureKind::Other => Self::Fatal(failure),
            },
        }
    }
}

/// Runs `attempt` until it succeeds or fails with something other than lock
/// contention.
///
/// Every locked failure logs [`RETRYING_MESSAGE`]; the terminal failure logs
/// [`NOT_RETRYING_MESSAGE`].
///
/// # Errors
///
/// Returns [`Error::QueryFailed`] carrying the engine message on the first
/// non-lock failure.
pub fn run_with_lock_retry<T, F>(logger: &dyn StoreLogger, query: &str, mut attempt: F) -> Result<T>
where
    F: FnMut() -> std::result::Result<T, EngineFailure>,
{
    loop {
        match Attempt::classify(attempt()) {
            Attempt::Success(value) => return Ok(value),
            Attempt::Retry(failure) => {
                logger.info(
                    RETRYING_MESSAGE,
                    &QueryContext {
                        query,
                        error: &failure.message,
                    },
                );
                metrics::counter!("localstore_lock_retries_total").increment(1);
            },
            Attempt::Fatal(failure) => {
                logger.info(
                    NOT_RETRYING_MESSAGE,
                    &QueryContext {
                        query,
                        error: &failure.message,
                    },
                );
                return Err(Error::QueryFailed {
                    message: failure.message,
                });
            },
        }
    }
}
