//! Storage layer.
//!
//! - [`LocalStore`]: the handle callers use
//! - [`traits`]: the engine boundary ([`Connector`], [`EngineConnection`])
//! - [`sqlite`]: the `SQLite` implementation of that boundary
//! - [`retry`]: the lock-contention retry loop
//! - [`instrumentation`]: logging and metrics capabilities

pub mod instrumentation;
mod local;
pub mod retry;
pub mod sqlite;
pub mod traits;

#[cfg(test)]
pub(crate) mod testing;

pub use instrumentation::{
    CLOSE_OPERATION, GlobalMetrics, OPEN_OPERATION, QueryContext, StoreLogger, StoreMetrics,
    TracingLogger, benchmark,
};
pub use local::LocalStore;
pub use retry::{NOT_RETRYING_MESSAGE, RETRYING_MESSAGE, run_with_lock_retry};
pub use sqlite::{SqliteConnection, SqliteConnector};
pub use traits::{Connector, EngineConnection, EngineFailure, FailureKind};
