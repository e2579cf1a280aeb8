//! # localstore
//!
//! Synchronous access to a single local `SQLite` database file that stays
//! usable while other connections hold conflicting locks on it.
//!
//! A [`LocalStore`] owns at most one connection to its file. Reads and writes
//! retry for as long as the engine reports that the database is busy; every
//! other failure is returned to the caller unchanged.
//!
//! ## Features
//!
//! - Explicit `Closed`/`Open` lifecycle with idempotent `open` and `close`
//! - Unbounded retry on lock contention, paced by the engine busy timeout
//! - Single-row reads returning positional [`Row`] values
//! - Injectable logging and metrics capabilities
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use localstore::{GlobalMetrics, LocalStore, TracingLogger, Value};
//!
//! let mut store = LocalStore::new(
//!     "/tmp/test.db",
//!     Arc::new(TracingLogger),
//!     Arc::new(GlobalMetrics),
//! );
//! store.open()?;
//! store.write("CREATE TABLE IF NOT EXISTS t(x INTEGER)")?;
//! store.write("INSERT INTO t VALUES (42)")?;
//! assert_eq!(store.read("SELECT x FROM t")?, Some(vec![Value::Integer(42)]));
//! store.close()?;
//! # Ok::<(), localstore::Error>(())
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

pub mod config;
pub mod models;
pub mod observability;
pub mod storage;

pub use config::{LocalStoreConfig, StoreConfig};
pub use models::{Row, Value};
pub use storage::{
    Connector, EngineConnection, EngineFailure, FailureKind, GlobalMetrics, LocalStore,
    QueryContext, SqliteConnector, StoreLogger, StoreMetrics, TracingLogger,
};

/// Error type for localstore operations.
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `OpenFailed` | The database file cannot be opened or configured |
/// | `QueryFailed` | A read or write fails for any reason other than lock contention |
/// | `NotOpen` | A read or write is issued while the store is closed |
/// | `OperationFailed` | Configuration or observability setup fails |
///
/// Lock contention has no variant: it is always absorbed by retrying.
#[derive(Debug, ThisError)]
pub enum Error {
    /// The database could not be opened.
    ///
    /// Raised when:
    /// - The path is invalid or its directory does not exist
    /// - Permissions deny access to the file
    /// - Connection configuration (busy timeout, pragmas) is rejected
    #[error("failed to open database at '{location}': {cause}")]
    OpenFailed {
        /// Location of the database file.
        location: String,
        /// The underlying cause.
        cause: String,
    },

    /// A statement failed with a non-retryable error.
    #[error("query failed: {message}")]
    QueryFailed {
        /// Engine error message.
        message: String,
    },

    /// A statement was issued before `open` or after `close`.
    #[error("database connection is not open")]
    NotOpen,

    /// An ambient operation failed.
    ///
    /// Raised when:
    /// - The configuration file cannot be read or parsed
    /// - Logging or metrics initialisation fails
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },
}

/// Result type alias for localstore operations.
pub type Result<T> = std::result::Result<T, Error>;
