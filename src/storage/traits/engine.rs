//! Engine boundary for the local store.
//!
//! [`LocalStore`](crate::storage::LocalStore) talks to the database only
//! through these traits. Engine errors are classified into a closed set of
//! [`FailureKind`]s here, at the boundary, so the retry loop never has to
//! inspect messages.

use crate::models::Row;
use std::fmt;
use std::path::Path;

/// Classification of an engine failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Another connection holds a conflicting lock on the database file.
    ///
    /// Transient: the statement may succeed if issued again.
    LockContention,
    /// Any other failure (syntax error, constraint violation, I/O, ...).
    Other,
}

/// A failure reported by the engine, already classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineFailure {
    /// What kind of failure this is.
    pub kind: FailureKind,
    /// Engine-provided message.
    pub message: String,
}

impl EngineFailure {
    /// Creates a lock-contention failure.
    #[must_use]
    pub fn locked(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::LockContention,
            message: message.into(),
        }
    }

    /// Creates a non-retryable failure.
    #[must_use]
    pub fn other(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Other,
            message: message.into(),
        }
    }

    /// Returns `true` if the failure is lock contention.
    #[must_use]
    pub fn is_lock_contention(&self) -> bool {
        self.kind == FailureKind::LockContention
    }
}

impl fmt::Display for EngineFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for EngineFailure {}

/// A live connection to one database file.
///
/// Implementations must report lock contention as
/// [`FailureKind::LockContention`] only after the engine's own busy wait has
/// elapsed; the store retries such failures immediately.
pub trait EngineConnection: Send {
    /// Executes one statement and returns its first row, if any.
    ///
    /// # Errors
    ///
    /// Returns a classified [`EngineFailure`] if preparing or stepping the
    /// statement fails.
    fn query_first(&mut self, sql: &str) -> Result<Option<Row>, EngineFailure>;

    /// Executes one statement, discarding any rows it produces.
    ///
    /// # Errors
    ///
    /// Returns a classified [`EngineFailure`] if the statement fails.
    fn execute(&mut self, sql: &str) -> Result<(), EngineFailure>;

    /// Returns the rowid of the most recent successful insert on this connection.
    fn last_insert_rowid(&self) -> i64;

    /// Releases the connection.
    ///
    /// # Errors
    ///
    /// Returns an [`EngineFailure`] if the engine reports an error while
    /// releasing. The connection is gone either way.
    fn close(self) -> Result<(), EngineFailure>
    where
        Self: Sized;
}

/// Opens connections to database files.
pub trait Connector: Send + Sync {
    /// Connection type produced by this connector.
    type Connection: EngineConnection;

    /// Opens and configures a connection to the file at `location`.
    ///
    /// # Errors
    ///
    /// Returns an [`EngineFailure`] if the file cannot be opened or the
    /// connection cannot be configured.
    fn connect(&self, location: &Path) -> Result<Self::Connection, EngineFailure>;
}
