//! The local store handle.

use super::instrumentation::{
    CLOSE_OPERATION, OPEN_OPERATION, StoreLogger, StoreMetrics, benchmark,
};
use super::retry::run_with_lock_retry;
use super::sqlite::SqliteConnector;
use super::traits::{Connector, EngineConnection};
use crate::config::StoreConfig;
use crate::models::Row;
use crate::{Error, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Connection lifecycle.
enum ConnectionState<C> {
    Closed,
    Open(C),
}

/// Blocking, retrying access to one local database file.
///
/// The store starts closed. [`open`](Self::open) and [`close`](Self::close)
/// are idempotent and may be repeated in any order. [`read`](Self::read)
/// and [`write`](Self::write) require an open connection and retry without
/// bound while the engine reports lock contention.
///
/// All operations block the calling thread. There is no overall deadline:
/// a write against a file that another process keeps locked waits until the
/// lock is released.
pub struct LocalStore<C: Connector = SqliteConnector> {
    location: PathBuf,
    state: ConnectionState<C::Connection>,
    connector: C,
    logger: Arc<dyn StoreLogger>,
    metrics: Arc<dyn StoreMetrics>,
}

impl LocalStore<SqliteConnector> {
    /// Creates a closed store for the `SQLite` file at `location`.
    ///
    /// Performs no I/O.
    #[must_use]
    pub fn new(
        location: impl Into<PathBuf>,
        logger: Arc<dyn StoreLogger>,
        metrics: Arc<dyn StoreMetrics>,
    ) -> Self {
        Self::with_connector(location, logger, metrics, SqliteConnector::new())
    }

    /// Creates a closed store from configuration.
    #[must_use]
    pub fn from_config(
        config: &StoreConfig,
        logger: Arc<dyn StoreLogger>,
        metrics: Arc<dyn StoreMetrics>,
    ) -> Self {
        Self::with_connector(
            config.location.clone(),
            logger,
            metrics,
            SqliteConnector::from_config(config),
        )
    }
}

impl<C: Connector> LocalStore<C> {
    /// Creates a closed store that opens connections through `connector`.
    #[must_use]
    pub fn with_connector(
        location: impl Into<PathBuf>,
        logger: Arc<dyn StoreLogger>,
        metrics: Arc<dyn StoreMetrics>,
        connector: C,
    ) -> Self {
        Self {
            location: location.into(),
            state: ConnectionState::Closed,
            connector,
            logger,
            metrics,
        }
    }

    /// Returns the database file location.
    #[must_use]
    pub fn location(&self) -> &Path {
        &self.location
    }

    /// Returns `true` while a connection is held.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self.state, ConnectionState::Open(_))
    }

    /// Opens the connection. Does nothing if already open.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OpenFailed`] if the file cannot be opened or
    /// configured. The store stays closed.
    pub fn open(&mut self) -> Result<()> {
        if self.is_open() {
            return Ok(());
        }

        let conn = benchmark(self.metrics.as_ref(), OPEN_OPERATION, || {
            self.connector
                .connect(&self.location)
                .map_err(|failure| Error::OpenFailed {
                    location: self.location.display().to_string(),
                    cause: failure.message,
                })
        })?;

        tracing::debug!(location = %self.location.display(), "Opened local store");
        self.state = ConnectionState::Open(conn);
        Ok(())
    }

    /// Closes the connection. Does nothing if already closed.
    ///
    /// Closing is best-effort: the store is closed afterwards even if the
    /// engine reports an error while releasing the connection. Such errors
    /// are logged and counted, not returned, so a later [`open`](Self::open)
    /// always starts clean.
    ///
    /// # Errors
    ///
    /// Currently never fails; the `Result` is kept for API symmetry.
    pub fn close(&mut self) -> Result<()> {
        let ConnectionState::Open(conn) = std::mem::replace(&mut self.state, ConnectionState::Closed)
        else {
            return Ok(());
        };

        benchmark(self.metrics.as_ref(), CLOSE_OPERATION, || {
            if let Err(failure) = conn.close() {
                tracing::warn!(
                    location = %self.location.display(),
                    error = %failure,
                    "Error while closing local store; connection released anyway"
                );
                metrics::counter!("localstore_close_failures_total").increment(1);
            }
            Ok(())
        })?;

        tracing::debug!(location = %self.location.display(), "Closed local store");
        Ok(())
    }

    /// Runs `query` and returns its first row.
    ///
    /// Returns `Ok(None)` when the statement produces no rows. Only the
    /// first row is ever fetched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotOpen`] if the store is closed, or
    /// [`Error::QueryFailed`] on any engine failure other than lock
    /// contention.
    pub fn read(&mut self, query: &str) -> Result<Option<Row>> {
        let ConnectionState::Open(conn) = &mut self.state else {
            return Err(Error::NotOpen);
        };
        run_with_lock_retry(self.logger.as_ref(), query, || conn.query_first(query))
    }

    /// Runs `query`, discarding any rows.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotOpen`] if the store is closed, or
    /// [`Error::QueryFailed`] on any engine failure other than lock
    /// contention.
    pub fn write(&mut self, query: &str) -> Result<()> {
        let ConnectionState::Open(conn) = &mut self.state else {
            return Err(Error::NotOpen);
        };
        run_with_lock_retry(self.logger.as_ref(), query, || conn.execute(query))
    }

    /// Returns the rowid of the most recent insert on the current connection.
    ///
    /// Returns `None` without touching the engine when the store is closed.
    /// The counter belongs to the connection, so it resets on reopen.
    #[must_use]
    pub fn last_inserted_row_id(&self) -> Option<i64> {
        match &self.state {
            ConnectionState::Open(conn) => Some(conn.last_insert_rowid()),
            ConnectionState::Closed => None,
        }
    }
}

impl<C: Connector> fmt::Debug for LocalStore<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalStore")
            .field("location", &self.location)
            .field("open", &self.is_open())
            .finish_non_exhaustive()
    }
}
