//! Connection handling for the `SQLite` engine.
//!
//! This module opens connections, applies the busy timeout and optional
//! pragmas, and classifies `rusqlite` errors into [`FailureKind`]s.

use super::row::fetch_first_row;
use crate::config::StoreConfig;
use crate::models::Row;
use crate::storage::traits::{Connector, EngineConnection, EngineFailure, FailureKind};
use rusqlite::{Connection, ErrorCode, OpenFlags};
use std::path::Path;
use std::time::Duration;

/// Default busy timeout applied at open (15 seconds).
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_millis(15_000);

/// Lower bound for the busy timeout.
///
/// The store retries locked statements without sleeping, so a zero timeout
/// would make every ordinary lock conflict spin. This does not pace the
/// `SQLITE_BUSY` results the engine returns without calling the busy handler;
/// see [`crate::storage::retry`].
pub const MIN_BUSY_TIMEOUT: Duration = Duration::from_millis(10);

/// Classifies a `rusqlite` error by its extended result code.
///
/// Only `SQLITE_BUSY` (and its extended variants) counts as lock contention.
/// `SQLITE_LOCKED` is a conflict inside this connection's own shared cache
/// and does not clear by waiting, so it is treated as fatal.
#[must_use]
pub fn classify_error(err: &rusqlite::Error) -> EngineFailure {
    let kind = match err.sqlite_error_code() {
        Some(ErrorCode::DatabaseBusy) => FailureKind::LockContention,
        _ => FailureKind::Other,
    };
    EngineFailure {
        kind,
        message: err.to_string(),
    }
}

#[allow(clippy::needless_pass_by_value)]
fn into_failure(err: rusqlite::Error) -> EngineFailure {
    classify_error(&err)
}

/// Opens `SQLite` connections configured for contended access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqliteConnector {
    busy_timeout: Duration,
    read_only: bool,
    journal_mode: Option<String>,
}

impl Default for SqliteConnector {
    fn default() -> Self {
        Self {
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
            read_only: false,
            journal_mode: None,
        }
    }
}

impl SqliteConnector {
    /// Creates a connector with the default 15 second busy timeout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a connector from store configuration.
    #[must_use]
    pub fn from_config(config: &StoreConfig) -> Self {
        let connector = Self::new()
            .with_busy_timeout(config.busy_timeout)
            .with_read_only(config.read_only);
        match &config.journal_mode {
            Some(mode) => connector.with_journal_mode(mode.clone()),
            None => connector,
        }
    }

    /// Sets the busy timeout, clamped to at least [`MIN_BUSY_TIMEOUT`].
    #[must_use]
    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout.max(MIN_BUSY_TIMEOUT);
        self
    }

    /// Opens the file read-only instead of read-write-create.
    #[must_use]
    pub const fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Sets `PRAGMA journal_mode` on every new connection.
    #[must_use]
    pub fn with_journal_mode(mut self, mode: impl Into<String>) -> Self {
        self.journal_mode = Some(mode.into());
        self
    }

    /// Returns the effective busy timeout.
    #[must_use]
    pub const fn busy_timeout(&self) -> Duration {
        self.busy_timeout
    }

    /// Returns `true` if connections are opened read-only.
    #[must_use]
    pub const fn read_only(&self) -> bool {
        self.read_only
    }

    fn open_flags(&self) -> OpenFlags {
        if self.read_only {
            OpenFlags::SQLITE_OPEN_READ_ONLY
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX
        } else {
            OpenFlags::default()
        }
    }
}

/// Applies the connector's settings to a freshly opened connection.
///
/// # Configuration Applied
///
/// - **`busy_timeout`**: the engine waits this long on a locked file before
///   returning `SQLITE_BUSY`
/// - **`journal_mode`**: only when configured; a mode the engine refuses
///   (in-memory or read-only files) is logged and otherwise ignored
///
/// # Errors
///
/// Returns a classified [`EngineFailure`] if a setting is rejected.
pub fn configure_connection(
    conn: &Connection,
    connector: &SqliteConnector,
) -> Result<(), EngineFailure> {
    conn.busy_timeout(connector.busy_timeout)
        .map_err(into_failure)?;

    if let Some(mode) = &connector.journal_mode {
        let applied: String = conn
            .pragma_update_and_check(None, "journal_mode", mode.as_str(), |row| row.get(0))
            .map_err(into_failure)?;
        if !applied.eq_ignore_ascii_case(mode) {
            tracing::warn!(
                requested = mode.as_str(),
                applied = applied.as_str(),
                "SQLite kept a different journal mode"
            );
        }
    }

    Ok(())
}

impl Connector for SqliteConnector {
    type Connection = SqliteConnection;

    fn connect(&self, location: &Path) -> Result<Self::Connection, EngineFailure> {
        let conn = Connection::open_with_flags(location, self.open_flags()).map_err(into_failure)?;
        configure_connection(&conn, self)?;
        Ok(SqliteConnection { conn })
    }
}

/// A configured `SQLite` connection.
#[derive(Debug)]
pub struct SqliteConnection {
    conn: Connection,
}

impl EngineConnection for SqliteConnection {
    fn query_first(&mut self, sql: &str) -> Result<Option<Row>, EngineFailure> {
        fetch_first_row(&self.conn, sql).map_err(into_failure)
    }

    fn execute(&mut self, sql: &str) -> Result<(), EngineFailure> {
        fetch_first_row(&self.conn, sql)
            .map(|_| ())
            .map_err(into_failure)
    }

    fn last_insert_rowid(&self) -> i64 {
        self.conn.last_insert_rowid()
    }

    fn close(self) -> Result<(), EngineFailure> {
        // On failure rusqlite hands the connection back; dropping it retries
        // the close and releases the handle regardless.
        self.conn.close().map_err(|(_conn, err)| into_failure(err))
    }
}
