//! `SQLite` engine binding.
//!
//! ## Module Structure
//!
//! - [`connection`]: connector, connection configuration and error classification
//! - [`row`]: conversion of the first result row into a positional [`Row`](crate::models::Row)

mod connection;
mod row;

pub use connection::{
    DEFAULT_BUSY_TIMEOUT, MIN_BUSY_TIMEOUT, SqliteConnection, SqliteConnector, classify_error,
    configure_connection,
};
pub use row::fetch_first_row;
