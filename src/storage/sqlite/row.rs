//! First-row fetch for `SQLite` statements.

use crate::models::{Row, Value};
use rusqlite::fallible_iterator::FallibleIterator;
use rusqlite::types::ValueRef;
use rusqlite::{Batch, Connection};

/// Prepares the first statement of `sql`, steps it once and converts the
/// first row, if any.
///
/// Statements that produce no rows (DDL, inserts, updates) run to completion
/// on that single step and yield `None`. Any statements after the first are
/// neither prepared nor executed, so syntax errors in them go unnoticed.
/// Text holding no statement at all yields `None`.
///
/// # Errors
///
/// Returns the `rusqlite` error from preparing or stepping the statement.
pub fn fetch_first_row(conn: &Connection, sql: &str) -> rusqlite::Result<Option<Row>> {
    let Some(mut stmt) = Batch::new(conn, sql).next()? else {
        return Ok(None);
    };
    let columns = stmt.column_count();
    let mut rows = stmt.query([])?;

    let Some(row) = rows.next()? else {
        return Ok(None);
    };

    let values = (0..columns)
        .map(|idx| row.get_ref(idx).map(value_from_ref))
        .collect::<rusqlite::Result<Row>>()?;

    Ok(Some(values))
}

fn value_from_ref(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(v) => Value::Integer(v),
        ValueRef::Real(v) => Value::Real(v),
        // TEXT written through the C API may hold arbitrary bytes.
        ValueRef::Text(bytes) => match std::str::from_utf8(bytes) {
            Ok(text) => Value::Text(text.to_owned()),
            Err(_) => Value::Blob(bytes.to_vec()),
        },
        ValueRef::Blob(bytes) => Value::Blob(bytes.to_vec()),
    }
}
