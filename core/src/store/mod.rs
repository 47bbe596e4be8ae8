//! SQLite persistence layer.
//!
//! RULE: Only store/ talks to the database.
//! Workflow code calls store methods and never executes SQL directly.

mod assignment;
mod complaint;

pub use assignment::AssignmentStore;
pub use complaint::ComplaintStore;

use crate::error::DeskResult;
use rusqlite::{types::Type, Connection};
use std::time::Duration;

/// Open (or create) a database at `path`. ":memory:" opens a private
/// in-memory database.
pub(crate) fn open_connection(path: &str) -> DeskResult<Connection> {
    let conn = if path == ":memory:" {
        Connection::open_in_memory()?
    } else {
        let conn = Connection::open(path)?;
        // WAL mode only for real files.
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn
    };
    conn.busy_timeout(Duration::from_secs(5))?;
    migrate(&conn)?;
    Ok(conn)
}

/// Apply all schema migrations in order. Every migration is idempotent.
pub(crate) fn migrate(conn: &Connection) -> DeskResult<()> {
    conn.execute_batch(include_str!("../../migrations/001_complaints.sql"))?;
    conn.execute_batch(include_str!("../../migrations/002_auto_assignment.sql"))?;
    Ok(())
}

// ── Row decoding helpers ─────────────────────────────────────────────────────

/// Map a text column through `parse`, turning a miss into a conversion error.
pub(crate) fn parse_column<T>(
    row: &rusqlite::Row<'_>,
    idx: usize,
    parse: impl FnOnce(&str) -> Option<T>,
) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    parse(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("unrecognised value '{raw}'").into(),
        )
    })
}

/// Decode a JSON text column.
pub(crate) fn json_column<T: serde::de::DeserializeOwned>(
    row: &rusqlite::Row<'_>,
    idx: usize,
) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
