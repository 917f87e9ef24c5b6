//! Connection bootstrap for the catalog database.
//!
//! # Responsibility
//! - Open an existing SQLite file read-only.
//! - Surface missing/corrupt/unreadable files at connect time.
//!
//! # Invariants
//! - The file is never created by `connect`.
//! - No schema shape is checked here.

use super::{ConnectionError, DEFAULT_DB_PATH};
use log::{error, info};
use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use std::time::{Duration, Instant};

/// Opens the catalog database at `path`, or at [`DEFAULT_DB_PATH`] when `None`.
///
/// # Side effects
/// - Emits `db_connect` logging events with duration and status.
///
/// # Errors
/// - Returns [`ConnectionError`] when the file is missing, unreadable or is
///   not a SQLite database.
pub fn connect(path: Option<&Path>) -> Result<Connection, ConnectionError> {
    let path = path.unwrap_or_else(|| Path::new(DEFAULT_DB_PATH));
    let started_at = Instant::now();
    info!("event=db_connect module=db status=start");

    match open_and_probe(path) {
        Ok(conn) => {
            info!(
                "event=db_connect module=db status=ok duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_connect module=db status=error duration_ms={} error_code=db_open_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(ConnectionError {
                path: path.to_path_buf(),
                source: err,
            })
        }
    }
}

fn open_and_probe(path: &Path) -> rusqlite::Result<Connection> {
    let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    let conn = Connection::open_with_flags(path, flags)?;
    conn.busy_timeout(Duration::from_secs(5))?;
    // SQLite opens lazily; the header is only read on first access.
    conn.query_row("SELECT count(*) FROM sqlite_master;", [], |row| {
        row.get::<_, i64>(0)
    })?;
    Ok(conn)
}
