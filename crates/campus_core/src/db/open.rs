//! Connection bootstrap for SQLite.
//!
//! # Responsibility
//! - Open file or in-memory connections with the pragmas the core relies on.
//! - Run migrations for bootstrap connections.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON`.
//! - Concurrent writers wait up to [`BUSY_TIMEOUT`] for the write lock.

use super::migrations::apply_migrations;
use super::DbResult;
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

pub(crate) const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens a SQLite database file and applies all pending migrations.
///
/// Emits `db_open` events with duration and status.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let path = path.as_ref();
    open_logged("file", || Connection::open(path), true)
}

/// Opens an in-memory SQLite database and applies all pending migrations.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_logged("memory", Connection::open_in_memory, true)
}

/// Opens an additional connection to an already migrated database file.
///
/// Used by the store pool; schema checks happen once in [`open_db`].
pub(crate) fn connect_db(path: &Path) -> DbResult<Connection> {
    open_logged("pooled", || Connection::open(path), false)
}

fn open_logged(
    mode: &str,
    opener: impl FnOnce() -> rusqlite::Result<Connection>,
    migrate: bool,
) -> DbResult<Connection> {
    let started_at = Instant::now();

    let mut conn = opener().map_err(|err| {
        error!(
            "event=db_open module=db status=error mode={} duration_ms={} error_code=db_open_failed error={}",
            mode,
            started_at.elapsed().as_millis(),
            err
        );
        err
    })?;

    if let Err(err) = configure_connection(&mut conn, migrate) {
        error!(
            "event=db_open module=db status=error mode={} duration_ms={} error_code=db_bootstrap_failed error={}",
            mode,
            started_at.elapsed().as_millis(),
            err
        );
        return Err(err);
    }

    info!(
        "event=db_open module=db status=ok mode={} migrate={} duration_ms={}",
        mode,
        migrate,
        started_at.elapsed().as_millis()
    );
    Ok(conn)
}

fn configure_connection(conn: &mut Connection, migrate: bool) -> DbResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    if migrate {
        apply_migrations(conn)?;
    }
    Ok(())
}
