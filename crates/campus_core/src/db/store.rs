//! Process-wide storage handle.
//!
//! # Responsibility
//! - Bootstrap the database once at startup (migrations included).
//! - Hand out connections to concurrent callers and recycle idle ones.
//! - Release every idle connection at shutdown.
//!
//! # Invariants
//! - A connection is used by exactly one caller at a time.
//! - Connections left inside an open transaction are never recycled.
//! - After [`Store::close`], checkouts fail with [`DbError::StoreClosed`].

use super::open::{connect_db, open_db};
use super::{DbError, DbResult};
use log::{info, warn};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

const MAX_IDLE_CONNECTIONS: usize = 8;

/// Shared handle to the campus database file.
///
/// Engines receive this by injection (usually behind an `Arc`) instead of
/// reaching for a global connection.
#[derive(Debug)]
pub struct Store {
    path: PathBuf,
    idle: Mutex<Vec<Connection>>,
    closed: AtomicBool,
}

impl Store {
    /// Opens the database at `path`, applying pending migrations.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        let path = path.as_ref().to_path_buf();
        let bootstrap = open_db(&path)?;
        info!(
            "event=store_open module=db status=ok path={}",
            path.display()
        );
        Ok(Self {
            path,
            idle: Mutex::new(vec![bootstrap]),
            closed: AtomicBool::new(false),
        })
    }

    /// Database file backing this store.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Runs `f` with an exclusively borrowed connection.
    ///
    /// The connection returns to the idle pool afterwards unless the pool is
    /// full, the store was closed, or `f` left a transaction open.
    pub fn with_connection<T, E>(
        &self,
        f: impl FnOnce(&mut Connection) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<DbError>,
    {
        let mut conn = self.checkout()?;
        let result = f(&mut conn);
        self.checkin(conn);
        result
    }

    /// Drops all idle connections and rejects further checkouts.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        let released = {
            let mut idle = self.lock_idle();
            let count = idle.len();
            idle.clear();
            count
        };
        info!(
            "event=store_close module=db status=ok released_connections={}",
            released
        );
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Number of connections currently parked in the pool.
    pub fn idle_connections(&self) -> usize {
        self.lock_idle().len()
    }

    fn checkout(&self) -> DbResult<Connection> {
        if self.is_closed() {
            return Err(DbError::StoreClosed);
        }
        if let Some(conn) = self.lock_idle().pop() {
            return Ok(conn);
        }
        connect_db(&self.path)
    }

    fn checkin(&self, conn: Connection) {
        if self.is_closed() {
            return;
        }
        if !conn.is_autocommit() {
            warn!("event=store_checkin module=db status=discarded reason=open_transaction");
            return;
        }
        let mut idle = self.lock_idle();
        if idle.len() < MAX_IDLE_CONNECTIONS {
            idle.push(conn);
        }
    }

    fn lock_idle(&self) -> MutexGuard<'_, Vec<Connection>> {
        // The pool holds no invariants a panicking holder could break.
        self.idle
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for Store {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::Store;
    use crate::db::DbError;

    #[test]
    fn connections_are_recycled_between_calls() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path().join("campus.db")).unwrap();
        assert_eq!(store.idle_connections(), 1);

        let value: i64 = store
            .with_connection(|conn| {
                conn.query_row("SELECT 41 + 1;", [], |row| row.get(0))
                    .map_err(DbError::from)
            })
            .unwrap();
        assert_eq!(value, 42);
        assert_eq!(store.idle_connections(), 1);
    }

    #[test]
    fn connection_left_in_transaction_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path().join("campus.db")).unwrap();

        store
            .with_connection(|conn| conn.execute_batch("BEGIN;").map_err(DbError::from))
            .unwrap();
        assert_eq!(store.idle_connections(), 0);
    }

    #[test]
    fn closed_store_rejects_checkout() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path().join("campus.db")).unwrap();
        store.close();

        let err = store
            .with_connection(|_| Ok::<_, DbError>(()))
            .unwrap_err();
        assert!(matches!(err, DbError::StoreClosed));
        assert_eq!(store.idle_connections(), 0);
    }
}
