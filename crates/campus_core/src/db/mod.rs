//! SQLite storage bootstrap, schema migrations and the shared store handle.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the campus core.
//! - Apply schema migrations in deterministic order.
//! - Own the process-wide [`Store`] that engines check connections out of.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - No enrollment or grade data is touched before migrations succeed.
//! - Every connection handed out has `foreign_keys=ON` and a busy timeout.

pub mod migrations;
mod open;
mod store;

pub use open::{open_db, open_db_in_memory};
pub use store::Store;

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
    #[error("database schema version {db_version} is newer than supported {latest_supported}")]
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    #[error("store has been closed")]
    StoreClosed,
}
