//! Repository contracts and SQLite implementations.
//!
//! # Responsibility
//! - Keep SQL inside the persistence boundary.
//! - Express storage-level invariants (uniqueness, conditional writes) as
//!   semantic results instead of raw SQLite errors.
//!
//! # Invariants
//! - Read paths reject invalid persisted state instead of masking it.
//! - Constraint violations the engines care about are classified here, once.

pub mod catalog_repo;
pub mod enrollment_repo;
pub mod grade_repo;

use crate::db::DbError;
use crate::model::SectionId;
use rusqlite::{ffi, ErrorCode};

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("section not found: {0}")]
    SectionNotFound(SectionId),
    #[error("invalid persisted data: {0}")]
    InvalidData(String),
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl RepoError {
    /// Constraint class of the underlying SQLite failure, if any.
    pub fn constraint(&self) -> Option<Constraint> {
        match self {
            Self::Db(DbError::Sqlite(err)) => constraint_of(err),
            _ => None,
        }
    }
}

/// Storage constraint classes surfaced to engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    Unique,
    ForeignKey,
    Other,
}

/// Classifies a SQLite error as a constraint violation.
pub fn constraint_of(err: &rusqlite::Error) -> Option<Constraint> {
    let rusqlite::Error::SqliteFailure(failure, _) = err else {
        return None;
    };
    if failure.code != ErrorCode::ConstraintViolation {
        return None;
    }
    Some(match failure.extended_code {
        ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => Constraint::Unique,
        ffi::SQLITE_CONSTRAINT_FOREIGNKEY => Constraint::ForeignKey,
        _ => Constraint::Other,
    })
}
