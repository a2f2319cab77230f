//! Core of the campus enrollment platform.
//!
//! Owns the two places with real invariants: seat admission against section
//! capacity and idempotent grade recording. Everything is reached through a
//! [`Store`] opened once at startup and injected into the engines.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{CampusConfig, ConfigError};
pub use db::{DbError, DbResult, Store};
pub use logging::{default_log_level, init_from_config, init_logging, logging_status, LoggingError};
pub use model::catalog::{NewCourse, NewSection, SectionOccupancy, SectionStatus, UserRole};
pub use model::enrollment::{EnrollmentFilter, EnrollmentRecord, EnrollmentStatus};
pub use model::grade::{
    EntryFailure, GradeBatchReport, GradeEntry, GradeRecord, RecordGradesRequest,
};
pub use model::outcome::{ErrorKind, Outcome, RejectionReason, INTERNAL_ERROR_MESSAGE};
pub use model::term::{AcademicTerm, TermError};
pub use model::{CourseId, EnrollmentId, FacultyId, SectionId, StudentId};
pub use repo::catalog_repo::{CatalogRepository, SqliteCatalogRepository};
pub use repo::{RepoError, RepoResult};
pub use service::admission_service::AdmissionEngine;
pub use service::grade_service::{GradeBatchOutcome, GradeLedger};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
