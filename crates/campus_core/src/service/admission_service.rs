//! Admission Engine: binds students to capacity-limited sections.
//!
//! # Invariants
//! - `0` is a valid student or section id; only absent ids are rejected.
//! - Admission decisions for the same section are totally ordered by the
//!   repository's immediate transaction.
//! - Internal failures are logged with detail and surfaced generically.

use crate::db::Store;
use crate::model::catalog::SectionOccupancy;
use crate::model::enrollment::{EnrollmentFilter, EnrollmentRecord};
use crate::model::outcome::{Outcome, RejectionReason};
use crate::model::term::AcademicTerm;
use crate::model::{SectionId, StudentId};
use crate::repo::enrollment_repo::{
    AdmissionDecision, EnrollmentRepository, SqliteEnrollmentRepository,
};
use crate::repo::RepoResult;
use log::{error, info};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

pub const ENROLLED_MESSAGE: &str = "Enrolled successfully";
pub const DROPPED_MESSAGE: &str = "Enrollment dropped";
pub const MISSING_ENROLLMENT_KEYS: &str = "Missing studentId or sectionId";

#[derive(Debug, Clone)]
pub struct AdmissionEngine {
    store: Arc<Store>,
    term: AcademicTerm,
}

impl AdmissionEngine {
    pub fn new(store: Arc<Store>, term: AcademicTerm) -> Self {
        Self { store, term }
    }

    pub fn term(&self) -> &AcademicTerm {
        &self.term
    }

    /// Reserves a seat for `student_id` in `section_id`.
    ///
    /// Rejection order: missing ids, unknown section, closed section, full
    /// section, duplicate active enrollment, storage failure.
    pub fn request_enrollment(
        &self,
        student_id: Option<StudentId>,
        section_id: Option<SectionId>,
    ) -> Outcome {
        let request_id = Uuid::new_v4();
        let started_at = Instant::now();
        let (Some(student_id), Some(section_id)) = (student_id, section_id) else {
            let outcome = Outcome::from(RejectionReason::InvalidRequest(
                MISSING_ENROLLMENT_KEYS.to_string(),
            ));
            log_outcome("enroll_request", request_id, student_id, section_id, &outcome, started_at);
            return outcome;
        };

        info!(
            "event=enroll_request module=admission status=start request_id={} student_id={} section_id={}",
            request_id, student_id, section_id
        );

        let decision = self.store.with_connection(|conn| {
            SqliteEnrollmentRepository::new(conn).admit(student_id, section_id, &self.term)
        });

        let outcome = match decision {
            Ok(AdmissionDecision::Admitted { enrollment_id }) => {
                info!(
                    "event=enroll_commit module=admission status=ok request_id={} enrollment_id={}",
                    request_id, enrollment_id
                );
                Outcome::Accepted(ENROLLED_MESSAGE)
            }
            Ok(AdmissionDecision::SectionNotFound) => RejectionReason::SectionNotFound.into(),
            Ok(AdmissionDecision::SectionClosed) => RejectionReason::SectionClosed.into(),
            Ok(AdmissionDecision::SectionFull {
                capacity,
                occupancy,
            }) => {
                info!(
                    "event=enroll_capacity module=admission status=full request_id={} capacity={} occupancy={}",
                    request_id, capacity, occupancy
                );
                RejectionReason::SectionFull.into()
            }
            Ok(AdmissionDecision::AlreadyEnrolled) => RejectionReason::AlreadyEnrolled.into(),
            Err(err) => {
                error!(
                    "event=enroll_request module=admission status=error request_id={} student_id={} section_id={} error={}",
                    request_id, student_id, section_id, err
                );
                RejectionReason::InternalError.into()
            }
        };

        log_outcome(
            "enroll_request",
            request_id,
            Some(student_id),
            Some(section_id),
            &outcome,
            started_at,
        );
        outcome
    }

    /// Releases the active seat held by `student_id` in `section_id`.
    ///
    /// Recorded grades are left untouched.
    pub fn drop_enrollment(
        &self,
        student_id: Option<StudentId>,
        section_id: Option<SectionId>,
    ) -> Outcome {
        let request_id = Uuid::new_v4();
        let started_at = Instant::now();
        let (Some(student_id), Some(section_id)) = (student_id, section_id) else {
            let outcome = Outcome::from(RejectionReason::InvalidRequest(
                MISSING_ENROLLMENT_KEYS.to_string(),
            ));
            log_outcome("drop_request", request_id, student_id, section_id, &outcome, started_at);
            return outcome;
        };

        let dropped = self.store.with_connection(|conn| {
            SqliteEnrollmentRepository::new(conn).drop_active(student_id, section_id)
        });

        let outcome = match dropped {
            Ok(true) => Outcome::Accepted(DROPPED_MESSAGE),
            Ok(false) => RejectionReason::NotEnrolled.into(),
            Err(err) => {
                error!(
                    "event=drop_request module=admission status=error request_id={} student_id={} section_id={} error={}",
                    request_id, student_id, section_id, err
                );
                RejectionReason::InternalError.into()
            }
        };

        log_outcome(
            "drop_request",
            request_id,
            Some(student_id),
            Some(section_id),
            &outcome,
            started_at,
        );
        outcome
    }

    /// Capacity snapshot derived from active enrollments.
    pub fn section_occupancy(&self, section_id: SectionId) -> RepoResult<Option<SectionOccupancy>> {
        self.store.with_connection(|conn| {
            SqliteEnrollmentRepository::new(conn).section_occupancy(section_id)
        })
    }

    /// Lists enrollments matching `filter`; an empty filter yields no rows.
    pub fn list_enrollments(&self, filter: &EnrollmentFilter) -> RepoResult<Vec<EnrollmentRecord>> {
        if filter.is_empty() {
            return Ok(Vec::new());
        }
        self.store.with_connection(|conn| {
            SqliteEnrollmentRepository::new(conn).list_enrollments(filter)
        })
    }
}

fn log_outcome(
    event: &str,
    request_id: Uuid,
    student_id: Option<StudentId>,
    section_id: Option<SectionId>,
    outcome: &Outcome,
    started_at: Instant,
) {
    let student = student_id.map_or_else(|| "none".to_string(), |id| id.to_string());
    let section = section_id.map_or_else(|| "none".to_string(), |id| id.to_string());
    match outcome.rejection() {
        None => info!(
            "event={} module=admission status=accepted request_id={} student_id={} section_id={} duration_ms={}",
            event,
            request_id,
            student,
            section,
            started_at.elapsed().as_millis()
        ),
        Some(reason) => info!(
            "event={} module=admission status=rejected request_id={} student_id={} section_id={} reason={} duration_ms={}",
            event,
            request_id,
            student,
            section,
            reason.code(),
            started_at.elapsed().as_millis()
        ),
    }
}
