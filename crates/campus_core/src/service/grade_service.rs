//! Grade Ledger: idempotent recording of section grades.
//!
//! # Invariants
//! - Malformed batches are rejected before any storage access.
//! - Entries are written independently; one failing entry never prevents
//!   the remaining entries from being attempted.
//! - Re-submitting an identical batch leaves the same stored grades.

use crate::db::Store;
use crate::model::grade::{
    EntryFailure, GradeAssignment, GradeBatchReport, GradeEntry, GradeRecord, RecordGradesRequest,
};
use crate::model::outcome::{Outcome, RejectionReason};
use crate::model::term::AcademicTerm;
use crate::model::{FacultyId, SectionId, StudentId};
use crate::repo::grade_repo::{GradeRepository, GradeUpsert, SqliteGradeRepository};
use crate::repo::{Constraint, RepoError, RepoResult};
use log::{error, info, warn};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

pub const GRADES_RECORDED_MESSAGE: &str = "Grades uploaded";
pub const MISSING_GRADE_KEYS: &str = "Missing sectionId, facultyId, or grades";

/// Outcome of a batch plus what happened to each entry that reached storage.
#[derive(Debug, Clone, PartialEq)]
pub struct GradeBatchOutcome {
    pub outcome: Outcome,
    pub report: GradeBatchReport,
}

impl GradeBatchOutcome {
    fn rejected(reason: RejectionReason) -> Self {
        Self {
            outcome: reason.into(),
            report: GradeBatchReport::default(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_success()
    }

    pub fn message(&self) -> String {
        self.outcome.message()
    }
}

#[derive(Debug, Clone)]
pub struct GradeLedger {
    store: Arc<Store>,
    term: AcademicTerm,
}

impl GradeLedger {
    pub fn new(store: Arc<Store>, term: AcademicTerm) -> Self {
        Self { store, term }
    }

    /// Upserts every entry of `request` keyed by (student, section).
    pub fn record_grades(&self, request: &RecordGradesRequest) -> GradeBatchOutcome {
        let request_id = Uuid::new_v4();
        let started_at = Instant::now();

        let (section_id, faculty_id, assignments) = match validate_request(request) {
            Ok(validated) => validated,
            Err(reason) => {
                warn!(
                    "event=grades_record module=grades status=rejected request_id={} reason={} detail={}",
                    request_id,
                    reason.code(),
                    reason.message()
                );
                return GradeBatchOutcome::rejected(reason);
            }
        };

        info!(
            "event=grades_record module=grades status=start request_id={} section_id={} faculty_id={} entries={}",
            request_id,
            section_id,
            faculty_id,
            assignments.len()
        );

        let applied = self
            .store
            .with_connection(|conn| -> RepoResult<Option<GradeBatchReport>> {
                let repo = SqliteGradeRepository::new(conn);
                if repo.resolve_course(section_id)?.is_none() {
                    return Ok(None);
                }
                Ok(Some(apply_batch(
                    &repo,
                    request_id,
                    section_id,
                    faculty_id,
                    &assignments,
                    &self.term,
                )))
            });

        let result = match applied {
            Ok(None) => GradeBatchOutcome::rejected(RejectionReason::SectionNotFound),
            Ok(Some(report)) if report.is_complete() => GradeBatchOutcome {
                outcome: Outcome::Accepted(GRADES_RECORDED_MESSAGE),
                report,
            },
            Ok(Some(report)) => GradeBatchOutcome {
                outcome: RejectionReason::PartiallyApplied {
                    applied: report.applied,
                    failed: report.failures.len(),
                }
                .into(),
                report,
            },
            Err(err) => {
                error!(
                    "event=grades_record module=grades status=error request_id={} section_id={} error={}",
                    request_id, section_id, err
                );
                GradeBatchOutcome::rejected(RejectionReason::InternalError)
            }
        };

        let status = if result.is_success() {
            "accepted"
        } else {
            "rejected"
        };
        info!(
            "event=grades_record module=grades status={} request_id={} applied={} failed={} duration_ms={}",
            status,
            request_id,
            result.report.applied,
            result.report.failures.len(),
            started_at.elapsed().as_millis()
        );
        result
    }

    /// Grades recorded for `student_id`; empty when the id is absent.
    pub fn get_grades(&self, student_id: Option<StudentId>) -> RepoResult<Vec<GradeRecord>> {
        let Some(student_id) = student_id else {
            return Ok(Vec::new());
        };
        self.store.with_connection(|conn| {
            SqliteGradeRepository::new(conn).list_grades_for_student(student_id)
        })
    }

    /// Current grade for one (student, section) pair.
    pub fn grade_for(
        &self,
        student_id: StudentId,
        section_id: SectionId,
    ) -> RepoResult<Option<GradeRecord>> {
        self.store.with_connection(|conn| {
            SqliteGradeRepository::new(conn).get_grade(student_id, section_id)
        })
    }
}

fn validate_request(
    request: &RecordGradesRequest,
) -> Result<(SectionId, FacultyId, Vec<GradeAssignment>), RejectionReason> {
    let (Some(section_id), Some(faculty_id)) = (request.section_id, request.faculty_id) else {
        return Err(RejectionReason::InvalidRequest(MISSING_GRADE_KEYS.to_string()));
    };
    if request.entries.is_empty() {
        return Err(RejectionReason::InvalidRequest(MISSING_GRADE_KEYS.to_string()));
    }

    let assignments = request
        .entries
        .iter()
        .enumerate()
        .map(|(index, entry)| validate_entry(index, entry))
        .collect::<Result<Vec<_>, _>>()?;
    Ok((section_id, faculty_id, assignments))
}

fn validate_entry(index: usize, entry: &GradeEntry) -> Result<GradeAssignment, RejectionReason> {
    let Some(student_id) = entry.student_id else {
        return Err(RejectionReason::InvalidRequest(format!(
            "Grade entry {index} is missing studentId"
        )));
    };
    match entry.grade {
        Some(grade) if grade.is_finite() => Ok(GradeAssignment { student_id, grade }),
        _ => Err(RejectionReason::InvalidRequest(format!(
            "Grade entry {index} for student {student_id} is not a number"
        ))),
    }
}

fn apply_batch(
    repo: &impl GradeRepository,
    request_id: Uuid,
    section_id: SectionId,
    faculty_id: FacultyId,
    assignments: &[GradeAssignment],
    term: &AcademicTerm,
) -> GradeBatchReport {
    let mut report = GradeBatchReport::default();
    for assignment in assignments {
        let upsert = GradeUpsert {
            student_id: assignment.student_id,
            section_id,
            faculty_id,
            grade: assignment.grade,
            term,
        };
        match repo.upsert_grade(&upsert) {
            Ok(()) => report.applied += 1,
            Err(err) => {
                error!(
                    "event=grade_upsert module=grades status=error request_id={} student_id={} section_id={} error={}",
                    request_id, assignment.student_id, section_id, err
                );
                report.failures.push(EntryFailure {
                    student_id: assignment.student_id,
                    reason: entry_failure_reason(&err).to_string(),
                });
            }
        }
    }
    report
}

fn entry_failure_reason(err: &RepoError) -> &'static str {
    match (err, err.constraint()) {
        (RepoError::SectionNotFound(_), _) => "section not found",
        (_, Some(Constraint::ForeignKey)) => "unknown student",
        _ => "storage error",
    }
}
