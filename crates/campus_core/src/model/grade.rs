//! Grade records, batch inputs and per-batch reports.

use super::{CourseId, FacultyId, SectionId, StudentId};
use serde::Serialize;

/// Stored grade joined with its course code.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeRecord {
    pub student_id: StudentId,
    pub section_id: SectionId,
    pub course_id: CourseId,
    pub course_code: String,
    pub term: String,
    #[serde(rename = "ay")]
    pub academic_year: String,
    pub grade: f64,
    pub faculty_id: FacultyId,
    /// Epoch milliseconds of the last write.
    pub updated_at: i64,
}

/// One unvalidated entry of a grade submission.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GradeEntry {
    pub student_id: Option<StudentId>,
    pub grade: Option<f64>,
}

impl GradeEntry {
    pub fn new(student_id: StudentId, grade: f64) -> Self {
        Self {
            student_id: Some(student_id),
            grade: Some(grade),
        }
    }
}

/// A grade submission for one section.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordGradesRequest {
    pub section_id: Option<SectionId>,
    pub faculty_id: Option<FacultyId>,
    pub entries: Vec<GradeEntry>,
}

/// Validated entry ready for the ledger.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradeAssignment {
    pub student_id: StudentId,
    pub grade: f64,
}

/// Per-entry failure inside a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryFailure {
    pub student_id: StudentId,
    pub reason: String,
}

/// What happened to each entry of a batch that reached storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeBatchReport {
    pub applied: usize,
    pub failures: Vec<EntryFailure>,
}

impl GradeBatchReport {
    pub fn attempted(&self) -> usize {
        self.applied + self.failures.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}
