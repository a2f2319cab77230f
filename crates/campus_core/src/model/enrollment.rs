//! Enrollment records and list filters.

use super::{CourseId, EnrollmentId, SectionId, StudentId};
use serde::{Deserialize, Serialize};

/// Lifecycle state of one enrollment row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    /// Holds a seat; counted in occupancy.
    Enrolled,
    /// Seat released; kept as history.
    Dropped,
}

impl EnrollmentStatus {
    pub fn as_db(self) -> &'static str {
        match self {
            Self::Enrolled => "enrolled",
            Self::Dropped => "dropped",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "enrolled" => Some(Self::Enrolled),
            "dropped" => Some(Self::Dropped),
            _ => None,
        }
    }

    pub fn is_active(self) -> bool {
        self == Self::Enrolled
    }
}

/// Enrollment read model with course/section/student display fields joined in.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentRecord {
    pub id: EnrollmentId,
    pub student_id: StudentId,
    pub section_id: SectionId,
    pub course_id: CourseId,
    pub course_code: String,
    pub course_title: String,
    pub section_code: String,
    /// `None` when the user row carries no display name.
    pub student_name: Option<String>,
    pub status: EnrollmentStatus,
    pub term: String,
    #[serde(rename = "ay")]
    pub academic_year: String,
    /// Epoch milliseconds.
    pub created_at: i64,
    /// Current grade for this (student, section), if one was recorded.
    pub grade: Option<f64>,
}

/// Filter for enrollment listings.
///
/// Both keys absent means "nothing requested" and yields an empty list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrollmentFilter {
    pub student_id: Option<StudentId>,
    pub section_id: Option<SectionId>,
}

impl EnrollmentFilter {
    pub fn by_student(student_id: StudentId) -> Self {
        Self {
            student_id: Some(student_id),
            section_id: None,
        }
    }

    pub fn by_section(section_id: SectionId) -> Self {
        Self {
            student_id: None,
            section_id: Some(section_id),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.student_id.is_none() && self.section_id.is_none()
    }
}
