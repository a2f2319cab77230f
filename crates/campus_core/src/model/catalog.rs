//! Catalog records the core needs for seeding and denormalized reads.

use super::{CourseId, SectionId};
use serde::{Deserialize, Serialize};

/// Role stored on a user row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Student,
    Faculty,
}

impl UserRole {
    pub fn as_db(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Faculty => "faculty",
        }
    }
}

/// Admission status of a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionStatus {
    /// Accepts new enrollments while seats remain.
    Open,
    /// Rejects every new enrollment.
    Closed,
}

impl SectionStatus {
    pub fn as_db(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "open" => Some(Self::Open),
            "closed" => Some(Self::Closed),
            _ => None,
        }
    }
}

/// Input for creating a course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCourse {
    /// Explicit id, or `None` to let storage assign one.
    pub id: Option<CourseId>,
    pub code: String,
    pub title: String,
}

/// Input for creating a section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSection {
    /// Explicit id, or `None` to let storage assign one.
    pub id: Option<SectionId>,
    pub course_id: CourseId,
    pub section_code: String,
    /// Must be positive.
    pub capacity: u32,
    pub status: SectionStatus,
}

/// Capacity snapshot of one section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionOccupancy {
    pub section_id: SectionId,
    pub capacity: u32,
    /// Count of `enrolled` rows at read time.
    pub occupancy: u32,
    pub status: SectionStatus,
}

impl SectionOccupancy {
    pub fn has_free_seat(&self) -> bool {
        self.occupancy < self.capacity
    }

    pub fn seats_left(&self) -> u32 {
        self.capacity.saturating_sub(self.occupancy)
    }
}
