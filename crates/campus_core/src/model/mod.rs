//! Domain model for sections, enrollments and grades.
//!
//! # Responsibility
//! - Define the records exchanged between repositories, engines and callers.
//! - Define the structured outcome taxonomy returned by every write path.
//!
//! # Invariants
//! - Identifiers are plain integers; `0` is a valid identifier.
//! - Occupancy is never stored, only derived from active enrollments.

pub mod catalog;
pub mod enrollment;
pub mod grade;
pub mod outcome;
pub mod term;

/// Identifier of a user acting as a student.
pub type StudentId = i64;
/// Identifier of a user acting as faculty.
pub type FacultyId = i64;
/// Identifier of a scheduled course section.
pub type SectionId = i64;
/// Identifier of a catalog course.
pub type CourseId = i64;
/// Identifier of one enrollment row.
pub type EnrollmentId = i64;
