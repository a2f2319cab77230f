//! Grade repository: idempotent upserts and per-student reads.
//!
//! # Invariants
//! - One row per (student, section), enforced by `UNIQUE (student_id, section_id)`.
//! - An upsert is one statement: course id resolution, insert and overwrite
//!   happen together, so concurrent writers for the same pair converge on
//!   the last committed value.
//! - Overwrites keep the original term/academic year of the row.

use super::{RepoError, RepoResult};
use crate::model::grade::GradeRecord;
use crate::model::term::AcademicTerm;
use crate::model::{CourseId, FacultyId, SectionId, StudentId};
use rusqlite::{params, Connection, OptionalExtension, Row};

const GRADE_SELECT_SQL: &str = "SELECT
    g.student_id,
    g.section_id,
    g.course_id,
    c.code AS course_code,
    g.term,
    g.ay,
    g.grade,
    g.faculty_id,
    g.updated_at
FROM grades g
INNER JOIN courses c ON c.id = g.course_id";

/// One grade write.
#[derive(Debug, Clone, Copy)]
pub struct GradeUpsert<'a> {
    pub student_id: StudentId,
    pub section_id: SectionId,
    pub faculty_id: FacultyId,
    pub grade: f64,
    pub term: &'a AcademicTerm,
}

pub trait GradeRepository {
    /// Course the section belongs to, or `None` for an unknown section.
    fn resolve_course(&self, section_id: SectionId) -> RepoResult<Option<CourseId>>;
    /// Inserts or overwrites the grade for `(student_id, section_id)`.
    fn upsert_grade(&self, upsert: &GradeUpsert<'_>) -> RepoResult<()>;
    fn get_grade(
        &self,
        student_id: StudentId,
        section_id: SectionId,
    ) -> RepoResult<Option<GradeRecord>>;
    fn list_grades_for_student(&self, student_id: StudentId) -> RepoResult<Vec<GradeRecord>>;
}

pub struct SqliteGradeRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteGradeRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl GradeRepository for SqliteGradeRepository<'_> {
    fn resolve_course(&self, section_id: SectionId) -> RepoResult<Option<CourseId>> {
        let course_id = self
            .conn
            .query_row(
                "SELECT course_id FROM sections WHERE id = ?1;",
                [section_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(course_id)
    }

    fn upsert_grade(&self, upsert: &GradeUpsert<'_>) -> RepoResult<()> {
        // `WHERE` on the SELECT keeps SQLite from parsing `ON CONFLICT` as a join.
        let changed = self.conn.execute(
            "INSERT INTO grades (student_id, section_id, course_id, term, ay, grade, faculty_id)
             SELECT ?1, s.id, s.course_id, ?3, ?4, ?5, ?6
             FROM sections s
             WHERE s.id = ?2
             ON CONFLICT (student_id, section_id) DO UPDATE SET
                grade = excluded.grade,
                faculty_id = excluded.faculty_id,
                course_id = excluded.course_id,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![
                upsert.student_id,
                upsert.section_id,
                upsert.term.term(),
                upsert.term.academic_year(),
                upsert.grade,
                upsert.faculty_id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::SectionNotFound(upsert.section_id));
        }
        Ok(())
    }

    fn get_grade(
        &self,
        student_id: StudentId,
        section_id: SectionId,
    ) -> RepoResult<Option<GradeRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "{GRADE_SELECT_SQL}
             WHERE g.student_id = ?1
               AND g.section_id = ?2;"
        ))?;
        let mut rows = stmt.query(params![student_id, section_id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_grade_row(row)?));
        }
        Ok(None)
    }

    fn list_grades_for_student(&self, student_id: StudentId) -> RepoResult<Vec<GradeRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "{GRADE_SELECT_SQL}
             WHERE g.student_id = ?1
             ORDER BY g.section_id ASC;"
        ))?;
        let mut rows = stmt.query([student_id])?;
        let mut grades = Vec::new();
        while let Some(row) = rows.next()? {
            grades.push(parse_grade_row(row)?);
        }
        Ok(grades)
    }
}

fn parse_grade_row(row: &Row<'_>) -> RepoResult<GradeRecord> {
    let grade: f64 = row.get("grade")?;
    if !grade.is_finite() {
        return Err(RepoError::InvalidData(format!(
            "non-finite grade `{grade}` in grades.grade"
        )));
    }

    Ok(GradeRecord {
        student_id: row.get("student_id")?,
        section_id: row.get("section_id")?,
        course_id: row.get("course_id")?,
        course_code: row.get("course_code")?,
        term: row.get("term")?,
        academic_year: row.get("ay")?,
        grade,
        faculty_id: row.get("faculty_id")?,
        updated_at: row.get("updated_at")?,
    })
}
