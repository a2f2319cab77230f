//! Enrollment repository: seat admission, drops and roster queries.
//!
//! # Responsibility
//! - Run the admission protocol (lookup, status, occupancy, insert) as one
//!   indivisible unit against storage.
//! - Provide denormalized enrollment listings.
//!
//! # Invariants
//! - Admission holds the SQLite write lock (`BEGIN IMMEDIATE`) from the
//!   section lookup until commit, so occupancy cannot change between the
//!   capacity check and the insert.
//! - Occupancy is always `COUNT(*)` over `enrolled` rows; nothing caches it.
//! - Duplicate active enrollments are rejected by the partial unique index
//!   `uq_enrollments_active`, not by a prior read.

use super::{Constraint, RepoError, RepoResult};
use crate::model::catalog::{SectionOccupancy, SectionStatus};
use crate::model::enrollment::{EnrollmentFilter, EnrollmentRecord, EnrollmentStatus};
use crate::model::term::AcademicTerm;
use crate::model::{EnrollmentId, SectionId, StudentId};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};

const ENROLLMENT_SELECT_SQL: &str = "SELECT
    e.id,
    e.student_id,
    e.section_id,
    e.term,
    e.ay,
    e.status,
    e.created_at,
    s.course_id,
    s.section_code,
    c.code AS course_code,
    c.title AS course_title,
    u.name AS student_name,
    g.grade
FROM enrollments e
INNER JOIN sections s ON s.id = e.section_id
INNER JOIN courses c ON c.id = s.course_id
LEFT JOIN users u ON u.id = e.student_id
LEFT JOIN grades g
    ON g.student_id = e.student_id
   AND g.section_id = e.section_id";

/// Storage-level result of one admission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionDecision {
    Admitted { enrollment_id: EnrollmentId },
    SectionNotFound,
    SectionClosed,
    SectionFull { capacity: u32, occupancy: u32 },
    AlreadyEnrolled,
}

pub trait EnrollmentRepository {
    /// Atomically checks capacity and reserves one seat.
    fn admit(
        &mut self,
        student_id: StudentId,
        section_id: SectionId,
        term: &AcademicTerm,
    ) -> RepoResult<AdmissionDecision>;
    /// Marks the active enrollment dropped. Returns `false` when none exists.
    fn drop_active(&mut self, student_id: StudentId, section_id: SectionId) -> RepoResult<bool>;
    fn section_occupancy(&self, section_id: SectionId) -> RepoResult<Option<SectionOccupancy>>;
    /// Lists active and dropped rows matching `filter`, oldest first.
    fn list_enrollments(&self, filter: &EnrollmentFilter) -> RepoResult<Vec<EnrollmentRecord>>;
}

pub struct SqliteEnrollmentRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteEnrollmentRepository<'conn> {
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }
}

impl EnrollmentRepository for SqliteEnrollmentRepository<'_> {
    fn admit(
        &mut self,
        student_id: StudentId,
        section_id: SectionId,
        term: &AcademicTerm,
    ) -> RepoResult<AdmissionDecision> {
        // Dropping `tx` on any early return rolls back and releases the lock.
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let Some(section) = load_occupancy(&tx, section_id)? else {
            return Ok(AdmissionDecision::SectionNotFound);
        };
        if section.status != SectionStatus::Open {
            return Ok(AdmissionDecision::SectionClosed);
        }
        if !section.has_free_seat() {
            return Ok(AdmissionDecision::SectionFull {
                capacity: section.capacity,
                occupancy: section.occupancy,
            });
        }

        if let Err(err) = tx.execute(
            "INSERT INTO enrollments (student_id, section_id, term, ay, status)
             VALUES (?1, ?2, ?3, ?4, 'enrolled');",
            params![student_id, section_id, term.term(), term.academic_year()],
        ) {
            let err = RepoError::from(err);
            if err.constraint() == Some(Constraint::Unique) {
                return Ok(AdmissionDecision::AlreadyEnrolled);
            }
            return Err(err);
        }

        let enrollment_id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(AdmissionDecision::Admitted { enrollment_id })
    }

    fn drop_active(&mut self, student_id: StudentId, section_id: SectionId) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE enrollments
             SET status = 'dropped'
             WHERE student_id = ?1
               AND section_id = ?2
               AND status = 'enrolled';",
            params![student_id, section_id],
        )?;
        Ok(changed > 0)
    }

    fn section_occupancy(&self, section_id: SectionId) -> RepoResult<Option<SectionOccupancy>> {
        load_occupancy(self.conn, section_id)
    }

    fn list_enrollments(&self, filter: &EnrollmentFilter) -> RepoResult<Vec<EnrollmentRecord>> {
        if filter.is_empty() {
            return Ok(Vec::new());
        }

        let mut stmt = self.conn.prepare(&format!(
            "{ENROLLMENT_SELECT_SQL}
             WHERE (?1 IS NULL OR e.student_id = ?1)
               AND (?2 IS NULL OR e.section_id = ?2)
             ORDER BY e.created_at ASC, e.id ASC;"
        ))?;
        let mut rows = stmt.query(params![filter.student_id, filter.section_id])?;
        let mut enrollments = Vec::new();
        while let Some(row) = rows.next()? {
            enrollments.push(parse_enrollment_row(row)?);
        }
        Ok(enrollments)
    }
}

fn load_occupancy(conn: &Connection, section_id: SectionId) -> RepoResult<Option<SectionOccupancy>> {
    let row = conn
        .query_row(
            "SELECT
                s.capacity,
                s.status,
                (SELECT COUNT(*)
                   FROM enrollments e
                  WHERE e.section_id = s.id
                    AND e.status = 'enrolled') AS occupancy
             FROM sections s
             WHERE s.id = ?1;",
            [section_id],
            |row| {
                Ok((
                    row.get::<_, i64>("capacity")?,
                    row.get::<_, String>("status")?,
                    row.get::<_, i64>("occupancy")?,
                ))
            },
        )
        .optional()?;

    let Some((capacity, status, occupancy)) = row else {
        return Ok(None);
    };

    let status = SectionStatus::parse(&status).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid section status `{status}` in sections.status"))
    })?;
    Ok(Some(SectionOccupancy {
        section_id,
        capacity: to_count(capacity, "sections.capacity")?,
        occupancy: to_count(occupancy, "enrollment count")?,
        status,
    }))
}

fn parse_enrollment_row(row: &Row<'_>) -> RepoResult<EnrollmentRecord> {
    let status_text: String = row.get("status")?;
    let status = EnrollmentStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid enrollment status `{status_text}` in enrollments.status"
        ))
    })?;

    Ok(EnrollmentRecord {
        id: row.get("id")?,
        student_id: row.get("student_id")?,
        section_id: row.get("section_id")?,
        course_id: row.get("course_id")?,
        course_code: row.get("course_code")?,
        course_title: row.get("course_title")?,
        section_code: row.get("section_code")?,
        student_name: row.get("student_name")?,
        status,
        term: row.get("term")?,
        academic_year: row.get("ay")?,
        created_at: row.get("created_at")?,
        grade: row.get("grade")?,
    })
}

fn to_count(value: i64, column: &str) -> RepoResult<u32> {
    u32::try_from(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid count `{value}` in {column}")))
}
