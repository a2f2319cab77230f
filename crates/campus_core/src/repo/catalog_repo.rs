//! Minimal catalog writes: users, courses and sections.
//!
//! Only what enrollment and grading need to exist; catalog listing lives
//! outside this crate.

use super::{RepoError, RepoResult};
use crate::model::catalog::{NewCourse, NewSection, SectionStatus, UserRole};
use crate::model::{CourseId, SectionId};
use rusqlite::{params, Connection};

pub trait CatalogRepository {
    /// Inserts a user with a caller-chosen id.
    fn create_user(&self, id: i64, name: &str, role: UserRole) -> RepoResult<()>;
    fn create_course(&self, course: &NewCourse) -> RepoResult<CourseId>;
    fn create_section(&self, section: &NewSection) -> RepoResult<SectionId>;
    /// Opens or closes a section for admission.
    fn set_section_status(&self, section_id: SectionId, status: SectionStatus) -> RepoResult<()>;
}

pub struct SqliteCatalogRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCatalogRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl CatalogRepository for SqliteCatalogRepository<'_> {
    fn create_user(&self, id: i64, name: &str, role: UserRole) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO users (id, name, role) VALUES (?1, ?2, ?3);",
            params![id, name, role.as_db()],
        )?;
        Ok(())
    }

    fn create_course(&self, course: &NewCourse) -> RepoResult<CourseId> {
        self.conn.execute(
            "INSERT INTO courses (id, code, title) VALUES (?1, ?2, ?3);",
            params![course.id, course.code.as_str(), course.title.as_str()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn create_section(&self, section: &NewSection) -> RepoResult<SectionId> {
        if section.capacity == 0 {
            return Err(RepoError::InvalidData(
                "section capacity must be positive".to_string(),
            ));
        }

        self.conn.execute(
            "INSERT INTO sections (id, course_id, section_code, capacity, status)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                section.id,
                section.course_id,
                section.section_code.as_str(),
                section.capacity,
                section.status.as_db(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn set_section_status(&self, section_id: SectionId, status: SectionStatus) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE sections SET status = ?2 WHERE id = ?1;",
            params![section_id, status.as_db()],
        )?;
        if changed == 0 {
            return Err(RepoError::SectionNotFound(section_id));
        }
        Ok(())
    }
}
