#![allow(dead_code)]

use campus_core::{
    AcademicTerm, AdmissionEngine, CatalogRepository, GradeLedger, NewCourse, NewSection,
    RepoError, SectionId, SectionStatus, SqliteCatalogRepository, Store, StudentId, UserRole,
};
use std::sync::Arc;
use tempfile::TempDir;

pub struct Campus {
    pub store: Arc<Store>,
    pub admission: AdmissionEngine,
    pub ledger: GradeLedger,
    _dir: TempDir,
}

pub fn campus() -> Campus {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(Store::open(dir.path().join("campus.db")).unwrap());
    Campus {
        admission: AdmissionEngine::new(Arc::clone(&store), AcademicTerm::default()),
        ledger: GradeLedger::new(Arc::clone(&store), AcademicTerm::default()),
        store,
        _dir: dir,
    }
}

impl Campus {
    /// Creates course `CS<id>` and section `id` with the given capacity.
    pub fn section(&self, id: SectionId, capacity: u32, status: SectionStatus) {
        self.store
            .with_connection(|conn| {
                let repo = SqliteCatalogRepository::new(conn);
                let course_id = repo.create_course(&NewCourse {
                    id: None,
                    code: format!("CS{id}"),
                    title: format!("Course for section {id}"),
                })?;
                repo.create_section(&NewSection {
                    id: Some(id),
                    course_id,
                    section_code: format!("S-{id}"),
                    capacity,
                    status,
                })?;
                Ok::<_, RepoError>(())
            })
            .unwrap();
    }

    pub fn students(&self, ids: &[StudentId]) {
        self.store
            .with_connection(|conn| {
                let repo = SqliteCatalogRepository::new(conn);
                for id in ids {
                    repo.create_user(*id, &format!("Student {id}"), UserRole::Student)?;
                }
                Ok::<_, RepoError>(())
            })
            .unwrap();
    }

    pub fn set_status(&self, id: SectionId, status: SectionStatus) {
        self.store
            .with_connection(|conn| SqliteCatalogRepository::new(conn).set_section_status(id, status))
            .unwrap();
    }

    pub fn count(&self, sql: &str) -> i64 {
        self.store
            .with_connection(|conn| {
                conn.query_row(sql, [], |row| row.get(0))
                    .map_err(RepoError::from)
            })
            .unwrap()
    }
}
