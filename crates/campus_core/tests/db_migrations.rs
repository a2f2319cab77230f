use campus_core::db::migrations::latest_version;
use campus_core::db::{open_db, open_db_in_memory, DbError};
use campus_core::Store;
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    for table in ["users", "courses", "sections", "enrollments", "grades"] {
        assert_object_exists(&conn, "table", table);
    }
    assert_object_exists(&conn, "index", "uq_enrollments_active");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("campus.db");

    let first = open_db(&path).unwrap();
    assert_eq!(schema_version(&first), latest_version());
    drop(first);

    let store = Store::open(&path).unwrap();
    assert_eq!(store.path(), path.as_path());
    let second = open_db(&path).unwrap();
    assert_eq!(schema_version(&second), latest_version());
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match Store::open(&path).unwrap_err() {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn storage_rejects_second_active_enrollment_for_same_pair() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "INSERT INTO users (id, name, role) VALUES (1, 'Ada', 'student');
         INSERT INTO courses (id, code, title) VALUES (1, 'CS1', 'Intro');
         INSERT INTO sections (id, course_id, section_code, capacity) VALUES (1, 1, 'A', 5);
         INSERT INTO enrollments (student_id, section_id, term, ay, status)
         VALUES (1, 1, 'Term 1', '2025-2026', 'dropped');
         INSERT INTO enrollments (student_id, section_id, term, ay) VALUES (1, 1, 'Term 1', '2025-2026');",
    )
    .unwrap();

    let err = conn
        .execute(
            "INSERT INTO enrollments (student_id, section_id, term, ay)
             VALUES (1, 1, 'Term 1', '2025-2026');",
            [],
        )
        .unwrap_err();
    assert_eq!(
        err.sqlite_error_code(),
        Some(rusqlite::ErrorCode::ConstraintViolation)
    );
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_object_exists(conn: &Connection, kind: &str, name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = ?1 AND name = ?2
            );",
            [kind, name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "{kind} {name} does not exist");
}
