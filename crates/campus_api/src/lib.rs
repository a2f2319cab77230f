//! Request/response boundary for the campus core.
//!
//! # Responsibility
//! - Decode JSON request bodies into core calls.
//! - Encode every result as a stable JSON envelope.
//!
//! # Invariants
//! - Exported functions never panic and never return an error; failures are
//!   reported inside the envelope.
//! - Field names accept both `camelCase` and `snake_case`.
//! - Storage failures on read paths are logged and answered with empty lists.

use campus_core::{
    AcademicTerm, AdmissionEngine, CampusConfig, DbResult, EnrollmentFilter, EnrollmentRecord,
    EntryFailure, ErrorKind, GradeEntry, GradeLedger, GradeRecord, Outcome, RecordGradesRequest,
    RejectionReason, SectionId, Store, StudentId,
};
use log::{error, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const MALFORMED_BODY_MESSAGE: &str = "Malformed request body";
const FALLBACK_RESPONSE: &str = r#"{"success":false,"message":"Internal server error"}"#;

/// Body of `RequestEnrollment` and `DropEnrollment`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentBody {
    #[serde(alias = "student_id")]
    pub student_id: Option<StudentId>,
    #[serde(alias = "section_id")]
    pub section_id: Option<SectionId>,
}

/// Body of `RecordGrades`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradesBody {
    #[serde(alias = "section_id")]
    pub section_id: Option<SectionId>,
    #[serde(alias = "faculty_id")]
    pub faculty_id: Option<i64>,
    #[serde(alias = "entries")]
    pub grades: Option<Vec<GradeEntryBody>>,
}

/// One `{studentId, grade}` element of a grade batch.
///
/// `grade` stays untyped so a non-numeric value reaches validation instead
/// of failing the whole decode.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeEntryBody {
    #[serde(alias = "student_id")]
    pub student_id: Option<StudentId>,
    pub grade: Option<serde_json::Value>,
}

/// Body of `GetGrades`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentBody {
    #[serde(alias = "student_id")]
    pub student_id: Option<StudentId>,
}

/// `{success, message}` envelope of every write operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorKind>,
    /// Per-student failures of a partially applied grade batch.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<EntryFailure>,
}

impl ActionResponse {
    fn from_outcome(outcome: &Outcome) -> Self {
        Self {
            success: outcome.is_success(),
            message: outcome.message(),
            error: outcome.rejection().map(RejectionReason::kind),
            failures: Vec::new(),
        }
    }

    fn malformed() -> Self {
        Self::from_outcome(&Outcome::from(RejectionReason::InvalidRequest(
            MALFORMED_BODY_MESSAGE.to_string(),
        )))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrollmentsResponse {
    pub enrollments: Vec<EnrollmentRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradesResponse {
    pub grades: Vec<GradeRecord>,
}

/// Entry point owning the store and both engines.
#[derive(Debug, Clone)]
pub struct CampusApi {
    store: Arc<Store>,
    admission: AdmissionEngine,
    ledger: GradeLedger,
}

impl CampusApi {
    pub fn new(store: Arc<Store>, term: AcademicTerm) -> Self {
        Self {
            admission: AdmissionEngine::new(Arc::clone(&store), term.clone()),
            ledger: GradeLedger::new(Arc::clone(&store), term),
            store,
        }
    }

    /// Opens the configured database and wires both engines to it.
    pub fn open(config: &CampusConfig) -> DbResult<Self> {
        let store = Store::open(&config.db_path)?;
        Ok(Self::new(Arc::new(store), config.term.clone()))
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    /// Releases pooled connections; later calls answer with internal errors.
    pub fn close(&self) {
        self.store.close();
    }

    pub fn request_enrollment(&self, body: &str) -> ActionResponse {
        let Some(body) = decode::<EnrollmentBody>("request_enrollment", body) else {
            return ActionResponse::malformed();
        };
        let outcome = self
            .admission
            .request_enrollment(body.student_id, body.section_id);
        ActionResponse::from_outcome(&outcome)
    }

    pub fn drop_enrollment(&self, body: &str) -> ActionResponse {
        let Some(body) = decode::<EnrollmentBody>("drop_enrollment", body) else {
            return ActionResponse::malformed();
        };
        let outcome = self
            .admission
            .drop_enrollment(body.student_id, body.section_id);
        ActionResponse::from_outcome(&outcome)
    }

    pub fn list_enrollments(&self, body: &str) -> EnrollmentsResponse {
        let filter = decode::<EnrollmentBody>("list_enrollments", body)
            .map(|body| EnrollmentFilter {
                student_id: body.student_id,
                section_id: body.section_id,
            })
            .unwrap_or_default();
        let enrollments = self
            .admission
            .list_enrollments(&filter)
            .unwrap_or_else(|err| {
                error!(
                    "event=list_enrollments module=api status=error error={}",
                    err
                );
                Vec::new()
            });
        EnrollmentsResponse { enrollments }
    }

    pub fn record_grades(&self, body: &str) -> ActionResponse {
        let Some(body) = decode::<GradesBody>("record_grades", body) else {
            return ActionResponse::malformed();
        };
        let request = RecordGradesRequest {
            section_id: body.section_id,
            faculty_id: body.faculty_id,
            entries: body
                .grades
                .unwrap_or_default()
                .iter()
                .map(|entry| GradeEntry {
                    student_id: entry.student_id,
                    grade: entry.grade.as_ref().and_then(serde_json::Value::as_f64),
                })
                .collect(),
        };

        let result = self.ledger.record_grades(&request);
        ActionResponse {
            failures: result.report.failures.clone(),
            ..ActionResponse::from_outcome(&result.outcome)
        }
    }

    pub fn get_grades(&self, body: &str) -> GradesResponse {
        let student_id = decode::<StudentBody>("get_grades", body).and_then(|body| body.student_id);
        let grades = self.ledger.get_grades(student_id).unwrap_or_else(|err| {
            error!("event=get_grades module=api status=error error={}", err);
            Vec::new()
        });
        GradesResponse { grades }
    }

    /// Routes `operation` to its handler and encodes the response as JSON.
    ///
    /// Unknown operations answer with an `InvalidRequest` envelope.
    pub fn handle(&self, operation: &str, body: &str) -> String {
        match operation {
            "request_enrollment" | "enroll" => encode(&self.request_enrollment(body)),
            "drop_enrollment" | "drop" => encode(&self.drop_enrollment(body)),
            "list_enrollments" | "enrollments" => encode(&self.list_enrollments(body)),
            "record_grades" | "grades" => encode(&self.record_grades(body)),
            "get_grades" => encode(&self.get_grades(body)),
            other => {
                warn!(
                    "event=api_route module=api status=rejected operation={}",
                    other
                );
                encode(&ActionResponse::from_outcome(&Outcome::from(
                    RejectionReason::InvalidRequest(format!("Unknown operation `{other}`")),
                )))
            }
        }
    }
}

fn decode<T: DeserializeOwned>(operation: &str, body: &str) -> Option<T> {
    let body = body.trim();
    if body.is_empty() {
        return serde_json::from_str("{}").ok();
    }
    match serde_json::from_str(body) {
        Ok(decoded) => Some(decoded),
        Err(err) => {
            warn!(
                "event=api_decode module=api status=rejected operation={} error={}",
                operation, err
            );
            None
        }
    }
}

fn encode(response: &impl Serialize) -> String {
    serde_json::to_string(response).unwrap_or_else(|err| {
        error!("event=api_encode module=api status=error error={}", err);
        FALLBACK_RESPONSE.to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::{CampusApi, EnrollmentBody, GradesBody};
    use campus_core::{
        AcademicTerm, CatalogRepository, ErrorKind, NewCourse, NewSection, RepoError,
        SectionStatus, SqliteCatalogRepository, Store, UserRole,
    };
    use serde_json::Value;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn api_with_section(capacity: u32) -> (CampusApi, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(Store::open(dir.path().join("campus.db")).unwrap());
        store
            .with_connection(|conn| {
                let repo = SqliteCatalogRepository::new(conn);
                let course_id = repo.create_course(&NewCourse {
                    id: None,
                    code: "MATH101".to_string(),
                    title: "Calculus".to_string(),
                })?;
                repo.create_section(&NewSection {
                    id: Some(5),
                    course_id,
                    section_code: "A".to_string(),
                    capacity,
                    status: SectionStatus::Open,
                })?;
                for id in [0, 1, 2] {
                    repo.create_user(id, &format!("Student {id}"), UserRole::Student)?;
                }
                Ok::<_, RepoError>(())
            })
            .unwrap();
        (CampusApi::new(store, AcademicTerm::default()), dir)
    }

    #[test]
    fn request_bodies_accept_both_naming_styles() {
        let camel: EnrollmentBody =
            serde_json::from_str(r#"{"studentId": 0, "sectionId": 5}"#).unwrap();
        let snake: EnrollmentBody =
            serde_json::from_str(r#"{"student_id": 0, "section_id": 5}"#).unwrap();
        assert_eq!(camel, snake);
        assert_eq!(camel.student_id, Some(0));

        let grades: GradesBody = serde_json::from_str(
            r#"{"section_id": 5, "facultyId": 9, "grades": [{"student_id": 1, "grade": 90}]}"#,
        )
        .unwrap();
        assert_eq!(grades.faculty_id, Some(9));
        assert_eq!(grades.grades.unwrap().len(), 1);
    }

    #[test]
    fn enrollment_round_trip_through_json_envelopes() {
        let (api, _dir) = api_with_section(1);

        let response: Value = serde_json::from_str(
            &api.handle("request_enrollment", r#"{"studentId": 0, "sectionId": 5}"#),
        )
        .unwrap();
        assert_eq!(response["success"], true);
        assert_eq!(response["message"], "Enrolled successfully");
        assert!(response.get("error").is_none());

        let full: Value = serde_json::from_str(
            &api.handle("request_enrollment", r#"{"studentId": 1, "sectionId": 5}"#),
        )
        .unwrap();
        assert_eq!(full["success"], false);
        assert_eq!(full["message"], "Section is already full");
        assert_eq!(full["error"], "conflict");

        let listed: Value =
            serde_json::from_str(&api.handle("list_enrollments", r#"{"sectionId": 5}"#)).unwrap();
        let enrollments = listed["enrollments"].as_array().unwrap();
        assert_eq!(enrollments.len(), 1);
        assert_eq!(enrollments[0]["studentId"], 0);
        assert_eq!(enrollments[0]["courseCode"], "MATH101");
        assert_eq!(enrollments[0]["ay"], "2025-2026");
    }

    #[test]
    fn missing_and_malformed_bodies_are_invalid_requests() {
        let (api, _dir) = api_with_section(3);

        let missing = api.request_enrollment(r#"{"studentId": 1}"#);
        assert!(!missing.success);
        assert_eq!(missing.message, "Missing studentId or sectionId");
        assert_eq!(missing.error, Some(ErrorKind::InvalidRequest));

        let malformed = api.request_enrollment("{not json");
        assert_eq!(malformed.error, Some(ErrorKind::InvalidRequest));

        let unknown: Value = serde_json::from_str(&api.handle("teleport", "{}")).unwrap();
        assert_eq!(unknown["success"], false);
    }

    #[test]
    fn non_numeric_grade_rejects_batch() {
        let (api, _dir) = api_with_section(3);

        let response = api.record_grades(
            r#"{"sectionId": 5, "facultyId": 9, "grades": [{"studentId": 1, "grade": 88}, {"studentId": 2, "grade": "A"}]}"#,
        );
        assert!(!response.success);
        assert_eq!(response.error, Some(ErrorKind::InvalidRequest));

        let grades = api.get_grades(r#"{"studentId": 1}"#);
        assert!(grades.grades.is_empty());
    }

    #[test]
    fn grade_batch_reports_per_student_failures() {
        let (api, _dir) = api_with_section(3);

        let accepted = api.record_grades(
            r#"{"sectionId": 5, "facultyId": 9, "grades": [{"studentId": 1, "grade": 90}]}"#,
        );
        assert!(accepted.success, "{}", accepted.message);
        assert_eq!(accepted.message, "Grades uploaded");

        let partial: Value = serde_json::from_str(&api.handle(
            "record_grades",
            r#"{"sectionId": 5, "facultyId": 9, "grades": [{"studentId": 2, "grade": 75.5}, {"studentId": 77, "grade": 60}]}"#,
        ))
        .unwrap();
        assert_eq!(partial["success"], false);
        assert_eq!(partial["failures"][0]["studentId"], 77);

        let grades: Value =
            serde_json::from_str(&api.handle("get_grades", r#"{"student_id": 1}"#)).unwrap();
        assert_eq!(grades["grades"][0]["grade"], 90.0);
        assert_eq!(grades["grades"][0]["courseCode"], "MATH101");
    }

    #[test]
    fn closed_store_yields_generic_error_and_empty_reads() {
        let (api, _dir) = api_with_section(3);
        api.close();

        let response = api.request_enrollment(r#"{"studentId": 1, "sectionId": 5}"#);
        assert_eq!(response.message, "Internal server error");
        assert_eq!(response.error, Some(ErrorKind::InternalError));
        assert!(api.list_enrollments(r#"{"studentId": 1}"#).enrollments.is_empty());
        assert!(api.get_grades(r#"{"studentId": 1}"#).grades.is_empty());
    }
}
