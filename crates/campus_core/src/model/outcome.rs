//! Structured outcomes returned by the admission and grading write paths.
//!
//! # Invariants
//! - Every rejection maps to exactly one [`ErrorKind`].
//! - Internal failures never expose storage detail through `message()`.

use serde::Serialize;

pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Coarse error taxonomy shared by all operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Referenced section or course is absent.
    NotFound,
    /// Capacity exceeded, duplicate enrollment or closed section.
    Conflict,
    /// Missing or malformed input.
    InvalidRequest,
    /// Storage or connectivity fault.
    InternalError,
}

/// Why an operation was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectionReason {
    SectionNotFound,
    SectionClosed,
    SectionFull,
    AlreadyEnrolled,
    NotEnrolled,
    InvalidRequest(String),
    /// Some entries of a grade batch were stored, others failed.
    PartiallyApplied { applied: usize, failed: usize },
    InternalError,
}

impl RejectionReason {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::SectionNotFound | Self::NotEnrolled => ErrorKind::NotFound,
            Self::SectionClosed | Self::SectionFull | Self::AlreadyEnrolled => ErrorKind::Conflict,
            Self::InvalidRequest(_) => ErrorKind::InvalidRequest,
            Self::PartiallyApplied { .. } | Self::InternalError => ErrorKind::InternalError,
        }
    }

    /// Stable snake_case label used in logs.
    pub fn code(&self) -> &'static str {
        match self {
            Self::SectionNotFound => "section_not_found",
            Self::SectionClosed => "section_closed",
            Self::SectionFull => "section_full",
            Self::AlreadyEnrolled => "already_enrolled",
            Self::NotEnrolled => "not_enrolled",
            Self::InvalidRequest(_) => "invalid_request",
            Self::PartiallyApplied { .. } => "partially_applied",
            Self::InternalError => "internal_error",
        }
    }

    /// Caller-facing message.
    pub fn message(&self) -> String {
        match self {
            Self::SectionNotFound => "Section not found".to_string(),
            Self::SectionClosed => "Section is not open for enrollment".to_string(),
            Self::SectionFull => "Section is already full".to_string(),
            Self::AlreadyEnrolled => "Student is already enrolled in this section".to_string(),
            Self::NotEnrolled => "Student is not enrolled in this section".to_string(),
            Self::InvalidRequest(detail) => detail.clone(),
            Self::PartiallyApplied { applied, failed } => format!(
                "Recorded {applied} of {} grades; {failed} failed",
                applied + failed
            ),
            Self::InternalError => INTERNAL_ERROR_MESSAGE.to_string(),
        }
    }
}

/// Result of a write operation as seen by callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Accepted(&'static str),
    Rejected(RejectionReason),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }

    pub fn message(&self) -> String {
        match self {
            Self::Accepted(message) => (*message).to_string(),
            Self::Rejected(reason) => reason.message(),
        }
    }

    pub fn rejection(&self) -> Option<&RejectionReason> {
        match self {
            Self::Accepted(_) => None,
            Self::Rejected(reason) => Some(reason),
        }
    }
}

impl From<RejectionReason> for Outcome {
    fn from(value: RejectionReason) -> Self {
        Self::Rejected(value)
    }
}
