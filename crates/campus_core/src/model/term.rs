//! Academic term stamped on new enrollment and grade rows.
//!
//! # Invariants
//! - `term` is non-empty after trimming.
//! - `academic_year` is `YYYY-YYYY` with consecutive years.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const DEFAULT_TERM: &str = "Term 1";
pub const DEFAULT_ACADEMIC_YEAR: &str = "2025-2026";

static ACADEMIC_YEAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})-(\d{4})$").expect("valid academic year regex"));

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TermError {
    #[error("term label cannot be empty")]
    EmptyTerm,
    #[error("academic year `{0}` must look like `2025-2026`")]
    MalformedAcademicYear(String),
    #[error("academic year `{0}` must span two consecutive years")]
    NonConsecutiveAcademicYear(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcademicTerm {
    term: String,
    academic_year: String,
}

impl AcademicTerm {
    pub fn new(term: &str, academic_year: &str) -> Result<Self, TermError> {
        let term = term.trim();
        if term.is_empty() {
            return Err(TermError::EmptyTerm);
        }

        let academic_year = academic_year.trim();
        let caps = ACADEMIC_YEAR_RE
            .captures(academic_year)
            .ok_or_else(|| TermError::MalformedAcademicYear(academic_year.to_string()))?;
        let start: u32 = caps[1]
            .parse()
            .map_err(|_| TermError::MalformedAcademicYear(academic_year.to_string()))?;
        let end: u32 = caps[2]
            .parse()
            .map_err(|_| TermError::MalformedAcademicYear(academic_year.to_string()))?;
        if end != start + 1 {
            return Err(TermError::NonConsecutiveAcademicYear(
                academic_year.to_string(),
            ));
        }

        Ok(Self {
            term: term.to_string(),
            academic_year: academic_year.to_string(),
        })
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn academic_year(&self) -> &str {
        &self.academic_year
    }
}

impl Default for AcademicTerm {
    fn default() -> Self {
        Self {
            term: DEFAULT_TERM.to_string(),
            academic_year: DEFAULT_ACADEMIC_YEAR.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AcademicTerm, TermError};

    #[test]
    fn accepts_consecutive_years_and_trims_labels() {
        let term = AcademicTerm::new("  Term 2 ", "2026-2027").unwrap();
        assert_eq!(term.term(), "Term 2");
        assert_eq!(term.academic_year(), "2026-2027");
    }

    #[test]
    fn rejects_malformed_or_gapped_years() {
        assert_eq!(
            AcademicTerm::new("Term 1", "2025/2026").unwrap_err(),
            TermError::MalformedAcademicYear("2025/2026".to_string())
        );
        assert_eq!(
            AcademicTerm::new("Term 1", "2025-2027").unwrap_err(),
            TermError::NonConsecutiveAcademicYear("2025-2027".to_string())
        );
        assert_eq!(
            AcademicTerm::new("   ", "2025-2026").unwrap_err(),
            TermError::EmptyTerm
        );
    }

    #[test]
    fn default_matches_current_term() {
        let term = AcademicTerm::default();
        assert_eq!(term.term(), "Term 1");
        assert_eq!(term.academic_year(), "2025-2026");
    }
}
