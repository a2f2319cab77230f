//! Admission Engine and Grade Ledger.
//!
//! # Responsibility
//! - Validate caller input before any storage access.
//! - Check connections out of the injected [`crate::db::Store`] per operation.
//! - Translate every storage result into an [`crate::model::outcome::Outcome`];
//!   no error escapes a write path.

pub mod admission_service;
pub mod grade_service;
