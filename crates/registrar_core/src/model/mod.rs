//! Registrar domain model.
//!
//! # Responsibility
//! - Define students, sections, enrollments and their calendar primitives.
//! - Keep records plain and fully hydrated; no lazy relations.
//!
//! # Invariants
//! - Every record is identified by a stable UUID.
//! - Record invariants are checked by `validate()` before persistence.

pub mod calendar;
pub mod error;
pub mod section;
pub mod student;
