//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository writes enforce record `validate()` before persistence.
//! - Repository APIs return semantic errors (`NotFound`,
//!   `DuplicateEnrollment`, `CapacityExhausted`) in addition to DB errors.

pub mod error;
pub mod registrar_repo;
