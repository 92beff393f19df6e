//! Core domain logic for the course registrar.
//! This crate is the single source of truth for enrollment invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod schedule;
pub mod service;

pub use config::{ConfigError, RegistrarConfig};
pub use db::seed::{seed_demo_data, SeedSummary};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget, LoggingError};
pub use model::calendar::{
    Recurrence, Term, TermFilter, TimeOfDay, TimeWindow, Weekday, WeekdaySet,
};
pub use model::error::ValidationError;
pub use model::section::{
    Capacity, Classroom, Section, SectionDetail, SectionId, Subject, Teacher,
};
pub use model::student::{Enrollment, Student, StudentId, StudentSummary};
pub use repo::error::{RepoError, RepoResult};
pub use repo::registrar_repo::{
    RegistrarRepository, RegistrarStore, SectionLinks, SectionQuery, SqliteRegistrarRepository,
    SqliteRegistrarStore,
};
pub use schedule::conflict::{check_schedule_conflict, ScheduleConflict};
pub use schedule::document::{
    layout_schedule, schedule_file_name, ScheduleDocument, ScheduleDocumentData,
};
pub use service::enrollment_service::{EnrollmentError, EnrollmentReceipt, EnrollmentService};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
