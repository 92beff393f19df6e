//! Repository error type shared by all registrar persistence paths.

use crate::db::DbError;
use crate::model::error::ValidationError;
use crate::model::section::SectionId;
use crate::model::student::StudentId;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    Db(DbError),
    /// Referenced row does not exist.
    NotFound { entity: &'static str, id: Uuid },
    /// Uniqueness constraint on (student, section) rejected the insert.
    DuplicateEnrollment {
        student_id: StudentId,
        section_id: SectionId,
    },
    /// Guarded counter increment found no free seat.
    CapacityExhausted(SectionId),
    /// Persisted row violates a domain invariant.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::DuplicateEnrollment {
                student_id,
                section_id,
            } => write!(
                f,
                "enrollment already exists for student {student_id} in section {section_id}"
            ),
            Self::CapacityExhausted(id) => write!(f, "section {id} has no free seats"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}
