//! Student and enrollment records.
//!
//! # Invariants
//! - `student_code` (e.g. `STU001`) is unique and distinct from the stable `id`.
//! - At most one `Enrollment` exists per (student, section) pair.

use super::error::ValidationError;
use super::section::SectionId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type StudentId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    /// Registrar-issued code printed on schedules.
    pub student_code: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub major: Option<String>,
    pub year_level: Option<u8>,
}

impl Student {
    pub fn new(
        student_code: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            student_code: student_code.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            major: None,
            year_level: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_nil() {
            return Err(ValidationError::NilId("student id"));
        }
        if self.student_code.trim().is_empty() {
            return Err(ValidationError::BlankField("student code"));
        }
        if self.email.trim().is_empty() {
            return Err(ValidationError::BlankField("email"));
        }
        Ok(())
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn summary(&self) -> StudentSummary {
        StudentSummary {
            id: self.id,
            student_code: self.student_code.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
        }
    }
}

/// List projection of a student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentSummary {
    pub id: StudentId,
    pub student_code: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Join record between a student and a section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    pub student_id: StudentId,
    pub section_id: SectionId,
    /// Unix epoch milliseconds.
    pub enrolled_at: i64,
}
