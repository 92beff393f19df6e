//! Enrollment use-case service.
//!
//! # Responsibility
//! - Enroll and withdraw students with all guards inside one transaction.
//! - Serve term-scoped schedules, open-section listings and printable
//!   schedule documents.
//!
//! # Invariants
//! - Guards run in order: student, section, duplicate, capacity, conflict.
//!   The first failing guard rejects the attempt with no state change.
//! - The conflict check only sees sections from the candidate's term,
//!   ordered by start time, section number, id; the first hit is reported.
//! - Enrollment row and seat counter change together or not at all.

use crate::model::calendar::TermFilter;
use crate::model::section::{Section, SectionDetail, SectionId};
use crate::model::student::{Enrollment, Student, StudentId, StudentSummary};
use crate::repo::error::RepoError;
use crate::repo::registrar_repo::{RegistrarRepository, RegistrarStore, SectionQuery};
use crate::schedule::conflict::{check_schedule_conflict, ScheduleConflict};
use crate::schedule::document::{layout_schedule, ScheduleDocument, ScheduleDocumentData};
use log::{info, warn};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Rejections and failures surfaced by the enrollment workflow.
#[derive(Debug)]
pub enum EnrollmentError {
    StudentNotFound(StudentId),
    SectionNotFound(SectionId),
    EnrollmentNotFound {
        student_id: StudentId,
        section_id: SectionId,
    },
    AlreadyEnrolled {
        student_id: StudentId,
        section_id: SectionId,
    },
    CapacityExceeded {
        section_id: SectionId,
        section_number: String,
        max_enrollment: u32,
    },
    ScheduleConflict(ScheduleConflict),
    Repo(RepoError),
}

impl EnrollmentError {
    /// Stable machine-readable category.
    pub fn code(&self) -> &'static str {
        match self {
            Self::StudentNotFound(_)
            | Self::SectionNotFound(_)
            | Self::EnrollmentNotFound { .. } => "not_found",
            Self::AlreadyEnrolled { .. } => "already_enrolled",
            Self::CapacityExceeded { .. } => "capacity_exceeded",
            Self::ScheduleConflict(_) => "schedule_conflict",
            Self::Repo(_) => "internal",
        }
    }

    fn capacity_exceeded(section: &Section) -> Self {
        Self::CapacityExceeded {
            section_id: section.id,
            section_number: section.section_number.clone(),
            max_enrollment: section.capacity.max,
        }
    }
}

impl Display for EnrollmentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StudentNotFound(id) => write!(f, "student not found: {id}"),
            Self::SectionNotFound(id) => write!(f, "section not found: {id}"),
            Self::EnrollmentNotFound {
                student_id,
                section_id,
            } => write!(
                f,
                "enrollment not found for student {student_id} in section {section_id}"
            ),
            Self::AlreadyEnrolled { section_id, .. } => {
                write!(f, "student is already enrolled in section {section_id}")
            }
            Self::CapacityExceeded {
                section_number,
                max_enrollment,
                ..
            } => write!(
                f,
                "section {section_number} is full ({max_enrollment} seats taken)"
            ),
            Self::ScheduleConflict(conflict) => write!(f, "{conflict}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for EnrollmentError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::ScheduleConflict(conflict) => Some(conflict),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for EnrollmentError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::DuplicateEnrollment {
                student_id,
                section_id,
            } => Self::AlreadyEnrolled {
                student_id,
                section_id,
            },
            other => Self::Repo(other),
        }
    }
}

impl From<ScheduleConflict> for EnrollmentError {
    fn from(value: ScheduleConflict) -> Self {
        Self::ScheduleConflict(value)
    }
}

/// Enrollment row plus the section state after the change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnrollmentReceipt {
    pub enrollment: Enrollment,
    pub section: SectionDetail,
}

/// Enrollment workflow facade over repository implementations.
pub struct EnrollmentService<R: RegistrarRepository> {
    repo: R,
}

impl<R: RegistrarRepository> EnrollmentService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Enrolls a student into a section.
    ///
    /// # Errors
    /// - `StudentNotFound` / `SectionNotFound` for unknown ids.
    /// - `AlreadyEnrolled` when the pair already exists.
    /// - `CapacityExceeded` when no seat is left, including when a
    ///   concurrent enrollment took the last seat first.
    /// - `ScheduleConflict` naming the first overlapping same-term section.
    pub fn enroll(
        &mut self,
        student_id: StudentId,
        section_id: SectionId,
    ) -> Result<EnrollmentReceipt, EnrollmentError> {
        let started_at = Instant::now();

        let outcome = self
            .repo
            .write(|store| -> Result<_, EnrollmentError> {
                ensure_student(store, student_id)?;
                let mut detail = store
                    .get_section(section_id)?
                    .ok_or(EnrollmentError::SectionNotFound(section_id))?;

                if store.get_enrollment(student_id, section_id)?.is_some() {
                    return Err(EnrollmentError::AlreadyEnrolled {
                        student_id,
                        section_id,
                    });
                }

                if detail.section.capacity.is_full() {
                    return Err(EnrollmentError::capacity_exceeded(&detail.section));
                }

                let same_term = TermFilter::exact(&detail.section.term);
                let enrolled = store.list_enrolled_sections(student_id, &same_term)?;
                check_schedule_conflict(
                    &detail.section,
                    enrolled.iter().map(|existing| &existing.section),
                )
                .map_err(|conflict| name_conflicting_course(conflict, &enrolled))?;

                let enrollment = store.insert_enrollment(student_id, section_id)?;
                let capacity = match store.increment_enrollment(section_id) {
                    Ok(capacity) => capacity,
                    Err(RepoError::CapacityExhausted(_)) => {
                        return Err(EnrollmentError::capacity_exceeded(&detail.section));
                    }
                    Err(err) => return Err(err.into()),
                };
                detail.section.capacity = capacity;

                Ok(EnrollmentReceipt {
                    enrollment,
                    section: detail,
                })
            });

        log_outcome("enroll", started_at, &outcome);
        outcome
    }

    /// Withdraws a student from a section and releases the seat.
    pub fn withdraw(
        &mut self,
        student_id: StudentId,
        section_id: SectionId,
    ) -> Result<EnrollmentReceipt, EnrollmentError> {
        let started_at = Instant::now();

        let outcome = self
            .repo
            .write(|store| -> Result<_, EnrollmentError> {
                let enrollment = store.get_enrollment(student_id, section_id)?.ok_or(
                    EnrollmentError::EnrollmentNotFound {
                        student_id,
                        section_id,
                    },
                )?;
                let mut detail = store
                    .get_section(section_id)?
                    .ok_or(EnrollmentError::SectionNotFound(section_id))?;

                store.delete_enrollment(student_id, section_id)?;
                detail.section.capacity = store.decrement_enrollment(section_id)?;

                Ok(EnrollmentReceipt {
                    enrollment,
                    section: detail,
                })
            });

        log_outcome("withdraw", started_at, &outcome);
        outcome
    }

    /// Lists a student's enrolled sections ordered by start time.
    pub fn schedule(
        &self,
        student_id: StudentId,
        term: &TermFilter,
    ) -> Result<Vec<SectionDetail>, EnrollmentError> {
        self.repo.read(|store| -> Result<_, EnrollmentError> {
            ensure_student(store, student_id)?;
            Ok(store.list_enrolled_sections(student_id, term)?)
        })
    }

    /// Lists sections the student is not enrolled in that still have seats.
    pub fn available_sections(
        &self,
        student_id: StudentId,
        term: &TermFilter,
    ) -> Result<Vec<SectionDetail>, EnrollmentError> {
        let query = SectionQuery {
            term: term.clone(),
            not_enrolled_by: Some(student_id),
            open_only: true,
        };
        self.repo.read(|store| -> Result<_, EnrollmentError> {
            ensure_student(store, student_id)?;
            Ok(store.list_sections(&query)?)
        })
    }

    /// Builds the printable schedule for a student.
    pub fn schedule_document(
        &self,
        student_id: StudentId,
        term: &TermFilter,
        footer: Option<String>,
    ) -> Result<ScheduleDocument, EnrollmentError> {
        let data = self.repo.read(|store| -> Result<_, EnrollmentError> {
            let student = ensure_student(store, student_id)?;
            let sections = store.list_enrolled_sections(student_id, term)?;
            Ok(ScheduleDocumentData {
                student,
                sections,
                footer,
            })
        })?;

        let document = layout_schedule(&data);
        info!(
            "event=schedule_document module=service status=ok pages={} sections={}",
            document.page_count(),
            data.sections.len()
        );
        Ok(document)
    }

    /// Gets one student by stable ID.
    pub fn student(&self, student_id: StudentId) -> Result<Student, EnrollmentError> {
        self.repo
            .read(|store| -> Result<_, EnrollmentError> { ensure_student(store, student_id) })
    }

    /// Lists all students ordered by last name.
    pub fn students(&self) -> Result<Vec<StudentSummary>, EnrollmentError> {
        self.repo
            .read(|store| -> Result<_, EnrollmentError> { Ok(store.list_students()?) })
    }
}

fn ensure_student(
    store: &dyn RegistrarStore,
    student_id: StudentId,
) -> Result<Student, EnrollmentError> {
    store
        .get_student(student_id)?
        .ok_or(EnrollmentError::StudentNotFound(student_id))
}

fn name_conflicting_course(
    conflict: ScheduleConflict,
    enrolled: &[SectionDetail],
) -> ScheduleConflict {
    match enrolled
        .iter()
        .find(|existing| existing.section.id == conflict.section_id)
    {
        Some(existing) => conflict.with_course_code(existing.subject.code.as_str()),
        None => conflict,
    }
}

fn log_outcome<T>(event: &str, started_at: Instant, outcome: &Result<T, EnrollmentError>) {
    let duration_ms = started_at.elapsed().as_millis();
    match outcome {
        Ok(_) => info!("event={event} module=service status=ok duration_ms={duration_ms}"),
        Err(EnrollmentError::Repo(err)) => warn!(
            "event={event} module=service status=error duration_ms={duration_ms} error_code=internal error={err}"
        ),
        Err(err) => info!(
            "event={event} module=service status=rejected duration_ms={duration_ms} reason={}",
            err.code()
        ),
    }
}
