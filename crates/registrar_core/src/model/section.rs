//! Section domain model.
//!
//! # Responsibility
//! - Define the schedulable section record the conflict checker reads.
//! - Define the hydrated section view (subject, teacher, classroom) used by
//!   schedule listings and printed documents.
//!
//! # Invariants
//! - `id` is never nil.
//! - `window.start < window.end` (enforced by `TimeWindow`).
//! - `capacity.current <= capacity.max` after every successful mutation.

use super::calendar::{Recurrence, Term, TimeWindow};
use super::error::ValidationError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type SectionId = Uuid;

/// Seat counters of a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capacity {
    pub current: u32,
    pub max: u32,
}

impl Capacity {
    pub fn empty(max: u32) -> Self {
        Self { current: 0, max }
    }

    pub fn is_full(self) -> bool {
        self.current >= self.max
    }

    pub fn remaining(self) -> u32 {
        self.max.saturating_sub(self.current)
    }
}

/// One scheduled offering of a subject in a term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub id: SectionId,
    /// Human-facing identifier, e.g. `001`.
    pub section_number: String,
    pub term: Term,
    pub recurrence: Recurrence,
    pub window: TimeWindow,
    pub capacity: Capacity,
}

impl Section {
    /// Creates an empty section with a generated ID.
    pub fn new(
        section_number: impl Into<String>,
        term: Term,
        recurrence: Recurrence,
        window: TimeWindow,
        max_enrollment: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            section_number: section_number.into(),
            term,
            recurrence,
            window,
            capacity: Capacity::empty(max_enrollment),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_nil() {
            return Err(ValidationError::NilId("section id"));
        }
        if self.section_number.trim().is_empty() {
            return Err(ValidationError::BlankField("section number"));
        }
        if self.term.semester.trim().is_empty() {
            return Err(ValidationError::BlankField("semester"));
        }
        if self.capacity.current > self.capacity.max {
            return Err(ValidationError::CapacityOverflow {
                current: self.capacity.current,
                max: self.capacity.max,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: Uuid,
    /// Catalogue code, e.g. `CS101`.
    pub code: String,
    pub name: String,
    pub credits: u32,
    pub department: Option<String>,
}

impl Subject {
    pub fn new(code: impl Into<String>, name: impl Into<String>, credits: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            code: code.into(),
            name: name.into(),
            credits,
            department: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub title: Option<String>,
    pub email: Option<String>,
    pub department: Option<String>,
}

impl Teacher {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            title: None,
            email: None,
            department: None,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classroom {
    pub id: Uuid,
    /// Room number, e.g. `CS-101`.
    pub number: String,
    pub building: String,
    pub seats: Option<u32>,
}

impl Classroom {
    pub fn new(number: impl Into<String>, building: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            number: number.into(),
            building: building.into(),
            seats: None,
        }
    }

    /// `number, building` label used in printed schedules.
    pub fn label(&self) -> String {
        format!("{}, {}", self.number, self.building)
    }
}

/// Fully hydrated section assembled by the persistence layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionDetail {
    pub section: Section,
    pub subject: Subject,
    pub teacher: Teacher,
    pub classroom: Classroom,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::calendar::TimeWindow;

    fn fall_section() -> Section {
        Section::new(
            "001",
            Term::new("Fall", 2025),
            Recurrence::MonWedFri,
            TimeWindow::parse("09:00", "09:50").unwrap(),
            30,
        )
    }

    #[test]
    fn new_section_starts_empty() {
        let section = fall_section();
        assert!(!section.id.is_nil());
        assert_eq!(section.capacity, Capacity { current: 0, max: 30 });
        assert!(section.validate().is_ok());
    }

    #[test]
    fn validate_rejects_counter_overflow() {
        let mut section = fall_section();
        section.capacity.current = 31;
        assert_eq!(
            section.validate().unwrap_err(),
            ValidationError::CapacityOverflow {
                current: 31,
                max: 30
            }
        );
    }

    #[test]
    fn validate_rejects_blank_section_number() {
        let mut section = fall_section();
        section.section_number = "  ".to_string();
        assert_eq!(
            section.validate().unwrap_err(),
            ValidationError::BlankField("section number")
        );
    }

    #[test]
    fn zero_capacity_section_is_full() {
        assert!(Capacity::empty(0).is_full());
        assert_eq!(Capacity { current: 3, max: 5 }.remaining(), 2);
    }
}
