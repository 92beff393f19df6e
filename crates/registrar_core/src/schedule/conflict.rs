//! Schedule conflict detection.
//!
//! # Responsibility
//! - Decide whether a candidate section can join a student's existing
//!   sections without a day/time overlap.
//!
//! # Invariants
//! - Sections from a different term (semester or year) never conflict.
//! - A conflict needs at least one shared weekday AND strictly overlapping
//!   windows; back-to-back windows are allowed.
//! - The first conflicting section in input order is reported; later hits
//!   are not inspected.
//! - The check is pure: no I/O, no shared state.

use crate::model::calendar::{TimeWindow, WeekdaySet};
use crate::model::section::{Section, SectionId};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Overlap between a candidate and one already-enrolled section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleConflict {
    /// Existing section the candidate collides with.
    pub section_id: SectionId,
    pub section_number: String,
    /// Subject code of the existing section; without it the message names
    /// the section id.
    pub course_code: Option<String>,
    /// Weekdays both sections meet on.
    pub overlapping_days: WeekdaySet,
    /// Meeting window of the existing section.
    pub existing_window: TimeWindow,
}

impl Display for ScheduleConflict {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.course_code.as_deref() {
            Some(code) => write!(
                f,
                "schedule conflict with {code} section {}",
                self.section_number
            )?,
            None => write!(
                f,
                "schedule conflict with section {} ({})",
                self.section_number, self.section_id
            )?,
        }
        write!(
            f,
            " on {} from {} to {}",
            self.overlapping_days,
            self.existing_window.start().to_12_hour(),
            self.existing_window.end().to_12_hour()
        )
    }
}

impl Error for ScheduleConflict {}

impl ScheduleConflict {
    /// Attaches the subject code of the conflicting section.
    pub fn with_course_code(mut self, code: impl Into<String>) -> Self {
        self.course_code = Some(code.into());
        self
    }
}

/// Checks `candidate` against `existing` and reports the first conflict.
///
/// `existing` may contain sections of any term; entries outside the
/// candidate's term are skipped. Callers that need a specific conflict to be
/// named must order `existing` themselves.
pub fn check_schedule_conflict<'a, I>(candidate: &Section, existing: I) -> Result<(), ScheduleConflict>
where
    I: IntoIterator<Item = &'a Section>,
{
    let candidate_days = candidate.recurrence.weekdays();
    if candidate_days.is_empty() {
        return Ok(());
    }

    for section in existing {
        if section.term != candidate.term {
            continue;
        }

        let common_days = candidate_days.intersection(section.recurrence.weekdays());
        if common_days.is_empty() {
            continue;
        }

        if candidate.window.overlaps(section.window) {
            return Err(ScheduleConflict {
                section_id: section.id,
                section_number: section.section_number.clone(),
                course_code: None,
                overlapping_days: common_days,
                existing_window: section.window,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::check_schedule_conflict;
    use crate::model::calendar::{Recurrence, Term, TimeOfDay, TimeWindow, Weekday, WeekdaySet};
    use crate::model::section::Section;

    fn section(number: &str, recurrence: Recurrence, start: &str, end: &str) -> Section {
        Section::new(
            number,
            Term::new("Fall", 2025),
            recurrence,
            TimeWindow::parse(start, end).unwrap(),
            30,
        )
    }

    fn custom(days: &[Weekday]) -> Recurrence {
        Recurrence::Custom(days.iter().copied().collect())
    }

    #[test]
    fn disjoint_days_allow_identical_times() {
        let candidate = section("001", Recurrence::MonWedFri, "09:00", "09:50");
        let existing = section("002", Recurrence::TueThu, "09:00", "09:50");
        assert!(check_schedule_conflict(&candidate, [&existing]).is_ok());
    }

    #[test]
    fn mwf_vs_tr_is_allowed() {
        let candidate = section("001", Recurrence::MonWedFri, "09:00", "09:50");
        let existing = section("001", Recurrence::TueThu, "10:30", "11:50");
        assert!(check_schedule_conflict(&candidate, [&existing]).is_ok());
    }

    #[test]
    fn daily_conflicts_with_mwf_on_shared_days() {
        let candidate = section("002", Recurrence::Daily, "07:30", "08:20");
        let existing = section("001", Recurrence::MonWedFri, "07:30", "08:20");

        let conflict = check_schedule_conflict(&candidate, [&existing]).unwrap_err();
        assert_eq!(conflict.section_id, existing.id);
        assert_eq!(
            conflict.overlapping_days,
            [Weekday::Monday, Weekday::Wednesday, Weekday::Friday]
                .into_iter()
                .collect::<WeekdaySet>()
        );
        assert_eq!(conflict.existing_window, existing.window);
    }

    #[test]
    fn back_to_back_sections_are_allowed() {
        let candidate = section("001", Recurrence::MonWedFri, "09:00", "09:50");
        let existing = section("002", Recurrence::MonWedFri, "09:50", "10:40");
        assert!(check_schedule_conflict(&candidate, [&existing]).is_ok());

        let earlier = section("003", Recurrence::MonWedFri, "08:10", "09:00");
        assert!(check_schedule_conflict(&candidate, [&earlier]).is_ok());
    }

    #[test]
    fn same_day_different_time_is_allowed() {
        let candidate = section("001", Recurrence::MonWedFri, "09:00", "09:50");
        let existing = section("002", Recurrence::MonWedFri, "14:00", "14:50");
        assert!(check_schedule_conflict(&candidate, [&existing]).is_ok());
    }

    #[test]
    fn containing_window_conflicts() {
        let candidate = section("001", custom(&[Weekday::Monday]), "09:00", "10:00");
        let existing = section("002", custom(&[Weekday::Monday]), "09:30", "09:45");

        let conflict = check_schedule_conflict(&candidate, [&existing]).unwrap_err();
        assert_eq!(conflict.overlapping_days.to_string(), "MON");
    }

    #[test]
    fn weekend_never_meets_daily() {
        let candidate = section("001", Recurrence::Weekend, "10:00", "11:00");
        let existing = section("002", Recurrence::Daily, "10:00", "11:00");
        assert!(check_schedule_conflict(&candidate, [&existing]).is_ok());
    }

    #[test]
    fn empty_custom_days_never_conflict() {
        let empty = section("001", custom(&[]), "09:00", "10:00");
        let other_empty = section("002", custom(&[]), "09:00", "10:00");
        let daily = section("003", Recurrence::Daily, "09:00", "10:00");

        assert!(check_schedule_conflict(&empty, [&daily, &other_empty]).is_ok());
        assert!(check_schedule_conflict(&daily, [&empty]).is_ok());
    }

    #[test]
    fn other_terms_never_conflict() {
        let candidate = section("001", Recurrence::MonWedFri, "09:00", "09:50");
        let mut spring = section("002", Recurrence::MonWedFri, "09:00", "09:50");
        spring.term = Term::new("Spring", 2025);
        let mut next_fall = section("003", Recurrence::MonWedFri, "09:00", "09:50");
        next_fall.term = Term::new("Fall", 2026);

        assert!(check_schedule_conflict(&candidate, [&spring, &next_fall]).is_ok());
    }

    #[test]
    fn first_conflict_in_input_order_is_reported() {
        let candidate = section("001", Recurrence::Daily, "09:00", "11:00");
        let first = section("010", Recurrence::TueThu, "10:00", "10:50");
        let second = section("020", Recurrence::MonWedFri, "09:00", "09:50");

        let conflict = check_schedule_conflict(&candidate, [&first, &second]).unwrap_err();
        assert_eq!(conflict.section_number, "010");

        let conflict = check_schedule_conflict(&candidate, [&second, &first]).unwrap_err();
        assert_eq!(conflict.section_number, "020");
    }

    #[test]
    fn identical_section_overlaps_itself() {
        let candidate = section("001", Recurrence::TueThu, "10:30", "11:50");
        assert!(check_schedule_conflict(&candidate, [&candidate]).is_err());
    }

    #[test]
    fn conflict_message_names_section_days_and_window() {
        let candidate = section("002", Recurrence::Daily, "07:30", "08:20");
        let existing = section("001", Recurrence::MonWedFri, "07:30", "08:20");

        let conflict = check_schedule_conflict(&candidate, [&existing]).unwrap_err();
        assert_eq!(
            conflict.to_string(),
            format!(
                "schedule conflict with section 001 ({}) on MON, WED, FRI from 7:30 AM to 8:20 AM",
                existing.id
            )
        );

        let conflict = conflict.with_course_code("PHYS101");
        assert_eq!(
            conflict.to_string(),
            "schedule conflict with PHYS101 section 001 on MON, WED, FRI from 7:30 AM to 8:20 AM"
        );
    }

    #[test]
    fn overlap_property_holds_across_minute_grid() {
        let days = [
            Recurrence::MonWedFri,
            Recurrence::Daily,
            custom(&[Weekday::Friday]),
            Recurrence::TueThu,
            Recurrence::Weekend,
        ];
        for start_a in (0..180).step_by(15) {
            for start_b in (0..180).step_by(15) {
                for recurrence in days {
                    let window_a = TimeWindow::new(
                        TimeOfDay::from_minutes(480 + start_a).unwrap(),
                        TimeOfDay::from_minutes(480 + start_a + 50).unwrap(),
                    )
                    .unwrap();
                    let window_b = TimeWindow::new(
                        TimeOfDay::from_minutes(480 + start_b).unwrap(),
                        TimeOfDay::from_minutes(480 + start_b + 30).unwrap(),
                    )
                    .unwrap();
                    let mut candidate = section("001", Recurrence::MonWedFri, "08:00", "09:00");
                    candidate.window = window_a;
                    let mut existing = section("002", recurrence, "08:00", "09:00");
                    existing.window = window_b;

                    let expected_overlap = window_a.start() < window_b.end()
                        && window_b.start() < window_a.end();
                    let shares_day = !Recurrence::MonWedFri
                        .weekdays()
                        .intersection(recurrence.weekdays())
                        .is_empty();
                    assert_eq!(
                        check_schedule_conflict(&candidate, [&existing]).is_err(),
                        expected_overlap && shares_day
                    );
                }
            }
        }
    }
}
