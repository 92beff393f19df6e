//! Printable schedule document layout.
//!
//! # Responsibility
//! - Turn a student's hydrated sections into paginated, fixed-width text.
//! - Keep layout decisions (ordering, truncation, paging) deterministic.
//!
//! # Invariants
//! - Rows are ordered by start time; ties keep input order.
//! - Course titles longer than 18 chars keep 15 chars plus `...`.
//! - Teacher and room labels longer than 12 chars keep 9 chars plus `...`.
//! - A new page starts when the row cursor passes `PAGE_BREAK_Y`.

use crate::model::calendar::TermFilter;
use crate::model::section::SectionDetail;
use crate::model::student::Student;

const TITLE_MAX_CHARS: usize = 18;
const TITLE_KEEP_CHARS: usize = 15;
const LABEL_MAX_CHARS: usize = 12;
const LABEL_KEEP_CHARS: usize = 9;

const TABLE_TOP_Y: u32 = 230;
const HEADER_GAP: u32 = 25;
const ROW_HEIGHT: u32 = 20;
const PAGE_BREAK_Y: u32 = 700;
const CONTINUATION_TOP_Y: u32 = 50;

const PAGE_SEPARATOR: char = '\u{c}';

// (header, width) per column, in print order.
const COLUMNS: [(&str, usize); 8] = [
    ("Subject", 9),
    ("Course Title", 19),
    ("Sec", 5),
    ("Time", 20),
    ("Days", 7),
    ("Teacher", 13),
    ("Room", 13),
    ("Credits", 7),
];

/// Input of the document renderer.
#[derive(Debug, Clone)]
pub struct ScheduleDocumentData {
    pub student: Student,
    pub sections: Vec<SectionDetail>,
    /// Footer text, e.g. a generation date supplied by the caller.
    pub footer: Option<String>,
}

/// One printed page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    pub lines: Vec<String>,
}

/// Laid-out schedule ready for printing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleDocument {
    pub pages: Vec<Page>,
    pub total_credits: u32,
}

impl ScheduleDocument {
    /// Joins pages with a form feed.
    pub fn render(&self) -> String {
        self.pages
            .iter()
            .map(|page| page.lines.join("\n"))
            .collect::<Vec<_>>()
            .join(format!("\n{PAGE_SEPARATOR}").as_str())
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Lays out `data` into pages.
pub fn layout_schedule(data: &ScheduleDocumentData) -> ScheduleDocument {
    let mut pages = Vec::new();
    let mut page = Page::default();

    page.lines.push("University Course Schedule".to_string());
    page.lines.push(String::new());
    page.lines.push("Student Information:".to_string());
    page.lines.push(format!("Name: {}", data.student.full_name()));
    page.lines.push(format!("Student ID: {}", data.student.student_code));
    if let Some(major) = data.student.major.as_deref() {
        page.lines.push(format!("Major: {major}"));
    }
    if let Some(year_level) = data.student.year_level {
        page.lines.push(format!("Year Level: {year_level}"));
    }
    if let Some(first) = data.sections.first() {
        page.lines.push(format!("Semester: {}", first.section.term));
    }
    page.lines.push(String::new());
    page.lines.push("Course Schedule:".to_string());

    let total_credits = data
        .sections
        .iter()
        .map(|detail| detail.subject.credits)
        .sum();

    if data.sections.is_empty() {
        page.lines
            .push("No courses enrolled for this semester.".to_string());
    } else {
        page.lines.push(header_row());
        page.lines.push("-".repeat(table_width()));

        let mut sorted: Vec<&SectionDetail> = data.sections.iter().collect();
        sorted.sort_by_key(|detail| detail.section.window.start());

        let mut cursor_y = TABLE_TOP_Y + HEADER_GAP;
        for detail in sorted {
            if cursor_y > PAGE_BREAK_Y {
                pages.push(std::mem::take(&mut page));
                page.lines.push(header_row());
                page.lines.push("-".repeat(table_width()));
                cursor_y = CONTINUATION_TOP_Y;
            }
            page.lines.push(section_row(detail));
            cursor_y += ROW_HEIGHT;
        }

        page.lines.push(String::new());
        page.lines.push(format!(
            "{:>width$}",
            format!("Total Credits: {total_credits}"),
            width = table_width()
        ));
    }

    if let Some(footer) = data.footer.as_deref() {
        page.lines.push(String::new());
        page.lines.push(footer.to_string());
    }
    pages.push(page);

    ScheduleDocument {
        pages,
        total_credits,
    }
}

/// Download name, e.g. `schedule_STU001_Fall_2025.txt`.
///
/// Unset filter fields fall back to `current` and `fallback_year`.
pub fn schedule_file_name(student_code: &str, filter: &TermFilter, fallback_year: i32) -> String {
    format!(
        "schedule_{}_{}_{}.txt",
        student_code,
        filter.semester.as_deref().unwrap_or("current"),
        filter.year.unwrap_or(fallback_year)
    )
}

/// Shortens `value` to `keep` chars plus `...` when longer than `max` chars.
pub fn truncate_label(value: &str, max: usize, keep: usize) -> String {
    if value.chars().count() > max {
        let mut kept: String = value.chars().take(keep).collect();
        kept.push_str("...");
        kept
    } else {
        value.to_string()
    }
}

fn header_row() -> String {
    let cells: Vec<String> = COLUMNS.iter().map(|(name, _)| name.to_string()).collect();
    format_row(&cells)
}

fn section_row(detail: &SectionDetail) -> String {
    let section = &detail.section;
    let cells = vec![
        detail.subject.code.clone(),
        truncate_label(&detail.subject.name, TITLE_MAX_CHARS, TITLE_KEEP_CHARS),
        section.section_number.clone(),
        section.window.to_string(),
        section.recurrence.label(),
        truncate_label(
            &detail.teacher.full_name(),
            LABEL_MAX_CHARS,
            LABEL_KEEP_CHARS,
        ),
        truncate_label(&detail.classroom.label(), LABEL_MAX_CHARS, LABEL_KEEP_CHARS),
        detail.subject.credits.to_string(),
    ];
    format_row(&cells)
}

fn format_row(cells: &[String]) -> String {
    let mut row = String::new();
    for ((_, width), cell) in COLUMNS.iter().zip(cells) {
        row.push_str(&format!("{cell:<width$}", width = *width));
    }
    row.trim_end().to_string()
}

fn table_width() -> usize {
    COLUMNS.iter().map(|(_, width)| width).sum()
}

#[cfg(test)]
mod tests {
    use super::{layout_schedule, schedule_file_name, truncate_label, ScheduleDocumentData};
    use crate::model::calendar::{Recurrence, Term, TermFilter, TimeWindow};
    use crate::model::section::{Classroom, Section, SectionDetail, Subject, Teacher};
    use crate::model::student::Student;

    fn student() -> Student {
        let mut student = Student::new("STU001", "Alice", "Wilson", "alice@example.edu");
        student.major = Some("Computer Science".to_string());
        student.year_level = Some(2);
        student
    }

    fn detail(code: &str, start: &str, end: &str, credits: u32) -> SectionDetail {
        SectionDetail {
            section: Section::new(
                "001",
                Term::new("Fall", 2025),
                Recurrence::MonWedFri,
                TimeWindow::parse(start, end).unwrap(),
                30,
            ),
            subject: Subject::new(code, "Introduction to Computer Science", credits),
            teacher: Teacher::new("Jonathan", "Smithson"),
            classroom: Classroom::new("CS-101", "Computer Science Building"),
        }
    }

    #[test]
    fn truncation_keeps_prefix_and_marks_cut() {
        assert_eq!(
            truncate_label("Introduction to Computer Science", 18, 15),
            "Introduction to..."
        );
        assert_eq!(truncate_label("Calculus I", 18, 15), "Calculus I");
        assert_eq!(truncate_label("Jonathan Smithson", 12, 9), "Jonathan ...");
        assert_eq!(truncate_label("John Smith", 12, 9), "John Smith");
    }

    #[test]
    fn rows_are_sorted_by_start_time_and_credits_totalled() {
        let data = ScheduleDocumentData {
            student: student(),
            sections: vec![
                detail("CS201", "14:00", "14:50", 3),
                detail("PHYS101", "07:30", "08:20", 4),
            ],
            footer: Some("Generated on 2025-09-01".to_string()),
        };

        let document = layout_schedule(&data);
        let text = document.render();
        let early = text.find("PHYS101").unwrap();
        let late = text.find("CS201").unwrap();
        assert!(early < late);
        assert_eq!(document.total_credits, 7);
        assert!(text.contains("Total Credits: 7"));
        assert!(text.contains("Semester: Fall 2025"));
        assert!(text.contains("7:30 AM-8:20 AM"));
        assert!(text.contains("Introduction to..."));
        assert!(text.ends_with("Generated on 2025-09-01"));
    }

    #[test]
    fn empty_schedule_renders_placeholder() {
        let data = ScheduleDocumentData {
            student: student(),
            sections: Vec::new(),
            footer: None,
        };

        let document = layout_schedule(&data);
        assert_eq!(document.page_count(), 1);
        assert!(document
            .render()
            .contains("No courses enrolled for this semester."));
        assert!(!document.render().contains("Total Credits"));
    }

    #[test]
    fn long_schedules_paginate() {
        let fits = ScheduleDocumentData {
            student: student(),
            sections: (0..23).map(|_| detail("CS101", "09:00", "09:50", 3)).collect(),
            footer: None,
        };
        assert_eq!(layout_schedule(&fits).page_count(), 1);

        let overflow = ScheduleDocumentData {
            sections: (0..24).map(|_| detail("CS101", "09:00", "09:50", 3)).collect(),
            ..fits
        };
        let document = layout_schedule(&overflow);
        assert_eq!(document.page_count(), 2);
        assert!(document.render().contains('\u{c}'));
        assert!(document.pages[1].lines[0].starts_with("Subject"));
    }

    #[test]
    fn file_name_falls_back_for_missing_term_parts() {
        assert_eq!(
            schedule_file_name("STU001", &TermFilter::any().semester("Fall").year(2025), 2030),
            "schedule_STU001_Fall_2025.txt"
        );
        assert_eq!(
            schedule_file_name("STU001", &TermFilter::any(), 2030),
            "schedule_STU001_current_2030.txt"
        );
    }
}
