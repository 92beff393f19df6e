//! Demo catalogue for local development and smoke tests.
//!
//! # Invariants
//! - Seeding only runs against a database with no students or sections.
//! - Seat counters match the seeded enrollment rows.
//! - All rows are written in one transaction.

use crate::db::DbError;
use crate::model::calendar::{Recurrence, Term, TimeWindow};
use crate::model::section::{Classroom, Section, Subject, Teacher};
use crate::model::student::Student;
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::registrar_repo::{
    RegistrarRepository, RegistrarStore, SectionLinks, SqliteRegistrarRepository,
};
use log::info;
use rusqlite::Connection;

/// Row counts written by `seed_demo_data`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub students: usize,
    pub sections: usize,
    pub enrollments: usize,
}

/// Loads the demo catalogue: Fall 2025 sections for four students.
///
/// Sections `PHYS101-001` and `PHYS101-002` both meet daily 07:30-08:20,
/// so enrolling a student in both demonstrates a schedule conflict.
pub fn seed_demo_data(conn: &mut Connection) -> RepoResult<SeedSummary> {
    for table in ["students", "sections"] {
        let rows: i64 =
            conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| row.get(0))?;
        if rows > 0 {
            return Err(DbError::NotEmpty { table, rows }.into());
        }
    }

    let mut repo = SqliteRegistrarRepository::new(conn);
    let summary = repo.write(|store| -> Result<_, RepoError> { write_catalogue(store) })?;

    info!(
        "event=db_seed module=db status=ok students={} sections={} enrollments={}",
        summary.students, summary.sections, summary.enrollments
    );
    Ok(summary)
}

fn write_catalogue(store: &dyn RegistrarStore) -> RepoResult<SeedSummary> {
    let teachers = [
        teacher("John", "Smith", "Professor", "Computer Science"),
        teacher("Sarah", "Johnson", "Associate Professor", "Mathematics"),
        teacher("Michael", "Brown", "Assistant Professor", "Physics"),
    ];
    for row in &teachers {
        store.create_teacher(row)?;
    }

    let subjects = [
        subject("CS101", "Introduction to Computer Science", 3, "Computer Science"),
        subject("MATH201", "Calculus I", 4, "Mathematics"),
        subject("PHYS101", "General Physics I", 3, "Physics"),
        subject("CS201", "Data Structures", 3, "Computer Science"),
    ];
    for row in &subjects {
        store.create_subject(row)?;
    }

    let classrooms = [
        classroom("CS-101", "Computer Science Building", 30),
        classroom("MATH-205", "Mathematics Building", 50),
        classroom("PHYS-301", "Physics Building", 25),
        classroom("LH-401", "Main Building", 100),
    ];
    for row in &classrooms {
        store.create_classroom(row)?;
    }

    let students = [
        student("STU001", "Alice", "Wilson", "Computer Science", 2),
        student("STU002", "Bob", "Martinez", "Mathematics", 3),
        student("STU003", "Carol", "Davis", "Physics", 1),
        student("STU004", "David", "Lee", "Computer Science", 2),
    ];
    for row in &students {
        store.create_student(row)?;
    }

    let fall = Term::new("Fall", 2025);
    // (number, recurrence, start, end, max, subject, teacher, classroom)
    let plan = [
        ("001", Recurrence::MonWedFri, "09:00", "09:50", 30, 0, 0, 0),
        ("001", Recurrence::TueThu, "10:30", "11:50", 50, 1, 1, 1),
        ("001", Recurrence::Daily, "07:30", "08:20", 25, 2, 2, 2),
        ("002", Recurrence::Daily, "07:30", "08:20", 25, 2, 1, 1),
        ("001", Recurrence::MonWedFri, "14:00", "14:50", 30, 3, 0, 0),
    ];
    let mut sections = Vec::with_capacity(plan.len());
    for (number, recurrence, start, end, max, subject_idx, teacher_idx, classroom_idx) in plan {
        let section = Section::new(
            number,
            fall.clone(),
            recurrence,
            TimeWindow::parse(start, end)?,
            max,
        );
        store.create_section(
            &section,
            &SectionLinks {
                subject_id: subjects[subject_idx].id,
                teacher_id: teachers[teacher_idx].id,
                classroom_id: classrooms[classroom_idx].id,
            },
        )?;
        sections.push(section);
    }

    // (student, section)
    let enrollments = [(0, 0), (0, 1), (1, 1), (1, 2), (2, 2), (2, 0), (3, 0), (3, 4)];
    for (student_idx, section_idx) in enrollments {
        let section_id = sections[section_idx].id;
        store.insert_enrollment(students[student_idx].id, section_id)?;
        store.increment_enrollment(section_id)?;
    }

    Ok(SeedSummary {
        students: students.len(),
        sections: sections.len(),
        enrollments: enrollments.len(),
    })
}

fn teacher(first_name: &str, last_name: &str, title: &str, department: &str) -> Teacher {
    let mut teacher = Teacher::new(first_name, last_name);
    teacher.title = Some(title.to_string());
    teacher.email = Some(format!(
        "{}.{}@university.edu",
        first_name.to_ascii_lowercase(),
        last_name.to_ascii_lowercase()
    ));
    teacher.department = Some(department.to_string());
    teacher
}

fn subject(code: &str, name: &str, credits: u32, department: &str) -> Subject {
    let mut subject = Subject::new(code, name, credits);
    subject.department = Some(department.to_string());
    subject
}

fn classroom(number: &str, building: &str, seats: u32) -> Classroom {
    let mut classroom = Classroom::new(number, building);
    classroom.seats = Some(seats);
    classroom
}

fn student(code: &str, first_name: &str, last_name: &str, major: &str, year_level: u8) -> Student {
    let email = format!(
        "{}.{}@student.university.edu",
        first_name.to_ascii_lowercase(),
        last_name.to_ascii_lowercase()
    );
    let mut student = Student::new(code, first_name, last_name, email);
    student.major = Some(major.to_string());
    student.year_level = Some(year_level);
    student
}
