//! Registrar repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide lookups and listings of fully hydrated students and sections.
//! - Provide uniqueness-constrained enrollment writes and guarded seat
//!   counters.
//! - Run multi-step workflows inside one immediate SQLite transaction.
//!
//! # Invariants
//! - Write paths call `validate()` before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - `increment_enrollment` never moves `current_enrollment` past
//!   `max_enrollment`.
//! - Enrolled-section listings are ordered by start time, then section
//!   number, then id.

use crate::model::calendar::{Recurrence, Term, TermFilter, TimeOfDay, TimeWindow, WeekdaySet};
use crate::model::section::{
    Capacity, Classroom, Section, SectionDetail, SectionId, Subject, Teacher,
};
use crate::model::student::{Enrollment, Student, StudentId, StudentSummary};
use crate::repo::error::{RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{
    ffi, params, params_from_iter, Connection, OptionalExtension, Row, TransactionBehavior,
};
use uuid::Uuid;

const SECTION_DETAIL_SELECT_SQL: &str = "SELECT
    s.id AS section_id,
    s.section_number AS section_number,
    s.semester AS semester,
    s.year AS year,
    s.recurrence AS recurrence,
    s.custom_days AS custom_days,
    s.start_minute AS start_minute,
    s.end_minute AS end_minute,
    s.current_enrollment AS current_enrollment,
    s.max_enrollment AS max_enrollment,
    sub.id AS subject_id,
    sub.code AS subject_code,
    sub.name AS subject_name,
    sub.credits AS subject_credits,
    sub.department AS subject_department,
    t.id AS teacher_id,
    t.first_name AS teacher_first_name,
    t.last_name AS teacher_last_name,
    t.title AS teacher_title,
    t.email AS teacher_email,
    t.department AS teacher_department,
    c.id AS classroom_id,
    c.number AS classroom_number,
    c.building AS classroom_building,
    c.seats AS classroom_seats
FROM sections s
INNER JOIN subjects sub ON sub.id = s.subject_id
INNER JOIN teachers t ON t.id = s.teacher_id
INNER JOIN classrooms c ON c.id = s.classroom_id";

const STUDENT_SELECT_SQL: &str = "SELECT
    id,
    student_code,
    first_name,
    last_name,
    email,
    major,
    year_level
FROM students";

/// Catalogue rows a section points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionLinks {
    pub subject_id: Uuid,
    pub teacher_id: Uuid,
    pub classroom_id: Uuid,
}

/// Query options for section catalogue listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionQuery {
    pub term: TermFilter,
    /// Excludes sections this student is already enrolled in.
    pub not_enrolled_by: Option<StudentId>,
    /// Excludes sections at or above capacity.
    pub open_only: bool,
}

/// Data access contract for registrar records.
pub trait RegistrarStore {
    fn create_student(&self, student: &Student) -> RepoResult<StudentId>;
    fn create_teacher(&self, teacher: &Teacher) -> RepoResult<Uuid>;
    fn create_subject(&self, subject: &Subject) -> RepoResult<Uuid>;
    fn create_classroom(&self, classroom: &Classroom) -> RepoResult<Uuid>;
    fn create_section(&self, section: &Section, links: &SectionLinks) -> RepoResult<SectionId>;

    fn get_student(&self, id: StudentId) -> RepoResult<Option<Student>>;
    /// Students ordered by last name, first name, student code.
    fn list_students(&self) -> RepoResult<Vec<StudentSummary>>;
    fn get_section(&self, id: SectionId) -> RepoResult<Option<SectionDetail>>;
    fn list_sections(&self, query: &SectionQuery) -> RepoResult<Vec<SectionDetail>>;

    fn get_enrollment(
        &self,
        student_id: StudentId,
        section_id: SectionId,
    ) -> RepoResult<Option<Enrollment>>;
    /// Sections the student is enrolled in, ordered by start time.
    fn list_enrolled_sections(
        &self,
        student_id: StudentId,
        term: &TermFilter,
    ) -> RepoResult<Vec<SectionDetail>>;
    fn insert_enrollment(
        &self,
        student_id: StudentId,
        section_id: SectionId,
    ) -> RepoResult<Enrollment>;
    fn delete_enrollment(&self, student_id: StudentId, section_id: SectionId) -> RepoResult<()>;

    /// Takes one seat; fails with `CapacityExhausted` when none is left.
    fn increment_enrollment(&self, section_id: SectionId) -> RepoResult<Capacity>;
    /// Releases one seat.
    fn decrement_enrollment(&self, section_id: SectionId) -> RepoResult<Capacity>;
}

/// Unit-of-work boundary over a `RegistrarStore`.
pub trait RegistrarRepository {
    /// Runs read-only work.
    fn read<T, E>(&self, work: impl FnOnce(&dyn RegistrarStore) -> Result<T, E>) -> Result<T, E>
    where
        E: From<RepoError>;

    /// Runs work atomically; nothing is persisted unless `work` returns `Ok`.
    fn write<T, E>(
        &mut self,
        work: impl FnOnce(&dyn RegistrarStore) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<RepoError>;
}

/// SQLite-backed store over a borrowed connection or transaction.
pub struct SqliteRegistrarStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRegistrarStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

/// SQLite-backed repository; writes take an immediate (write-locked)
/// transaction so concurrent enrollments serialize on the database.
pub struct SqliteRegistrarRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteRegistrarRepository<'conn> {
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }
}

impl RegistrarRepository for SqliteRegistrarRepository<'_> {
    fn read<T, E>(&self, work: impl FnOnce(&dyn RegistrarStore) -> Result<T, E>) -> Result<T, E>
    where
        E: From<RepoError>,
    {
        let store = SqliteRegistrarStore::new(self.conn);
        work(&store)
    }

    fn write<T, E>(
        &mut self,
        work: impl FnOnce(&dyn RegistrarStore) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<RepoError>,
    {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(RepoError::from)?;

        let outcome = {
            let store = SqliteRegistrarStore::new(&tx);
            work(&store)
        };

        // Dropping `tx` on the error path rolls back.
        let value = outcome?;
        tx.commit().map_err(RepoError::from)?;
        Ok(value)
    }
}

impl RegistrarStore for SqliteRegistrarStore<'_> {
    fn create_student(&self, student: &Student) -> RepoResult<StudentId> {
        student.validate()?;

        self.conn.execute(
            "INSERT INTO students (
                id,
                student_code,
                first_name,
                last_name,
                email,
                major,
                year_level
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                student.id.to_string(),
                student.student_code.as_str(),
                student.first_name.as_str(),
                student.last_name.as_str(),
                student.email.as_str(),
                student.major.as_deref(),
                student.year_level,
            ],
        )?;

        Ok(student.id)
    }

    fn create_teacher(&self, teacher: &Teacher) -> RepoResult<Uuid> {
        self.conn.execute(
            "INSERT INTO teachers (id, first_name, last_name, title, email, department)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                teacher.id.to_string(),
                teacher.first_name.as_str(),
                teacher.last_name.as_str(),
                teacher.title.as_deref(),
                teacher.email.as_deref(),
                teacher.department.as_deref(),
            ],
        )?;
        Ok(teacher.id)
    }

    fn create_subject(&self, subject: &Subject) -> RepoResult<Uuid> {
        self.conn.execute(
            "INSERT INTO subjects (id, code, name, credits, department)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                subject.id.to_string(),
                subject.code.as_str(),
                subject.name.as_str(),
                subject.credits,
                subject.department.as_deref(),
            ],
        )?;
        Ok(subject.id)
    }

    fn create_classroom(&self, classroom: &Classroom) -> RepoResult<Uuid> {
        self.conn.execute(
            "INSERT INTO classrooms (id, number, building, seats) VALUES (?1, ?2, ?3, ?4);",
            params![
                classroom.id.to_string(),
                classroom.number.as_str(),
                classroom.building.as_str(),
                classroom.seats,
            ],
        )?;
        Ok(classroom.id)
    }

    fn create_section(&self, section: &Section, links: &SectionLinks) -> RepoResult<SectionId> {
        section.validate()?;

        let custom_days = match section.recurrence {
            Recurrence::Custom(days) => days.bits(),
            _ => 0,
        };

        self.conn.execute(
            "INSERT INTO sections (
                id,
                section_number,
                semester,
                year,
                recurrence,
                custom_days,
                start_minute,
                end_minute,
                current_enrollment,
                max_enrollment,
                subject_id,
                teacher_id,
                classroom_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13);",
            params![
                section.id.to_string(),
                section.section_number.as_str(),
                section.term.semester.as_str(),
                section.term.year,
                section.recurrence.code(),
                custom_days,
                section.window.start().minutes(),
                section.window.end().minutes(),
                section.capacity.current,
                section.capacity.max,
                links.subject_id.to_string(),
                links.teacher_id.to_string(),
                links.classroom_id.to_string(),
            ],
        )?;

        Ok(section.id)
    }

    fn get_student(&self, id: StudentId) -> RepoResult<Option<Student>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{STUDENT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_student_row(row)?));
        }
        Ok(None)
    }

    fn list_students(&self) -> RepoResult<Vec<StudentSummary>> {
        let mut stmt = self.conn.prepare(&format!(
            "{STUDENT_SELECT_SQL} ORDER BY last_name ASC, first_name ASC, student_code ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut students = Vec::new();
        while let Some(row) = rows.next()? {
            students.push(parse_student_row(row)?.summary());
        }
        Ok(students)
    }

    fn get_section(&self, id: SectionId) -> RepoResult<Option<SectionDetail>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SECTION_DETAIL_SELECT_SQL} WHERE s.id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_section_detail_row(row)?));
        }
        Ok(None)
    }

    fn list_sections(&self, query: &SectionQuery) -> RepoResult<Vec<SectionDetail>> {
        let mut sql = format!("{SECTION_DETAIL_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        push_term_clause(&mut sql, &mut bind_values, &query.term);

        if let Some(student_id) = query.not_enrolled_by {
            sql.push_str(
                " AND NOT EXISTS (
                    SELECT 1
                    FROM section_enrollments e
                    WHERE e.section_id = s.id
                      AND e.student_id = ?
                )",
            );
            bind_values.push(Value::Text(student_id.to_string()));
        }

        if query.open_only {
            sql.push_str(" AND s.current_enrollment < s.max_enrollment");
        }

        sql.push_str(
            " ORDER BY s.year ASC, s.semester ASC, sub.code ASC, s.section_number ASC, s.id ASC",
        );

        collect_section_details(self.conn, &sql, bind_values)
    }

    fn get_enrollment(
        &self,
        student_id: StudentId,
        section_id: SectionId,
    ) -> RepoResult<Option<Enrollment>> {
        let enrolled_at = self
            .conn
            .query_row(
                "SELECT enrolled_at
                 FROM section_enrollments
                 WHERE student_id = ?1 AND section_id = ?2;",
                params![student_id.to_string(), section_id.to_string()],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;

        Ok(enrolled_at.map(|enrolled_at| Enrollment {
            student_id,
            section_id,
            enrolled_at,
        }))
    }

    fn list_enrolled_sections(
        &self,
        student_id: StudentId,
        term: &TermFilter,
    ) -> RepoResult<Vec<SectionDetail>> {
        let mut sql = format!(
            "{SECTION_DETAIL_SELECT_SQL}
             INNER JOIN section_enrollments e ON e.section_id = s.id
             WHERE e.student_id = ?"
        );
        let mut bind_values = vec![Value::Text(student_id.to_string())];

        push_term_clause(&mut sql, &mut bind_values, term);
        sql.push_str(" ORDER BY s.start_minute ASC, s.section_number ASC, s.id ASC");

        collect_section_details(self.conn, &sql, bind_values)
    }

    fn insert_enrollment(
        &self,
        student_id: StudentId,
        section_id: SectionId,
    ) -> RepoResult<Enrollment> {
        let inserted = self.conn.query_row(
            "INSERT INTO section_enrollments (student_id, section_id)
             VALUES (?1, ?2)
             RETURNING enrolled_at;",
            params![student_id.to_string(), section_id.to_string()],
            |row| row.get::<_, i64>(0),
        );

        match inserted {
            Ok(enrolled_at) => Ok(Enrollment {
                student_id,
                section_id,
                enrolled_at,
            }),
            Err(err) if is_primary_key_violation(&err) => Err(RepoError::DuplicateEnrollment {
                student_id,
                section_id,
            }),
            Err(err) => Err(err.into()),
        }
    }

    fn delete_enrollment(&self, student_id: StudentId, section_id: SectionId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM section_enrollments WHERE student_id = ?1 AND section_id = ?2;",
            params![student_id.to_string(), section_id.to_string()],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "enrollment",
                id: section_id,
            });
        }
        Ok(())
    }

    fn increment_enrollment(&self, section_id: SectionId) -> RepoResult<Capacity> {
        let updated = self
            .conn
            .query_row(
                "UPDATE sections
                 SET current_enrollment = current_enrollment + 1
                 WHERE id = ?1
                   AND current_enrollment < max_enrollment
                 RETURNING current_enrollment, max_enrollment;",
                [section_id.to_string()],
                |row| {
                    Ok(Capacity {
                        current: row.get(0)?,
                        max: row.get(1)?,
                    })
                },
            )
            .optional()?;

        match updated {
            Some(capacity) => Ok(capacity),
            None if self.section_exists(section_id)? => {
                Err(RepoError::CapacityExhausted(section_id))
            }
            None => Err(RepoError::NotFound {
                entity: "section",
                id: section_id,
            }),
        }
    }

    fn decrement_enrollment(&self, section_id: SectionId) -> RepoResult<Capacity> {
        let updated = self
            .conn
            .query_row(
                "UPDATE sections
                 SET current_enrollment = current_enrollment - 1
                 WHERE id = ?1
                   AND current_enrollment > 0
                 RETURNING current_enrollment, max_enrollment;",
                [section_id.to_string()],
                |row| {
                    Ok(Capacity {
                        current: row.get(0)?,
                        max: row.get(1)?,
                    })
                },
            )
            .optional()?;

        match updated {
            Some(capacity) => Ok(capacity),
            None if self.section_exists(section_id)? => Err(RepoError::InvalidData(format!(
                "section {section_id} enrollment counter is already zero"
            ))),
            None => Err(RepoError::NotFound {
                entity: "section",
                id: section_id,
            }),
        }
    }
}

impl SqliteRegistrarStore<'_> {
    fn section_exists(&self, section_id: SectionId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sections WHERE id = ?1);",
            [section_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }
}

fn push_term_clause(sql: &mut String, bind_values: &mut Vec<Value>, term: &TermFilter) {
    if let Some(semester) = term.semester.as_ref() {
        sql.push_str(" AND s.semester = ?");
        bind_values.push(Value::Text(semester.clone()));
    }
    if let Some(year) = term.year {
        sql.push_str(" AND s.year = ?");
        bind_values.push(Value::Integer(i64::from(year)));
    }
}

fn collect_section_details(
    conn: &Connection,
    sql: &str,
    bind_values: Vec<Value>,
) -> RepoResult<Vec<SectionDetail>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params_from_iter(bind_values))?;
    let mut sections = Vec::new();
    while let Some(row) = rows.next()? {
        sections.push(parse_section_detail_row(row)?);
    }
    Ok(sections)
}

fn is_primary_key_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY
    )
}

fn parse_student_row(row: &Row<'_>) -> RepoResult<Student> {
    let student = Student {
        id: parse_uuid(row, "id", "students.id")?,
        student_code: row.get("student_code")?,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        email: row.get("email")?,
        major: row.get("major")?,
        year_level: row.get("year_level")?,
    };
    student.validate()?;
    Ok(student)
}

fn parse_section_detail_row(row: &Row<'_>) -> RepoResult<SectionDetail> {
    let recurrence_code: String = row.get("recurrence")?;
    let custom_bits: i64 = row.get("custom_days")?;
    let custom_days = u8::try_from(custom_bits)
        .ok()
        .and_then(WeekdaySet::from_bits)
        .ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid custom day mask `{custom_bits}` in sections.custom_days"
            ))
        })?;
    let recurrence = Recurrence::from_code(&recurrence_code, custom_days).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid recurrence `{recurrence_code}` in sections.recurrence"
        ))
    })?;

    let window = TimeWindow::new(
        TimeOfDay::from_minutes(row.get("start_minute")?)?,
        TimeOfDay::from_minutes(row.get("end_minute")?)?,
    )?;

    let section = Section {
        id: parse_uuid(row, "section_id", "sections.id")?,
        section_number: row.get("section_number")?,
        term: Term {
            semester: row.get("semester")?,
            year: row.get("year")?,
        },
        recurrence,
        window,
        capacity: Capacity {
            current: row.get("current_enrollment")?,
            max: row.get("max_enrollment")?,
        },
    };
    section.validate()?;

    Ok(SectionDetail {
        section,
        subject: Subject {
            id: parse_uuid(row, "subject_id", "subjects.id")?,
            code: row.get("subject_code")?,
            name: row.get("subject_name")?,
            credits: row.get("subject_credits")?,
            department: row.get("subject_department")?,
        },
        teacher: Teacher {
            id: parse_uuid(row, "teacher_id", "teachers.id")?,
            first_name: row.get("teacher_first_name")?,
            last_name: row.get("teacher_last_name")?,
            title: row.get("teacher_title")?,
            email: row.get("teacher_email")?,
            department: row.get("teacher_department")?,
        },
        classroom: Classroom {
            id: parse_uuid(row, "classroom_id", "classrooms.id")?,
            number: row.get("classroom_number")?,
            building: row.get("classroom_building")?,
            seats: row.get("classroom_seats")?,
        },
    })
}

fn parse_uuid(row: &Row<'_>, column: &str, label: &str) -> RepoResult<Uuid> {
    let text: String = row.get(column)?;
    Uuid::parse_str(&text)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{text}` in {label}")))
}
