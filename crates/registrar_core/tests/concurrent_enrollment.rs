use registrar_core::db::open_db;
use registrar_core::{
    Classroom, EnrollmentError, EnrollmentService, Recurrence, RegistrarStore, Section,
    SectionLinks, SqliteRegistrarRepository, SqliteRegistrarStore, Student, Subject, Teacher,
    Term, TimeWindow,
};
use std::sync::{Arc, Barrier};
use std::thread;

#[test]
fn last_seat_goes_to_exactly_one_of_two_racing_students() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("race.sqlite3");

    let conn = open_db(&path).unwrap();
    let store = SqliteRegistrarStore::new(&conn);
    let links = SectionLinks {
        subject_id: store
            .create_subject(&Subject::new("PHYS101", "General Physics I", 3))
            .unwrap(),
        teacher_id: store.create_teacher(&Teacher::new("Michael", "Brown")).unwrap(),
        classroom_id: store
            .create_classroom(&Classroom::new("PHYS-301", "Physics Building"))
            .unwrap(),
    };
    let section = Section::new(
        "001",
        Term::new("Fall", 2025),
        Recurrence::Daily,
        TimeWindow::parse("07:30", "08:20").unwrap(),
        1,
    );
    let section_id = store.create_section(&section, &links).unwrap();
    let students: Vec<_> = ["STU001", "STU002"]
        .into_iter()
        .map(|code| {
            let student = Student::new(code, "Racing", code, format!("{code}@example.edu"));
            store.create_student(&student).unwrap()
        })
        .collect();
    drop(store);
    drop(conn);

    let barrier = Arc::new(Barrier::new(students.len()));
    let handles: Vec<_> = students
        .into_iter()
        .map(|student_id| {
            let barrier = Arc::clone(&barrier);
            let path = path.clone();
            thread::spawn(move || {
                let mut conn = open_db(&path).unwrap();
                let mut service = EnrollmentService::new(SqliteRegistrarRepository::new(&mut conn));
                barrier.wait();
                service.enroll(student_id, section_id).map(|_| ())
            })
        })
        .collect();

    let outcomes: Vec<Result<(), EnrollmentError>> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();

    let succeeded = outcomes.iter().filter(|outcome| outcome.is_ok()).count();
    assert_eq!(succeeded, 1);
    let rejected: Vec<&EnrollmentError> = outcomes
        .iter()
        .filter_map(|outcome| outcome.as_ref().err())
        .collect();
    assert_eq!(rejected.len(), 1);
    assert_eq!(rejected[0].code(), "capacity_exceeded");

    let conn = open_db(&path).unwrap();
    let detail = SqliteRegistrarStore::new(&conn)
        .get_section(section_id)
        .unwrap()
        .unwrap();
    assert_eq!(detail.section.capacity.current, 1);
    let rows: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM section_enrollments WHERE section_id = ?1;",
            [section_id.to_string()],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(rows, 1);
}
