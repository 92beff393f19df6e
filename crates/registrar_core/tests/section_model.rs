use registrar_core::{
    Recurrence, Section, Term, TimeWindow, ValidationError, Weekday, WeekdaySet,
};
use serde_json::json;
use uuid::Uuid;

fn section(recurrence: Recurrence) -> Section {
    let mut section = Section::new(
        "001",
        Term::new("Fall", 2025),
        recurrence,
        TimeWindow::parse("09:00", "09:50").unwrap(),
        30,
    );
    section.id = Uuid::parse_str("11111111-2222-4333-8444-555555555555").unwrap();
    section
}

#[test]
fn section_new_starts_empty() {
    let section = Section::new(
        "002",
        Term::new("Spring", 2026),
        Recurrence::TueThu,
        TimeWindow::parse("10:30", "11:50").unwrap(),
        50,
    );

    assert!(!section.id.is_nil());
    assert_eq!(section.capacity.current, 0);
    assert_eq!(section.capacity.remaining(), 50);
    assert!(!section.capacity.is_full());
    assert!(section.validate().is_ok());
}

#[test]
fn section_serialization_uses_expected_wire_fields() {
    let section = section(Recurrence::MonWedFri);

    let value = serde_json::to_value(&section).unwrap();
    assert_eq!(value["id"], "11111111-2222-4333-8444-555555555555");
    assert_eq!(value["section_number"], "001");
    assert_eq!(value["term"], json!({ "semester": "Fall", "year": 2025 }));
    assert_eq!(value["recurrence"], json!({ "pattern": "mon_wed_fri" }));
    assert_eq!(value["window"], json!({ "start": "09:00", "end": "09:50" }));
    assert_eq!(value["capacity"], json!({ "current": 0, "max": 30 }));

    let decoded: Section = serde_json::from_value(value).unwrap();
    assert_eq!(decoded, section);
}

#[test]
fn custom_recurrence_carries_its_day_list() {
    let days: WeekdaySet = [Weekday::Monday, Weekday::Saturday].into_iter().collect();
    let section = section(Recurrence::Custom(days));

    let value = serde_json::to_value(&section).unwrap();
    assert_eq!(
        value["recurrence"],
        json!({ "pattern": "custom", "days": ["MONDAY", "SATURDAY"] })
    );

    let decoded: Section = serde_json::from_value(value).unwrap();
    assert_eq!(decoded.recurrence.weekdays(), days);
}

#[test]
fn reversed_window_is_rejected_on_deserialize() {
    let mut value = serde_json::to_value(section(Recurrence::Daily)).unwrap();
    value["window"] = json!({ "start": "10:00", "end": "09:00" });

    assert!(serde_json::from_value::<Section>(value).is_err());
}

#[test]
fn validate_rejects_overfull_and_blank_sections() {
    let mut overfull = section(Recurrence::Weekend);
    overfull.capacity.current = 31;
    assert_eq!(
        overfull.validate().unwrap_err(),
        ValidationError::CapacityOverflow {
            current: 31,
            max: 30
        }
    );

    let mut blank = section(Recurrence::Weekend);
    blank.section_number = "  ".to_string();
    assert!(matches!(
        blank.validate().unwrap_err(),
        ValidationError::BlankField(_)
    ));

    let mut nil = section(Recurrence::Weekend);
    nil.id = Uuid::nil();
    assert!(matches!(nil.validate().unwrap_err(), ValidationError::NilId(_)));
}
