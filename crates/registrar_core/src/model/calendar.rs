//! Calendar primitives used by section scheduling.
//!
//! # Responsibility
//! - Model weekdays, recurrence templates and time-of-day windows.
//! - Derive the concrete weekday set every recurrence pattern meets on.
//! - Provide term identity and the typed term filter used by queries.
//!
//! # Invariants
//! - `Recurrence::Daily` covers Monday through Friday only.
//! - Custom day lists only exist inside `Recurrence::Custom`.
//! - `TimeWindow` always satisfies `start < end`.
//! - Only hour and minute are modelled; no date component exists.

use super::error::ValidationError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

static TIME_OF_DAY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d{1,2}):(\d{2})\s*$").expect("valid time-of-day regex"));

/// Minutes in one day; `TimeOfDay` values are strictly below this.
pub const MINUTES_PER_DAY: u16 = 24 * 60;

/// Day of the week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    /// All weekdays in canonical Monday-first order.
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    /// Three-letter symbol (`MON`..`SUN`).
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Monday => "MON",
            Self::Tuesday => "TUE",
            Self::Wednesday => "WED",
            Self::Thursday => "THU",
            Self::Friday => "FRI",
            Self::Saturday => "SAT",
            Self::Sunday => "SUN",
        }
    }

    /// Single-letter registrar code (`M T W R F S U`).
    pub fn letter(self) -> char {
        match self {
            Self::Monday => 'M',
            Self::Tuesday => 'T',
            Self::Wednesday => 'W',
            Self::Thursday => 'R',
            Self::Friday => 'F',
            Self::Saturday => 'S',
            Self::Sunday => 'U',
        }
    }

    /// Parses a symbol (`MON`) or full name (`monday`), case-insensitive.
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_uppercase();
        Self::ALL.into_iter().find(|day| {
            day.symbol() == normalized || format!("{day:?}").to_ascii_uppercase() == normalized
        })
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl Display for Weekday {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Set of weekdays, iterated in Monday-first order regardless of insert order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<Weekday>", into = "Vec<Weekday>")]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    pub const EMPTY: WeekdaySet = WeekdaySet(0);

    pub fn contains(self, day: Weekday) -> bool {
        self.0 & day.bit() != 0
    }

    pub fn insert(&mut self, day: Weekday) {
        self.0 |= day.bit();
    }

    pub fn intersection(self, other: WeekdaySet) -> WeekdaySet {
        WeekdaySet(self.0 & other.0)
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(self) -> impl Iterator<Item = Weekday> {
        Weekday::ALL
            .into_iter()
            .filter(move |day| self.contains(*day))
    }

    /// Bitmask with Monday in bit 0; used as the storage encoding.
    pub fn bits(self) -> u8 {
        self.0
    }

    /// Inverse of `bits`; rejects masks with bits above Sunday.
    pub fn from_bits(bits: u8) -> Option<Self> {
        if bits & 0x80 != 0 {
            return None;
        }
        Some(Self(bits))
    }

    /// Concatenated single-letter codes, e.g. `MWF`.
    pub fn letters(self) -> String {
        self.iter().map(Weekday::letter).collect()
    }
}

impl FromIterator<Weekday> for WeekdaySet {
    fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> Self {
        let mut set = WeekdaySet::EMPTY;
        for day in iter {
            set.insert(day);
        }
        set
    }
}

impl From<Vec<Weekday>> for WeekdaySet {
    fn from(value: Vec<Weekday>) -> Self {
        value.into_iter().collect()
    }
}

impl From<WeekdaySet> for Vec<Weekday> {
    fn from(value: WeekdaySet) -> Self {
        value.iter().collect()
    }
}

impl Display for WeekdaySet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let symbols: Vec<&str> = self.iter().map(Weekday::symbol).collect();
        f.write_str(&symbols.join(", "))
    }
}

/// Meeting-day template of a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "pattern", content = "days", rename_all = "snake_case")]
pub enum Recurrence {
    MonWedFri,
    TueThu,
    /// Weekdays only; weekend days are never included.
    Daily,
    Weekend,
    /// Explicit day list. An empty list means the section never meets.
    Custom(WeekdaySet),
}

impl Recurrence {
    /// Concrete weekdays this recurrence meets on.
    pub fn weekdays(self) -> WeekdaySet {
        use Weekday::*;
        match self {
            Self::MonWedFri => [Monday, Wednesday, Friday].into_iter().collect(),
            Self::TueThu => [Tuesday, Thursday].into_iter().collect(),
            Self::Daily => [Monday, Tuesday, Wednesday, Thursday, Friday]
                .into_iter()
                .collect(),
            Self::Weekend => [Saturday, Sunday].into_iter().collect(),
            Self::Custom(days) => days,
        }
    }

    /// Storage code of the pattern, without custom days.
    pub fn code(self) -> &'static str {
        match self {
            Self::MonWedFri => "mon_wed_fri",
            Self::TueThu => "tue_thu",
            Self::Daily => "daily",
            Self::Weekend => "weekend",
            Self::Custom(_) => "custom",
        }
    }

    /// Rebuilds a recurrence from its storage code.
    ///
    /// `custom_days` is ignored for every pattern except `custom`.
    pub fn from_code(code: &str, custom_days: WeekdaySet) -> Option<Self> {
        match code {
            "mon_wed_fri" => Some(Self::MonWedFri),
            "tue_thu" => Some(Self::TueThu),
            "daily" => Some(Self::Daily),
            "weekend" => Some(Self::Weekend),
            "custom" => Some(Self::Custom(custom_days)),
            _ => None,
        }
    }

    /// Compact label for printed schedules (`MWF`, `TR`, `MTWRF`, `SS`).
    pub fn label(self) -> String {
        match self {
            Self::MonWedFri => "MWF".to_string(),
            Self::TueThu => "TR".to_string(),
            Self::Daily => "MTWRF".to_string(),
            Self::Weekend => "SS".to_string(),
            Self::Custom(days) if days.is_empty() => "TBA".to_string(),
            Self::Custom(days) => days.letters(),
        }
    }
}

/// Wall-clock time of day with minute precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    pub fn from_hm(hour: u8, minute: u8) -> Result<Self, ValidationError> {
        if hour >= 24 || minute >= 60 {
            return Err(ValidationError::InvalidTime(format!("{hour}:{minute:02}")));
        }
        Ok(Self(u16::from(hour) * 60 + u16::from(minute)))
    }

    pub fn from_minutes(minutes: u16) -> Result<Self, ValidationError> {
        if minutes >= MINUTES_PER_DAY {
            return Err(ValidationError::InvalidTime(format!("{minutes} minutes")));
        }
        Ok(Self(minutes))
    }

    /// Parses 24-hour `HH:MM` text.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        let caps = TIME_OF_DAY_RE
            .captures(value)
            .ok_or_else(|| ValidationError::InvalidTime(value.to_string()))?;
        let hour = caps[1]
            .parse::<u8>()
            .map_err(|_| ValidationError::InvalidTime(value.to_string()))?;
        let minute = caps[2]
            .parse::<u8>()
            .map_err(|_| ValidationError::InvalidTime(value.to_string()))?;
        Self::from_hm(hour, minute).map_err(|_| ValidationError::InvalidTime(value.to_string()))
    }

    pub fn minutes(self) -> u16 {
        self.0
    }

    pub fn hour(self) -> u8 {
        (self.0 / 60) as u8
    }

    pub fn minute(self) -> u8 {
        (self.0 % 60) as u8
    }

    /// 12-hour clock label, e.g. `9:00 AM`, `12:30 PM`.
    pub fn to_12_hour(self) -> String {
        let meridiem = if self.hour() < 12 { "AM" } else { "PM" };
        let hour = match self.hour() % 12 {
            0 => 12,
            other => other,
        };
        format!("{hour}:{:02} {meridiem}", self.minute())
    }
}

impl Display for TimeOfDay {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for TimeOfDay {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.to_string()
    }
}

/// Half-open meeting window `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTimeWindow")]
pub struct TimeWindow {
    start: TimeOfDay,
    end: TimeOfDay,
}

#[derive(Deserialize)]
struct RawTimeWindow {
    start: TimeOfDay,
    end: TimeOfDay,
}

impl TryFrom<RawTimeWindow> for TimeWindow {
    type Error = ValidationError;

    fn try_from(value: RawTimeWindow) -> Result<Self, Self::Error> {
        Self::new(value.start, value.end)
    }
}

impl TimeWindow {
    pub fn new(start: TimeOfDay, end: TimeOfDay) -> Result<Self, ValidationError> {
        if start >= end {
            return Err(ValidationError::InvalidTimeWindow {
                start: start.minutes(),
                end: end.minutes(),
            });
        }
        Ok(Self { start, end })
    }

    /// Builds a window from `HH:MM` strings.
    pub fn parse(start: &str, end: &str) -> Result<Self, ValidationError> {
        Self::new(TimeOfDay::parse(start)?, TimeOfDay::parse(end)?)
    }

    pub fn start(self) -> TimeOfDay {
        self.start
    }

    pub fn end(self) -> TimeOfDay {
        self.end
    }

    /// Strict overlap; windows that only touch at an endpoint do not overlap.
    pub fn overlaps(self, other: TimeWindow) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl Display for TimeWindow {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start.to_12_hour(), self.end.to_12_hour())
    }
}

/// Academic term: semester label plus year.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Term {
    pub semester: String,
    pub year: i32,
}

impl Term {
    pub fn new(semester: impl Into<String>, year: i32) -> Self {
        Self {
            semester: semester.into(),
            year,
        }
    }
}

impl Display for Term {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.semester, self.year)
    }
}

/// Optional term restriction for schedule and catalogue queries.
///
/// Unset fields match every term. Semester comparison is exact.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TermFilter {
    pub semester: Option<String>,
    pub year: Option<i32>,
}

impl TermFilter {
    /// Filter matching every term.
    pub fn any() -> Self {
        Self::default()
    }

    /// Filter matching exactly one term.
    pub fn exact(term: &Term) -> Self {
        Self::any().semester(term.semester.clone()).year(term.year)
    }

    pub fn semester(mut self, semester: impl Into<String>) -> Self {
        self.semester = Some(semester.into());
        self
    }

    pub fn year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn is_unrestricted(&self) -> bool {
        self.semester.is_none() && self.year.is_none()
    }

    pub fn matches(&self, term: &Term) -> bool {
        self.semester
            .as_deref()
            .map_or(true, |semester| semester == term.semester)
            && self.year.map_or(true, |year| year == term.year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn daily_excludes_weekend() {
        let days = Recurrence::Daily.weekdays();
        assert_eq!(days.len(), 5);
        assert!(!days.contains(Weekday::Saturday));
        assert!(!days.contains(Weekday::Sunday));
    }

    #[test]
    fn custom_days_iterate_in_canonical_order() {
        let days: WeekdaySet = [Weekday::Friday, Weekday::Monday].into_iter().collect();
        assert_eq!(days.to_string(), "MON, FRI");
        assert_eq!(Recurrence::Custom(days).label(), "MF");
        assert_eq!(Recurrence::Custom(WeekdaySet::EMPTY).label(), "TBA");
    }

    #[test]
    fn from_code_ignores_custom_days_for_fixed_patterns() {
        let days: WeekdaySet = [Weekday::Sunday].into_iter().collect();
        assert_eq!(
            Recurrence::from_code("tue_thu", days),
            Some(Recurrence::TueThu)
        );
        assert_eq!(
            Recurrence::from_code("custom", days),
            Some(Recurrence::Custom(days))
        );
        assert_eq!(Recurrence::from_code("biweekly", days), None);
    }

    #[test]
    fn weekday_parse_accepts_symbols_and_names() {
        assert_eq!(Weekday::parse("mon"), Some(Weekday::Monday));
        assert_eq!(Weekday::parse(" Thursday "), Some(Weekday::Thursday));
        assert_eq!(Weekday::parse("thur"), None);
    }

    #[test]
    fn time_of_day_parses_and_formats() {
        let time = TimeOfDay::parse("7:30").unwrap();
        assert_eq!(time.minutes(), 450);
        assert_eq!(time.to_string(), "07:30");
        assert_eq!(time.to_12_hour(), "7:30 AM");
        assert_eq!(TimeOfDay::parse("12:05").unwrap().to_12_hour(), "12:05 PM");
        assert_eq!(TimeOfDay::parse("00:15").unwrap().to_12_hour(), "12:15 AM");
        assert!(TimeOfDay::parse("24:00").is_err());
        assert!(TimeOfDay::parse("9.30").is_err());
    }

    #[test]
    fn windows_touching_at_endpoint_do_not_overlap() {
        let first = TimeWindow::parse("09:00", "09:50").unwrap();
        let second = TimeWindow::parse("09:50", "10:40").unwrap();
        assert!(!first.overlaps(second));
        assert!(!second.overlaps(first));
        assert!(first.overlaps(TimeWindow::parse("09:49", "10:00").unwrap()));
    }

    #[test]
    fn window_rejects_non_positive_length() {
        let err = TimeWindow::parse("10:00", "10:00").unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidTimeWindow {
                start: 600,
                end: 600
            }
        );
    }

    #[test]
    fn term_filter_requires_both_fields_when_set() {
        let fall = Term::new("Fall", 2025);
        assert!(TermFilter::any().matches(&fall));
        assert!(TermFilter::any().semester("Fall").matches(&fall));
        assert!(!TermFilter::any().semester("Fall").year(2026).matches(&fall));
        assert!(!TermFilter::exact(&fall).matches(&Term::new("fall", 2025)));
    }
}
