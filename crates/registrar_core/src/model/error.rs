//! Validation errors shared by domain records.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Invariant violations detected on domain records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Stable identifiers must not be the nil UUID.
    NilId(&'static str),
    /// Required text field is empty after trim.
    BlankField(&'static str),
    /// Time-of-day text could not be parsed or is out of range.
    InvalidTime(String),
    /// Meeting window must satisfy `start < end`.
    InvalidTimeWindow { start: u16, end: u16 },
    /// Enrollment counter exceeds its ceiling.
    CapacityOverflow { current: u32, max: u32 },
    /// Numeric field outside its accepted range.
    OutOfRange { field: &'static str, value: i64 },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId(field) => write!(f, "{field} must not be nil"),
            Self::BlankField(field) => write!(f, "{field} must not be blank"),
            Self::InvalidTime(value) => {
                write!(f, "invalid time of day `{value}`; expected HH:MM (00:00-23:59)")
            }
            Self::InvalidTimeWindow { start, end } => write!(
                f,
                "end time ({end} min) must be after start time ({start} min)"
            ),
            Self::CapacityOverflow { current, max } => write!(
                f,
                "current enrollment ({current}) must not exceed max enrollment ({max})"
            ),
            Self::OutOfRange { field, value } => write!(f, "{field} out of range: {value}"),
        }
    }
}

impl Error for ValidationError {}
