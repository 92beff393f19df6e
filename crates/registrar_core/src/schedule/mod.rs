//! Schedule reasoning and presentation.
//!
//! # Responsibility
//! - `conflict`: pure day/time conflict decision for one candidate section.
//! - `document`: printable layout of a student's schedule.

pub mod conflict;
pub mod document;
