//! Section model

use super::{CourseCode, Semester};
use crate::core::schedule::{DayFallback, MeetingPattern, ParseDiagnostics};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Registrar section identifier (e.g., "83422" or "CS2114-01")
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionId(String);

impl SectionId {
    /// Create an id from any string
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the id text
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SectionId {
    fn from(value: &str) -> Self {
        Self(value.trim().to_string())
    }
}

impl From<String> for SectionId {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One offering of a course in a semester
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionRecord {
    /// Section identifier
    pub id: SectionId,

    /// Owning course
    pub course: CourseCode,

    /// Instructor name as listed by the registrar
    pub instructor: Option<String>,

    /// Raw meeting-time string (e.g., "MWF 10:00 am-10:50 am")
    pub time: String,

    /// Building and room
    pub location: Option<String>,

    /// Open seats
    pub available_seats: Option<u32>,

    /// Capacity
    pub total_seats: Option<u32>,

    /// Semester the section is offered in
    pub semester: Option<Semester>,

    /// Meeting pattern parsed from `time`
    pub meeting: MeetingPattern,
}

impl SectionRecord {
    /// Create a section, parsing its meeting time
    ///
    /// # Arguments
    /// * `id` - Section identifier
    /// * `course` - Owning course code
    /// * `time` - Raw meeting-time string
    /// * `policy` - Handling of unknown day letters
    /// * `diagnostics` - Tracker used to log each bad time string once
    #[must_use]
    pub fn new(
        id: SectionId,
        course: CourseCode,
        time: &str,
        policy: DayFallback,
        diagnostics: &mut ParseDiagnostics,
    ) -> Self {
        Self {
            meeting: MeetingPattern::parse(time, policy, diagnostics),
            id,
            course,
            instructor: None,
            time: time.to_string(),
            location: None,
            available_seats: None,
            total_seats: None,
            semester: None,
        }
    }

    /// Set the instructor
    #[must_use]
    pub fn with_instructor(mut self, instructor: impl Into<String>) -> Self {
        self.instructor = Some(instructor.into());
        self
    }

    /// Set the location
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Set seat counts
    #[must_use]
    pub const fn with_seats(mut self, available: u32, total: u32) -> Self {
        self.available_seats = Some(available);
        self.total_seats = Some(total);
        self
    }

    /// Set the semester
    #[must_use]
    pub const fn with_semester(mut self, semester: Semester) -> Self {
        self.semester = Some(semester);
        self
    }

    /// Whether the registrar reports no open seats
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.available_seats == Some(0)
    }
}

impl fmt::Display for SectionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] {}", self.course, self.id, self.meeting)?;
        if let Some(instructor) = &self.instructor {
            write!(f, " ({instructor})")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(id: &str, time: &str) -> SectionRecord {
        let mut diagnostics = ParseDiagnostics::new();
        SectionRecord::new(
            SectionId::from(id),
            "CS 2114".parse().unwrap(),
            time,
            DayFallback::Monday,
            &mut diagnostics,
        )
    }

    #[test]
    fn test_section_parses_meeting() {
        let s = section("83422", "MWF 10:00 am-10:50 am");
        assert!(s.meeting.is_scheduled());
        assert_eq!(s.time, "MWF 10:00 am-10:50 am");
    }

    #[test]
    fn test_tba_section_is_unscheduled() {
        let s = section("83423", "TBA");
        assert_eq!(s.meeting, MeetingPattern::Unscheduled);
        assert_eq!(s.to_string(), "CS 2114 [83423] TBA");
    }

    #[test]
    fn test_seats() {
        let s = section("1", "TBA").with_seats(0, 30);
        assert!(s.is_full());
        assert!(!section("2", "TBA").with_seats(3, 30).is_full());
    }

    #[test]
    fn test_section_id_trims() {
        assert_eq!(SectionId::from(" 83422 "), SectionId::new("83422"));
    }
}
