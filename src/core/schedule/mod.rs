//! Meeting-time parsing and conflict detection

pub mod conflict;
pub mod occurrence;
pub mod parser;

pub use conflict::{
    check_against_schedule, check_conflict, has_conflict, occurrences_overlap, overlaps,
    ConflictDetail, Overlap,
};
pub use occurrence::{
    format_clock, format_meeting_times, MeetingPattern, Weekday, WeekdaySet, WeeklyOccurrence,
};
pub use parser::{parse_meeting_times, DayFallback, MalformedReason, ParseDiagnostics, ParseFailure};
