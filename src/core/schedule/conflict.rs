//! Pairwise time-conflict detection between sections

use super::occurrence::{WeekdaySet, WeeklyOccurrence};
use crate::core::models::{CourseCode, SectionId, SectionRecord};
use std::fmt;

/// One overlapping pair of meeting blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overlap {
    /// Block from the first list
    pub left: WeeklyOccurrence,
    /// Block from the second list
    pub right: WeeklyOccurrence,
    /// Weekdays both blocks meet on
    pub days: WeekdaySet,
}

/// Whether two blocks share a weekday and their minute ranges intersect
///
/// Ranges are half-open, so a class ending at 10:50 and one starting at
/// 10:50 do not conflict.
#[must_use]
pub fn occurrences_overlap(a: &WeeklyOccurrence, b: &WeeklyOccurrence) -> Option<WeekdaySet> {
    let shared = a.days.intersection(b.days);
    if shared.is_empty() || a.end <= b.start || b.end <= a.start {
        None
    } else {
        Some(shared)
    }
}

/// Every overlapping block pair across two occurrence lists
#[must_use]
pub fn overlaps(a: &[WeeklyOccurrence], b: &[WeeklyOccurrence]) -> Vec<Overlap> {
    a.iter()
        .flat_map(|left| {
            b.iter().filter_map(move |right| {
                occurrences_overlap(left, right).map(|days| Overlap {
                    left: *left,
                    right: *right,
                    days,
                })
            })
        })
        .collect()
}

/// Whether any block of `a` overlaps any block of `b`
#[must_use]
pub fn has_conflict(a: &[WeeklyOccurrence], b: &[WeeklyOccurrence]) -> bool {
    a.iter()
        .any(|left| b.iter().any(|right| occurrences_overlap(left, right).is_some()))
}

/// A scheduled section that clashes with a candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictDetail {
    /// Conflicting section
    pub section_id: SectionId,
    /// Course the conflicting section belongs to
    pub course: CourseCode,
    /// Union of the weekdays on which the two sections collide
    pub days: WeekdaySet,
}

impl fmt::Display for ConflictDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Time conflict with {} on {}", self.course, self.days)
    }
}

/// Compare a candidate section against a schedule
///
/// Sections whose id equals `exclude_id` or the candidate's own id are
/// skipped. Unscheduled sections never conflict.
///
/// # Arguments
/// * `candidate` - Section the student wants to add
/// * `scheduled` - Sections already in the schedule
/// * `exclude_id` - Section being replaced in a switch, if any
///
/// # Returns
/// One `ConflictDetail` per conflicting section, in schedule order
pub fn check_against_schedule<'a, I>(
    candidate: &SectionRecord,
    scheduled: I,
    exclude_id: Option<&SectionId>,
) -> Vec<ConflictDetail>
where
    I: IntoIterator<Item = &'a SectionRecord>,
{
    let wanted = candidate.meeting.occurrences();
    if wanted.is_empty() {
        return Vec::new();
    }

    scheduled
        .into_iter()
        .filter(|existing| existing.id != candidate.id && Some(&existing.id) != exclude_id)
        .filter_map(|existing| {
            let days = overlaps(wanted, existing.meeting.occurrences())
                .into_iter()
                .fold(WeekdaySet::empty(), |acc, o| acc.union(o.days));
            (!days.is_empty()).then(|| ConflictDetail {
                section_id: existing.id.clone(),
                course: existing.course.clone(),
                days,
            })
        })
        .collect()
}

/// UI-facing alias of [`check_against_schedule`]
pub fn check_conflict<'a, I>(
    candidate: &SectionRecord,
    current_schedule: I,
    exclude_id: Option<&SectionId>,
) -> Vec<ConflictDetail>
where
    I: IntoIterator<Item = &'a SectionRecord>,
{
    check_against_schedule(candidate, current_schedule, exclude_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schedule::{parse_meeting_times, DayFallback};

    fn blocks(s: &str) -> Vec<WeeklyOccurrence> {
        parse_meeting_times(s, DayFallback::Reject).unwrap()
    }

    #[test]
    fn test_disjoint_days_do_not_conflict() {
        let a = blocks("MWF 10:00 am-10:50 am");
        let b = blocks("TR 10:00 am-10:50 am");
        assert!(!has_conflict(&a, &b));
        assert!(overlaps(&a, &b).is_empty());
    }

    #[test]
    fn test_overlap_reports_shared_days() {
        let a = blocks("MWF 10:00 am-10:50 am");
        let b = blocks("MWF 10:30 am-11:20 am");
        let found = overlaps(&a, &b);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].days.to_string(), "MWF");
    }

    #[test]
    fn test_back_to_back_is_not_a_conflict() {
        let a = blocks("MW 9:00 am-9:50 am");
        let b = blocks("MW 9:50 am-10:40 am");
        assert!(!has_conflict(&a, &b));
    }

    #[test]
    fn test_containment_conflicts() {
        let outer = blocks("T 9:00 am-12:00 pm");
        let inner = blocks("TR 10:00 am-10:30 am");
        assert!(has_conflict(&outer, &inner));
        assert!(has_conflict(&inner, &outer));
    }

    #[test]
    fn test_partial_day_overlap_across_blocks() {
        let a = blocks("F 10:00 am-10:50 am, TR 12:00 pm-1:15 pm");
        let b = blocks("R 1:00 pm-2:00 pm");
        let found = overlaps(&a, &b);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].days.to_string(), "R");
    }
}
