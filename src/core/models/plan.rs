//! Student plan state
//!
//! A plan is three independently edited collections: completed courses,
//! the active semester's schedule, and the prospective flowchart. All edits
//! are keyed merges, so repeating an action never duplicates an entry.

use super::{CourseCode, SectionId, SectionRecord, Semester};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Result of merging an entry into one of the plan collections
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// A new entry was created
    Inserted,
    /// An entry with the same key existed and was changed
    Updated,
    /// An identical entry already existed
    Unchanged,
}

/// A finished course
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedRecord {
    /// Course taken
    pub code: CourseCode,

    /// Letter grade (e.g., "A", "B+", "P")
    pub grade: String,

    /// Semester it was taken; `None` for transfer or exam credit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semester: Option<Semester>,

    /// Credit hours earned
    #[serde(default)]
    pub credits: f32,
}

impl CompletedRecord {
    /// Create a completion record
    #[must_use]
    pub const fn new(code: CourseCode, grade: String, semester: Option<Semester>, credits: f32) -> Self {
        Self {
            code,
            grade,
            semester,
            credits,
        }
    }

    /// Unique key of this record
    #[must_use]
    pub fn key(&self) -> CompletionKey {
        CompletionKey {
            code: self.code.clone(),
            semester: self.semester,
        }
    }
}

/// `(code, semester)` key of the completed collection
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CompletionKey {
    /// Course
    pub code: CourseCode,
    /// Semester taken
    pub semester: Option<Semester>,
}

/// A section placed in the active schedule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledPlacement {
    /// The section
    pub section: SectionRecord,
    /// Display color chosen by the student (e.g., "#4f81bd")
    pub color: Option<String>,
}

/// A course placed on the prospective flowchart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowchartPlacement {
    /// Course
    pub code: CourseCode,
    /// Intended semester, if the student picked one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term: Option<Semester>,
}

impl FlowchartPlacement {
    /// Create a placement
    #[must_use]
    pub const fn new(code: CourseCode, term: Option<Semester>) -> Self {
        Self { code, term }
    }
}

/// Aggregate of a student's completed, scheduled and planned courses
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanState {
    /// Semester whose schedule counts as "in progress"
    pub active_semester: Option<Semester>,
    completed: BTreeMap<CompletionKey, CompletedRecord>,
    scheduled: BTreeMap<CourseCode, ScheduledPlacement>,
    flowchart: BTreeMap<CourseCode, FlowchartPlacement>,
}

impl PlanState {
    /// Create an empty plan for a semester
    #[must_use]
    pub const fn new(active_semester: Option<Semester>) -> Self {
        Self {
            active_semester,
            completed: BTreeMap::new(),
            scheduled: BTreeMap::new(),
            flowchart: BTreeMap::new(),
        }
    }

    // ---- completed ----

    /// Insert or update a completion keyed by `(code, semester)`
    pub fn upsert_completed(&mut self, record: CompletedRecord) -> MergeOutcome {
        match self.completed.insert(record.key(), record.clone()) {
            None => MergeOutcome::Inserted,
            Some(previous) if previous == record => MergeOutcome::Unchanged,
            Some(_) => MergeOutcome::Updated,
        }
    }

    /// Remove completions of `code`
    ///
    /// With a semester only that attempt is removed; without one every
    /// attempt is removed.
    ///
    /// # Returns
    /// The removed records
    pub fn remove_completed(
        &mut self,
        code: &CourseCode,
        semester: Option<&Semester>,
    ) -> Vec<CompletedRecord> {
        let keys: Vec<CompletionKey> = self
            .completed
            .keys()
            .filter(|k| &k.code == code && semester.map_or(true, |s| k.semester.as_ref() == Some(s)))
            .cloned()
            .collect();
        keys.iter().filter_map(|k| self.completed.remove(k)).collect()
    }

    /// Whether any completion of `code` exists
    #[must_use]
    pub fn is_completed(&self, code: &CourseCode) -> bool {
        self.completed.keys().any(|k| &k.code == code)
    }

    /// Every completion record, ordered by course then semester
    pub fn completed(&self) -> impl Iterator<Item = &CompletedRecord> {
        self.completed.values()
    }

    /// Completions of one course, oldest first
    pub fn completions_of<'a>(
        &'a self,
        code: &'a CourseCode,
    ) -> impl Iterator<Item = &'a CompletedRecord> + 'a {
        self.completed.values().filter(move |r| &r.code == code)
    }

    // ---- scheduled ----

    /// Place a section in the schedule
    ///
    /// Re-adding the same section id updates it in place. Adding another
    /// section of an already scheduled course replaces the old section.
    pub fn schedule(&mut self, section: SectionRecord, color: Option<String>) -> MergeOutcome {
        let placement = ScheduledPlacement { section, color };
        match self.scheduled.get(&placement.section.course) {
            Some(existing) if *existing == placement => MergeOutcome::Unchanged,
            Some(_) => {
                self.scheduled.insert(placement.section.course.clone(), placement);
                MergeOutcome::Updated
            }
            None => {
                self.scheduled.insert(placement.section.course.clone(), placement);
                MergeOutcome::Inserted
            }
        }
    }

    /// Remove a section from the schedule by id
    pub fn unschedule_section(&mut self, id: &SectionId) -> Option<ScheduledPlacement> {
        let course = self
            .scheduled
            .iter()
            .find(|(_, p)| &p.section.id == id)
            .map(|(code, _)| code.clone())?;
        self.scheduled.remove(&course)
    }

    /// Placement holding section `id`
    #[must_use]
    pub fn scheduled_by_id(&self, id: &SectionId) -> Option<&ScheduledPlacement> {
        self.scheduled.values().find(|p| &p.section.id == id)
    }

    /// Placement for a course
    #[must_use]
    pub fn scheduled_for(&self, code: &CourseCode) -> Option<&ScheduledPlacement> {
        self.scheduled.get(code)
    }

    /// Whether `code` has a section in the schedule
    #[must_use]
    pub fn is_scheduled(&self, code: &CourseCode) -> bool {
        self.scheduled.contains_key(code)
    }

    /// Scheduled placements ordered by course
    pub fn scheduled(&self) -> impl Iterator<Item = &ScheduledPlacement> {
        self.scheduled.values()
    }

    /// Scheduled sections ordered by course
    pub fn scheduled_sections(&self) -> impl Iterator<Item = &SectionRecord> {
        self.scheduled.values().map(|p| &p.section)
    }

    /// Number of scheduled sections
    #[must_use]
    pub fn scheduled_count(&self) -> usize {
        self.scheduled.len()
    }

    // ---- flowchart ----

    /// Add or move a flowchart node
    pub fn add_flow(&mut self, placement: FlowchartPlacement) -> MergeOutcome {
        match self.flowchart.insert(placement.code.clone(), placement.clone()) {
            None => MergeOutcome::Inserted,
            Some(previous) if previous == placement => MergeOutcome::Unchanged,
            Some(_) => MergeOutcome::Updated,
        }
    }

    /// Remove a flowchart node
    pub fn remove_flow(&mut self, code: &CourseCode) -> Option<FlowchartPlacement> {
        self.flowchart.remove(code)
    }

    /// Remove every flowchart node, returning the removed codes
    pub fn clear_flowchart(&mut self) -> Vec<CourseCode> {
        std::mem::take(&mut self.flowchart).into_keys().collect()
    }

    /// Whether `code` is on the flowchart
    #[must_use]
    pub fn is_on_flowchart(&self, code: &CourseCode) -> bool {
        self.flowchart.contains_key(code)
    }

    /// Flowchart nodes ordered by course
    pub fn flowchart(&self) -> impl Iterator<Item = &FlowchartPlacement> {
        self.flowchart.values()
    }

    // ---- aggregate ----

    /// Every course present in any of the three collections
    #[must_use]
    pub fn course_codes(&self) -> BTreeSet<CourseCode> {
        self.completed
            .keys()
            .map(|k| k.code.clone())
            .chain(self.scheduled.keys().cloned())
            .chain(self.flowchart.keys().cloned())
            .collect()
    }

    /// Whether `code` appears in any collection
    #[must_use]
    pub fn contains(&self, code: &CourseCode) -> bool {
        self.is_completed(code) || self.is_scheduled(code) || self.is_on_flowchart(code)
    }
}
