//! Plan synchronizer
//!
//! Owns the plan, the prerequisite graph, the derived status map and the
//! save queue. Every mutation recomputes the status of the touched course
//! and of its direct dependents only; a course's status depends on its
//! direct prerequisites' records, never on anything further away.

pub mod persist;

pub use persist::{PlanSnapshot, SaveOutcome, SaveQueue, SaveTicket, StaleWriteConflict};

use crate::core::catalog::{Catalog, PlanStore, SectionQuery, StoreError};
use crate::core::models::{
    CompletedRecord, CourseCode, FlowchartPlacement, MergeOutcome, PlanState, SectionId,
    SectionRecord, Semester,
};
use crate::core::requisites::{MissingPrerequisiteSource, PrereqMap, PrerequisiteEdge, PrerequisiteGraph};
use crate::core::schedule::{check_against_schedule, ConflictDetail};
use crate::core::status::{compute_statuses, derive_status, CourseStatus};
use crate::{debug, info};
use std::collections::{BTreeMap, BTreeSet};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Failures of a synchronizer operation
#[derive(Debug, Error)]
pub enum SyncError {
    /// The section overlaps sections already scheduled
    #[error("cannot schedule section {section}: {}", describe_conflicts(.conflicts))]
    TimeConflict {
        /// Section that was rejected
        section: SectionId,
        /// Sections it collides with
        conflicts: Vec<ConflictDetail>,
    },
    /// No such section in the catalog
    #[error("section '{0}' is not in the catalog")]
    UnknownSection(SectionId),
    /// The section is not in the schedule
    #[error("section '{0}' is not scheduled")]
    NotScheduled(SectionId),
    /// A switch named a section of another course
    #[error("section {section} belongs to {found}, not {expected}; remove and add instead")]
    CourseMismatch {
        /// Replacement section
        section: SectionId,
        /// Course of the section being replaced
        expected: CourseCode,
        /// Course of the replacement
        found: CourseCode,
    },
    /// A save finished after newer local edits
    #[error("plan changed while saving: {0}")]
    StaleWrite(StaleWriteConflict),
    /// Catalog or store failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

fn describe_conflicts(conflicts: &[ConflictDetail]) -> String {
    conflicts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Status of one course before and after a mutation
///
/// `None` means the course was not in the plan at that point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    /// Course
    pub code: CourseCode,
    /// Status before
    pub before: Option<CourseStatus>,
    /// Status after
    pub after: Option<CourseStatus>,
}

impl StatusChange {
    /// Whether the status actually changed
    #[must_use]
    pub fn is_change(&self) -> bool {
        self.before != self.after
    }
}

/// What a mutation did to the plan and to derived statuses
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusUpdate {
    /// Merge result for insertions; `None` for removals and no-ops
    pub outcome: Option<MergeOutcome>,
    /// Every course whose status was recomputed
    pub recomputed: Vec<StatusChange>,
}

impl StatusUpdate {
    /// Recomputed courses whose status differs from before
    pub fn changed(&self) -> impl Iterator<Item = &StatusChange> {
        self.recomputed.iter().filter(|c| c.is_change())
    }

    /// Whether `code` was recomputed
    #[must_use]
    pub fn touched(&self, code: &CourseCode) -> bool {
        self.recomputed.iter().any(|c| &c.code == code)
    }
}

/// Result of exporting flowchart courses into the schedule
#[derive(Debug, Clone, Default)]
pub struct ExportReport {
    /// Courses that got a section
    pub scheduled: Vec<(CourseCode, SectionId)>,
    /// Courses with no conflict-free section this semester
    pub unplaced: Vec<CourseCode>,
    /// Combined status changes
    pub update: StatusUpdate,
}

/// Reconciles edits across completed, scheduled and flowchart courses
#[derive(Debug, Clone)]
pub struct PlanSynchronizer {
    plan: PlanState,
    graph: PrerequisiteGraph,
    statuses: BTreeMap<CourseCode, CourseStatus>,
    saves: SaveQueue,
}

impl PlanSynchronizer {
    /// Create a synchronizer over an existing plan
    ///
    /// # Arguments
    /// * `plan` - Starting plan
    /// * `prereqs` - Prerequisite groups for the plan's courses
    /// * `debounce` - Quiet period before a save starts
    #[must_use]
    pub fn new(plan: PlanState, prereqs: &PrereqMap, debounce: Duration) -> Self {
        let graph = PrerequisiteGraph::build(plan.course_codes(), prereqs);
        let statuses = compute_statuses(&plan, &graph);
        Self {
            plan,
            graph,
            statuses,
            saves: SaveQueue::new(debounce),
        }
    }

    /// Load a user's plan from a store and prerequisites from a catalog
    ///
    /// The loaded state counts as persisted, so an immediate flush writes
    /// nothing.
    ///
    /// # Errors
    /// Returns an error if the store or catalog cannot be read
    pub fn load<S, C>(
        store: &S,
        catalog: &C,
        user: &str,
        semester: Option<Semester>,
        debounce: Duration,
    ) -> Result<Self, SyncError>
    where
        S: PlanStore + ?Sized,
        C: Catalog + ?Sized,
    {
        let mut plan = PlanState::new(semester);
        for record in store.get_completed_courses(user)? {
            plan.upsert_completed(record);
        }
        if let Some(semester) = &semester {
            for placement in store.get_schedule(user, semester)? {
                plan.schedule(placement.section, placement.color);
            }
        }
        for node in store.get_flowchart(user)? {
            plan.add_flow(node);
        }

        let codes: Vec<CourseCode> = plan.course_codes().into_iter().collect();
        let prereqs = catalog.get_prerequisites(&codes)?;
        info!(
            "Loaded plan for '{user}': {} completed, {} scheduled, {} planned",
            plan.completed().count(),
            plan.scheduled_count(),
            plan.flowchart().count()
        );

        let mut sync = Self::new(plan, &prereqs, debounce);
        sync.saves.mark_persisted(PlanSnapshot::capture(&sync.plan));
        Ok(sync)
    }

    /// Add prerequisite data (e.g., for a course about to be added)
    pub fn merge_prerequisites(&mut self, prereqs: PrereqMap) {
        for (code, groups) in prereqs {
            self.graph.set_requirements(code, groups);
        }
        self.statuses = compute_statuses(&self.plan, &self.graph);
    }

    // ---- queries ----

    /// Current plan
    #[must_use]
    pub const fn plan(&self) -> &PlanState {
        &self.plan
    }

    /// Prerequisite graph
    #[must_use]
    pub const fn graph(&self) -> &PrerequisiteGraph {
        &self.graph
    }

    /// Status of every course in the plan
    #[must_use]
    pub const fn statuses(&self) -> &BTreeMap<CourseCode, CourseStatus> {
        &self.statuses
    }

    /// Status of one course
    #[must_use]
    pub fn status_of(&self, code: &CourseCode) -> Option<CourseStatus> {
        self.statuses.get(code).copied()
    }

    /// Prerequisite edges between plan courses
    #[must_use]
    pub fn edges(&self) -> Vec<PrerequisiteEdge> {
        self.graph.edges(&self.plan)
    }

    /// Prerequisite groups with no course present in the plan
    #[must_use]
    pub fn missing_sources(&self) -> Vec<MissingPrerequisiteSource> {
        self.graph.missing_sources(&self.plan)
    }

    /// Conflicts `candidate` would have with the schedule
    #[must_use]
    pub fn conflicts_for(
        &self,
        candidate: &SectionRecord,
        exclude_id: Option<&SectionId>,
    ) -> Vec<ConflictDetail> {
        check_against_schedule(candidate, self.plan.scheduled_sections(), exclude_id)
    }

    // ---- schedule ----

    /// Schedule a section
    ///
    /// Rejected only for time conflicts; unmet prerequisites never block an
    /// add. Re-adding the same section updates its color in place and another
    /// section of an already scheduled course replaces it.
    ///
    /// # Errors
    /// Returns `SyncError::TimeConflict` if the section overlaps the schedule
    pub fn add_section(
        &mut self,
        section: SectionRecord,
        color: Option<String>,
        now: Instant,
    ) -> Result<StatusUpdate, SyncError> {
        let replaced = self
            .plan
            .scheduled_for(&section.course)
            .map(|p| p.section.id.clone());
        let conflicts = self.conflicts_for(&section, replaced.as_ref());
        if !conflicts.is_empty() {
            return Err(SyncError::TimeConflict {
                section: section.id,
                conflicts,
            });
        }

        let code = section.course.clone();
        debug!("Scheduling {code} section {}", section.id);
        self.graph.add_course(code.clone());
        let outcome = self.plan.schedule(section, color);
        Ok(self.finish(Some(outcome), &[code], now))
    }

    /// Look a section up in the catalog and schedule it
    ///
    /// # Errors
    /// Returns `SyncError::UnknownSection` if the catalog has no such section,
    /// or any error of [`PlanSynchronizer::add_section`]
    pub fn add_section_by_id<C: Catalog + ?Sized>(
        &mut self,
        catalog: &C,
        id: &SectionId,
        color: Option<String>,
        now: Instant,
    ) -> Result<StatusUpdate, SyncError> {
        let section = catalog
            .get_section(id)?
            .ok_or_else(|| SyncError::UnknownSection(id.clone()))?;
        self.add_section(section, color, now)
    }

    /// Remove a section from the schedule
    ///
    /// # Errors
    /// Returns `SyncError::NotScheduled` if the section is not in the schedule
    pub fn remove_section(&mut self, id: &SectionId, now: Instant) -> Result<StatusUpdate, SyncError> {
        let removed = self
            .plan
            .unschedule_section(id)
            .ok_or_else(|| SyncError::NotScheduled(id.clone()))?;
        Ok(self.finish(None, &[removed.section.course], now))
    }

    /// Replace a scheduled section with another section of the same course,
    /// keeping its color
    ///
    /// The section being replaced is ignored by the conflict check.
    ///
    /// # Errors
    /// Returns `SyncError::NotScheduled` if `old_id` is not scheduled,
    /// `SyncError::CourseMismatch` if the new section is for another course,
    /// or `SyncError::TimeConflict` if the new section overlaps the rest
    pub fn switch_section(
        &mut self,
        old_id: &SectionId,
        new_section: SectionRecord,
        now: Instant,
    ) -> Result<StatusUpdate, SyncError> {
        let old = self
            .plan
            .scheduled_by_id(old_id)
            .ok_or_else(|| SyncError::NotScheduled(old_id.clone()))?;
        let course = old.section.course.clone();
        let color = old.color.clone();
        if new_section.course != course {
            return Err(SyncError::CourseMismatch {
                section: new_section.id,
                expected: course,
                found: new_section.course,
            });
        }

        let conflicts = self.conflicts_for(&new_section, Some(old_id));
        if !conflicts.is_empty() {
            return Err(SyncError::TimeConflict {
                section: new_section.id,
                conflicts,
            });
        }

        debug!("Switching {course} from {old_id} to {}", new_section.id);
        let outcome = self.plan.schedule(new_section, color);
        Ok(self.finish(Some(outcome), &[course], now))
    }

    // ---- completed ----

    /// Record a completed course, keyed by `(code, semester)`
    ///
    /// A scheduled section of the same course stays scheduled (retakes).
    pub fn mark_complete(
        &mut self,
        code: CourseCode,
        grade: impl Into<String>,
        semester: Option<Semester>,
        credits: f32,
        now: Instant,
    ) -> StatusUpdate {
        self.graph.add_course(code.clone());
        let record = CompletedRecord::new(code.clone(), grade.into(), semester, credits);
        let outcome = self.plan.upsert_completed(record);
        self.finish(Some(outcome), &[code], now)
    }

    /// Remove one completion (with `semester`) or every completion of `code`
    pub fn mark_incomplete(
        &mut self,
        code: &CourseCode,
        semester: Option<&Semester>,
        now: Instant,
    ) -> StatusUpdate {
        if self.plan.remove_completed(code, semester).is_empty() {
            return StatusUpdate::default();
        }
        self.finish(None, std::slice::from_ref(code), now)
    }

    // ---- flowchart ----

    /// Place a course on the flowchart
    pub fn add_to_flowchart(
        &mut self,
        code: CourseCode,
        term: Option<Semester>,
        now: Instant,
    ) -> StatusUpdate {
        self.graph.add_course(code.clone());
        let outcome = self.plan.add_flow(FlowchartPlacement::new(code.clone(), term));
        self.finish(Some(outcome), &[code], now)
    }

    /// Remove a course from the flowchart
    pub fn remove_from_flowchart(&mut self, code: &CourseCode, now: Instant) -> StatusUpdate {
        if self.plan.remove_flow(code).is_none() {
            return StatusUpdate::default();
        }
        self.finish(None, std::slice::from_ref(code), now)
    }

    /// Remove every flowchart node
    pub fn clear_flowchart(&mut self, now: Instant) -> StatusUpdate {
        let removed = self.plan.clear_flowchart();
        if removed.is_empty() {
            return StatusUpdate::default();
        }
        self.finish(None, &removed, now)
    }

    /// Schedule a section for every flowchart course planned for this semester
    ///
    /// Courses already completed or scheduled are left alone. For each other
    /// course the first catalog section that fits the schedule is added;
    /// courses without one are reported as unplaced.
    ///
    /// # Errors
    /// Returns an error if the catalog cannot be queried
    pub fn export_flowchart_to_schedule<C: Catalog + ?Sized>(
        &mut self,
        catalog: &C,
        now: Instant,
    ) -> Result<ExportReport, SyncError> {
        let active = self.plan.active_semester;
        let candidates: Vec<CourseCode> = self
            .plan
            .flowchart()
            .filter(|node| node.term.is_none() || node.term == active)
            .map(|node| node.code.clone())
            .filter(|code| !self.plan.is_completed(code) && !self.plan.is_scheduled(code))
            .collect();

        let mut report = ExportReport::default();
        for code in candidates {
            let mut query = SectionQuery::all().subject(code.subject());
            query.semester = active;
            let sections = catalog.get_sections(&query)?;
            let fit = sections
                .into_iter()
                .filter(|s| s.course == code)
                .find(|s| self.conflicts_for(s, None).is_empty());

            match fit {
                Some(section) => {
                    let id = section.id.clone();
                    let update = self.add_section(section, None, now)?;
                    report.update.recomputed.extend(update.recomputed);
                    report.scheduled.push((code, id));
                }
                None => report.unplaced.push(code),
            }
        }

        info!(
            "Exported flowchart: {} scheduled, {} unplaced",
            report.scheduled.len(),
            report.unplaced.len()
        );
        Ok(report)
    }

    // ---- persistence ----

    /// Whether edits are waiting to be saved
    #[must_use]
    pub const fn has_unsaved_changes(&self) -> bool {
        self.saves.is_pending() || self.saves.is_in_flight()
    }

    /// Start a save if the debounce window has passed
    pub fn begin_save(&mut self, now: Instant) -> Option<SaveTicket> {
        self.saves.begin(&self.plan, now)
    }

    /// Finish a save started with [`PlanSynchronizer::begin_save`]
    pub fn complete_save(
        &mut self,
        ticket: SaveTicket,
        result: Result<(), StoreError>,
        now: Instant,
    ) -> SaveOutcome {
        self.saves.complete(ticket, result, now)
    }

    /// Run one due save against `store`
    pub fn flush<S: PlanStore + ?Sized>(
        &mut self,
        store: &mut S,
        user: &str,
        now: Instant,
    ) -> Option<SaveOutcome> {
        let ticket = self.saves.begin(&self.plan, now)?;
        let result = ticket.snapshot.write_to(store, user);
        Some(self.saves.complete(ticket, result, now))
    }

    /// Save pending edits right away, ignoring the debounce window
    ///
    /// # Returns
    /// `true` if anything was written
    ///
    /// # Errors
    /// Returns the store error, or `SyncError::StaleWrite` if the plan moved
    /// on while writing
    pub fn persist_now<S: PlanStore + ?Sized>(
        &mut self,
        store: &mut S,
        user: &str,
    ) -> Result<bool, SyncError> {
        let Some(ticket) = self.saves.begin_now(&self.plan) else {
            return Ok(false);
        };
        let result = ticket.snapshot.write_to(store, user);
        match self.saves.complete(ticket, result, Instant::now()) {
            SaveOutcome::Committed { .. } => Ok(true),
            SaveOutcome::Stale(conflict) => Err(SyncError::StaleWrite(conflict)),
            SaveOutcome::Failed(err) => Err(SyncError::Store(err)),
        }
    }

    // ---- internals ----

    fn finish(
        &mut self,
        outcome: Option<MergeOutcome>,
        touched: &[CourseCode],
        now: Instant,
    ) -> StatusUpdate {
        if outcome != Some(MergeOutcome::Unchanged) {
            self.saves.mark_dirty(now);
        }
        StatusUpdate {
            outcome,
            recomputed: self.refresh(touched),
        }
    }

    /// Recompute `touched` and their direct dependents
    fn refresh(&mut self, touched: &[CourseCode]) -> Vec<StatusChange> {
        let mut targets: BTreeSet<CourseCode> = touched.iter().cloned().collect();
        for code in touched {
            targets.extend(self.graph.dependents_of(code).cloned());
        }

        let mut changes = Vec::with_capacity(targets.len());
        for code in targets {
            let before = self.statuses.get(&code).copied();
            let after = if self.plan.contains(&code) {
                let status = derive_status(&code, &self.plan, &self.graph);
                self.statuses.insert(code.clone(), status);
                Some(status)
            } else {
                self.statuses.remove(&code);
                None
            };
            if before != after {
                debug!(
                    "{code}: {} -> {}",
                    before.map_or("absent", CourseStatus::label),
                    after.map_or("absent", CourseStatus::label)
                );
            }
            changes.push(StatusChange { code, before, after });
        }
        changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::requisites::PrereqGroup;
    use crate::core::schedule::{DayFallback, ParseDiagnostics};

    fn code(s: &str) -> CourseCode {
        s.parse().unwrap()
    }

    fn section(id: &str, course: &str, time: &str) -> SectionRecord {
        SectionRecord::new(
            SectionId::from(id),
            code(course),
            time,
            DayFallback::Monday,
            &mut ParseDiagnostics::new(),
        )
    }

    fn chain() -> PrereqMap {
        let mut map = PrereqMap::new();
        map.insert(code("MATH 2924"), vec![PrereqGroup::required(vec![code("MATH 1914")])]);
        map.insert(code("MATH 3134"), vec![PrereqGroup::required(vec![code("MATH 2924")])]);
        map
    }

    #[test]
    fn test_conflicting_add_rejected() {
        let now = Instant::now();
        let mut sync = PlanSynchronizer::new(PlanState::default(), &PrereqMap::new(), Duration::ZERO);
        sync.add_section(section("1", "ECE 2214", "MWF 10:00 am-10:50 am"), None, now)
            .unwrap();

        let err = sync
            .add_section(section("2", "CS 2114", "MWF 10:30 am-11:20 am"), None, now)
            .unwrap_err();
        match err {
            SyncError::TimeConflict { conflicts, .. } => {
                assert_eq!(conflicts.len(), 1);
                assert_eq!(conflicts[0].to_string(), "Time conflict with ECE 2214 on MWF");
            }
            other => panic!("unexpected error {other}"),
        }
        assert_eq!(sync.plan().scheduled_count(), 1);
    }

    #[test]
    fn test_replacing_own_course_section_is_not_a_conflict() {
        let now = Instant::now();
        let mut sync = PlanSynchronizer::new(PlanState::default(), &PrereqMap::new(), Duration::ZERO);
        sync.add_section(section("1", "CS 2114", "MWF 10:00 am-10:50 am"), None, now)
            .unwrap();
        let update = sync
            .add_section(section("2", "CS 2114", "MWF 10:00 am-10:50 am"), None, now)
            .unwrap();
        assert_eq!(update.outcome, Some(MergeOutcome::Updated));
        assert!(sync.plan().scheduled_by_id(&SectionId::from("2")).is_some());
    }

    #[test]
    fn test_locked_course_can_still_be_scheduled() {
        let now = Instant::now();
        let mut sync = PlanSynchronizer::new(PlanState::default(), &chain(), Duration::ZERO);
        sync.add_to_flowchart(code("MATH 2924"), None, now);
        assert_eq!(sync.status_of(&code("MATH 2924")), Some(CourseStatus::Locked));

        sync.add_section(section("7", "MATH 2924", "TR 9:30 am-10:45 am"), None, now)
            .unwrap();
        assert_eq!(sync.status_of(&code("MATH 2924")), Some(CourseStatus::InProgress));
    }

    #[test]
    fn test_removal_recomputes_one_hop() {
        let now = Instant::now();
        let mut sync = PlanSynchronizer::new(PlanState::default(), &chain(), Duration::ZERO);
        sync.mark_complete(code("MATH 1914"), "A", None, 3.0, now);
        sync.add_to_flowchart(code("MATH 2924"), None, now);
        sync.add_to_flowchart(code("MATH 3134"), None, now);
        assert_eq!(sync.status_of(&code("MATH 2924")), Some(CourseStatus::NotStarted));

        let update = sync.mark_incomplete(&code("MATH 1914"), None, now);
        assert!(update.touched(&code("MATH 1914")));
        assert!(update.touched(&code("MATH 2924")));
        assert!(!update.touched(&code("MATH 3134")));
        assert_eq!(sync.status_of(&code("MATH 2924")), Some(CourseStatus::Locked));
        assert_eq!(sync.status_of(&code("MATH 1914")), None);
    }

    #[test]
    fn test_completed_wins_over_scheduled() {
        let now = Instant::now();
        let mut sync = PlanSynchronizer::new(PlanState::default(), &PrereqMap::new(), Duration::ZERO);
        sync.add_section(section("1", "CS 2114", "TBA"), None, now).unwrap();
        sync.mark_complete(code("CS 2114"), "C", None, 3.0, now);
        assert_eq!(sync.status_of(&code("CS 2114")), Some(CourseStatus::Completed));
        assert!(sync.plan().is_scheduled(&code("CS 2114")));
    }

    #[test]
    fn test_switch_excludes_old_section() {
        let now = Instant::now();
        let mut sync = PlanSynchronizer::new(PlanState::default(), &PrereqMap::new(), Duration::ZERO);
        sync.add_section(section("L1", "CHEM 1045", "M 2:30 pm-5:15 pm"), Some("#aa0000".into()), now)
            .unwrap();
        sync.switch_section(
            &SectionId::from("L1"),
            section("L2", "CHEM 1045", "M 3:00 pm-5:45 pm"),
            now,
        )
        .unwrap();
        let placement = sync.plan().scheduled_by_id(&SectionId::from("L2")).unwrap();
        assert_eq!(placement.color.as_deref(), Some("#aa0000"));
        assert!(matches!(
            sync.switch_section(&SectionId::from("L1"), section("L3", "CHEM 1045", "TBA"), now),
            Err(SyncError::NotScheduled(_))
        ));
    }

    #[test]
    fn test_noop_mutations_do_not_dirty() {
        let now = Instant::now();
        let mut sync = PlanSynchronizer::new(PlanState::default(), &PrereqMap::new(), Duration::ZERO);
        assert!(sync.remove_from_flowchart(&code("CS 1114"), now).recomputed.is_empty());
        assert!(sync.clear_flowchart(now).recomputed.is_empty());
        assert!(!sync.has_unsaved_changes());
    }
}
