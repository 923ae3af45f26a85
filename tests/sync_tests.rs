//! Integration tests for the plan synchronizer and its save queue

use class_planner::core::catalog::{Catalog, FileCatalog, FileStore, PlanStore, StoreError};
use class_planner::core::models::{
    CompletedRecord, CourseCode, FlowchartPlacement, MergeOutcome, PlanState, ScheduledPlacement, SectionId,
    Semester, Term,
};
use class_planner::core::requisites::PrereqMap;
use class_planner::core::schedule::{DayFallback, ParseDiagnostics};
use class_planner::core::status::CourseStatus;
use class_planner::core::sync::{PlanSynchronizer, SaveOutcome, SyncError};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tempfile::TempDir;

const CATALOG: &str = r#"
[[courses]]
code = "MATH 1914"
title = "Calculus I"
credits = 3.0

[[courses]]
code = "MATH 2924"
title = "Calculus II"
credits = 3.0

[[courses]]
code = "MATH 3134"
title = "Applied Combinatorics"
credits = 3.0

[[courses]]
code = "PHYS 2305"
title = "Foundations of Physics I"
credits = 4.0

[[sections]]
id = "100"
course = "MATH 2924"
time = "MWF 10:00 am-10:50 am"
semester = "Fall 2025"

[[sections]]
id = "101"
course = "MATH 2924"
time = "TR 9:30 am-10:45 am"
semester = "Fall 2025"

[[sections]]
id = "200"
course = "PHYS 2305"
time = "MWF 10:30 am-11:20 am"
semester = "Fall 2025"

[[sections]]
id = "201"
course = "PHYS 2305"
time = "MW 2:30 pm-3:45 pm"
semester = "Fall 2025"

[[prerequisites]]
course = "MATH 2924"
kind = "required"
any_of = ["MATH 1914"]

[[prerequisites]]
course = "MATH 3134"
kind = "required"
any_of = ["MATH 2924"]
"#;

const DEBOUNCE: Duration = Duration::from_millis(500);

fn fall() -> Semester {
    Semester::new(Term::Fall, 2025)
}

fn catalog() -> FileCatalog {
    FileCatalog::from_toml(CATALOG, DayFallback::Monday, &mut ParseDiagnostics::new())
        .expect("valid catalog")
}

fn code(s: &str) -> CourseCode {
    s.parse().expect("valid course code")
}

fn id(s: &str) -> SectionId {
    SectionId::from(s)
}

fn empty_sync() -> PlanSynchronizer {
    PlanSynchronizer::new(PlanState::new(Some(fall())), catalog().prerequisites(), DEBOUNCE)
}

/// Store that fails every write until told otherwise
#[derive(Default)]
struct FlakyStore {
    fail_writes: bool,
    writes: usize,
    completed: Vec<CompletedRecord>,
}

impl PlanStore for FlakyStore {
    fn get_completed_courses(&self, _user: &str) -> Result<Vec<CompletedRecord>, StoreError> {
        Ok(self.completed.clone())
    }

    fn put_completed_courses(
        &mut self,
        user: &str,
        records: &[CompletedRecord],
    ) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::InvalidUser(user.to_string()));
        }
        self.writes += 1;
        self.completed = records.to_vec();
        Ok(())
    }

    fn get_schedule(
        &self,
        _user: &str,
        _semester: &Semester,
    ) -> Result<Vec<ScheduledPlacement>, StoreError> {
        Ok(Vec::new())
    }

    fn put_schedule(
        &mut self,
        _user: &str,
        _semester: &Semester,
        _section_ids: &[SectionId],
        _colors: &BTreeMap<SectionId, String>,
    ) -> Result<(), StoreError> {
        Ok(())
    }

    fn get_flowchart(&self, _user: &str) -> Result<Vec<FlowchartPlacement>, StoreError> {
        Ok(Vec::new())
    }

    fn put_flowchart(
        &mut self,
        _user: &str,
        _nodes: &[FlowchartPlacement],
    ) -> Result<(), StoreError> {
        Ok(())
    }
}

#[test]
fn test_readding_section_is_idempotent() {
    let cat = catalog();
    let mut sync = empty_sync();
    let now = Instant::now();

    let first = sync.add_section_by_id(&cat, &id("100"), None, now).unwrap();
    let second = sync.add_section_by_id(&cat, &id("100"), None, now).unwrap();

    assert_eq!(first.outcome, Some(MergeOutcome::Inserted));
    assert_eq!(second.outcome, Some(MergeOutcome::Unchanged));
    assert_eq!(sync.plan().scheduled_count(), 1);
}

#[test]
fn test_locked_course_is_still_addable() {
    let cat = catalog();
    let mut sync = empty_sync();
    let now = Instant::now();

    sync.add_to_flowchart(code("MATH 2924"), Some(fall()), now);
    assert_eq!(sync.status_of(&code("MATH 2924")), Some(CourseStatus::Locked));

    sync.add_section_by_id(&cat, &id("101"), None, now)
        .expect("prerequisites never block an add");
    assert_eq!(sync.status_of(&code("MATH 2924")), Some(CourseStatus::InProgress));
}

#[test]
fn test_conflicting_section_is_rejected_and_plan_untouched() {
    let cat = catalog();
    let mut sync = empty_sync();
    let now = Instant::now();

    sync.add_section_by_id(&cat, &id("100"), None, now).unwrap();
    let err = sync.add_section_by_id(&cat, &id("200"), None, now).unwrap_err();
    assert!(matches!(err, SyncError::TimeConflict { .. }));
    assert!(!sync.plan().is_scheduled(&code("PHYS 2305")));

    assert!(matches!(
        sync.add_section_by_id(&cat, &id("999"), None, now),
        Err(SyncError::UnknownSection(_))
    ));
}

#[test]
fn test_switch_keeps_color_within_course() {
    let cat = catalog();
    let mut sync = empty_sync();
    let now = Instant::now();

    sync.add_section_by_id(&cat, &id("100"), Some("#4f81bd".to_string()), now)
        .unwrap();
    let replacement = cat.get_section(&id("101")).unwrap().expect("section 101");
    let update = sync.switch_section(&id("100"), replacement, now).unwrap();

    assert_eq!(update.outcome, Some(MergeOutcome::Updated));
    let placement = sync.plan().scheduled_for(&code("MATH 2924")).expect("still scheduled");
    assert_eq!(placement.section.id, id("101"));
    assert_eq!(placement.color.as_deref(), Some("#4f81bd"));
    assert_eq!(sync.plan().scheduled_count(), 1);
}

#[test]
fn test_switch_to_other_course_is_refused() {
    let cat = catalog();
    let mut sync = empty_sync();
    let now = Instant::now();

    sync.add_section_by_id(&cat, &id("100"), None, now).unwrap();
    sync.add_section_by_id(&cat, &id("201"), None, now).unwrap();

    let other_course = cat.get_section(&id("200")).unwrap().expect("section 200");
    let err = sync.switch_section(&id("100"), other_course, now).unwrap_err();
    assert!(matches!(
        err,
        SyncError::CourseMismatch { ref expected, ref found, .. }
            if *expected == code("MATH 2924") && *found == code("PHYS 2305")
    ));

    assert_eq!(sync.plan().scheduled_count(), 2);
    assert_eq!(
        sync.plan().scheduled_for(&code("MATH 2924")).map(|p| p.section.id.clone()),
        Some(id("100"))
    );
    assert_eq!(
        sync.plan().scheduled_for(&code("PHYS 2305")).map(|p| p.section.id.clone()),
        Some(id("201"))
    );
    assert_eq!(sync.status_of(&code("MATH 2924")), Some(CourseStatus::InProgress));
}

#[test]
fn test_completion_propagates_one_hop_only() {
    let mut sync = empty_sync();
    let now = Instant::now();
    sync.add_to_flowchart(code("MATH 2924"), None, now);
    sync.add_to_flowchart(code("MATH 3134"), None, now);

    let update = sync.mark_complete(code("MATH 1914"), "A", Some(fall()), 3.0, now);

    assert!(update.touched(&code("MATH 1914")));
    assert!(update.touched(&code("MATH 2924")));
    assert!(!update.touched(&code("MATH 3134")));
    assert_eq!(sync.status_of(&code("MATH 2924")), Some(CourseStatus::NotStarted));
    assert_eq!(sync.status_of(&code("MATH 3134")), Some(CourseStatus::Locked));
    assert_eq!(update.changed().count(), 2);
}

#[test]
fn test_debounce_coalesces_edits() {
    let start = Instant::now();
    let mut sync = empty_sync();
    let mut store = FlakyStore::default();

    sync.mark_complete(code("MATH 1914"), "A", None, 3.0, start);
    sync.mark_complete(code("PHYS 2305"), "B", None, 4.0, start + Duration::from_millis(300));

    // Second edit pushed the deadline to 800ms.
    assert!(sync
        .flush(&mut store, "alex", start + Duration::from_millis(600))
        .is_none());

    let outcome = sync.flush(&mut store, "alex", start + Duration::from_millis(800));
    assert!(matches!(outcome, Some(SaveOutcome::Committed { .. })));
    assert_eq!(store.writes, 1);
    assert_eq!(store.completed.len(), 2);
    assert!(!sync.has_unsaved_changes());
}

#[test]
fn test_stale_write_requeues_latest_state() {
    let start = Instant::now();
    let mut sync = empty_sync();
    let mut store = FlakyStore::default();

    sync.mark_complete(code("MATH 1914"), "A", None, 3.0, start);
    let ticket = sync.begin_save(start + DEBOUNCE).expect("save due");

    // Edit lands while the first write is in flight.
    sync.mark_complete(code("PHYS 2305"), "B", None, 4.0, start + DEBOUNCE);
    let result = ticket.snapshot.write_to(&mut store, "alex");
    let outcome = sync.complete_save(ticket, result, start + DEBOUNCE);

    match outcome {
        SaveOutcome::Stale(conflict) => assert!(conflict.current > conflict.saved),
        other => panic!("expected a stale write, got {other:?}"),
    }
    assert!(sync.has_unsaved_changes());
    assert_eq!(store.completed.len(), 1);

    let outcome = sync.flush(&mut store, "alex", start + DEBOUNCE * 3);
    assert!(matches!(outcome, Some(SaveOutcome::Committed { .. })));
    assert_eq!(store.completed.len(), 2);
}

#[test]
fn test_failed_write_is_retried() {
    let start = Instant::now();
    let mut sync = empty_sync();
    let mut store = FlakyStore {
        fail_writes: true,
        ..FlakyStore::default()
    };

    sync.mark_complete(code("MATH 1914"), "A", None, 3.0, start);
    let outcome = sync.flush(&mut store, "alex", start + DEBOUNCE);
    assert!(matches!(outcome, Some(SaveOutcome::Failed(_))));
    assert!(sync.has_unsaved_changes());

    store.fail_writes = false;
    assert!(sync.flush(&mut store, "alex", start + DEBOUNCE).is_none());
    let outcome = sync.flush(&mut store, "alex", start + DEBOUNCE * 2);
    assert!(matches!(outcome, Some(SaveOutcome::Committed { .. })));
    assert_eq!(store.writes, 1);
}

#[test]
fn test_export_flowchart_schedules_conflict_free_sections() {
    let cat = catalog();
    let mut sync = empty_sync();
    let now = Instant::now();

    sync.add_section_by_id(&cat, &id("100"), None, now).unwrap();
    sync.add_to_flowchart(code("PHYS 2305"), Some(fall()), now);
    sync.add_to_flowchart(code("MATH 3134"), None, now);
    sync.add_to_flowchart(code("MATH 1914"), Some(Semester::new(Term::Spring, 2026)), now);

    let report = sync.export_flowchart_to_schedule(&cat, now).unwrap();

    // Section 200 overlaps 100, so 201 is picked.
    assert_eq!(report.scheduled, vec![(code("PHYS 2305"), id("201"))]);
    assert_eq!(report.unplaced, vec![code("MATH 3134")]);
    assert!(!sync.plan().is_scheduled(&code("MATH 1914")));
}

#[test]
fn test_persist_and_reload_through_file_store() {
    let temp = TempDir::new().expect("temp dir");
    let mut store = FileStore::new(temp.path(), catalog());
    let now = Instant::now();

    let mut sync = PlanSynchronizer::load(&store, store.catalog(), "alex", Some(fall()), DEBOUNCE)
        .expect("empty plan loads");
    assert!(!sync.has_unsaved_changes());

    let prereqs = store.catalog().get_prerequisites(&[code("MATH 2924")]).unwrap();
    sync.merge_prerequisites(prereqs);
    sync.mark_complete(code("MATH 1914"), "B+", Some(Semester::new(Term::Spring, 2025)), 3.0, now);
    sync.add_section_by_id(store.catalog(), &id("101"), Some("#336699".into()), now)
        .unwrap();
    sync.add_to_flowchart(code("MATH 3134"), Some(Semester::new(Term::Spring, 2026)), now);

    assert!(sync.persist_now(&mut store, "alex").unwrap());
    assert!(!sync.persist_now(&mut store, "alex").unwrap());

    let reloaded = PlanSynchronizer::load(&store, store.catalog(), "alex", Some(fall()), DEBOUNCE)
        .expect("saved plan loads");
    let plan = reloaded.plan();
    assert!(plan.is_completed(&code("MATH 1914")));
    let placement = plan.scheduled_by_id(&id("101")).expect("section restored");
    assert_eq!(placement.color.as_deref(), Some("#336699"));
    assert!(plan.is_on_flowchart(&code("MATH 3134")));
    assert_eq!(
        reloaded.status_of(&code("MATH 2924")),
        Some(CourseStatus::InProgress)
    );
    assert_eq!(
        reloaded.status_of(&code("MATH 3134")),
        Some(CourseStatus::Locked)
    );
}

#[test]
fn test_empty_prereq_map_never_locks() {
    let mut sync = PlanSynchronizer::new(PlanState::default(), &PrereqMap::new(), DEBOUNCE);
    sync.add_to_flowchart(code("MATH 3134"), None, Instant::now());
    assert_eq!(sync.status_of(&code("MATH 3134")), Some(CourseStatus::NotStarted));
}
