//! Integration tests for status derivation and prerequisite edges

use class_planner::core::models::{
    CompletedRecord, CourseCode, FlowchartPlacement, PlanState, SectionId, SectionRecord,
};
use class_planner::core::requisites::{PrereqGroup, PrereqMap, PrerequisiteGraph, RequisiteKind};
use class_planner::core::schedule::{DayFallback, ParseDiagnostics};
use class_planner::core::status::{derive_status, CourseStatus};
use class_planner::{build_prerequisite_edges, compute_statuses};

fn code(s: &str) -> CourseCode {
    s.parse().expect("valid course code")
}

fn completed(course: &str, grade: &str) -> CompletedRecord {
    CompletedRecord::new(code(course), grade.to_string(), None, 3.0)
}

fn flow(course: &str) -> FlowchartPlacement {
    FlowchartPlacement::new(code(course), None)
}

fn section(id: &str, course: &str) -> SectionRecord {
    SectionRecord::new(
        SectionId::from(id),
        code(course),
        "TR 9:30 am-10:45 am",
        DayFallback::Monday,
        &mut ParseDiagnostics::new(),
    )
}

fn calculus_chain() -> PrereqMap {
    let mut map = PrereqMap::new();
    map.insert(
        code("MATH 2924"),
        vec![PrereqGroup::required(vec![code("MATH 1914")])],
    );
    map
}

#[test]
fn test_completed_prerequisite_unlocks_course() {
    let mut plan = PlanState::default();
    plan.upsert_completed(completed("MATH 1914", "A"));
    plan.add_flow(flow("MATH 2924"));

    let graph = PrerequisiteGraph::build(plan.course_codes(), &calculus_chain());
    let status = derive_status(&code("MATH 2924"), &plan, &graph);
    assert_ne!(status, CourseStatus::Locked);
    assert_eq!(status, CourseStatus::NotStarted);
}

#[test]
fn test_missing_prerequisite_locks_course() {
    let mut plan = PlanState::default();
    plan.add_flow(flow("MATH 2924"));

    let graph = PrerequisiteGraph::build(plan.course_codes(), &calculus_chain());
    assert_eq!(
        derive_status(&code("MATH 2924"), &plan, &graph),
        CourseStatus::Locked
    );
}

#[test]
fn test_codes_in_different_formats_match() {
    let mut plan = PlanState::default();
    plan.upsert_completed(CompletedRecord::new(code("math1914"), "B".to_string(), None, 3.0));
    plan.add_flow(flow("Math 2924"));

    let statuses = compute_statuses(&plan, &PrerequisiteGraph::build(plan.course_codes(), &calculus_chain()));
    assert_eq!(statuses[&code("MATH 2924")], CourseStatus::NotStarted);
    assert_eq!(statuses[&code("MATH 1914")], CourseStatus::Completed);
}

#[test]
fn test_alternatives_satisfy_a_group() {
    let mut prereqs = PrereqMap::new();
    prereqs.insert(
        code("CS 2114"),
        vec![PrereqGroup::required(vec![code("CS 1114"), code("CS 1054")])],
    );

    let mut plan = PlanState::default();
    plan.upsert_completed(completed("CS 1054", "B+"));
    plan.add_flow(flow("CS 2114"));

    let statuses = compute_statuses(&plan, &PrerequisiteGraph::build(plan.course_codes(), &prereqs));
    assert_eq!(statuses[&code("CS 2114")], CourseStatus::NotStarted);
}

#[test]
fn test_concurrent_requirement_accepts_scheduled_course() {
    let mut prereqs = PrereqMap::new();
    prereqs.insert(
        code("PHYS 2306"),
        vec![PrereqGroup::concurrent(vec![code("PHYS 2305")])],
    );

    let mut plan = PlanState::default();
    plan.add_flow(flow("PHYS 2306"));
    let graph = PrerequisiteGraph::build(plan.course_codes(), &prereqs);
    assert_eq!(
        derive_status(&code("PHYS 2306"), &plan, &graph),
        CourseStatus::Locked
    );

    plan.schedule(section("84001", "PHYS 2305"), None);
    assert_eq!(
        derive_status(&code("PHYS 2306"), &plan, &graph),
        CourseStatus::NotStarted
    );
}

#[test]
fn test_scheduled_course_is_in_progress_even_when_locked() {
    let mut plan = PlanState::default();
    plan.schedule(section("1", "MATH 2924"), Some("#123456".to_string()));

    let statuses = compute_statuses(&plan, &PrerequisiteGraph::build(plan.course_codes(), &calculus_chain()));
    assert_eq!(statuses[&code("MATH 2924")], CourseStatus::InProgress);
}

#[test]
fn test_course_without_prerequisite_data_is_not_locked() {
    let mut plan = PlanState::default();
    plan.add_flow(flow("HIST 1115"));

    let statuses = compute_statuses(&plan, &PrerequisiteGraph::build(plan.course_codes(), &PrereqMap::new()));
    assert_eq!(statuses[&code("HIST 1115")], CourseStatus::NotStarted);
}

#[test]
fn test_edges_only_between_plan_courses() {
    let mut prereqs = calculus_chain();
    prereqs.insert(
        code("PHYS 2305"),
        vec![
            PrereqGroup::required(vec![code("MATH 1914")]),
            PrereqGroup::concurrent(vec![code("MATH 2924")]),
        ],
    );

    let mut plan = PlanState::default();
    plan.upsert_completed(completed("MATH 1914", "A"));
    plan.add_flow(flow("MATH 2924"));

    let edges = build_prerequisite_edges(&plan, &prereqs);
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].source, code("MATH 1914"));
    assert_eq!(edges[0].target, code("MATH 2924"));
    assert_eq!(edges[0].kind, RequisiteKind::Required);
    assert!(edges[0].satisfied);
    assert_eq!(edges[0].id, "e-MATH1914-MATH2924");

    plan.add_flow(flow("PHYS 2305"));
    let edges = build_prerequisite_edges(&plan, &prereqs);
    assert_eq!(edges.len(), 3);
    let concurrent = edges
        .iter()
        .find(|e| e.kind == RequisiteKind::Concurrent)
        .expect("concurrent edge");
    assert_eq!(concurrent.source, code("MATH 2924"));
    assert!(!concurrent.satisfied);
}

#[test]
fn test_missing_sources_reported() {
    let mut plan = PlanState::default();
    plan.add_flow(flow("MATH 2924"));

    let graph = PrerequisiteGraph::build(plan.course_codes(), &calculus_chain());
    let missing = graph.missing_sources(&plan);
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].target, code("MATH 2924"));
    assert!(graph.edges(&plan).is_empty());
}
