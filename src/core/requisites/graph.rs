//! Prerequisite graph
//!
//! Nodes are courses, edges point from a prerequisite to the course that
//! needs it. Catalog data may contain cycles (mutual corequisites), so
//! nothing here walks the graph transitively: satisfaction of a group only
//! ever reads the plan's own completion and schedule records.

use super::{MissingPrerequisiteSource, PrereqGroup, PrereqMap, PrerequisiteEdge, RequisiteKind};
use crate::core::models::{CourseCode, PlanState};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Directed prerequisite graph with indexes in both directions
///
/// - `requirements`: course -> its prerequisite groups
/// - `dependents`: course -> courses naming it in any group (reverse graph)
#[derive(Debug, Clone, Default)]
pub struct PrerequisiteGraph {
    courses: BTreeSet<CourseCode>,
    requirements: BTreeMap<CourseCode, Vec<PrereqGroup>>,
    dependents: BTreeMap<CourseCode, BTreeSet<CourseCode>>,
}

impl PrerequisiteGraph {
    /// Create an empty graph
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from plan nodes and a prerequisite map
    ///
    /// # Arguments
    /// * `nodes` - Courses to include even if they have no prerequisite data
    /// * `prereqs` - Prerequisite groups keyed by course
    #[must_use]
    pub fn build<I>(nodes: I, prereqs: &PrereqMap) -> Self
    where
        I: IntoIterator<Item = CourseCode>,
    {
        let mut graph = Self::new();
        for code in nodes {
            graph.add_course(code);
        }
        for (code, groups) in prereqs {
            graph.set_requirements(code.clone(), groups.clone());
        }
        graph
    }

    /// Add a node without prerequisite data
    pub fn add_course(&mut self, code: CourseCode) {
        self.courses.insert(code);
    }

    /// Replace the prerequisite groups of `code`, keeping the reverse index in step
    pub fn set_requirements(&mut self, code: CourseCode, groups: Vec<PrereqGroup>) {
        if let Some(previous) = self.requirements.remove(&code) {
            for source in previous.iter().flat_map(|g| &g.any_of) {
                if let Some(deps) = self.dependents.get_mut(source) {
                    deps.remove(&code);
                }
            }
        }

        for source in groups.iter().flat_map(|g| &g.any_of) {
            self.dependents
                .entry(source.clone())
                .or_default()
                .insert(code.clone());
        }

        self.courses.insert(code.clone());
        self.requirements.insert(code, groups);
    }

    /// Prerequisite groups of `code`; empty when there is no data
    #[must_use]
    pub fn requirements(&self, code: &CourseCode) -> &[PrereqGroup] {
        self.requirements.get(code).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether any prerequisite data was loaded for `code`
    #[must_use]
    pub fn has_requirements(&self, code: &CourseCode) -> bool {
        self.requirements.contains_key(code)
    }

    /// Courses that list `code` in one of their groups (one hop only)
    pub fn dependents_of(&self, code: &CourseCode) -> impl Iterator<Item = &CourseCode> {
        self.dependents.get(code).into_iter().flatten()
    }

    /// Number of nodes
    #[must_use]
    pub fn course_count(&self) -> usize {
        self.courses.len()
    }

    /// Whether `code` is a node
    #[must_use]
    pub fn contains_course(&self, code: &CourseCode) -> bool {
        self.courses.contains(code)
    }

    /// Whether `group` is met by the plan's explicit records
    ///
    /// Required groups need a completed alternative. Concurrent groups also
    /// accept an alternative scheduled this semester.
    #[must_use]
    pub fn group_satisfied(group: &PrereqGroup, plan: &PlanState) -> bool {
        group.any_of.iter().any(|alt| match group.kind {
            RequisiteKind::Required => plan.is_completed(alt),
            RequisiteKind::Concurrent => plan.is_completed(alt) || plan.is_scheduled(alt),
        })
    }

    /// Whether every required group of `code` is met
    #[must_use]
    pub fn required_satisfied(&self, code: &CourseCode, plan: &PlanState) -> bool {
        self.requirements(code)
            .iter()
            .filter(|g| g.kind == RequisiteKind::Required)
            .all(|g| Self::group_satisfied(g, plan))
    }

    /// Edges between courses present in the plan
    ///
    /// One edge per (source, target, kind). Alternatives absent from the plan
    /// get no edge.
    #[must_use]
    pub fn edges(&self, plan: &PlanState) -> Vec<PrerequisiteEdge> {
        let mut seen = BTreeSet::new();
        let mut edges = Vec::new();

        for (target, groups) in &self.requirements {
            if !plan.contains(target) {
                continue;
            }
            for group in groups {
                let satisfied = Self::group_satisfied(group, plan);
                for source in group.any_of.iter().filter(|s| plan.contains(s)) {
                    if !seen.insert((source, target, group.kind)) {
                        continue;
                    }
                    edges.push(PrerequisiteEdge {
                        id: PrerequisiteEdge::edge_id(source, target, group.kind),
                        source: source.clone(),
                        target: target.clone(),
                        kind: group.kind,
                        satisfied,
                    });
                }
            }
        }

        edges
    }

    /// Groups of plan courses whose alternatives are all absent from the plan
    #[must_use]
    pub fn missing_sources(&self, plan: &PlanState) -> Vec<MissingPrerequisiteSource> {
        self.requirements
            .iter()
            .filter(|(target, _)| plan.contains(target))
            .flat_map(|(target, groups)| {
                groups
                    .iter()
                    .filter(|g| !g.any_of.iter().any(|alt| plan.contains(alt)))
                    .map(move |g| MissingPrerequisiteSource {
                        target: target.clone(),
                        group: g.clone(),
                    })
            })
            .collect()
    }
}

impl fmt::Display for PrerequisiteGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Prerequisite graph ({} courses):", self.courses.len())?;
        writeln!(f)?;

        for code in &self.courses {
            let groups = self.requirements(code);
            if groups.is_empty() {
                writeln!(f, "  {code} → (no prerequisites)")?;
            } else {
                let groups: Vec<String> = groups.iter().map(ToString::to_string).collect();
                writeln!(f, "  {code} → {}", groups.join(", "))?;
            }
        }

        Ok(())
    }
}

/// Edges for a plan, built straight from its courses and a prerequisite map
#[must_use]
pub fn build_prerequisite_edges(plan: &PlanState, prereqs: &PrereqMap) -> Vec<PrerequisiteEdge> {
    PrerequisiteGraph::build(plan.course_codes(), prereqs).edges(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{CompletedRecord, FlowchartPlacement};

    fn code(s: &str) -> CourseCode {
        s.parse().unwrap()
    }

    fn sample_map() -> PrereqMap {
        let mut map = PrereqMap::new();
        map.insert(code("MATH 2924"), vec![PrereqGroup::required(vec![code("MATH 1914")])]);
        map.insert(
            code("MATH 2114"),
            vec![PrereqGroup::required(vec![code("MATH 1914"), code("MATH 1916")])],
        );
        map.insert(code("PHYS 2305"), vec![PrereqGroup::concurrent(vec![code("MATH 2924")])]);
        map
    }

    #[test]
    fn test_dependents_cover_all_alternatives() {
        let graph = PrerequisiteGraph::build(Vec::new(), &sample_map());
        let deps: Vec<_> = graph.dependents_of(&code("MATH 1916")).collect();
        assert_eq!(deps, vec![&code("MATH 2114")]);
        assert_eq!(graph.dependents_of(&code("MATH 1914")).count(), 2);
    }

    #[test]
    fn test_set_requirements_reindexes() {
        let mut graph = PrerequisiteGraph::build(Vec::new(), &sample_map());
        graph.set_requirements(code("MATH 2924"), Vec::new());
        assert_eq!(graph.dependents_of(&code("MATH 1914")).count(), 1);
        assert!(graph.has_requirements(&code("MATH 2924")));
    }

    #[test]
    fn test_edges_only_between_present_courses() {
        let mut plan = PlanState::default();
        plan.upsert_completed(CompletedRecord::new(code("MATH 1914"), "A".into(), None, 3.0));
        plan.add_flow(FlowchartPlacement::new(code("MATH 2924"), None));
        plan.add_flow(FlowchartPlacement::new(code("PHYS 2305"), None));

        let graph = PrerequisiteGraph::build(plan.course_codes(), &sample_map());
        let edges = graph.edges(&plan);
        assert_eq!(edges.len(), 2);

        let math = edges.iter().find(|e| e.target == code("MATH 2924")).unwrap();
        assert_eq!(math.id, "e-MATH1914-MATH2924");
        assert!(math.satisfied);

        let phys = edges.iter().find(|e| e.target == code("PHYS 2305")).unwrap();
        assert_eq!(phys.kind, RequisiteKind::Concurrent);
        assert!(!phys.satisfied);
    }

    #[test]
    fn test_same_source_in_required_and_concurrent_groups() {
        let mut map = PrereqMap::new();
        map.insert(
            code("ECE 2204"),
            vec![
                PrereqGroup::required(vec![code("MATH 1914")]),
                PrereqGroup::concurrent(vec![code("MATH 1914"), code("MATH 2214")]),
            ],
        );
        let mut plan = PlanState::default();
        plan.add_flow(FlowchartPlacement::new(code("MATH 1914"), None));
        plan.add_flow(FlowchartPlacement::new(code("ECE 2204"), None));

        let graph = PrerequisiteGraph::build(plan.course_codes(), &map);
        let ids: Vec<String> = graph.edges(&plan).into_iter().map(|e| e.id).collect();
        assert_eq!(
            ids,
            vec![
                "e-MATH1914-ECE2204".to_string(),
                "e-MATH1914-ECE2204-concurrent".to_string()
            ]
        );
    }

    #[test]
    fn test_missing_sources_reported() {
        let mut plan = PlanState::default();
        plan.add_flow(FlowchartPlacement::new(code("MATH 2114"), None));
        let graph = PrerequisiteGraph::build(plan.course_codes(), &sample_map());

        assert!(graph.edges(&plan).is_empty());
        let missing = graph.missing_sources(&plan);
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].target, code("MATH 2114"));
    }

    #[test]
    fn test_cycle_does_not_hang() {
        let mut map = PrereqMap::new();
        map.insert(code("ECE 2204"), vec![PrereqGroup::concurrent(vec![code("ECE 2274")])]);
        map.insert(code("ECE 2274"), vec![PrereqGroup::concurrent(vec![code("ECE 2204")])]);

        let mut plan = PlanState::default();
        plan.add_flow(FlowchartPlacement::new(code("ECE 2204"), None));
        plan.add_flow(FlowchartPlacement::new(code("ECE 2274"), None));

        let graph = PrerequisiteGraph::build(plan.course_codes(), &map);
        assert_eq!(graph.edges(&plan).len(), 2);
        assert!(graph.to_string().contains("ECE 2204"));
    }
}
