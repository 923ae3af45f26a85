//! Mermaid diagram generator for prerequisite graphs
//!
//! Generates Mermaid flowchart syntax that can be embedded in Markdown files
//! and rendered by GitHub, GitLab, and other Markdown viewers.

use crate::core::models::CourseCode;
use crate::core::requisites::{PrerequisiteEdge, RequisiteKind};
use crate::core::status::CourseStatus;
use std::collections::BTreeMap;
use std::fmt::Write;

/// Generator for Mermaid diagram syntax
pub struct MermaidGenerator;

impl MermaidGenerator {
    /// Generate a left-to-right flowchart of plan courses
    ///
    /// Nodes are styled by status. Required edges are solid, concurrent
    /// edges dashed, and unsatisfied edges are labelled.
    #[must_use]
    pub fn generate_plan(
        statuses: &BTreeMap<CourseCode, CourseStatus>,
        edges: &[PrerequisiteEdge],
    ) -> String {
        let mut output = String::from("```mermaid\nflowchart LR\n");

        for (code, status) in statuses {
            let id = Self::sanitize_id(code);
            let _ = writeln!(output, "    {id}[\"{code}\"]:::{}", Self::class_name(*status));
        }

        output.push('\n');

        for edge in edges {
            let source = Self::sanitize_id(&edge.source);
            let target = Self::sanitize_id(&edge.target);
            let arrow = match (edge.kind, edge.satisfied) {
                (RequisiteKind::Required, true) => "-->".to_string(),
                (RequisiteKind::Required, false) => "-->|unmet|".to_string(),
                (RequisiteKind::Concurrent, true) => "-.->".to_string(),
                (RequisiteKind::Concurrent, false) => "-.->|unmet|".to_string(),
            };
            let _ = writeln!(output, "    {source} {arrow} {target}");
        }

        output.push('\n');
        output.push_str("    classDef completed fill:#c8e6c9,stroke:#2e7d32\n");
        output.push_str("    classDef inProgress fill:#bbdefb,stroke:#1565c0\n");
        output.push_str("    classDef notStarted fill:#eeeeee,stroke:#616161\n");
        output.push_str("    classDef locked fill:#ffcdd2,stroke:#c62828\n");
        output.push_str("```\n");
        output
    }

    /// Mermaid-safe node id for a course
    fn sanitize_id(code: &CourseCode) -> String {
        code.key().replace('&', "_")
    }

    const fn class_name(status: CourseStatus) -> &'static str {
        match status {
            CourseStatus::Completed => "completed",
            CourseStatus::InProgress => "inProgress",
            CourseStatus::NotStarted => "notStarted",
            CourseStatus::Locked => "locked",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_diagram() {
        let source: CourseCode = "MATH 1914".parse().unwrap();
        let target: CourseCode = "MATH 2924".parse().unwrap();
        let mut statuses = BTreeMap::new();
        statuses.insert(source.clone(), CourseStatus::Completed);
        statuses.insert(target.clone(), CourseStatus::NotStarted);
        let edges = vec![PrerequisiteEdge {
            id: PrerequisiteEdge::edge_id(&source, &target, RequisiteKind::Required),
            source,
            target,
            kind: RequisiteKind::Required,
            satisfied: true,
        }];

        let diagram = MermaidGenerator::generate_plan(&statuses, &edges);
        assert!(diagram.starts_with("```mermaid"));
        assert!(diagram.contains("MATH1914[\"MATH 1914\"]:::completed"));
        assert!(diagram.contains("MATH1914 --> MATH2924"));
    }

    #[test]
    fn test_ampersand_subjects_sanitized() {
        let code: CourseCode = "A&S 1004".parse().unwrap();
        assert_eq!(MermaidGenerator::sanitize_id(&code), "A_S1004");
    }
}
