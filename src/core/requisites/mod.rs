//! Prerequisite data and graph

pub mod graph;

pub use graph::{build_prerequisite_edges, PrerequisiteGraph};

use crate::core::models::CourseCode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// How a prerequisite group must be met
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequisiteKind {
    /// Must be completed beforehand
    Required,
    /// May be completed beforehand or taken in the same term
    Concurrent,
}

impl fmt::Display for RequisiteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => write!(f, "required"),
            Self::Concurrent => write!(f, "concurrent"),
        }
    }
}

/// OR-set of courses, any one of which satisfies the requirement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrereqGroup {
    /// Requirement kind
    pub kind: RequisiteKind,
    /// Alternatives
    pub any_of: Vec<CourseCode>,
}

impl PrereqGroup {
    /// Group that requires one of `any_of` to be completed
    #[must_use]
    pub const fn required(any_of: Vec<CourseCode>) -> Self {
        Self {
            kind: RequisiteKind::Required,
            any_of,
        }
    }

    /// Group that accepts one of `any_of` completed or taken alongside
    #[must_use]
    pub const fn concurrent(any_of: Vec<CourseCode>) -> Self {
        Self {
            kind: RequisiteKind::Concurrent,
            any_of,
        }
    }
}

impl fmt::Display for PrereqGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let alternatives: Vec<String> = self.any_of.iter().map(ToString::to_string).collect();
        write!(f, "{} ({})", alternatives.join(" or "), self.kind)
    }
}

/// Prerequisite groups per course
pub type PrereqMap = BTreeMap<CourseCode, Vec<PrereqGroup>>;

/// Directed prerequisite edge between two plan courses
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrerequisiteEdge {
    /// Stable id ("e-MATH1914-MATH2924", "e-MATH1914-PHYS2305-concurrent")
    pub id: String,
    /// Prerequisite course
    pub source: CourseCode,
    /// Course that requires it
    pub target: CourseCode,
    /// Requirement kind
    pub kind: RequisiteKind,
    /// Whether the group this edge belongs to is met
    pub satisfied: bool,
}

impl PrerequisiteEdge {
    /// Build the stable edge id for a source/target pair
    ///
    /// Concurrent edges carry a suffix so a course listed in both a required
    /// and a concurrent group of the same target yields two distinct ids.
    #[must_use]
    pub fn edge_id(source: &CourseCode, target: &CourseCode, kind: RequisiteKind) -> String {
        match kind {
            RequisiteKind::Required => format!("e-{}-{}", source.key(), target.key()),
            RequisiteKind::Concurrent => format!("e-{}-{}-concurrent", source.key(), target.key()),
        }
    }
}

/// A prerequisite group none of whose courses appear in the plan
///
/// The target still renders; it just gets no edge for this group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingPrerequisiteSource {
    /// Course with the unmet group
    pub target: CourseCode,
    /// The group in question
    pub group: PrereqGroup,
}

impl fmt::Display for MissingPrerequisiteSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} needs {}, which is not in the plan", self.target, self.group)
    }
}
