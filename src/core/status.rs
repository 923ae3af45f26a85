//! Per-course status derivation

use crate::core::models::{CourseCode, PlanState};
use crate::core::requisites::PrerequisiteGraph;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Display status of a course in the plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CourseStatus {
    /// A completion record exists
    Completed,
    /// Scheduled in the active semester
    InProgress,
    /// Neither completed nor scheduled, and no required group is unmet
    NotStarted,
    /// A required prerequisite group is unmet. Advisory only.
    Locked,
}

impl CourseStatus {
    /// Kebab-case label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::InProgress => "in-progress",
            Self::NotStarted => "not-started",
            Self::Locked => "locked",
        }
    }
}

impl fmt::Display for CourseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Derive the status of one course
///
/// Precedence: completed > in-progress > locked > not-started. A course with
/// no prerequisite data is never locked.
#[must_use]
pub fn derive_status(code: &CourseCode, plan: &PlanState, graph: &PrerequisiteGraph) -> CourseStatus {
    if plan.is_completed(code) {
        CourseStatus::Completed
    } else if plan.is_scheduled(code) {
        CourseStatus::InProgress
    } else if !graph.required_satisfied(code, plan) {
        CourseStatus::Locked
    } else {
        CourseStatus::NotStarted
    }
}

/// Status of every course present in the plan
#[must_use]
pub fn compute_statuses(plan: &PlanState, graph: &PrerequisiteGraph) -> BTreeMap<CourseCode, CourseStatus> {
    plan.course_codes()
        .into_iter()
        .map(|code| {
            let status = derive_status(&code, plan, graph);
            (code, status)
        })
        .collect()
}
