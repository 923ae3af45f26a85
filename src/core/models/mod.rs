//! Data models for the planner

pub mod course;
pub mod plan;
pub mod requirement;
pub mod section;
pub mod semester;

pub use course::{CodeParseError, CourseCode, CourseRecord};
pub use plan::{
    CompletedRecord, CompletionKey, FlowchartPlacement, MergeOutcome, PlanState, ScheduledPlacement,
};
pub use requirement::DegreeRequirement;
pub use section::{SectionId, SectionRecord};
pub use semester::{Semester, SemesterParseError, Term};
