//! Plan report generation
//!
//! Renders a student's plan (weekly schedule, course statuses, prerequisite
//! edges, credit and requirement progress) as Markdown with an embedded
//! Mermaid diagram.

pub mod markdown;
pub mod mermaid;

pub use markdown::MarkdownReporter;
pub use mermaid::MermaidGenerator;

use crate::core::models::{CourseCode, CourseRecord, DegreeRequirement, PlanState};
use crate::core::progress::{
    requirement_progress, AcademicProgress, RequirementProgress, DEFAULT_REQUIRED_CREDITS,
};
use crate::core::requisites::{MissingPrerequisiteSource, PrerequisiteEdge};
use crate::core::status::CourseStatus;
use crate::core::sync::PlanSynchronizer;
use std::collections::BTreeMap;
use std::error::Error;
use std::path::Path;

/// Data context for report generation
///
/// Gathers everything a template needs so renderers never reach back into
/// the synchronizer.
#[derive(Debug, Clone)]
pub struct ReportContext<'a> {
    /// Student the plan belongs to
    pub user: &'a str,
    /// Plan being reported
    pub plan: &'a PlanState,
    /// Derived status per course
    pub statuses: &'a BTreeMap<CourseCode, CourseStatus>,
    /// Prerequisite edges between plan courses
    pub edges: Vec<PrerequisiteEdge>,
    /// Prerequisite groups with no course in the plan
    pub missing: Vec<MissingPrerequisiteSource>,
    /// Catalog records for titles and credits
    pub courses: &'a BTreeMap<CourseCode, CourseRecord>,
    /// GPA and credit totals
    pub progress: AcademicProgress,
    /// Progress per degree requirement category; empty without degree data
    pub requirements: Vec<RequirementProgress>,
}

impl<'a> ReportContext<'a> {
    /// Build a context from a synchronizer and catalog course records
    #[must_use]
    pub fn new(
        user: &'a str,
        sync: &'a PlanSynchronizer,
        courses: &'a BTreeMap<CourseCode, CourseRecord>,
    ) -> Self {
        let plan = sync.plan();
        Self {
            user,
            plan,
            statuses: sync.statuses(),
            edges: sync.edges(),
            missing: sync.missing_sources(),
            courses,
            progress: AcademicProgress::from_records(plan.completed(), DEFAULT_REQUIRED_CREDITS),
            requirements: Vec::new(),
        }
    }

    /// Add degree requirement progress
    #[must_use]
    pub fn with_requirements(mut self, requirements: &[DegreeRequirement]) -> Self {
        self.requirements = requirement_progress(requirements, self.plan, self.courses);
        self
    }

    /// Course title, or "-" when the catalog has none
    #[must_use]
    pub fn title_of(&self, code: &CourseCode) -> &str {
        self.courses.get(code).map_or("-", |c| c.title.as_str())
    }

    /// Active semester label
    #[must_use]
    pub fn semester_label(&self) -> String {
        self.plan
            .active_semester
            .map_or_else(|| "(none)".to_string(), |s| s.to_string())
    }

    /// Credits of the scheduled sections
    #[must_use]
    pub fn scheduled_credits(&self) -> f32 {
        self.plan
            .scheduled_sections()
            .filter_map(|s| self.courses.get(&s.course))
            .map(|c| c.credits)
            .sum()
    }
}

/// Trait for report generators
pub trait ReportGenerator {
    /// Generate a report to a file
    ///
    /// # Errors
    /// Returns an error if report generation or file writing fails
    fn generate(&self, ctx: &ReportContext, output_path: &Path) -> Result<(), Box<dyn Error>>;

    /// Generate report content as a string
    ///
    /// # Errors
    /// Returns an error if report generation fails
    fn render(&self, ctx: &ReportContext) -> Result<String, Box<dyn Error>>;
}
