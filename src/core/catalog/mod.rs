//! Catalog and plan-storage collaborators
//!
//! The engine never talks to a registrar or database directly. It consumes
//! catalog data through [`Catalog`] and persists plans through
//! [`PlanStore`]; the file-backed implementations here are what the CLI uses.

pub mod cached;
pub mod file;
pub mod store;

pub use cached::CachedCatalog;
pub use file::FileCatalog;
pub use store::FileStore;

use crate::core::models::{
    CompletedRecord, CourseCode, CourseRecord, DegreeRequirement, FlowchartPlacement,
    ScheduledPlacement, SectionId, SectionRecord, Semester,
};
use crate::core::requisites::PrereqMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

/// Failures talking to a catalog or plan store
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing a file failed
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
    /// A TOML document did not parse
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: toml::de::Error,
    },
    /// A document could not be serialized
    #[error("failed to serialize plan: {0}")]
    Serialize(#[from] toml::ser::Error),
    /// User name cannot be used as a file name
    #[error("invalid user name '{0}'")]
    InvalidUser(String),
    /// A section id is not in the catalog
    #[error("unknown section '{0}'")]
    UnknownSection(SectionId),
}

/// Crowd-sourced instructor rating
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfessorRating {
    /// Instructor name as listed on sections
    pub name: String,
    /// Average rating, 0.0 to 5.0
    pub rating: f32,
    /// Average difficulty, 0.0 to 5.0
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<f32>,
    /// Number of ratings behind the averages
    #[serde(default)]
    pub num_ratings: u32,
}

/// Filter for [`Catalog::get_sections`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionQuery {
    /// Subject prefix, normalized like course codes (e.g., "C S" matches "CS")
    pub subject: Option<String>,
    /// Case-insensitive text matched against code, title and instructor
    pub search: Option<String>,
    /// Semester offered
    pub semester: Option<Semester>,
}

impl SectionQuery {
    /// Query matching every section
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Restrict to a subject
    #[must_use]
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Restrict to sections matching a search string
    #[must_use]
    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Restrict to a semester
    #[must_use]
    pub const fn semester(mut self, semester: Semester) -> Self {
        self.semester = Some(semester);
        self
    }

    /// Whether `section` passes every filter
    ///
    /// # Arguments
    /// * `section` - Candidate section
    /// * `title` - Title of the owning course, if known
    #[must_use]
    pub fn matches(&self, section: &SectionRecord, title: Option<&str>) -> bool {
        if let Some(subject) = &self.subject {
            let wanted: String = subject
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect::<String>()
                .to_ascii_uppercase();
            if section.course.subject() != wanted {
                return false;
            }
        }

        if let (Some(wanted), Some(offered)) = (&self.semester, &section.semester) {
            if wanted != offered {
                return false;
            }
        }

        if let Some(search) = &self.search {
            let needle = search.trim().to_lowercase();
            let haystacks = [
                Some(section.course.to_string()),
                Some(section.course.key()),
                title.map(str::to_string),
                section.instructor.clone(),
            ];
            let found = haystacks
                .iter()
                .flatten()
                .any(|hay| hay.to_lowercase().contains(&needle));
            if !found {
                return false;
            }
        }

        true
    }
}

/// Read-only source of catalog data
pub trait Catalog {
    /// Sections matching a query
    ///
    /// # Errors
    /// Returns an error if the backing source cannot be read
    fn get_sections(&self, query: &SectionQuery) -> Result<Vec<SectionRecord>, StoreError>;

    /// One section by id
    ///
    /// # Errors
    /// Returns an error if the backing source cannot be read
    fn get_section(&self, id: &SectionId) -> Result<Option<SectionRecord>, StoreError>;

    /// Prerequisite groups for each requested course that has any
    ///
    /// # Errors
    /// Returns an error if the backing source cannot be read
    fn get_prerequisites(&self, codes: &[CourseCode]) -> Result<PrereqMap, StoreError>;

    /// Course record by code
    ///
    /// # Errors
    /// Returns an error if the backing source cannot be read
    fn get_course(&self, code: &CourseCode) -> Result<Option<CourseRecord>, StoreError>;

    /// Rating for an instructor
    ///
    /// # Errors
    /// Returns an error if the backing source cannot be read
    fn get_professor_rating(&self, name: &str) -> Result<Option<ProfessorRating>, StoreError>;

    /// Degree requirement categories, in priority order
    ///
    /// Catalogs without degree data report none.
    ///
    /// # Errors
    /// Returns an error if the backing source cannot be read
    fn get_requirements(&self) -> Result<Vec<DegreeRequirement>, StoreError> {
        Ok(Vec::new())
    }
}

/// Persistent per-user plan storage
pub trait PlanStore {
    /// Every completion record of `user`
    ///
    /// # Errors
    /// Returns an error if the store cannot be read
    fn get_completed_courses(&self, user: &str) -> Result<Vec<CompletedRecord>, StoreError>;

    /// Replace the completion records of `user`
    ///
    /// # Errors
    /// Returns an error if the store cannot be written
    fn put_completed_courses(
        &mut self,
        user: &str,
        records: &[CompletedRecord],
    ) -> Result<(), StoreError>;

    /// Scheduled sections of `user` for `semester`, with their colors
    ///
    /// # Errors
    /// Returns an error if the store cannot be read
    fn get_schedule(
        &self,
        user: &str,
        semester: &Semester,
    ) -> Result<Vec<ScheduledPlacement>, StoreError>;

    /// Replace the schedule of `user` for `semester`
    ///
    /// Stored ids the catalog cannot resolve are kept alongside `section_ids`.
    ///
    /// # Errors
    /// Returns an error if the store cannot be written
    fn put_schedule(
        &mut self,
        user: &str,
        semester: &Semester,
        section_ids: &[SectionId],
        colors: &BTreeMap<SectionId, String>,
    ) -> Result<(), StoreError>;

    /// Flowchart nodes of `user`
    ///
    /// # Errors
    /// Returns an error if the store cannot be read
    fn get_flowchart(&self, user: &str) -> Result<Vec<FlowchartPlacement>, StoreError>;

    /// Replace the flowchart of `user`
    ///
    /// # Errors
    /// Returns an error if the store cannot be written
    fn put_flowchart(
        &mut self,
        user: &str,
        nodes: &[FlowchartPlacement],
    ) -> Result<(), StoreError>;
}
