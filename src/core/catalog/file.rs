//! TOML-backed catalog
//!
//! ```toml
//! [[courses]]
//! code = "MATH 1914"
//! title = "Calculus I"
//! credits = 3.0
//!
//! [[sections]]
//! id = "83422"
//! course = "MATH 1914"
//! time = "MWF 10:00 am-10:50 am"
//!
//! [[prerequisites]]
//! course = "MATH 2924"
//! kind = "required"
//! any_of = ["MATH 1914"]
//!
//! [[professors]]
//! name = "Smith"
//! rating = 4.2
//!
//! [[requirements]]
//! category = "Major"
//! credits_needed = 40.0
//! courses = ["MATH 1914", "MATH 2924"]
//! ```

use super::{Catalog, ProfessorRating, SectionQuery, StoreError};
use crate::core::models::{
    CourseCode, CourseRecord, DegreeRequirement, SectionId, SectionRecord, Semester,
};
use crate::core::requisites::{PrereqGroup, PrereqMap, RequisiteKind};
use crate::core::schedule::{DayFallback, ParseDiagnostics};
use crate::{debug, info};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    courses: Vec<CourseRecord>,
    #[serde(default)]
    sections: Vec<SectionEntry>,
    #[serde(default)]
    prerequisites: Vec<PrerequisiteEntry>,
    #[serde(default)]
    professors: Vec<ProfessorRating>,
    #[serde(default)]
    requirements: Vec<DegreeRequirement>,
}

#[derive(Debug, Deserialize)]
struct SectionEntry {
    id: SectionId,
    course: CourseCode,
    #[serde(default)]
    instructor: Option<String>,
    #[serde(default)]
    time: String,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    available_seats: Option<u32>,
    #[serde(default)]
    total_seats: Option<u32>,
    #[serde(default)]
    semester: Option<Semester>,
}

#[derive(Debug, Deserialize)]
struct PrerequisiteEntry {
    course: CourseCode,
    kind: RequisiteKind,
    any_of: Vec<CourseCode>,
}

/// Catalog loaded once from a TOML file
#[derive(Debug, Clone, Default)]
pub struct FileCatalog {
    courses: BTreeMap<CourseCode, CourseRecord>,
    sections: Vec<SectionRecord>,
    prerequisites: PrereqMap,
    professors: BTreeMap<String, ProfessorRating>,
    requirements: Vec<DegreeRequirement>,
}

impl FileCatalog {
    /// Load a catalog file
    ///
    /// # Arguments
    /// * `path` - Catalog TOML file
    /// * `policy` - Day-letter fallback used when parsing section times
    /// * `diagnostics` - Tracker for malformed time strings
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed
    pub fn load(
        path: &Path,
        policy: DayFallback,
        diagnostics: &mut ParseDiagnostics,
    ) -> Result<Self, StoreError> {
        let contents = fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::parse(&contents, path.to_path_buf(), policy, diagnostics)?;
        info!(
            "Loaded catalog {}: {} courses, {} sections, {} requirement categories",
            path.display(),
            catalog.courses.len(),
            catalog.sections.len(),
            catalog.requirements.len()
        );
        Ok(catalog)
    }

    /// Build a catalog from TOML text
    ///
    /// # Errors
    /// Returns an error if the text is not a valid catalog document
    pub fn from_toml(
        toml_str: &str,
        policy: DayFallback,
        diagnostics: &mut ParseDiagnostics,
    ) -> Result<Self, StoreError> {
        Self::parse(toml_str, PathBuf::from("<inline>"), policy, diagnostics)
    }

    fn parse(
        toml_str: &str,
        origin: PathBuf,
        policy: DayFallback,
        diagnostics: &mut ParseDiagnostics,
    ) -> Result<Self, StoreError> {
        let document: CatalogDocument = toml::from_str(toml_str)
            .map_err(|source| StoreError::Parse { path: origin, source })?;

        let courses = document
            .courses
            .into_iter()
            .map(|course| (course.code.clone(), course))
            .collect();

        let sections = document
            .sections
            .into_iter()
            .map(|entry| {
                let mut section =
                    SectionRecord::new(entry.id, entry.course, &entry.time, policy, diagnostics);
                section.instructor = entry.instructor;
                section.location = entry.location;
                section.available_seats = entry.available_seats;
                section.total_seats = entry.total_seats;
                section.semester = entry.semester;
                section
            })
            .collect();

        let mut prerequisites = PrereqMap::new();
        for entry in document.prerequisites {
            prerequisites.entry(entry.course).or_default().push(PrereqGroup {
                kind: entry.kind,
                any_of: entry.any_of,
            });
        }

        let professors = document
            .professors
            .into_iter()
            .map(|p| (p.name.to_lowercase(), p))
            .collect();

        Ok(Self {
            courses,
            sections,
            prerequisites,
            professors,
            requirements: document.requirements,
        })
    }

    /// Every course record
    pub fn courses(&self) -> impl Iterator<Item = &CourseRecord> {
        self.courses.values()
    }

    /// Full prerequisite map
    #[must_use]
    pub const fn prerequisites(&self) -> &PrereqMap {
        &self.prerequisites
    }
}

impl Catalog for FileCatalog {
    fn get_sections(&self, query: &SectionQuery) -> Result<Vec<SectionRecord>, StoreError> {
        let found: Vec<SectionRecord> = self
            .sections
            .iter()
            .filter(|s| {
                let title = self.courses.get(&s.course).map(|c| c.title.as_str());
                query.matches(s, title)
            })
            .cloned()
            .collect();
        debug!("Section query {query:?} matched {} sections", found.len());
        Ok(found)
    }

    fn get_section(&self, id: &SectionId) -> Result<Option<SectionRecord>, StoreError> {
        Ok(self.sections.iter().find(|s| &s.id == id).cloned())
    }

    fn get_prerequisites(&self, codes: &[CourseCode]) -> Result<PrereqMap, StoreError> {
        Ok(codes
            .iter()
            .filter_map(|code| {
                self.prerequisites
                    .get(code)
                    .map(|groups| (code.clone(), groups.clone()))
            })
            .collect())
    }

    fn get_course(&self, code: &CourseCode) -> Result<Option<CourseRecord>, StoreError> {
        Ok(self.courses.get(code).cloned())
    }

    fn get_professor_rating(&self, name: &str) -> Result<Option<ProfessorRating>, StoreError> {
        Ok(self.professors.get(&name.trim().to_lowercase()).cloned())
    }

    fn get_requirements(&self) -> Result<Vec<DegreeRequirement>, StoreError> {
        Ok(self.requirements.clone())
    }
}
