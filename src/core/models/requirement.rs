//! Degree requirement categories

use super::CourseCode;
use serde::{Deserialize, Serialize};

/// A block of credits a degree asks for (e.g., "Major", "Gen Ed")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DegreeRequirement {
    /// Category name; matched against `CourseRecord::category`
    pub category: String,

    /// Credits needed to satisfy the category
    pub credits_needed: f32,

    /// Free-form description shown next to the category
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Courses listed for the category
    #[serde(default)]
    pub courses: Vec<CourseCode>,
}

impl DegreeRequirement {
    /// Create a requirement with no listed courses
    #[must_use]
    pub fn new(category: impl Into<String>, credits_needed: f32) -> Self {
        Self {
            category: category.into(),
            credits_needed,
            description: None,
            courses: Vec::new(),
        }
    }

    /// List courses for the category
    #[must_use]
    pub fn with_courses(mut self, courses: Vec<CourseCode>) -> Self {
        self.courses = courses;
        self
    }

    /// Whether a course counts toward this category
    ///
    /// A course counts when it is listed, or when its catalog category has
    /// the same name (case-insensitive).
    #[must_use]
    pub fn accepts(&self, code: &CourseCode, category: Option<&str>) -> bool {
        self.courses.contains(code)
            || category.is_some_and(|c| c.trim().eq_ignore_ascii_case(self.category.trim()))
    }
}
