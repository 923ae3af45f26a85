//! Course identity and catalog record

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors produced while normalizing a course code
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodeParseError {
    /// Input was empty or whitespace only
    #[error("course code is empty")]
    Empty,
    /// No course number follows the subject
    #[error("course code '{0}' has no number")]
    MissingNumber(String),
    /// Subject contains characters other than letters and '&'
    #[error("course code '{0}' has an invalid subject")]
    InvalidSubject(String),
    /// Number contains characters other than letters and digits
    #[error("course code '{0}' has an invalid number")]
    InvalidNumber(String),
}

/// Normalized course key (subject + number)
///
/// `"MATH 1914"`, `"math1914"` and `"Math  1914"` all normalize to the same
/// key. Multi-word subjects such as `"C S 2813"` collapse to `CS`. Equality,
/// ordering and hashing only ever see the normalized parts.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CourseCode {
    subject: String,
    number: String,
}

impl CourseCode {
    /// Build a code from separate subject and number parts
    ///
    /// # Errors
    /// Returns an error if either part is empty or contains invalid characters
    pub fn new(subject: &str, number: &str) -> Result<Self, CodeParseError> {
        format!("{subject} {number}").parse()
    }

    /// Normalized subject (e.g., "MATH", "CS")
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Normalized number (e.g., "1914", "150B")
    #[must_use]
    pub fn number(&self) -> &str {
        &self.number
    }

    /// Compact key used for graph node ids and edge ids (e.g., "MATH1914")
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}{}", self.subject, self.number)
    }
}

impl FromStr for CourseCode {
    type Err = CodeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_uppercase();
        if compact.is_empty() {
            return Err(CodeParseError::Empty);
        }

        let split = compact
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(|| CodeParseError::MissingNumber(s.trim().to_string()))?;
        let (subject, number) = compact.split_at(split);

        if subject.is_empty() || !subject.chars().all(|c| c.is_ascii_alphabetic() || c == '&') {
            return Err(CodeParseError::InvalidSubject(s.trim().to_string()));
        }
        if !number.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(CodeParseError::InvalidNumber(s.trim().to_string()));
        }

        Ok(Self {
            subject: subject.to_string(),
            number: number.to_string(),
        })
    }
}

impl TryFrom<String> for CourseCode {
    type Error = CodeParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CourseCode> for String {
    fn from(code: CourseCode) -> Self {
        code.to_string()
    }
}

impl fmt::Display for CourseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.subject, self.number)
    }
}

/// A course as published by the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseRecord {
    /// Normalized course code
    pub code: CourseCode,

    /// Course title (e.g., "Calculus II")
    pub title: String,

    /// Credit hours (can be fractional)
    pub credits: f32,

    /// Category tag (e.g., "Math", "Major", "Gen Ed")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl CourseRecord {
    /// Create a new course record
    #[must_use]
    pub const fn new(code: CourseCode, title: String, credits: f32) -> Self {
        Self {
            code,
            title,
            credits,
            category: None,
        }
    }

    /// Attach a category tag
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}
