//! Academic term identity
//!
//! Semesters arrive either as display names (`"Fall 2024"`) or as registrar
//! codes (`"202410"`). Registrar codes are keyed by academic year: `YYYY10`
//! is Fall of `YYYY`, while `YYYY20` and `YYYY30` are Spring and Summer of
//! the following calendar year.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned for strings that name no recognizable semester
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized semester '{0}'")]
pub struct SemesterParseError(pub String);

/// Part of the calendar year, in chronological order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Term {
    /// January through May
    Spring,
    /// June and July
    Summer,
    /// August through December
    Fall,
}

impl Term {
    const fn name(self) -> &'static str {
        match self {
            Self::Spring => "Spring",
            Self::Summer => "Summer",
            Self::Fall => "Fall",
        }
    }
}

/// A single semester, ordered chronologically
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Semester {
    year: u16,
    term: Term,
}

impl Semester {
    /// Create a semester from its calendar year and term
    #[must_use]
    pub const fn new(term: Term, year: u16) -> Self {
        Self { year, term }
    }

    /// Calendar year
    #[must_use]
    pub const fn year(&self) -> u16 {
        self.year
    }

    /// Term within the year
    #[must_use]
    pub const fn term(&self) -> Term {
        self.term
    }

    /// Registrar code (e.g., Fall 2024 -> "202410", Spring 2025 -> "202420")
    #[must_use]
    pub fn code(&self) -> String {
        match self.term {
            Term::Fall => format!("{}10", self.year),
            Term::Spring => format!("{}20", self.year.saturating_sub(1)),
            Term::Summer => format!("{}30", self.year.saturating_sub(1)),
        }
    }

    fn from_code(code: &str) -> Option<Self> {
        if code.len() != 6 || !code.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        let year: u16 = code[..4].parse().ok()?;
        match &code[4..] {
            "10" => Some(Self::new(Term::Fall, year)),
            "20" => Some(Self::new(Term::Spring, year.checked_add(1)?)),
            "30" => Some(Self::new(Term::Summer, year.checked_add(1)?)),
            _ => None,
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        let mut parts = name.split_whitespace();
        let season = parts.next()?;
        let year: u16 = parts.next()?.parse().ok()?;
        if parts.next().is_some() {
            return None;
        }
        let term = match season.to_ascii_lowercase().as_str() {
            "fall" => Term::Fall,
            "spring" => Term::Spring,
            "summer" => Term::Summer,
            _ => return None,
        };
        Some(Self::new(term, year))
    }
}

impl FromStr for Semester {
    type Err = SemesterParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::from_code(trimmed)
            .or_else(|| Self::from_name(trimmed))
            .ok_or_else(|| SemesterParseError(trimmed.to_string()))
    }
}

impl TryFrom<String> for Semester {
    type Error = SemesterParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Semester> for String {
    fn from(semester: Semester) -> Self {
        semester.to_string()
    }
}

impl fmt::Display for Semester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.term.name(), self.year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_name() {
        let s: Semester = "Fall 2024".parse().unwrap();
        assert_eq!(s, Semester::new(Term::Fall, 2024));
        assert_eq!("spring 2025".parse::<Semester>().unwrap().term(), Term::Spring);
    }

    #[test]
    fn test_registrar_codes_round_trip() {
        assert_eq!(
            "202410".parse::<Semester>().unwrap(),
            Semester::new(Term::Fall, 2024)
        );
        assert_eq!(
            "202420".parse::<Semester>().unwrap(),
            Semester::new(Term::Spring, 2025)
        );
        assert_eq!(
            "202530".parse::<Semester>().unwrap(),
            Semester::new(Term::Summer, 2026)
        );
        assert_eq!(Semester::new(Term::Spring, 2025).code(), "202420");
        assert_eq!(Semester::new(Term::Fall, 2025).code(), "202510");
    }

    #[test]
    fn test_chronological_order() {
        let fall_24 = Semester::new(Term::Fall, 2024);
        let spring_25 = Semester::new(Term::Spring, 2025);
        let summer_25 = Semester::new(Term::Summer, 2025);
        assert!(fall_24 < spring_25);
        assert!(spring_25 < summer_25);
    }

    #[test]
    fn test_rejects_garbage() {
        assert!("Winter 2024".parse::<Semester>().is_err());
        assert!("202440".parse::<Semester>().is_err());
        assert!("Fall".parse::<Semester>().is_err());
        assert!("Fall 2024 extra".parse::<Semester>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Semester::new(Term::Summer, 2026).to_string(), "Summer 2026");
    }
}
