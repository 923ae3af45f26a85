//! GPA, credit and degree-requirement progress over completed courses

use crate::core::models::{CompletedRecord, CourseCode, CourseRecord, DegreeRequirement, PlanState};
use std::collections::BTreeMap;
use std::fmt;

/// Credits a degree needs when the caller has no better number
pub const DEFAULT_REQUIRED_CREDITS: f32 = 120.0;

/// Quality points for a letter grade; `None` for ungraded marks (P, W, I...)
#[must_use]
pub fn grade_points(grade: &str) -> Option<f32> {
    let points = match grade.trim().to_ascii_uppercase().as_str() {
        "A" => 4.0,
        "A-" => 3.7,
        "B+" => 3.3,
        "B" => 3.0,
        "B-" => 2.7,
        "C+" => 2.3,
        "C" => 2.0,
        "C-" => 1.7,
        "D+" => 1.3,
        "D" => 1.0,
        "D-" => 0.7,
        "F" => 0.0,
        _ => return None,
    };
    Some(points)
}

/// Academic standing implied by a GPA
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Standing {
    /// 3.5 and above
    DeansList,
    /// 2.0 up to 3.5
    Good,
    /// Below 2.0
    Probation,
}

impl Standing {
    /// Standing for a GPA value
    #[must_use]
    pub fn from_gpa(gpa: f32) -> Self {
        if gpa >= 3.5 {
            Self::DeansList
        } else if gpa >= 2.0 {
            Self::Good
        } else {
            Self::Probation
        }
    }
}

impl fmt::Display for Standing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeansList => write!(f, "Dean's List eligible"),
            Self::Good => write!(f, "Good standing"),
            Self::Probation => write!(f, "Below 2.0 minimum"),
        }
    }
}

/// Totals over a student's completion records
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AcademicProgress {
    /// Credits earned across every record
    pub credits_completed: f32,
    /// Credits that carry a letter grade
    pub graded_credits: f32,
    /// Sum of grade points times credits
    pub quality_points: f32,
    /// Credits the degree needs
    pub required_credits: f32,
}

impl AcademicProgress {
    /// Total up completion records
    ///
    /// Every attempt counts, retakes included. Records with ungraded marks
    /// add credits but not quality points.
    pub fn from_records<'a, I>(records: I, required_credits: f32) -> Self
    where
        I: IntoIterator<Item = &'a CompletedRecord>,
    {
        let mut progress = Self {
            credits_completed: 0.0,
            graded_credits: 0.0,
            quality_points: 0.0,
            required_credits,
        };
        for record in records {
            progress.credits_completed += record.credits;
            if let Some(points) = grade_points(&record.grade) {
                progress.graded_credits += record.credits;
                progress.quality_points += points * record.credits;
            }
        }
        progress
    }

    /// Cumulative GPA, or `None` with no graded credits
    #[must_use]
    pub fn gpa(&self) -> Option<f32> {
        (self.graded_credits > 0.0).then(|| self.quality_points / self.graded_credits)
    }

    /// GPA after adding hypothetical `(grade, credits)` results
    ///
    /// Grades without a point value are ignored.
    #[must_use]
    pub fn simulate(&self, hypothetical: &[(&str, f32)]) -> Option<f32> {
        let (points, credits) = hypothetical
            .iter()
            .filter_map(|(grade, credits)| grade_points(grade).map(|p| (p * credits, *credits)))
            .fold((self.quality_points, self.graded_credits), |(p, c), (dp, dc)| {
                (p + dp, c + dc)
            });
        (credits > 0.0).then(|| points / credits)
    }

    /// Standing implied by the current GPA
    #[must_use]
    pub fn standing(&self) -> Option<Standing> {
        self.gpa().map(Standing::from_gpa)
    }

    /// Share of required credits earned, capped at 100
    #[must_use]
    pub fn percent_complete(&self) -> f32 {
        if self.required_credits <= 0.0 {
            return 0.0;
        }
        (self.credits_completed / self.required_credits * 100.0).min(100.0)
    }
}

/// Whether a grade earns credit toward a requirement
#[must_use]
pub fn earns_credit(grade: &str) -> bool {
    !matches!(grade.trim().to_ascii_uppercase().as_str(), "F" | "W" | "I")
}

/// Progress toward one degree requirement category
#[derive(Debug, Clone, PartialEq)]
pub struct RequirementProgress {
    /// Category name
    pub category: String,
    /// Credits the category needs
    pub credits_needed: f32,
    /// Credits earned by completed courses
    pub credits_completed: f32,
    /// Credits of scheduled courses not yet completed
    pub credits_in_progress: f32,
    /// Completed courses counted here
    pub completed: Vec<CourseCode>,
    /// Scheduled courses counted here
    pub in_progress: Vec<CourseCode>,
    /// Listed courses neither completed nor scheduled
    pub remaining: Vec<CourseCode>,
}

impl RequirementProgress {
    fn empty(requirement: &DegreeRequirement) -> Self {
        Self {
            category: requirement.category.clone(),
            credits_needed: requirement.credits_needed,
            credits_completed: 0.0,
            credits_in_progress: 0.0,
            completed: Vec::new(),
            in_progress: Vec::new(),
            remaining: Vec::new(),
        }
    }

    /// Whether completed credits cover the category
    #[must_use]
    pub fn is_satisfied(&self) -> bool {
        self.credits_completed >= self.credits_needed
    }

    /// Credits still missing after completed courses
    #[must_use]
    pub fn credits_outstanding(&self) -> f32 {
        (self.credits_needed - self.credits_completed).max(0.0)
    }

    /// Share of the category earned, capped at 100
    #[must_use]
    pub fn percent_complete(&self) -> f32 {
        if self.credits_needed <= 0.0 {
            return 100.0;
        }
        (self.credits_completed / self.credits_needed * 100.0).min(100.0)
    }
}

/// Credits earned and scheduled per requirement category
///
/// Each course counts toward the first requirement that accepts it, once.
/// A completed course contributes the credits of its latest attempt that
/// earns credit (F, W and I do not); records without credits fall back to
/// the catalog. Scheduled courses that are not completed count as in
/// progress with their catalog credits.
///
/// # Arguments
/// * `requirements` - Categories in priority order
/// * `plan` - Student plan
/// * `courses` - Catalog records, for categories and credits
#[must_use]
pub fn requirement_progress(
    requirements: &[DegreeRequirement],
    plan: &PlanState,
    courses: &BTreeMap<CourseCode, CourseRecord>,
) -> Vec<RequirementProgress> {
    let catalog_credits = |code: &CourseCode| courses.get(code).map_or(0.0, |c| c.credits);
    let category_of = |code: &CourseCode| courses.get(code).and_then(|c| c.category.as_deref());
    let slot_for = |code: &CourseCode| {
        requirements
            .iter()
            .position(|r| r.accepts(code, category_of(code)))
    };

    // completions are ordered by course then semester, so the last write wins
    let mut earned: BTreeMap<&CourseCode, f32> = BTreeMap::new();
    for record in plan.completed().filter(|r| earns_credit(&r.grade)) {
        let credits = if record.credits > 0.0 {
            record.credits
        } else {
            catalog_credits(&record.code)
        };
        earned.insert(&record.code, credits);
    }

    let mut rows: Vec<RequirementProgress> =
        requirements.iter().map(RequirementProgress::empty).collect();

    for (&code, &credits) in &earned {
        if let Some(slot) = slot_for(code) {
            rows[slot].credits_completed += credits;
            rows[slot].completed.push(code.clone());
        }
    }

    for section in plan.scheduled_sections() {
        let code = &section.course;
        if earned.contains_key(code) {
            continue;
        }
        if let Some(slot) = slot_for(code) {
            rows[slot].credits_in_progress += catalog_credits(code);
            rows[slot].in_progress.push(code.clone());
        }
    }

    for (row, requirement) in rows.iter_mut().zip(requirements) {
        row.remaining = requirement
            .courses
            .iter()
            .filter(|c| !earned.contains_key(c) && !plan.is_scheduled(c))
            .cloned()
            .collect();
    }

    rows
}
