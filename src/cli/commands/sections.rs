//! Sections command handler

use super::{fail, load_catalog};
use class_planner::config::Config;
use class_planner::core::catalog::{Catalog, SectionQuery};
use class_planner::core::models::SectionRecord;
use class_planner::verbose;

/// List catalog sections matching the filters
///
/// # Arguments
/// * `config` - Configuration naming the catalog and active semester
/// * `subject` - Optional subject filter
/// * `search` - Optional free-text filter
/// * `all_semesters` - Skip the active-semester filter
/// * `ratings` - Look up instructor ratings
pub fn run(
    config: &Config,
    subject: Option<&str>,
    search: Option<&str>,
    all_semesters: bool,
    ratings: bool,
) -> bool {
    let catalog = match load_catalog(config) {
        Ok(catalog) => catalog,
        Err(e) => return fail("Failed to load catalog", &e),
    };

    let mut query = SectionQuery::all();
    if let Some(subject) = subject {
        query = query.subject(subject);
    }
    if let Some(search) = search {
        query = query.search(search);
    }
    if !all_semesters {
        if let Some(semester) = config.planner.active_semester() {
            query = query.semester(semester);
        }
    }

    let sections = match catalog.get_sections(&query) {
        Ok(sections) => sections,
        Err(e) => return fail("Failed to query sections", &e),
    };

    if sections.is_empty() {
        println!("No sections match.");
        return true;
    }

    verbose!("{} section(s) found", sections.len());
    for section in &sections {
        let rating = if ratings {
            rating_label(&catalog, section)
        } else {
            String::new()
        };
        println!(
            "{:<8} {:<10} {:<28} {:<20} {}{rating}",
            section.id,
            section.course,
            section.meeting,
            section.instructor.as_deref().unwrap_or("-"),
            seats_label(section),
        );
    }
    true
}

fn seats_label(section: &SectionRecord) -> String {
    match (section.available_seats, section.total_seats) {
        (Some(open), Some(total)) => format!("{open}/{total} open"),
        (Some(open), None) => format!("{open} open"),
        _ => "-".to_string(),
    }
}

fn rating_label<C: Catalog>(catalog: &C, section: &SectionRecord) -> String {
    let Some(name) = section.instructor.as_deref() else {
        return String::new();
    };
    match catalog.get_professor_rating(name) {
        Ok(Some(rating)) => format!("  rating {:.1} ({} ratings)", rating.rating, rating.num_ratings),
        Ok(None) => "  rating n/a".to_string(),
        Err(e) => {
            class_planner::warn!("Rating lookup failed for {name}: {e}");
            String::new()
        }
    }
}
