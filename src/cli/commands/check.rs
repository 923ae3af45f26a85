//! Check command handler
//!
//! Reports time conflicts a section would have with the stored schedule,
//! plus unmet prerequisites as a non-blocking note.

use super::{fail, Session};
use class_planner::config::Config;
use class_planner::core::catalog::Catalog;
use class_planner::core::models::SectionId;
use class_planner::core::requisites::PrerequisiteGraph;

/// Run the check command.
///
/// # Arguments
/// * `config` - Configuration naming catalog, store and user
/// * `section` - Candidate section id
/// * `replace` - Scheduled section the candidate would replace
pub fn run(config: &Config, section: &str, replace: Option<&str>) -> bool {
    let mut session = match Session::open(config) {
        Ok(session) => session,
        Err(e) => return fail("Failed to load plan", &e),
    };

    let id = SectionId::from(section);
    let candidate = match session.catalog().get_section(&id) {
        Ok(Some(candidate)) => candidate,
        Ok(None) => return fail("Unknown section", &id),
        Err(e) => return fail("Failed to look up section", &e),
    };

    // Replacing another section of the same course is implied, as in `plan add`.
    let exclude = replace.map(SectionId::from).or_else(|| {
        session
            .sync
            .plan()
            .scheduled_for(&candidate.course)
            .map(|p| p.section.id.clone())
    });

    let conflicts = session.sync.conflicts_for(&candidate, exclude.as_ref());
    let clear = conflicts.is_empty();
    if clear {
        println!("✓ {} ({}) fits the schedule", candidate.id, candidate.meeting);
    } else {
        for conflict in &conflicts {
            println!("✗ {conflict}");
        }
    }

    match session
        .catalog()
        .get_prerequisites(std::slice::from_ref(&candidate.course))
    {
        Ok(prereqs) => session.sync.merge_prerequisites(prereqs),
        Err(e) => class_planner::warn!("Prerequisite lookup failed: {e}"),
    }
    let plan = session.sync.plan();
    for group in session.sync.graph().requirements(&candidate.course) {
        if !PrerequisiteGraph::group_satisfied(group, plan) {
            println!("! Prerequisite not met: {group}");
        }
    }

    clear
}
