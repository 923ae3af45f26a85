//! Status and edges command handlers

use super::{fail, Session};
use class_planner::config::Config;
use class_planner::core::catalog::Catalog;
use class_planner::core::progress::{
    requirement_progress, AcademicProgress, RequirementProgress, DEFAULT_REQUIRED_CREDITS,
};

/// Print every plan course with its derived status, then credit totals and
/// degree requirement progress
pub fn run(config: &Config) -> bool {
    let session = match Session::open(config) {
        Ok(session) => session,
        Err(e) => return fail("Failed to load plan", &e),
    };

    let statuses = session.sync.statuses();
    if statuses.is_empty() {
        println!("Plan for '{}' is empty.", session.user);
        return true;
    }

    let courses = session.course_records();
    println!("\n=== {} ===\n", session.user);
    for (code, status) in statuses {
        let title = courses.get(code).map_or("", |c| c.title.as_str());
        println!("{:<12} {:<12} {title}", code.to_string(), status.label());
    }

    let progress =
        AcademicProgress::from_records(session.sync.plan().completed(), DEFAULT_REQUIRED_CREDITS);
    println!();
    println!(
        "Credits: {:.1} of {:.0} ({:.0}%)",
        progress.credits_completed,
        progress.required_credits,
        progress.percent_complete()
    );
    match (progress.gpa(), progress.standing()) {
        (Some(gpa), Some(standing)) => println!("GPA: {gpa:.2} ({standing})"),
        _ => println!("GPA: N/A"),
    }

    match session.catalog().get_requirements() {
        Ok(requirements) if !requirements.is_empty() => {
            println!("\nRequirements:");
            for row in requirement_progress(&requirements, session.sync.plan(), &courses) {
                print_requirement(&row);
            }
        }
        Ok(_) => {}
        Err(e) => return fail("Failed to read degree requirements", &e),
    }
    true
}

fn print_requirement(row: &RequirementProgress) {
    let mark = if row.is_satisfied() { "✓" } else { " " };
    let mut line = format!(
        "{mark} {:<16} {:>5.1} / {:<5.1}",
        row.category, row.credits_completed, row.credits_needed
    );
    if row.credits_in_progress > 0.0 {
        line.push_str(&format!(" (+{:.1} in progress)", row.credits_in_progress));
    }
    if !row.remaining.is_empty() {
        let remaining: Vec<String> = row.remaining.iter().map(ToString::to_string).collect();
        line.push_str(&format!("  still needed: {}", remaining.join(", ")));
    }
    println!("{line}");
}

/// Print prerequisite edges between plan courses
pub fn run_edges(config: &Config) -> bool {
    let session = match Session::open(config) {
        Ok(session) => session,
        Err(e) => return fail("Failed to load plan", &e),
    };

    let edges = session.sync.edges();
    for edge in &edges {
        let mark = if edge.satisfied { "✓" } else { "✗" };
        println!(
            "{mark} {} -> {} ({})",
            edge.source, edge.target, edge.kind
        );
    }
    for missing in session.sync.missing_sources() {
        println!("! {missing}");
    }
    if edges.is_empty() {
        println!("No prerequisite edges between plan courses.");
    }
    true
}
