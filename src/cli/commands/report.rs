//! Report command handler
//!
//! Renders the student's plan to Markdown with an embedded prerequisite
//! diagram.

use super::{fail, Session};
use class_planner::config::Config;
use class_planner::core::catalog::Catalog;
use class_planner::core::report::{MarkdownReporter, ReportContext, ReportGenerator};
use class_planner::info;
use std::path::{Path, PathBuf};

/// Run the report command.
///
/// # Arguments
/// * `output_file` - Optional output path
/// * `config` - Configuration containing the default reports directory
pub fn run(output_file: Option<&Path>, config: &Config) -> bool {
    let session = match Session::open(config) {
        Ok(session) => session,
        Err(e) => return fail("Failed to load plan", &e),
    };

    let output_path = output_file.map_or_else(
        || default_output_path(config, &session.user),
        Path::to_path_buf,
    );

    let requirements = match session.catalog().get_requirements() {
        Ok(requirements) => requirements,
        Err(e) => return fail("Failed to read degree requirements", &e),
    };
    let courses = session.course_records();
    let ctx = ReportContext::new(&session.user, &session.sync, &courses)
        .with_requirements(&requirements);
    match MarkdownReporter::new().generate(&ctx, &output_path) {
        Ok(()) => {
            info!("Report written to {}", output_path.display());
            println!("✓ Report generated: {}", output_path.display());
            true
        }
        Err(e) => fail(&format!("Report generation failed for {}", session.user), &e),
    }
}

fn default_output_path(config: &Config, user: &str) -> PathBuf {
    PathBuf::from(&config.paths.reports_dir).join(format!("{user}-plan.md"))
}
