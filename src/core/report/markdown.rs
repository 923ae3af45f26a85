//! Markdown report generator
//!
//! Renders `templates/plan_report.md` through askama. Tables are built as
//! plain rows here so the template stays declarative.

use crate::core::get_version;
use crate::core::report::{MermaidGenerator, ReportContext, ReportGenerator};
use crate::core::schedule::{format_clock, Weekday};
use askama::Template;
use std::error::Error;
use std::fs;
use std::path::Path;

struct ScheduleRow {
    course: String,
    title: String,
    section: String,
    meets: String,
    instructor: String,
    location: String,
}

struct DayRow {
    day: &'static str,
    meetings: String,
}

struct StatusRow {
    course: String,
    title: String,
    status: String,
}

struct RequirementRow {
    category: String,
    earned: String,
    in_progress: String,
    percent: String,
    satisfied: &'static str,
    remaining: String,
}

struct EdgeRow {
    source: String,
    target: String,
    kind: String,
    satisfied: &'static str,
}

#[derive(Template)]
#[template(path = "plan_report.md")]
struct PlanReportTemplate {
    user: String,
    semester: String,
    version: &'static str,
    credits_completed: String,
    scheduled_credits: String,
    gpa: String,
    standing: String,
    percent_complete: String,
    requirements: Vec<RequirementRow>,
    schedule: Vec<ScheduleRow>,
    week: Vec<DayRow>,
    unscheduled: Vec<String>,
    statuses: Vec<StatusRow>,
    edges: Vec<EdgeRow>,
    missing: Vec<String>,
    diagram: String,
}

/// Markdown report generator
pub struct MarkdownReporter;

impl MarkdownReporter {
    /// Create a new Markdown reporter
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn build_template(ctx: &ReportContext) -> PlanReportTemplate {
        let progress = &ctx.progress;
        PlanReportTemplate {
            user: ctx.user.to_string(),
            semester: ctx.semester_label(),
            version: get_version(),
            credits_completed: format!("{:.1}", progress.credits_completed),
            scheduled_credits: format!("{:.1}", ctx.scheduled_credits()),
            gpa: progress
                .gpa()
                .map_or_else(|| "N/A".to_string(), |g| format!("{g:.2}")),
            standing: progress
                .standing()
                .map_or_else(|| "-".to_string(), |s| s.to_string()),
            percent_complete: format!("{:.0}%", progress.percent_complete()),
            requirements: Self::requirement_rows(ctx),
            schedule: Self::schedule_rows(ctx),
            week: Self::week_rows(ctx),
            unscheduled: ctx
                .plan
                .scheduled_sections()
                .filter(|s| !s.meeting.is_scheduled())
                .map(|s| format!("{} ({})", s.course, s.id))
                .collect(),
            statuses: ctx
                .statuses
                .iter()
                .map(|(code, status)| StatusRow {
                    course: code.to_string(),
                    title: ctx.title_of(code).to_string(),
                    status: status.to_string(),
                })
                .collect(),
            edges: ctx
                .edges
                .iter()
                .map(|e| EdgeRow {
                    source: e.source.to_string(),
                    target: e.target.to_string(),
                    kind: e.kind.to_string(),
                    satisfied: if e.satisfied { "yes" } else { "no" },
                })
                .collect(),
            missing: ctx.missing.iter().map(ToString::to_string).collect(),
            diagram: MermaidGenerator::generate_plan(ctx.statuses, &ctx.edges),
        }
    }

    fn requirement_rows(ctx: &ReportContext) -> Vec<RequirementRow> {
        ctx.requirements
            .iter()
            .map(|r| RequirementRow {
                category: r.category.clone(),
                earned: format!("{:.1} / {:.1}", r.credits_completed, r.credits_needed),
                in_progress: format!("{:.1}", r.credits_in_progress),
                percent: format!("{:.0}%", r.percent_complete()),
                satisfied: if r.is_satisfied() { "yes" } else { "no" },
                remaining: if r.remaining.is_empty() {
                    "-".to_string()
                } else {
                    r.remaining
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join(", ")
                },
            })
            .collect()
    }

    fn schedule_rows(ctx: &ReportContext) -> Vec<ScheduleRow> {
        ctx.plan
            .scheduled_sections()
            .map(|s| ScheduleRow {
                course: s.course.to_string(),
                title: ctx.title_of(&s.course).to_string(),
                section: s.id.to_string(),
                meets: s.meeting.to_string(),
                instructor: s.instructor.clone().unwrap_or_else(|| "-".to_string()),
                location: s.location.clone().unwrap_or_else(|| "-".to_string()),
            })
            .collect()
    }

    /// One row per weekday listing its meetings in start order
    fn week_rows(ctx: &ReportContext) -> Vec<DayRow> {
        Weekday::ALL
            .iter()
            .map(|&day| {
                let mut blocks: Vec<(u16, String)> = ctx
                    .plan
                    .scheduled_sections()
                    .flat_map(|s| {
                        s.meeting
                            .occurrences()
                            .iter()
                            .filter(move |o| o.days.contains(day))
                            .map(move |o| {
                                (
                                    o.start,
                                    format!(
                                        "{} {}-{}",
                                        s.course,
                                        format_clock(o.start),
                                        format_clock(o.end)
                                    ),
                                )
                            })
                    })
                    .collect();
                blocks.sort();
                let meetings = if blocks.is_empty() {
                    "-".to_string()
                } else {
                    blocks
                        .into_iter()
                        .map(|(_, text)| text)
                        .collect::<Vec<_>>()
                        .join("; ")
                };
                DayRow {
                    day: day.name(),
                    meetings,
                }
            })
            .collect()
    }
}

impl Default for MarkdownReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportGenerator for MarkdownReporter {
    fn generate(&self, ctx: &ReportContext, output_path: &Path) -> Result<(), Box<dyn Error>> {
        let report_content = self.render(ctx)?;
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(output_path, report_content)?;
        Ok(())
    }

    fn render(&self, ctx: &ReportContext) -> Result<String, Box<dyn Error>> {
        Ok(Self::build_template(ctx).render()?)
    }
}
