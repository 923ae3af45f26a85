//! Plan command handler
//!
//! Every subcommand mutates the plan through the synchronizer and saves the
//! result before exiting.

use super::{fail, parse_course, Session};
use crate::args::PlanSubcommand;
use class_planner::config::Config;
use class_planner::core::catalog::Catalog;
use class_planner::core::models::{MergeOutcome, SectionId, Semester};
use class_planner::core::sync::{StatusUpdate, SyncError};
use class_planner::verbose;
use std::error::Error;
use std::time::Instant;

/// Run a plan subcommand and persist the result
pub fn run(subcommand: PlanSubcommand, config: &Config) -> bool {
    let mut session = match Session::open(config) {
        Ok(session) => session,
        Err(e) => return fail("Failed to load plan", &e),
    };

    let update = match apply(subcommand, &mut session) {
        Ok(update) => update,
        Err(e) => return fail("Plan not changed", &e),
    };
    print_changes(&update);

    match session.save() {
        Ok(true) => {
            verbose!("Plan saved for '{}'", session.user);
            true
        }
        Ok(false) => true,
        Err(e) => fail("Failed to save plan", &e),
    }
}

fn apply(subcommand: PlanSubcommand, session: &mut Session) -> Result<StatusUpdate, Box<dyn Error>> {
    let now = Instant::now();
    let update = match subcommand {
        PlanSubcommand::Add { section, color } => {
            let id = SectionId::from(section);
            let section = session
                .catalog()
                .get_section(&id)?
                .ok_or(SyncError::UnknownSection(id))?;
            let prereqs = session
                .catalog()
                .get_prerequisites(std::slice::from_ref(&section.course))?;
            session.sync.merge_prerequisites(prereqs);
            let label = format!("{} ({})", section.course, section.id);
            let update = session.sync.add_section(section, color, now)?;
            report_outcome(update.outcome, &label, "scheduled");
            update
        }
        PlanSubcommand::Remove { section } => {
            let id = SectionId::from(section);
            let update = session.sync.remove_section(&id, now)?;
            println!("✓ Removed section {id}");
            update
        }
        PlanSubcommand::Switch { old, new } => {
            let old = SectionId::from(old);
            let new = SectionId::from(new);
            let section = session
                .catalog()
                .get_section(&new)?
                .ok_or_else(|| SyncError::UnknownSection(new.clone()))?;
            let update = session.sync.switch_section(&old, section, now)?;
            println!("✓ Switched {old} to {new}");
            update
        }
        PlanSubcommand::Complete {
            course,
            grade,
            taken,
            credits,
        } => {
            let code = parse_course(&course)?;
            let semester = taken.as_deref().map(str::parse::<Semester>).transpose()?;
            let credits = match credits {
                Some(credits) => credits,
                None => session
                    .catalog()
                    .get_course(&code)?
                    .map(|c| c.credits)
                    .ok_or_else(|| format!("{code} is not in the catalog; pass --credits"))?,
            };
            let prereqs = session
                .catalog()
                .get_prerequisites(std::slice::from_ref(&code))?;
            session.sync.merge_prerequisites(prereqs);
            let label = code.to_string();
            let update = session.sync.mark_complete(code, grade, semester, credits, now);
            report_outcome(update.outcome, &label, "recorded as completed");
            update
        }
        PlanSubcommand::Incomplete { course, taken } => {
            let code = parse_course(&course)?;
            let semester = taken.as_deref().map(str::parse::<Semester>).transpose()?;
            let update = session.sync.mark_incomplete(&code, semester.as_ref(), now);
            if update.recomputed.is_empty() {
                println!("✗ No completion recorded for {code}");
            } else {
                println!("✓ Removed completion of {code}");
            }
            update
        }
        PlanSubcommand::FlowAdd { course, term } => {
            let code = parse_course(&course)?;
            let term = term.as_deref().map(str::parse::<Semester>).transpose()?;
            let prereqs = session
                .catalog()
                .get_prerequisites(std::slice::from_ref(&code))?;
            session.sync.merge_prerequisites(prereqs);
            let label = code.to_string();
            let update = session.sync.add_to_flowchart(code, term, now);
            report_outcome(update.outcome, &label, "placed on the flowchart");
            update
        }
        PlanSubcommand::FlowRemove { course } => {
            let code = parse_course(&course)?;
            let update = session.sync.remove_from_flowchart(&code, now);
            if update.recomputed.is_empty() {
                println!("✗ {code} is not on the flowchart");
            } else {
                println!("✓ Removed {code} from the flowchart");
            }
            update
        }
        PlanSubcommand::FlowClear => {
            let update = session.sync.clear_flowchart(now);
            println!("✓ Flowchart cleared");
            update
        }
        PlanSubcommand::Export => {
            let report = session
                .sync
                .export_flowchart_to_schedule(session.store.catalog(), now)?;
            for (code, id) in &report.scheduled {
                println!("✓ Scheduled {code} ({id})");
            }
            for code in &report.unplaced {
                println!("✗ No conflict-free section for {code}");
            }
            report.update
        }
    };
    Ok(update)
}

fn report_outcome(outcome: Option<MergeOutcome>, label: &str, action: &str) {
    match outcome {
        Some(MergeOutcome::Inserted) => println!("✓ {label} {action}"),
        Some(MergeOutcome::Updated) => println!("✓ {label} updated"),
        Some(MergeOutcome::Unchanged) | None => println!("✓ {label} already {action}"),
    }
}

fn print_changes(update: &StatusUpdate) {
    for change in update.changed() {
        let before = change.before.map_or("-", |s| s.label());
        let after = change.after.map_or("-", |s| s.label());
        verbose!("  {}: {before} -> {after}", change.code);
    }
}
