//! Planning engine: parsing, conflicts, prerequisites, statuses and persistence

pub mod cache;
pub mod catalog;
pub mod config;
pub mod models;
pub mod progress;
pub mod report;
pub mod requisites;
pub mod schedule;
pub mod status;
pub mod sync;

pub use requisites::build_prerequisite_edges;
pub use schedule::check_conflict;
pub use status::compute_statuses;

/// Returns the current version of the `class-planner` crate
#[must_use]
pub const fn get_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
