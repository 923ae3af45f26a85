//! Academic planning engine
//!
//! Detects time conflicts between course sections, derives per-course
//! status from a prerequisite graph and a student's plan, and keeps the
//! plan's completed, scheduled and flowchart collections in sync.

pub mod core;
pub mod logger;

pub use crate::core::{build_prerequisite_edges, check_conflict, compute_statuses, config, get_version};
