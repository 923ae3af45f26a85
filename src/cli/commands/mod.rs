//! CLI command handlers for `classplanner`.
//!
//! Each command is implemented in its own submodule. Commands that touch a
//! student's plan open a [`Session`], which loads the catalog and the plan
//! the same way every time.

pub mod check;
pub mod config;
pub mod plan;
pub mod report;
pub mod sections;
pub mod status;

use class_planner::config::Config;
use class_planner::core::catalog::{CachedCatalog, FileCatalog, FileStore, StoreError};
use class_planner::core::models::{CourseCode, CourseRecord};
use class_planner::core::schedule::ParseDiagnostics;
use class_planner::core::sync::{PlanSynchronizer, SyncError};
use class_planner::{info, warn};
use std::collections::BTreeMap;
use std::error::Error;
use std::path::Path;

/// Catalog stack used by every command
pub type SessionCatalog = CachedCatalog<FileCatalog>;

/// Load the configured catalog wrapped in its lookup cache
///
/// # Errors
/// Returns an error if the catalog file cannot be read or parsed
pub fn load_catalog(config: &Config) -> Result<SessionCatalog, StoreError> {
    let mut diagnostics = ParseDiagnostics::new();
    let catalog = FileCatalog::load(
        Path::new(&config.paths.catalog),
        config.planner.day_fallback_policy(),
        &mut diagnostics,
    )?;
    if diagnostics.reported_count() > 0 {
        warn!(
            "{} meeting time string(s) could not be parsed; those sections are treated as unscheduled",
            diagnostics.reported_count()
        );
    }
    Ok(CachedCatalog::new(catalog, config.planner.cache_ttl()))
}

/// A loaded student plan plus the store it came from
pub struct Session {
    /// Student the plan belongs to
    pub user: String,
    /// File store (owns the catalog)
    pub store: FileStore<SessionCatalog>,
    /// Synchronized plan
    pub sync: PlanSynchronizer,
}

impl Session {
    /// Load catalog and plan as configured
    ///
    /// # Errors
    /// Returns an error if no user is configured or loading fails
    pub fn open(config: &Config) -> Result<Self, Box<dyn Error>> {
        let user = config.planner.user.trim().to_string();
        if user.is_empty() {
            return Err("no user configured; pass --user or set planner.user".into());
        }

        let catalog = load_catalog(config)?;
        let store = FileStore::new(&config.paths.data_dir, catalog);
        let sync = PlanSynchronizer::load(
            &store,
            store.catalog(),
            &user,
            config.planner.active_semester(),
            config.planner.debounce(),
        )?;

        Ok(Self { user, store, sync })
    }

    /// Catalog used by this session
    pub const fn catalog(&self) -> &SessionCatalog {
        self.store.catalog()
    }

    /// Catalog course records keyed by code
    pub fn course_records(&self) -> BTreeMap<CourseCode, CourseRecord> {
        self.catalog()
            .inner()
            .courses()
            .map(|c| (c.code.clone(), c.clone()))
            .collect()
    }

    /// Write pending edits to the store
    ///
    /// # Errors
    /// Returns an error if writing fails or the plan moved on meanwhile
    pub fn save(&mut self) -> Result<bool, SyncError> {
        let written = self.sync.persist_now(&mut self.store, &self.user)?;
        if written {
            info!("Saved plan for '{}'", self.user);
        }
        Ok(written)
    }
}

/// Parse a course code argument
///
/// # Errors
/// Returns an error naming the bad input
pub fn parse_course(raw: &str) -> Result<CourseCode, String> {
    raw.parse()
        .map_err(|e| format!("invalid course code '{raw}': {e}"))
}

/// Report a failed command the way every handler does
pub fn fail(context: &str, err: &dyn std::fmt::Display) -> bool {
    class_planner::error!("{context}: {err}");
    eprintln!("✗ {context}: {err}");
    false
}
