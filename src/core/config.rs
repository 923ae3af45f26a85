//! Configuration module for `classplanner`

use crate::core::models::Semester;
use crate::core::schedule::DayFallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Default CLI configuration loaded based on build profile.
/// Uses release defaults in release mode, debug defaults in debug mode.
#[cfg(not(debug_assertions))]
const CONFIG_DEFAULTS: &str = include_str!("../../assets/DefaultCLIConfigRelease.toml");

#[cfg(debug_assertions)]
const CONFIG_DEFAULTS: &str = include_str!("../../assets/DefaultCLIConfigDebug.toml");

#[cfg(not(debug_assertions))]
const CONFIG_FILE_NAME: &str = "config.toml";

#[cfg(debug_assertions)]
const CONFIG_FILE_NAME: &str = "dconfig.toml";

/// Placeholder expanded to the config directory in path-like values.
const DIR_VARIABLE: &str = "$CLASS_PLANNER";

/// Logging configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug)
    #[serde(default)]
    pub level: String,
    /// Log file path
    #[serde(default)]
    pub file: String,
    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,
}

/// Planner engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Student whose plan file is read and written
    #[serde(default)]
    pub user: String,
    /// Semester treated as "in progress" (e.g., "Fall 2025" or "202510")
    #[serde(default)]
    pub active_semester: String,
    /// Debounce window for persisting plan edits, in milliseconds
    #[serde(default)]
    pub debounce_ms: u64,
    /// Handling of unrecognized day letters: "monday" or "reject"
    #[serde(default)]
    pub day_fallback: String,
    /// Lifetime of cached catalog lookups, in seconds
    #[serde(default)]
    pub cache_ttl_secs: u64,
}

impl PlannerConfig {
    /// Debounce window as a `Duration`
    #[must_use]
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Cache lifetime as a `Duration`
    #[must_use]
    pub const fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Parsed day-letter fallback policy; unknown values keep the Monday fallback
    #[must_use]
    pub fn day_fallback_policy(&self) -> DayFallback {
        self.day_fallback.parse().unwrap_or_default()
    }

    /// Parsed active semester, if the configured value is recognizable
    #[must_use]
    pub fn active_semester(&self) -> Option<Semester> {
        self.active_semester.parse().ok()
    }
}

/// Paths configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory holding one plan file per student
    #[serde(default)]
    pub data_dir: String,
    /// Catalog TOML file (courses, sections, prerequisites)
    #[serde(default)]
    pub catalog: String,
    /// Directory for generated plan reports
    #[serde(default)]
    pub reports_dir: String,
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Planner settings
    #[serde(default)]
    pub planner: PlannerConfig,
    /// Path settings
    #[serde(default)]
    pub paths: PathsConfig,
}

/// Optional CLI overrides for configuration values
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Override logging level
    pub level: Option<String>,
    /// Override log file path
    pub file: Option<String>,
    /// Override verbose flag
    pub verbose: Option<bool>,
    /// Override the student whose plan is used
    pub user: Option<String>,
    /// Override the active semester
    pub active_semester: Option<String>,
    /// Override the plan data directory
    pub data_dir: Option<String>,
    /// Override the catalog file
    pub catalog: Option<String>,
    /// Override the reports directory
    pub reports_dir: Option<String>,
}

impl Config {
    /// Get the `$CLASS_PLANNER` directory path
    ///
    /// Returns:
    /// - Linux: `~/.config/classplanner`
    /// - macOS: `~/Library/Application Support/classplanner`
    /// - Windows: `%APPDATA%\classplanner`
    #[must_use]
    pub fn get_classplanner_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("classplanner")
    }

    /// Merge missing fields from defaults into this config
    ///
    /// Only fields that are empty (or zero) here and set in `defaults` are
    /// copied, so upgrading picks up new keys without touching user values.
    ///
    /// # Returns
    ///
    /// `true` if any fields were added/changed, `false` otherwise
    #[allow(clippy::useless_let_if_seq)]
    pub fn merge_defaults(&mut self, defaults: &Self) -> bool {
        let mut changed = false;

        changed |= merge_string(&mut self.logging.level, &defaults.logging.level);
        changed |= merge_string(&mut self.logging.file, &defaults.logging.file);

        changed |= merge_string(&mut self.planner.user, &defaults.planner.user);
        changed |= merge_string(
            &mut self.planner.active_semester,
            &defaults.planner.active_semester,
        );
        changed |= merge_string(&mut self.planner.day_fallback, &defaults.planner.day_fallback);
        if self.planner.debounce_ms == 0 && defaults.planner.debounce_ms != 0 {
            self.planner.debounce_ms = defaults.planner.debounce_ms;
            changed = true;
        }
        if self.planner.cache_ttl_secs == 0 && defaults.planner.cache_ttl_secs != 0 {
            self.planner.cache_ttl_secs = defaults.planner.cache_ttl_secs;
            changed = true;
        }

        changed |= merge_string(&mut self.paths.data_dir, &defaults.paths.data_dir);
        changed |= merge_string(&mut self.paths.catalog, &defaults.paths.catalog);
        changed |= merge_string(&mut self.paths.reports_dir, &defaults.paths.reports_dir);

        changed
    }

    /// Apply CLI-provided overrides onto the loaded configuration
    ///
    /// Only non-`None` values replace config values; the config file itself is
    /// not modified.
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(level) = &overrides.level {
            self.logging.level.clone_from(level);
        }
        if let Some(file) = &overrides.file {
            self.logging.file.clone_from(file);
        }
        if let Some(verbose) = overrides.verbose {
            self.logging.verbose = verbose;
        }

        if let Some(user) = &overrides.user {
            self.planner.user.clone_from(user);
        }
        if let Some(semester) = &overrides.active_semester {
            self.planner.active_semester.clone_from(semester);
        }

        if let Some(data_dir) = &overrides.data_dir {
            self.paths.data_dir.clone_from(data_dir);
        }
        if let Some(catalog) = &overrides.catalog {
            self.paths.catalog.clone_from(catalog);
        }
        if let Some(reports_dir) = &overrides.reports_dir {
            self.paths.reports_dir.clone_from(reports_dir);
        }
    }

    /// Get the user config file path
    ///
    /// - `config.toml` for release builds
    /// - `dconfig.toml` for debug builds (allows separate debug config)
    #[must_use]
    pub fn get_config_file_path() -> PathBuf {
        Self::get_classplanner_dir().join(CONFIG_FILE_NAME)
    }

    /// Expand `$CLASS_PLANNER` variable in a string
    #[must_use]
    fn expand_variables(value: &str) -> String {
        if value.contains(DIR_VARIABLE) {
            let dir = Self::get_classplanner_dir();
            value.replace(DIR_VARIABLE, dir.to_str().unwrap_or("."))
        } else {
            value.to_string()
        }
    }

    /// Initialize config from a TOML string
    ///
    /// Missing fields use their serde defaults (empty strings, zero, false) and
    /// `$CLASS_PLANNER` is expanded in path values.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML cannot be parsed or doesn't match the expected schema
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        let mut config: Self = toml::from_str(toml_str)?;

        config.logging.file = Self::expand_variables(&config.logging.file);
        config.paths.data_dir = Self::expand_variables(&config.paths.data_dir);
        config.paths.catalog = Self::expand_variables(&config.paths.catalog);
        config.paths.reports_dir = Self::expand_variables(&config.paths.reports_dir);

        Ok(config)
    }

    /// Load configuration from embedded defaults
    ///
    /// # Panics
    /// Panics if the embedded default configuration is invalid TOML. The
    /// defaults are compiled into the binary, so this is a build defect.
    #[must_use]
    pub fn from_defaults() -> Self {
        Self::from_toml(CONFIG_DEFAULTS).expect("Failed to parse compiled-in default configuration")
    }

    /// Load configuration from file, or create from defaults if not found
    ///
    /// - If the config file exists: loads it, merges missing fields from
    ///   defaults and saves the merged result.
    /// - First run: creates the config directory and writes the defaults.
    ///
    /// Falls back to defaults if the file cannot be read or parsed.
    #[must_use]
    pub fn load() -> Self {
        let config_file = Self::get_config_file_path();
        let defaults = Self::from_defaults();

        if config_file.exists() {
            if let Ok(content) = fs::read_to_string(&config_file) {
                if let Ok(mut config) = Self::from_toml(&content) {
                    if config.merge_defaults(&defaults) {
                        let _ = config.save();
                    }
                    return config;
                }
            }
        } else {
            if let Some(parent) = config_file.parent() {
                let _ = fs::create_dir_all(parent);
            }
            let _ = defaults.save();
            return defaults;
        }

        defaults
    }

    /// Save configuration to file
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be created or the file
    /// cannot be written.
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let config_file = Self::get_config_file_path();
        if let Some(parent) = config_file.parent() {
            fs::create_dir_all(parent)?;
        }
        let toml_str = toml::to_string_pretty(self)?;
        fs::write(&config_file, toml_str)?;
        Ok(())
    }

    /// Get a configuration value by key
    ///
    /// Supported keys: `level`, `file`, `verbose`, `user`, `active_semester`,
    /// `debounce_ms`, `day_fallback`, `cache_ttl_secs`, `data_dir`, `catalog`,
    /// `reports_dir` (dashed spellings are accepted too).
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "level" => Some(self.logging.level.clone()),
            "file" => Some(self.logging.file.clone()),
            "verbose" => Some(self.logging.verbose.to_string()),
            "user" => Some(self.planner.user.clone()),
            "active_semester" | "active-semester" => Some(self.planner.active_semester.clone()),
            "debounce_ms" | "debounce-ms" => Some(self.planner.debounce_ms.to_string()),
            "day_fallback" | "day-fallback" => Some(self.planner.day_fallback.clone()),
            "cache_ttl_secs" | "cache-ttl-secs" => Some(self.planner.cache_ttl_secs.to_string()),
            "data_dir" | "data-dir" => Some(self.paths.data_dir.clone()),
            "catalog" => Some(self.paths.catalog.clone()),
            "reports_dir" | "reports-dir" => Some(self.paths.reports_dir.clone()),
            _ => None,
        }
    }

    /// Set a configuration value by key
    ///
    /// Updates the in-memory config only; call [`save()`](Config::save) to persist.
    ///
    /// # Errors
    /// Returns an error if the key is not recognized or the value cannot be
    /// parsed for that key.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        match key {
            "level" => self.logging.level = value.to_string(),
            "file" => self.logging.file = value.to_string(),
            "verbose" => {
                self.logging.verbose = value
                    .parse::<bool>()
                    .map_err(|_| format!("Invalid boolean value for 'verbose': '{value}'"))?;
            }
            "user" => self.planner.user = value.to_string(),
            "active_semester" | "active-semester" => {
                value
                    .parse::<Semester>()
                    .map_err(|e| format!("Invalid semester for 'active_semester': {e}"))?;
                self.planner.active_semester = value.to_string();
            }
            "debounce_ms" | "debounce-ms" => {
                self.planner.debounce_ms = parse_positive(key, value)?;
            }
            "day_fallback" | "day-fallback" => {
                value.parse::<DayFallback>()?;
                self.planner.day_fallback = value.to_ascii_lowercase();
            }
            "cache_ttl_secs" | "cache-ttl-secs" => {
                self.planner.cache_ttl_secs = parse_positive(key, value)?;
            }
            "data_dir" | "data-dir" => self.paths.data_dir = value.to_string(),
            "catalog" => self.paths.catalog = value.to_string(),
            "reports_dir" | "reports-dir" => self.paths.reports_dir = value.to_string(),
            _ => return Err(format!("Unknown config key: '{key}'")),
        }
        Ok(())
    }

    /// Unset a configuration value by key (reset to default)
    ///
    /// # Errors
    /// Returns an error if the key is not recognized.
    pub fn unset(&mut self, key: &str, defaults: &Self) -> Result<(), String> {
        match key {
            "level" => self.logging.level.clone_from(&defaults.logging.level),
            "file" => self.logging.file.clone_from(&defaults.logging.file),
            "verbose" => self.logging.verbose = defaults.logging.verbose,
            "user" => self.planner.user.clone_from(&defaults.planner.user),
            "active_semester" | "active-semester" => self
                .planner
                .active_semester
                .clone_from(&defaults.planner.active_semester),
            "debounce_ms" | "debounce-ms" => {
                self.planner.debounce_ms = defaults.planner.debounce_ms;
            }
            "day_fallback" | "day-fallback" => self
                .planner
                .day_fallback
                .clone_from(&defaults.planner.day_fallback),
            "cache_ttl_secs" | "cache-ttl-secs" => {
                self.planner.cache_ttl_secs = defaults.planner.cache_ttl_secs;
            }
            "data_dir" | "data-dir" => self.paths.data_dir.clone_from(&defaults.paths.data_dir),
            "catalog" => self.paths.catalog.clone_from(&defaults.paths.catalog),
            "reports_dir" | "reports-dir" => self
                .paths
                .reports_dir
                .clone_from(&defaults.paths.reports_dir),
            _ => return Err(format!("Unknown config key: '{key}'")),
        }
        Ok(())
    }

    /// Reset all configuration to defaults
    ///
    /// Deletes the configuration file; the next [`load()`](Config::load)
    /// recreates it from defaults.
    ///
    /// # Errors
    /// Returns an error if the config file exists but cannot be deleted.
    pub fn reset() -> Result<(), std::io::Error> {
        let config_file = Self::get_config_file_path();
        if config_file.exists() {
            fs::remove_file(config_file)?;
        }
        Ok(())
    }
}

/// Zero reads as "unset" and is replaced by the default on the next load
fn parse_positive(key: &str, value: &str) -> Result<u64, String> {
    match value.trim().parse::<u64>() {
        Ok(0) => Err(format!("'{key}' must be greater than zero")),
        Ok(n) => Ok(n),
        Err(_) => Err(format!("Invalid number for '{key}': '{value}'")),
    }
}

fn merge_string(target: &mut String, default: &str) -> bool {
    if target.is_empty() && !default.is_empty() {
        default.clone_into(target);
        true
    } else {
        false
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[logging]")?;
        writeln!(f, "  level = \"{}\"", self.logging.level)?;
        writeln!(f, "  file = \"{}\"", self.logging.file)?;
        writeln!(f, "  verbose = {}", self.logging.verbose)?;

        writeln!(f, "\n[planner]")?;
        writeln!(f, "  user = \"{}\"", self.planner.user)?;
        writeln!(f, "  active_semester = \"{}\"", self.planner.active_semester)?;
        writeln!(f, "  debounce_ms = {}", self.planner.debounce_ms)?;
        writeln!(f, "  day_fallback = \"{}\"", self.planner.day_fallback)?;
        writeln!(f, "  cache_ttl_secs = {}", self.planner.cache_ttl_secs)?;

        writeln!(f, "\n[paths]")?;
        writeln!(f, "  data_dir = \"{}\"", self.paths.data_dir)?;
        writeln!(f, "  catalog = \"{}\"", self.paths.catalog)?;
        writeln!(f, "  reports_dir = \"{}\"", self.paths.reports_dir)?;

        Ok(())
    }
}
