//! CLI argument definitions for `classplanner`

use clap::{builder::BoolishValueParser, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use class_planner::config::ConfigOverrides;
use class_planner::logger::Level;

/// CLI log level argument
///
/// Represents log levels that can be passed via CLI arguments. Converts to lowercase
/// strings for config storage and to `Level` for runtime use.
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogLevelArg {
    /// Error-level logging
    Error,
    /// Warning-level logging
    Warn,
    /// Info-level logging
    Info,
    /// Debug-level logging
    Debug,
}

impl From<LogLevelArg> for Level {
    fn from(arg: LogLevelArg) -> Self {
        match arg {
            LogLevelArg::Error => Self::Error,
            LogLevelArg::Warn => Self::Warn,
            LogLevelArg::Info => Self::Info,
            LogLevelArg::Debug => Self::Debug,
        }
    }
}

impl std::fmt::Display for LogLevelArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", Level::from(*self))
    }
}

#[derive(Debug, Subcommand)]
pub enum ConfigSubcommand {
    /// Display configuration values.
    ///
    /// If a KEY is provided, displays only that configuration value.
    /// If no KEY is provided, displays all configuration values.
    Get {
        /// Optional configuration key to display (e.g., `level`, `user`, `catalog`)
        #[arg(value_name = "KEY")]
        key: Option<String>,
    },
    /// Set a configuration value.
    Set {
        /// Configuration key to set
        #[arg(value_name = "KEY")]
        key: String,
        /// Value to set
        #[arg(value_name = "VALUE")]
        value: String,
    },
    /// Unset a configuration value.
    Unset {
        /// Configuration key to unset
        #[arg(value_name = "KEY")]
        key: String,
    },
    /// Reset configuration to defaults (requires confirmation).
    Reset,
}

#[derive(Debug, Subcommand)]
pub enum PlanSubcommand {
    /// Add a section to the active semester's schedule.
    ///
    /// Fails only on a time conflict; unmet prerequisites are reported but
    /// never block the add.
    Add {
        /// Section id from the catalog
        #[arg(value_name = "SECTION")]
        section: String,
        /// Display color for the calendar block
        #[arg(long, value_name = "COLOR")]
        color: Option<String>,
    },
    /// Remove a section from the schedule.
    Remove {
        /// Scheduled section id
        #[arg(value_name = "SECTION")]
        section: String,
    },
    /// Replace a scheduled section with another one, keeping its color.
    Switch {
        /// Section currently scheduled
        #[arg(value_name = "OLD")]
        old: String,
        /// Section to schedule instead
        #[arg(value_name = "NEW")]
        new: String,
    },
    /// Record a completed course.
    Complete {
        /// Course code (e.g., "MATH 1914")
        #[arg(value_name = "COURSE")]
        course: String,
        /// Letter grade or mark
        #[arg(value_name = "GRADE")]
        grade: String,
        /// Semester taken (e.g., "Fall 2024" or "202410")
        #[arg(long, value_name = "SEMESTER")]
        taken: Option<String>,
        /// Credit hours; defaults to the catalog's value
        #[arg(long, value_name = "CREDITS")]
        credits: Option<f32>,
    },
    /// Remove a completion record.
    ///
    /// Without --taken every completion of the course is removed.
    Incomplete {
        /// Course code
        #[arg(value_name = "COURSE")]
        course: String,
        /// Only remove the attempt from this semester
        #[arg(long, value_name = "SEMESTER")]
        taken: Option<String>,
    },
    /// Place a course on the flowchart.
    FlowAdd {
        /// Course code
        #[arg(value_name = "COURSE")]
        course: String,
        /// Planned semester
        #[arg(long, value_name = "SEMESTER")]
        term: Option<String>,
    },
    /// Remove a course from the flowchart.
    FlowRemove {
        /// Course code
        #[arg(value_name = "COURSE")]
        course: String,
    },
    /// Remove every course from the flowchart.
    FlowClear,
    /// Schedule a conflict-free section for each flowchart course of the active semester.
    Export,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage configuration.
    ///
    /// If no subcommand is provided, displays all configuration values.
    Config {
        #[command(subcommand)]
        subcommand: Option<ConfigSubcommand>,
    },
    /// List catalog sections for the active semester.
    Sections {
        /// Only sections of this subject (e.g., "MATH")
        #[arg(long, value_name = "SUBJECT")]
        subject: Option<String>,
        /// Case-insensitive match on code, title or instructor
        #[arg(long, value_name = "TEXT")]
        search: Option<String>,
        /// Include every semester instead of the active one
        #[arg(long)]
        all_semesters: bool,
        /// Show instructor ratings
        #[arg(long)]
        ratings: bool,
    },
    /// Check a section for time conflicts with the stored schedule.
    Check {
        /// Section id to check
        #[arg(value_name = "SECTION")]
        section: String,
        /// Scheduled section the candidate would replace
        #[arg(long, value_name = "SECTION")]
        replace: Option<String>,
    },
    /// Show the derived status of every course in the plan.
    Status,
    /// Show prerequisite edges between plan courses.
    Edges,
    /// Edit the plan; changes are saved on exit.
    Plan {
        #[command(subcommand)]
        subcommand: PlanSubcommand,
    },
    /// Generate a Markdown report of the plan.
    Report {
        /// Output file path (optional; defaults to `<reports_dir>/<user>-plan.md`)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

#[derive(Parser, Debug)]
#[command(
    name = "classplanner",
    about = "Course schedule and prerequisite planner",
    version = env!("CARGO_PKG_VERSION")
)]
pub struct Cli {
    /// Set the runtime log level (error|warn|info|debug). Falls back to config if omitted.
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevelArg>,

    /// Enable verbose output (runtime only)
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Enable debug-level logging and runtime debug flag (shorthand)
    #[arg(long = "debug")]
    pub debug_flag: bool,

    /// Write runtime logs to a file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    // --- Config overrides ---
    /// Override config logging level (stored in config file)
    #[arg(long = "config-level", value_enum)]
    pub config_level: Option<LogLevelArg>,

    /// Override config log file path
    #[arg(long = "config-log-file", value_name = "PATH")]
    pub config_log_file: Option<PathBuf>,

    /// Override config verbose flag (true/false)
    #[arg(long = "config-verbose", value_parser = BoolishValueParser::new())]
    pub config_verbose: Option<bool>,

    /// Override the plan data directory
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Override the catalog file
    #[arg(long, value_name = "FILE")]
    pub catalog: Option<PathBuf>,

    /// Override the student whose plan is used
    #[arg(long, value_name = "NAME")]
    pub user: Option<String>,

    /// Override the active semester (e.g., "Fall 2025" or "202510")
    #[arg(long, value_name = "SEMESTER")]
    pub semester: Option<String>,

    /// Subcommand to execute.
    /// A subcommand is required to run the CLI.
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Convert CLI flags into config overrides
    ///
    /// # Returns
    /// A `ConfigOverrides` struct with values from CLI flags, where `None` means no override.
    pub fn to_config_overrides(&self) -> ConfigOverrides {
        let path_string = |p: &PathBuf| p.to_string_lossy().to_string();
        ConfigOverrides {
            level: self.config_level.map(|lvl| lvl.to_string()),
            file: self.config_log_file.as_ref().map(path_string),
            verbose: self.config_verbose,
            user: self.user.clone(),
            active_semester: self.semester.clone(),
            data_dir: self.data_dir.as_ref().map(path_string),
            catalog: self.catalog.as_ref().map(path_string),
            reports_dir: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare(command: Command) -> Cli {
        Cli {
            log_level: None,
            verbose: false,
            debug_flag: false,
            log_file: None,
            config_level: None,
            config_log_file: None,
            config_verbose: None,
            data_dir: None,
            catalog: None,
            user: None,
            semester: None,
            command,
        }
    }

    #[test]
    fn test_log_level_display() {
        assert_eq!(LogLevelArg::Error.to_string(), "error");
        assert_eq!(LogLevelArg::Warn.to_string(), "warn");
        assert_eq!(LogLevelArg::Info.to_string(), "info");
        assert_eq!(LogLevelArg::Debug.to_string(), "debug");
    }

    #[test]
    fn test_log_level_to_logger_level() {
        assert_eq!(Level::from(LogLevelArg::Error), Level::Error);
        assert_eq!(Level::from(LogLevelArg::Debug), Level::Debug);
    }

    #[test]
    fn test_to_config_overrides_empty() {
        let overrides = bare(Command::Status).to_config_overrides();
        assert!(overrides.level.is_none());
        assert!(overrides.file.is_none());
        assert!(overrides.verbose.is_none());
        assert!(overrides.user.is_none());
        assert!(overrides.active_semester.is_none());
        assert!(overrides.data_dir.is_none());
        assert!(overrides.catalog.is_none());
    }

    #[test]
    fn test_to_config_overrides_with_values() {
        let mut cli = bare(Command::Edges);
        cli.config_level = Some(LogLevelArg::Debug);
        cli.config_verbose = Some(true);
        cli.user = Some("alex".to_string());
        cli.semester = Some("Spring 2026".to_string());
        cli.data_dir = Some(PathBuf::from("/tmp/plans"));
        cli.catalog = Some(PathBuf::from("/tmp/catalog.toml"));

        let overrides = cli.to_config_overrides();
        assert_eq!(overrides.level, Some("debug".to_string()));
        assert_eq!(overrides.verbose, Some(true));
        assert_eq!(overrides.user, Some("alex".to_string()));
        assert_eq!(overrides.active_semester, Some("Spring 2026".to_string()));
        assert_eq!(overrides.data_dir, Some("/tmp/plans".to_string()));
        assert_eq!(overrides.catalog, Some("/tmp/catalog.toml".to_string()));
    }

    #[test]
    fn test_parse_plan_add() {
        let cli = Cli::try_parse_from([
            "classplanner",
            "--user",
            "alex",
            "plan",
            "add",
            "12345",
            "--color",
            "#336699",
        ])
        .unwrap();
        assert_eq!(cli.user.as_deref(), Some("alex"));
        match cli.command {
            Command::Plan {
                subcommand: PlanSubcommand::Add { section, color },
            } => {
                assert_eq!(section, "12345");
                assert_eq!(color.as_deref(), Some("#336699"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_check_with_replace() {
        let cli =
            Cli::try_parse_from(["classplanner", "check", "200", "--replace", "100"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Check { ref section, replace: Some(ref r) } if section == "200" && r == "100"
        ));
    }
}
