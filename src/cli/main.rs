//! Command-line interface entry point for `classplanner`

mod args;
mod commands;

use args::{Cli, Command};
use clap::Parser;
use class_planner::config::Config;
use class_planner::info;
use class_planner::logger::{enable_debug, enable_verbose, init_file_logging, set_level, Level};

fn main() {
    let args = Cli::parse();

    // Load configuration once at startup and apply CLI overrides to it
    let mut config = Config::load();
    let defaults = Config::from_defaults();
    config.apply_overrides(&args.to_config_overrides());

    // CLI flag wins over config logging.level; fallback warn
    let mut level = args
        .log_level
        .map(Level::from)
        .or_else(|| config.logging.level.parse().ok())
        .unwrap_or(Level::Warn);

    if args.debug_flag || level == Level::Debug {
        level = Level::Debug;
        enable_debug();
    }

    let verbose = args.verbose || config.logging.verbose;
    if verbose {
        enable_verbose();
    }
    set_level(level);

    let config_log_path: Option<std::path::PathBuf> = if config.logging.file.is_empty() {
        None
    } else {
        Some(std::path::PathBuf::from(&config.logging.file))
    };

    if let Some(log_path) = args.log_file.as_ref().or(config_log_path.as_ref()) {
        let display_path = log_path.to_string_lossy();
        if init_file_logging(log_path) {
            if verbose {
                eprintln!("✓ File logging initialized at: {display_path}");
            } else {
                info!("File logging initialized at: {display_path}");
            }
        } else {
            eprintln!("✗ Failed to initialize file logging at: {display_path}");
        }
    }

    let ok = match args.command {
        Command::Config { subcommand } => commands::config::run(subcommand, &mut config, &defaults),
        Command::Sections {
            subject,
            search,
            all_semesters,
            ratings,
        } => commands::sections::run(
            &config,
            subject.as_deref(),
            search.as_deref(),
            all_semesters,
            ratings,
        ),
        Command::Check { section, replace } => {
            commands::check::run(&config, &section, replace.as_deref())
        }
        Command::Status => commands::status::run(&config),
        Command::Edges => commands::status::run_edges(&config),
        Command::Plan { subcommand } => commands::plan::run(subcommand, &config),
        Command::Report { output } => commands::report::run(output.as_deref(), &config),
    };

    if !ok {
        std::process::exit(1);
    }
}
