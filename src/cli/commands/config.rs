//! `config` command: show and edit planner settings

use super::fail;
use crate::args::ConfigSubcommand;
use class_planner::config::Config;
use class_planner::core::schedule::DayFallback;
use class_planner::info;
use std::io::{self, BufRead, Write};
use std::path::Path;

/// Dispatch config subcommands
///
/// # Returns
/// `false` if the command failed
pub fn run(subcommand: Option<ConfigSubcommand>, config: &mut Config, defaults: &Config) -> bool {
    match subcommand {
        None => {
            show_all(config);
            true
        }
        Some(ConfigSubcommand::Get { key: None }) => {
            show_all(config);
            true
        }
        Some(ConfigSubcommand::Get { key: Some(key) }) => show_key(config, &key),
        Some(ConfigSubcommand::Set { key, value }) => set(config, &key, &value),
        Some(ConfigSubcommand::Unset { key }) => unset(config, defaults, &key),
        Some(ConfigSubcommand::Reset) => reset(&mut io::stdin().lock()),
    }
}

fn show_all(config: &Config) {
    println!("\n=== Configuration ===\n");
    print!("{config}");
    println!("\n  config file: {}", Config::get_config_file_path().display());

    let notes = planner_notes(config);
    if !notes.is_empty() {
        println!();
        for note in notes {
            println!("! {note}");
        }
    }
}

fn show_key(config: &Config, key: &str) -> bool {
    let Some(value) = config.get(key) else {
        return fail("Unknown config key", &key);
    };
    match describe(config, key) {
        Some(meaning) => println!("{value}    # {meaning}"),
        None => println!("{value}"),
    }
    true
}

fn set(config: &mut Config, key: &str, value: &str) -> bool {
    if let Err(e) = config.set(key, value) {
        return fail("Invalid setting", &e);
    }
    if let Err(e) = config.save() {
        return fail("Failed to save config", &e);
    }

    info!("Config '{key}' set to '{value}'");
    match describe(config, key) {
        Some(meaning) => println!("✓ Set {key} = {value} ({meaning})"),
        None => println!("✓ Set {key} = {value}"),
    }
    true
}

fn unset(config: &mut Config, defaults: &Config, key: &str) -> bool {
    if let Err(e) = config.unset(key, defaults) {
        return fail("Invalid setting", &e);
    }
    if let Err(e) = config.save() {
        return fail("Failed to save config", &e);
    }

    let value = config.get(key).unwrap_or_default();
    println!("✓ Reset {key} to default ({value})");
    true
}

fn reset<R: BufRead>(input: &mut R) -> bool {
    if !Config::get_config_file_path().exists() {
        println!("✓ Config is already at defaults");
        return true;
    }

    print!("Reset config to defaults? Your user, semester and paths will be lost. (y/n): ");
    io::stdout().flush().ok();
    let mut response = String::new();
    input.read_line(&mut response).ok();

    if !confirmed(&response) {
        println!("✗ Reset cancelled");
        return true;
    }
    if let Err(e) = Config::reset() {
        return fail("Failed to remove config file", &e);
    }
    println!("✓ Config reset to defaults");
    true
}

fn confirmed(response: &str) -> bool {
    let answer = response.trim();
    answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
}

/// What a setting means for the planner, in words
fn describe(config: &Config, key: &str) -> Option<String> {
    let planner = &config.planner;
    match key {
        "active_semester" | "active-semester" => Some(planner.active_semester().map_or_else(
            || "no active semester; nothing counts as in progress".to_string(),
            |s| format!("{s}, registrar code {}", s.code()),
        )),
        "day_fallback" | "day-fallback" => Some(match planner.day_fallback_policy() {
            DayFallback::Monday => "unknown day letters are read as Monday".to_string(),
            DayFallback::Reject => "sections with unknown day letters stay unscheduled".to_string(),
        }),
        "debounce_ms" | "debounce-ms" => Some(format!(
            "plan edits are saved after {} ms without changes",
            planner.debounce_ms
        )),
        "cache_ttl_secs" | "cache-ttl-secs" => Some(format!(
            "professor ratings and prerequisites are cached for {} s",
            planner.cache_ttl_secs
        )),
        "user" | "data_dir" | "data-dir" => {
            plan_file(config).map(|path| format!("plan file {}", path.display()))
        }
        "catalog" => Some(if Path::new(&config.paths.catalog).is_file() {
            "catalog found".to_string()
        } else {
            "catalog file does not exist".to_string()
        }),
        _ => None,
    }
}

fn plan_file(config: &Config) -> Option<std::path::PathBuf> {
    let user = config.planner.user.trim();
    (!user.is_empty()).then(|| Path::new(&config.paths.data_dir).join(format!("{user}.toml")))
}

/// Problems that would make plan commands fail or behave unexpectedly
fn planner_notes(config: &Config) -> Vec<String> {
    let mut notes = Vec::new();
    if config.planner.user.trim().is_empty() {
        notes.push("planner.user is empty; plan commands need --user or `config set user NAME`".to_string());
    }
    if config.planner.active_semester.is_empty() {
        notes.push("planner.active_semester is empty; no course will show as in progress".to_string());
    } else if config.planner.active_semester().is_none() {
        notes.push(format!(
            "planner.active_semester '{}' is not a semester (use \"Fall 2025\" or \"202510\")",
            config.planner.active_semester
        ));
    }
    if config.planner.day_fallback.parse::<DayFallback>().is_err() {
        notes.push(format!(
            "planner.day_fallback '{}' is unknown; using monday",
            config.planner.day_fallback
        ));
    }
    if !Path::new(&config.paths.catalog).is_file() {
        notes.push(format!("catalog '{}' does not exist", config.paths.catalog));
    }
    notes
}
