//! Integration tests for logger behavior.

use class_planner::logger::{level, set_level, set_level_from_str, Level};
use class_planner::{debug, error, get_version, info, warn};

#[test]
fn level_parse_accepts_valid() {
    assert!(set_level_from_str("error"));
    assert!(set_level_from_str("WARN"));
    assert!(set_level_from_str("info"));
    assert!(set_level_from_str("debug"));
    assert_eq!(level(), Level::Debug);
}

#[test]
fn level_parse_rejects_invalid() {
    assert!(!set_level_from_str("invalid"));
    assert!(!set_level_from_str(""));
    assert!("verbose".parse::<Level>().is_err());
}

#[test]
fn logs_do_not_panic() {
    set_level(Level::Debug);
    info!("info integration");
    warn!("warn integration {}", 2);
    error!("error integration");
    debug!("debug integration");
}

#[test]
fn version_is_not_empty() {
    assert!(!get_version().trim().is_empty());
}
