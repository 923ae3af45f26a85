//! Meeting-time string parser
//!
//! Accepts registrar strings such as `"MWF 10:00 am-10:50 am"` or comma-joined
//! lists like `"F 10:00 am-10:50 am, TR 12:00 pm-1:15 pm"`. Each block is a
//! day-code token followed by a 12-hour time range.

use super::occurrence::{MeetingPattern, Weekday, WeekdaySet, WeeklyOccurrence};
use crate::warn;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// What to do with a day letter that names no weekday
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DayFallback {
    /// Treat the letter as Monday and warn once per string
    #[default]
    Monday,
    /// Treat the whole string as malformed
    Reject,
}

impl FromStr for DayFallback {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monday" | "mon" => Ok(Self::Monday),
            "reject" => Ok(Self::Reject),
            other => Err(format!(
                "Unknown day fallback: '{other}' (expected 'monday' or 'reject')"
            )),
        }
    }
}

impl fmt::Display for DayFallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Monday => write!(f, "monday"),
            Self::Reject => write!(f, "reject"),
        }
    }
}

/// Why a meeting-time string could not be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedReason {
    /// A block had a day code but no time range after it
    #[error("missing time range")]
    MissingTimeRange,
    /// A clock time had no am/pm suffix
    #[error("clock time '{0}' has no am/pm suffix")]
    MissingMeridiem(String),
    /// A clock time was out of range or not numeric
    #[error("invalid clock time '{0}'")]
    InvalidClock(String),
    /// The range ends at or before its start
    #[error("time range ends before it starts")]
    EmptyRange,
    /// A day letter matched no weekday under the reject policy
    #[error("unknown day letter '{0}'")]
    UnknownDay(char),
}

/// Failure to turn a meeting-time string into weekly occurrences
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseFailure {
    /// Empty, "TBA" or only TBA blocks. Expected and frequent.
    #[error("no meeting time given")]
    NoTimeGiven,
    /// The string has content that does not parse
    #[error("malformed meeting time '{input}': {reason}")]
    Malformed {
        /// Original string
        input: String,
        /// First problem found
        reason: MalformedReason,
    },
}

/// Remembers which malformed strings were already reported
///
/// Loaders pass one of these through every section they parse so a bad
/// string repeated across many sections is logged once.
#[derive(Debug, Default)]
pub struct ParseDiagnostics {
    reported: HashSet<String>,
    suppressed: usize,
}

impl ParseDiagnostics {
    /// Create an empty diagnostics tracker
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `input`; returns `true` only the first time it is seen
    pub fn first_report(&mut self, input: &str) -> bool {
        if self.reported.insert(input.to_string()) {
            true
        } else {
            self.suppressed += 1;
            false
        }
    }

    /// Number of distinct strings reported so far
    #[must_use]
    pub fn reported_count(&self) -> usize {
        self.reported.len()
    }

    /// Number of repeat reports that were swallowed
    #[must_use]
    pub const fn suppressed(&self) -> usize {
        self.suppressed
    }

    /// Whether `input` has been reported
    #[must_use]
    pub fn was_reported(&self, input: &str) -> bool {
        self.reported.contains(input)
    }
}

/// Parse a meeting-time string strictly
///
/// # Arguments
/// * `raw` - Registrar meeting-time string
/// * `policy` - Handling of unrecognized day letters
///
/// # Errors
/// Returns `ParseFailure::NoTimeGiven` for empty or TBA input and
/// `ParseFailure::Malformed` if any block fails to parse.
pub fn parse_meeting_times(
    raw: &str,
    policy: DayFallback,
) -> Result<Vec<WeeklyOccurrence>, ParseFailure> {
    parse_tracking_fallback(raw, policy).map(|(blocks, _)| blocks)
}

impl MeetingPattern {
    /// Parse a meeting-time string, degrading failures to `Unscheduled`
    ///
    /// Malformed strings and Monday fallbacks are logged at warn level the
    /// first time `diagnostics` sees them.
    pub fn parse(raw: &str, policy: DayFallback, diagnostics: &mut ParseDiagnostics) -> Self {
        match parse_tracking_fallback(raw, policy) {
            Ok((blocks, fell_back)) => {
                if fell_back && diagnostics.first_report(raw) {
                    warn!("Unrecognized day letter in '{raw}', treating it as Monday");
                }
                Self::Scheduled(blocks)
            }
            Err(ParseFailure::NoTimeGiven) => Self::Unscheduled,
            Err(err @ ParseFailure::Malformed { .. }) => {
                if diagnostics.first_report(raw) {
                    warn!("{err}; section left unscheduled");
                }
                Self::Unscheduled
            }
        }
    }
}

fn parse_tracking_fallback(
    raw: &str,
    policy: DayFallback,
) -> Result<(Vec<WeeklyOccurrence>, bool), ParseFailure> {
    let malformed = |reason| ParseFailure::Malformed {
        input: raw.to_string(),
        reason,
    };

    let mut blocks = Vec::new();
    let mut fell_back = false;

    for block in raw.split(',').map(str::trim) {
        if is_placeholder(block) {
            continue;
        }
        let (day_token, range) = block
            .split_once(char::is_whitespace)
            .ok_or_else(|| malformed(MalformedReason::MissingTimeRange))?;
        if is_placeholder(day_token) {
            continue;
        }

        let (days, used_fallback) = decode_days(day_token, policy).map_err(malformed)?;
        fell_back |= used_fallback;

        let (start, end) = range
            .split_once('-')
            .ok_or_else(|| malformed(MalformedReason::MissingTimeRange))?;
        let start = parse_clock(start).map_err(malformed)?;
        let end = parse_clock(end).map_err(malformed)?;
        if end <= start {
            return Err(malformed(MalformedReason::EmptyRange));
        }

        blocks.push(WeeklyOccurrence::new(days, start, end));
    }

    if blocks.is_empty() {
        return Err(ParseFailure::NoTimeGiven);
    }
    Ok((blocks, fell_back))
}

fn is_placeholder(token: &str) -> bool {
    token.is_empty() || token.eq_ignore_ascii_case("TBA")
}

/// Decode a day-code token; "Th" and "R" both mean Thursday
fn decode_days(token: &str, policy: DayFallback) -> Result<(WeekdaySet, bool), MalformedReason> {
    let mut days = WeekdaySet::empty();
    let mut fell_back = false;
    let mut chars = token.chars().peekable();

    while let Some(c) = chars.next() {
        let day = match c.to_ascii_uppercase() {
            'M' => Weekday::Mon,
            'T' if matches!(chars.peek(), Some('h' | 'H')) => {
                chars.next();
                Weekday::Thu
            }
            'T' => Weekday::Tue,
            'W' => Weekday::Wed,
            'R' => Weekday::Thu,
            'F' => Weekday::Fri,
            _ => match policy {
                DayFallback::Monday => {
                    fell_back = true;
                    Weekday::Mon
                }
                DayFallback::Reject => return Err(MalformedReason::UnknownDay(c)),
            },
        };
        days.insert(day);
    }

    Ok((days, fell_back))
}

/// Parse `H:MM am|pm` (space before the suffix optional) into a minute of day
fn parse_clock(text: &str) -> Result<u16, MalformedReason> {
    let text = text.trim();
    let lower = text.to_ascii_lowercase();
    let (clock, pm) = if let Some(rest) = lower.strip_suffix("am") {
        (rest.trim_end(), false)
    } else if let Some(rest) = lower.strip_suffix("pm") {
        (rest.trim_end(), true)
    } else {
        return Err(MalformedReason::MissingMeridiem(text.to_string()));
    };

    let invalid = || MalformedReason::InvalidClock(text.to_string());
    let (hour, minute) = match clock.split_once(':') {
        Some((h, m)) if m.len() == 2 => (h, m),
        Some(_) => return Err(invalid()),
        None => (clock, "0"),
    };
    let hour: u16 = hour.parse().map_err(|_| invalid())?;
    let minute: u16 = minute.parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&hour) || minute > 59 {
        return Err(invalid());
    }

    let base = if pm { 720 } else { 0 };
    Ok(base + (hour % 12) * 60 + minute)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn days(s: &str) -> WeekdaySet {
        decode_days(s, DayFallback::Reject).unwrap().0
    }

    #[test]
    fn test_single_block() {
        let blocks = parse_meeting_times("MWF 10:00 am-10:50 am", DayFallback::Monday).unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].days, days("MWF"));
        assert_eq!(blocks[0].start, 600);
        assert_eq!(blocks[0].end, 650);
    }

    #[test]
    fn test_multiple_blocks() {
        let blocks =
            parse_meeting_times("F 10:00 am-10:50 am, TR 12:00 pm-1:15 pm", DayFallback::Monday)
                .unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1].days, days("TR"));
        assert_eq!(blocks[1].start, 720);
        assert_eq!(blocks[1].end, 795);
    }

    #[test]
    fn test_thursday_spellings() {
        assert_eq!(days("TTh"), days("TR"));
        assert_eq!(days("MTh").len(), 2);
        assert!(days("R").contains(Weekday::Thu));
    }

    #[test]
    fn test_midnight_and_noon() {
        assert_eq!(parse_clock("12:00 am"), Ok(0));
        assert_eq!(parse_clock("12:00pm"), Ok(720));
        assert_eq!(parse_clock("12:30 PM"), Ok(750));
        assert_eq!(parse_clock("11:59 pm"), Ok(1439));
    }

    #[test]
    fn test_missing_meridiem_is_malformed() {
        let err = parse_meeting_times("MWF 10:00-10:50", DayFallback::Monday).unwrap_err();
        assert!(matches!(
            err,
            ParseFailure::Malformed {
                reason: MalformedReason::MissingMeridiem(_),
                ..
            }
        ));
    }

    #[test]
    fn test_tba_and_empty() {
        assert_eq!(
            parse_meeting_times("TBA", DayFallback::Monday),
            Err(ParseFailure::NoTimeGiven)
        );
        assert_eq!(
            parse_meeting_times("   ", DayFallback::Monday),
            Err(ParseFailure::NoTimeGiven)
        );
        let blocks =
            parse_meeting_times("TBA, MW 2:00 pm-3:15 pm", DayFallback::Monday).unwrap();
        assert_eq!(blocks.len(), 1);
    }

    #[test]
    fn test_one_bad_block_spoils_the_string() {
        let result = parse_meeting_times("MW 2:00 pm-3:15 pm, F 25:00 pm-1:00 pm", DayFallback::Monday);
        assert!(matches!(result, Err(ParseFailure::Malformed { .. })));
    }

    #[test]
    fn test_reversed_range_rejected() {
        let err = parse_meeting_times("M 3:00 pm-2:00 pm", DayFallback::Monday).unwrap_err();
        assert!(matches!(
            err,
            ParseFailure::Malformed {
                reason: MalformedReason::EmptyRange,
                ..
            }
        ));
    }

    #[test]
    fn test_unknown_day_policy() {
        let blocks = parse_meeting_times("X 9:00 am-9:50 am", DayFallback::Monday).unwrap();
        assert_eq!(blocks[0].days, days("M"));

        let err = parse_meeting_times("X 9:00 am-9:50 am", DayFallback::Reject).unwrap_err();
        assert!(matches!(
            err,
            ParseFailure::Malformed {
                reason: MalformedReason::UnknownDay('X'),
                ..
            }
        ));
    }

    #[test]
    fn test_degrading_parse_reports_once() {
        let mut diagnostics = ParseDiagnostics::new();
        for _ in 0..3 {
            let pattern =
                MeetingPattern::parse("MWF 10:00-10:50", DayFallback::Monday, &mut diagnostics);
            assert_eq!(pattern, MeetingPattern::Unscheduled);
        }
        assert_eq!(diagnostics.reported_count(), 1);
        assert_eq!(diagnostics.suppressed(), 2);

        let pattern = MeetingPattern::parse("TBA", DayFallback::Monday, &mut diagnostics);
        assert_eq!(pattern, MeetingPattern::Unscheduled);
        assert!(!diagnostics.was_reported("TBA"));
    }

    #[test]
    fn test_day_fallback_from_str() {
        assert_eq!("Monday".parse::<DayFallback>(), Ok(DayFallback::Monday));
        assert_eq!("reject".parse::<DayFallback>(), Ok(DayFallback::Reject));
        assert!("tuesday".parse::<DayFallback>().is_err());
        assert_eq!(DayFallback::default(), DayFallback::Monday);
    }
}
