//! Weekly meeting blocks

use std::fmt;

/// Teaching weekday
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Weekday {
    /// Monday ("M")
    Mon,
    /// Tuesday ("T")
    Tue,
    /// Wednesday ("W")
    Wed,
    /// Thursday ("R")
    Thu,
    /// Friday ("F")
    Fri,
}

impl Weekday {
    /// All weekdays, Monday first
    pub const ALL: [Self; 5] = [Self::Mon, Self::Tue, Self::Wed, Self::Thu, Self::Fri];

    /// Registrar letter for the day (Thursday is "R")
    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            Self::Mon => 'M',
            Self::Tue => 'T',
            Self::Wed => 'W',
            Self::Thu => 'R',
            Self::Fri => 'F',
        }
    }

    /// Full English name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Mon => "Monday",
            Self::Tue => "Tuesday",
            Self::Wed => "Wednesday",
            Self::Thu => "Thursday",
            Self::Fri => "Friday",
        }
    }

    const fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// Set of weekdays stored as a bitmask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    /// The empty set
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Add a day
    pub fn insert(&mut self, day: Weekday) {
        self.0 |= day.bit();
    }

    /// Whether `day` is in the set
    #[must_use]
    pub const fn contains(self, day: Weekday) -> bool {
        self.0 & day.bit() != 0
    }

    /// Days present in both sets
    #[must_use]
    pub const fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    /// Days present in either set
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Whether the set has no days
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of days in the set
    #[must_use]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Days in Monday-to-Friday order
    pub fn iter(self) -> impl Iterator<Item = Weekday> {
        Weekday::ALL.into_iter().filter(move |d| self.contains(*d))
    }
}

impl FromIterator<Weekday> for WeekdaySet {
    fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> Self {
        let mut set = Self::empty();
        for day in iter {
            set.insert(day);
        }
        set
    }
}

impl fmt::Display for WeekdaySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for day in self.iter() {
            write!(f, "{}", day.letter())?;
        }
        Ok(())
    }
}

/// One recurring meeting block: a weekday set plus a minute-of-day range
///
/// `start` and `end` are minutes after midnight (0..=1439) and `start < end`
/// for every occurrence produced by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WeeklyOccurrence {
    /// Days the block meets
    pub days: WeekdaySet,
    /// Start minute of day
    pub start: u16,
    /// End minute of day
    pub end: u16,
}

impl WeeklyOccurrence {
    /// Create an occurrence
    #[must_use]
    pub const fn new(days: WeekdaySet, start: u16, end: u16) -> Self {
        Self { days, start, end }
    }

    /// Length of the block in minutes
    #[must_use]
    pub const fn duration(&self) -> u16 {
        self.end.saturating_sub(self.start)
    }
}

/// Format a minute of day as a 12-hour clock time (e.g., 630 -> "10:30 am")
#[must_use]
pub fn format_clock(minute: u16) -> String {
    let hour = minute / 60;
    let min = minute % 60;
    let suffix = if hour < 12 { "am" } else { "pm" };
    let display_hour = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{display_hour}:{min:02} {suffix}")
}

impl fmt::Display for WeeklyOccurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}-{}",
            self.days,
            format_clock(self.start),
            format_clock(self.end)
        )
    }
}

/// Parsed meeting time of a section
///
/// `Unscheduled` covers "TBA", empty and malformed times. It is never treated
/// as a time slot, so it can never take part in a conflict.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MeetingPattern {
    /// Meets at the listed weekly blocks
    Scheduled(Vec<WeeklyOccurrence>),
    /// No usable meeting time
    #[default]
    Unscheduled,
}

impl MeetingPattern {
    /// Meeting blocks; empty for unscheduled sections
    #[must_use]
    pub fn occurrences(&self) -> &[WeeklyOccurrence] {
        match self {
            Self::Scheduled(blocks) => blocks,
            Self::Unscheduled => &[],
        }
    }

    /// Whether the section has at least one real meeting block
    #[must_use]
    pub const fn is_scheduled(&self) -> bool {
        matches!(self, Self::Scheduled(_))
    }
}

impl fmt::Display for MeetingPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scheduled(blocks) => write!(f, "{}", format_meeting_times(blocks)),
            Self::Unscheduled => write!(f, "TBA"),
        }
    }
}

/// Join occurrences into a meeting-time string the parser accepts back
#[must_use]
pub fn format_meeting_times(blocks: &[WeeklyOccurrence]) -> String {
    blocks
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
