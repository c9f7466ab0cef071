//! Week calendar, time windows and day-priority tables.
//!
//! # Time Model
//! All times are minutes from midnight. A day is numbered 1..=7,
//! Monday = 1 through Sunday = 7.
//!
//! # Day Priorities
//! A course that meets `n` times per week is spread over one of a
//! predetermined list of weekday subsets, tried in order. Only the tables
//! for one, two and three meetings are configured; the others are derived:
//!
//! | Meetings | Table |
//! |----------|-------|
//! | 1 | `once` |
//! | 2 | `twice` |
//! | 3 | `thrice` |
//! | 4 | for each `once` entry, every other `once` day |
//! | 5 | `[1, 2, 3, 4, 5]` |
//! | 6 | `[1, 2, 3, 4, 5, 6]` |

use serde::{Deserialize, Serialize};

/// Day number within a week (1 = Monday … 7 = Sunday).
pub type Day = u8;

/// A day of the week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Weekday {
    Monday = 1,
    Tuesday = 2,
    Wednesday = 3,
    Thursday = 4,
    Friday = 5,
    Saturday = 6,
    Sunday = 7,
}

impl Weekday {
    /// All seven days in week order.
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    /// Day number (1..=7).
    #[inline]
    pub fn number(self) -> Day {
        self as Day
    }

    /// Looks up a day by number.
    pub fn from_number(day: Day) -> Option<Self> {
        Self::ALL.get(usize::from(day).checked_sub(1)?).copied()
    }
}

/// A time interval [start, end) in minutes.
///
/// Half-open interval: includes start, excludes end.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeWindow {
    /// Interval start (minutes, inclusive).
    pub start: u32,
    /// Interval end (minutes, exclusive).
    pub end: u32,
}

impl TimeWindow {
    /// Creates a new time window.
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Creates a window from a start and a duration.
    pub fn from_duration(start: u32, duration: u32) -> Self {
        Self::new(start, start.saturating_add(duration))
    }

    /// Duration of this window (minutes).
    #[inline]
    pub fn duration(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    /// Whether a minute offset falls within this window.
    #[inline]
    pub fn contains(&self, minute: u32) -> bool {
        minute >= self.start && minute < self.end
    }

    /// Whether two windows overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Ordered weekday subsets per weekly-meeting count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DayPriorities {
    /// Single-day subsets for once-weekly courses.
    #[serde(alias = "once_prio")]
    pub once: Vec<Vec<Day>>,
    /// Two-day subsets for twice-weekly courses.
    #[serde(alias = "twice_prio")]
    pub twice: Vec<Vec<Day>>,
    /// Three-day subsets for thrice-weekly courses.
    #[serde(alias = "thrice_prio")]
    pub thrice: Vec<Vec<Day>>,
}

impl Default for DayPriorities {
    fn default() -> Self {
        Self {
            once: vec![vec![3], vec![6], vec![1], vec![5], vec![2], vec![4]],
            twice: vec![vec![2, 4], vec![1, 5], vec![3, 6]],
            thrice: vec![vec![1, 3, 5], vec![2, 4, 6]],
        }
    }
}

impl DayPriorities {
    /// Derived table for four meetings: for each `once` entry, all other `once` days.
    pub fn quadrice(&self) -> Vec<Vec<Day>> {
        let all: Vec<Day> = self.once.iter().flatten().copied().collect();
        self.once
            .iter()
            .filter_map(|entry| entry.first())
            .map(|&skipped| all.iter().copied().filter(|&d| d != skipped).collect())
            .collect()
    }

    /// Table for five meetings.
    pub fn quintuple(&self) -> Vec<Vec<Day>> {
        vec![vec![1, 2, 3, 4, 5]]
    }

    /// Table for six meetings.
    pub fn hexa(&self) -> Vec<Vec<Day>> {
        vec![vec![1, 2, 3, 4, 5, 6]]
    }

    /// Selects the priority table for a weekly-meeting count.
    ///
    /// Returns an empty table for counts outside 1..=6.
    pub fn for_meetings(&self, meetings: u32) -> Vec<Vec<Day>> {
        match meetings {
            1 => self.once.clone(),
            2 => self.twice.clone(),
            3 => self.thrice.clone(),
            4 => self.quadrice(),
            5 => self.quintuple(),
            6 => self.hexa(),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weekday_numbering() {
        assert_eq!(Weekday::Monday.number(), 1);
        assert_eq!(Weekday::Sunday.number(), 7);
        assert_eq!(Weekday::from_number(6), Some(Weekday::Saturday));
        assert_eq!(Weekday::from_number(0), None);
        assert_eq!(Weekday::from_number(8), None);
    }

    #[test]
    fn test_time_window() {
        let w = TimeWindow::new(420, 480);
        assert_eq!(w.duration(), 60);
        assert!(w.contains(420));
        assert!(w.contains(479));
        assert!(!w.contains(480)); // exclusive end
        assert_eq!(TimeWindow::from_duration(420, 60), w);
    }

    #[test]
    fn test_time_window_overlap() {
        let a = TimeWindow::new(0, 100);
        let b = TimeWindow::new(50, 150);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));

        let c = TimeWindow::new(100, 200); // touching but not overlapping
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_quadrice_derivation() {
        let p = DayPriorities::default();
        let quad = p.quadrice();
        assert_eq!(quad.len(), 6);
        // First once entry is [3]: every other once day, in once order
        assert_eq!(quad[0], vec![6, 1, 5, 2, 4]);
        assert_eq!(quad[1], vec![3, 1, 5, 2, 4]);
        assert!(quad.iter().all(|s| s.len() == 5));
    }

    #[test]
    fn test_for_meetings() {
        let p = DayPriorities::default();
        assert_eq!(p.for_meetings(1), p.once);
        assert_eq!(p.for_meetings(2)[0], vec![2, 4]);
        assert_eq!(p.for_meetings(3)[1], vec![2, 4, 6]);
        assert_eq!(p.for_meetings(5), vec![vec![1, 2, 3, 4, 5]]);
        assert_eq!(p.for_meetings(6), vec![vec![1, 2, 3, 4, 5, 6]]);
        assert!(p.for_meetings(0).is_empty());
        assert!(p.for_meetings(7).is_empty());
    }
}
