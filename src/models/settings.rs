//! Timetable settings.
//!
//! Immutable for the duration of a generation run: slot granularity,
//! the daily window, excluded periods, day-priority tables, daily workload
//! ceilings and the room-type catalog.
//!
//! Settings deserialize with `#[serde(default)]`, so a stored settings
//! object missing fields is completed from [`Settings::default`]. Older
//! stored keys (`start`, `end`, `exlude_periods`, `include_sat`,
//! `*_prio`, `max_*_minutes_per_day`) are accepted as aliases.

use serde::{Deserialize, Serialize};

use super::calendar::{Day, DayPriorities, Weekday};
use super::RoomType;
use crate::error::TimetableError;

/// The kind of entity owning a day schedule.
///
/// Determines which daily ceiling applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Room,
    Instructor,
    Section,
}

/// Configuration for timetable generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Minutes per slot.
    pub interval: u32,
    /// First minute of the day window.
    #[serde(alias = "start")]
    pub day_start: u32,
    /// End of the day window (exclusive).
    #[serde(alias = "end")]
    pub day_end: u32,
    /// Slot start offsets (minutes from midnight) that are never available.
    #[serde(alias = "exlude_periods", alias = "exclude_periods")]
    pub excluded_periods: Vec<u32>,
    /// Whether Saturday may host classes.
    #[serde(alias = "include_sat")]
    pub include_saturday: bool,
    /// Weekday subsets per weekly-meeting count, stored as top-level
    /// `once`/`twice`/`thrice` keys.
    #[serde(flatten)]
    pub day_priorities: DayPriorities,
    /// Daily ceiling of occupied minutes per room.
    #[serde(alias = "max_room_minutes_per_day")]
    pub max_room_minutes: u32,
    /// Daily ceiling of teaching minutes per instructor.
    #[serde(alias = "max_instructor_minutes_per_day")]
    pub max_instructor_minutes: u32,
    /// Daily ceiling of class minutes per section.
    #[serde(alias = "max_student_minutes_per_day")]
    pub max_section_minutes: u32,
    /// Room-type catalog.
    pub room_types: Vec<RoomType>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            interval: 30,
            day_start: 420,  // 07:00
            day_end: 1140,   // 19:00
            excluded_periods: vec![720, 750], // 12:00, 12:30
            include_saturday: true,
            day_priorities: DayPriorities::default(),
            max_room_minutes: 480,
            max_instructor_minutes: 480,
            max_section_minutes: 480,
            room_types: vec![
                RoomType::new("normal", "Normal").with_color("#555555"),
                RoomType::new("large", "Large").with_color("#1E1B18"),
                RoomType::new("science-lab", "ScienceLab").with_color("#2D9E61"),
                RoomType::new("com-lab", "ComLab").with_color("#A78BFB"),
            ],
        }
    }
}

impl Settings {
    /// Creates the default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the slot interval (minutes).
    pub fn with_interval(mut self, interval: u32) -> Self {
        self.interval = interval;
        self
    }

    /// Sets the day window.
    pub fn with_day_window(mut self, day_start: u32, day_end: u32) -> Self {
        self.day_start = day_start;
        self.day_end = day_end;
        self
    }

    /// Replaces the excluded periods.
    pub fn with_excluded_periods(mut self, periods: Vec<u32>) -> Self {
        self.excluded_periods = periods;
        self
    }

    /// Enables or disables Saturday classes.
    pub fn with_saturday(mut self, include: bool) -> Self {
        self.include_saturday = include;
        self
    }

    /// Replaces the day-priority tables.
    pub fn with_day_priorities(mut self, priorities: DayPriorities) -> Self {
        self.day_priorities = priorities;
        self
    }

    /// Sets all three daily ceilings at once.
    pub fn with_daily_ceiling(mut self, minutes: u32) -> Self {
        self.max_room_minutes = minutes;
        self.max_instructor_minutes = minutes;
        self.max_section_minutes = minutes;
        self
    }

    /// Replaces the room-type catalog.
    pub fn with_room_types(mut self, room_types: Vec<RoomType>) -> Self {
        self.room_types = room_types;
        self
    }

    /// Daily ceiling for an entity kind.
    pub fn daily_ceiling(&self, kind: EntityKind) -> u32 {
        match kind {
            EntityKind::Room => self.max_room_minutes,
            EntityKind::Instructor => self.max_instructor_minutes,
            EntityKind::Section => self.max_section_minutes,
        }
    }

    /// Number of interval-sized slots in the day window.
    pub fn slot_count(&self) -> usize {
        if self.interval == 0 {
            return 0;
        }
        (self.day_end.saturating_sub(self.day_start) / self.interval) as usize
    }

    /// Looks up a catalog room type by identifier.
    pub fn room_type(&self, id: &str) -> Option<&RoomType> {
        self.room_types.iter().find(|t| t.id == id)
    }

    /// Priority day subsets usable for a weekly-meeting count.
    ///
    /// Subsets touching Saturday are dropped when Saturday is excluded.
    pub fn day_subsets(&self, meetings: u32) -> Vec<Vec<Day>> {
        let saturday = Weekday::Saturday.number();
        self.day_priorities
            .for_meetings(meetings)
            .into_iter()
            .filter(|subset| self.include_saturday || !subset.contains(&saturday))
            .collect()
    }

    /// Checks that the slot grid is well formed.
    pub fn validate(&self) -> Result<(), TimetableError> {
        if self.interval == 0 {
            return Err(TimetableError::invalid_settings("interval must be positive"));
        }
        if self.day_start >= self.day_end {
            return Err(TimetableError::invalid_settings(format!(
                "day window {}..{} is empty",
                self.day_start, self.day_end
            )));
        }
        if (self.day_end - self.day_start) % self.interval != 0 {
            return Err(TimetableError::invalid_settings(format!(
                "interval {} does not divide day window {}..{}",
                self.interval, self.day_start, self.day_end
            )));
        }
        Ok(())
    }
}
