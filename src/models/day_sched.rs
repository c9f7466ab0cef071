//! Day schedule: one day's slot-occupancy ledger for one entity.
//!
//! The day window `[period_start, period_end)` is divided into
//! interval-sized slots. `is_vacant[i]` covers the slot starting at
//! `period_start + i * interval`. Slots at excluded periods start (and
//! stay, across resets) occupied.
//!
//! # Allocation
//! New meetings are allocated by a greedy skip-ahead cursor: scanning
//! starts at `current_vacant`; when an occupied slot is hit, the scan
//! restarts just past it. The cursor never moves backwards within a pass,
//! so this is restart-from-cursor first-fit, not a best fit over the day.
//! Existing meetings (instructor and section assignment) are attached at
//! their fixed time without touching the cursor.

use serde::{Deserialize, Serialize};

use super::activity::{Activity, ActivityRef};
use super::calendar::{Day, TimeWindow, Weekday};
use super::settings::{EntityKind, Settings};

/// One day's vacancy bitmap and activity list for a room, instructor or section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaySched {
    /// Day number (1 = Monday … 7 = Sunday).
    pub day: Day,
    /// Owner kind; selects the daily ceiling.
    pub kind: EntityKind,
    /// First minute of the window.
    pub period_start: u32,
    /// End of the window (exclusive).
    pub period_end: u32,
    /// Minutes per slot.
    pub interval: u32,
    /// Daily ceiling of occupied minutes.
    pub ceiling: u32,
    /// Slot vacancy.
    pub is_vacant: Vec<bool>,
    /// Activities scheduled on this day for the owner.
    pub activities: Vec<ActivityRef>,
    /// Next candidate start (minutes) for new allocations.
    pub current_vacant: u32,
    /// Sum of durations of attached activities.
    pub total_occupied_minutes: u32,
    /// Vacancy with only excluded periods applied.
    baseline: Vec<bool>,
}

impl DaySched {
    /// Creates an empty day schedule from the settings' day window.
    pub fn new(day: Day, kind: EntityKind, settings: &Settings) -> Self {
        let period_start = settings.day_start;
        let interval = settings.interval;
        let baseline: Vec<bool> = (0..settings.slot_count())
            .map(|i| {
                let slot_start = period_start + interval * i as u32;
                !settings.excluded_periods.contains(&slot_start)
            })
            .collect();

        Self {
            day,
            kind,
            period_start,
            period_end: settings.day_end,
            interval,
            ceiling: settings.daily_ceiling(kind),
            is_vacant: baseline.clone(),
            activities: Vec::new(),
            current_vacant: period_start,
            total_occupied_minutes: 0,
            baseline,
        }
    }

    /// Creates the seven day schedules of one entity.
    pub fn create_week(settings: &Settings, kind: EntityKind) -> Week {
        Week {
            days: Weekday::ALL
                .iter()
                .map(|d| Self::new(d.number(), kind, settings))
                .collect(),
        }
    }

    /// Number of slots in the window.
    #[inline]
    pub fn number_of_periods(&self) -> usize {
        self.is_vacant.len()
    }

    /// Clears activities and occupancy back to the excluded-period baseline.
    pub fn reset(&mut self) {
        self.is_vacant.clone_from(&self.baseline);
        self.activities.clear();
        self.current_vacant = self.period_start;
        self.total_occupied_minutes = 0;
    }

    /// Whether a meeting of `duration` minutes can still be allocated
    /// from the cursor onwards.
    pub fn check_conflict(&self, duration: u32) -> bool {
        self.find_slot(duration).is_some()
    }

    /// Allocates a new meeting at the first fit from the cursor.
    ///
    /// On success the covering slots are marked occupied and the cursor
    /// moves to the end of the new meeting.
    pub fn add_activity(
        &mut self,
        course_id: &str,
        duration: u32,
        instance: u32,
        room_id: &str,
    ) -> Option<Activity> {
        let index = self.find_slot(duration)?;
        let start = self.slot_start(index);
        let activity = Activity::new(
            format!("{course_id}-{instance}-{}", self.day),
            course_id,
            self.day,
            start,
            duration,
        )
        .with_instance(instance)
        .with_room(room_id);

        self.mark(index, self.slots_for(duration).unwrap_or(0), false);
        self.activities.push(ActivityRef::from(&activity));
        self.total_occupied_minutes = self.total_occupied_minutes.saturating_add(duration);
        self.current_vacant = start + duration;
        Some(activity)
    }

    /// Whether the interval `[start, start + duration)` is inside the
    /// window and fully vacant.
    pub fn check_vacant(&self, start: u32, duration: u32) -> bool {
        match self.slot_range(start, duration) {
            Some((first, count)) => self.is_vacant[first..first + count].iter().all(|&v| v),
            None => false,
        }
    }

    /// Whether the interval lies entirely inside the window.
    pub fn contains_window(&self, start: u32, duration: u32) -> bool {
        self.slot_range(start, duration).is_some()
    }

    /// Attaches an already-created activity at its own time.
    ///
    /// Marks its slots occupied and counts its minutes. The cursor is
    /// left untouched. Slots outside the window are ignored.
    pub fn add_existing_activity(&mut self, activity: &Activity) {
        if let Some((first, count)) = self.slot_range_clamped(activity.start_time, activity.duration) {
            self.mark(first, count, false);
        }
        self.activities.push(ActivityRef::from(activity));
        self.total_occupied_minutes = self
            .total_occupied_minutes
            .saturating_add(activity.duration);
    }

    /// Detaches an activity, freeing slots no other attached activity covers.
    pub fn remove_activity(&mut self, activity_id: &str) -> Option<ActivityRef> {
        let pos = self
            .activities
            .iter()
            .position(|r| r.activity_id == activity_id)?;
        let removed = self.activities.remove(pos);
        self.total_occupied_minutes = self
            .total_occupied_minutes
            .saturating_sub(removed.duration);

        if let Some((first, count)) = self.slot_range_clamped(removed.start_time, removed.duration) {
            for i in first..first + count {
                let slot = TimeWindow::from_duration(self.slot_start(i), self.interval);
                let covered = self.activities.iter().any(|r| r.window().overlaps(&slot));
                self.is_vacant[i] = self.baseline[i] && !covered;
            }
        }
        Some(removed)
    }

    /// Whether adding `duration` more minutes stays within the daily ceiling.
    pub fn check_violation(&self, duration: u32) -> bool {
        self.total_occupied_minutes.saturating_add(duration) <= self.ceiling
    }

    /// Whether no attached activity overlaps (or equals) the given one.
    pub fn is_addable(&self, activity: &Activity) -> bool {
        let window = activity.window();
        !self.activities.iter().any(|r| {
            r.window().overlaps(&window)
                || (r.start_time == activity.start_time && r.duration == activity.duration)
        })
    }

    /// Groups of mutually overlapping attached activities.
    ///
    /// Only groups with two or more members are returned.
    pub fn get_conflicts(&self) -> Vec<Vec<ActivityRef>> {
        let mut sorted: Vec<&ActivityRef> = self.activities.iter().collect();
        sorted.sort_by_key(|r| (r.start_time, r.end()));

        let mut groups = Vec::new();
        let mut current: Vec<ActivityRef> = Vec::new();
        let mut current_end = 0;
        for r in sorted {
            if !current.is_empty() && r.start_time < current_end {
                current_end = current_end.max(r.end());
                current.push(r.clone());
                continue;
            }
            if current.len() > 1 {
                groups.push(std::mem::take(&mut current));
            }
            current.clear();
            current_end = r.end();
            current.push(r.clone());
        }
        if current.len() > 1 {
            groups.push(current);
        }
        groups
    }

    /// Minutes of the window not blocked by excluded periods.
    pub fn available_minutes(&self) -> u32 {
        self.baseline.iter().filter(|&&v| v).count() as u32 * self.interval
    }

    fn find_slot(&self, duration: u32) -> Option<usize> {
        let needed = self.slots_for(duration)?;
        let len = self.number_of_periods();
        let mut index = self.slot_index(self.current_vacant)?;

        while index + needed <= len {
            match (index..index + needed).find(|&i| !self.is_vacant[i]) {
                None => return Some(index),
                Some(occupied) => index = occupied + 1,
            }
        }
        None
    }

    fn slots_for(&self, duration: u32) -> Option<usize> {
        if duration == 0 || self.interval == 0 {
            return None;
        }
        Some(duration.div_ceil(self.interval) as usize)
    }

    fn slot_index(&self, minute: u32) -> Option<usize> {
        if self.interval == 0 || minute < self.period_start {
            return None;
        }
        Some(((minute - self.period_start) / self.interval) as usize)
    }

    fn slot_start(&self, index: usize) -> u32 {
        self.period_start + self.interval * index as u32
    }

    fn slot_range(&self, start: u32, duration: u32) -> Option<(usize, usize)> {
        let first = self.slot_index(start)?;
        let count = self.slots_for(duration)?;
        (first + count <= self.number_of_periods()).then_some((first, count))
    }

    fn slot_range_clamped(&self, start: u32, duration: u32) -> Option<(usize, usize)> {
        let first = self.slot_index(start)?;
        let count = self.slots_for(duration)?;
        let last = (first + count).min(self.number_of_periods());
        (first < last).then_some((first, last - first))
    }

    fn mark(&mut self, first: usize, count: usize, vacant: bool) {
        for slot in &mut self.is_vacant[first..first + count] {
            *slot = vacant;
        }
    }
}

/// The seven day schedules of one entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Week {
    days: Vec<DaySched>,
}

impl Week {
    /// Looks up the schedule for a day number.
    pub fn day(&self, day: Day) -> Option<&DaySched> {
        self.days.iter().find(|s| s.day == day)
    }

    /// Looks up the schedule for a day number mutably.
    pub fn day_mut(&mut self, day: Day) -> Option<&mut DaySched> {
        self.days.iter_mut().find(|s| s.day == day)
    }

    /// Iterates days in week order.
    pub fn iter(&self) -> impl Iterator<Item = &DaySched> {
        self.days.iter()
    }

    /// Iterates days mutably.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut DaySched> {
        self.days.iter_mut()
    }

    /// Resets every day.
    pub fn reset(&mut self) {
        self.days.iter_mut().for_each(DaySched::reset);
    }

    /// Detaches an activity from whichever day holds it.
    pub fn remove_activity(&mut self, activity_id: &str) -> Option<ActivityRef> {
        self.days
            .iter_mut()
            .find_map(|d| d.remove_activity(activity_id))
    }

    /// Whether any day holds the activity.
    pub fn contains_activity(&self, activity_id: &str) -> bool {
        self.days
            .iter()
            .any(|d| d.activities.iter().any(|r| r.activity_id == activity_id))
    }

    /// Total attached minutes across the week.
    pub fn total_minutes(&self) -> u32 {
        self.days
            .iter()
            .map(|d| d.total_occupied_minutes)
            .fold(0, u32::saturating_add)
    }
}
