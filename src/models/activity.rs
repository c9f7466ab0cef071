//! Activity (class meeting) model.
//!
//! An activity is one concrete weekly meeting of a course offering, placed
//! at a specific day and time. It is progressively annotated by the engine:
//! room during course placement, then instructor, then section.
//!
//! Activities reference every other entity by identifier only, so a
//! timetable stays serializable without back-pointers.
//!
//! # Pairing
//! Activities sharing `(instance, course_id, room_id)` form a pair group:
//! the meetings of one weekly offering across the days of one priority
//! subset. Pair groups are assigned to instructors all-or-nothing.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::calendar::{Day, TimeWindow};

/// A placed (or candidate) class meeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    /// Unique activity identifier.
    pub id: String,
    /// Start time (minutes from midnight).
    pub start_time: u32,
    /// Length in minutes (a multiple of the slot interval).
    pub duration: u32,
    /// Day number (1 = Monday … 7 = Sunday).
    pub day: Day,
    /// Ordinal of the weekly offering this meeting belongs to.
    pub instance: u32,
    /// Course taught.
    pub course_id: String,
    /// Room hosting the meeting.
    pub room_id: Option<String>,
    /// Instructor teaching the meeting.
    pub instructor_id: Option<String>,
    /// Section attending the meeting.
    pub section_id: Option<String>,
}

/// Key identifying a pair group.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PairKey {
    pub instance: u32,
    pub course_id: String,
    pub room_id: Option<String>,
}

impl Activity {
    /// Creates an unassigned activity.
    pub fn new(
        id: impl Into<String>,
        course_id: impl Into<String>,
        day: Day,
        start_time: u32,
        duration: u32,
    ) -> Self {
        Self {
            id: id.into(),
            start_time,
            duration,
            day,
            instance: 0,
            course_id: course_id.into(),
            room_id: None,
            instructor_id: None,
            section_id: None,
        }
    }

    /// Sets the offering instance.
    pub fn with_instance(mut self, instance: u32) -> Self {
        self.instance = instance;
        self
    }

    /// Sets the room.
    pub fn with_room(mut self, room_id: impl Into<String>) -> Self {
        self.room_id = Some(room_id.into());
        self
    }

    /// Sets the instructor.
    pub fn with_instructor(mut self, instructor_id: impl Into<String>) -> Self {
        self.instructor_id = Some(instructor_id.into());
        self
    }

    /// Sets the section.
    pub fn with_section(mut self, section_id: impl Into<String>) -> Self {
        self.section_id = Some(section_id.into());
        self
    }

    /// End time (exclusive).
    #[inline]
    pub fn end(&self) -> u32 {
        self.start_time.saturating_add(self.duration)
    }

    /// The [start, end) window of this meeting.
    #[inline]
    pub fn window(&self) -> TimeWindow {
        TimeWindow::from_duration(self.start_time, self.duration)
    }

    /// Whether two activities occupy the same time on the same day.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.day == other.day && self.window().overlaps(&other.window())
    }

    /// Pair group key.
    pub fn pair_key(&self) -> PairKey {
        PairKey {
            instance: self.instance,
            course_id: self.course_id.clone(),
            room_id: self.room_id.clone(),
        }
    }

    /// Whether `other` belongs to the same pair group.
    pub fn is_pair_of(&self, other: &Self) -> bool {
        self.instance == other.instance
            && self.course_id == other.course_id
            && self.room_id == other.room_id
    }
}

/// Identifier reference to an activity held by a day schedule.
///
/// Carries the time window so that occupancy checks never need the
/// owning timetable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRef {
    /// Referenced activity identifier.
    pub activity_id: String,
    /// Start time (minutes from midnight).
    pub start_time: u32,
    /// Length in minutes.
    pub duration: u32,
}

impl ActivityRef {
    /// End time (exclusive).
    #[inline]
    pub fn end(&self) -> u32 {
        self.start_time.saturating_add(self.duration)
    }

    /// The [start, end) window.
    #[inline]
    pub fn window(&self) -> TimeWindow {
        TimeWindow::from_duration(self.start_time, self.duration)
    }
}

impl From<&Activity> for ActivityRef {
    fn from(activity: &Activity) -> Self {
        Self {
            activity_id: activity.id.clone(),
            start_time: activity.start_time,
            duration: activity.duration,
        }
    }
}

/// Insertion-ordered activity collection with O(1) lookup by id.
///
/// The single source of truth for all activities of a timetable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Activity>", into = "Vec<Activity>")]
pub struct ActivitySet {
    items: Vec<Activity>,
    index: HashMap<String, usize>,
}

impl ActivitySet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of activities.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates activities in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Activity> {
        self.items.iter()
    }

    /// Looks up an activity.
    pub fn get(&self, id: &str) -> Option<&Activity> {
        self.index.get(id).map(|&i| &self.items[i])
    }

    /// Looks up an activity mutably.
    ///
    /// Callers must not change the `id`.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut Activity> {
        match self.index.get(id) {
            Some(&i) => self.items.get_mut(i),
            None => None,
        }
    }

    /// Whether an activity with this id exists.
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Inserts an activity. Returns `false` (and leaves the set unchanged)
    /// if the id is already present.
    pub fn insert(&mut self, activity: Activity) -> bool {
        if self.index.contains_key(&activity.id) {
            return false;
        }
        self.index.insert(activity.id.clone(), self.items.len());
        self.items.push(activity);
        true
    }

    /// Removes an activity by id.
    pub fn remove(&mut self, id: &str) -> Option<Activity> {
        let i = self.index.remove(id)?;
        let removed = self.items.remove(i);
        self.reindex();
        Some(removed)
    }

    /// Keeps only activities matching the predicate.
    pub fn retain(&mut self, f: impl FnMut(&Activity) -> bool) {
        self.items.retain(f);
        self.reindex();
    }

    /// Removes every activity.
    pub fn clear(&mut self) {
        self.items.clear();
        self.index.clear();
    }

    fn reindex(&mut self) {
        self.index = self
            .items
            .iter()
            .enumerate()
            .map(|(i, a)| (a.id.clone(), i))
            .collect();
    }
}

impl From<Vec<Activity>> for ActivitySet {
    fn from(activities: Vec<Activity>) -> Self {
        let mut set = Self::new();
        for a in activities {
            set.insert(a);
        }
        set
    }
}

impl From<ActivitySet> for Vec<Activity> {
    fn from(set: ActivitySet) -> Self {
        set.items
    }
}

impl<'a> IntoIterator for &'a ActivitySet {
    type Item = &'a Activity;
    type IntoIter = std::slice::Iter<'a, Activity>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
