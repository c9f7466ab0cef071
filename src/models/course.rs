//! Course model.
//!
//! A course is taught in sessions of `minutes_per_session`, `weekly_meetings`
//! times per week, in rooms of compatible types. The activities created
//! for it across all rooms are tracked in `course_classes`, in creation order.

use serde::{Deserialize, Serialize};

use super::RoomType;

/// A course to be scheduled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    /// Unique course identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Length of one session (minutes).
    pub minutes_per_session: u32,
    /// Sessions per week (1..=6).
    pub weekly_meetings: u32,
    /// Parallel offerings to place before any retry slack.
    ///
    /// Generation overwrites it with the number of sections requiring the
    /// course.
    pub classes_offered: u32,
    /// Room types this course may be held in.
    pub compatible_room_types: Vec<RoomType>,
    /// Activity ids of this course, in creation order.
    pub course_classes: Vec<String>,
}

impl Course {
    /// Creates a once-weekly course.
    pub fn new(id: impl Into<String>, minutes_per_session: u32) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            minutes_per_session,
            weekly_meetings: 1,
            classes_offered: 0,
            compatible_room_types: Vec::new(),
            course_classes: Vec::new(),
        }
    }

    /// Sets the course name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the number of sessions per week.
    pub fn with_weekly_meetings(mut self, meetings: u32) -> Self {
        self.weekly_meetings = meetings;
        self
    }

    /// Sets the requested number of offerings.
    pub fn with_classes_offered(mut self, classes: u32) -> Self {
        self.classes_offered = classes;
        self
    }

    /// Adds a compatible room type (ignored if already present).
    pub fn with_room_type(mut self, room_type: RoomType) -> Self {
        if !self.compatible_room_types.contains(&room_type) {
            self.compatible_room_types.push(room_type);
        }
        self
    }

    /// Total teaching minutes per week for one offering.
    pub fn weekly_minutes(&self) -> u32 {
        self.minutes_per_session.saturating_mul(self.weekly_meetings)
    }

    /// Whether rooms of this type can host the course.
    pub fn accepts_room_type(&self, room_type: &RoomType) -> bool {
        self.compatible_room_types.contains(room_type)
    }
}
