//! Instructor model.
//!
//! Instructors teach the courses they are compatible with, subject to a
//! daily ceiling (enforced through their day schedules) and a weekly cap
//! on total teaching minutes.

use serde::{Deserialize, Serialize};

use super::day_sched::{DaySched, Week};
use super::settings::{EntityKind, Settings};

/// An instructor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instructor {
    /// Unique instructor identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Ids of courses this instructor can teach.
    pub compatible_courses: Vec<String>,
    /// Day schedules, Monday through Sunday.
    pub scheds: Week,
    /// Teaching minutes assigned this week.
    pub total_minutes: u32,
    /// Weekly cap on teaching minutes (`u32::MAX` = unbounded).
    pub max_minutes: u32,
}

impl Instructor {
    /// Creates an instructor with no load and no weekly cap.
    pub fn new(id: impl Into<String>, settings: &Settings) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            compatible_courses: Vec::new(),
            scheds: DaySched::create_week(settings, EntityKind::Instructor),
            total_minutes: 0,
            max_minutes: u32::MAX,
        }
    }

    /// Sets the instructor name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Adds a course this instructor can teach (ignored if already present).
    pub fn with_course(mut self, course_id: impl Into<String>) -> Self {
        let course_id = course_id.into();
        if !self.compatible_courses.contains(&course_id) {
            self.compatible_courses.push(course_id);
        }
        self
    }

    /// Sets the weekly cap.
    pub fn with_max_minutes(mut self, minutes: u32) -> Self {
        self.max_minutes = minutes;
        self
    }

    /// Whether the instructor can teach the course.
    pub fn can_teach(&self, course_id: &str) -> bool {
        self.compatible_courses.iter().any(|c| c == course_id)
    }

    /// Whether `minutes` more still fit under the weekly cap.
    pub fn has_capacity(&self, minutes: u32) -> bool {
        self.total_minutes.saturating_add(minutes) <= self.max_minutes
    }

    /// Adds teaching minutes. Returns `false` (and changes nothing) if the
    /// weekly cap would be exceeded.
    pub fn add_minutes(&mut self, minutes: u32) -> bool {
        if !self.has_capacity(minutes) {
            return false;
        }
        self.total_minutes += minutes;
        true
    }

    /// Clears the week and the minute counter.
    pub fn reset(&mut self) {
        self.scheds.reset();
        self.total_minutes = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instructor_builder() {
        let settings = Settings::default();
        let t = Instructor::new("T1", &settings)
            .with_name("Ada")
            .with_course("MATH")
            .with_course("MATH")
            .with_course("PHYS");

        assert_eq!(t.name, "Ada");
        assert_eq!(t.compatible_courses, vec!["MATH", "PHYS"]);
        assert!(t.can_teach("PHYS"));
        assert!(!t.can_teach("CHEM"));
        assert_eq!(t.max_minutes, u32::MAX);
    }

    #[test]
    fn test_add_minutes_respects_cap() {
        let settings = Settings::default();
        let mut t = Instructor::new("T1", &settings).with_max_minutes(120);
        assert!(t.add_minutes(60));
        assert!(t.add_minutes(60));
        assert!(!t.add_minutes(30));
        assert_eq!(t.total_minutes, 120);

        t.reset();
        assert_eq!(t.total_minutes, 0);
        assert!(t.has_capacity(120));
    }
}
