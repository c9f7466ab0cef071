//! Section (student group) model.
//!
//! A section requires a set of courses; each required course must
//! eventually be attended `weekly_meetings` times per week.

use serde::{Deserialize, Serialize};

use super::day_sched::{DaySched, Week};
use super::settings::{EntityKind, Settings};

/// A student group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    /// Unique section label.
    pub id: String,
    /// Year level (1-based).
    pub year_level: u32,
    /// Ids of required courses.
    pub section_courses: Vec<String>,
    /// Day schedules, Monday through Sunday.
    pub scheds: Week,
}

impl Section {
    /// Creates a first-year section with no courses.
    pub fn new(id: impl Into<String>, settings: &Settings) -> Self {
        Self {
            id: id.into(),
            year_level: 1,
            section_courses: Vec::new(),
            scheds: DaySched::create_week(settings, EntityKind::Section),
        }
    }

    /// Sets the year level.
    pub fn with_year_level(mut self, year_level: u32) -> Self {
        self.year_level = year_level;
        self
    }

    /// Adds a required course (ignored if already present).
    pub fn with_course(mut self, course_id: impl Into<String>) -> Self {
        let course_id = course_id.into();
        if !self.section_courses.contains(&course_id) {
            self.section_courses.push(course_id);
        }
        self
    }

    /// Whether the section requires the course.
    pub fn requires(&self, course_id: &str) -> bool {
        self.section_courses.iter().any(|c| c == course_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_builder() {
        let settings = Settings::default();
        let s = Section::new("BSCS-1A", &settings)
            .with_year_level(2)
            .with_course("MATH")
            .with_course("MATH")
            .with_course("PHYS");

        assert_eq!(s.id, "BSCS-1A");
        assert_eq!(s.year_level, 2);
        assert_eq!(s.section_courses.len(), 2);
        assert!(s.requires("PHYS"));
        assert!(!s.requires("CHEM"));
        assert!(s.scheds.iter().all(|d| d.kind == EntityKind::Section));
    }
}
