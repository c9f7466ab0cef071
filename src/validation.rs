//! Input and output validation for timetables.
//!
//! [`validate_params`] checks structural integrity of a generation input
//! before scheduling. Detects:
//! - Duplicate IDs
//! - Room types missing from the settings catalog
//! - References to unknown courses
//! - Weekly meeting counts without a day-priority table
//! - Session lengths that do not fit the slot grid
//! - Malformed settings
//!
//! [`validate_timetable`] checks a generated timetable for double
//! bookings, exceeded daily ceilings, split pair groups and activities
//! outside the day window.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::models::{PairKey, Timetable, TimetableParams, Week};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities of the same kind share an ID.
    DuplicateId,
    /// A room or course references a room type outside the catalog.
    UnknownRoomType,
    /// An instructor or section references a course that doesn't exist.
    UnknownCourse,
    /// A course meets a number of times per week with no priority table.
    InvalidMeetings,
    /// A session length is zero or not a multiple of the slot interval.
    InvalidDuration,
    /// The settings describe an unusable slot grid.
    InvalidSettings,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates a generation input.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_params(params: &TimetableParams) -> ValidationResult {
    let mut errors = Vec::new();
    let settings = &params.settings;

    if let Err(e) = settings.validate() {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidSettings,
            e.to_string(),
        ));
    }

    check_duplicates("room", params.rooms.iter().map(|r| &r.id), &mut errors);
    check_duplicates("course", params.courses.iter().map(|c| &c.id), &mut errors);
    check_duplicates(
        "instructor",
        params.instructors.iter().map(|i| &i.id),
        &mut errors,
    );
    check_duplicates("section", params.sections.iter().map(|s| &s.id), &mut errors);

    for room in &params.rooms {
        if settings.room_type(&room.room_type.id).is_none() {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownRoomType,
                format!(
                    "Room '{}' has unknown room type '{}'",
                    room.id, room.room_type.id
                ),
            ));
        }
    }

    let course_ids: HashSet<&str> = params.courses.iter().map(|c| c.id.as_str()).collect();
    for course in &params.courses {
        for t in &course.compatible_room_types {
            if settings.room_type(&t.id).is_none() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownRoomType,
                    format!("Course '{}' accepts unknown room type '{}'", course.id, t.id),
                ));
            }
        }
        if !(1..=6).contains(&course.weekly_meetings) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidMeetings,
                format!(
                    "Course '{}' meets {} times per week (expected 1-6)",
                    course.id, course.weekly_meetings
                ),
            ));
        }
        let minutes = course.minutes_per_session;
        if minutes == 0 || (settings.interval > 0 && minutes % settings.interval != 0) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidDuration,
                format!(
                    "Course '{}' session of {} minutes does not fit a {}-minute grid",
                    course.id, minutes, settings.interval
                ),
            ));
        }
    }

    for instructor in &params.instructors {
        for c in &instructor.compatible_courses {
            if !course_ids.contains(c.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownCourse,
                    format!("Instructor '{}' references unknown course '{}'", instructor.id, c),
                ));
            }
        }
    }
    for section in &params.sections {
        for c in &section.section_courses {
            if !course_ids.contains(c.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownCourse,
                    format!("Section '{}' references unknown course '{}'", section.id, c),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_duplicates<'a>(
    what: &str,
    ids: impl Iterator<Item = &'a String>,
    errors: &mut Vec<ValidationError>,
) {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate {what} ID: {id}"),
            ));
        }
    }
}

/// A property violated by a timetable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    /// Type of violation.
    pub violation_type: ViolationType,
    /// Related entity ID (room, instructor, section or course).
    pub entity_id: String,
    /// Human-readable description.
    pub message: String,
    /// Severity (0-100, higher = worse).
    pub severity: i32,
}

/// Classification of timetable violations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationType {
    /// Two activities overlap in one entity's day.
    DoubleBooking,
    /// A day holds more minutes than its ceiling.
    DailyCeilingExceeded,
    /// Members of one pair group have different instructors.
    SplitPair,
    /// An activity lies outside the day window.
    OutOfWindow,
}

impl Violation {
    /// Creates a double booking violation.
    pub fn double_booking(entity_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            violation_type: ViolationType::DoubleBooking,
            entity_id: entity_id.into(),
            message: message.into(),
            severity: 95,
        }
    }

    /// Creates a daily ceiling violation.
    pub fn daily_ceiling_exceeded(
        entity_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            violation_type: ViolationType::DailyCeilingExceeded,
            entity_id: entity_id.into(),
            message: message.into(),
            severity: 80,
        }
    }

    /// Creates a split pair violation.
    pub fn split_pair(course_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            violation_type: ViolationType::SplitPair,
            entity_id: course_id.into(),
            message: message.into(),
            severity: 70,
        }
    }

    /// Creates an out-of-window violation.
    pub fn out_of_window(activity_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            violation_type: ViolationType::OutOfWindow,
            entity_id: activity_id.into(),
            message: message.into(),
            severity: 90,
        }
    }
}

/// Checks a timetable for violated properties.
///
/// Returns an empty list for a consistent timetable.
pub fn validate_timetable(timetable: &Timetable) -> Vec<Violation> {
    let mut violations = Vec::new();

    let weeks = timetable
        .rooms
        .iter()
        .map(|r| (&r.id, &r.scheds))
        .chain(timetable.instructors.iter().map(|i| (&i.id, &i.scheds)))
        .chain(timetable.sections.iter().map(|s| (&s.id, &s.scheds)));
    for (id, week) in weeks {
        check_week(id, week, &mut violations);
    }

    let mut staff: HashMap<PairKey, HashSet<Option<&str>>> = HashMap::new();
    for a in &timetable.activities {
        staff
            .entry(a.pair_key())
            .or_default()
            .insert(a.instructor_id.as_deref());
    }
    for (key, instructors) in &staff {
        if instructors.len() > 1 {
            violations.push(Violation::split_pair(
                key.course_id.clone(),
                format!(
                    "Offering {} of '{}' has {} different instructors",
                    key.instance,
                    key.course_id,
                    instructors.len()
                ),
            ));
        }
    }

    let settings = &timetable.settings;
    for a in &timetable.activities {
        if a.start_time < settings.day_start || a.end() > settings.day_end {
            violations.push(Violation::out_of_window(
                a.id.clone(),
                format!(
                    "Activity '{}' at {}..{} is outside {}..{}",
                    a.id,
                    a.start_time,
                    a.end(),
                    settings.day_start,
                    settings.day_end
                ),
            ));
        }
    }

    violations
}

fn check_week(entity_id: &str, week: &Week, violations: &mut Vec<Violation>) {
    for day in week.iter() {
        for group in day.get_conflicts() {
            let ids: Vec<&str> = group.iter().map(|r| r.activity_id.as_str()).collect();
            violations.push(Violation::double_booking(
                entity_id,
                format!("Day {} overlaps: {}", day.day, ids.join(", ")),
            ));
        }
        if day.total_occupied_minutes > day.ceiling {
            violations.push(Violation::daily_ceiling_exceeded(
                entity_id,
                format!(
                    "Day {} holds {} minutes (ceiling {})",
                    day.day, day.total_occupied_minutes, day.ceiling
                ),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Activity, Course, Instructor, Room, RoomType, Section, Settings};

    fn sample_params() -> TimetableParams {
        let settings = Settings::default();
        let normal = settings.room_type("normal").cloned().unwrap();
        TimetableParams::new(settings.clone())
            .with_room(Room::new("R1", normal.clone(), &settings))
            .with_course(Course::new("MATH", 60).with_room_type(normal))
            .with_instructor(Instructor::new("T1", &settings).with_course("MATH"))
            .with_section(Section::new("S1", &settings).with_course("MATH"))
    }

    #[test]
    fn test_valid_input() {
        assert!(validate_params(&sample_params()).is_ok());
    }

    #[test]
    fn test_duplicate_ids() {
        let settings = Settings::default();
        let params = sample_params()
            .with_section(Section::new("S1", &settings))
            .with_course(Course::new("MATH", 60));

        let errors = validate_params(&params).unwrap_err();
        let dups: Vec<_> = errors
            .iter()
            .filter(|e| e.kind == ValidationErrorKind::DuplicateId)
            .collect();
        assert_eq!(dups.len(), 2);
        assert!(dups.iter().any(|e| e.message.contains("section")));
    }

    #[test]
    fn test_unknown_references() {
        let settings = Settings::default();
        let lab = RoomType::new("lab", "Lab");
        let params = sample_params()
            .with_room(Room::new("L1", lab, &settings))
            .with_section(Section::new("S2", &settings).with_course("NOPE"));

        let errors = validate_params(&params).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::UnknownRoomType && e.message.contains("L1")));
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::UnknownCourse && e.message.contains("NOPE")));
    }

    #[test]
    fn test_bad_course_shape() {
        let params = sample_params()
            .with_course(Course::new("LONG", 45))
            .with_course(Course::new("ZERO", 0))
            .with_course(Course::new("DAILY", 60).with_weekly_meetings(7));

        let errors = validate_params(&params).unwrap_err();
        let durations = errors
            .iter()
            .filter(|e| e.kind == ValidationErrorKind::InvalidDuration)
            .count();
        assert_eq!(durations, 2);
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::InvalidMeetings));
    }

    #[test]
    fn test_invalid_settings() {
        let mut params = sample_params();
        params.settings = params.settings.with_interval(0);
        let errors = validate_params(&params).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::InvalidSettings));
    }

    fn attach(tt: &mut Timetable, a: Activity) {
        tt.rooms[0].scheds.day_mut(a.day).unwrap().add_existing_activity(&a);
        tt.activities.insert(a);
    }

    #[test]
    fn test_consistent_timetable() {
        let mut tt = Timetable::from_params(sample_params());
        attach(&mut tt, Activity::new("A1", "MATH", 1, 420, 60).with_room("R1"));
        attach(&mut tt, Activity::new("A2", "MATH", 1, 480, 60).with_room("R1"));
        assert!(validate_timetable(&tt).is_empty());
    }

    #[test]
    fn test_double_booking() {
        let mut tt = Timetable::from_params(sample_params());
        attach(&mut tt, Activity::new("A1", "MATH", 1, 420, 60).with_room("R1"));
        attach(&mut tt, Activity::new("A2", "MATH", 1, 450, 60).with_room("R1"));

        let v = validate_timetable(&tt);
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].violation_type, ViolationType::DoubleBooking);
        assert_eq!(v[0].entity_id, "R1");
    }

    #[test]
    fn test_daily_ceiling_exceeded() {
        let mut params = sample_params();
        params.settings = params.settings.with_daily_ceiling(60);
        let mut tt = Timetable::from_params(params);
        tt.rooms[0].scheds = crate::models::DaySched::create_week(
            &tt.settings,
            crate::models::EntityKind::Room,
        );
        attach(&mut tt, Activity::new("A1", "MATH", 1, 420, 60).with_room("R1"));
        attach(&mut tt, Activity::new("A2", "MATH", 1, 480, 60).with_room("R1"));

        let v = validate_timetable(&tt);
        assert!(v
            .iter()
            .any(|v| v.violation_type == ViolationType::DailyCeilingExceeded));
    }

    #[test]
    fn test_split_pair() {
        let mut tt = Timetable::from_params(sample_params());
        tt.activities.insert(
            Activity::new("A1", "MATH", 2, 420, 60)
                .with_instance(1)
                .with_room("R1")
                .with_instructor("T1"),
        );
        tt.activities.insert(
            Activity::new("A2", "MATH", 4, 420, 60)
                .with_instance(1)
                .with_room("R1"),
        );

        let v = validate_timetable(&tt);
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].violation_type, ViolationType::SplitPair);
        assert_eq!(v[0].entity_id, "MATH");
    }

    #[test]
    fn test_out_of_window() {
        let mut tt = Timetable::from_params(sample_params());
        tt.activities
            .insert(Activity::new("A1", "MATH", 1, 1110, 60).with_room("R1"));

        let v = validate_timetable(&tt);
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].violation_type, ViolationType::OutOfWindow);
    }
}
