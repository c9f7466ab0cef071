//! Timetable aggregate.
//!
//! A timetable owns the settings, the four entity collections and the
//! global activity set. The activity set is the single source of truth;
//! day schedules and course lists hold identifier references kept in sync
//! by the engine phases.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::activity::{Activity, ActivitySet};
use super::settings::{EntityKind, Settings};
use super::{Course, Instructor, Room, Section};

/// Input bundle for generation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimetableParams {
    pub rooms: Vec<Room>,
    pub courses: Vec<Course>,
    pub instructors: Vec<Instructor>,
    pub sections: Vec<Section>,
    pub settings: Settings,
}

impl TimetableParams {
    /// Creates an empty bundle with the given settings.
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }

    /// Adds a room.
    pub fn with_room(mut self, room: Room) -> Self {
        self.rooms.push(room);
        self
    }

    /// Adds a course.
    pub fn with_course(mut self, course: Course) -> Self {
        self.courses.push(course);
        self
    }

    /// Adds an instructor.
    pub fn with_instructor(mut self, instructor: Instructor) -> Self {
        self.instructors.push(instructor);
        self
    }

    /// Adds a section.
    pub fn with_section(mut self, section: Section) -> Self {
        self.sections.push(section);
        self
    }
}

/// Where a generation run ended up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GenerationState {
    /// No generation has run since construction or reset.
    #[default]
    Idle,
    /// A pass failed the completion check and another pass is pending.
    Retrying,
    /// Every section has every required course.
    Complete,
    /// Attempts ran out; the timetable holds the last partial assignment.
    Incomplete,
}

impl GenerationState {
    /// Whether the run ended with every section served.
    pub fn is_complete(self) -> bool {
        self == GenerationState::Complete
    }
}

/// A generated (or loaded) timetable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Timetable {
    pub settings: Settings,
    pub rooms: Vec<Room>,
    pub courses: Vec<Course>,
    pub instructors: Vec<Instructor>,
    pub sections: Vec<Section>,
    /// Every activity of the timetable.
    pub activities: ActivitySet,
    /// Outcome of the last generation run.
    pub state: GenerationState,
    /// Passes used by the last generation run.
    pub attempts: usize,
}

/// Positions of entities by id, built once per run.
///
/// Valid while no entity collection is reordered or resized.
#[derive(Debug, Clone, Default)]
pub(crate) struct EntityIndex {
    pub rooms: HashMap<String, usize>,
    pub courses: HashMap<String, usize>,
    pub instructors: HashMap<String, usize>,
    pub sections: HashMap<String, usize>,
}

impl EntityIndex {
    pub fn build(timetable: &Timetable) -> Self {
        fn positions<'a>(ids: impl Iterator<Item = &'a String>) -> HashMap<String, usize> {
            let mut map = HashMap::new();
            for (i, id) in ids.enumerate() {
                // First occurrence wins for duplicated ids
                map.entry(id.clone()).or_insert(i);
            }
            map
        }

        Self {
            rooms: positions(timetable.rooms.iter().map(|r| &r.id)),
            courses: positions(timetable.courses.iter().map(|c| &c.id)),
            instructors: positions(timetable.instructors.iter().map(|i| &i.id)),
            sections: positions(timetable.sections.iter().map(|s| &s.id)),
        }
    }
}

impl Timetable {
    /// Creates an empty timetable.
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }

    /// Creates an ungenerated timetable from an input bundle.
    pub fn from_params(params: TimetableParams) -> Self {
        let TimetableParams {
            rooms,
            courses,
            instructors,
            sections,
            settings,
        } = params;
        Self {
            settings,
            rooms,
            courses,
            instructors,
            sections,
            ..Default::default()
        }
    }

    /// Splits the timetable back into an input bundle, dropping activities.
    pub fn into_params(mut self) -> TimetableParams {
        self.reset();
        TimetableParams {
            rooms: self.rooms,
            courses: self.courses,
            instructors: self.instructors,
            sections: self.sections,
            settings: self.settings,
        }
    }

    /// Runs the generation engine over `params`, replacing current content.
    ///
    /// See [`TimetableScheduler`](crate::scheduler::TimetableScheduler).
    pub fn generate(&mut self, params: TimetableParams) -> GenerationState {
        crate::scheduler::TimetableScheduler::new().generate_into(self, params)
    }

    /// Wipes all derived state, keeping entities and their compatibility lists.
    pub fn reset(&mut self) {
        self.activities.clear();
        for room in &mut self.rooms {
            room.scheds.reset();
        }
        for course in &mut self.courses {
            course.course_classes.clear();
        }
        for instructor in &mut self.instructors {
            instructor.reset();
        }
        for section in &mut self.sections {
            section.scheds.reset();
        }
        self.state = GenerationState::Idle;
        self.attempts = 0;
    }

    /// Looks up a room.
    pub fn room(&self, id: &str) -> Option<&Room> {
        self.rooms.iter().find(|r| r.id == id)
    }

    /// Looks up a course.
    pub fn course(&self, id: &str) -> Option<&Course> {
        self.courses.iter().find(|c| c.id == id)
    }

    /// Looks up an instructor.
    pub fn instructor(&self, id: &str) -> Option<&Instructor> {
        self.instructors.iter().find(|i| i.id == id)
    }

    /// Looks up a section.
    pub fn section(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }

    /// Whether the generation run reached completion.
    pub fn is_complete(&self) -> bool {
        self.state.is_complete()
    }

    /// Detaches an activity from every schedule and list, then drops it.
    pub fn remove_activity(&mut self, activity_id: &str) -> Option<Activity> {
        let index = EntityIndex::build(self);
        self.remove_activity_indexed(activity_id, &index)
    }

    pub(crate) fn remove_activity_indexed(
        &mut self,
        activity_id: &str,
        index: &EntityIndex,
    ) -> Option<Activity> {
        let activity = self.activities.remove(activity_id)?;

        if let Some(&i) = activity.room_id.as_ref().and_then(|id| index.rooms.get(id)) {
            self.rooms[i].scheds.remove_activity(activity_id);
        }
        if let Some(&i) = activity
            .instructor_id
            .as_ref()
            .and_then(|id| index.instructors.get(id))
        {
            let instructor = &mut self.instructors[i];
            if instructor.scheds.remove_activity(activity_id).is_some() {
                instructor.total_minutes = instructor.total_minutes.saturating_sub(activity.duration);
            }
        }
        if let Some(&i) = activity.section_id.as_ref().and_then(|id| index.sections.get(id)) {
            self.sections[i].scheds.remove_activity(activity_id);
        }
        if let Some(&i) = index.courses.get(&activity.course_id) {
            self.courses[i].course_classes.retain(|id| id != activity_id);
        }
        Some(activity)
    }

    /// Meetings of `course_id` the section still lacks this week.
    ///
    /// Returns `None` for an unknown course.
    pub fn remaining_meetings(&self, section_id: &str, course_id: &str) -> Option<u32> {
        let course = self.course(course_id)?;
        let claimed = self
            .activities
            .iter()
            .filter(|a| a.course_id == course_id && a.section_id.as_deref() == Some(section_id))
            .count() as u32;
        Some(course.weekly_meetings.saturating_sub(claimed))
    }

    /// Whether an activity fits the day schedule of the given entity.
    ///
    /// Returns `false` for an unknown entity or day.
    pub fn is_addable_to(&self, activity: &Activity, kind: EntityKind, entity_id: &str) -> bool {
        let week = match kind {
            EntityKind::Room => self.room(entity_id).map(|r| &r.scheds),
            EntityKind::Instructor => self.instructor(entity_id).map(|i| &i.scheds),
            EntityKind::Section => self.section(entity_id).map(|s| &s.scheds),
        };
        week.and_then(|w| w.day(activity.day))
            .is_some_and(|d| d.is_addable(activity))
    }

    /// Whether the section holds at least one activity of each required
    /// (known) course.
    pub fn is_section_complete(&self, section_id: &str) -> bool {
        let Some(section) = self.section(section_id) else {
            return false;
        };
        section
            .section_courses
            .iter()
            .filter(|c| self.course(c).is_some())
            .all(|course_id| {
                self.activities.iter().any(|a| {
                    a.course_id == *course_id && a.section_id.as_deref() == Some(section_id)
                })
            })
    }

    /// Whether every section is complete.
    pub fn check_section_completion(&self) -> bool {
        self.sections.iter().all(|s| self.is_section_complete(&s.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RoomType;

    fn sample() -> Timetable {
        let settings = Settings::default();
        let normal = RoomType::new("normal", "Normal");
        let mut tt = Timetable::new(settings.clone());
        tt.rooms.push(Room::new("R1", normal.clone(), &settings));
        tt.courses.push(
            Course::new("MATH", 60)
                .with_weekly_meetings(2)
                .with_room_type(normal),
        );
        tt.instructors
            .push(Instructor::new("T1", &settings).with_course("MATH"));
        tt.sections
            .push(Section::new("S1", &settings).with_course("MATH"));

        let a = Activity::new("A1", "MATH", 2, 420, 60)
            .with_instance(1)
            .with_room("R1")
            .with_instructor("T1")
            .with_section("S1");
        tt.rooms[0].scheds.day_mut(2).unwrap().add_existing_activity(&a);
        tt.instructors[0].scheds.day_mut(2).unwrap().add_existing_activity(&a);
        tt.instructors[0].total_minutes = 60;
        tt.sections[0].scheds.day_mut(2).unwrap().add_existing_activity(&a);
        tt.courses[0].course_classes.push("A1".into());
        tt.activities.insert(a);
        tt
    }

    #[test]
    fn test_remaining_meetings() {
        let tt = sample();
        assert_eq!(tt.remaining_meetings("S1", "MATH"), Some(1));
        assert_eq!(tt.remaining_meetings("S2", "MATH"), Some(2));
        assert_eq!(tt.remaining_meetings("S1", "NOPE"), None);
    }

    #[test]
    fn test_section_completion() {
        let mut tt = sample();
        assert!(tt.is_section_complete("S1"));
        assert!(tt.check_section_completion());
        assert!(!tt.is_section_complete("S404"));

        tt.sections
            .push(Section::new("S2", &Settings::default()).with_course("MATH"));
        assert!(!tt.check_section_completion());
    }

    #[test]
    fn test_remove_activity_detaches_everywhere() {
        let mut tt = sample();
        let removed = tt.remove_activity("A1").unwrap();
        assert_eq!(removed.id, "A1");
        assert!(tt.activities.is_empty());
        assert!(!tt.rooms[0].scheds.contains_activity("A1"));
        assert!(!tt.instructors[0].scheds.contains_activity("A1"));
        assert!(!tt.sections[0].scheds.contains_activity("A1"));
        assert_eq!(tt.instructors[0].total_minutes, 0);
        assert!(tt.courses[0].course_classes.is_empty());
        assert!(tt.rooms[0].scheds.day(2).unwrap().check_vacant(420, 60));
        assert!(tt.remove_activity("A1").is_none());
    }

    #[test]
    fn test_is_addable_to() {
        let tt = sample();
        let clash = Activity::new("X", "MATH", 2, 450, 60);
        let free = Activity::new("Y", "MATH", 3, 450, 60);
        assert!(!tt.is_addable_to(&clash, EntityKind::Room, "R1"));
        assert!(!tt.is_addable_to(&clash, EntityKind::Section, "S1"));
        assert!(tt.is_addable_to(&free, EntityKind::Instructor, "T1"));
        assert!(!tt.is_addable_to(&free, EntityKind::Room, "R404"));
    }

    #[test]
    fn test_reset_keeps_entities() {
        let mut tt = sample();
        tt.state = GenerationState::Complete;
        tt.attempts = 3;
        tt.reset();

        assert!(tt.activities.is_empty());
        assert_eq!(tt.rooms.len(), 1);
        assert_eq!(tt.instructors[0].compatible_courses, vec!["MATH"]);
        assert_eq!(tt.sections[0].section_courses, vec!["MATH"]);
        assert!(tt.courses[0].course_classes.is_empty());
        assert_eq!(tt.instructors[0].total_minutes, 0);
        assert!(tt.rooms[0].scheds.iter().all(|d| d.activities.is_empty()));
        assert_eq!(tt.state, GenerationState::Idle);
        assert_eq!(tt.attempts, 0);
    }

    #[test]
    fn test_into_params_drops_activities() {
        let params = sample().into_params();
        assert_eq!(params.rooms.len(), 1);
        assert!(params.courses[0].course_classes.is_empty());
        assert!(params.sections[0].scheds.iter().all(|d| d.activities.is_empty()));
    }
}
