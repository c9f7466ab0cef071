//! Reference repair between flattened snapshots and live timetables.
//!
//! A [`TimetableSnapshot`] is the storage shape of a timetable: plain data
//! where entities point at each other by identifier (or by an embedded
//! copy carrying an `id`). [`Serializer::fix`] rebuilds a consistent
//! [`Timetable`] from it in dependency order:
//!
//! 1. room types (from the settings catalog)
//! 2. rooms, with the activities of their day schedules
//! 3. courses, re-attaching activities by id
//! 4. instructors, re-attaching activities and recomputing weekly minutes
//! 5. sections, re-attaching activities
//!
//! Dangling references are logged and skipped. Activities referenced by a
//! course, instructor or section but absent from every room become
//! placeholders built from the embedded copy. Only a snapshot without
//! settings cannot be repaired.

use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::ids::{generate_id, DEFAULT_ID_LEN};
use crate::models::{
    Activity, ActivitySet, Course, Day, GenerationState, Instructor, Room, Section, Settings,
    Timetable, TimetableParams, Week,
};

/// A reference to another entity: a bare id or an embedded object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawRef {
    Id(String),
    Object { id: String },
}

impl RawRef {
    /// The referenced identifier.
    pub fn id(&self) -> &str {
        match self {
            RawRef::Id(id) | RawRef::Object { id } => id,
        }
    }
}

/// Flattened activity. Every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawActivity {
    pub id: Option<String>,
    pub start_time: u32,
    pub duration: u32,
    #[serde(alias = "sched")]
    pub day: Day,
    pub instance: u32,
    #[serde(alias = "courseID")]
    pub course_id: String,
    #[serde(alias = "roomID")]
    pub room_id: Option<String>,
    #[serde(alias = "instructorID")]
    pub instructor_id: Option<String>,
    #[serde(alias = "sectionID")]
    pub section_id: Option<String>,
}

/// Flattened day schedule: only its activities survive repair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawDaySched {
    pub day: Day,
    pub activities: Vec<RawActivity>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawRoom {
    pub id: String,
    pub name: String,
    #[serde(alias = "type")]
    pub room_type: Option<RawRef>,
    pub scheds: Vec<RawDaySched>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawCourse {
    pub id: String,
    pub name: String,
    pub minutes_per_session: u32,
    /// Weekly minutes, split evenly across meetings when
    /// `minutes_per_session` is absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minutes: Option<u32>,
    #[serde(default = "one")]
    pub weekly_meetings: u32,
    pub classes_offered: u32,
    #[serde(alias = "compatible_rooms")]
    pub compatible_room_types: Vec<RawRef>,
    pub course_classes: Vec<RawActivity>,
}

fn one() -> u32 {
    1
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawInstructor {
    pub id: String,
    pub name: String,
    pub compatible_courses: Vec<RawRef>,
    pub scheds: Vec<RawDaySched>,
    pub max_minutes: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawSection {
    pub id: String,
    pub year_level: Option<u32>,
    pub section_courses: Vec<RawRef>,
    pub scheds: Vec<RawDaySched>,
}

/// Flattened timetable (or generation input) as stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimetableSnapshot {
    pub settings: Option<Settings>,
    pub rooms: Vec<RawRoom>,
    pub courses: Vec<RawCourse>,
    pub instructors: Vec<RawInstructor>,
    pub sections: Vec<RawSection>,
    pub state: GenerationState,
    pub attempts: usize,
}

/// Snapshot repair entry points.
#[derive(Debug, Clone, Copy, Default)]
pub struct Serializer;

impl Serializer {
    /// Rebuilds a live timetable from a snapshot.
    ///
    /// Returns `None` only when the snapshot has no settings.
    pub fn fix(snapshot: &TimetableSnapshot) -> Option<Timetable> {
        let Some(settings) = snapshot.settings.clone() else {
            error!("cannot repair a snapshot without settings");
            return None;
        };
        let mut tt = Timetable::new(settings);
        tt.state = snapshot.state;
        tt.attempts = snapshot.attempts;

        for raw in &snapshot.rooms {
            if let Some(room) = fix_room(raw, &tt.settings, &mut tt.activities) {
                tt.rooms.push(room);
            }
        }

        for raw in &snapshot.courses {
            let course = fix_course(raw, &tt.settings, &mut tt.activities);
            tt.courses.push(course);
        }

        for raw in &snapshot.instructors {
            let mut instructor = Instructor::new(non_empty_id(&raw.id), &tt.settings)
                .with_name(raw.name.clone());
            if let Some(max) = raw.max_minutes {
                instructor = instructor.with_max_minutes(max);
            }
            for c in &raw.compatible_courses {
                if tt.course(c.id()).is_some() {
                    instructor = instructor.with_course(c.id());
                } else {
                    warn!(instructor = %instructor.id, course = %c.id(), "dropping unknown course");
                }
            }
            attach_days(&raw.scheds, &mut instructor.scheds, &mut tt.activities);
            instructor.total_minutes = instructor.scheds.total_minutes();
            tt.instructors.push(instructor);
        }

        for raw in &snapshot.sections {
            let mut section = Section::new(non_empty_id(&raw.id), &tt.settings);
            if let Some(level) = raw.year_level {
                section = section.with_year_level(level);
            }
            for c in &raw.section_courses {
                if tt.course(c.id()).is_some() {
                    section = section.with_course(c.id());
                } else {
                    warn!(section = %section.id, course = %c.id(), "dropping unknown course");
                }
            }
            attach_days(&raw.scheds, &mut section.scheds, &mut tt.activities);
            tt.sections.push(section);
        }

        Some(tt)
    }

    /// Repairs a copy of the snapshot into a generation input bundle.
    ///
    /// Any previously generated activities are dropped.
    pub fn extract(snapshot: &TimetableSnapshot) -> Option<TimetableParams> {
        let copy = snapshot.clone();
        Self::fix(&copy).map(Timetable::into_params)
    }
}

fn non_empty_id(id: &str) -> String {
    if id.is_empty() {
        generate_id(DEFAULT_ID_LEN)
    } else {
        id.to_string()
    }
}

fn fix_room(raw: &RawRoom, settings: &Settings, activities: &mut ActivitySet) -> Option<Room> {
    let type_id = raw.room_type.as_ref().map(RawRef::id).unwrap_or_default();
    let Some(room_type) = settings.room_type(type_id).cloned() else {
        warn!(room = %raw.id, room_type = %type_id, "dropping room with unknown type");
        return None;
    };
    let mut room = Room::new(non_empty_id(&raw.id), room_type, settings).with_name(raw.name.clone());

    for (i, raw_day) in raw.scheds.iter().enumerate() {
        let day = day_of(raw_day, i);
        for raw_activity in &raw_day.activities {
            let activity = to_activity(raw_activity, day);
            if !activities.insert(activity.clone()) {
                warn!(activity = %activity.id, "dropping duplicated activity");
                continue;
            }
            if let Some(sched) = room.scheds.day_mut(activity.day) {
                sched.add_existing_activity(&activity);
            }
        }
    }
    Some(room)
}

fn fix_course(raw: &RawCourse, settings: &Settings, activities: &mut ActivitySet) -> Course {
    let per_session = match raw.minutes {
        Some(weekly) if raw.minutes_per_session == 0 && raw.weekly_meetings > 0 => {
            weekly / raw.weekly_meetings
        }
        _ => raw.minutes_per_session,
    };
    let mut course = Course::new(non_empty_id(&raw.id), per_session)
        .with_name(raw.name.clone())
        .with_weekly_meetings(raw.weekly_meetings)
        .with_classes_offered(raw.classes_offered);

    for t in &raw.compatible_room_types {
        match settings.room_type(t.id()) {
            Some(room_type) => course = course.with_room_type(room_type.clone()),
            None => warn!(course = %course.id, room_type = %t.id(), "dropping unknown room type"),
        }
    }

    for raw_activity in &raw.course_classes {
        let activity = resolve(raw_activity, raw_activity.day, activities);
        if !course.course_classes.contains(&activity.id) {
            course.course_classes.push(activity.id);
        }
    }
    course
}

/// Re-attaches the activities of flattened days to a rebuilt week.
fn attach_days(raw_days: &[RawDaySched], week: &mut Week, activities: &mut ActivitySet) {
    for (i, raw_day) in raw_days.iter().enumerate() {
        let day = day_of(raw_day, i);
        for raw_activity in &raw_day.activities {
            let activity = resolve(raw_activity, day, activities);
            if let Some(sched) = week.day_mut(activity.day) {
                sched.add_existing_activity(&activity);
            }
        }
    }
}

/// Finds an activity by id, or inserts a placeholder built from the copy.
fn resolve(raw: &RawActivity, day: Day, activities: &mut ActivitySet) -> Activity {
    if let Some(existing) = raw.id.as_deref().and_then(|id| activities.get(id)) {
        return existing.clone();
    }
    let activity = to_activity(raw, day);
    activities.insert(activity.clone());
    activity
}

fn day_of(raw: &RawDaySched, position: usize) -> Day {
    if raw.day == 0 {
        (position + 1) as Day
    } else {
        raw.day
    }
}

fn to_activity(raw: &RawActivity, day: Day) -> Activity {
    let id = match &raw.id {
        Some(id) if !id.is_empty() => id.clone(),
        _ => generate_id(DEFAULT_ID_LEN),
    };
    let day = if raw.day == 0 { day } else { raw.day };
    Activity {
        id,
        start_time: raw.start_time,
        duration: raw.duration,
        day,
        instance: raw.instance,
        course_id: raw.course_id.clone(),
        room_id: raw.room_id.clone(),
        instructor_id: raw.instructor_id.clone(),
        section_id: raw.section_id.clone(),
    }
}

impl From<&Activity> for RawActivity {
    fn from(a: &Activity) -> Self {
        Self {
            id: Some(a.id.clone()),
            start_time: a.start_time,
            duration: a.duration,
            day: a.day,
            instance: a.instance,
            course_id: a.course_id.clone(),
            room_id: a.room_id.clone(),
            instructor_id: a.instructor_id.clone(),
            section_id: a.section_id.clone(),
        }
    }
}

fn flatten_week(week: &Week, activities: &ActivitySet) -> Vec<RawDaySched> {
    week.iter()
        .map(|d| RawDaySched {
            day: d.day,
            activities: d
                .activities
                .iter()
                .filter_map(|r| activities.get(&r.activity_id))
                .map(RawActivity::from)
                .collect(),
        })
        .collect()
}

impl From<&Timetable> for TimetableSnapshot {
    fn from(tt: &Timetable) -> Self {
        let acts = &tt.activities;
        Self {
            settings: Some(tt.settings.clone()),
            rooms: tt
                .rooms
                .iter()
                .map(|r| RawRoom {
                    id: r.id.clone(),
                    name: r.name.clone(),
                    room_type: Some(RawRef::Id(r.room_type.id.clone())),
                    scheds: flatten_week(&r.scheds, acts),
                })
                .collect(),
            courses: tt
                .courses
                .iter()
                .map(|c| RawCourse {
                    id: c.id.clone(),
                    name: c.name.clone(),
                    minutes_per_session: c.minutes_per_session,
                    minutes: None,
                    weekly_meetings: c.weekly_meetings,
                    classes_offered: c.classes_offered,
                    compatible_room_types: c
                        .compatible_room_types
                        .iter()
                        .map(|t| RawRef::Id(t.id.clone()))
                        .collect(),
                    course_classes: c
                        .course_classes
                        .iter()
                        .filter_map(|id| acts.get(id))
                        .map(RawActivity::from)
                        .collect(),
                })
                .collect(),
            instructors: tt
                .instructors
                .iter()
                .map(|i| RawInstructor {
                    id: i.id.clone(),
                    name: i.name.clone(),
                    compatible_courses: i
                        .compatible_courses
                        .iter()
                        .cloned()
                        .map(RawRef::Id)
                        .collect(),
                    scheds: flatten_week(&i.scheds, acts),
                    max_minutes: (i.max_minutes != u32::MAX).then_some(i.max_minutes),
                })
                .collect(),
            sections: tt
                .sections
                .iter()
                .map(|s| RawSection {
                    id: s.id.clone(),
                    year_level: Some(s.year_level),
                    section_courses: s.section_courses.iter().cloned().map(RawRef::Id).collect(),
                    scheds: flatten_week(&s.scheds, acts),
                })
                .collect(),
            state: tt.state,
            attempts: tt.attempts,
        }
    }
}

impl From<&TimetableParams> for TimetableSnapshot {
    fn from(params: &TimetableParams) -> Self {
        let tt = Timetable::from_params(params.clone());
        Self::from(&tt)
    }
}
