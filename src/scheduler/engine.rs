//! Three-phase greedy timetable engine with a bounded retry loop.
//!
//! # Algorithm
//!
//! Each pass:
//! 1. Clear the activity set and every day schedule.
//! 2. Phase 1: place every course into rooms (courses by ascending
//!    compatible room-type count). Demand is the course's
//!    `classes_offered`, set before the first pass to the number of
//!    sections requiring it, plus the pass slack. A course repeating an
//!    earlier course's id is never placed.
//! 3. Phase 2: assign pair groups to instructors (instructors by ascending
//!    compatible course count).
//! 4. Phase 3: let every section claim its meetings.
//! 5. Cleanup: drop every activity no section claimed.
//!
//! A pass that leaves every section with every required course ends the
//! run as `Complete`. Otherwise the next pass runs with one more unit of
//! slack, up to `sections × courses + 1` passes, after which the run ends
//! as `Incomplete` with the last partial result kept.
//!
//! No backtracking happens inside a pass.
//!
//! # Complexity
//! O(A * (P + I * G + S * K)) where A=attempts, P=placement cost,
//! I=instructors, G=activities per course, S=sections, K=activities per
//! required course.

use tracing::{debug, info, warn};

use super::assignment::{assign_instructor, assign_section, pair_groups};
use super::placement::place_course;
use crate::models::{
    DaySched, EntityIndex, EntityKind, GenerationState, Timetable, TimetableParams,
};
use crate::validation::validate_params;

/// Timetable generation engine.
///
/// # Example
///
/// ```
/// use u_timetable::models::{Course, Room, RoomType, Section, Settings, TimetableParams};
/// use u_timetable::scheduler::TimetableScheduler;
///
/// let settings = Settings::default();
/// let normal = RoomType::new("normal", "Normal");
/// let params = TimetableParams::new(settings.clone())
///     .with_room(Room::new("R1", normal.clone(), &settings))
///     .with_course(Course::new("MATH", 60).with_room_type(normal))
///     .with_section(Section::new("S1", &settings).with_course("MATH"));
///
/// let timetable = TimetableScheduler::new().generate(params);
/// assert!(timetable.is_complete());
/// assert_eq!(timetable.activities.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TimetableScheduler {
    max_attempts: Option<usize>,
}

impl TimetableScheduler {
    /// Creates an engine with the default attempt bound.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the attempt bound (at least one pass always runs).
    pub fn with_max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    /// Default attempt bound: `sections × courses + 1`.
    pub fn max_attempts_for(sections: usize, courses: usize) -> usize {
        sections.saturating_mul(courses).saturating_add(1)
    }

    /// Generates a fresh timetable from `params`.
    pub fn generate(&self, params: TimetableParams) -> Timetable {
        let mut timetable = Timetable::default();
        self.generate_into(&mut timetable, params);
        timetable
    }

    /// Generates into an existing timetable, replacing its content.
    ///
    /// Returns the final state, also recorded on the timetable.
    pub fn generate_into(
        &self,
        timetable: &mut Timetable,
        params: TimetableParams,
    ) -> GenerationState {
        if let Err(errors) = validate_params(&params) {
            for e in &errors {
                warn!(kind = ?e.kind, message = %e.message, "questionable generation input");
            }
        }

        *timetable = Timetable::from_params(params);
        rebuild_weeks(timetable);
        timetable.reset();

        let index = EntityIndex::build(timetable);

        let mut course_order: Vec<usize> = (0..timetable.courses.len()).collect();
        course_order.sort_by_key(|&i| timetable.courses[i].compatible_room_types.len());
        let mut instructor_order: Vec<usize> = (0..timetable.instructors.len()).collect();
        instructor_order.sort_by_key(|&i| timetable.instructors[i].compatible_courses.len());

        for c in 0..timetable.courses.len() {
            let id = &timetable.courses[c].id;
            let offered = timetable.sections.iter().filter(|s| s.requires(id)).count() as u32;
            timetable.courses[c].classes_offered = offered;
        }
        course_order.retain(|&c| {
            let id = &timetable.courses[c].id;
            let first = index.courses.get(id) == Some(&c);
            if !first {
                warn!(course = %id, "duplicated course id, only the first is placed");
            }
            first
        });

        let max_attempts = self
            .max_attempts
            .unwrap_or_else(|| {
                Self::max_attempts_for(timetable.sections.len(), timetable.courses.len())
            })
            .max(1);

        for attempt in 0..max_attempts {
            timetable.attempts = attempt + 1;
            let slack = attempt as u32;

            for &c in &course_order {
                let demand = timetable.courses[c].classes_offered.saturating_add(slack);
                place_course(timetable, c, demand);
            }
            let groups = pair_groups(&timetable.activities);
            for &i in &instructor_order {
                assign_instructor(timetable, i, &index, &groups);
            }
            for s in 0..timetable.sections.len() {
                assign_section(timetable, s, &index);
            }
            let dropped = remove_unclaimed(timetable, &index);

            debug!(
                attempt = timetable.attempts,
                activities = timetable.activities.len(),
                dropped,
                "pass finished"
            );

            if timetable.check_section_completion() {
                timetable.state = GenerationState::Complete;
                info!(
                    attempts = timetable.attempts,
                    activities = timetable.activities.len(),
                    "timetable complete"
                );
                return timetable.state;
            }

            if attempt + 1 < max_attempts {
                timetable.reset();
                timetable.attempts = attempt + 1;
                timetable.state = GenerationState::Retrying;
            }
        }

        timetable.state = GenerationState::Incomplete;
        warn!(
            attempts = timetable.attempts,
            activities = timetable.activities.len(),
            "attempts exhausted, timetable incomplete"
        );
        timetable.state
    }
}

/// Generates a timetable with the default engine.
pub fn generate(params: TimetableParams) -> Timetable {
    TimetableScheduler::new().generate(params)
}

/// Recreates every week from the current settings.
fn rebuild_weeks(timetable: &mut Timetable) {
    let settings = &timetable.settings;
    for room in &mut timetable.rooms {
        room.scheds = DaySched::create_week(settings, EntityKind::Room);
    }
    for instructor in &mut timetable.instructors {
        instructor.scheds = DaySched::create_week(settings, EntityKind::Instructor);
    }
    for section in &mut timetable.sections {
        section.scheds = DaySched::create_week(settings, EntityKind::Section);
    }
}

/// Drops activities no section claimed. Returns how many were dropped.
fn remove_unclaimed(timetable: &mut Timetable, index: &EntityIndex) -> usize {
    let unclaimed: Vec<String> = timetable
        .activities
        .iter()
        .filter(|a| a.section_id.is_none())
        .map(|a| a.id.clone())
        .collect();
    for id in &unclaimed {
        timetable.remove_activity_indexed(id, index);
    }
    unclaimed.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Course, Instructor, Room, RoomType, Section, Settings};
    use crate::validation::validate_timetable;

    fn normal() -> RoomType {
        RoomType::new("normal", "Normal")
    }

    fn single_course(meetings: u32) -> TimetableParams {
        let settings = Settings::default();
        TimetableParams::new(settings.clone())
            .with_room(Room::new("R1", normal(), &settings))
            .with_course(
                Course::new("MATH", 60)
                    .with_weekly_meetings(meetings)
                    .with_room_type(normal()),
            )
            .with_section(Section::new("S1", &settings).with_course("MATH"))
    }

    #[test]
    fn test_single_meeting_without_instructor() {
        let tt = generate(single_course(1));

        assert_eq!(tt.state, GenerationState::Complete);
        assert_eq!(tt.attempts, 1);
        assert_eq!(tt.activities.len(), 1);
        let a = tt.activities.iter().next().unwrap();
        assert_eq!(a.section_id.as_deref(), Some("S1"));
        assert_eq!(a.room_id.as_deref(), Some("R1"));
        assert!(a.instructor_id.is_none());

        let day = tt.rooms[0].scheds.day(a.day).unwrap();
        assert_eq!(day.is_vacant.iter().filter(|v| !**v).count(), 4); // 2 + lunch
        assert!(!day.is_vacant[0]);
        assert!(!day.is_vacant[1]);
        assert!(day.is_vacant[2]);
    }

    #[test]
    fn test_paired_meetings_share_instructor() {
        let settings = Settings::default();
        let params =
            single_course(2).with_instructor(Instructor::new("T1", &settings).with_course("MATH"));
        let tt = generate(params);

        assert!(tt.is_complete());
        let acts: Vec<_> = tt.activities.iter().collect();
        assert_eq!(acts.len(), 2);
        assert_eq!(acts[0].instance, acts[1].instance);
        assert_eq!((acts[0].day, acts[1].day), (2, 4));
        assert!(acts
            .iter()
            .all(|a| a.instructor_id.as_deref() == Some("T1")));
        assert_eq!(tt.instructors[0].total_minutes, 120);
    }

    #[test]
    fn test_weekly_cap_leaves_activities_unstaffed() {
        let settings = Settings::default();
        let params = single_course(2).with_instructor(
            Instructor::new("T1", &settings)
                .with_course("MATH")
                .with_max_minutes(90),
        );
        let tt = generate(params);

        assert!(tt.is_complete());
        assert!(tt.activities.iter().all(|a| a.instructor_id.is_none()));
        assert_eq!(tt.instructors[0].total_minutes, 0);
    }

    #[test]
    fn test_fully_excluded_days_place_nothing() {
        let settings = Settings::default()
            .with_day_window(420, 480)
            .with_excluded_periods(vec![420, 450]);
        let params = TimetableParams::new(settings.clone())
            .with_room(Room::new("R1", normal(), &settings))
            .with_course(Course::new("MATH", 60).with_room_type(normal()))
            .with_section(Section::new("S1", &settings).with_course("MATH"));
        let tt = generate(params);

        assert_eq!(tt.state, GenerationState::Incomplete);
        assert_eq!(tt.attempts, 2);
        assert!(tt.activities.is_empty());
        let day = tt.rooms[0].scheds.day(3).unwrap();
        assert!(day.is_vacant.iter().all(|v| !v));
        assert!(!day.check_conflict(30));
    }

    #[test]
    fn test_attempts_bounded() {
        let settings = Settings::default();
        // No room at all: nothing can ever be placed
        let params = TimetableParams::new(settings.clone())
            .with_course(Course::new("MATH", 60).with_room_type(normal()))
            .with_course(Course::new("PHYS", 60).with_room_type(normal()))
            .with_section(Section::new("S1", &settings).with_course("MATH"))
            .with_section(Section::new("S2", &settings).with_course("PHYS"));
        let tt = generate(params);

        assert_eq!(tt.state, GenerationState::Incomplete);
        assert_eq!(tt.attempts, TimetableScheduler::max_attempts_for(2, 2));
        assert_eq!(tt.attempts, 5);

        let tt = TimetableScheduler::new()
            .with_max_attempts(0)
            .generate(single_course(1));
        assert_eq!(tt.attempts, 1);
    }

    #[test]
    fn test_retry_adds_slack() {
        let settings = Settings::default();
        let lab = RoomType::new("lab", "Lab");
        // Both courses land on Wednesday 07:00 in their own rooms on the first pass
        let params = TimetableParams::new(settings.clone())
            .with_room(Room::new("R1", normal(), &settings))
            .with_room(Room::new("L1", lab.clone(), &settings))
            .with_course(Course::new("MATH", 60).with_room_type(normal()))
            .with_course(Course::new("CHEM", 60).with_room_type(lab))
            .with_section(
                Section::new("S1", &settings)
                    .with_course("MATH")
                    .with_course("CHEM"),
            );
        let tt = generate(params);

        assert_eq!(tt.state, GenerationState::Complete);
        assert_eq!(tt.attempts, 2);
        assert_eq!(tt.activities.len(), 2);
        assert!(tt.activities.iter().all(|a| a.section_id.is_some()));
        let chem = tt.activities.iter().find(|a| a.course_id == "CHEM").unwrap();
        assert_eq!(chem.start_time, 480);
    }

    #[test]
    fn test_cleanup_frees_room_slots() {
        let settings = Settings::default();
        // Two offerings get placed on the second pass, only one is claimed
        let lab = RoomType::new("lab", "Lab");
        let params = TimetableParams::new(settings.clone())
            .with_room(Room::new("R1", normal(), &settings))
            .with_room(Room::new("L1", lab.clone(), &settings))
            .with_course(Course::new("MATH", 60).with_room_type(normal()))
            .with_course(Course::new("CHEM", 60).with_room_type(lab))
            .with_section(
                Section::new("S1", &settings)
                    .with_course("MATH")
                    .with_course("CHEM"),
            );
        let tt = generate(params);

        let math_room = tt.room("R1").unwrap();
        assert_eq!(math_room.scheds.total_minutes(), 60);
        assert_eq!(tt.course("MATH").unwrap().course_classes.len(), 1);
        assert!(validate_timetable(&tt).is_empty());
    }

    #[test]
    fn test_generated_timetable_has_no_violations() {
        let settings = Settings::default();
        let mut params = TimetableParams::new(settings.clone())
            .with_room(Room::new("R1", normal(), &settings))
            .with_room(Room::new("R2", normal(), &settings))
            .with_instructor(
                Instructor::new("T1", &settings)
                    .with_course("MATH")
                    .with_course("ENG"),
            )
            .with_instructor(Instructor::new("T2", &settings).with_course("SCI"));
        for (id, meetings) in [("MATH", 2), ("ENG", 3), ("SCI", 1)] {
            params = params.with_course(
                Course::new(id, 60)
                    .with_weekly_meetings(meetings)
                    .with_room_type(normal()),
            );
        }
        for s in 1..=4 {
            params = params.with_section(
                Section::new(format!("S{s}"), &settings)
                    .with_course("MATH")
                    .with_course("ENG")
                    .with_course("SCI"),
            );
        }
        let tt = generate(params);

        assert!(tt.is_complete());
        assert!(validate_timetable(&tt).is_empty());
        for s in &tt.sections {
            for c in ["MATH", "ENG", "SCI"] {
                assert_eq!(tt.remaining_meetings(&s.id, c), Some(0));
            }
        }
    }

    #[test]
    fn test_generate_into_replaces_content() {
        let mut tt = generate(single_course(1));
        assert_eq!(tt.activities.len(), 1);

        let settings = Settings::default();
        let state = tt.generate(TimetableParams::new(settings));
        assert_eq!(state, GenerationState::Complete);
        assert!(tt.activities.is_empty());
        assert!(tt.rooms.is_empty());
    }

    #[test]
    fn test_classes_offered_follows_sections() {
        let settings = Settings::default();
        let params = single_course(1)
            .with_course(Course::new("ART", 60).with_classes_offered(5).with_room_type(normal()))
            .with_section(Section::new("S2", &settings).with_course("MATH"));
        let tt = generate(params);

        assert!(tt.is_complete());
        assert_eq!(tt.course("MATH").unwrap().classes_offered, 2);
        assert_eq!(tt.course("ART").unwrap().classes_offered, 0);
        assert!(tt.course("ART").unwrap().course_classes.is_empty());
    }

    #[test]
    fn test_duplicated_course_id_placed_once() {
        let params = single_course(1)
            .with_course(Course::new("MATH", 60).with_room_type(normal()));
        let tt = generate(params);

        assert!(tt.is_complete());
        assert_eq!(tt.activities.len(), 1);
        assert_eq!(tt.rooms[0].scheds.total_minutes(), 60);
        assert_eq!(tt.rooms[0].scheds.day(3).unwrap().activities.len(), 1);
        assert!(tt.courses[1].course_classes.is_empty());
        assert!(validate_timetable(&tt).is_empty());
    }
}
