//! Course → room placement (phase 1).
//!
//! # Algorithm
//!
//! 1. Demand = sections requiring the course + offering slack of this pass.
//! 2. For each compatible room type, for each room of that type:
//! 3. For each priority day subset (by weekly meetings), repeatedly:
//!    - every day of the subset must pass `check_conflict` and `check_violation`;
//!    - allocate one meeting per day with the same instance number;
//!    - decrement demand, increment instance.
//! 4. The first failure in a subset moves on to the next subset.
//!
//! Demand left over once every room has been tried is abandoned for this pass.
//! Placement also stops when a new activity id is already taken, which
//! only happens when another course shares this course's id.
//!
//! # Complexity
//! O(t * r * p * d * s) where t=room types, r=rooms, p=subsets,
//! d=days per subset, s=slots per day.

use tracing::{debug, warn};

use crate::models::{Activity, Day, Timetable};

/// Places up to `demand` offerings of the course at `course_idx`.
///
/// Returns the number of offerings placed.
pub(crate) fn place_course(timetable: &mut Timetable, course_idx: usize, demand: u32) -> u32 {
    let course = &timetable.courses[course_idx];
    let course_id = course.id.clone();
    let duration = course.minutes_per_session;
    let room_types = course.compatible_room_types.clone();
    let subsets: Vec<Vec<Day>> = timetable
        .settings
        .day_subsets(course.weekly_meetings)
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect();

    let mut remaining = demand;
    let mut instance = 1;

    'types: for room_type in &room_types {
        for room_idx in 0..timetable.rooms.len() {
            if remaining == 0 {
                break 'types;
            }
            if !timetable.rooms[room_idx].is_type(room_type) {
                continue;
            }

            for subset in &subsets {
                while remaining > 0 {
                    if !subset_fits(timetable, room_idx, subset, duration) {
                        break;
                    }
                    match allocate(timetable, room_idx, subset, &course_id, duration, instance) {
                        Some(placed)
                            if placed.iter().any(|a| timetable.activities.contains(&a.id)) =>
                        {
                            let week = &mut timetable.rooms[room_idx].scheds;
                            for a in &placed {
                                week.remove_activity(&a.id);
                            }
                            warn!(
                                course = %course_id,
                                instance,
                                "activity id already taken, stopping placement"
                            );
                            break 'types;
                        }
                        Some(placed) => {
                            let course = &mut timetable.courses[course_idx];
                            course
                                .course_classes
                                .extend(placed.iter().map(|a| a.id.clone()));
                            for activity in placed {
                                timetable.activities.insert(activity);
                            }
                            remaining -= 1;
                            instance += 1;
                        }
                        None => break,
                    }
                }
            }
        }
    }

    let placed = demand - remaining;
    debug!(
        course = %course_id,
        demand,
        placed,
        "course placement finished"
    );
    placed
}

fn subset_fits(timetable: &Timetable, room_idx: usize, subset: &[Day], duration: u32) -> bool {
    let week = &timetable.rooms[room_idx].scheds;
    subset.iter().all(|&day| {
        week.day(day)
            .is_some_and(|s| s.check_conflict(duration) && s.check_violation(duration))
    })
}

/// Allocates one meeting per subset day. All-or-nothing: a partial
/// allocation is detached again.
fn allocate(
    timetable: &mut Timetable,
    room_idx: usize,
    subset: &[Day],
    course_id: &str,
    duration: u32,
    instance: u32,
) -> Option<Vec<Activity>> {
    let room = &mut timetable.rooms[room_idx];
    let room_id = room.id.clone();
    let mut placed = Vec::with_capacity(subset.len());

    for &day in subset {
        let activity = room
            .scheds
            .day_mut(day)
            .and_then(|s| s.add_activity(course_id, duration, instance, &room_id));
        match activity {
            Some(a) => placed.push(a),
            None => {
                for a in &placed {
                    room.scheds.remove_activity(&a.id);
                }
                return None;
            }
        }
    }
    Some(placed)
}
