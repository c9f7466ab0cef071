//! Instructor and section assignment (phases 2 and 3).
//!
//! Both phases attach activities created by course placement; neither
//! allocates new slots.
//!
//! # Instructor assignment
//! Works on whole pair groups. A group is assigned only if it is complete
//! (one member per subset day), entirely unstaffed, of the target course,
//! vacant in the instructor's day schedules, within the instructor's daily
//! ceiling and within the weekly cap. Otherwise nothing is assigned.
//!
//! # Section assignment
//! Scans each required course's activities in creation order and claims
//! unclaimed ones that fit the section's day, until the course's weekly
//! meetings are covered or its activities run out.

use std::collections::HashMap;

use tracing::debug;

use crate::models::{Activity, ActivitySet, EntityIndex, PairKey, Timetable};

/// Pair groups of the current activity set, member ids in creation order.
pub(crate) fn pair_groups(activities: &ActivitySet) -> HashMap<PairKey, Vec<String>> {
    let mut groups: HashMap<PairKey, Vec<String>> = HashMap::new();
    for a in activities {
        groups.entry(a.pair_key()).or_default().push(a.id.clone());
    }
    groups
}

/// Assigns pair groups of compatible courses to the instructor at
/// `instructor_idx`. Returns the number of groups assigned.
pub(crate) fn assign_instructor(
    timetable: &mut Timetable,
    instructor_idx: usize,
    index: &EntityIndex,
    groups: &HashMap<PairKey, Vec<String>>,
) -> usize {
    let instructor_id = timetable.instructors[instructor_idx].id.clone();
    let courses = timetable.instructors[instructor_idx].compatible_courses.clone();
    let mut assigned = 0;

    for course_id in &courses {
        let Some(&course_idx) = index.courses.get(course_id) else {
            continue;
        };
        let meetings = timetable.courses[course_idx].weekly_meetings;
        let Some(group_size) = timetable
            .settings
            .day_priorities
            .for_meetings(meetings)
            .first()
            .map(Vec::len)
        else {
            continue;
        };

        for activity_id in room_activities_of(timetable, course_id) {
            let Some(activity) = timetable.activities.get(&activity_id) else {
                continue;
            };
            if activity.instructor_id.is_some() {
                continue;
            }
            let Some(member_ids) = groups.get(&activity.pair_key()) else {
                continue;
            };
            if member_ids.len() != group_size {
                continue;
            }
            let members: Vec<Activity> = member_ids
                .iter()
                .filter_map(|id| timetable.activities.get(id).cloned())
                .collect();
            if members.len() != member_ids.len() {
                continue;
            }
            if !group_fits(timetable, instructor_idx, course_id, &members) {
                continue;
            }

            let minutes: u32 = members.iter().map(|m| m.duration).fold(0, u32::saturating_add);
            let instructor = &mut timetable.instructors[instructor_idx];
            if !instructor.add_minutes(minutes) {
                continue;
            }
            for member in &members {
                if let Some(day) = instructor.scheds.day_mut(member.day) {
                    day.add_existing_activity(member);
                }
            }
            for member in &members {
                if let Some(a) = timetable.activities.get_mut(&member.id) {
                    a.instructor_id = Some(instructor_id.clone());
                }
            }
            assigned += 1;
        }
    }

    debug!(instructor = %instructor_id, groups = assigned, "instructor assignment finished");
    assigned
}

/// Ids of the course's activities in room order, day order, then
/// position within the day.
fn room_activities_of(timetable: &Timetable, course_id: &str) -> Vec<String> {
    timetable
        .rooms
        .iter()
        .flat_map(|r| r.scheds.iter())
        .flat_map(|d| d.activities.iter())
        .filter(|r| {
            timetable
                .activities
                .get(&r.activity_id)
                .is_some_and(|a| a.course_id == course_id)
        })
        .map(|r| r.activity_id.clone())
        .collect()
}

fn group_fits(
    timetable: &Timetable,
    instructor_idx: usize,
    course_id: &str,
    members: &[Activity],
) -> bool {
    let instructor = &timetable.instructors[instructor_idx];
    let minutes: u32 = members.iter().map(|m| m.duration).fold(0, u32::saturating_add);

    members.iter().all(|m| {
        m.instructor_id.is_none()
            && m.course_id == course_id
            && instructor.scheds.day(m.day).is_some_and(|d| {
                d.check_vacant(m.start_time, m.duration) && d.check_violation(m.duration)
            })
    }) && instructor.has_capacity(minutes)
}

/// Claims activities of each required course for the section at
/// `section_idx`. Returns the number of activities claimed.
pub(crate) fn assign_section(
    timetable: &mut Timetable,
    section_idx: usize,
    index: &EntityIndex,
) -> usize {
    let section_id = timetable.sections[section_idx].id.clone();
    let courses = timetable.sections[section_idx].section_courses.clone();
    let mut claimed = 0;

    for course_id in &courses {
        let Some(&course_idx) = index.courses.get(course_id) else {
            continue;
        };
        let mut remaining = timetable.courses[course_idx].weekly_meetings;
        let class_ids = timetable.courses[course_idx].course_classes.clone();

        for activity_id in &class_ids {
            if remaining == 0 {
                break;
            }
            let Some(activity) = timetable.activities.get(activity_id) else {
                continue;
            };
            if activity.section_id.is_some() {
                continue;
            }
            let section = &timetable.sections[section_idx];
            let fits = section
                .scheds
                .day(activity.day)
                .is_some_and(|d| d.is_addable(activity) && d.check_violation(activity.duration));
            if !fits {
                continue;
            }

            let activity = activity.clone();
            if let Some(day) = timetable.sections[section_idx].scheds.day_mut(activity.day) {
                day.add_existing_activity(&activity);
            }
            if let Some(a) = timetable.activities.get_mut(activity_id) {
                a.section_id = Some(section_id.clone());
            }
            remaining -= 1;
            claimed += 1;
        }
    }

    debug!(section = %section_id, claimed, "section assignment finished");
    claimed
}
