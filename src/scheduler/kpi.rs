//! Timetable quality metrics (KPIs).
//!
//! Computes summary indicators from a generated timetable.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Activity count | Activities in the timetable |
//! | Unstaffed activities | Activities without an instructor |
//! | Completion rate | Complete sections / sections |
//! | Shortfall | Missing meetings per section |
//! | Room utilization | Occupied minutes / available teaching minutes |

use std::collections::HashMap;

use crate::models::{Timetable, Weekday};

/// Timetable performance indicators.
#[derive(Debug, Clone)]
pub struct TimetableKpi {
    /// Activities in the timetable.
    pub activity_count: usize,
    /// Activities with no instructor.
    pub unstaffed_activities: usize,
    /// Sections holding every required course.
    pub sections_complete: usize,
    /// Sections in the timetable.
    pub section_count: usize,
    /// Fraction of complete sections (0.0..1.0, 1.0 with no sections).
    pub completion_rate: f64,
    /// Missing meetings per section (sections with no shortfall omitted).
    pub shortfall_by_section: HashMap<String, u32>,
    /// Per-room utilization (0.0..1.0).
    pub utilization_by_room: HashMap<String, f64>,
    /// Average room utilization (0.0..1.0).
    pub avg_room_utilization: f64,
    /// Passes used by the generation run.
    pub attempts: usize,
}

impl TimetableKpi {
    /// Computes KPIs from a timetable.
    ///
    /// Room utilization counts Monday to Friday, plus Saturday when the
    /// settings include it.
    pub fn calculate(timetable: &Timetable) -> Self {
        let activity_count = timetable.activities.len();
        let unstaffed_activities = timetable
            .activities
            .iter()
            .filter(|a| a.instructor_id.is_none())
            .count();

        let section_count = timetable.sections.len();
        let sections_complete = timetable
            .sections
            .iter()
            .filter(|s| timetable.is_section_complete(&s.id))
            .count();
        let completion_rate = if section_count == 0 {
            1.0
        } else {
            sections_complete as f64 / section_count as f64
        };

        let mut shortfall_by_section = HashMap::new();
        for section in &timetable.sections {
            let missing: u32 = section
                .section_courses
                .iter()
                .filter_map(|c| timetable.remaining_meetings(&section.id, c))
                .sum();
            if missing > 0 {
                shortfall_by_section.insert(section.id.clone(), missing);
            }
        }

        let last_day = if timetable.settings.include_saturday {
            Weekday::Saturday
        } else {
            Weekday::Friday
        }
        .number();

        let mut utilization_by_room = HashMap::new();
        for room in &timetable.rooms {
            let (used, available) = room
                .scheds
                .iter()
                .filter(|d| d.day <= last_day)
                .fold((0u32, 0u32), |(u, a), d| {
                    (
                        u.saturating_add(d.total_occupied_minutes),
                        a.saturating_add(d.available_minutes()),
                    )
                });
            let util = if available == 0 {
                0.0
            } else {
                used as f64 / available as f64
            };
            utilization_by_room.insert(room.id.clone(), util);
        }
        let avg_room_utilization = if utilization_by_room.is_empty() {
            0.0
        } else {
            let sum: f64 = utilization_by_room.values().sum();
            sum / utilization_by_room.len() as f64
        };

        Self {
            activity_count,
            unstaffed_activities,
            sections_complete,
            section_count,
            completion_rate,
            shortfall_by_section,
            utilization_by_room,
            avg_room_utilization,
            attempts: timetable.attempts,
        }
    }

    /// Whether the timetable meets the given quality thresholds.
    pub fn meets_thresholds(&self, min_completion: f64, max_unstaffed: usize) -> bool {
        self.completion_rate >= min_completion && self.unstaffed_activities <= max_unstaffed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Course, Instructor, Room, RoomType, Section, Settings, TimetableParams};
    use crate::scheduler::generate;

    fn params(settings: Settings) -> TimetableParams {
        let normal = RoomType::new("normal", "Normal");
        TimetableParams::new(settings.clone())
            .with_room(Room::new("R1", normal.clone(), &settings))
            .with_course(
                Course::new("MATH", 60)
                    .with_weekly_meetings(2)
                    .with_room_type(normal),
            )
            .with_section(Section::new("S1", &settings).with_course("MATH"))
    }

    #[test]
    fn test_kpi_basic() {
        let tt = generate(params(Settings::default()));
        let kpi = TimetableKpi::calculate(&tt);

        assert_eq!(kpi.activity_count, 2);
        assert_eq!(kpi.unstaffed_activities, 2);
        assert_eq!(kpi.sections_complete, 1);
        assert!((kpi.completion_rate - 1.0).abs() < 1e-10);
        assert!(kpi.shortfall_by_section.is_empty());
        assert_eq!(kpi.attempts, 1);
        assert!(!kpi.meets_thresholds(1.0, 0));
        assert!(kpi.meets_thresholds(1.0, 2));
    }

    #[test]
    fn test_kpi_utilization() {
        // Two 30-minute slots per day, six teaching days
        let settings = Settings::default()
            .with_day_window(420, 480)
            .with_excluded_periods(vec![]);
        let mut p = params(settings.clone());
        p.courses[0].minutes_per_session = 30;
        p = p.with_instructor(Instructor::new("T1", &settings).with_course("MATH"));
        let tt = generate(p);
        let kpi = TimetableKpi::calculate(&tt);

        // 60 of 360 minutes
        assert!((kpi.utilization_by_room["R1"] - 60.0 / 360.0).abs() < 1e-10);
        assert!((kpi.avg_room_utilization - 60.0 / 360.0).abs() < 1e-10);
        assert_eq!(kpi.unstaffed_activities, 0);
    }

    #[test]
    fn test_kpi_saturday_excluded() {
        let settings = Settings::default()
            .with_day_window(420, 480)
            .with_excluded_periods(vec![])
            .with_saturday(false);
        let mut p = params(settings);
        p.courses[0].minutes_per_session = 30;
        let tt = generate(p);
        let kpi = TimetableKpi::calculate(&tt);

        // 60 of 300 minutes
        assert!((kpi.utilization_by_room["R1"] - 0.2).abs() < 1e-10);
    }

    #[test]
    fn test_kpi_shortfall() {
        // One slot per day and no Saturday: only Tue/Thu and Mon/Fri pairs fit
        let settings = Settings::default()
            .with_day_window(420, 480)
            .with_excluded_periods(vec![])
            .with_saturday(false);
        let mut p = params(settings.clone());
        for s in 2..=3 {
            p = p.with_section(Section::new(format!("S{s}"), &settings).with_course("MATH"));
        }
        let tt = generate(p);
        let kpi = TimetableKpi::calculate(&tt);

        assert_eq!(kpi.section_count, 3);
        assert_eq!(kpi.sections_complete, 2);
        assert_eq!(kpi.shortfall_by_section.get("S3"), Some(&2));
        assert!((kpi.completion_rate - 2.0 / 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_kpi_empty() {
        let tt = Timetable::new(Settings::default());
        let kpi = TimetableKpi::calculate(&tt);
        assert_eq!(kpi.activity_count, 0);
        assert!((kpi.completion_rate - 1.0).abs() < 1e-10);
        assert_eq!(kpi.avg_room_utilization, 0.0);
    }
}
