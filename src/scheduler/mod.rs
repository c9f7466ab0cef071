//! Timetable generation engine and KPI evaluation.
//!
//! # Algorithm
//!
//! `TimetableScheduler` runs three greedy phases per pass:
//!
//! 1. **Course → room**: allocate each course's weekly offerings across
//!    priority day subsets in compatible rooms.
//! 2. **Instructor → activity**: attach whole pair groups to compatible
//!    instructors within their daily ceiling and weekly cap.
//! 3. **Section → activity**: let each section claim the meetings of its
//!    required courses.
//!
//! Unclaimed activities are dropped after each pass. An incomplete pass
//! restarts from scratch with one more offering per course, up to a
//! bounded number of passes. It is not optimal and never backtracks.
//!
//! # KPI
//!
//! `TimetableKpi` summarizes completion, staffing and room utilization.

mod assignment;
mod engine;
mod kpi;
mod placement;

pub use engine::{generate, TimetableScheduler};
pub use kpi::TimetableKpi;
