//! Timetable domain models.
//!
//! Provides the data types a timetable is built from. Entities reference
//! each other by identifier only, so every type here serializes as plain
//! data.
//!
//! # Entities
//!
//! | Type | Owns | References |
//! |------|------|------------|
//! | `Room` | 7 × `DaySched` | `RoomType` |
//! | `Course` | activity ids | `RoomType`s |
//! | `Instructor` | 7 × `DaySched` | course ids |
//! | `Section` | 7 × `DaySched` | course ids |
//! | `Activity` | none | course, room, instructor, section ids |
//! | `Timetable` | all of the above + `ActivitySet` | none |

mod activity;
mod calendar;
mod course;
mod day_sched;
mod instructor;
mod room;
mod section;
mod settings;
mod timetable;

pub use activity::{Activity, ActivityRef, ActivitySet, PairKey};
pub use calendar::{Day, DayPriorities, TimeWindow, Weekday};
pub use course::Course;
pub use day_sched::{DaySched, Week};
pub use instructor::Instructor;
pub use room::{Room, RoomType};
pub use section::Section;
pub use settings::{EntityKind, Settings};
pub use timetable::{GenerationState, Timetable, TimetableParams};

pub(crate) use timetable::EntityIndex;
