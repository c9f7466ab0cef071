//! School timetable generation.
//!
//! Places the weekly recurring meetings of courses into room/day/time
//! slots, then attaches instructors and student sections to them while
//! honoring room-type compatibility, slot vacancy and daily/weekly
//! workload ceilings.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Room`, `Course`, `Instructor`, `Section`,
//!   `Activity`, `DaySched`, `Settings`, `Timetable`
//! - **`scheduler`**: The three-phase greedy engine with its retry loop, and KPIs
//! - **`serializer`**: Reference repair from flattened snapshots
//! - **`document`**: The stored `{sched, params}` JSON document
//! - **`validation`**: Input integrity checks and output property checks
//!
//! # Example
//!
//! ```
//! use u_timetable::models::{Course, Instructor, Room, Section, Settings, TimetableParams};
//! use u_timetable::scheduler::generate;
//!
//! let settings = Settings::default();
//! let normal = settings.room_type("normal").cloned().unwrap();
//! let params = TimetableParams::new(settings.clone())
//!     .with_room(Room::new("R101", normal.clone(), &settings))
//!     .with_course(Course::new("MATH", 60).with_weekly_meetings(2).with_room_type(normal))
//!     .with_instructor(Instructor::new("T1", &settings).with_course("MATH"))
//!     .with_section(Section::new("7-A", &settings).with_course("MATH"));
//!
//! let timetable = generate(params);
//! assert!(timetable.is_complete());
//! assert!(timetable
//!     .activities
//!     .iter()
//!     .all(|a| a.instructor_id.as_deref() == Some("T1")));
//! ```
//!
//! # Logging
//!
//! Progress and dropped references are reported through `tracing`. The
//! crate never installs a subscriber.

pub mod document;
pub mod error;
pub mod ids;
pub mod models;
pub mod scheduler;
pub mod serializer;
pub mod validation;

pub use document::TimetableDocument;
pub use error::TimetableError;
pub use models::{GenerationState, Settings, Timetable, TimetableParams};
pub use scheduler::{generate, TimetableScheduler};
pub use serializer::{Serializer, TimetableSnapshot};
