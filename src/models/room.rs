//! Room and room-type models.
//!
//! A room hosts activities. Its type decides which courses may be placed
//! in it. Each room owns seven day schedules.

use serde::{Deserialize, Serialize};

use super::day_sched::{DaySched, Week};
use super::settings::{EntityKind, Settings};
use crate::ids::{generate_id, DEFAULT_ID_LEN};

/// A room classification (lecture room, laboratory, …).
///
/// Equality is by identifier only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomType {
    /// Unique type identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Display color (CSS hex).
    pub color: String,
}

impl PartialEq for RoomType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for RoomType {}

impl RoomType {
    /// Creates a room type.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: String::new(),
        }
    }

    /// Creates a room type with a generated identifier.
    pub fn named(name: impl Into<String>) -> Self {
        Self::new(generate_id(DEFAULT_ID_LEN), name)
    }

    /// Sets the display color.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }
}

/// A room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    /// Unique room identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Room classification.
    pub room_type: RoomType,
    /// Day schedules, Monday through Sunday.
    pub scheds: Week,
}

impl Room {
    /// Creates a room with an empty week.
    pub fn new(id: impl Into<String>, room_type: RoomType, settings: &Settings) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            room_type,
            scheds: DaySched::create_week(settings, EntityKind::Room),
        }
    }

    /// Sets the room name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Whether this room is of the given type.
    pub fn is_type(&self, room_type: &RoomType) -> bool {
        self.room_type == *room_type
    }
}
