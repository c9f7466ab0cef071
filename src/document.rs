//! Persisted timetable document.
//!
//! A document is stored as one JSON text blob holding the generation input
//! (`params`) next to the last generated result (`sched`), both flattened.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::TimetableError;
use crate::models::{GenerationState, Timetable, TimetableParams};
use crate::scheduler::TimetableScheduler;
use crate::serializer::{Serializer, TimetableSnapshot};

/// The `{sched, params}` pair of one stored timetable.
///
/// # Example
///
/// ```
/// use u_timetable::document::TimetableDocument;
///
/// let json = r#"{
///     "params": {
///         "settings": {},
///         "rooms": [{"id": "R1", "type": "normal"}],
///         "courses": [{"id": "MATH", "minutes_per_session": 60, "compatible_room_types": ["normal"]}],
///         "sections": [{"id": "S1", "section_courses": ["MATH"]}]
///     }
/// }"#;
///
/// let mut doc = TimetableDocument::from_json(json).unwrap();
/// let state = doc.generate().unwrap();
/// assert!(state.is_complete());
/// assert_eq!(doc.timetable().unwrap().activities.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimetableDocument {
    /// Last generated result.
    pub sched: TimetableSnapshot,
    /// Generation input.
    pub params: TimetableSnapshot,
}

impl TimetableDocument {
    /// Creates a document for the given input with no result yet.
    pub fn new(params: &TimetableParams) -> Self {
        Self {
            sched: TimetableSnapshot::default(),
            params: TimetableSnapshot::from(params),
        }
    }

    /// Parses a stored blob.
    pub fn from_json(json: &str) -> Result<Self, TimetableError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Renders the document as a storage blob.
    pub fn to_json(&self) -> Result<String, TimetableError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Repairs the stored result into a live timetable.
    pub fn timetable(&self) -> Option<Timetable> {
        Serializer::fix(&self.sched)
    }

    /// Regenerates the result from the stored input.
    ///
    /// Fails when the input has no settings or its slot grid is unusable;
    /// an unsatisfiable input is not an error and ends `Incomplete`.
    pub fn generate(&mut self) -> Result<GenerationState, TimetableError> {
        let params = Serializer::extract(&self.params).ok_or(TimetableError::MissingSettings)?;
        params.settings.validate()?;

        let timetable = TimetableScheduler::new().generate(params);
        info!(
            state = ?timetable.state,
            attempts = timetable.attempts,
            "document regenerated"
        );
        self.sched = TimetableSnapshot::from(&timetable);
        Ok(timetable.state)
    }
}
