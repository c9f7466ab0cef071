//! Error types for the fallible timetable boundaries.
//!
//! Placement failures are not errors: the engine skips what it cannot
//! seat and reports completeness through [`GenerationState`](crate::models::GenerationState).
//! Errors only arise when input cannot be interpreted at all.

use thiserror::Error;

/// Errors raised while loading, repairing or configuring a timetable.
#[derive(Debug, Error)]
pub enum TimetableError {
    /// The snapshot carries no settings, so no day schedule can be rebuilt.
    #[error("Snapshot has no settings")]
    MissingSettings,

    /// Settings are structurally unusable (e.g. zero interval).
    #[error("Invalid settings: {message}")]
    InvalidSettings { message: String },

    /// The stored document is not valid JSON for the expected shape.
    #[error("Malformed document: {0}")]
    Json(#[from] serde_json::Error),
}

impl TimetableError {
    /// Creates an invalid-settings error.
    pub fn invalid_settings(message: impl Into<String>) -> Self {
        TimetableError::InvalidSettings {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            TimetableError::MissingSettings.to_string(),
            "Snapshot has no settings"
        );
        assert_eq!(
            TimetableError::invalid_settings("interval is zero").to_string(),
            "Invalid settings: interval is zero"
        );
    }

    #[test]
    fn test_json_error_conversion() {
        let err: TimetableError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, TimetableError::Json(_)));
    }
}
