//! Core error types for visitrota-core.
//!
//! One flat taxonomy: validation-level kinds (`NotFound`, `EmptyGroup`,
//! `AllSkipped`, `DuplicateSkip`, `Invalid`) are raised before any state
//! mutation; `Unauthenticated` and `ExternalSync` can surface mid-operation
//! and each operation documents what has been applied when they do.

use chrono::NaiveDate;
use thiserror::Error;

/// Core error type for visitrota-core.
#[derive(Error, Debug)]
pub enum RotaError {
    /// An entity referenced by id does not exist.
    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    /// The group has nobody to assign.
    #[error("group '{0}' has no members to assign")]
    EmptyGroup(String),

    /// Every candidate has a skip week for the target period.
    #[error("every member of group '{group_id}' has a skip week for {period_start}")]
    AllSkipped {
        group_id: String,
        period_start: NaiveDate,
    },

    /// Missing or unrefreshable calendar credentials.
    #[error("not authenticated: {0}")]
    Unauthenticated(String),

    /// Skip-week key collision on (user, group, period).
    #[error("skip week already recorded for user '{user_id}' in group '{group_id}' on {period_start}")]
    DuplicateSkip {
        user_id: String,
        group_id: String,
        period_start: NaiveDate,
    },

    /// The external calendar API rejected or failed a call.
    #[error("calendar sync failed: {0}")]
    ExternalSync(String),

    /// Input validation failure.
    #[error("invalid {field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },

    /// IO errors from the snapshot store.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RotaError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        RotaError::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        RotaError::Invalid {
            field,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for RotaError {
    fn from(err: reqwest::Error) -> Self {
        RotaError::ExternalSync(err.to_string())
    }
}

/// Result type alias for RotaError
pub type Result<T, E = RotaError> = std::result::Result<T, E>;
