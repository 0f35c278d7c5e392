//! Error types for loading and decoding game records.

use derive_more::{Display, Error};
use tracing::instrument;

/// Model error with location tracking.
///
/// Raised when a persisted or received record cannot be interpreted, for
/// example an unknown event type or status string.
#[derive(Debug, Clone, Display, Error)]
#[display("Model error: {} at {}:{}", message, file, line)]
pub struct ModelError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ModelError {
    /// Creates a new model error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<serde_json::Error> for ModelError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        Self::new(format!("Malformed game record: {}", err))
    }
}
