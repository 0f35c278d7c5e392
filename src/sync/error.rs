//! Sync error types.

use derive_more::{Display, Error};
use tracing::{error, instrument};

/// Network or server failure while talking to the stats server.
#[derive(Debug, Clone, Display, Error)]
#[display("Sync error: {} at {}:{}", message, file, line)]
pub struct SyncError {
    /// Error message, suitable for showing to the operator.
    pub message: String,
    /// HTTP status, when the server answered.
    pub status: Option<u16>,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl SyncError {
    /// Creates a new sync error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        let message = message.into();
        error!(error_message = %message, "Sync error created");
        Self {
            message,
            status: None,
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Creates an error for a non-success HTTP response.
    #[track_caller]
    #[instrument(skip(body))]
    pub fn http(status: u16, body: &str) -> Self {
        let mut err = Self::new(format!("{}: {}", status, body));
        err.status = Some(status);
        err
    }
}

impl From<reqwest::Error> for SyncError {
    #[track_caller]
    fn from(err: reqwest::Error) -> Self {
        Self::new(format!("Request failed: {}", err))
    }
}
