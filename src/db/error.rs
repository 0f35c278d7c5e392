//! Database error types.

use derive_more::{Display, Error};
use tracing::instrument;

/// What went wrong with the local game database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum DbErrorKind {
    /// The database file could not be opened.
    Connection,
    /// The schema could not be brought up to date.
    Migration,
    /// A query or write failed.
    Query,
    /// No stored game has the requested local id.
    MissingGame,
    /// A stored row could not be turned back into a game.
    Corrupt,
    /// The caller passed something that cannot be stored.
    Invalid,
}

/// Database error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Database error ({}): {} at {}:{}", kind, message, file, line)]
pub struct DbError {
    /// Failure category.
    pub kind: DbErrorKind,
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl DbError {
    /// Creates a new database error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(kind: DbErrorKind, message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// No row for this local id.
    #[track_caller]
    pub fn missing_game(local_id: i32) -> Self {
        Self::new(
            DbErrorKind::MissingGame,
            format!("No game with local id {}", local_id),
        )
    }

    /// The row for this local id holds an unreadable record.
    #[track_caller]
    pub fn corrupt(local_id: i32, reason: impl std::fmt::Display) -> Self {
        Self::new(
            DbErrorKind::Corrupt,
            format!("Stored game {} is unreadable: {}", local_id, reason),
        )
    }

    /// True when the requested game does not exist.
    pub fn is_missing_game(&self) -> bool {
        self.kind == DbErrorKind::MissingGame
    }
}

impl From<diesel::result::Error> for DbError {
    #[track_caller]
    fn from(err: diesel::result::Error) -> Self {
        Self::new(DbErrorKind::Query, format!("Diesel error: {}", err))
    }
}

impl From<diesel::ConnectionError> for DbError {
    #[track_caller]
    fn from(err: diesel::ConnectionError) -> Self {
        Self::new(DbErrorKind::Connection, format!("Connection error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_kind() {
        let err = DbError::missing_game(7);
        assert!(err.is_missing_game());
        assert!(
            err.to_string()
                .starts_with("Database error (missing-game): No game with local id 7")
        );
    }

    #[test]
    fn test_corrupt_names_row() {
        let err = DbError::corrupt(3, "Invalid game status: 'archived'");
        assert_eq!(err.kind, DbErrorKind::Corrupt);
        assert!(!err.is_missing_game());
        assert_eq!(err.message, "Stored game 3 is unreadable: Invalid game status: 'archived'");
    }
}
