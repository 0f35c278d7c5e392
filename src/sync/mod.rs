//! Delivery of finished games and lookup of leagues and teams.

mod client;
mod error;

use async_trait::async_trait;
use statkeeper_core::{League, SubmissionPayload, Team};

pub use client::HttpSyncClient;
pub use error::SyncError;

/// Delivers a finished game to the server.
#[async_trait]
pub trait GameUploader: Send + Sync {
    /// Posts the payload. Returns the server's id for the game when it sends one.
    ///
    /// Resubmitting the same payload is safe; the server owns deduplication.
    async fn upload(&self, payload: &SubmissionPayload) -> Result<Option<i64>, SyncError>;
}

/// Read-only lookup of leagues and their teams.
#[async_trait]
pub trait TeamDirectory: Send + Sync {
    /// All leagues known to the server.
    async fn leagues(&self) -> Result<Vec<League>, SyncError>;

    /// Teams, with rosters, of one league.
    async fn teams(&self, league_id: i64) -> Result<Vec<Team>, SyncError>;

    /// One league by id.
    async fn league(&self, league_id: i64) -> Result<League, SyncError> {
        self.leagues()
            .await?
            .into_iter()
            .find(|l| *l.id() == league_id)
            .ok_or_else(|| SyncError::new(format!("Unknown league {}", league_id)))
    }

    /// One team of a league by id.
    async fn team(&self, league_id: i64, team_id: i64) -> Result<Team, SyncError> {
        self.teams(league_id)
            .await?
            .into_iter()
            .find(|t| *t.id() == team_id)
            .ok_or_else(|| {
                SyncError::new(format!("Unknown team {} in league {}", team_id, league_id))
            })
    }
}
