//! Persistence port for game aggregates.
//!
//! The recorder is constructed with a [`GameStore`]. [`GameRepository`] is the
//! sqlite implementation; [`MemoryGameStore`] keeps records in memory for
//! tests and throwaway sessions.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use derive_getters::Getters;
use derive_more::{Display, Error};
use statkeeper_core::{Game, GameStatus};
use tracing::{debug, instrument, warn};

use crate::db::{DbError, GameRepository, GameRow};

/// Persistence error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Store error: {} at {}:{}", message, file, line)]
pub struct StoreError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl StoreError {
    /// Creates a new store error with caller location tracking.
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

impl From<DbError> for StoreError {
    #[track_caller]
    fn from(err: DbError) -> Self {
        Self::new(err.message)
    }
}

impl From<tokio::task::JoinError> for StoreError {
    #[track_caller]
    fn from(err: tokio::task::JoinError) -> Self {
        Self::new(format!("Persistence task failed: {}", err))
    }
}

/// Listing entry for a stored game.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct GameSummary {
    local_id: i32,
    league_id: i64,
    week: u32,
    home_team: String,
    away_team: String,
    status: GameStatus,
    last_modified: DateTime<Utc>,
}

impl GameSummary {
    /// Summarizes an aggregate that has a local id.
    pub fn from_game(game: &Game) -> Option<Self> {
        Some(Self {
            local_id: (*game.local_id())?,
            league_id: *game.league().id(),
            week: *game.week(),
            home_team: game.home_team().name().clone(),
            away_team: game.away_team().name().clone(),
            status: *game.status(),
            last_modified: *game.last_modified(),
        })
    }
}

impl TryFrom<&GameRow> for GameSummary {
    type Error = DbError;

    fn try_from(row: &GameRow) -> Result<Self, Self::Error> {
        Ok(Self {
            local_id: *row.id(),
            league_id: *row.league_id(),
            week: u32::try_from(*row.week())
                .map_err(|_| DbError::corrupt(*row.id(), format!("negative week {}", row.week())))?,
            home_team: row.home_team().clone(),
            away_team: row.away_team().clone(),
            status: row.parse_status()?,
            last_modified: row.last_modified().and_utc(),
        })
    }
}

/// Where game aggregates are kept between commands.
#[async_trait]
pub trait GameStore: Send + Sync {
    /// Stores a new game and returns its local id.
    async fn insert(&self, game: &Game) -> Result<i32, StoreError>;

    /// Overwrites the stored copy of a game that has a local id.
    async fn save(&self, game: &Game) -> Result<(), StoreError>;

    /// Loads a game. `None` if the id is unknown.
    async fn load(&self, local_id: i32) -> Result<Option<Game>, StoreError>;

    /// Lists stored games, most recently modified first.
    async fn list(&self) -> Result<Vec<GameSummary>, StoreError>;
}

#[async_trait]
impl GameStore for GameRepository {
    #[instrument(skip(self, game))]
    async fn insert(&self, game: &Game) -> Result<i32, StoreError> {
        let repo = self.clone();
        let game = game.clone();
        Ok(tokio::task::spawn_blocking(move || repo.insert_game(&game)).await??)
    }

    #[instrument(skip(self, game), fields(local_id = ?game.local_id()))]
    async fn save(&self, game: &Game) -> Result<(), StoreError> {
        let repo = self.clone();
        let game = game.clone();
        Ok(tokio::task::spawn_blocking(move || repo.save_game(&game)).await??)
    }

    #[instrument(skip(self))]
    async fn load(&self, local_id: i32) -> Result<Option<Game>, StoreError> {
        let repo = self.clone();
        Ok(tokio::task::spawn_blocking(move || repo.load_game(local_id)).await??)
    }

    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<GameSummary>, StoreError> {
        let repo = self.clone();
        let rows = tokio::task::spawn_blocking(move || repo.list_games()).await??;
        let mut summaries = Vec::with_capacity(rows.len());
        for row in &rows {
            match GameSummary::try_from(row) {
                Ok(summary) => summaries.push(summary),
                Err(e) => warn!(local_id = row.id(), error = %e, "Skipping unreadable game"),
            }
        }
        Ok(summaries)
    }
}

/// In-memory store holding each game as its serialized record.
///
/// Writes can be made to fail on demand to exercise error paths.
#[derive(Debug, Default)]
pub struct MemoryGameStore {
    records: Mutex<BTreeMap<i32, String>>,
    fail_writes: AtomicBool,
}

impl MemoryGameStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent write fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of stored games.
    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or_default()
    }

    /// True when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::new("Storage unavailable"));
        }
        Ok(())
    }

    fn records(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<i32, String>>, StoreError> {
        self.records
            .lock()
            .map_err(|_| StoreError::new("Memory store lock poisoned"))
    }
}

#[async_trait]
impl GameStore for MemoryGameStore {
    #[instrument(skip(self, game))]
    async fn insert(&self, game: &Game) -> Result<i32, StoreError> {
        self.check_writable()?;
        let mut records = self.records()?;
        let id = records.keys().next_back().map_or(1, |last| last + 1);
        let mut stored = game.clone();
        stored.assign_local_id(id);
        let json = stored
            .to_json()
            .map_err(|e| StoreError::new(e.message))?;
        records.insert(id, json);
        debug!(local_id = id, "Game stored in memory");
        Ok(id)
    }

    #[instrument(skip(self, game), fields(local_id = ?game.local_id()))]
    async fn save(&self, game: &Game) -> Result<(), StoreError> {
        self.check_writable()?;
        let id = game
            .local_id()
            .ok_or_else(|| StoreError::new("Cannot save a game without a local id"))?;
        let json = game.to_json().map_err(|e| StoreError::new(e.message))?;
        let mut records = self.records()?;
        match records.get_mut(&id) {
            Some(slot) => {
                *slot = json;
                Ok(())
            }
            None => Err(StoreError::new(format!("No game with local id {}", id))),
        }
    }

    #[instrument(skip(self))]
    async fn load(&self, local_id: i32) -> Result<Option<Game>, StoreError> {
        let records = self.records()?;
        records
            .get(&local_id)
            .map(|json| Game::from_json(json).map_err(|e| StoreError::new(e.message)))
            .transpose()
    }

    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<GameSummary>, StoreError> {
        let records = self.records()?;
        let mut summaries = Vec::with_capacity(records.len());
        for json in records.values() {
            let game = Game::from_json(json).map_err(|e| StoreError::new(e.message))?;
            if let Some(summary) = GameSummary::from_game(&game) {
                summaries.push(summary);
            }
        }
        summaries.sort_by(|a, b| b.last_modified.cmp(&a.last_modified));
        Ok(summaries)
    }
}
