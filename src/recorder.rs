//! The recorder façade.
//!
//! [`GameRecorder`] owns one game aggregate. Every command runs against a
//! working copy, which is persisted through the [`GameStore`] before it
//! replaces the live game and subscribers are notified. A failed write leaves
//! the live game as it was (apart from `local_error`), so the command can be
//! retried.

use std::sync::Arc;

use derive_getters::Getters;
use derive_more::{Display, From};
use statkeeper_core::{
    Action, Game, GameState, GameStatus, Line, LineWarning, ModelError, Player, PlayerName,
    SubmissionPayload, check_line, invariants,
};
use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};

use crate::store::{GameStore, StoreError};
use crate::sync::{GameUploader, SyncError, TeamDirectory};

/// Capacity of the change-notification channel.
const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// Error from a recorder operation.
#[derive(Debug, Clone, Display, From)]
pub enum RecorderError {
    /// Local persistence failed.
    #[from]
    #[display("{_0}")]
    Store(StoreError),
    /// Server communication failed.
    #[from]
    #[display("{_0}")]
    Sync(SyncError),
    /// A record could not be interpreted.
    #[from]
    #[display("{_0}")]
    Model(ModelError),
    /// No stored game has this local id.
    #[display("No game with local id {_0}")]
    NotFound(i32),
}

impl std::error::Error for RecorderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Store(e) => Some(e),
            Self::Sync(e) => Some(e),
            Self::Model(e) => Some(e),
            Self::NotFound(_) => None,
        }
    }
}

/// What happened to a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ChangeKind {
    /// Game created and stored.
    Created,
    /// A forward command was applied.
    Recorded,
    /// The last command was undone.
    Undone,
    /// Line or roster selection or an editing mode changed.
    Selection,
    /// Lifecycle status changed.
    Status,
    /// A local write failed; see `local_error`.
    LocalError,
}

/// Notification sent to subscribers after every change.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct GameChanged {
    local_id: Option<i32>,
    kind: ChangeKind,
    state: GameState,
    status: GameStatus,
    score: (u32, u32),
}

/// Records one game: applies commands, persists and notifies.
pub struct GameRecorder {
    game: Game,
    store: Arc<dyn GameStore>,
    uploader: Arc<dyn GameUploader>,
    changes: broadcast::Sender<GameChanged>,
}

impl std::fmt::Debug for GameRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameRecorder")
            .field("local_id", self.game.local_id())
            .field("status", self.game.status())
            .finish_non_exhaustive()
    }
}

impl GameRecorder {
    /// Wraps an aggregate that is already stored.
    #[instrument(skip_all, fields(local_id = ?game.local_id()))]
    pub fn new(game: Game, store: Arc<dyn GameStore>, uploader: Arc<dyn GameUploader>) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            game,
            store,
            uploader,
            changes,
        }
    }

    /// Stores a fresh game and returns its recorder.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::Store`] if the game cannot be stored.
    #[instrument(skip_all, fields(home = %game.home_team().name(), away = %game.away_team().name()))]
    pub async fn start(
        game: Game,
        store: Arc<dyn GameStore>,
        uploader: Arc<dyn GameUploader>,
    ) -> Result<Self, RecorderError> {
        let mut game = game;
        let id = store.insert(&game).await?;
        game.assign_local_id(id);
        info!(local_id = id, "Game created");
        let recorder = Self::new(game, store, uploader);
        recorder.notify(ChangeKind::Created);
        Ok(recorder)
    }

    /// Creates a game from server data: the league's line size and both rosters.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::Sync`] if the league or a team cannot be
    /// fetched, or [`RecorderError::Store`] if the game cannot be stored.
    #[instrument(skip(directory, store, uploader))]
    pub async fn create(
        directory: &dyn TeamDirectory,
        store: Arc<dyn GameStore>,
        uploader: Arc<dyn GameUploader>,
        league_id: i64,
        week: u32,
        home_team_id: i64,
        away_team_id: i64,
    ) -> Result<Self, RecorderError> {
        if home_team_id == away_team_id {
            return Err(SyncError::new("Home and away teams must differ").into());
        }
        let league = directory.league(league_id).await?;
        let home = directory.team(league_id, home_team_id).await?;
        let away = directory.team(league_id, away_team_id).await?;
        debug!(home = %home.name(), away = %away.name(), line_size = league.line_size(), "Teams resolved");
        Self::start(Game::new(league, week, home, away), store, uploader).await
    }

    /// Loads a stored game.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::NotFound`] for an unknown id, or
    /// [`RecorderError::Store`] if the record cannot be read.
    #[instrument(skip(store, uploader))]
    pub async fn open(
        local_id: i32,
        store: Arc<dyn GameStore>,
        uploader: Arc<dyn GameUploader>,
    ) -> Result<Self, RecorderError> {
        let mut game = store
            .load(local_id)
            .await?
            .ok_or(RecorderError::NotFound(local_id))?;
        game.assign_local_id(local_id);
        debug!(state = %game.state(), status = %game.status(), "Game opened");
        Ok(Self::new(game, store, uploader))
    }

    /// Receives a [`GameChanged`] after every change.
    pub fn subscribe(&self) -> broadcast::Receiver<GameChanged> {
        self.changes.subscribe()
    }

    /// Read-only view of the aggregate.
    pub fn game(&self) -> &Game {
        &self.game
    }

    /// Current machine state.
    pub fn state(&self) -> GameState {
        self.game.state()
    }

    /// Actions a caller should currently offer.
    pub fn enabled_actions(&self) -> Vec<Action> {
        self.game.enabled_actions()
    }

    /// Score as `(home, away)`.
    pub fn score(&self) -> (u32, u32) {
        self.game.score()
    }

    /// True when the home team has (or last had) the disc.
    pub fn home_possession(&self) -> bool {
        *self.game.home_possession()
    }

    /// Current line selection.
    pub fn current_line(&self) -> Option<Line> {
        self.game.current_line()
    }

    /// Proposed line for the next point.
    pub fn suggested_line(&self) -> Line {
        self.game.suggested_line()
    }

    /// Warnings for a proposed line. Never blocks selection.
    pub fn check_line(&self, line: &Line) -> Vec<LineWarning> {
        check_line(
            line,
            *self.game.league().line_size(),
            self.game.home_team(),
            self.game.away_team(),
        )
    }

    /// Human-readable events of the active point.
    pub fn event_history(&self) -> Vec<String> {
        self.game.event_history()
    }

    /// Whether undo would do something.
    pub fn can_undo(&self) -> bool {
        self.game.can_undo()
    }

    /// Lifecycle status.
    pub fn status(&self) -> GameStatus {
        *self.game.status()
    }

    /// Wire payload of the game as it stands.
    pub fn export(&self) -> SubmissionPayload {
        SubmissionPayload::from_game(&self.game)
    }

    /// Chooses the puller, first thrower or player who picked up the disc.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::Store`] if the change cannot be persisted.
    #[instrument(skip(self), fields(local_id = ?self.game.local_id()))]
    pub async fn select_first_actor(
        &mut self,
        player: &str,
        is_home_team_player: bool,
    ) -> Result<bool, RecorderError> {
        self.perform(ChangeKind::Recorded, |g| {
            g.select_first_actor(player, is_home_team_player)
        })
        .await
    }

    /// Records the pull.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::Store`] if the change cannot be persisted.
    #[instrument(skip(self), fields(local_id = ?self.game.local_id()))]
    pub async fn record_pull(&mut self) -> Result<bool, RecorderError> {
        self.perform(ChangeKind::Recorded, Game::record_pull).await
    }

    /// Records a pass to `receiver`.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::Store`] if the change cannot be persisted.
    #[instrument(skip(self), fields(local_id = ?self.game.local_id()))]
    pub async fn record_pass(&mut self, receiver: &str) -> Result<bool, RecorderError> {
        self.perform(ChangeKind::Recorded, |g| g.record_pass(receiver))
            .await
    }

    /// Records a drop.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::Store`] if the change cannot be persisted.
    #[instrument(skip(self), fields(local_id = ?self.game.local_id()))]
    pub async fn record_drop(&mut self) -> Result<bool, RecorderError> {
        self.perform(ChangeKind::Recorded, Game::record_drop).await
    }

    /// Records a throwaway.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::Store`] if the change cannot be persisted.
    #[instrument(skip(self), fields(local_id = ?self.game.local_id()))]
    pub async fn record_throw_away(&mut self) -> Result<bool, RecorderError> {
        self.perform(ChangeKind::Recorded, Game::record_throw_away)
            .await
    }

    /// Records a block that leaves the disc loose.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::Store`] if the change cannot be persisted.
    #[instrument(skip(self), fields(local_id = ?self.game.local_id()))]
    pub async fn record_defense(&mut self) -> Result<bool, RecorderError> {
        self.perform(ChangeKind::Recorded, Game::record_defense).await
    }

    /// Records a block caught by the defender.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::Store`] if the change cannot be persisted.
    #[instrument(skip(self), fields(local_id = ?self.game.local_id()))]
    pub async fn record_catch_defense(&mut self) -> Result<bool, RecorderError> {
        self.perform(ChangeKind::Recorded, Game::record_catch_defense)
            .await
    }

    /// Records a score.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::Store`] if the change cannot be persisted.
    #[instrument(skip(self), fields(local_id = ?self.game.local_id()))]
    pub async fn record_point(&mut self) -> Result<bool, RecorderError> {
        self.perform(ChangeKind::Recorded, Game::record_point).await
    }

    /// Records halftime.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::Store`] if the change cannot be persisted.
    #[instrument(skip(self), fields(local_id = ?self.game.local_id()))]
    pub async fn record_half(&mut self) -> Result<bool, RecorderError> {
        self.perform(ChangeKind::Recorded, Game::record_half).await
    }

    /// Sets the lines for the next point, or substitutes during a point.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::Store`] if the change cannot be persisted.
    #[instrument(skip(self, home, away), fields(local_id = ?self.game.local_id()))]
    pub async fn select_active_lines(
        &mut self,
        home: Vec<PlayerName>,
        away: Vec<PlayerName>,
    ) -> Result<bool, RecorderError> {
        for warning in self.check_line(&Line::new(home.clone(), away.clone())) {
            warn!(%warning, "Line accepted with warning");
        }
        self.perform(ChangeKind::Selection, |g| g.select_active_lines(home, away))
            .await
    }

    /// Replaces the lines of the active point, keeping its events.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::Store`] if the change cannot be persisted.
    #[instrument(skip(self, home, away), fields(local_id = ?self.game.local_id()))]
    pub async fn substitute_during_point(
        &mut self,
        home: Vec<PlayerName>,
        away: Vec<PlayerName>,
    ) -> Result<bool, RecorderError> {
        self.perform(ChangeKind::Recorded, |g| {
            g.substitute_during_point(home, away)
        })
        .await
    }

    /// Enters line-editing mode.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::Store`] if the change cannot be persisted.
    pub async fn begin_line_edit(&mut self) -> Result<bool, RecorderError> {
        self.perform(ChangeKind::Selection, Game::begin_line_edit)
            .await
    }

    /// Leaves line-editing mode.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::Store`] if the change cannot be persisted.
    pub async fn cancel_line_edit(&mut self) -> Result<bool, RecorderError> {
        self.perform(ChangeKind::Selection, Game::cancel_line_edit)
            .await
    }

    /// Enters roster-editing mode.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::Store`] if the change cannot be persisted.
    pub async fn begin_roster_edit(&mut self) -> Result<bool, RecorderError> {
        self.perform(ChangeKind::Selection, Game::begin_roster_edit)
            .await
    }

    /// Leaves roster-editing mode without changes.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::Store`] if the change cannot be persisted.
    pub async fn cancel_roster_edit(&mut self) -> Result<bool, RecorderError> {
        self.perform(ChangeKind::Selection, Game::cancel_roster_edit)
            .await
    }

    /// Replaces both rosters. Undoable.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::Store`] if the change cannot be persisted.
    #[instrument(skip(self, home, away), fields(local_id = ?self.game.local_id()))]
    pub async fn update_rosters(
        &mut self,
        home: Vec<Player>,
        away: Vec<Player>,
    ) -> Result<bool, RecorderError> {
        self.perform(ChangeKind::Recorded, |g| g.update_rosters(home, away))
            .await
    }

    /// Reverts the most recent command.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::Store`] if the change cannot be persisted.
    #[instrument(skip(self), fields(local_id = ?self.game.local_id()))]
    pub async fn undo(&mut self) -> Result<bool, RecorderError> {
        self.perform(ChangeKind::Undone, |g| g.undo().is_some())
            .await
    }

    /// Sets the game aside. The next command resumes it.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::Store`] if the change cannot be persisted.
    #[instrument(skip(self), fields(local_id = ?self.game.local_id()))]
    pub async fn pause(&mut self) -> Result<bool, RecorderError> {
        self.perform(ChangeKind::Status, |g| {
            if g.is_locked() || *g.status() == GameStatus::Paused {
                return false;
            }
            g.set_status(GameStatus::Paused);
            g.touch();
            true
        })
        .await
    }

    /// Delivers the game to the server.
    ///
    /// Status goes to `submitted` (persisted) before the upload, then to
    /// `uploaded` or `sync-error`. A failed upload keeps the message in
    /// `sync_error`, leaves the game editable and is retried with
    /// [`GameRecorder::resync`].
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::Sync`] if the upload fails (after recording
    /// the failure) or [`RecorderError::Store`] if a status change cannot be
    /// persisted.
    #[instrument(skip(self), fields(local_id = ?self.game.local_id()))]
    pub async fn submit(&mut self) -> Result<GameStatus, RecorderError> {
        if self.game.is_locked() {
            debug!("Already uploaded");
            return Ok(GameStatus::Uploaded);
        }

        self.set_status(GameStatus::Submitted, None).await?;
        let payload = SubmissionPayload::from_game(&self.game);
        info!(points = payload.points().len(), "Submitting game");

        match self.uploader.upload(&payload).await {
            Ok(server_id) => {
                let mut next = self.game.clone();
                if let Some(id) = server_id {
                    next.assign_server_id(id);
                }
                next.set_status(GameStatus::Uploaded);
                next.set_sync_error(None);
                next.touch();
                self.persist(next, ChangeKind::Status).await?;
                info!(server_id = ?server_id, "Game uploaded");
                Ok(GameStatus::Uploaded)
            }
            Err(e) => {
                warn!(error = %e.message, "Upload failed");
                self.set_status(GameStatus::SyncError, Some(e.message.clone()))
                    .await?;
                Err(e.into())
            }
        }
    }

    /// Retries delivery after a failed or interrupted upload.
    ///
    /// # Errors
    ///
    /// See [`GameRecorder::submit`].
    #[instrument(skip(self), fields(local_id = ?self.game.local_id(), status = %self.game.status()))]
    pub async fn resync(&mut self) -> Result<GameStatus, RecorderError> {
        info!(previous_error = ?self.game.sync_error(), "Retrying upload");
        self.submit().await
    }

    async fn set_status(
        &mut self,
        status: GameStatus,
        sync_error: Option<String>,
    ) -> Result<(), RecorderError> {
        let mut next = self.game.clone();
        next.set_status(status);
        if sync_error.is_some() {
            next.set_sync_error(sync_error);
        }
        next.touch();
        self.persist(next, ChangeKind::Status).await
    }

    /// Applies `command` to a working copy and commits it if it changed anything.
    async fn perform<F>(&mut self, kind: ChangeKind, command: F) -> Result<bool, RecorderError>
    where
        F: FnOnce(&mut Game) -> bool,
    {
        let mut next = self.game.clone();
        if !command(&mut next) {
            debug!(%kind, state = %self.game.state(), "Command not applicable");
            return Ok(false);
        }
        next.set_local_error(None);
        self.persist(next, kind).await?;
        Ok(true)
    }

    /// Writes `next` and makes it the live game. On failure the live game is
    /// kept and `local_error` records why.
    async fn persist(&mut self, next: Game, kind: ChangeKind) -> Result<(), RecorderError> {
        if let Err(e) = self.store.save(&next).await {
            warn!(error = %e.message, "Failed to persist game");
            self.game.set_local_error(Some(e.message.clone()));
            self.notify(ChangeKind::LocalError);
            return Err(e.into());
        }
        if let Err(violations) = invariants::audit(&next) {
            warn!(count = violations.len(), "Persisted game violates invariants");
        }
        self.game = next;
        self.notify(kind);
        Ok(())
    }

    fn notify(&self, kind: ChangeKind) {
        let change = GameChanged {
            local_id: *self.game.local_id(),
            kind,
            state: self.game.state(),
            status: *self.game.status(),
            score: self.game.score(),
        };
        debug!(%kind, state = %change.state, "Notifying subscribers");
        // No subscribers is fine.
        let _ = self.changes.send(change);
    }
}
