//! The game aggregate.
//!
//! A [`Game`] owns everything recorded about one contest: identity, running
//! score and possession, line selection, completed and active points, the undo
//! log and the sync lifecycle status. It is persisted as a whole after every
//! mutation, so it serializes losslessly (including the undo stack).

use std::str::FromStr;

use chrono::{DateTime, Utc};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::{
    Action, Command, GameState, League, Line, ModelError, PlayerName, Point, Team, derive_state,
};

/// Delivery lifecycle of a game record.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum GameStatus {
    /// Created, nothing recorded yet.
    #[default]
    New,
    /// Recording.
    InProgress,
    /// Set aside by the operator.
    Paused,
    /// Upload started.
    Submitted,
    /// Last upload failed.
    SyncError,
    /// Delivered. The record is locked.
    Uploaded,
}

impl GameStatus {
    /// Converts status to the string stored in the database.
    pub fn to_db_string(&self) -> String {
        self.to_string()
    }

    /// Parses status from the string stored in the database.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError`] if the string is not a known status.
    #[instrument(skip(s), fields(s = %s))]
    pub fn from_db_string(s: &str) -> Result<Self, ModelError> {
        Self::from_str(s).map_err(|_| ModelError::new(format!("Invalid game status: '{}'", s)))
    }
}

/// The aggregate root for one recorded game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    local_id: Option<i32>,
    server_id: Option<i64>,
    league: League,
    week: u32,
    home_team: Team,
    away_team: Team,

    home_score: u32,
    away_score: u32,
    home_possession: bool,
    first_actor: Option<PlayerName>,
    points_at_half: usize,

    home_players: Option<Vec<PlayerName>>,
    away_players: Option<Vec<PlayerName>>,
    last_played_line: Option<Line>,

    points: Vec<Point>,
    active_point: Option<Point>,

    is_editing_lines: bool,
    is_editing_rosters: bool,

    undo_stack: Vec<Command>,

    status: GameStatus,
    local_error: Option<String>,
    sync_error: Option<String>,
    last_modified: DateTime<Utc>,
}

impl Game {
    /// Creates a fresh game between two teams.
    #[instrument(skip(league, home_team, away_team), fields(league = league.id(), home = %home_team.name(), away = %away_team.name()))]
    pub fn new(league: League, week: u32, home_team: Team, away_team: Team) -> Self {
        info!("Creating game");
        let mut home_team = home_team;
        let mut away_team = away_team;
        home_team.set_roster(home_team.roster().clone());
        away_team.set_roster(away_team.roster().clone());
        Self {
            local_id: None,
            server_id: None,
            league,
            week,
            home_team,
            away_team,
            home_score: 0,
            away_score: 0,
            home_possession: true,
            first_actor: None,
            points_at_half: 0,
            home_players: None,
            away_players: None,
            last_played_line: None,
            points: Vec::new(),
            active_point: None,
            is_editing_lines: false,
            is_editing_rosters: false,
            undo_stack: Vec::new(),
            status: GameStatus::New,
            local_error: None,
            sync_error: None,
            last_modified: Utc::now(),
        }
    }

    /// Restores a game from its persisted JSON form.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError`] if the record is malformed or names an unknown
    /// event type or status.
    #[instrument(skip(json), fields(len = json.len()))]
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let game: Game = serde_json::from_str(json)?;
        debug!(points = game.points.len(), undo = game.undo_stack.len(), "Game decoded");
        Ok(game)
    }

    /// Serializes the full aggregate, undo stack included.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError`] if serialization fails.
    #[instrument(skip(self))]
    pub fn to_json(&self) -> Result<String, ModelError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Current machine state.
    pub fn state(&self) -> GameState {
        derive_state(self)
    }

    /// True while the next point is the first of the game or of the second half.
    pub fn is_first_point_of_half(&self) -> bool {
        self.points.len() == self.points_at_half
    }

    /// True once halftime has been recorded.
    pub fn is_half_recorded(&self) -> bool {
        self.points_at_half > 0
    }

    /// Uploaded games are logically immutable.
    pub fn is_locked(&self) -> bool {
        self.status == GameStatus::Uploaded
    }

    /// True when lines for the next (or current) point are chosen.
    pub fn lines_chosen(&self) -> bool {
        self.home_players.is_some() && self.away_players.is_some()
    }

    /// Current line selection, if chosen.
    pub fn current_line(&self) -> Option<Line> {
        match (&self.home_players, &self.away_players) {
            (Some(home), Some(away)) => Some(Line::new(home.clone(), away.clone())),
            _ => None,
        }
    }

    /// Score as `(home, away)`.
    pub fn score(&self) -> (u32, u32) {
        (self.home_score, self.away_score)
    }

    /// Name of the team currently in possession.
    pub fn possessing_team(&self) -> &Team {
        if self.home_possession {
            &self.home_team
        } else {
            &self.away_team
        }
    }

    /// Number of points played including the active one.
    pub fn point_count(&self) -> usize {
        self.points.len() + usize::from(self.active_point.is_some())
    }

    /// True when undo would do something.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty() && !self.is_locked()
    }

    /// True when halftime may be recorded now.
    pub fn can_record_half(&self) -> bool {
        let point_unstarted = self
            .active_point
            .as_ref()
            .is_none_or(|p| p.event_count() == 0 && self.first_actor.is_none());
        !self.is_locked() && self.points_at_half == 0 && !self.points.is_empty() && point_unstarted
    }

    /// Actions a caller should currently offer.
    #[instrument(skip(self))]
    pub fn enabled_actions(&self) -> Vec<Action> {
        if self.is_locked() {
            return Vec::new();
        }
        let state = self.state();
        let mut actions: Vec<Action> = state.actions().to_vec();
        if self.can_record_half() && state != GameState::EditingLines {
            actions.push(Action::Half);
        }
        debug!(%state, count = actions.len(), "Enabled actions");
        actions
    }

    /// Whether tapping the given player is meaningful right now.
    ///
    /// In `Start` any on-field player may be chosen. In `PickUp` only players
    /// of the possessing team on the field. Otherwise the player is a pass
    /// target: an on-field teammate of the current thrower.
    #[instrument(skip(self))]
    pub fn player_enabled(&self, player: &str, is_home: bool) -> bool {
        if self.is_locked() {
            return false;
        }
        let on_line = |line: &Option<Vec<PlayerName>>| {
            line.as_ref().is_some_and(|l| l.iter().any(|p| p == player))
        };
        let on_field = if is_home {
            on_line(&self.home_players)
        } else {
            on_line(&self.away_players)
        };
        if !on_field {
            return false;
        }
        match self.state() {
            GameState::Start => true,
            GameState::PickUp => is_home == self.home_possession,
            GameState::FirstThrow
            | GameState::AfterPull
            | GameState::Normal
            | GameState::AfterTurnover
            | GameState::AfterDrop => {
                is_home == self.home_possession && self.first_actor.as_deref() != Some(player)
            }
            GameState::SelectingLines | GameState::EditingLines | GameState::Pull => false,
        }
    }

    /// Human-readable events of the active point, oldest first.
    pub fn event_history(&self) -> Vec<String> {
        self.active_point
            .as_ref()
            .map(Point::pretty_print)
            .unwrap_or_default()
    }

    /// Human-readable summary of every completed point.
    pub fn point_summaries(&self) -> Vec<String> {
        let mut home = 0u32;
        let mut away = 0u32;
        self.points
            .iter()
            .enumerate()
            .map(|(i, point)| {
                let scorer = point.scorer().cloned().unwrap_or_default();
                if self.home_team.player(&scorer).is_some() {
                    home += 1;
                } else {
                    away += 1;
                }
                format!("{}. {} scored ({}-{})", i + 1, scorer, home, away)
            })
            .collect()
    }

    /// Assigns the local id handed out by the store.
    pub fn assign_local_id(&mut self, id: i32) {
        self.local_id = Some(id);
    }

    /// Records the id returned by the server.
    pub fn assign_server_id(&mut self, id: i64) {
        self.server_id = Some(id);
    }

    /// Sets the lifecycle status.
    #[instrument(skip(self), fields(from = %self.status))]
    pub fn set_status(&mut self, status: GameStatus) {
        self.status = status;
    }

    /// Stores (or clears) the last local write failure.
    pub fn set_local_error(&mut self, error: Option<String>) {
        self.local_error = error;
    }

    /// Stores (or clears) the last upload failure.
    pub fn set_sync_error(&mut self, error: Option<String>) {
        self.sync_error = error;
    }

    /// Bumps the modification timestamp.
    pub fn touch(&mut self) {
        self.last_modified = Utc::now();
    }

    /// Marks the game as being recorded after a successful command.
    ///
    /// Editing after a failed or interrupted upload returns the game to
    /// `InProgress`; the last sync error message is kept for display.
    pub(crate) fn mark_in_progress(&mut self) {
        if !self.is_locked() {
            self.status = GameStatus::InProgress;
        }
        self.touch();
    }
}

/// Field access for the command and undo modules.
impl Game {
    pub(crate) fn home_score_mut(&mut self) -> &mut u32 {
        &mut self.home_score
    }

    pub(crate) fn away_score_mut(&mut self) -> &mut u32 {
        &mut self.away_score
    }

    pub(crate) fn set_home_possession(&mut self, home: bool) {
        self.home_possession = home;
    }

    pub(crate) fn set_first_actor(&mut self, actor: Option<PlayerName>) {
        self.first_actor = actor;
    }

    pub(crate) fn set_points_at_half(&mut self, n: usize) {
        self.points_at_half = n;
    }

    pub(crate) fn set_lines(&mut self, home: Option<Vec<PlayerName>>, away: Option<Vec<PlayerName>>) {
        self.home_players = home;
        self.away_players = away;
    }

    pub(crate) fn set_last_played_line(&mut self, line: Option<Line>) {
        self.last_played_line = line;
    }

    pub(crate) fn set_editing_lines(&mut self, editing: bool) {
        self.is_editing_lines = editing;
    }

    pub(crate) fn set_editing_rosters(&mut self, editing: bool) {
        self.is_editing_rosters = editing;
    }

    pub(crate) fn active_point_mut(&mut self) -> Option<&mut Point> {
        self.active_point.as_mut()
    }

    pub(crate) fn set_active_point(&mut self, point: Option<Point>) {
        self.active_point = point;
    }

    pub(crate) fn take_active_point(&mut self) -> Option<Point> {
        self.active_point.take()
    }

    pub(crate) fn push_point(&mut self, point: Point) {
        self.points.push(point);
    }

    pub(crate) fn pop_point(&mut self) -> Option<Point> {
        self.points.pop()
    }

    pub(crate) fn home_team_mut(&mut self) -> &mut Team {
        &mut self.home_team
    }

    pub(crate) fn away_team_mut(&mut self) -> &mut Team {
        &mut self.away_team
    }

    pub(crate) fn push_command(&mut self, command: Command) {
        self.undo_stack.push(command);
    }

    pub(crate) fn pop_command(&mut self) -> Option<Command> {
        self.undo_stack.pop()
    }
}
