//! Undo log.
//!
//! Each forward command records a pre-image of the parts of the aggregate it
//! may touch before mutating. Undo pops one record and restores that
//! pre-image, so every command is inverted by the same routine.

use chrono::{DateTime, Utc};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::{Game, Line, Player, PlayerName, Point};

/// Name of the command an undo record inverts.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumIter,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum CommandKind {
    /// Puller, thrower or pickup chosen.
    SelectFirstActor,
    /// Pull thrown.
    RecordPull,
    /// Completed pass.
    RecordPass,
    /// Dropped pass.
    RecordDrop,
    /// Errant throw.
    RecordThrowAway,
    /// Block leaving the disc loose.
    RecordDefense,
    /// Block caught by the defender.
    RecordCatchDefense,
    /// Score.
    RecordPoint,
    /// Halftime.
    RecordHalf,
    /// Line change during a point.
    RecordSubstitution,
    /// Rosters replaced.
    UpdateRosters,
}

impl CommandKind {
    /// Whether the undo record must also hold both rosters.
    pub fn touches_rosters(self) -> bool {
        matches!(self, CommandKind::UpdateRosters)
    }
}

/// Offense, defense and event count of the active point at capture time.
///
/// Events are append-only, so a count is enough to restore them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointShape {
    offense_players: Vec<PlayerName>,
    defense_players: Vec<PlayerName>,
    event_count: usize,
}

/// Both rosters, kept only for commands that replace them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterSnapshot {
    home: Vec<Player>,
    away: Vec<Player>,
}

/// Snapshot of the aggregate fields a command may change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct PreImage {
    home_score: u32,
    away_score: u32,
    home_possession: bool,
    first_actor: Option<PlayerName>,
    points_at_half: usize,
    home_players: Option<Vec<PlayerName>>,
    away_players: Option<Vec<PlayerName>>,
    last_played_line: Option<Line>,
    is_editing_lines: bool,
    completed_points: usize,
    active_point: Option<PointShape>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rosters: Option<RosterSnapshot>,
}

impl PreImage {
    /// Captures the values `kind` may change.
    #[instrument(skip(game), fields(points = game.points().len()))]
    pub fn capture(kind: CommandKind, game: &Game) -> Self {
        Self {
            home_score: *game.home_score(),
            away_score: *game.away_score(),
            home_possession: *game.home_possession(),
            first_actor: game.first_actor().clone(),
            points_at_half: *game.points_at_half(),
            home_players: game.home_players().clone(),
            away_players: game.away_players().clone(),
            last_played_line: game.last_played_line().clone(),
            is_editing_lines: *game.is_editing_lines(),
            completed_points: game.points().len(),
            active_point: game.active_point().as_ref().map(|p| PointShape {
                offense_players: p.offense_players().clone(),
                defense_players: p.defense_players().clone(),
                event_count: p.event_count(),
            }),
            rosters: kind.touches_rosters().then(|| RosterSnapshot {
                home: game.home_team().roster().clone(),
                away: game.away_team().roster().clone(),
            }),
        }
    }

    /// Writes the snapshot back into the aggregate.
    #[instrument(skip(self, game))]
    fn restore(self, game: &mut Game) {
        if game.points().len() > self.completed_points {
            let archived = game.pop_point();
            debug!("Restoring archived point as active");
            game.set_active_point(archived);
        }

        match self.active_point {
            None => game.set_active_point(None),
            Some(shape) => {
                // A point opened by line selection has no record of its own.
                if game.active_point().is_none() && shape.event_count == 0 {
                    debug!("Reopening unstarted point");
                    game.set_active_point(Some(Point::default()));
                }
                match game.active_point_mut() {
                    Some(point) => {
                        point.replace_players(shape.offense_players, shape.defense_players);
                        point.truncate_events(shape.event_count);
                    }
                    None => warn!("No active point to restore events into"),
                }
            }
        }

        if let Some(rosters) = self.rosters {
            game.home_team_mut().set_roster(rosters.home);
            game.away_team_mut().set_roster(rosters.away);
        }

        *game.home_score_mut() = self.home_score;
        *game.away_score_mut() = self.away_score;
        game.set_home_possession(self.home_possession);
        game.set_first_actor(self.first_actor);
        game.set_points_at_half(self.points_at_half);
        game.set_lines(self.home_players, self.away_players);
        game.set_last_played_line(self.last_played_line);
        game.set_editing_lines(self.is_editing_lines);
    }
}

/// An undo-log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct Command {
    #[serde(rename = "type")]
    kind: CommandKind,
    timestamp: DateTime<Utc>,
    #[serde(rename = "data")]
    pre_image: PreImage,
}

impl Command {
    /// Captures an undo record for `kind` from the aggregate as it is now.
    pub fn capture(kind: CommandKind, game: &Game) -> Self {
        Self {
            kind,
            timestamp: Utc::now(),
            pre_image: PreImage::capture(kind, game),
        }
    }
}

impl Game {
    /// Pushes an undo record for `kind`. Called by each command before it mutates.
    pub(crate) fn record(&mut self, kind: CommandKind) {
        let command = Command::capture(kind, self);
        self.push_command(command);
    }

    /// Reverts the most recent command.
    ///
    /// Returns the kind of command undone, or `None` if the stack was empty
    /// or the game is locked.
    #[instrument(skip(self), fields(depth = self.undo_stack().len()))]
    pub fn undo(&mut self) -> Option<CommandKind> {
        if self.is_locked() {
            debug!("Game is locked, ignoring undo");
            return None;
        }
        let command = self.pop_command()?;
        let kind = command.kind;
        command.pre_image.restore(self);
        self.mark_in_progress();
        info!(command = %kind, "Undid command");
        Some(kind)
    }
}
