//! Derived machine states and the actions each one offers.

use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use crate::{EventType, Game};

/// What can happen next, derived from the aggregate.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumIter,
)]
pub enum GameState {
    /// Lines for the next point have not been chosen.
    SelectingLines,
    /// The operator is changing the line.
    EditingLines,
    /// Lines are chosen, waiting for the first actor (puller or thrower).
    Start,
    /// Puller chosen on the first point of a half.
    Pull,
    /// Disc is loose, waiting for whoever picks it up.
    PickUp,
    /// Thrower chosen on a point that starts without a pull.
    FirstThrow,
    /// Ordinary possession.
    Normal,
    /// Disc picked up after a throwaway.
    AfterTurnover,
    /// Disc picked up after a drop.
    AfterDrop,
    /// Disc picked up after the pull.
    AfterPull,
}

/// Operations a caller may offer in a given state.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumIter,
)]
pub enum Action {
    /// Choose lines for the next point.
    SelectLines,
    /// Change the line (between points or mid-point).
    ChangeLine,
    /// Edit rosters.
    EditRosters,
    /// Select any on-field player as first actor.
    SelectAnyPlayer,
    /// Select a player of the possessing team.
    SelectPossessingPlayer,
    /// Record the pull.
    Pull,
    /// Record a pass to a teammate.
    Pass,
    /// Record a score.
    Point,
    /// Record a drop.
    Drop,
    /// Record a throwaway.
    Throwaway,
    /// Record a block that leaves the disc loose.
    Defense,
    /// Record a block caught by the defender.
    CatchDefense,
    /// Record halftime.
    Half,
}

impl GameState {
    /// Actions offered in this state, ignoring undo and halftime bookkeeping.
    #[instrument]
    pub fn actions(self) -> &'static [Action] {
        use Action::*;
        match self {
            GameState::SelectingLines => &[SelectLines, EditRosters],
            GameState::EditingLines => &[SelectLines],
            GameState::Start => &[SelectAnyPlayer, ChangeLine, EditRosters],
            GameState::Pull => &[Pull, ChangeLine],
            GameState::PickUp => &[SelectPossessingPlayer, ChangeLine],
            GameState::FirstThrow | GameState::AfterPull => &[Pass, Throwaway, ChangeLine],
            GameState::Normal => &[Pass, Point, Drop, Throwaway, ChangeLine],
            GameState::AfterTurnover | GameState::AfterDrop => {
                &[Pass, Throwaway, Defense, CatchDefense, ChangeLine]
            }
        }
    }
}

/// Derives the machine state. First matching rule wins.
#[instrument(skip(game), fields(points = game.points().len()))]
pub fn derive_state(game: &Game) -> GameState {
    if *game.is_editing_lines() {
        return GameState::EditingLines;
    }
    if game.home_players().is_none() || game.away_players().is_none() {
        return GameState::SelectingLines;
    }
    let Some(point) = game.active_point() else {
        return GameState::Start;
    };

    let has_actor = game.first_actor().is_some();
    let first_of_half = game.is_first_point_of_half();

    match point.last_event_type() {
        None => match (has_actor, first_of_half) {
            (false, true) => GameState::Start,
            (false, false) => GameState::PickUp,
            (true, true) => GameState::Pull,
            (true, false) => GameState::FirstThrow,
        },
        Some(_) if !has_actor => GameState::PickUp,
        Some(EventType::Throwaway) => GameState::AfterTurnover,
        Some(EventType::Drop) => GameState::AfterDrop,
        Some(EventType::Pull) => GameState::AfterPull,
        Some(EventType::Pass | EventType::Defense) => GameState::Normal,
        Some(other) => {
            warn!(last_event = %other, "Unanticipated state combination, falling back to Normal");
            GameState::Normal
        }
    }
}
