//! The disc is only attributed to a player during a point.

use super::Invariant;
use crate::Game;

/// Invariant: `first_actor` is set only while a point is active.
pub struct LooseDiscInvariant;

impl Invariant<Game> for LooseDiscInvariant {
    fn holds(game: &Game) -> bool {
        game.first_actor().is_none() || game.active_point().is_some()
    }

    fn description() -> &'static str {
        "A player holds the disc only while a point is in progress"
    }
}
