//! Halftime marks a point count that has already been reached.

use super::Invariant;
use crate::Game;

/// Invariant: `points_at_half` never exceeds the completed point count.
pub struct HalfBoundaryInvariant;

impl Invariant<Game> for HalfBoundaryInvariant {
    fn holds(game: &Game) -> bool {
        *game.points_at_half() <= game.points().len()
    }

    fn description() -> &'static str {
        "Halftime boundary is within the completed points"
    }
}
