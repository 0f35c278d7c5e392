//! An active point always has lines chosen.

use super::Invariant;
use crate::Game;

/// Invariant: a point in progress implies both lines are chosen.
pub struct LinesForPointInvariant;

impl Invariant<Game> for LinesForPointInvariant {
    fn holds(game: &Game) -> bool {
        game.active_point().is_none() || game.lines_chosen()
    }

    fn description() -> &'static str {
        "An active point requires both lines to be chosen"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{League, Team};

    #[test]
    fn test_holds_without_point() {
        let game = Game::new(
            League::new(1, "L", 7),
            1,
            Team::new(1, "H", vec![]),
            Team::new(2, "A", vec![]),
        );
        assert!(LinesForPointInvariant::holds(&game));
    }

    #[test]
    fn test_holds_after_first_actor() {
        let mut game = Game::new(
            League::new(1, "L", 1),
            1,
            Team::new(1, "H", vec![]),
            Team::new(2, "A", vec![]),
        );
        game.select_active_lines(vec!["H1".into()], vec!["A1".into()]);
        assert!(game.select_first_actor("H1", true));
        assert!(LinesForPointInvariant::holds(&game));
    }
}
