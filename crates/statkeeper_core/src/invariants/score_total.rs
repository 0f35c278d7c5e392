//! Every completed point scored exactly one goal.

use super::Invariant;
use crate::Game;

/// Invariant: the two scores sum to the number of completed points.
pub struct ScoreTotalInvariant;

impl Invariant<Game> for ScoreTotalInvariant {
    fn holds(game: &Game) -> bool {
        let (home, away) = game.score();
        (home + away) as usize == game.points().len()
    }

    fn description() -> &'static str {
        "Home plus away score equals completed points"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{League, Team};

    #[test]
    fn test_score_tracks_points_through_undo() {
        let mut game = Game::new(
            League::new(1, "L", 1),
            1,
            Team::new(1, "H", vec![]),
            Team::new(2, "A", vec![]),
        );
        game.select_active_lines(vec!["H1".into()], vec!["A1".into()]);
        game.select_first_actor("A1", false);
        game.record_point();
        assert!(ScoreTotalInvariant::holds(&game));
        game.undo();
        assert!(ScoreTotalInvariant::holds(&game));
        assert_eq!(game.score(), (0, 0));
    }
}
