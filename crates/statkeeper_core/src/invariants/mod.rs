//! Invariants over the game aggregate.
//!
//! Invariants are logical properties that must hold after every command and
//! every undo. The recorder checks them after each mutation and logs any
//! violation; they are also testable independently.

use tracing::warn;

use crate::Game;

/// A logical property that must hold for a given state.
pub trait Invariant<S> {
    /// Checks if the invariant holds for the given state.
    fn holds(state: &S) -> bool;

    /// Human-readable description of the invariant.
    fn description() -> &'static str;
}

/// Violation of an invariant.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
#[display("Invariant violated: {}", description)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub description: String,
}

impl InvariantViolation {
    /// Creates a new invariant violation.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// A set of invariants that can be checked together.
///
/// Implementations are provided for tuples.
pub trait InvariantSet<S> {
    /// Checks all invariants in the set.
    ///
    /// Returns Ok(()) if all invariants hold, or Err with a list of
    /// violations if any invariant fails.
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>>;
}

fn check<S, I: Invariant<S>>(state: &S, violations: &mut Vec<InvariantViolation>) {
    if !I::holds(state) {
        violations.push(InvariantViolation::new(I::description()));
    }
}

fn into_result(violations: Vec<InvariantViolation>) -> Result<(), Vec<InvariantViolation>> {
    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

impl<S, I1, I2, I3, I4> InvariantSet<S> for (I1, I2, I3, I4)
where
    I1: Invariant<S>,
    I2: Invariant<S>,
    I3: Invariant<S>,
    I4: Invariant<S>,
{
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
        let mut violations = Vec::new();
        check::<S, I1>(state, &mut violations);
        check::<S, I2>(state, &mut violations);
        check::<S, I3>(state, &mut violations);
        check::<S, I4>(state, &mut violations);
        into_result(violations)
    }
}

impl<S, I1, I2> InvariantSet<S> for (I1, I2)
where
    I1: Invariant<S>,
    I2: Invariant<S>,
{
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
        let mut violations = Vec::new();
        check::<S, I1>(state, &mut violations);
        check::<S, I2>(state, &mut violations);
        into_result(violations)
    }
}

mod half_boundary;
mod lines_for_point;
mod loose_disc;
mod score_total;

pub use half_boundary::HalfBoundaryInvariant;
pub use lines_for_point::LinesForPointInvariant;
pub use loose_disc::LooseDiscInvariant;
pub use score_total::ScoreTotalInvariant;

/// All game invariants as a composable set.
pub type GameInvariants = (
    LinesForPointInvariant,
    LooseDiscInvariant,
    HalfBoundaryInvariant,
    ScoreTotalInvariant,
);

/// Checks every game invariant, logging each violation as a warning.
pub fn audit(game: &Game) -> Result<(), Vec<InvariantViolation>> {
    let result = GameInvariants::check_all(game);
    if let Err(violations) = &result {
        for violation in violations {
            warn!(local_id = ?game.local_id(), %violation, "Game invariant violated");
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{League, Player, Team};

    fn game() -> Game {
        let home = Team::new(1, "Home", vec![Player::new("H1", true), Player::new("H2", false)]);
        let away = Team::new(2, "Away", vec![Player::new("A1", true), Player::new("A2", false)]);
        Game::new(League::new(1, "League", 2), 1, home, away)
    }

    #[test]
    fn test_invariant_set_holds_for_new_game() {
        assert!(GameInvariants::check_all(&game()).is_ok());
    }

    #[test]
    fn test_invariant_set_holds_after_point() {
        let mut game = game();
        game.select_active_lines(vec!["H1".into(), "H2".into()], vec!["A1".into(), "A2".into()]);
        game.select_first_actor("H1", true);
        game.record_pass("H2");
        game.record_point();
        assert!(audit(&game).is_ok());
    }

    #[test]
    fn test_two_invariants_as_set() {
        type TwoInvariants = (LooseDiscInvariant, ScoreTotalInvariant);
        assert!(TwoInvariants::check_all(&game()).is_ok());
    }
}
