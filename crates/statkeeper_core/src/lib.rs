//! Game-recording state machine for possession-based disc games.
//!
//! This crate is pure and synchronous: it owns the data model, derives what
//! can happen next, applies commands and undoes them. Persistence and network
//! delivery live in the `statkeeper` crate.
//!
//! # Example
//!
//! ```
//! use statkeeper_core::{Game, GameState, League, Player, Team};
//!
//! let home = Team::new(1, "Home", vec![Player::new("Ann", false), Player::new("Bo", true)]);
//! let away = Team::new(2, "Away", vec![Player::new("Cy", true), Player::new("Di", false)]);
//! let mut game = Game::new(League::new(1, "Summer", 2), 1, home, away);
//!
//! game.select_active_lines(vec!["Ann".into(), "Bo".into()], vec!["Cy".into(), "Di".into()]);
//! game.select_first_actor("Ann", true);
//! assert_eq!(game.state(), GameState::Pull);
//!
//! game.record_pull();
//! assert_eq!(game.state(), GameState::PickUp);
//! assert!(game.undo().is_some());
//! assert_eq!(game.state(), GameState::Pull);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod actions;
mod error;
mod event;
mod game;
pub mod invariants;
mod lines;
mod payload;
mod point;
mod state;
mod types;
mod undo;

pub use error::ModelError;
pub use event::{Event, EventType};
pub use game::{Game, GameStatus};
pub use invariants::{GameInvariants, Invariant, InvariantSet, InvariantViolation};
pub use lines::{LineWarning, Side, check_line};
pub use payload::{EventPayload, PointPayload, SubmissionPayload};
pub use point::Point;
pub use state::{Action, GameState, derive_state};
pub use types::{League, Line, Player, PlayerName, Team};
pub use undo::{Command, CommandKind, PointShape, PreImage, RosterSnapshot};
