//! Advisory checks on a proposed line. Nothing here is enforced.

use derive_more::Display;
use tracing::{debug, instrument};

use crate::{Line, PlayerName, Team};

/// Which side a warning refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Side {
    /// Home team.
    #[display("home")]
    Home,
    /// Away team.
    #[display("away")]
    Away,
}

/// A non-blocking problem with a proposed line.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum LineWarning {
    /// Line does not have the league's number of players.
    #[display("{side} line has {actual} players, expected {expected}")]
    WrongSize {
        /// Side with the problem.
        side: Side,
        /// League line size.
        expected: usize,
        /// Players selected.
        actual: usize,
    },
    /// Too many players from one division on a full mixed line.
    #[display("{side} line has {open} open and {other} other division players")]
    DivisionImbalance {
        /// Side with the problem.
        side: Side,
        /// Open-division players selected.
        open: usize,
        /// Other players selected.
        other: usize,
    },
    /// A selected name is not on the roster.
    #[display("{side} line includes {name}, who is not on the roster")]
    NotOnRoster {
        /// Side with the problem.
        side: Side,
        /// Unknown player.
        name: PlayerName,
    },
}

/// Returns every warning for `line` given the league line size and rosters.
#[instrument(skip(line, home, away), fields(home = line.home.len(), away = line.away.len()))]
pub fn check_line(line: &Line, line_size: usize, home: &Team, away: &Team) -> Vec<LineWarning> {
    let mut warnings = check_side(Side::Home, &line.home, line_size, home);
    warnings.extend(check_side(Side::Away, &line.away, line_size, away));
    debug!(count = warnings.len(), "Line checked");
    warnings
}

fn check_side(side: Side, players: &[PlayerName], line_size: usize, team: &Team) -> Vec<LineWarning> {
    let mut warnings = Vec::new();

    for name in players {
        if team.player(name).is_none() {
            warnings.push(LineWarning::NotOnRoster {
                side,
                name: name.clone(),
            });
        }
    }

    if players.len() != line_size {
        warnings.push(LineWarning::WrongSize {
            side,
            expected: line_size,
            actual: players.len(),
        });
        return warnings;
    }

    let mixed_roster = team.roster().iter().any(|p| *p.is_open_division())
        && team.roster().iter().any(|p| !*p.is_open_division());
    if !mixed_roster {
        return warnings;
    }

    let open = players
        .iter()
        .filter_map(|name| team.player(name))
        .filter(|p| *p.is_open_division())
        .count();
    let other = players.len() - open;
    let max_per_division = line_size.div_ceil(2);
    if open > max_per_division || other > max_per_division {
        warnings.push(LineWarning::DivisionImbalance { side, open, other });
    }
    warnings
}
