//! League, team and line types shared by the recorder and its collaborators.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Player names are the identity used throughout events and lines.
pub type PlayerName = String;

/// League configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct League {
    id: i64,
    name: String,
    /// Players per side on the field at once.
    #[serde(alias = "line_size")]
    line_size: usize,
}

impl League {
    /// Creates a league.
    #[instrument(skip(name))]
    pub fn new(id: i64, name: impl Into<String>, line_size: usize) -> Self {
        Self {
            id,
            name: name.into(),
            line_size,
        }
    }
}

/// A rostered player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    name: PlayerName,
    /// Only used for line-composition warnings.
    #[serde(alias = "is_open_division", alias = "is_male", default)]
    is_open_division: bool,
}

impl Player {
    /// Creates a player.
    pub fn new(name: impl Into<PlayerName>, is_open_division: bool) -> Self {
        Self {
            name: name.into(),
            is_open_division,
        }
    }
}

/// A team with its full roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    id: i64,
    name: String,
    #[serde(alias = "players", default)]
    roster: Vec<Player>,
}

impl Team {
    /// Creates a team.
    #[instrument(skip(name, roster), fields(roster = roster.len()))]
    pub fn new(id: i64, name: impl Into<String>, roster: Vec<Player>) -> Self {
        Self {
            id,
            name: name.into(),
            roster,
        }
    }

    /// Roster names, sorted.
    pub fn sorted_names(&self) -> Vec<PlayerName> {
        let mut names: Vec<PlayerName> = self.roster.iter().map(|p| p.name.clone()).collect();
        names.sort();
        names
    }

    /// Looks up a rostered player by name.
    pub fn player(&self, name: &str) -> Option<&Player> {
        self.roster.iter().find(|p| p.name == name)
    }

    pub(crate) fn set_roster(&mut self, mut roster: Vec<Player>) {
        roster.sort_by(|a, b| a.name.cmp(&b.name));
        self.roster = roster;
    }
}

/// Home and away players on the field for one point.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    /// Home players.
    pub home: Vec<PlayerName>,
    /// Away players.
    pub away: Vec<PlayerName>,
}

impl Line {
    /// Creates a line.
    pub fn new(home: Vec<PlayerName>, away: Vec<PlayerName>) -> Self {
        Self { home, away }
    }
}
