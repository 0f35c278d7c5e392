//! Wire format of a finished game.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{Game, PlayerName, Point};

/// One event as the server expects it. A missing second actor is an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPayload {
    #[serde(rename = "type")]
    event_type: String,
    first_actor: PlayerName,
    second_actor: PlayerName,
    timestamp: String,
}

/// One completed point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointPayload {
    offense_players: Vec<PlayerName>,
    defense_players: Vec<PlayerName>,
    events: Vec<EventPayload>,
}

impl From<&Point> for PointPayload {
    fn from(point: &Point) -> Self {
        Self {
            offense_players: point.offense_players().clone(),
            defense_players: point.defense_players().clone(),
            events: point
                .events()
                .iter()
                .map(|e| EventPayload {
                    event_type: e.event_type().to_string(),
                    first_actor: e.first_actor().clone(),
                    second_actor: e.second_actor().clone().unwrap_or_default(),
                    timestamp: e.timestamp().to_rfc3339(),
                })
                .collect(),
        }
    }
}

/// The body posted to the server's submit endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    #[serde(rename = "league_id")]
    league_id: i64,
    week: u32,
    home_team: String,
    away_team: String,
    home_roster: Vec<PlayerName>,
    away_roster: Vec<PlayerName>,
    home_score: u32,
    away_score: u32,
    points: Vec<PointPayload>,
}

impl SubmissionPayload {
    /// Builds the payload from the completed points of a game.
    ///
    /// A point still in progress is not part of the record.
    #[instrument(skip(game), fields(points = game.points().len()))]
    pub fn from_game(game: &Game) -> Self {
        Self {
            league_id: *game.league().id(),
            week: *game.week(),
            home_team: game.home_team().name().clone(),
            away_team: game.away_team().name().clone(),
            home_roster: game.home_team().sorted_names(),
            away_roster: game.away_team().sorted_names(),
            home_score: *game.home_score(),
            away_score: *game.away_score(),
            points: game.points().iter().map(PointPayload::from).collect(),
        }
    }
}
