//! Database models for stored games.

use chrono::NaiveDateTime;
use derive_getters::Getters;
use derive_new::new;
use diesel::prelude::*;
use statkeeper_core::{Game, GameStatus};
use tracing::{debug, instrument};

use crate::db::{DbError, DbErrorKind, schema};

/// A stored game: indexed metadata plus the full aggregate as JSON.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Getters)]
#[diesel(table_name = schema::games)]
pub struct GameRow {
    id: i32,
    server_id: Option<i64>,
    league_id: i64,
    week: i32,
    home_team: String,
    away_team: String,
    status: String,
    last_modified: NaiveDateTime,
    data: String,
}

impl GameRow {
    /// Parses the stored status string.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the status is not a known value.
    #[instrument(skip(self), fields(id = self.id, status = %self.status))]
    pub fn parse_status(&self) -> Result<GameStatus, DbError> {
        GameStatus::from_db_string(&self.status).map_err(|e| DbError::corrupt(self.id, e.message))
    }

    /// Decodes the stored aggregate, stamping it with this row's id.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the JSON is malformed or contains values the
    /// model does not recognize.
    #[instrument(skip(self), fields(id = self.id))]
    pub fn decode(&self) -> Result<Game, DbError> {
        self.parse_status()?;
        let mut game =
            Game::from_json(&self.data).map_err(|e| DbError::corrupt(self.id, e.message))?;
        game.assign_local_id(self.id);
        debug!(points = game.points().len(), "Decoded stored game");
        Ok(game)
    }
}

/// Insertable and updatable form of a game.
#[derive(Debug, Clone, Insertable, AsChangeset, new, Getters)]
#[diesel(table_name = schema::games)]
#[diesel(treat_none_as_null = true)]
pub struct NewGameRow {
    server_id: Option<i64>,
    league_id: i64,
    week: i32,
    home_team: String,
    away_team: String,
    status: String,
    last_modified: NaiveDateTime,
    data: String,
}

impl NewGameRow {
    /// Builds a row from the aggregate.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the aggregate cannot be serialized.
    #[instrument(skip(game), fields(local_id = ?game.local_id()))]
    pub fn from_game(game: &Game) -> Result<Self, DbError> {
        let week = i32::try_from(*game.week()).map_err(|_| {
            DbError::new(
                DbErrorKind::Invalid,
                format!("Week out of range: {}", game.week()),
            )
        })?;
        Ok(Self::new(
            *game.server_id(),
            *game.league().id(),
            week,
            game.home_team().name().clone(),
            game.away_team().name().clone(),
            game.status().to_db_string(),
            game.last_modified().naive_utc(),
            game
                .to_json()
                .map_err(|e| DbError::new(DbErrorKind::Invalid, e.message))?,
        ))
    }
}
