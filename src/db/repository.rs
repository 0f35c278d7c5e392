//! Database repository for stored games.

use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use statkeeper_core::Game;
use tracing::{debug, info, instrument, warn};

use crate::db::{DbError, DbErrorKind, GameRow, NewGameRow, schema};

/// Schema migrations compiled into the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Database repository for game records.
#[derive(Debug, Clone)]
pub struct GameRepository {
    db_path: String,
}

impl GameRepository {
    /// Creates a new repository connected to the database at the given path.
    ///
    /// The schema is not touched; see [`GameRepository::open`].
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the path is invalid.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn new(db_path: String) -> Result<Self, DbError> {
        if db_path.trim().is_empty() {
            return Err(DbError::new(DbErrorKind::Invalid, "Database path is empty"));
        }
        info!(path = %db_path, "Creating GameRepository");
        Ok(Self { db_path })
    }

    /// Creates a repository and brings its schema up to date.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the database cannot be opened or migrated.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn open(db_path: String) -> Result<Self, DbError> {
        let repo = Self::new(db_path)?;
        repo.run_migrations()?;
        Ok(repo)
    }

    /// Establishes a database connection.
    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, DbError> {
        debug!(path = %self.db_path, "Establishing connection");
        SqliteConnection::establish(&self.db_path)
            .map_err(|e| {
                DbError::new(
                    DbErrorKind::Connection,
                    format!("Failed to connect to '{}': {}", self.db_path, e),
                )
            })
    }

    /// Applies pending migrations. Returns how many ran.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a migration fails.
    #[instrument(skip(self))]
    pub fn run_migrations(&self) -> Result<usize, DbError> {
        let mut conn = self.connection()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| DbError::new(DbErrorKind::Migration, format!("Migration failed: {}", e)))?;
        info!(count = applied.len(), "Migrations applied");
        Ok(applied.len())
    }

    /// Inserts a new game and returns its auto-assigned local id.
    ///
    /// The stored JSON carries the assigned id so a later load is complete.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self, game), fields(home = %game.home_team().name(), away = %game.away_team().name()))]
    pub fn insert_game(&self, game: &Game) -> Result<i32, DbError> {
        debug!("Inserting game");
        let mut conn = self.connection()?;

        let id = conn.transaction::<_, DbError, _>(|conn| {
            let row = diesel::insert_into(schema::games::table)
                .values(&NewGameRow::from_game(game)?)
                .returning(GameRow::as_returning())
                .get_result(conn)?;

            let mut stored = game.clone();
            stored.assign_local_id(*row.id());
            diesel::update(schema::games::table.find(*row.id()))
                .set(&NewGameRow::from_game(&stored)?)
                .execute(conn)?;
            Ok(*row.id())
        })?;

        info!(local_id = id, "Game inserted");
        Ok(id)
    }

    /// Overwrites a stored game with the given aggregate.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the game has no local id, no row matches it,
    /// or a database error occurs.
    #[instrument(skip(self, game), fields(local_id = ?game.local_id(), status = %game.status()))]
    pub fn save_game(&self, game: &Game) -> Result<(), DbError> {
        let id = game
            .local_id()
            .ok_or_else(|| {
                DbError::new(DbErrorKind::Invalid, "Cannot save a game without a local id")
            })?;
        debug!("Saving game");
        let mut conn = self.connection()?;

        let updated = diesel::update(schema::games::table.find(id))
            .set(&NewGameRow::from_game(game)?)
            .execute(&mut conn)?;

        if updated == 0 {
            warn!(local_id = id, "No stored game to update");
            return Err(DbError::missing_game(id));
        }
        debug!(local_id = id, "Game saved");
        Ok(())
    }

    /// Loads a game by local id. Returns `None` if not found.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs or the stored record
    /// cannot be decoded.
    #[instrument(skip(self))]
    pub fn load_game(&self, id: i32) -> Result<Option<Game>, DbError> {
        debug!(local_id = id, "Loading game");
        let mut conn = self.connection()?;

        let row = schema::games::table
            .find(id)
            .select(GameRow::as_select())
            .first::<GameRow>(&mut conn)
            .optional()?;

        match row {
            Some(row) => Ok(Some(row.decode()?)),
            None => {
                debug!(local_id = id, "Game not found");
                Ok(None)
            }
        }
    }

    /// Lists stored games, most recently modified first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn list_games(&self) -> Result<Vec<GameRow>, DbError> {
        debug!("Listing games");
        let mut conn = self.connection()?;

        let rows = schema::games::table
            .order(schema::games::last_modified.desc())
            .select(GameRow::as_select())
            .load::<GameRow>(&mut conn)?;

        info!(count = rows.len(), "Games listed");
        Ok(rows)
    }

    /// Deletes a game. Returns whether a row was removed.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn delete_game(&self, id: i32) -> Result<bool, DbError> {
        let mut conn = self.connection()?;
        let deleted = diesel::delete(schema::games::table.find(id)).execute(&mut conn)?;
        info!(local_id = id, deleted, "Game deleted");
        Ok(deleted > 0)
    }
}
