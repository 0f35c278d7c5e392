//! StatKeeper library - offline-first recording of disc games.
//!
//! The state machine itself lives in `statkeeper_core`; this crate wires it
//! to local storage and to the stats server.
//!
//! # Architecture
//!
//! - **Recorder**: [`GameRecorder`] applies commands, persists and notifies
//! - **Store**: [`GameStore`] port with sqlite ([`GameRepository`]) and in-memory implementations
//! - **Sync**: [`HttpSyncClient`] uploads finished games and looks up leagues and teams
//! - **Config**: [`RecorderConfig`] loaded from TOML with environment overrides
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use statkeeper::{GameRecorder, GameRepository, HttpSyncClient, RecorderConfig};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = RecorderConfig::default();
//! let store = Arc::new(GameRepository::open(config.database_path().clone())?);
//! let client = Arc::new(HttpSyncClient::new(config.server_url(), config.request_timeout())?);
//!
//! let mut recorder = GameRecorder::create(client.as_ref(), store, client.clone(), 1, 3, 10, 11).await?;
//! recorder.select_active_lines(vec!["Ann".into()], vec!["Bo".into()]).await?;
//! recorder.select_first_actor("Ann", true).await?;
//! recorder.record_pull().await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod db;
mod recorder;
mod store;
mod sync;

// Crate-level exports - Configuration
pub use config::{ConfigError, DATABASE_ENV, RecorderConfig, SERVER_URL_ENV};

// Crate-level exports - Database
pub use db::{DbError, DbErrorKind, GameRepository, GameRow, MIGRATIONS, NewGameRow};

// Crate-level exports - Recorder façade
pub use recorder::{ChangeKind, GameChanged, GameRecorder, RecorderError};

// Crate-level exports - Persistence port
pub use store::{GameStore, GameSummary, MemoryGameStore, StoreError};

// Crate-level exports - Server sync
pub use sync::{GameUploader, HttpSyncClient, SyncError, TeamDirectory};

// Crate-level exports - Core model
pub use statkeeper_core::{
    Action, Command, CommandKind, Event, EventType, Game, GameState, GameStatus, League, Line,
    LineWarning, ModelError, Player, PlayerName, Point, SubmissionPayload, Team,
};
