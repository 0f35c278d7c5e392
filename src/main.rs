//! StatKeeper - command-line recorder.

#![warn(missing_docs)]

mod cli;

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use cli::{ActionArg, Cli, Command};
use statkeeper::{
    GameRecorder, GameRepository, GameStore, HttpSyncClient, RecorderConfig, RecorderError,
};
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = RecorderConfig::load_or_default(&cli.config)?
        .with_env_overrides()
        .with_overrides(cli.server_url.clone(), cli.database.clone());
    info!(server_url = %config.server_url(), database = %config.database_path(), "Starting statkeeper");

    let store = Arc::new(GameRepository::open(config.database_path().clone())?);
    let client = Arc::new(HttpSyncClient::new(
        config.server_url(),
        config.request_timeout(),
    )?);

    match cli.command {
        Command::New {
            league,
            week,
            home,
            away,
        } => {
            let recorder = GameRecorder::create(
                client.as_ref(),
                store,
                client.clone(),
                league,
                week,
                home,
                away,
            )
            .await?;
            print_game(&recorder);
        }
        Command::List => list_games(store.as_ref()).await?,
        Command::Show { id } => {
            let recorder = GameRecorder::open(id, store, client).await?;
            print_game(&recorder);
        }
        Command::Lines { id, home, away } => {
            let mut recorder = GameRecorder::open(id, store, client).await?;
            for warning in recorder.check_line(&statkeeper::Line::new(home.clone(), away.clone())) {
                println!("warning: {}", warning);
            }
            require(recorder.select_active_lines(home, away).await?, "lines")?;
            print_game(&recorder);
        }
        Command::Act {
            id,
            action,
            player,
            away,
        } => {
            let mut recorder = GameRecorder::open(id, store, client).await?;
            let applied = act(&mut recorder, action, player, away).await?;
            require(applied, &format!("{:?}", action))?;
            print_game(&recorder);
        }
        Command::Undo { id } => {
            let mut recorder = GameRecorder::open(id, store, client).await?;
            require(recorder.undo().await?, "undo")?;
            print_game(&recorder);
        }
        Command::Half { id } => {
            let mut recorder = GameRecorder::open(id, store, client).await?;
            require(recorder.record_half().await?, "half")?;
            print_game(&recorder);
        }
        Command::Pause { id } => {
            let mut recorder = GameRecorder::open(id, store, client).await?;
            require(recorder.pause().await?, "pause")?;
            println!("Game {} paused", id);
        }
        Command::Submit { id } => {
            let mut recorder = GameRecorder::open(id, store, client).await?;
            let status = recorder.submit().await?;
            println!("Game {} {}", id, status);
        }
        Command::Resync { id } => {
            let mut recorder = GameRecorder::open(id, store, client).await?;
            let status = recorder.resync().await?;
            println!("Game {} {}", id, status);
        }
        Command::Export { id } => {
            let recorder = GameRecorder::open(id, store, client).await?;
            let json = serde_json::to_string_pretty(&recorder.export())
                .context("Failed to serialize payload")?;
            println!("{}", json);
        }
    }

    Ok(())
}

/// Dispatches one recordable action.
#[instrument(skip(recorder))]
async fn act(
    recorder: &mut GameRecorder,
    action: ActionArg,
    player: Option<String>,
    away: bool,
) -> Result<bool, anyhow::Error> {
    let needs_player = |player: Option<String>| {
        player.with_context(|| format!("{:?} needs a player name", action))
    };
    let applied: Result<bool, RecorderError> = match action {
        ActionArg::Select => recorder.select_first_actor(&needs_player(player)?, !away).await,
        ActionArg::Pass => recorder.record_pass(&needs_player(player)?).await,
        ActionArg::Pull => recorder.record_pull().await,
        ActionArg::Drop => recorder.record_drop().await,
        ActionArg::Throwaway => recorder.record_throw_away().await,
        ActionArg::Defense => recorder.record_defense().await,
        ActionArg::CatchDefense => recorder.record_catch_defense().await,
        ActionArg::Point => recorder.record_point().await,
    };
    Ok(applied?)
}

fn require(applied: bool, what: &str) -> Result<()> {
    if !applied {
        bail!("'{}' is not possible in the current state", what);
    }
    Ok(())
}

async fn list_games(store: &dyn GameStore) -> Result<()> {
    let games = store.list().await?;
    if games.is_empty() {
        println!("No games stored");
    }
    for game in games {
        println!(
            "{:>4}  week {:>2}  {} vs {}  [{}]  {}",
            game.local_id(),
            game.week(),
            game.home_team(),
            game.away_team(),
            game.status(),
            game.last_modified().format("%Y-%m-%d %H:%M"),
        );
    }
    Ok(())
}

fn print_game(recorder: &GameRecorder) {
    let game = recorder.game();
    let (home, away) = recorder.score();
    let possession = if recorder.home_possession() {
        game.home_team().name()
    } else {
        game.away_team().name()
    };

    println!(
        "Game {}: {} {} - {} {}  [{}]",
        game.local_id().unwrap_or_default(),
        game.home_team().name(),
        home,
        away,
        game.away_team().name(),
        recorder.status(),
    );
    println!("State: {}  Possession: {}", recorder.state(), possession);
    match recorder.current_line() {
        Some(line) => println!("Line: {} | {}", line.home.join(", "), line.away.join(", ")),
        None => {
            let suggestion = recorder.suggested_line();
            println!(
                "Suggested line: {} | {}",
                suggestion.home.join(", "),
                suggestion.away.join(", ")
            );
        }
    }
    if let Some(actor) = game.first_actor() {
        println!("Disc: {}", actor);
    }
    for (i, event) in recorder.event_history().iter().enumerate() {
        println!("  {}. {}", i + 1, event);
    }
    let actions: Vec<String> = recorder
        .enabled_actions()
        .iter()
        .map(ToString::to_string)
        .collect();
    println!("Next: {}", actions.join(", "));
    if recorder.can_undo() {
        println!("Undo: {} step(s)", game.undo_stack().len());
    }
    if let Some(error) = game.local_error() {
        println!("Local error: {}", error);
    }
    if let Some(error) = game.sync_error() {
        println!("Sync error: {}", error);
    }
}
