//! Command-line interface for statkeeper.

use clap::{Parser, Subcommand, ValueEnum};

/// StatKeeper - record disc games offline and sync them later
#[derive(Parser, Debug)]
#[command(name = "statkeeper")]
#[command(about = "Offline-first game recorder", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the TOML config file
    #[arg(long, global = true, default_value = "statkeeper.toml")]
    pub config: std::path::PathBuf,

    /// Stats server base URL (overrides config and environment)
    #[arg(long, global = true)]
    pub server_url: Option<String>,

    /// Path to the database file (overrides config and environment)
    #[arg(long, global = true)]
    pub database: Option<String>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a game from server league and team data
    New {
        /// League id
        #[arg(long)]
        league: i64,

        /// Week number
        #[arg(long)]
        week: u32,

        /// Home team id
        #[arg(long)]
        home: i64,

        /// Away team id
        #[arg(long)]
        away: i64,
    },

    /// List stored games
    List,

    /// Show a game's state, score and current point
    Show {
        /// Local game id
        id: i32,
    },

    /// Choose the lines for the next point (or substitute mid-point)
    Lines {
        /// Local game id
        id: i32,

        /// Home players, comma separated
        #[arg(long, value_delimiter = ',')]
        home: Vec<String>,

        /// Away players, comma separated
        #[arg(long, value_delimiter = ',')]
        away: Vec<String>,
    },

    /// Record an action
    Act {
        /// Local game id
        id: i32,

        /// Action to record
        #[arg(value_enum)]
        action: ActionArg,

        /// Player selected or receiving the pass
        player: Option<String>,

        /// Selected player is on the away team
        #[arg(long)]
        away: bool,
    },

    /// Undo the last recorded action
    Undo {
        /// Local game id
        id: i32,
    },

    /// Record halftime
    Half {
        /// Local game id
        id: i32,
    },

    /// Set a game aside
    Pause {
        /// Local game id
        id: i32,
    },

    /// Upload a game to the server
    Submit {
        /// Local game id
        id: i32,
    },

    /// Retry a failed upload
    Resync {
        /// Local game id
        id: i32,
    },

    /// Print the submission payload as JSON
    Export {
        /// Local game id
        id: i32,
    },
}

/// Actions recordable from the command line
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionArg {
    /// Select puller, thrower or player who picked up the disc
    Select,
    /// Pull
    Pull,
    /// Pass to a player
    Pass,
    /// Drop
    Drop,
    /// Throwaway
    Throwaway,
    /// Block, disc loose
    Defense,
    /// Block caught by the defender
    CatchDefense,
    /// Score
    Point,
}
