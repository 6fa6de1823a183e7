use clap::{Parser, Subcommand};
use clap_complete::Shell;

use crate::domain::PlayerId;

#[derive(Parser, Debug)]
#[command(author, version, about = "table tennis league ratings and match predictions")]
pub struct Cli {
    /// Command
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "kebab-case")]
pub enum Command {
    /// Start the HTTP server
    Serve {
        /// Port number (optional, defaults to 3000)
        #[arg(short, long, default_value_t = 3000)]
        port: u16,
    },
    /// Register a new player at the base rating
    AddPlayer {
        /// Unique player name
        name: String,
    },
    /// Record a match and update ratings and the prediction model
    AddMatch {
        player1: PlayerId,
        player2: PlayerId,
        /// Sets won by player1
        score1: u32,
        /// Sets won by player2
        score2: u32,
    },
    /// Rebuild all standings by replaying this month's matches
    Recalculate {
        /// Replay every recorded match instead of the current month
        #[arg(long)]
        all_time: bool,
    },
    /// Show the current standings
    Players,
    /// Show the rating curve of a player
    History {
        player: PlayerId,
        /// Use every recorded match instead of the current month
        #[arg(long)]
        all_time: bool,
    },
    /// Predict the outcome of a match between two players
    Predict { player1: PlayerId, player2: PlayerId },
    /// Train the prediction model on the full match history
    Train,
    /// Print shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}
