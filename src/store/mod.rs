//! Storage collaborators the engine depends on.
//!
//! Services receive a store explicitly; nothing in the crate reaches for a
//! process-wide handle.

mod sqlite;

use anyhow::Result;

use crate::domain::{Match, NewMatch, Player, PlayerId};
use crate::prediction::ModelWeights;

pub use sqlite::SqliteStore;

/// Match and player records of the league
pub trait LeagueStore {
    fn players(&self) -> Result<Vec<Player>>;

    fn player(&self, id: PlayerId) -> Result<Option<Player>>;

    fn add_player(&self, name: &str, base_rating: f64) -> Result<Player>;

    /// Every recorded match, oldest first
    fn matches(&self) -> Result<Vec<Match>>;

    /// Stores the match together with both players' updated statistics.
    /// Either everything is written or nothing is.
    fn record_match(&self, new_match: &NewMatch, player1: &Player, player2: &Player) -> Result<Match>;

    fn save_players(&self, players: &[Player]) -> Result<()>;
}

/// Persisted prediction model weights, keyed by model name
pub trait WeightStore {
    /// `Ok(None)` means no record exists yet (cold start)
    fn load_weights(&self, model_name: &str) -> Result<Option<ModelWeights>>;

    fn save_weights(&self, weights: &ModelWeights) -> Result<()>;
}
