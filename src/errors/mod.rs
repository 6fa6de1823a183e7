use anyhow::Context as _;
use thiserror::Error;

use crate::domain::PlayerId;

/// Precondition violations raised by the rating and prediction engine.
/// These indicate malformed input and are not recoverable locally.
#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    #[error("player {0} cannot play against themselves")]
    SamePlayer(PlayerId),

    #[error("match score {score1}:{score2} has no winner")]
    TiedScore { score1: u32, score2: u32 },

    #[error("winner {winner_id} is neither player {player1_id} nor player {player2_id}")]
    InvalidWinner {
        winner_id: PlayerId,
        player1_id: PlayerId,
        player2_id: PlayerId,
    },

    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),

    #[error("feature vector has {actual} entries, model expects {expected}")]
    FeatureLength { expected: usize, actual: usize },

    #[error("stored weights for '{model_name}' use schema '{found}', expected '{expected}'")]
    SchemaMismatch {
        model_name: String,
        expected: String,
        found: String,
    },

    #[error("stored weights for '{model_name}' do not match features of schema '{schema}'")]
    FeatureNamesMismatch { model_name: String, schema: String },
}

/// Add context to storage errors
pub fn storage_context(operation: &str, key: &str) -> String {
    format!("Storage unavailable: failed to {} '{}'", operation, key)
}

/// Wrap result with storage context
pub fn with_storage_context<T, E>(result: Result<T, E>, operation: &str, key: &str) -> anyhow::Result<T>
where
    E: std::error::Error + Send + Sync + 'static,
{
    result.context(storage_context(operation, key))
}
