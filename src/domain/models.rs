use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::EngineError;

pub type PlayerId = i64;
pub type MatchId = i64;

/// League player with the statistics rebuilt by the ranking engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub rating: f64,
    pub wins: u32,
    pub losses: u32,
    pub set_difference: i64,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>, base_rating: f64) -> Self {
        Self {
            id,
            name: name.into(),
            rating: base_rating,
            wins: 0,
            losses: 0,
            set_difference: 0,
        }
    }

    pub fn games(&self) -> u32 {
        self.wins + self.losses
    }

    pub fn reset(&mut self, base_rating: f64) {
        self.rating = base_rating;
        self.wins = 0;
        self.losses = 0;
        self.set_difference = 0;
    }
}

/// A recorded match. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: MatchId,
    pub player1_id: PlayerId,
    pub player2_id: PlayerId,
    pub score1: u32,
    pub score2: u32,
    pub winner_id: PlayerId,
    pub played_at: DateTime<Utc>,
}

impl Match {
    /// Winner according to the scoreline, which is ground truth for standings
    pub fn winner_by_score(&self) -> PlayerId {
        if self.score1 > self.score2 {
            self.player1_id
        } else {
            self.player2_id
        }
    }

    pub fn winner_agrees_with_score(&self) -> bool {
        self.winner_id == self.winner_by_score()
    }

    pub fn involves(&self, player_id: PlayerId) -> bool {
        self.player1_id == player_id || self.player2_id == player_id
    }

    /// Set difference from player1's point of view
    pub fn set_difference(&self) -> i64 {
        i64::from(self.score1) - i64::from(self.score2)
    }
}

/// A match as submitted, before the store assigns an id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMatch {
    pub player1_id: PlayerId,
    pub player2_id: PlayerId,
    pub score1: u32,
    pub score2: u32,
    pub winner_id: PlayerId,
    pub played_at: DateTime<Utc>,
}

impl NewMatch {
    /// Builds a match whose winner is derived from the scoreline
    pub fn from_scores(
        player1_id: PlayerId,
        player2_id: PlayerId,
        score1: u32,
        score2: u32,
        played_at: DateTime<Utc>,
    ) -> Self {
        let winner_id = if score1 > score2 { player1_id } else { player2_id };
        Self {
            player1_id,
            player2_id,
            score1,
            score2,
            winner_id,
            played_at,
        }
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.player1_id == self.player2_id {
            return Err(EngineError::SamePlayer(self.player1_id));
        }
        if self.score1 == self.score2 {
            return Err(EngineError::TiedScore {
                score1: self.score1,
                score2: self.score2,
            });
        }
        if self.winner_id != self.player1_id && self.winner_id != self.player2_id {
            return Err(EngineError::InvalidWinner {
                winner_id: self.winner_id,
                player1_id: self.player1_id,
                player2_id: self.player2_id,
            });
        }
        Ok(())
    }

    pub fn into_match(self, id: MatchId) -> Match {
        Match {
            id,
            player1_id: self.player1_id,
            player2_id: self.player2_id,
            score1: self.score1,
            score2: self.score2,
            winner_id: self.winner_id,
            played_at: self.played_at,
        }
    }
}

/// One point on a player's rating curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingPoint {
    pub match_number: usize,
    pub rating: f64,
}
