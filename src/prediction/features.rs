use std::collections::HashMap;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::domain::{Match, PlayerId};
use crate::rating::HeadToHeadTable;

pub const BIAS_FEATURE: &str = "bias";
pub const ELO_DIFFERENCE: &str = "elo_difference";
pub const HEAD_TO_HEAD: &str = "head_to_head";
pub const SET_DIFFERENCE: &str = "set_difference";

/// Versioned layout of the feature vector and of the persisted weights.
///
/// Changing the features or their order of a version invalidates stored weights,
/// so a new layout gets a new id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchemaVersion {
    /// Elo difference and head-to-head rate
    Minimal,
    /// Minimal plus set difference and one indicator per roster pair
    Extended,
}

impl SchemaVersion {
    pub fn id(&self) -> &'static str {
        match self {
            SchemaVersion::Minimal => "minimal-v1",
            SchemaVersion::Extended => "extended-v1",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "minimal-v1" => Some(SchemaVersion::Minimal),
            "extended-v1" => Some(SchemaVersion::Extended),
            _ => None,
        }
    }
}

/// Everything the extractor needs to know about one (possibly unplayed) match
#[derive(Debug, Clone, PartialEq)]
pub struct MatchContext {
    pub player1_id: PlayerId,
    pub player2_id: PlayerId,
    pub player1_rating: f64,
    pub player2_rating: f64,
    pub head_to_head_win_rate: f64,
    /// Known only once the match has been played
    pub set_difference: Option<f64>,
}

impl MatchContext {
    /// Context of an upcoming match between two players
    pub fn upcoming(
        player1_id: PlayerId,
        player2_id: PlayerId,
        player1_rating: f64,
        player2_rating: f64,
        head_to_head: &HeadToHeadTable,
    ) -> Self {
        Self {
            player1_id,
            player2_id,
            player1_rating,
            player2_rating,
            head_to_head_win_rate: head_to_head.win_rate(player1_id, player2_id),
            set_difference: None,
        }
    }

    /// Context of a played match. Players without a known rating get `default_rating`.
    pub fn played(
        game: &Match,
        ratings: &HashMap<PlayerId, f64>,
        default_rating: f64,
        head_to_head: &HeadToHeadTable,
    ) -> Self {
        let rating_of = |id: PlayerId| ratings.get(&id).copied().unwrap_or(default_rating);
        Self {
            player1_id: game.player1_id,
            player2_id: game.player2_id,
            player1_rating: rating_of(game.player1_id),
            player2_rating: rating_of(game.player2_id),
            head_to_head_win_rate: head_to_head.win_rate(game.player1_id, game.player2_id),
            set_difference: Some(game.set_difference() as f64),
        }
    }
}

/// Model input. Position 0 is the constant bias input 1.0.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(Array1<f64>);

impl FeatureVector {
    pub fn from_values(values: Vec<f64>) -> Self {
        Self(Array1::from(values))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_array(&self) -> &Array1<f64> {
        &self.0
    }

    pub fn get(&self, idx: usize) -> Option<f64> {
        self.0.get(idx).copied()
    }
}

/// Turns match contexts into feature vectors for one schema version
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    schema: SchemaVersion,
    pairs: Vec<(PlayerId, PlayerId)>,
    names: Vec<String>,
}

impl FeatureExtractor {
    pub fn minimal() -> Self {
        Self::new(SchemaVersion::Minimal, &[])
    }

    pub fn extended(roster: &[PlayerId]) -> Self {
        Self::new(SchemaVersion::Extended, roster)
    }

    /// The roster only matters for the extended schema
    pub fn new(schema: SchemaVersion, roster: &[PlayerId]) -> Self {
        let pairs = match schema {
            SchemaVersion::Minimal => Vec::new(),
            SchemaVersion::Extended => roster_pairs(roster),
        };

        let mut names = vec![
            BIAS_FEATURE.to_string(),
            ELO_DIFFERENCE.to_string(),
            HEAD_TO_HEAD.to_string(),
        ];
        if schema == SchemaVersion::Extended {
            names.push(SET_DIFFERENCE.to_string());
            names.extend(pairs.iter().map(|(a, b)| pair_feature_name(*a, *b)));
        }

        Self { schema, pairs, names }
    }

    pub fn schema(&self) -> SchemaVersion {
        self.schema
    }

    /// Declared feature names, bias first, in vector order
    pub fn feature_names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn extract(&self, context: &MatchContext) -> FeatureVector {
        let mut values = Vec::with_capacity(self.len());
        values.push(1.0);
        values.push(context.player1_rating - context.player2_rating);
        values.push(context.head_to_head_win_rate);

        if self.schema == SchemaVersion::Extended {
            values.push(context.set_difference.unwrap_or(0.0));
            values.extend(self.pairs.iter().map(|&(a, b)| {
                if context.player1_id == a && context.player2_id == b {
                    1.0
                } else {
                    0.0
                }
            }));
        }

        FeatureVector::from_values(values)
    }
}

/// Training label: 1 when player1 won
pub fn label_for(game: &Match) -> f64 {
    if game.winner_id == game.player1_id { 1.0 } else { 0.0 }
}

fn roster_pairs(roster: &[PlayerId]) -> Vec<(PlayerId, PlayerId)> {
    let mut pairs = Vec::new();
    for (i, &a) in roster.iter().enumerate() {
        for &b in &roster[i + 1..] {
            pairs.push((a, b));
        }
    }
    pairs
}

fn pair_feature_name(a: PlayerId, b: PlayerId) -> String {
    format!("pair_{}_vs_{}", a, b)
}
