use std::collections::HashMap;

use anyhow::Result;
use chrono::Utc;
use log::info;
use serde::Serialize;

use crate::config::ModelSettings;
use crate::domain::{Match, Player, PlayerId};
use crate::prediction::{
    label_for, FeatureExtractor, MatchContext, PredictionModel, TrainingReport, TrainingSample,
};
use crate::rating::HeadToHeadTable;
use crate::store::WeightStore;

/// Win probabilities for an upcoming match, from player1's point of view
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub player1_id: PlayerId,
    pub player2_id: PlayerId,
    /// Elo expected score of player1
    pub elo_probability: f64,
    /// Model probability that player1 wins; `None` when the model is unavailable
    pub model_probability: Option<f64>,
}

/// Loads, trains, applies and persists the match prediction model
pub struct PredictionService<W> {
    store: W,
    settings: ModelSettings,
    default_rating: f64,
}

impl<W: WeightStore> PredictionService<W> {
    pub fn new(store: W, settings: ModelSettings, default_rating: f64) -> Self {
        Self {
            store,
            settings,
            default_rating,
        }
    }

    pub fn extractor(&self) -> FeatureExtractor {
        FeatureExtractor::new(self.settings.schema, &self.settings.roster)
    }

    /// Stored model, or a zero-initialised one when no record exists.
    ///
    /// Storage failures and schema mismatches are errors, never a silent cold start.
    pub fn load_model(&self) -> Result<PredictionModel> {
        let extractor = self.extractor();
        match self.store.load_weights(&self.settings.model_name)? {
            Some(record) => {
                let model = PredictionModel::from_weights(extractor, &self.settings, &record)?;
                info!(
                    "Loaded weights of '{}' (schema {}, updated {})",
                    record.model_name, record.schema, record.last_updated
                );
                Ok(model)
            }
            None => {
                info!(
                    "No stored weights for '{}', starting from zero",
                    self.settings.model_name
                );
                Ok(PredictionModel::new(extractor, &self.settings))
            }
        }
    }

    /// Labelled samples for every match, using current ratings and head-to-head history
    pub fn training_samples(&self, matches: &[Match], players: &[Player]) -> Vec<TrainingSample> {
        let extractor = self.extractor();
        let head_to_head = HeadToHeadTable::aggregate(matches);
        let ratings = rating_map(players);

        matches
            .iter()
            .map(|game| {
                let context = MatchContext::played(game, &ratings, self.default_rating, &head_to_head);
                TrainingSample {
                    features: extractor.extract(&context),
                    label: label_for(game),
                }
            })
            .collect()
    }

    /// Loads the stored weights, then trains them on the match history
    pub fn prepare_model(
        &self,
        matches: &[Match],
        players: &[Player],
    ) -> Result<(PredictionModel, TrainingReport)> {
        let mut model = self.load_model()?;
        let samples = self.training_samples(matches, players);
        let report = model.train(&samples)?;
        Ok((model, report))
    }

    pub fn save_model(&self, model: &PredictionModel) -> Result<()> {
        self.store.save_weights(&model.to_weights(Utc::now()))?;
        info!("Saved weights of '{}'", model.model_name());
        Ok(())
    }

    /// One online step on a freshly recorded match, then persists the weights.
    ///
    /// `context` must describe the match as it stood before it was played:
    /// pre-match ratings and head-to-head history without this match.
    pub fn learn(&self, model: &mut PredictionModel, game: &Match, context: &MatchContext) -> Result<f64> {
        let sample = TrainingSample {
            features: model.extractor().extract(context),
            label: label_for(game),
        };
        let error = model.update(&sample)?;
        self.save_model(model)?;
        Ok(error)
    }
}

pub fn rating_map(players: &[Player]) -> HashMap<PlayerId, f64> {
    players.iter().map(|p| (p.id, p.rating)).collect()
}
