use std::collections::HashMap;

use anyhow::{Context, Result};
use log::{error, info, warn};
use serde::Serialize;

use super::prediction::{Prediction, PredictionService};
use crate::config::AppConfig;
use crate::domain::{Match, NewMatch, Player, PlayerId, RatingPoint};
use crate::errors::EngineError;
use crate::prediction::{MatchContext, TrainingReport};
use crate::rating::{apply_result, HeadToHeadTable, RankingRecalculator, RankingWindow, Recalculation};
use crate::store::{LeagueStore, WeightStore};

/// Outcome of the online model step that follows a recorded match
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "status")]
pub enum ModelUpdate {
    /// Weights were updated and persisted; `error` is the pre-update prediction error
    Saved { error: f64 },
    /// The match was recorded but the model could not be updated
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMatchOutcome {
    #[serde(rename = "match")]
    pub game: Match,
    pub player1: Player,
    pub player2: Player,
    /// Ratings of player1 and player2 before the match
    pub ratings_before: (f64, f64),
    pub model_update: ModelUpdate,
}

/// League operations: recording matches, rebuilding standings and predicting results
pub struct LeagueService<S> {
    store: S,
    recalculator: RankingRecalculator,
    prediction: PredictionService<S>,
    base_rating: f64,
}

impl<S: LeagueStore + WeightStore + Clone> LeagueService<S> {
    pub fn new(store: S, config: &AppConfig) -> Self {
        let base_rating = config.rating.base_rating;
        Self {
            prediction: PredictionService::new(store.clone(), config.model.clone(), base_rating),
            recalculator: RankingRecalculator::new(&config.rating),
            store,
            base_rating,
        }
    }

    pub fn get_players(&self) -> Result<Vec<Player>> {
        self.store.players()
    }

    pub fn get_matches(&self) -> Result<Vec<Match>> {
        self.store.matches()
    }

    pub fn add_player(&self, name: &str) -> Result<Player> {
        let name = name.trim();
        if name.is_empty() {
            anyhow::bail!("Player name must not be empty");
        }
        let player = self.store.add_player(name, self.base_rating)?;
        info!("Added player {} ({})", player.name, player.id);
        Ok(player)
    }

    /// Records a match, updates both players and then feeds the match to the model.
    ///
    /// The match and player updates are written together. A failing model
    /// step never undoes them and is reported in the outcome instead.
    pub fn add_match(&self, new_match: NewMatch) -> Result<AddMatchOutcome> {
        new_match.validate()?;

        let mut player1 = self.require_player(new_match.player1_id)?;
        let mut player2 = self.require_player(new_match.player2_id)?;
        let ratings_before = (player1.rating, player2.rating);

        let history = self.store.matches()?;

        // The store assigns the real id on insert
        let pending = new_match.clone().into_match(0);
        if !pending.winner_agrees_with_score() {
            warn!(
                "Recorded winner {} disagrees with score {}:{}, ratings follow the score",
                pending.winner_id, pending.score1, pending.score2
            );
        }
        apply_result(self.recalculator.engine(), &mut player1, &mut player2, &pending);

        let game = self
            .store
            .record_match(&new_match, &player1, &player2)
            .context("Failed to record match")?;
        info!(
            "Recorded match {}: {} {}:{} {} ({:.2} -> {:.2}, {:.2} -> {:.2})",
            game.id,
            player1.name,
            game.score1,
            game.score2,
            player2.name,
            ratings_before.0,
            player1.rating,
            ratings_before.1,
            player2.rating
        );

        let model_update = self.learn_from(&game, ratings_before, &history);

        Ok(AddMatchOutcome {
            game,
            player1,
            player2,
            ratings_before,
            model_update,
        })
    }

    fn learn_from(&self, game: &Match, ratings_before: (f64, f64), history: &[Match]) -> ModelUpdate {
        let ratings = HashMap::from([
            (game.player1_id, ratings_before.0),
            (game.player2_id, ratings_before.1),
        ]);
        let head_to_head = HeadToHeadTable::aggregate(history);
        let context = MatchContext::played(game, &ratings, self.base_rating, &head_to_head);

        let result = self
            .prediction
            .load_model()
            .and_then(|mut model| self.prediction.learn(&mut model, game, &context));

        match result {
            Ok(error) => ModelUpdate::Saved { error },
            Err(e) => {
                error!("Model update after match {} failed: {:#}", game.id, e);
                ModelUpdate::Failed {
                    reason: format!("{:#}", e),
                }
            }
        }
    }

    /// Rebuilds every player's statistics from the matches inside the window and stores them
    pub fn recalculate_rankings(&self, window: &RankingWindow) -> Result<Recalculation> {
        let players = self.store.players()?;
        let matches = self.store.matches()?;

        let recalculation = self.recalculator.recalculate(players, &matches, window);
        self.store.save_players(&recalculation.players)?;

        info!(
            "Recalculated rankings: {} matches replayed, {} issues",
            recalculation.replayed,
            recalculation.issues.len()
        );
        Ok(recalculation)
    }

    pub fn get_player_rating_history(
        &self,
        player_id: PlayerId,
        window: &RankingWindow,
    ) -> Result<Vec<RatingPoint>> {
        self.require_player(player_id)?;
        let matches = self.store.matches()?;
        Ok(self.recalculator.rating_history(player_id, &matches, window))
    }

    /// Win probability of player1 against player2.
    ///
    /// The Elo estimate is always available; the model estimate is dropped with a
    /// warning when the stored weights cannot be used.
    pub fn predict(&self, player1_id: PlayerId, player2_id: PlayerId) -> Result<Prediction> {
        if player1_id == player2_id {
            return Err(EngineError::SamePlayer(player1_id).into());
        }
        let player1 = self.require_player(player1_id)?;
        let player2 = self.require_player(player2_id)?;

        let elo_probability = self
            .recalculator
            .engine()
            .expected_score(player1.rating, player2.rating);

        let model_probability = match self.model_probability(&player1, &player2) {
            Ok(p) => Some(p),
            Err(e) => {
                warn!("Model prediction unavailable: {:#}", e);
                None
            }
        };

        Ok(Prediction {
            player1_id,
            player2_id,
            elo_probability,
            model_probability,
        })
    }

    fn model_probability(&self, player1: &Player, player2: &Player) -> Result<f64> {
        let model = self.prediction.load_model()?;
        let head_to_head = HeadToHeadTable::aggregate(&self.store.matches()?);
        let context = MatchContext::upcoming(
            player1.id,
            player2.id,
            player1.rating,
            player2.rating,
            &head_to_head,
        );
        Ok(model.predict_context(&context))
    }

    /// Trains the stored model on the whole match history and saves the result
    pub fn train_model(&self) -> Result<TrainingReport> {
        let matches = self.store.matches()?;
        let players = self.store.players()?;

        let (model, report) = self.prediction.prepare_model(&matches, &players)?;
        self.prediction.save_model(&model)?;
        Ok(report)
    }

    fn require_player(&self, id: PlayerId) -> Result<Player> {
        self.store
            .player(id)?
            .ok_or_else(|| EngineError::UnknownPlayer(id).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteStore;
    use chrono::{TimeZone, Utc};

    fn service() -> (LeagueService<SqliteStore>, Player, Player) {
        let store = SqliteStore::in_memory().unwrap();
        let service = LeagueService::new(store, &AppConfig::new());
        let anna = service.add_player("Anna").unwrap();
        let ben = service.add_player("Ben").unwrap();
        (service, anna, ben)
    }

    #[test]
    fn test_add_match_updates_players_and_model() {
        let (service, anna, ben) = service();
        let played_at = Utc.with_ymd_and_hms(2024, 5, 6, 19, 0, 0).unwrap();

        let outcome = service
            .add_match(NewMatch::from_scores(anna.id, ben.id, 2, 0, played_at))
            .unwrap();

        assert_eq!(outcome.ratings_before, (1000.0, 1000.0));
        assert_eq!(outcome.player1.rating, 1016.0);
        assert_eq!(outcome.player2.rating, 984.0);
        assert_eq!(outcome.player1.set_difference, 2);
        assert_eq!(outcome.model_update, ModelUpdate::Saved { error: 0.5 });

        let stored = service.get_players().unwrap();
        assert_eq!(stored[0].wins, 1);
        assert_eq!(stored[1].losses, 1);
        assert_eq!(service.get_matches().unwrap().len(), 1);
    }

    #[test]
    fn test_add_match_rejects_bad_input() {
        let (service, anna, _) = service();
        let at = Utc::now();

        let same = service.add_match(NewMatch::from_scores(anna.id, anna.id, 2, 0, at));
        assert_eq!(
            same.unwrap_err().downcast_ref::<EngineError>(),
            Some(&EngineError::SamePlayer(anna.id))
        );

        let unknown = service.add_match(NewMatch::from_scores(anna.id, 77, 2, 1, at));
        assert_eq!(
            unknown.unwrap_err().downcast_ref::<EngineError>(),
            Some(&EngineError::UnknownPlayer(77))
        );
        assert!(service.get_matches().unwrap().is_empty());
    }

    #[test]
    fn test_empty_name_rejected() {
        let (service, _, _) = service();
        assert!(service.add_player("  ").is_err());
    }

    #[test]
    fn test_predict_before_any_training() {
        let (service, anna, ben) = service();
        let prediction = service.predict(anna.id, ben.id).unwrap();

        assert_eq!(prediction.elo_probability, 0.5);
        assert_eq!(prediction.model_probability, Some(0.5));
        assert!(service.predict(anna.id, anna.id).is_err());
    }
}
