use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::api::handlers::{
    matches::{create_match, get_matches, recalculate_rankings},
    players::{create_player, get_player_history, get_players},
    predictions::{get_prediction, train_model},
    AppState,
};

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/players", get(get_players).post(create_player))
        .route("/api/matches", get(get_matches).post(create_match))
        .route("/api/rankings/recalculate", post(recalculate_rankings))
        .route("/api/player/:id/history", get(get_player_history))
        .route("/api/predict/:player1_id/:player2_id", get(get_prediction))
        .route("/api/model/train", post(train_model))
        .with_state(state)
}
