use axum::{
    extract::{Path, State},
    response::{IntoResponse, Json},
};
use std::sync::Arc;

use super::{error_response, AppState};
use crate::api::models::TrainingResponse;
use crate::domain::PlayerId;

pub async fn get_prediction(
    State(state): State<Arc<AppState>>,
    Path((player1_id, player2_id)): Path<(PlayerId, PlayerId)>,
) -> impl IntoResponse {
    match state.league().predict(player1_id, player2_id) {
        Ok(prediction) => Json(prediction).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn train_model(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let _guard = state.write_lock.lock().await;

    match state.league().train_model() {
        Ok(report) => Json(TrainingResponse::from(report)).into_response(),
        Err(e) => error_response(e),
    }
}
