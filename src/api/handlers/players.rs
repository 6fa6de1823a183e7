use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use std::sync::Arc;

use super::{error_response, AppState};
use crate::api::models::{CreatePlayerRequest, PlayerListItem, RatingHistoryResponse, WindowParams};
use crate::domain::PlayerId;

pub async fn get_players(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.league().get_players() {
        Ok(players) => Json(PlayerListItem::standings(players)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn create_player(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreatePlayerRequest>,
) -> impl IntoResponse {
    let _guard = state.write_lock.lock().await;

    match state.league().add_player(&request.name) {
        Ok(player) => (StatusCode::CREATED, Json(player)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn get_player_history(
    State(state): State<Arc<AppState>>,
    Path(player_id): Path<PlayerId>,
    Query(params): Query<WindowParams>,
) -> impl IntoResponse {
    match state
        .league()
        .get_player_rating_history(player_id, &params.window())
    {
        Ok(history) => Json(RatingHistoryResponse { player_id, history }).into_response(),
        Err(e) => error_response(e),
    }
}
