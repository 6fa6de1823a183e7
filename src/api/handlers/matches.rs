use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::Utc;
use std::sync::Arc;

use super::{error_response, AppState};
use crate::api::models::{CreateMatchRequest, RecalculationResponse, WindowParams};

pub async fn get_matches(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.league().get_matches() {
        Ok(matches) => Json(matches).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn create_match(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateMatchRequest>,
) -> impl IntoResponse {
    let new_match = request.into_new_match(Utc::now());
    let _guard = state.write_lock.lock().await;

    match state.league().add_match(new_match) {
        Ok(outcome) => (StatusCode::CREATED, Json(outcome)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn recalculate_rankings(
    State(state): State<Arc<AppState>>,
    Query(params): Query<WindowParams>,
) -> impl IntoResponse {
    let _guard = state.write_lock.lock().await;

    match state.league().recalculate_rankings(&params.window()) {
        Ok(recalculation) => Json(RecalculationResponse::from(recalculation)).into_response(),
        Err(e) => error_response(e),
    }
}
