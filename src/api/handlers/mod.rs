use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use log::error;
use tokio::sync::Mutex;

use crate::api::models::ErrorResponse;
use crate::config::AppConfig;
use crate::errors::EngineError;
use crate::services::LeagueService;
use crate::store::SqliteStore;

pub mod matches;
pub mod players;
pub mod predictions;

pub struct AppState {
    pub store: SqliteStore,
    pub config: AppConfig,
    /// Held by every handler that changes ratings, matches or weights
    pub write_lock: Mutex<()>,
}

impl AppState {
    pub fn new(store: SqliteStore, config: AppConfig) -> Self {
        Self {
            store,
            config,
            write_lock: Mutex::new(()),
        }
    }

    pub fn league(&self) -> LeagueService<SqliteStore> {
        LeagueService::new(self.store.clone(), &self.config)
    }
}

/// Maps engine precondition failures to client errors and everything else to 500
pub fn error_response(e: anyhow::Error) -> Response {
    let status = match e.downcast_ref::<EngineError>() {
        Some(EngineError::UnknownPlayer(_)) => StatusCode::NOT_FOUND,
        Some(
            EngineError::SamePlayer(_)
            | EngineError::TiedScore { .. }
            | EngineError::InvalidWinner { .. },
        ) => StatusCode::BAD_REQUEST,
        _ if is_constraint_violation(&e) => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status == StatusCode::INTERNAL_SERVER_ERROR {
        error!("Request failed: {:#}", e);
    }

    (status, Json(ErrorResponse { error: format!("{:#}", e) })).into_response()
}

fn is_constraint_violation(e: &anyhow::Error) -> bool {
    e.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<rusqlite::Error>(),
            Some(rusqlite::Error::SqliteFailure(failure, _))
                if failure.code == rusqlite::ErrorCode::ConstraintViolation
        )
    })
}
