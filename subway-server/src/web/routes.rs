//! HTTP route handlers.

use axum::body::Bytes;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{delete, get},
};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::domain::StationId;
use crate::registry::RegistryError;

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/stations", get(list_stations).post(create_station))
        .route("/stations/:id", delete(delete_station))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Create a station.
///
/// Responds 201 with the stored station and its location.
async fn create_station(State(state): State<AppState>, body: Bytes) -> Result<Response, AppError> {
    // Parse JSON manually so a bad body is a 400 and gets logged
    let req: CreateStationRequest = serde_json::from_slice(&body).map_err(|e| {
        warn!(body = %String::from_utf8_lossy(&body), "invalid station JSON: {e}");
        AppError::BadRequest {
            message: format!("Invalid JSON: {e}"),
        }
    })?;

    let station = state.registry.create(req.name).await?;
    let location = format!("/stations/{}", station.id);

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(StationResponse::from(station)),
    )
        .into_response())
}

/// List all stations in creation order.
async fn list_stations(State(state): State<AppState>) -> Json<Vec<StationResponse>> {
    let stations = state
        .registry
        .list()
        .await
        .into_iter()
        .map(StationResponse::from)
        .collect();

    Json(stations)
}

/// Delete a station by id.
async fn delete_station(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = raw_id
        .parse::<u64>()
        .map(StationId::new)
        .map_err(|_| AppError::BadRequest {
            message: format!("Invalid station id: {raw_id}"),
        })?;

    state.registry.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Internal { message: String },
}

impl From<RegistryError> for AppError {
    fn from(e: RegistryError) -> Self {
        match e {
            RegistryError::InvalidName(_) => AppError::BadRequest {
                message: e.to_string(),
            },
            RegistryError::NotFound(_) => AppError::NotFound {
                message: e.to_string(),
            },
            RegistryError::IdsExhausted | RegistryError::Storage { .. } => AppError::Internal {
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!(%status, "{message}");
        } else {
            warn!(%status, "{message}");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
