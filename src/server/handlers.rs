use axum::{extract::State, http::Uri, Json};

use super::error::ApiError;
use super::AppState;
use crate::core::{Catalog, StatusReport};

pub async fn scan(State(state): State<AppState>) -> Result<Json<Catalog>, ApiError> {
    let catalog = state.scanner.scan().await?;
    Ok(Json(catalog))
}

pub async fn status(State(state): State<AppState>) -> Json<StatusReport> {
    Json(StatusReport::online(
        state.port,
        state.started_at.elapsed().as_secs_f64(),
    ))
}

pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(uri.path().to_string())
}
