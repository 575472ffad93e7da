use axum::{extract::State, Extension, Json};
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::RandomMovie,
    routes::AppState,
};

/// Handler for the random catalog movie endpoint
pub async fn random_movie(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
) -> AppResult<Json<RandomMovie>> {
    let source = state.random_movies.as_ref().ok_or_else(|| {
        AppError::ServiceUnavailable("Random movie provider is not configured".to_string())
    })?;

    tracing::info!(request_id = %request_id, provider = source.name(), "Picking random movie");

    let movie = source.random_movie().await?;
    Ok(Json(movie))
}
