use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::RecommendationsResponse,
    routes::AppState,
};

const DEFAULT_LIMIT: usize = 5;

#[derive(Debug, Deserialize)]
pub struct RecommendQuery {
    pub genres: Option<String>,
    pub limit: Option<usize>,
}

/// Handler for genre-based recommendations
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<RecommendQuery>,
) -> AppResult<Json<RecommendationsResponse>> {
    let genres: Vec<String> = params
        .genres
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .map(|g| g.trim().to_lowercase())
        .filter(|g| !g.is_empty())
        .collect();

    if genres.is_empty() {
        return Err(AppError::InvalidInput("Genres are required.".to_string()));
    }

    let source = state.recommendations.as_ref().ok_or_else(|| {
        AppError::ServiceUnavailable("Recommendation provider is not configured".to_string())
    })?;

    let limit = params.limit.filter(|l| *l > 0).unwrap_or(DEFAULT_LIMIT);

    tracing::info!(
        request_id = %request_id,
        genres = ?genres,
        limit,
        provider = source.name(),
        "Received recommendation request"
    );

    let recommendations = source.recommend(&genres, limit).await?;
    Ok(Json(RecommendationsResponse { recommendations }))
}
