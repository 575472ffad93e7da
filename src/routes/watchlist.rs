use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::EnrichedRecord,
    routes::AppState,
};

#[derive(Debug, Deserialize)]
pub struct WatchlistQuery {
    pub username: Option<String>,
    pub genres: Option<String>,
}

/// Handler for the random watchlist pick endpoint
pub async fn random_pick(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<WatchlistQuery>,
) -> AppResult<Json<EnrichedRecord>> {
    let username = params.username.unwrap_or_default();
    let genre_ids = parse_genre_ids(params.genres.as_deref())?;

    tracing::info!(
        request_id = %request_id,
        username = %username,
        genres = ?genre_ids,
        "Received watchlist pick request"
    );

    let record = state.watchlist.run(&username, &genre_ids).await?;

    tracing::info!(request_id = %request_id, film = %record.name, "Watchlist pick completed");

    Ok(Json(record))
}

/// Parses a comma-separated list of integer genre ids
///
/// Blank tokens are ignored; anything else that is not an integer is rejected.
pub fn parse_genre_ids(raw: Option<&str>) -> AppResult<Vec<u32>> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };

    raw.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| {
            token
                .parse::<u32>()
                .map_err(|_| AppError::InvalidInput("Invalid genre IDs provided".to_string()))
        })
        .collect()
}
