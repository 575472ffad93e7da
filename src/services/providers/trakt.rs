/// Trakt API provider
///
/// Popular movies filtered by genre, shuffled locally so repeated calls
/// give different recommendations.
use crate::{
    error::{AppError, AppResult},
    models::TraktMovie,
    services::providers::RecommendationSource,
};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use reqwest::Client as HttpClient;

const TRAKT_API_VERSION: &str = "2";
const POPULAR_LIMIT: u32 = 100;

#[derive(Clone)]
pub struct TraktProvider {
    http_client: HttpClient,
    client_id: String,
    api_url: String,
}

impl TraktProvider {
    pub fn new(client_id: String, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            client_id,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    async fn popular_movies(&self, genres: &[String]) -> AppResult<Vec<TraktMovie>> {
        let url = format!("{}/movies/popular", self.api_url);
        let response = self
            .http_client
            .get(&url)
            .header("Content-Type", "application/json")
            .header("trakt-api-version", TRAKT_API_VERSION)
            .header("trakt-api-key", &self.client_id)
            .query(&[("genres", genres.join(",")), ("limit", POPULAR_LIMIT.to_string())])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Trakt request failed");
            return Err(AppError::ExternalApi(format!(
                "Trakt API returned status {}",
                status
            )));
        }

        Ok(response.json().await?)
    }
}

#[async_trait::async_trait]
impl RecommendationSource for TraktProvider {
    async fn recommend(&self, genres: &[String], limit: usize) -> AppResult<Vec<TraktMovie>> {
        let mut movies = self.popular_movies(genres).await?;

        tracing::info!(
            genres = ?genres,
            results = movies.len(),
            provider = "trakt",
            "Popular movies fetched"
        );

        if movies.is_empty() {
            return Err(AppError::NotFound(
                "No movies found for these genres.".to_string(),
            ));
        }

        movies.shuffle(&mut StdRng::from_os_rng());
        movies.truncate(limit);
        Ok(movies)
    }

    fn name(&self) -> &'static str {
        "trakt"
    }
}
