/// Watchmode API provider
///
/// API Flow:
/// 1. Listing: /v1/list-titles/?types=movie → up to 100 movie titles
/// 2. Poster: /v1/title/{watchmode_id}/details/ → poster path for the pick
use crate::{
    cache::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{RandomMovie, WatchmodeTitle, WatchmodeTitleDetails},
    services::{providers::RandomMovieSource, watchlist::RandomSelector},
};
use reqwest::Client as HttpClient;
use serde::Deserialize;

const LIST_CACHE_TTL: u64 = 3600; // 1 hour
const LIST_LIMIT: &str = "100";
const POSTER_CDN: &str = "https://cdn.watchmode.com/posters";

#[derive(Debug, Deserialize)]
struct ListTitlesResponse {
    #[serde(default)]
    titles: Vec<WatchmodeTitle>,
}

#[derive(Clone)]
pub struct WatchmodeProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    cache: Option<Cache>,
}

impl WatchmodeProvider {
    pub fn new(api_key: String, api_url: String, cache: Option<Cache>) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            cache,
        }
    }

    /// Movie listing, served from cache when possible
    async fn list_titles(&self) -> AppResult<Vec<WatchmodeTitle>> {
        let key = CacheKey::RandomTitles;
        if let Some(cache) = &self.cache {
            if let Some(titles) = cache.get_or_miss::<Vec<WatchmodeTitle>>(&key).await {
                return Ok(titles);
            }
        }

        let url = format!("{}/v1/list-titles/", self.api_url);
        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("apiKey", self.api_key.as_str()),
                ("types", "movie"),
                ("limit", LIST_LIMIT),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Watchmode listing request failed");
            return Err(AppError::ExternalApi(format!(
                "Watchmode API returned status {}",
                status
            )));
        }

        let listing: ListTitlesResponse = response.json().await?;

        tracing::info!(
            results = listing.titles.len(),
            provider = "watchmode",
            "Title listing fetched"
        );

        if let Some(cache) = &self.cache {
            if !listing.titles.is_empty() {
                cache.set_in_background(&key, &listing.titles, LIST_CACHE_TTL);
            }
        }

        Ok(listing.titles)
    }

    /// Poster URL for a title; `None` on any failure
    async fn poster_for(&self, watchmode_id: u64) -> Option<String> {
        let url = format!("{}/v1/title/{}/details/", self.api_url, watchmode_id);

        let result = async {
            let response = self
                .http_client
                .get(&url)
                .query(&[("apiKey", self.api_key.as_str())])
                .send()
                .await?
                .error_for_status()?;
            response.json::<WatchmodeTitleDetails>().await
        }
        .await;

        match result {
            Ok(details) => details.poster.filter(|p| !p.is_empty()).map(|poster| {
                if poster.starts_with("http") {
                    poster
                } else {
                    format!("{}/{}", POSTER_CDN, poster.trim_start_matches('/'))
                }
            }),
            Err(e) => {
                tracing::warn!(watchmode_id, error = %e, "Watchmode poster lookup failed");
                None
            }
        }
    }
}

#[async_trait::async_trait]
impl RandomMovieSource for WatchmodeProvider {
    async fn random_movie(&self) -> AppResult<RandomMovie> {
        let titles = self.list_titles().await?;

        let title = RandomSelector::from_os()
            .select(&titles)
            .cloned()
            .ok_or_else(|| AppError::NotFound("No movies found.".to_string()))?;

        let image = self.poster_for(title.id).await;

        tracing::info!(title = %title.title, id = title.id, "Random movie selected");

        Ok(RandomMovie { title, image })
    }

    fn name(&self) -> &'static str {
        "watchmode"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::{
        matchers::{method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    fn provider(server: &MockServer) -> WatchmodeProvider {
        WatchmodeProvider::new("test_key".to_string(), server.uri(), None)
    }

    #[tokio::test]
    async fn test_random_movie_attaches_cdn_poster() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/list-titles/"))
            .and(query_param("apiKey", "test_key"))
            .and(query_param("types", "movie"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "titles": [{
                    "id": 1295258,
                    "title": "Heat",
                    "year": 1995,
                    "imdb_id": "tt0113277",
                    "tmdb_id": 949,
                    "tmdb_type": "movie",
                    "type": "movie"
                }]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/title/1295258/details/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "poster": "1295258_poster_w185.jpg"
            })))
            .mount(&server)
            .await;

        let movie = provider(&server).random_movie().await.unwrap();

        assert_eq!(movie.title.title, "Heat");
        assert_eq!(
            movie.image.as_deref(),
            Some("https://cdn.watchmode.com/posters/1295258_poster_w185.jpg")
        );
    }

    #[tokio::test]
    async fn test_poster_failure_yields_no_image() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/list-titles/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "titles": [{ "id": 7, "title": "Ran" }]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/title/7/details/"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let movie = provider(&server).random_movie().await.unwrap();

        assert_eq!(movie.title.id, 7);
        assert!(movie.image.is_none());
    }

    #[tokio::test]
    async fn test_empty_listing_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/list-titles/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "titles": [] })))
            .mount(&server)
            .await;

        let err = provider(&server).random_movie().await.unwrap_err();

        assert!(matches!(err, AppError::NotFound(ref m) if m == "No movies found."));
    }

    #[tokio::test]
    async fn test_listing_error_status_is_external_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&server)
            .await;

        let err = provider(&server).random_movie().await.unwrap_err();

        assert!(matches!(err, AppError::ExternalApi(_)));
    }
}
