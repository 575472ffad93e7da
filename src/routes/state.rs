use std::{sync::Arc, time::Duration};

use crate::{
    cache::Cache,
    config::Config,
    services::{
        providers::{RandomMovieSource, RecommendationSource, TraktProvider, WatchmodeProvider},
        watchlist::{
            CandidateCache, HttpPageFetcher, LetterboxdDetailEnricher, PaginationLimits,
            WatchlistCache, WatchlistPipeline,
        },
    },
};

/// Shared application state
///
/// Optional providers are `None` when their credentials are not configured.
#[derive(Clone)]
pub struct AppState {
    pub watchlist: WatchlistPipeline,
    pub random_movies: Option<Arc<dyn RandomMovieSource>>,
    pub recommendations: Option<Arc<dyn RecommendationSource>>,
}

impl AppState {
    /// Builds every client from configuration
    pub fn build(config: &Config, cache: Option<Cache>) -> anyhow::Result<Self> {
        let site_url = config.site_url().to_string();

        let listing_fetcher =
            HttpPageFetcher::listing(Duration::from_secs(config.listing_timeout_secs))?;
        let detail_fetcher = HttpPageFetcher::detail(
            Duration::from_secs(config.detail_timeout_secs),
            &format!("{}/", site_url),
        )?;
        let enricher = LetterboxdDetailEnricher::new(
            Arc::new(detail_fetcher),
            site_url.clone(),
            config.fallback_poster_url.clone(),
        );

        let limits = PaginationLimits {
            max_pages: config.max_pages,
            max_records: config.max_films,
        };
        let watchlist_cache = cache.clone().map(|cache| {
            Arc::new(WatchlistCache {
                cache,
                ttl: config.watchlist_cache_ttl_secs,
            }) as Arc<dyn CandidateCache>
        });

        let watchlist =
            WatchlistPipeline::new(Arc::new(listing_fetcher), Arc::new(enricher), site_url, limits)
                .with_cache(watchlist_cache);

        let random_movies = match &config.watchmode_api_key {
            Some(key) if !key.is_empty() => Some(Arc::new(WatchmodeProvider::new(
                key.clone(),
                config.watchmode_api_url.clone(),
                cache,
            )) as Arc<dyn RandomMovieSource>),
            _ => {
                tracing::warn!("WATCHMODE_API_KEY not set, /api/random disabled");
                None
            }
        };

        let recommendations = match &config.trakt_client_id {
            Some(id) if !id.is_empty() => Some(Arc::new(TraktProvider::new(
                id.clone(),
                config.trakt_api_url.clone(),
            )) as Arc<dyn RecommendationSource>),
            _ => {
                tracing::warn!("TRAKT_CLIENT_ID not set, /api/recommend disabled");
                None
            }
        };

        Ok(Self {
            watchlist,
            random_movies,
            recommendations,
        })
    }
}
