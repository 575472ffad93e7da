//! Random pick from a user's Letterboxd watchlist.
//!
//! Flow: resolve genres → walk listing pages → pick one film → enrich it
//! from its detail page.

use std::sync::Arc;

use crate::{
    cache::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{EnrichedRecord, ListingCandidate},
};

pub mod enricher;
pub mod extractor;
pub mod fetcher;
pub mod genres;
pub mod paginator;
pub mod selector;

pub use enricher::{DetailEnricher, LetterboxdDetailEnricher};
pub use fetcher::{HttpPageFetcher, PageFetcher};
pub use genres::GenreFilter;
pub use paginator::{PaginationLimits, StopReason, WatchlistPaginator};
pub use selector::RandomSelector;

/// Storage for complete candidate sets, keyed by user and genre filter
///
/// Reads never fail: an unreachable or corrupt store reads as a miss.
/// Writes return immediately without waiting for the store.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CandidateCache: Send + Sync {
    /// Previously stored candidates, `None` on a miss
    async fn load(&self, key: &CacheKey) -> Option<Vec<ListingCandidate>>;

    /// Queues `candidates` for storage under `key`
    fn store(&self, key: &CacheKey, candidates: &[ListingCandidate]);
}

/// Redis-backed candidate cache with a fixed TTL in seconds
#[derive(Clone)]
pub struct WatchlistCache {
    pub cache: Cache,
    pub ttl: u64,
}

#[async_trait::async_trait]
impl CandidateCache for WatchlistCache {
    async fn load(&self, key: &CacheKey) -> Option<Vec<ListingCandidate>> {
        self.cache.get_or_miss(key).await
    }

    fn store(&self, key: &CacheKey, candidates: &[ListingCandidate]) {
        self.cache.set_in_background(key, &candidates, self.ttl);
    }
}

/// Orchestrates a single watchlist pick
///
/// Holds only clients and configuration; each `run` owns its own state.
#[derive(Clone)]
pub struct WatchlistPipeline {
    listing_fetcher: Arc<dyn PageFetcher>,
    enricher: Arc<dyn DetailEnricher>,
    site_url: String,
    limits: PaginationLimits,
    cache: Option<Arc<dyn CandidateCache>>,
    seed: Option<u64>,
}

impl WatchlistPipeline {
    pub fn new(
        listing_fetcher: Arc<dyn PageFetcher>,
        enricher: Arc<dyn DetailEnricher>,
        site_url: String,
        limits: PaginationLimits,
    ) -> Self {
        Self {
            listing_fetcher,
            enricher,
            site_url: site_url.trim_end_matches('/').to_string(),
            limits,
            cache: None,
            seed: None,
        }
    }

    /// Enables caching of collected candidate sets
    pub fn with_cache(mut self, cache: Option<Arc<dyn CandidateCache>>) -> Self {
        self.cache = cache;
        self
    }

    /// Fixes the selection seed so picks are reproducible
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Picks and enriches one film from `username`'s watchlist
    pub async fn run(&self, username: &str, genre_ids: &[u32]) -> AppResult<EnrichedRecord> {
        let username = validate_username(username)?;

        let filter = GenreFilter::resolve(genre_ids);
        if filter.is_unresolvable() {
            return Err(AppError::InvalidInput(
                "Invalid genre IDs provided".to_string(),
            ));
        }

        let base_url = genres::watchlist_url(&self.site_url, username, &filter);
        tracing::info!(
            username = %username,
            genres = ?filter.slugs(),
            url = %base_url,
            "Scraping watchlist"
        );

        let candidates = self.collect_candidates(username, &filter, &base_url).await?;

        if candidates.is_empty() {
            return Err(AppError::NoCandidatesFound {
                genre_filtered: filter.was_requested(),
            });
        }

        let mut selector = match self.seed {
            Some(seed) => RandomSelector::seeded(seed),
            None => RandomSelector::from_os(),
        };
        let selected = selector
            .select(&candidates)
            .cloned()
            .ok_or_else(|| AppError::Internal("Selection from non-empty list failed".to_string()))?;

        tracing::info!(
            film = %selected.display_name,
            year = ?selected.year,
            pool = candidates.len(),
            "Selected film"
        );

        let detail_url = format!("{}{}", self.site_url, selected.detail_path);
        let details = self.enricher.enrich(&detail_url).await;

        Ok(EnrichedRecord::from_candidate(selected, &self.site_url, details))
    }

    /// Cached candidate set, or a fresh paginated walk
    ///
    /// Only a walk that ended without a fetch error is stored, so a partial
    /// set cut short by a timeout or upstream failure is never served to a
    /// later caller. Fails only when nothing was collected and the walk
    /// ended on a fetch error.
    async fn collect_candidates(
        &self,
        username: &str,
        filter: &GenreFilter,
        base_url: &str,
    ) -> AppResult<Vec<ListingCandidate>> {
        let key = CacheKey::Watchlist {
            username: username.to_string(),
            genres: filter.cache_fragment(),
        };

        // Cache hit skips pagination entirely
        if let Some(cache) = &self.cache {
            if let Some(candidates) = cache.load(&key).await {
                tracing::debug!(key = %key, count = candidates.len(), "Watchlist cache hit");
                return Ok(candidates);
            }
        }

        let paginator = WatchlistPaginator::new(self.listing_fetcher.as_ref(), self.limits);
        let pagination = paginator.collect(base_url).await;

        match pagination.fetch_error() {
            Some(err) if pagination.candidates.is_empty() => {
                return Err(AppError::Upstream(err.clone()));
            }
            Some(_) => {
                tracing::debug!(key = %key, "Partial walk, not caching");
            }
            None => {
                if let Some(cache) = &self.cache {
                    if !pagination.candidates.is_empty() {
                        cache.store(&key, &pagination.candidates);
                    }
                }
            }
        }

        Ok(pagination.candidates)
    }
}

/// Trims and checks a Letterboxd username
pub fn validate_username(username: &str) -> AppResult<&str> {
    let trimmed = username.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidInput("Username required".to_string()));
    }

    let valid = trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if !valid {
        return Err(AppError::InvalidInput(
            "Invalid username format".to_string(),
        ));
    }

    Ok(trimmed)
}
