/// Third-party movie catalog integrations
///
/// Each provider is a single request/response proxy with no pipeline
/// semantics. Traits keep the route handlers independent of the vendor.
use crate::{
    error::AppResult,
    models::{RandomMovie, TraktMovie},
};

pub mod trakt;
pub mod watchmode;

pub use trakt::TraktProvider;
pub use watchmode::WatchmodeProvider;

/// Source of a random catalog title
#[async_trait::async_trait]
pub trait RandomMovieSource: Send + Sync {
    /// Picks one movie uniformly from the provider's listing
    async fn random_movie(&self) -> AppResult<RandomMovie>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Source of popular movies filtered by genre slugs
#[async_trait::async_trait]
pub trait RecommendationSource: Send + Sync {
    /// Returns up to `limit` shuffled popular movies for the given genres
    async fn recommend(&self, genres: &[String], limit: usize) -> AppResult<Vec<TraktMovie>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
