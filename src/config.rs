use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Base URL of the watchlist site (no trailing slash)
    #[serde(default = "default_letterboxd_url")]
    pub letterboxd_url: String,

    /// Timeout for a single watchlist listing page, in seconds
    #[serde(default = "default_listing_timeout_secs")]
    pub listing_timeout_secs: u64,

    /// Timeout for the film detail page, in seconds
    #[serde(default = "default_detail_timeout_secs")]
    pub detail_timeout_secs: u64,

    /// Maximum number of listing pages walked per request
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    /// Maximum number of films collected per request
    #[serde(default = "default_max_films")]
    pub max_films: usize,

    /// Image returned when no poster can be found
    #[serde(default = "default_fallback_poster_url")]
    pub fallback_poster_url: String,

    /// Redis connection URL; the watchlist cache is disabled when unset
    #[serde(default)]
    pub redis_url: Option<String>,

    /// TTL of cached watchlist candidate sets, in seconds
    #[serde(default = "default_watchlist_cache_ttl_secs")]
    pub watchlist_cache_ttl_secs: u64,

    /// Watchmode API key for the random movie endpoint
    #[serde(default)]
    pub watchmode_api_key: Option<String>,

    /// Watchmode API base URL
    #[serde(default = "default_watchmode_api_url")]
    pub watchmode_api_url: String,

    /// Trakt client id for the recommendation endpoint
    #[serde(default)]
    pub trakt_client_id: Option<String>,

    /// Trakt API base URL
    #[serde(default = "default_trakt_api_url")]
    pub trakt_api_url: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_letterboxd_url() -> String {
    "https://letterboxd.com".to_string()
}

fn default_listing_timeout_secs() -> u64 {
    10
}

fn default_detail_timeout_secs() -> u64 {
    15
}

fn default_max_pages() -> u32 {
    10
}

fn default_max_films() -> usize {
    250
}

fn default_fallback_poster_url() -> String {
    "https://watchlistpicker.com/noimagefound.jpg".to_string()
}

fn default_watchlist_cache_ttl_secs() -> u64 {
    600
}

fn default_watchmode_api_url() -> String {
    "https://api.watchmode.com".to_string()
}

fn default_trakt_api_url() -> String {
    "https://api.trakt.tv".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            letterboxd_url: default_letterboxd_url(),
            listing_timeout_secs: default_listing_timeout_secs(),
            detail_timeout_secs: default_detail_timeout_secs(),
            max_pages: default_max_pages(),
            max_films: default_max_films(),
            fallback_poster_url: default_fallback_poster_url(),
            redis_url: None,
            watchlist_cache_ttl_secs: default_watchlist_cache_ttl_secs(),
            watchmode_api_key: None,
            watchmode_api_url: default_watchmode_api_url(),
            trakt_client_id: None,
            trakt_api_url: default_trakt_api_url(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Site base URL with any trailing slash removed
    pub fn site_url(&self) -> &str {
        self.letterboxd_url.trim_end_matches('/')
    }
}
