use serde::{Deserialize, Serialize};

// ============================================================================
// Watchmode API Types
// ============================================================================

/// Entry from Watchmode's `/list-titles/` endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchmodeTitle {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub imdb_id: Option<String>,
    #[serde(default)]
    pub tmdb_id: Option<u64>,
    #[serde(default)]
    pub tmdb_type: Option<String>,
    #[serde(rename = "type", default)]
    pub title_type: Option<String>,
}

/// Subset of Watchmode's `/title/{id}/details/` response
#[derive(Debug, Clone, Deserialize)]
pub struct WatchmodeTitleDetails {
    #[serde(default)]
    pub poster: Option<String>,
}

/// Random catalog pick returned by `/api/random`
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RandomMovie {
    #[serde(flatten)]
    pub title: WatchmodeTitle,
    pub image: Option<String>,
}

// ============================================================================
// Trakt API Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TraktIds {
    #[serde(default)]
    pub trakt: Option<u64>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub imdb: Option<String>,
    #[serde(default)]
    pub tmdb: Option<u64>,
}

/// Movie entry from Trakt's `/movies/popular` endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TraktMovie {
    pub title: String,
    #[serde(default)]
    pub year: Option<i32>,
    pub ids: TraktIds,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RecommendationsResponse {
    pub recommendations: Vec<TraktMovie>,
}
