use serde::{Deserialize, Serialize};

pub mod movie;

pub use movie::{
    RandomMovie, RecommendationsResponse, TraktIds, TraktMovie, WatchmodeTitle,
    WatchmodeTitleDetails,
};

// ============================================================================
// Watchlist Types
// ============================================================================

/// One film discovered on a watchlist listing page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListingCandidate {
    pub display_name: String,
    /// Site-relative path to the film's own page
    pub detail_path: String,
    /// Per-film token scraped next to the path
    pub external_id: String,
    pub year: Option<String>,
    #[serde(default)]
    pub poster_url: String,
    #[serde(default)]
    pub overview: String,
}

impl ListingCandidate {
    /// Creates a candidate with empty enrichment fields, inferring the year from the path
    pub fn new(display_name: String, detail_path: String, external_id: String) -> Self {
        let year = crate::services::watchlist::extractor::year_from_path(&detail_path);
        Self {
            display_name,
            detail_path,
            external_id,
            year,
            poster_url: String::new(),
            overview: String::new(),
        }
    }
}

/// Poster and synopsis recovered from a film detail page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PosterDetails {
    pub poster_url: String,
    /// `None` when the page had no synopsis; the candidate keeps its own
    pub overview: Option<String>,
}

/// Final watchlist pick returned to the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EnrichedRecord {
    pub name: String,
    /// Absolute permalink of the film page
    pub slug: String,
    pub image: String,
    pub year: Option<String>,
    pub overview: String,
}

impl EnrichedRecord {
    /// Merges enrichment results into the selected candidate
    pub fn from_candidate(candidate: ListingCandidate, site_url: &str, details: PosterDetails) -> Self {
        let permalink = format!("{}{}", site_url, candidate.detail_path);
        Self {
            name: candidate.display_name,
            slug: permalink,
            image: details.poster_url,
            year: candidate.year,
            overview: details.overview.unwrap_or(candidate.overview),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_candidate_has_empty_enrichment_fields() {
        let candidate = ListingCandidate::new(
            "Heat".to_string(),
            "/film/heat-1995/".to_string(),
            "heat-1995".to_string(),
        );
        assert!(candidate.poster_url.is_empty());
        assert!(candidate.overview.is_empty());
        assert_eq!(candidate.year, None);
    }

    #[test]
    fn test_enriched_record_keeps_overview_when_details_have_none() {
        let mut candidate = ListingCandidate::new(
            "Heat".to_string(),
            "/films/1995/heat/".to_string(),
            "heat".to_string(),
        );
        candidate.overview = "existing".to_string();

        let record = EnrichedRecord::from_candidate(
            candidate,
            "https://letterboxd.com",
            PosterDetails {
                poster_url: "https://img.example/heat.jpg".to_string(),
                overview: None,
            },
        );

        assert_eq!(record.slug, "https://letterboxd.com/films/1995/heat/");
        assert_eq!(record.year.as_deref(), Some("1995"));
        assert_eq!(record.overview, "existing");
        assert_eq!(record.image, "https://img.example/heat.jpg");
    }

    #[test]
    fn test_enriched_record_serializes_missing_year_as_null() {
        let record = EnrichedRecord {
            name: "Heat".to_string(),
            slug: "https://letterboxd.com/film/heat/".to_string(),
            image: String::new(),
            year: None,
            overview: String::new(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert!(json["year"].is_null());
        assert_eq!(json["name"], "Heat");
    }
}
