/// Caller genre ids (TMDB numbering) → Letterboxd genre slugs
const GENRE_SLUGS: &[(u32, &str)] = &[
    (28, "action"),
    (12, "adventure"),
    (16, "animation"),
    (35, "comedy"),
    (80, "crime"),
    (99, "documentary"),
    (18, "drama"),
    (10751, "family"),
    (14, "fantasy"),
    (36, "history"),
    (27, "horror"),
    (10402, "music"),
    (9648, "mystery"),
    (10749, "romance"),
    (878, "sci-fi"),
    (53, "thriller"),
    (10752, "war"),
    (37, "western"),
    (10770, "tv-movie"),
];

/// Looks up the site slug for a genre id
pub fn slug_for(genre_id: u32) -> Option<&'static str> {
    GENRE_SLUGS
        .iter()
        .find(|(id, _)| *id == genre_id)
        .map(|(_, slug)| *slug)
}

/// Requested genre ids resolved against the site vocabulary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenreFilter {
    requested: Vec<u32>,
    slugs: Vec<&'static str>,
}

impl GenreFilter {
    /// Maps ids to slugs in input order, dropping duplicates and unknown ids
    pub fn resolve(genre_ids: &[u32]) -> Self {
        let mut slugs: Vec<&'static str> = Vec::with_capacity(genre_ids.len());

        for &id in genre_ids {
            match slug_for(id) {
                Some(slug) if !slugs.contains(&slug) => slugs.push(slug),
                Some(_) => {}
                None => tracing::debug!(genre_id = id, "Dropping unknown genre id"),
            }
        }

        Self {
            requested: genre_ids.to_vec(),
            slugs,
        }
    }

    pub fn slugs(&self) -> &[&'static str] {
        &self.slugs
    }

    /// True when the caller asked for any genre, mapped or not
    pub fn was_requested(&self) -> bool {
        !self.requested.is_empty()
    }

    /// True when genres were requested but none of them map to a slug
    pub fn is_unresolvable(&self) -> bool {
        self.was_requested() && self.slugs.is_empty()
    }

    /// `genre/<slug>+<slug>` or an empty string when unfiltered
    pub fn url_segment(&self) -> String {
        if self.slugs.is_empty() {
            String::new()
        } else {
            format!("genre/{}", self.slugs.join("+"))
        }
    }

    /// Order-independent form of the slug set, used in cache keys
    pub fn cache_fragment(&self) -> String {
        if self.slugs.is_empty() {
            return "all".to_string();
        }
        let mut sorted = self.slugs.clone();
        sorted.sort_unstable();
        sorted.join("+")
    }
}

/// Listing URL for a user's watchlist, optionally genre filtered
pub fn watchlist_url(site_url: &str, username: &str, filter: &GenreFilter) -> String {
    let base = format!("{}/{}/watchlist", site_url, username);
    let segment = filter.url_segment();
    if segment.is_empty() {
        base
    } else {
        format!("{}/{}", base, segment)
    }
}
