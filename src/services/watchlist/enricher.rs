//! Film detail page → poster URL and synopsis.
//!
//! The detail page markup changes without notice, so every failure here is
//! absorbed: the caller always gets a poster (possibly the fallback image).

use std::sync::{Arc, LazyLock};

use regex::Regex;
use scraper::{Html, Selector};

use crate::{error::FetchError, models::PosterDetails};

use super::fetcher::PageFetcher;

static POSTER_MODAL_LINK: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"section.poster-list a[data-js-trigger="postermodal"]"#));
static FILM_POSTER_IMG: LazyLock<Selector> = LazyLock::new(|| selector(".film-poster img"));
static POSTER_IMG: LazyLock<Selector> = LazyLock::new(|| selector(".poster img"));
static SIZED_POSTER_IMG: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"img[src*="image-150"], img[src*="image-230"]"#));
static OG_IMAGE: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"meta[property="og:image"]"#));

static FILM_TEXT: LazyLock<Selector> = LazyLock::new(|| selector(".film-text p"));
static REVIEW_BODY: LazyLock<Selector> = LazyLock::new(|| selector(".review .body-text p"));
static FILM_OVERVIEW_PARAGRAPH: LazyLock<Selector> =
    LazyLock::new(|| selector(".film-overview p"));
static FILM_OVERVIEW: LazyLock<Selector> = LazyLock::new(|| selector(".film-overview"));
static OVERVIEW_TEST_ID: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"[data-testid="film-overview"]"#));
static META_DESCRIPTION: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"meta[name="description"]"#));

// Resized poster paths carry `-0-<width>-0-<height>`; thumbnails are swapped for 2000x3000.
static THUMBNAIL_DIMENSIONS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"-0-(?:230|125|1000)-0-(?:345|187|1500)([-.])").expect("valid dimension pattern")
});

const PLACEHOLDER_MARKERS: &[&str] = &[
    "empty-poster",
    "placeholder",
    "default-poster",
    "no-poster",
    "blank-poster",
];

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector must parse")
}

/// Recovers poster and synopsis for one selected film
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait DetailEnricher: Send + Sync {
    /// Never fails; falls back to the configured placeholder image
    async fn enrich(&self, detail_url: &str) -> PosterDetails;
}

/// Ordered poster lookups; the first usable URL wins
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PosterStrategy {
    /// href of the poster modal trigger
    PosterModalLink,
    /// src of the main poster image
    PrimaryPosterImage,
    /// src of any image on a known poster size path
    SizedPosterImage,
    /// Open Graph image metadata
    OpenGraphImage,
}

impl PosterStrategy {
    pub const ORDER: [PosterStrategy; 4] = [
        PosterStrategy::PosterModalLink,
        PosterStrategy::PrimaryPosterImage,
        PosterStrategy::SizedPosterImage,
        PosterStrategy::OpenGraphImage,
    ];

    /// Raw candidate URLs this strategy finds, in document order
    pub fn candidates(&self, document: &Html) -> Vec<String> {
        let (selectors, attr): (Vec<&Selector>, &str) = match self {
            PosterStrategy::PosterModalLink => (vec![&*POSTER_MODAL_LINK], "href"),
            PosterStrategy::PrimaryPosterImage => (vec![&*FILM_POSTER_IMG, &*POSTER_IMG], "src"),
            PosterStrategy::SizedPosterImage => (vec![&*SIZED_POSTER_IMG], "src"),
            PosterStrategy::OpenGraphImage => (vec![&*OG_IMAGE], "content"),
        };

        selectors
            .into_iter()
            .flat_map(|sel| document.select(sel))
            .filter_map(|el| el.value().attr(attr))
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Whether hits are thumbnails worth upscaling
    fn is_thumbnail(&self) -> bool {
        matches!(
            self,
            PosterStrategy::PrimaryPosterImage | PosterStrategy::SizedPosterImage
        )
    }

    /// First non-placeholder URL, made absolute
    ///
    /// Thumbnail hits are rewritten to the largest resized variant.
    pub fn find(&self, document: &Html, site_url: &str) -> Option<String> {
        self.candidates(document)
            .into_iter()
            .map(|url| absolutize(&url, site_url))
            .find(|url| !is_placeholder(url))
            .map(|url| {
                if self.is_thumbnail() {
                    upscale_poster(&url)
                } else {
                    url
                }
            })
    }
}

/// Ordered synopsis lookups; the first non-blank text wins
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverviewStrategy {
    /// First paragraph of the film text block
    FilmText,
    /// First paragraph of a featured review
    ReviewBody,
    /// First paragraph of the overview block
    FilmOverviewParagraph,
    /// Whole overview block text
    FilmOverview,
    /// Element tagged `data-testid="film-overview"`
    TestIdOverview,
    /// `<meta name="description">` content
    MetaDescription,
}

impl OverviewStrategy {
    pub const ORDER: [OverviewStrategy; 6] = [
        OverviewStrategy::FilmText,
        OverviewStrategy::ReviewBody,
        OverviewStrategy::FilmOverviewParagraph,
        OverviewStrategy::FilmOverview,
        OverviewStrategy::TestIdOverview,
        OverviewStrategy::MetaDescription,
    ];

    /// Trimmed text of the first match, `None` when missing or blank
    pub fn find(&self, document: &Html) -> Option<String> {
        let element = match self {
            OverviewStrategy::FilmText => document.select(&FILM_TEXT).next(),
            OverviewStrategy::ReviewBody => document.select(&REVIEW_BODY).next(),
            OverviewStrategy::FilmOverviewParagraph => {
                document.select(&FILM_OVERVIEW_PARAGRAPH).next()
            }
            OverviewStrategy::FilmOverview => document.select(&FILM_OVERVIEW).next(),
            OverviewStrategy::TestIdOverview => document.select(&OVERVIEW_TEST_ID).next(),
            OverviewStrategy::MetaDescription => {
                return document
                    .select(&META_DESCRIPTION)
                    .next()
                    .and_then(|meta| meta.value().attr("content"))
                    .map(|content| content.trim().to_string())
                    .filter(|text| !text.is_empty());
            }
        }?;

        let text = element.text().collect::<String>();
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }
}

/// What a detail page yielded before fallbacks are applied
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailPage {
    pub poster_url: Option<String>,
    pub overview: Option<String>,
}

/// Parses a detail page using the poster and overview strategies in order
pub fn parse_detail_page(html: &str, site_url: &str) -> DetailPage {
    let document = Html::parse_document(html);

    let poster_url = PosterStrategy::ORDER
        .iter()
        .find_map(|strategy| strategy.find(&document, site_url));

    let overview = OverviewStrategy::ORDER
        .iter()
        .find_map(|strategy| strategy.find(&document));

    DetailPage {
        poster_url,
        overview,
    }
}

/// Makes `//host/...` and `/path` URLs absolute
pub fn absolutize(url: &str, site_url: &str) -> String {
    if let Some(rest) = url.strip_prefix("//") {
        format!("https://{}", rest)
    } else if url.starts_with('/') {
        format!("{}{}", site_url.trim_end_matches('/'), url)
    } else {
        url.to_string()
    }
}

/// Rewrites a resized thumbnail path to its 2000x3000 variant
///
/// URLs without a recognised thumbnail size are returned unchanged.
pub fn upscale_poster(url: &str) -> String {
    THUMBNAIL_DIMENSIONS
        .replace(url, "-0-2000-0-3000$1")
        .into_owned()
}

/// Known "no poster" placeholder images
pub fn is_placeholder(url: &str) -> bool {
    let lower = url.to_lowercase();
    PLACEHOLDER_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// Scrapes Letterboxd film pages
#[derive(Clone)]
pub struct LetterboxdDetailEnricher {
    fetcher: Arc<dyn PageFetcher>,
    site_url: String,
    fallback_poster_url: String,
}

impl LetterboxdDetailEnricher {
    pub fn new(fetcher: Arc<dyn PageFetcher>, site_url: String, fallback_poster_url: String) -> Self {
        Self {
            fetcher,
            site_url,
            fallback_poster_url,
        }
    }

    fn fallback(&self) -> PosterDetails {
        PosterDetails {
            poster_url: self.fallback_poster_url.clone(),
            overview: None,
        }
    }

    async fn scrape(&self, detail_url: &str) -> Result<DetailPage, FetchError> {
        let html = self.fetcher.fetch(detail_url).await?;
        Ok(parse_detail_page(&html, &self.site_url))
    }
}

#[async_trait::async_trait]
impl DetailEnricher for LetterboxdDetailEnricher {
    /// Fetches the film page and recovers its poster and synopsis
    ///
    /// Flow:
    /// 1. Fetch `detail_url` with the detail client (browser headers, referer)
    /// 2. Try each `PosterStrategy` in order, skipping placeholder images
    /// 3. Try each `OverviewStrategy` in order, skipping blank text
    ///
    /// A failed fetch yields the fallback poster and no overview. A page
    /// with no usable poster keeps whatever overview it had.
    async fn enrich(&self, detail_url: &str) -> PosterDetails {
        let page = match self.scrape(detail_url).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(url = %detail_url, error = %e, "Detail enrichment failed");
                return self.fallback();
            }
        };

        // Poster is mandatory in the response, overview is not
        let poster_url = page.poster_url.unwrap_or_else(|| {
            tracing::info!(url = %detail_url, "No poster found, using fallback image");
            self.fallback_poster_url.clone()
        });

        tracing::debug!(
            url = %detail_url,
            poster = %poster_url,
            has_overview = page.overview.is_some(),
            "Detail page enriched"
        );

        PosterDetails {
            poster_url,
            overview: page.overview,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::watchlist::fetcher::MockPageFetcher;

    const SITE: &str = "https://letterboxd.com";
    const FALLBACK: &str = "https://watchlistpicker.com/noimagefound.jpg";

    fn enricher_with(fetcher: MockPageFetcher) -> LetterboxdDetailEnricher {
        LetterboxdDetailEnricher::new(Arc::new(fetcher), SITE.to_string(), FALLBACK.to_string())
    }

    #[test]
    fn test_modal_link_wins_over_images() {
        let html = r#"
            <section class="poster-list">
              <a data-js-trigger="postermodal" href="//a.ltrbxd.com/resized/film-poster/heat-1000.jpg">Poster</a>
            </section>
            <div class="film-poster"><img src="https://a.ltrbxd.com/heat-image-150.jpg" /></div>
            <div class="film-text"><p>  A heist goes wrong.  </p><p>Second.</p></div>"#;

        let page = parse_detail_page(html, SITE);

        assert_eq!(
            page.poster_url.as_deref(),
            Some("https://a.ltrbxd.com/resized/film-poster/heat-1000.jpg")
        );
        assert_eq!(page.overview.as_deref(), Some("A heist goes wrong."));
    }

    #[test]
    fn test_falls_through_strategies_in_order() {
        let primary = r#"<div class="poster"><img src="/images/heat.jpg" /></div>"#;
        assert_eq!(
            parse_detail_page(primary, SITE).poster_url.as_deref(),
            Some("https://letterboxd.com/images/heat.jpg")
        );

        let sized = r#"<div><img src="https://a.ltrbxd.com/x/heat-0-230-0-345-image-230.jpg" /></div>"#;
        assert_eq!(
            parse_detail_page(sized, SITE).poster_url.as_deref(),
            Some("https://a.ltrbxd.com/x/heat-0-2000-0-3000-image-230.jpg")
        );

        let og = r#"<head><meta property="og:image" content="https://a.ltrbxd.com/og/heat.jpg" /></head>"#;
        assert_eq!(
            parse_detail_page(og, SITE).poster_url.as_deref(),
            Some("https://a.ltrbxd.com/og/heat.jpg")
        );
    }

    #[test]
    fn test_placeholder_is_skipped() {
        let html = r#"
            <div class="film-poster"><img src="https://s.ltrbxd.com/static/img/empty-poster-230.png" /></div>
            <div class="poster"><img src="https://a.ltrbxd.com/real.jpg" /></div>"#;

        let page = parse_detail_page(html, SITE);

        assert_eq!(page.poster_url.as_deref(), Some("https://a.ltrbxd.com/real.jpg"));
    }

    #[test]
    fn test_only_placeholder_yields_no_poster() {
        let html = r#"<div class="film-poster"><img src="https://s.ltrbxd.com/empty-poster-150.png" /></div>"#;
        assert_eq!(parse_detail_page(html, SITE).poster_url, None);
    }

    #[test]
    fn test_primary_poster_is_upscaled() {
        let html = r#"<div class="film-poster"><img src="https://a.ltrbxd.com/resized/film-poster/heat-0-230-0-345-crop.jpg?v=1" /></div>"#;
        assert_eq!(
            parse_detail_page(html, SITE).poster_url.as_deref(),
            Some("https://a.ltrbxd.com/resized/film-poster/heat-0-2000-0-3000-crop.jpg?v=1")
        );
    }

    #[test]
    fn test_upscale_poster() {
        assert_eq!(
            upscale_poster("https://a.ltrbxd.com/heat-0-125-0-187-crop.jpg"),
            "https://a.ltrbxd.com/heat-0-2000-0-3000-crop.jpg"
        );
        assert_eq!(
            upscale_poster("https://a.ltrbxd.com/heat-0-1000-0-1500.jpg"),
            "https://a.ltrbxd.com/heat-0-2000-0-3000.jpg"
        );
        // Already large, or no size segment at all
        assert_eq!(
            upscale_poster("https://a.ltrbxd.com/heat-0-2000-0-3000-crop.jpg"),
            "https://a.ltrbxd.com/heat-0-2000-0-3000-crop.jpg"
        );
        assert_eq!(
            upscale_poster("https://a.ltrbxd.com/film-2300-poster.jpg"),
            "https://a.ltrbxd.com/film-2300-poster.jpg"
        );
    }

    #[test]
    fn test_modal_and_og_posters_are_not_upscaled() {
        let og = r#"<meta property="og:image" content="https://a.ltrbxd.com/heat-0-230-0-345-crop.jpg" />"#;
        assert_eq!(
            parse_detail_page(og, SITE).poster_url.as_deref(),
            Some("https://a.ltrbxd.com/heat-0-230-0-345-crop.jpg")
        );
    }

    fn overview_of(html: &str) -> Option<String> {
        parse_detail_page(html, SITE).overview
    }

    #[test]
    fn test_overview_from_film_text() {
        let html = r#"<div class="film-text"><p>From film text.</p></div>
            <meta name="description" content="From meta." />"#;
        assert_eq!(overview_of(html).as_deref(), Some("From film text."));
    }

    #[test]
    fn test_overview_from_review_body() {
        let html = r#"<div class="review"><div class="body-text"><p>From review.</p></div></div>
            <div class="film-overview"><p>From overview.</p></div>"#;
        assert_eq!(overview_of(html).as_deref(), Some("From review."));
    }

    #[test]
    fn test_overview_from_film_overview_paragraph() {
        let html = r#"<div class="film-overview"><h3>Synopsis</h3><p>Go markup synopsis.</p></div>"#;
        assert_eq!(overview_of(html).as_deref(), Some("Go markup synopsis."));
    }

    #[test]
    fn test_overview_from_film_overview_block() {
        let html = r#"<div class="film-overview">  Bare block synopsis.  </div>"#;
        assert_eq!(overview_of(html).as_deref(), Some("Bare block synopsis."));
    }

    #[test]
    fn test_overview_from_test_id() {
        let html = r#"<section data-testid="film-overview">Tagged synopsis.</section>
            <meta name="description" content="From meta." />"#;
        assert_eq!(overview_of(html).as_deref(), Some("Tagged synopsis."));
    }

    #[test]
    fn test_overview_from_meta_description() {
        let html = r#"<html><head><meta name="description" content="Meta synopsis." /></head><body></body></html>"#;
        assert_eq!(overview_of(html).as_deref(), Some("Meta synopsis."));
    }

    #[test]
    fn test_blank_overview_falls_through() {
        let html = r#"<div class="film-text"><p>   </p></div>
            <div class="film-overview"><p> </p></div>
            <meta name="description" content="Meta synopsis." />"#;
        assert_eq!(overview_of(html).as_deref(), Some("Meta synopsis."));
    }

    #[test]
    fn test_absolutize() {
        assert_eq!(absolutize("//cdn.example/p.jpg", SITE), "https://cdn.example/p.jpg");
        assert_eq!(absolutize("/p.jpg", SITE), "https://letterboxd.com/p.jpg");
        assert_eq!(absolutize("https://x/p.jpg", SITE), "https://x/p.jpg");
    }

    #[tokio::test]
    async fn test_enrich_without_poster_uses_fallback_and_keeps_overview() {
        let mut fetcher = MockPageFetcher::new();
        fetcher
            .expect_fetch()
            .times(1)
            .returning(|_| Ok("<html><body><div class=\"film-text\"><p>   </p></div></body></html>".to_string()));

        let details = enricher_with(fetcher)
            .enrich("https://letterboxd.com/film/heat/")
            .await;

        assert_eq!(details.poster_url, FALLBACK);
        assert_eq!(details.overview, None);
    }

    #[tokio::test]
    async fn test_enrich_absorbs_fetch_errors() {
        let mut fetcher = MockPageFetcher::new();
        fetcher.expect_fetch().returning(|url| {
            Err(FetchError::Http {
                url: url.to_string(),
                status: 403,
            })
        });

        let details = enricher_with(fetcher)
            .enrich("https://letterboxd.com/film/heat/")
            .await;

        assert_eq!(details.poster_url, FALLBACK);
        assert!(details.overview.is_none());
    }

    #[tokio::test]
    async fn test_enrich_returns_scraped_values() {
        let mut fetcher = MockPageFetcher::new();
        fetcher
            .expect_fetch()
            .withf(|url| url == "https://letterboxd.com/film/alien/")
            .returning(|_| {
                Ok(r#"<div class="film-poster"><img src="https://a.ltrbxd.com/alien.jpg" /></div>
                      <div class="review"><div class="body-text"><p>In space.</p></div></div>"#
                    .to_string())
            });

        let details = enricher_with(fetcher)
            .enrich("https://letterboxd.com/film/alien/")
            .await;

        assert_eq!(details.poster_url, "https://a.ltrbxd.com/alien.jpg");
        assert_eq!(details.overview.as_deref(), Some("In space."));
    }
}
