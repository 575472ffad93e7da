//! Listing page markup → watchlist candidates.
//!
//! Pure parsing over one document; knows nothing about genres or page numbers.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::models::ListingCandidate;

static YEAR_IN_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/films/(\d{4})/").expect("valid year pattern"));

static CONTAINER: LazyLock<Selector> = LazyLock::new(|| selector(".poster-container, li.griditem"));
static POSTER: LazyLock<Selector> =
    LazyLock::new(|| selector(r#".film-poster, [data-component-class="LazyPoster"]"#));
static POSTER_IMG: LazyLock<Selector> = LazyLock::new(|| selector("img"));
static NEXT_PAGE: LazyLock<Selector> = LazyLock::new(|| selector(".pagination a.next"));

// Attribute fallbacks, older markup first.
const NAME_ATTRS: &[&str] = &["data-film-name", "data-item-name"];
const PATH_ATTRS: &[&str] = &["data-target-link", "data-item-link", "data-film-link"];
const ID_ATTRS: &[&str] = &["data-film-slug", "data-item-slug", "data-film-id"];

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector must parse")
}

/// Candidates found on one listing page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingPage {
    pub candidates: Vec<ListingCandidate>,
    /// Whether a pagination "next" control exists
    pub has_next_page: bool,
}

/// Parses one listing page
pub fn extract_listing(html: &str) -> ListingPage {
    let document = Html::parse_document(html);

    let candidates = document
        .select(&CONTAINER)
        .filter_map(parse_container)
        .collect();

    let has_next_page = document.select(&NEXT_PAGE).next().is_some();

    ListingPage {
        candidates,
        has_next_page,
    }
}

/// Extracts a candidate, or `None` when name, path, or id is missing
fn parse_container(container: ElementRef<'_>) -> Option<ListingCandidate> {
    let poster = container.select(&POSTER).next()?;

    let name = poster
        .select(&POSTER_IMG)
        .next()
        .and_then(|img| non_blank(img.value().attr("alt")))
        .or_else(|| first_attr(poster, NAME_ATTRS))?;
    let path = first_attr(poster, PATH_ATTRS)?;
    let id = first_attr(poster, ID_ATTRS)?;

    Some(ListingCandidate::new(name, path, id))
}

fn first_attr(element: ElementRef<'_>, names: &[&str]) -> Option<String> {
    names
        .iter()
        .find_map(|name| non_blank(element.value().attr(name)))
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Release year from a `/films/<yyyy>/` path segment
pub fn year_from_path(path: &str) -> Option<String> {
    YEAR_IN_PATH
        .captures(path)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poster_node(name: Option<&str>, link: Option<&str>, slug: Option<&str>) -> String {
        let link_attr = link
            .map(|l| format!(r#" data-target-link="{l}""#))
            .unwrap_or_default();
        let slug_attr = slug
            .map(|s| format!(r#" data-film-slug="{s}""#))
            .unwrap_or_default();
        let img = name
            .map(|n| format!(r#"<img src="/empty.png" alt="{n}" />"#))
            .unwrap_or_else(|| r#"<img src="/empty.png" />"#.to_string());
        format!(
            r#"<li class="poster-container"><div class="film-poster"{link_attr}{slug_attr}>{img}</div></li>"#
        )
    }

    fn listing_html(nodes: &[String], has_next: bool) -> String {
        let pagination = if has_next {
            r#"<div class="pagination"><a class="next" href="/alice/watchlist/page/2/">Older</a></div>"#
        } else {
            r#"<div class="pagination"><a class="previous" href="/alice/watchlist/">Newer</a></div>"#
        };
        format!(
            "<html><body><ul class=\"poster-list\">{}</ul>{}</body></html>",
            nodes.join(""),
            pagination
        )
    }

    #[test]
    fn test_extracts_valid_candidates() {
        let html = listing_html(
            &[
                poster_node(Some("Heat"), Some("/film/heat-1995/"), Some("heat-1995")),
                poster_node(Some("Alien"), Some("/films/1979/alien/"), Some("alien")),
            ],
            true,
        );

        let page = extract_listing(&html);

        assert_eq!(page.candidates.len(), 2);
        assert!(page.has_next_page);
        assert_eq!(page.candidates[0].display_name, "Heat");
        assert_eq!(page.candidates[0].detail_path, "/film/heat-1995/");
        assert_eq!(page.candidates[0].external_id, "heat-1995");
        assert_eq!(page.candidates[1].year.as_deref(), Some("1979"));
    }

    #[test]
    fn test_skips_nodes_missing_name_path_or_id() {
        let html = listing_html(
            &[
                poster_node(Some("Heat"), Some("/film/heat/"), Some("heat")),
                poster_node(None, Some("/film/no-name/"), Some("no-name")),
                poster_node(Some("Alien"), Some("/film/alien/"), Some("alien")),
                poster_node(Some("No Link"), None, Some("no-link")),
                poster_node(Some("No Slug"), Some("/film/no-slug/"), None),
                poster_node(Some("   "), Some("/film/blank/"), Some("blank")),
                poster_node(Some("Ran"), Some("/film/ran/"), Some("ran")),
            ],
            false,
        );

        let page = extract_listing(&html);
        let names: Vec<&str> = page
            .candidates
            .iter()
            .map(|c| c.display_name.as_str())
            .collect();

        assert_eq!(names, vec!["Heat", "Alien", "Ran"]);
    }

    #[test]
    fn test_has_next_page_requires_next_anchor() {
        let with_previous_only = listing_html(
            &[poster_node(Some("Heat"), Some("/film/heat/"), Some("heat"))],
            false,
        );
        assert!(!extract_listing(&with_previous_only).has_next_page);

        let no_pagination = "<html><body></body></html>";
        assert!(!extract_listing(no_pagination).has_next_page);
    }

    #[test]
    fn test_empty_page_yields_no_candidates() {
        let page = extract_listing("<html><body><p>Nothing here</p></body></html>");
        assert!(page.candidates.is_empty());
    }

    #[test]
    fn test_extracts_lazy_poster_markup() {
        let html = r#"
            <ul class="grid">
              <li class="griditem">
                <div class="react-component" data-component-class="LazyPoster"
                     data-item-name="Paris, Texas (1984)"
                     data-item-slug="paris-texas"
                     data-item-link="/film/paris-texas/">
                  <div class="poster film-poster"></div>
                </div>
              </li>
            </ul>"#;

        let page = extract_listing(html);

        assert_eq!(page.candidates.len(), 1);
        let candidate = &page.candidates[0];
        assert_eq!(candidate.display_name, "Paris, Texas (1984)");
        assert_eq!(candidate.detail_path, "/film/paris-texas/");
        assert_eq!(candidate.external_id, "paris-texas");
    }

    #[test]
    fn test_year_from_path() {
        assert_eq!(year_from_path("/username/watchlist/film/the-matrix-1999/"), None);
        assert_eq!(
            year_from_path("/films/1999/the-matrix/").as_deref(),
            Some("1999")
        );
        assert_eq!(year_from_path("/films/99/short/"), None);
    }
}
