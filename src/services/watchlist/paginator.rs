use crate::{error::FetchError, models::ListingCandidate};

use super::{extractor::extract_listing, fetcher::PageFetcher};

/// Caps applied while walking listing pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationLimits {
    pub max_pages: u32,
    pub max_records: usize,
}

impl Default for PaginationLimits {
    fn default() -> Self {
        Self {
            max_pages: 10,
            max_records: 250,
        }
    }
}

/// Why collection stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    FetchError(FetchError),
    EmptyPage,
    RecordCap,
    NoNextLink,
    PageCap,
}

/// Outcome of a single fetch + extract step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageStep {
    Continue,
    Stop(StopReason),
}

/// Mutable walk state, owned by one `collect` call
#[derive(Debug)]
struct PaginationState {
    page: u32,
    collected: Vec<ListingCandidate>,
    has_more_pages: bool,
    pages_fetched: u32,
}

/// Candidates gathered across pages plus the reason the walk ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    pub candidates: Vec<ListingCandidate>,
    pub stop_reason: StopReason,
    pub pages_fetched: u32,
}

impl Pagination {
    /// The fetch error that ended the walk, if any
    pub fn fetch_error(&self) -> Option<&FetchError> {
        match &self.stop_reason {
            StopReason::FetchError(err) => Some(err),
            _ => None,
        }
    }
}

/// Walks a watchlist page by page, strictly in sequence
pub struct WatchlistPaginator<'a> {
    fetcher: &'a dyn PageFetcher,
    limits: PaginationLimits,
}

impl<'a> WatchlistPaginator<'a> {
    pub fn new(fetcher: &'a dyn PageFetcher, limits: PaginationLimits) -> Self {
        Self { fetcher, limits }
    }

    /// Collects candidates starting from `base_url`
    ///
    /// Never fails: a fetch error ends the walk and is reported in
    /// `stop_reason`, with whatever was gathered before it.
    pub async fn collect(&self, base_url: &str) -> Pagination {
        let mut state = PaginationState {
            page: 1,
            collected: Vec::new(),
            has_more_pages: true,
            pages_fetched: 0,
        };

        let stop_reason = loop {
            match self.step(&mut state, base_url).await {
                PageStep::Continue => continue,
                PageStep::Stop(reason) => break reason,
            }
        };

        if let StopReason::FetchError(err) = &stop_reason {
            tracing::warn!(
                page = state.page,
                collected = state.collected.len(),
                error = %err,
                "Watchlist page fetch failed, keeping collected films"
            );
        }

        tracing::info!(
            base_url = %base_url,
            pages = state.pages_fetched,
            collected = state.collected.len(),
            more_pages = state.has_more_pages,
            stop_reason = ?stop_reason,
            "Watchlist pagination finished"
        );

        Pagination {
            candidates: state.collected,
            stop_reason,
            pages_fetched: state.pages_fetched,
        }
    }

    /// Fetches and extracts one page, then decides whether to go on
    ///
    /// FETCHING(page) → EXTRACTING(page) → CONTINUE | STOP
    ///
    /// Checks run in a fixed order:
    /// 1. Page cap, before any request is made
    /// 2. Fetch; an error stops the walk and keeps earlier pages
    /// 3. Empty page, even if a next link is present
    /// 4. Record cap, after taking only as many records as still fit
    /// 5. Missing next link
    ///
    /// Only a `Continue` advances `state.page`.
    async fn step(&self, state: &mut PaginationState, base_url: &str) -> PageStep {
        if state.page > self.limits.max_pages {
            return PageStep::Stop(StopReason::PageCap);
        }

        // Count the attempt even if the request fails
        let url = page_url(base_url, state.page);
        state.pages_fetched += 1;
        let html = match self.fetcher.fetch(&url).await {
            Ok(html) => html,
            Err(err) => return PageStep::Stop(StopReason::FetchError(err)),
        };

        let listing = extract_listing(&html);
        state.has_more_pages = listing.has_next_page;

        tracing::debug!(
            page = state.page,
            found = listing.candidates.len(),
            has_next = listing.has_next_page,
            "Extracted watchlist page"
        );

        if listing.candidates.is_empty() {
            return PageStep::Stop(StopReason::EmptyPage);
        }

        // Record cap may cut a page short
        let room = self.limits.max_records.saturating_sub(state.collected.len());
        state
            .collected
            .extend(listing.candidates.into_iter().take(room));

        if state.collected.len() >= self.limits.max_records {
            return PageStep::Stop(StopReason::RecordCap);
        }

        if !listing.has_next_page {
            return PageStep::Stop(StopReason::NoNextLink);
        }

        state.page += 1;
        PageStep::Continue
    }
}

/// Page 1 is the bare base URL; later pages append `/page/N/`
pub fn page_url(base_url: &str, page: u32) -> String {
    if page <= 1 {
        base_url.to_string()
    } else {
        format!("{}/page/{}/", base_url.trim_end_matches('/'), page)
    }
}
