//! Multi-page search loop for a single grid cell.

use std::collections::HashSet;

use tokio_util::sync::CancellationToken;
use varredor_core::{GridPoint, PlaceSummary};

use crate::error::SearchError;
use crate::pagination::{NextPage, PageGuard};
use crate::rate_limit::pause;

use super::PlacesClient;

/// Why a cell's pagination stopped before the service said it was done.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Truncation {
    /// Non-success HTTP response (429 included).
    HttpStatus(u16),
    /// Connection, TLS, or timeout failure.
    Transport(String),
    /// Response body did not decode.
    Decode(String),
    /// Page cap reached with a continuation token still pending.
    PageLimit(usize),
    /// The service repeated a continuation token.
    RepeatedToken,
    Cancelled,
}

impl From<&SearchError> for Truncation {
    fn from(err: &SearchError) -> Self {
        match err {
            SearchError::RateLimited { .. } => Self::HttpStatus(429),
            SearchError::UnexpectedStatus { status } => Self::HttpStatus(*status),
            SearchError::Deserialize { source, .. } => Self::Decode(source.to_string()),
            SearchError::Http(e) => Self::Transport(e.to_string()),
            SearchError::InvalidBaseUrl { reason, .. } => Self::Transport(reason.clone()),
            SearchError::LimiterClosed => Self::Transport(err.to_string()),
        }
    }
}

/// Outcome of searching one cell: every distinct place from the pages that
/// did arrive, plus why pagination stopped early, if it did.
#[derive(Debug, Default)]
pub struct CellSearch {
    pub places: Vec<PlaceSummary>,
    pub pages_fetched: usize,
    pub truncation: Option<Truncation>,
}

impl CellSearch {
    #[must_use]
    pub fn cancelled() -> Self {
        Self {
            truncation: Some(Truncation::Cancelled),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.truncation == Some(Truncation::Cancelled)
    }
}

impl PlacesClient {
    /// Searches one cell, following continuation tokens until the service
    /// stops issuing them.
    ///
    /// Pages are fetched strictly in order, with
    /// [`super::SearchOptions::page_token_delay`] between them. Places the
    /// service repeats across pages are kept once, first occurrence first.
    ///
    /// Never fails: an error response, an undecodable body, a repeated token,
    /// or the page cap ends pagination for this cell and the places gathered
    /// so far are returned with the reason in [`CellSearch::truncation`].
    /// `cancel` is checked before every page and interrupts the token delay.
    pub async fn search_cell(
        &self,
        point: GridPoint,
        radius_meters: u32,
        query: &str,
        cancel: &CancellationToken,
    ) -> CellSearch {
        let mut guard = PageGuard::new(self.options.max_pages);
        let mut seen_ids: HashSet<String> = HashSet::new();
        let mut places: Vec<PlaceSummary> = Vec::new();
        let mut page_token: Option<String> = None;

        let truncation = loop {
            if cancel.is_cancelled() {
                break Some(Truncation::Cancelled);
            }

            let page = match self
                .fetch_page(point, radius_meters, query, page_token.as_deref())
                .await
            {
                Ok(page) => page,
                Err(err) => {
                    tracing::warn!(
                        lat = point.lat,
                        lng = point.lng,
                        page = guard.pages_fetched() + 1,
                        error = %err,
                        "place search page failed; truncating cell"
                    );
                    break Some(Truncation::from(&err));
                }
            };

            for place in page.places {
                if seen_ids.insert(place.id.clone()) {
                    places.push(place);
                }
            }

            match guard.advance(page.next_page_token) {
                NextPage::Done => break None,
                NextPage::LimitReached => {
                    tracing::warn!(
                        lat = point.lat,
                        lng = point.lng,
                        max_pages = guard.max_pages(),
                        "page cap reached with a continuation token pending; truncating cell"
                    );
                    break Some(Truncation::PageLimit(guard.max_pages()));
                }
                NextPage::RepeatedToken => {
                    tracing::warn!(
                        lat = point.lat,
                        lng = point.lng,
                        pages = guard.pages_fetched(),
                        "place search repeated a continuation token; truncating cell"
                    );
                    break Some(Truncation::RepeatedToken);
                }
                NextPage::Fetch(token) => {
                    if !pause(self.options.page_token_delay, cancel).await {
                        break Some(Truncation::Cancelled);
                    }
                    page_token = Some(token);
                }
            }
        };

        tracing::debug!(
            lat = point.lat,
            lng = point.lng,
            pages = guard.pages_fetched(),
            place_count = places.len(),
            truncated = truncation.is_some(),
            "cell search finished"
        );

        CellSearch {
            places,
            pages_fetched: guard.pages_fetched(),
            truncation,
        }
    }
}
