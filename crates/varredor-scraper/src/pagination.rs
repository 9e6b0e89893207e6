//! Continuation-token bookkeeping for one cell's paginated search.
//!
//! The search service returns an opaque `nextPageToken` while more results
//! exist. A misbehaving service can hand back a token it already issued, or
//! an endless chain of fresh ones; [`PageGuard`] stops both, the first by
//! remembering every token seen and the second with a hard page cap.

use std::collections::HashSet;

/// What the cell loop should do after a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextPage {
    /// Fetch another page with this token.
    Fetch(String),
    /// No continuation token; the cell is complete.
    Done,
    /// The page cap was hit with a token still pending.
    LimitReached,
    /// The service returned a token it had already issued for this cell.
    RepeatedToken,
}

#[derive(Debug)]
pub struct PageGuard {
    max_pages: usize,
    pages_fetched: usize,
    seen_tokens: HashSet<String>,
}

impl PageGuard {
    #[must_use]
    pub fn new(max_pages: usize) -> Self {
        Self {
            max_pages: max_pages.max(1),
            pages_fetched: 0,
            seen_tokens: HashSet::new(),
        }
    }

    #[must_use]
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    #[must_use]
    pub fn max_pages(&self) -> usize {
        self.max_pages
    }

    /// Record a fetched page and decide whether to follow `token`.
    pub fn advance(&mut self, token: Option<String>) -> NextPage {
        self.pages_fetched += 1;

        let Some(token) = token.filter(|t| !t.is_empty()) else {
            return NextPage::Done;
        };
        if self.pages_fetched >= self.max_pages {
            return NextPage::LimitReached;
        }
        if !self.seen_tokens.insert(token.clone()) {
            return NextPage::RepeatedToken;
        }
        NextPage::Fetch(token)
    }
}
