//! Incremental search, pagination, and filter pipeline.
//!
//! [`SearchState`] owns the raw input text, the committed (debounced) query,
//! the active filters, and the accumulated result sequence. The functions
//! here implement the state machine around it:
//! - Raw input changes only stamp a timing marker; [`maybe_dispatch_search`]
//!   is polled from the event-loop tick and commits the query once the input
//!   has been quiet for [`DEBOUNCE`]. A keystroke inside the window simply
//!   moves the marker, which is the cancel-and-restart of the pending timer.
//! - Committing a query resets the page to 1 and clears results before the
//!   fetch is issued, so stale results never flash across unrelated queries.
//! - Every fetch carries a monotonically increasing id; a response whose id
//!   is not the latest issued one is discarded on arrival. That is the whole
//!   cancellation mechanism — requests are never aborted, only ignored.
//! - An empty committed query switches to the trending listing, which is a
//!   single page with load-more disabled.
//! - Filters are a view-side predicate over already-fetched results and
//!   never trigger network traffic.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;

use crate::state::{FetchOutcome, FetchRequest, FilterSet, MovieSummary};
use crate::storage::PersistentStore;

/// Default quiet period after the last keystroke before a query is committed.
pub const DEBOUNCE: Duration = Duration::from_millis(500);

/// State of the search/pagination pipeline.
#[derive(Debug)]
pub struct SearchState {
    /// Raw input text as typed, not yet committed.
    pub input: String,
    /// Committed query the current results belong to. Empty means trending.
    pub query: String,
    /// 1-based page of the last applied response.
    pub page: u32,
    /// Total pages available for `query`.
    pub total_pages: u32,
    /// Accumulated results, unique by id, first occurrence wins.
    pub results: Vec<MovieSummary>,
    /// Active client-side filters.
    pub filters: FilterSet,
    /// Whether a fetch for the latest id is outstanding.
    pub in_flight: bool,
    /// Retryable failure of the last fetch, if any.
    pub error: Option<String>,
    /// Timestamp of the last raw input edit, for debouncing.
    pub last_input_change: Instant,
    /// Quiet period before an edited input commits.
    pub debounce: Duration,
    /// Query text of the last commit, to avoid re-dispatching an unchanged
    /// input once the window has passed.
    dispatched_for: Option<String>,
    /// Page number of the most recently issued fetch, for retry.
    last_requested_page: u32,
    /// Identifier of the only fetch whose response will be accepted.
    latest_fetch_id: u64,
    /// Next fetch identifier to allocate.
    next_fetch_id: u64,
}

impl Default for SearchState {
    fn default() -> Self {
        Self {
            input: String::new(),
            query: String::new(),
            page: 1,
            total_pages: 1,
            results: Vec::new(),
            filters: FilterSet::default(),
            in_flight: false,
            error: None,
            last_input_change: Instant::now(),
            debounce: DEBOUNCE,
            dispatched_for: None,
            last_requested_page: 1,
            latest_fetch_id: 0,
            next_fetch_id: 1,
        }
    }
}

impl SearchState {
    /// Fresh state with a configured quiet period.
    pub fn with_debounce(debounce: Duration) -> Self {
        Self {
            debounce,
            ..Self::default()
        }
    }

    /// Whether the engine is showing the trending listing.
    pub fn is_trending(&self) -> bool {
        self.query.is_empty()
    }

    /// Whether a later page exists and could be loaded.
    pub fn has_more(&self) -> bool {
        !self.is_trending() && self.page < self.total_pages
    }

    fn allocate_fetch_id(&mut self) -> u64 {
        let id = self.next_fetch_id;
        self.next_fetch_id += 1;
        self.latest_fetch_id = id;
        id
    }
}

/// Record a raw input edit. Only stamps the debounce marker; no fetch
/// happens until the input has been quiet for [`DEBOUNCE`].
pub fn set_input(state: &mut SearchState, text: &str) {
    if state.input == text {
        return;
    }
    state.input = text.to_owned();
    state.last_input_change = Instant::now();
}

/// Commit the input as the active query once `state.debounce` has passed,
/// resetting pagination and issuing the fetch. Called from the event-loop
/// tick. A blank input commits the empty query, i.e. trending mode.
pub fn maybe_dispatch_search(
    state: &mut SearchState,
    fetch_tx: &mpsc::UnboundedSender<FetchRequest>,
) {
    if Instant::now().duration_since(state.last_input_change) < state.debounce {
        return;
    }
    let committed = state.input.trim().to_owned();
    if state.dispatched_for.as_deref() == Some(committed.as_str()) {
        return;
    }
    tracing::debug!(query = %committed, "committing query");
    state.query = committed.clone();
    state.dispatched_for = Some(committed);
    state.page = 1;
    state.total_pages = 1;
    state.results.clear();
    state.error = None;
    state.in_flight = true;
    state.last_requested_page = 1;
    let id = state.allocate_fetch_id();
    let _ = fetch_tx.send(FetchRequest {
        id,
        query: state.query.clone(),
        page: 1,
    });
}

/// Request the next page. No-op while trending, while a fetch is in
/// flight, or when the last page has been reached. The page counter only
/// advances when the response is applied, so a failed fetch leaves it
/// untouched.
pub fn load_more(state: &mut SearchState, fetch_tx: &mpsc::UnboundedSender<FetchRequest>) {
    if state.in_flight || !state.has_more() {
        return;
    }
    state.in_flight = true;
    state.error = None;
    state.last_requested_page = state.page + 1;
    let id = state.allocate_fetch_id();
    let _ = fetch_tx.send(FetchRequest {
        id,
        query: state.query.clone(),
        page: state.last_requested_page,
    });
}

/// Re-issue the last failed fetch. No-op unless the error flag is set.
pub fn retry(state: &mut SearchState, fetch_tx: &mpsc::UnboundedSender<FetchRequest>) {
    if state.error.is_none() {
        return;
    }
    state.error = None;
    state.in_flight = true;
    let id = state.allocate_fetch_id();
    let _ = fetch_tx.send(FetchRequest {
        id,
        query: state.query.clone(),
        page: state.last_requested_page,
    });
}

/// Apply a completed fetch.
///
/// A response whose id is not the latest issued one is stale — the user
/// moved on while it was in flight — and is discarded without touching any
/// state. Successful page-1 responses replace the sequence; later pages
/// append, deduplicated by id with the first occurrence keeping its
/// position. Successful non-trending page-1 responses also record the query
/// into recent-search history. A failure leaves results and page untouched
/// and sets the retryable error flag.
pub fn apply_outcome(state: &mut SearchState, outcome: FetchOutcome, store: &PersistentStore) {
    if outcome.id != state.latest_fetch_id {
        tracing::trace!(
            id = outcome.id,
            latest = state.latest_fetch_id,
            query = %outcome.query,
            "discarding stale fetch response"
        );
        return;
    }
    state.in_flight = false;
    match outcome.result {
        Ok(page) => {
            state.error = None;
            if page.page <= 1 {
                state.results = page.results;
                // Belt and braces: the provider should not repeat ids
                // within one page, but the uniqueness invariant is ours.
                let mut seen = HashSet::new();
                state.results.retain(|m| seen.insert(m.id));
            } else {
                let mut seen: HashSet<u64> = state.results.iter().map(|m| m.id).collect();
                for movie in page.results {
                    if seen.insert(movie.id) {
                        state.results.push(movie);
                    }
                }
            }
            state.page = page.page.max(1);
            state.total_pages = if state.is_trending() {
                1
            } else {
                page.total_pages.max(1)
            };
            if !state.is_trending() && state.page == 1 {
                crate::recent::save_recent_search(store, &state.query);
            }
            tracing::debug!(
                query = %state.query,
                page = state.page,
                total_pages = state.total_pages,
                results = state.results.len(),
                "applied fetch response"
            );
        }
        Err(e) => {
            tracing::warn!(query = %outcome.query, page = outcome.page, error = %e, "fetch failed");
            state.error = Some(e.to_string());
        }
    }
}

/// Replace the active filters. View-side only: held results are re-read
/// through the new predicate and no fetch is triggered.
pub fn set_filters(state: &mut SearchState, filters: FilterSet) {
    if state.filters != filters {
        tracing::debug!(?filters, "filters changed");
        state.filters = filters;
    }
}

/// The held results as seen through the active filters.
pub fn visible_results(state: &SearchState) -> Vec<&MovieSummary> {
    state
        .results
        .iter()
        .filter(|m| state.filters.matches(m))
        .collect()
}
