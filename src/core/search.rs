// LogDash - core/search.rs
//
// Search result ownership and the stale-result guard.
//
// `begin` tags a query snapshot with a fresh sequence number and raises the
// loading flag; `complete` commits a response only if no newer search has
// been issued since. Results replace the previous page wholesale.
// Core layer: no I/O.

use crate::core::model::{LogEntry, LogQuery, ResultPage};
use crate::core::sequence::SequenceGate;
use crate::util::error::ApiError;

/// A dispatched search: the immutable query plus its sequence number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    pub seq: u64,
    pub query: LogQuery,
}

/// Outcome of feeding a gateway response back into the controller.
#[derive(Debug)]
pub enum SearchCompletion {
    /// The page was committed to `data`/`total`.
    Committed,
    /// A newer search was issued; the response was dropped.
    Stale,
    /// The latest search failed; previous results are still displayed.
    Failed(ApiError),
}

/// Owns the displayed result page and the loading flag.
#[derive(Debug, Default)]
pub struct SearchController {
    gate: SequenceGate,
    loading: bool,
    data: Vec<LogEntry>,
    total: u64,
    last_query: Option<LogQuery>,
}

impl SearchController {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while the most recently issued search is outstanding.
    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn data(&self) -> &[LogEntry] {
        &self.data
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Query that produced the page currently held in `data`.
    pub fn last_query(&self) -> Option<&LogQuery> {
        self.last_query.as_ref()
    }

    /// Register a new search for `query`. Any search still in flight becomes
    /// stale.
    pub fn begin(&mut self, query: LogQuery) -> SearchTicket {
        self.loading = true;
        SearchTicket {
            seq: self.gate.issue(),
            query,
        }
    }

    /// Feed back the gateway result for `ticket`.
    pub fn complete(
        &mut self,
        ticket: SearchTicket,
        result: Result<ResultPage, ApiError>,
    ) -> SearchCompletion {
        if !self.gate.is_latest(ticket.seq) {
            return SearchCompletion::Stale;
        }

        self.loading = false;
        match result {
            Ok(page) => {
                self.data = page.entries;
                self.total = page.total;
                self.last_query = Some(ticket.query);
                SearchCompletion::Committed
            }
            Err(e) => SearchCompletion::Failed(e),
        }
    }
}
