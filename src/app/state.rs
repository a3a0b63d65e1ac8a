// LogDash - app/state.rs
//
// Dashboard state: the cascade, the filters and the search results composed
// into one single-owner state machine.
//
// Every operation that needs a remote call returns the request to dispatch
// (a `ScopeLookup` or `SearchTicket`); completions are fed back through
// `apply_scope` / `apply_search`. No I/O happens here, so the whole cascade
// can be driven deterministically in tests.

use crate::core::cascade::{CascadeEngine, CascadeStep, ScopeLevel, ScopeLookup};
use crate::core::filter::FilterState;
use crate::core::model::{
    LogEntry, LogQuery, ResultPage, ScopeListing, ScopeOptions, ScopeSelection,
};
use crate::core::search::{SearchCompletion, SearchController, SearchTicket};
use crate::util::constants::MAX_NOTICES;
use crate::util::error::{ApiError, FailureKind};
use chrono::{DateTime, Local};
use std::collections::VecDeque;

/// Which operation a notice reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// A list-metadata lookup for the given level failed.
    ScopeLookupFailed(ScopeLevel),
    /// The latest search failed.
    SearchFailed,
}

/// A non-fatal failure report for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub failure: FailureKind,
    pub message: String,
}

/// Top-level view-model state for one dashboard.
#[derive(Debug)]
pub struct DashboardState {
    cascade: CascadeEngine,
    filters: FilterState,
    search: SearchController,

    /// Failures not yet shown to the user, oldest first.
    notices: VecDeque<Notice>,

    /// Status message for the status bar.
    status_message: String,
}

impl DashboardState {
    pub fn new(now: DateTime<Local>, page_size: u32) -> Self {
        Self {
            cascade: CascadeEngine::new(),
            filters: FilterState::new(now, page_size),
            search: SearchController::new(),
            notices: VecDeque::new(),
            status_message: "Ready. Select a client to begin.".to_string(),
        }
    }

    // -------------------------------------------------------------------------
    // Read access for the presentation layer
    // -------------------------------------------------------------------------

    pub fn scope(&self) -> &ScopeSelection {
        self.cascade.selection()
    }

    pub fn options(&self) -> &ScopeOptions {
        self.cascade.options()
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn loading(&self) -> bool {
        self.search.loading()
    }

    pub fn data(&self) -> &[LogEntry] {
        self.search.data()
    }

    pub fn total(&self) -> u64 {
        self.search.total()
    }

    pub fn last_query(&self) -> Option<&LogQuery> {
        self.search.last_query()
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    pub fn notices(&self) -> impl Iterator<Item = &Notice> {
        self.notices.iter()
    }

    /// Remove and return all pending notices.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }

    // -------------------------------------------------------------------------
    // Scope cascade
    // -------------------------------------------------------------------------

    /// Lookup that populates the client list.
    pub fn init(&mut self) -> ScopeLookup {
        self.cascade.init()
    }

    pub fn set_client(&mut self, client: String) -> ScopeLookup {
        tracing::info!(client = %client, "Client selected");
        self.cascade.set_client(client)
    }

    pub fn set_database(&mut self, database: String) -> ScopeLookup {
        tracing::info!(database = %database, "Database selected");
        self.cascade.set_database(database)
    }

    /// Select a table and re-derive the default time window from it.
    pub fn set_table(&mut self, table: String, now: DateTime<Local>) {
        tracing::info!(table = %table, "Table selected");
        if self.filters.apply_table_year(&table, now) {
            tracing::debug!(
                from = ?self.filters.criteria().from_time,
                "Time window derived from table year"
            );
        }
        self.cascade.set_table(table);
    }

    /// Feed back a completed scope lookup.
    ///
    /// Returns the follow-up lookup when the result auto-selected a database.
    /// Failures leave selection and options as they were and raise a notice.
    pub fn apply_scope(
        &mut self,
        lookup: ScopeLookup,
        result: Result<ScopeListing, ApiError>,
        now: DateTime<Local>,
    ) -> Option<ScopeLookup> {
        let listing = match result {
            Ok(listing) => listing,
            Err(e) => {
                if self.cascade.is_current(&lookup) {
                    tracing::warn!(level = lookup.level.label(), error = %e, "Scope lookup failed");
                    self.push_notice(NoticeKind::ScopeLookupFailed(lookup.level), &e);
                    self.status_message = format!("Could not load {}: {e}", lookup.level.label());
                } else {
                    tracing::debug!(level = lookup.level.label(), error = %e, "Superseded scope lookup failed");
                }
                return None;
            }
        };

        match self.cascade.apply(&lookup, listing) {
            CascadeStep::Stale => {
                tracing::debug!(
                    level = lookup.level.label(),
                    seq = lookup.seq,
                    "Discarded superseded scope lookup"
                );
                None
            }
            CascadeStep::Settled => None,
            CascadeStep::SelectDatabase(database) => Some(self.set_database(database)),
            CascadeStep::SelectTable(table) => {
                self.set_table(table, now);
                None
            }
        }
    }

    // -------------------------------------------------------------------------
    // Filters
    // -------------------------------------------------------------------------

    pub fn set_message(&mut self, value: Option<String>) {
        self.filters.set_message(value);
    }

    pub fn set_user(&mut self, value: Option<String>) {
        self.filters.set_user(value);
    }

    pub fn set_trace_no(&mut self, value: Option<String>) {
        self.filters.set_trace_no(value);
    }

    pub fn set_level(&mut self, level: i32) {
        self.filters.set_level(level);
    }

    pub fn set_flags(&mut self, flags: Option<u32>) {
        self.filters.set_flags(flags);
    }

    pub fn set_date_range(&mut self, from: Option<DateTime<Local>>, to: Option<DateTime<Local>>) {
        self.filters.set_date_range(from, to);
    }

    /// Restore default filters (scope untouched), then search.
    pub fn reset(&mut self, now: DateTime<Local>) -> Option<SearchTicket> {
        self.filters.reset(now);
        tracing::debug!("Filters reset");
        self.search()
    }

    // -------------------------------------------------------------------------
    // Search
    // -------------------------------------------------------------------------

    /// Snapshot the current state into a search.
    ///
    /// Returns `None`, changing nothing, unless database and table are set.
    pub fn search(&mut self) -> Option<SearchTicket> {
        let Some(query) = self.filters.snapshot(self.cascade.selection()) else {
            tracing::debug!("Search ignored: database and table are required");
            return None;
        };
        let ticket = self.search.begin(query);
        tracing::info!(
            seq = ticket.seq,
            db = %ticket.query.db_name,
            table = %ticket.query.table_name,
            page = ticket.query.page_index,
            "Search started"
        );
        self.status_message = "Searching...".to_string();
        Some(ticket)
    }

    /// Move to page `index` and search.
    pub fn set_page_index(&mut self, index: u32) -> Option<SearchTicket> {
        self.filters.set_page_index(index);
        self.search()
    }

    /// Feed back a completed search.
    pub fn apply_search(&mut self, ticket: SearchTicket, result: Result<ResultPage, ApiError>) {
        let seq = ticket.seq;
        match self.search.complete(ticket, result) {
            SearchCompletion::Committed => {
                tracing::info!(
                    seq,
                    entries = self.search.data().len(),
                    total = self.search.total(),
                    "Search committed"
                );
                self.status_message = format!(
                    "Showing {} of {} entries.",
                    self.search.data().len(),
                    self.search.total()
                );
            }
            SearchCompletion::Stale => {
                tracing::debug!(seq, "Discarded superseded search result");
            }
            SearchCompletion::Failed(e) => {
                tracing::warn!(seq, error = %e, "Search failed");
                self.push_notice(NoticeKind::SearchFailed, &e);
                self.status_message = format!("Search failed: {e}");
            }
        }
    }

    fn push_notice(&mut self, kind: NoticeKind, error: &ApiError) {
        if self.notices.len() >= MAX_NOTICES {
            self.notices.pop_front();
        }
        self.notices.push_back(Notice {
            kind,
            failure: error.kind(),
            message: error.to_string(),
        });
    }
}
