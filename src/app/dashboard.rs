// LogDash - app/dashboard.rs
//
// Dashboard driver: owns the `DashboardState`, runs remote calls on
// background threads and applies their completions on the owning thread.
//
// Architecture:
//   - `Dashboard` lives on the UI thread; each remote call runs on its own
//     short-lived background thread.
//   - Every background thread sends exactly one `Completion` over an mpsc
//     channel. The UI thread drains the channel with `poll` (non-blocking,
//     once per frame) or `settle` (blocking, for headless use and tests).
//   - Completions are applied one at a time on the owning thread, so state
//     is only ever mutated by a single writer and readers always see a fully
//     applied state.
//   - Superseded calls are not cancelled; their results are dropped by the
//     sequence checks in the cascade and search controller.

use crate::app::state::{DashboardState, Notice};
use crate::core::cascade::ScopeLookup;
use crate::core::model::{ResultPage, ScopeListing};
use crate::core::remote::{ScopeDirectory, SearchGateway};
use crate::core::search::SearchTicket;
use crate::util::constants::MAX_COMPLETIONS_PER_POLL;
use crate::util::error::ApiError;
use chrono::{DateTime, Local};
use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};

/// Result of one background call, sent back to the owning thread.
enum Completion {
    Scope {
        lookup: ScopeLookup,
        result: Result<ScopeListing, ApiError>,
    },
    Search {
        ticket: SearchTicket,
        result: Result<ResultPage, ApiError>,
    },
}

/// Source of "now" for derived time defaults.
pub type Clock = Box<dyn Fn() -> DateTime<Local>>;

/// One dashboard view: explicitly constructed, explicitly disposed.
pub struct Dashboard {
    state: DashboardState,
    directory: Arc<dyn ScopeDirectory>,
    gateway: Arc<dyn SearchGateway>,
    tx: mpsc::Sender<Completion>,
    rx: mpsc::Receiver<Completion>,
    /// Background calls whose completion has not been applied yet.
    in_flight: usize,
    clock: Clock,
}

impl Dashboard {
    pub fn new(
        directory: Arc<dyn ScopeDirectory>,
        gateway: Arc<dyn SearchGateway>,
        page_size: u32,
    ) -> Self {
        Self::with_clock(directory, gateway, page_size, Local::now)
    }

    /// Like `new`, with an explicit clock for time-derived defaults.
    pub fn with_clock(
        directory: Arc<dyn ScopeDirectory>,
        gateway: Arc<dyn SearchGateway>,
        page_size: u32,
        clock: impl Fn() -> DateTime<Local> + 'static,
    ) -> Self {
        let (tx, rx) = mpsc::channel();
        let state = DashboardState::new(clock(), page_size);
        tracing::debug!(page_size, "Dashboard created");
        Self {
            state,
            directory,
            gateway,
            tx,
            rx,
            in_flight: 0,
            clock: Box::new(clock),
        }
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    /// Remove and return all pending failure notices.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.state.take_notices()
    }

    /// Number of remote calls still outstanding.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    // -------------------------------------------------------------------------
    // Operations
    // -------------------------------------------------------------------------

    /// Fetch the top-level client list.
    pub fn init(&mut self) {
        let lookup = self.state.init();
        self.dispatch_lookup(lookup);
    }

    pub fn set_client(&mut self, client: impl Into<String>) {
        let lookup = self.state.set_client(client.into());
        self.dispatch_lookup(lookup);
    }

    pub fn set_database(&mut self, database: impl Into<String>) {
        let lookup = self.state.set_database(database.into());
        self.dispatch_lookup(lookup);
    }

    pub fn set_table(&mut self, table: impl Into<String>) {
        let now = (self.clock)();
        self.state.set_table(table.into(), now);
    }

    pub fn set_message(&mut self, value: Option<String>) {
        self.state.set_message(value);
    }

    pub fn set_user(&mut self, value: Option<String>) {
        self.state.set_user(value);
    }

    pub fn set_trace_no(&mut self, value: Option<String>) {
        self.state.set_trace_no(value);
    }

    pub fn set_level(&mut self, level: i32) {
        self.state.set_level(level);
    }

    pub fn set_flags(&mut self, flags: Option<u32>) {
        self.state.set_flags(flags);
    }

    pub fn set_date_range(&mut self, from: Option<DateTime<Local>>, to: Option<DateTime<Local>>) {
        self.state.set_date_range(from, to);
    }

    /// Start a search. Returns false (and does nothing) when the scope is
    /// incomplete.
    pub fn search(&mut self) -> bool {
        match self.state.search() {
            Some(ticket) => {
                self.dispatch_search(ticket);
                true
            }
            None => false,
        }
    }

    /// Move to page `index` and search.
    pub fn set_page_index(&mut self, index: u32) -> bool {
        match self.state.set_page_index(index) {
            Some(ticket) => {
                self.dispatch_search(ticket);
                true
            }
            None => false,
        }
    }

    /// Restore default filters and search.
    pub fn reset(&mut self) -> bool {
        let now = (self.clock)();
        match self.state.reset(now) {
            Some(ticket) => {
                self.dispatch_search(ticket);
                true
            }
            None => false,
        }
    }

    // -------------------------------------------------------------------------
    // Completion handling
    // -------------------------------------------------------------------------

    /// Apply completions that have already arrived without blocking.
    ///
    /// At most `MAX_COMPLETIONS_PER_POLL` are applied; the rest stay queued.
    /// Returns the number applied.
    pub fn poll(&mut self) -> usize {
        let mut applied = 0;
        while applied < MAX_COMPLETIONS_PER_POLL {
            match self.rx.try_recv() {
                Ok(completion) => {
                    self.apply(completion);
                    applied += 1;
                }
                Err(_) => break,
            }
        }
        applied
    }

    /// Block until one completion has been applied, or `timeout` elapses.
    pub fn wait_next(&mut self, timeout: Duration) -> bool {
        if self.in_flight == 0 {
            return false;
        }
        match self.rx.recv_timeout(timeout) {
            Ok(completion) => {
                self.apply(completion);
                true
            }
            Err(_) => false,
        }
    }

    /// Block until no remote call is outstanding, including calls started
    /// by cascades along the way. Returns false if `timeout` elapsed first.
    pub fn settle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.in_flight > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() || !self.wait_next(remaining) {
                tracing::warn!(in_flight = self.in_flight, "Dashboard did not settle in time");
                return false;
            }
        }
        true
    }

    /// Tear down the dashboard. Calls still running finish on their own and
    /// their results are dropped.
    pub fn dispose(self) {
        tracing::debug!(in_flight = self.in_flight, "Dashboard disposed");
    }

    fn apply(&mut self, completion: Completion) {
        self.in_flight = self.in_flight.saturating_sub(1);
        match completion {
            Completion::Scope { lookup, result } => {
                let now = (self.clock)();
                if let Some(next) = self.state.apply_scope(lookup, result, now) {
                    self.dispatch_lookup(next);
                }
            }
            Completion::Search { ticket, result } => {
                self.state.apply_search(ticket, result);
            }
        }
    }

    fn dispatch_lookup(&mut self, lookup: ScopeLookup) {
        self.in_flight += 1;
        let directory = Arc::clone(&self.directory);
        let tx = self.tx.clone();

        tracing::debug!(
            level = lookup.level.label(),
            seq = lookup.seq,
            client = %lookup.client,
            database = %lookup.database,
            "Scope lookup dispatched"
        );

        std::thread::spawn(move || {
            let result = directory.list_scope(&lookup.client, &lookup.database);
            // Receiver dropped means the dashboard was disposed; exit quietly.
            let _ = tx.send(Completion::Scope { lookup, result });
        });
    }

    fn dispatch_search(&mut self, ticket: SearchTicket) {
        self.in_flight += 1;
        let gateway = Arc::clone(&self.gateway);
        let tx = self.tx.clone();

        std::thread::spawn(move || {
            let result = gateway.query_logs(&ticket.query);
            let _ = tx.send(Completion::Search { ticket, result });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::filter::start_of_year;
    use crate::core::model::{LogEntry, LogQuery};
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::sync::Mutex;

    const WAIT: Duration = Duration::from_secs(5);

    type ScopeResponder = Box<dyn Fn(&ScopeKey) -> Result<ScopeListing, ApiError> + Send + Sync>;
    type PageResponder = Box<dyn Fn(&LogQuery) -> Result<ResultPage, ApiError> + Send + Sync>;

    struct ScopeKey {
        client: String,
        database: String,
    }

    /// Directory whose responses can be held back per client until released.
    struct FakeDirectory {
        respond: ScopeResponder,
        gates: Mutex<HashMap<String, mpsc::Receiver<()>>>,
    }

    impl FakeDirectory {
        fn new(respond: impl Fn(&ScopeKey) -> Result<ScopeListing, ApiError> + Send + Sync + 'static) -> Self {
            Self {
                respond: Box::new(respond),
                gates: Mutex::new(HashMap::new()),
            }
        }

        /// Hold the next lookup for `client` until the returned sender fires.
        fn hold(&self, client: &str) -> mpsc::Sender<()> {
            let (tx, rx) = mpsc::channel();
            self.gates.lock().unwrap().insert(client.to_string(), rx);
            tx
        }
    }

    impl ScopeDirectory for FakeDirectory {
        fn list_scope(&self, client: &str, database: &str) -> Result<ScopeListing, ApiError> {
            let gate = self.gates.lock().unwrap().remove(client);
            if let Some(rx) = gate {
                let _ = rx.recv();
            }
            (self.respond)(&ScopeKey {
                client: client.to_string(),
                database: database.to_string(),
            })
        }
    }

    /// Gateway whose responses can be held back per page until released.
    struct FakeGateway {
        respond: PageResponder,
        gates: Mutex<HashMap<u32, mpsc::Receiver<()>>>,
        seen: Mutex<Vec<LogQuery>>,
    }

    impl FakeGateway {
        fn new(respond: impl Fn(&LogQuery) -> Result<ResultPage, ApiError> + Send + Sync + 'static) -> Self {
            Self {
                respond: Box::new(respond),
                gates: Mutex::new(HashMap::new()),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn hold(&self, page_index: u32) -> mpsc::Sender<()> {
            let (tx, rx) = mpsc::channel();
            self.gates.lock().unwrap().insert(page_index, rx);
            tx
        }

        fn seen(&self) -> Vec<LogQuery> {
            self.seen.lock().unwrap().clone()
        }
    }

    impl SearchGateway for FakeGateway {
        fn query_logs(&self, query: &LogQuery) -> Result<ResultPage, ApiError> {
            self.seen.lock().unwrap().push(query.clone());
            let gate = self.gates.lock().unwrap().remove(&query.page_index);
            if let Some(rx) = gate {
                let _ = rx.recv();
            }
            (self.respond)(query)
        }
    }

    fn fixed_now() -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2024, 6, 15, 12, 0, 0)
            .earliest()
            .unwrap()
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn directory() -> FakeDirectory {
        FakeDirectory::new(|key| {
            let mut listing = ScopeListing {
                clients: strings(&["A", "B"]),
                ..Default::default()
            };
            match (key.client.as_str(), key.database.as_str()) {
                (_, "dbA") => listing.tables = strings(&["2023"]),
                (_, "dbB") => listing.tables = strings(&["2024", "prod"]),
                ("A", _) => listing.databases = strings(&["dbA"]),
                ("B", _) => listing.databases = strings(&["dbB"]),
                _ => {}
            }
            Ok(listing)
        })
    }

    /// Gateway returning `page_index` entries so pages are distinguishable.
    fn gateway() -> FakeGateway {
        FakeGateway::new(|q| {
            let entries = (0..q.page_index)
                .map(|i| LogEntry {
                    id: format!("p{}-{i}", q.page_index),
                    trace_no: String::new(),
                    user: String::new(),
                    message: String::new(),
                    error: String::new(),
                    stack_trace: String::new(),
                    level: 2,
                    created_on_utc: 0,
                })
                .collect();
            Ok(ResultPage {
                entries,
                total: 100,
            })
        })
    }

    fn dashboard(dir: &Arc<FakeDirectory>, gw: &Arc<FakeGateway>) -> Dashboard {
        let directory: Arc<dyn ScopeDirectory> = dir.clone();
        let gateway: Arc<dyn SearchGateway> = gw.clone();
        Dashboard::with_clock(directory, gateway, 25, fixed_now)
    }

    #[test]
    fn test_init_populates_clients_without_selecting() {
        let dir = Arc::new(directory());
        let gw = Arc::new(gateway());
        let mut dash = dashboard(&dir, &gw);
        dash.init();
        assert!(dash.settle(WAIT));
        assert_eq!(dash.state().options().clients, strings(&["A", "B"]));
        assert!(dash.state().scope().client.is_none());
    }

    #[test]
    fn test_client_selection_cascades_to_table() {
        let dir = Arc::new(directory());
        let gw = Arc::new(gateway());
        let mut dash = dashboard(&dir, &gw);
        dash.set_client("A");
        assert!(dash.settle(WAIT));

        let scope = dash.state().scope();
        assert_eq!(scope.database.as_deref(), Some("dbA"));
        assert_eq!(scope.table.as_deref(), Some("2023"));
        assert_eq!(
            dash.state().filters().criteria().from_time,
            start_of_year(2023)
        );
    }

    #[test]
    fn test_late_response_for_superseded_client_is_dropped() {
        let dir = Arc::new(directory());
        let gw = Arc::new(gateway());
        let mut dash = dashboard(&dir, &gw);

        let release_a = dir.hold("A");
        dash.set_client("A");
        dash.set_client("B");

        // Let B's cascade finish while A is still held.
        while dash.in_flight() > 1 {
            assert!(dash.wait_next(WAIT));
        }
        assert_eq!(dash.state().options().databases, strings(&["dbB"]));

        release_a.send(()).unwrap();
        assert!(dash.settle(WAIT));

        let state = dash.state();
        assert_eq!(state.options().databases, strings(&["dbB"]));
        assert_eq!(state.scope().database.as_deref(), Some("dbB"));
        assert_eq!(state.options().tables, strings(&["2024", "prod"]));
        assert_eq!(state.scope().table.as_deref(), Some("2024"));
    }

    #[test]
    fn test_late_response_for_superseded_search_is_dropped() {
        let dir = Arc::new(directory());
        let gw = Arc::new(gateway());
        let mut dash = dashboard(&dir, &gw);
        dash.set_client("A");
        assert!(dash.settle(WAIT));

        let release_first = gw.hold(1);
        assert!(dash.search());
        assert!(dash.set_page_index(2));

        while dash.in_flight() > 1 {
            assert!(dash.wait_next(WAIT));
        }
        assert_eq!(dash.state().data().len(), 2);
        assert!(!dash.state().loading());

        release_first.send(()).unwrap();
        assert!(dash.settle(WAIT));
        assert_eq!(dash.state().data().len(), 2);
        assert_eq!(dash.state().data()[0].id, "p2-0");
    }

    #[test]
    fn test_search_without_scope_never_calls_gateway() {
        let dir = Arc::new(directory());
        let gw = Arc::new(gateway());
        let mut dash = dashboard(&dir, &gw);
        assert!(!dash.search());
        assert!(!dash.set_page_index(2));
        assert!(!dash.reset());
        assert_eq!(dash.in_flight(), 0);
        assert!(gw.seen().is_empty());
        assert!(!dash.state().loading());
    }

    #[test]
    fn test_reset_triggers_search_with_defaults() {
        let dir = Arc::new(directory());
        let gw = Arc::new(gateway());
        let mut dash = dashboard(&dir, &gw);
        dash.set_client("A");
        assert!(dash.settle(WAIT));

        dash.set_message(Some("boom".to_string()));
        dash.set_level(4);
        assert!(dash.reset());
        assert!(dash.settle(WAIT));

        let seen = gw.seen();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].message.is_none());
        assert_eq!(seen[0].level, -1);
        assert_eq!(seen[0].db_name, "dbA");
    }

    #[test]
    fn test_lookup_failure_surfaces_notice() {
        let dir = Arc::new(FakeDirectory::new(|_| {
            Err(ApiError::Status {
                endpoint: "/listData",
                status: 502,
                body: String::new(),
            })
        }));
        let gw = Arc::new(gateway());
        let mut dash = dashboard(&dir, &gw);
        dash.init();
        assert!(dash.settle(WAIT));
        assert!(dash.state().options().clients.is_empty());
        assert_eq!(dash.take_notices().len(), 1);
    }

    #[test]
    fn test_poll_applies_arrived_completions() {
        let dir = Arc::new(directory());
        let gw = Arc::new(gateway());
        let mut dash = dashboard(&dir, &gw);
        dash.init();

        let deadline = Instant::now() + WAIT;
        while dash.in_flight() > 0 && Instant::now() < deadline {
            dash.poll();
            std::thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(dash.in_flight(), 0);
        assert_eq!(dash.state().options().clients.len(), 2);
    }

    #[test]
    fn test_dispose_with_call_in_flight() {
        let dir = Arc::new(directory());
        let gw = Arc::new(gateway());
        let mut dash = dashboard(&dir, &gw);
        let release = dir.hold("A");
        dash.set_client("A");
        dash.dispose();
        // The worker's send fails silently once released.
        release.send(()).unwrap();
    }
}
