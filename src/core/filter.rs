// LogDash - core/filter.rs
//
// Filter criteria, pagination cursor and the derived time-range defaults.
// Produces the immutable query snapshot sent to the log-query endpoint.
// Core layer: pure logic, the caller supplies "now".

use crate::core::model::{LogQuery, ScopeSelection};
use crate::util::constants::{DEFAULT_LOOKBACK_MONTHS, FIRST_PAGE_INDEX, LEVEL_ALL};
use chrono::{DateTime, Datelike, Local, Months, SecondsFormat, TimeZone};

/// Non-scope filter fields. All active fields are AND-combined by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    /// Message substring. None = no constraint.
    pub message: Option<String>,

    pub user: Option<String>,

    pub trace_no: Option<String>,

    /// Severity ordinal 0-5, or `LEVEL_ALL`. Passed through unvalidated.
    pub level: i32,

    /// Opaque bitmask forwarded to the server as-is.
    pub flags: Option<u32>,

    /// Start of time range (inclusive). None = no lower bound.
    pub from_time: Option<DateTime<Local>>,

    /// End of time range (inclusive). None = no upper bound.
    pub to_time: Option<DateTime<Local>>,
}

impl FilterCriteria {
    /// Criteria in their initial state: last month, all levels, nothing else.
    pub fn with_defaults(now: DateTime<Local>) -> Self {
        Self {
            message: None,
            user: None,
            trace_no: None,
            level: LEVEL_ALL,
            flags: None,
            from_time: Some(default_from_time(now)),
            to_time: None,
        }
    }
}

/// 1-based page cursor with a fixed page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page_index: u32,
    pub page_size: u32,
}

/// Mutable filter state owned by the dashboard.
#[derive(Debug, Clone)]
pub struct FilterState {
    criteria: FilterCriteria,
    page: PageRequest,
}

impl FilterState {
    pub fn new(now: DateTime<Local>, page_size: u32) -> Self {
        Self {
            criteria: FilterCriteria::with_defaults(now),
            page: PageRequest {
                page_index: FIRST_PAGE_INDEX,
                page_size: page_size.max(1),
            },
        }
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn page(&self) -> PageRequest {
        self.page
    }

    pub fn set_message(&mut self, value: Option<String>) {
        self.criteria.message = non_empty(value);
    }

    pub fn set_user(&mut self, value: Option<String>) {
        self.criteria.user = non_empty(value);
    }

    pub fn set_trace_no(&mut self, value: Option<String>) {
        self.criteria.trace_no = non_empty(value);
    }

    pub fn set_level(&mut self, level: i32) {
        self.criteria.level = level;
    }

    pub fn set_flags(&mut self, flags: Option<u32>) {
        self.criteria.flags = flags;
    }

    /// Set both bounds at once; either side may be open.
    pub fn set_date_range(&mut self, from: Option<DateTime<Local>>, to: Option<DateTime<Local>>) {
        self.criteria.from_time = from;
        self.criteria.to_time = to;
    }

    /// Current `(from, to)` pair for the date-range picker.
    pub fn date_range(&self) -> (Option<DateTime<Local>>, Option<DateTime<Local>>) {
        (self.criteria.from_time, self.criteria.to_time)
    }

    /// Page 0 is treated as the first page.
    pub fn set_page_index(&mut self, index: u32) {
        self.page.page_index = index.max(FIRST_PAGE_INDEX);
    }

    /// Restore every criterion to its default. Scope and page are untouched.
    pub fn reset(&mut self, now: DateTime<Local>) {
        self.criteria = FilterCriteria::with_defaults(now);
    }

    /// Re-derive `from_time` from a table name that encodes a year.
    ///
    /// Returns true if `from_time` changed. Non-numeric table names leave the
    /// time range untouched.
    pub fn apply_table_year(&mut self, table: &str, now: DateTime<Local>) -> bool {
        match year_default_from_time(table, now) {
            Some(from) => {
                self.criteria.from_time = Some(from);
                true
            }
            None => false,
        }
    }

    /// Build the query snapshot for `scope`.
    ///
    /// Returns `None` unless both database and table are selected.
    pub fn snapshot(&self, scope: &ScopeSelection) -> Option<LogQuery> {
        let db_name = scope.database.clone()?;
        let table_name = scope.table.clone()?;
        let c = &self.criteria;

        Some(LogQuery {
            page_size: self.page.page_size,
            page_index: self.page.page_index,
            db_name,
            table_name,
            client: scope.client.clone(),
            user: c.user.clone(),
            trace_no: c.trace_no.clone(),
            message: c.message.clone(),
            start_time: c.from_time.as_ref().map(format_timestamp),
            end_time: c.to_time.as_ref().map(format_timestamp),
            level: c.level,
            flags: c.flags,
        })
    }
}

/// The "recent activity" window start: one month before `now`.
pub fn default_from_time(now: DateTime<Local>) -> DateTime<Local> {
    now.checked_sub_months(Months::new(DEFAULT_LOOKBACK_MONTHS))
        .unwrap_or(now)
}

/// Local midnight on January 1st of `year`, if representable.
pub fn start_of_year(year: i32) -> Option<DateTime<Local>> {
    Local.with_ymd_and_hms(year, 1, 1, 0, 0, 0).earliest()
}

/// Default `from_time` implied by a table name.
///
/// A past or future year yields the start of that year, the current year
/// yields the recent-activity window, and anything else yields `None`.
pub fn year_default_from_time(table: &str, now: DateTime<Local>) -> Option<DateTime<Local>> {
    let year: i32 = table.parse().ok()?;
    if year == now.year() {
        Some(default_from_time(now))
    } else {
        start_of_year(year)
    }
}

/// ISO-8601 with the local UTC offset and whole seconds.
pub fn format_timestamp(t: &DateTime<Local>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, false)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn at(year: i32, month: u32, day: u32) -> DateTime<Local> {
        Local
            .with_ymd_and_hms(year, month, day, 12, 0, 0)
            .earliest()
            .unwrap()
    }

    fn full_scope() -> ScopeSelection {
        ScopeSelection {
            client: Some("svcA".to_string()),
            database: Some("db1".to_string()),
            table: Some("2023".to_string()),
        }
    }

    #[test]
    fn test_defaults() {
        let now = at(2024, 6, 15);
        let state = FilterState::new(now, 25);
        let c = state.criteria();
        assert_eq!(c.level, LEVEL_ALL);
        assert_eq!(c.from_time, Some(at(2024, 5, 15)));
        assert!(c.to_time.is_none());
        assert!(c.message.is_none() && c.user.is_none() && c.trace_no.is_none());
        assert!(c.flags.is_none());
        assert_eq!(
            state.page(),
            PageRequest {
                page_index: 1,
                page_size: 25
            }
        );
    }

    #[test]
    fn test_past_year_table_sets_start_of_year() {
        let now = at(2024, 6, 15);
        let mut state = FilterState::new(now, 25);
        assert!(state.apply_table_year("2022", now));
        let from = state.criteria().from_time.unwrap();
        assert_eq!(from, start_of_year(2022).unwrap());
        assert_eq!((from.year(), from.month(), from.day()), (2022, 1, 1));
        assert_eq!(from.format("%H:%M:%S").to_string(), "00:00:00");
    }

    #[test]
    fn test_current_year_table_sets_recent_window() {
        let now = at(2024, 6, 15);
        let mut state = FilterState::new(now, 25);
        state.set_date_range(start_of_year(2001), None);
        assert!(state.apply_table_year("2024", now));
        assert_eq!(state.criteria().from_time, Some(at(2024, 5, 15)));
    }

    #[test]
    fn test_non_numeric_table_leaves_range_untouched() {
        let now = at(2024, 6, 15);
        let mut state = FilterState::new(now, 25);
        let custom = start_of_year(2010);
        state.set_date_range(custom, Some(now));
        assert!(!state.apply_table_year("prod", now));
        assert_eq!(state.date_range(), (custom, Some(now)));
    }

    #[test]
    fn test_empty_text_is_absent() {
        let mut state = FilterState::new(at(2024, 6, 15), 25);
        state.set_message(Some("timeout".to_string()));
        assert_eq!(state.criteria().message.as_deref(), Some("timeout"));
        state.set_message(Some(String::new()));
        assert!(state.criteria().message.is_none());
    }

    #[test]
    fn test_out_of_range_level_passes_through() {
        let mut state = FilterState::new(at(2024, 6, 15), 25);
        state.set_level(9);
        let query = state.snapshot(&full_scope()).unwrap();
        assert_eq!(query.level, 9);
    }

    #[test]
    fn test_reset_restores_defaults_but_not_page() {
        let now = at(2024, 6, 15);
        let mut state = FilterState::new(now, 25);
        state.set_message(Some("m".to_string()));
        state.set_user(Some("u".to_string()));
        state.set_trace_no(Some("t".to_string()));
        state.set_flags(Some(3));
        state.set_level(4);
        state.set_date_range(None, Some(now));
        state.set_page_index(4);

        let later = at(2024, 7, 1);
        state.reset(later);
        assert_eq!(state.criteria(), &FilterCriteria::with_defaults(later));
        assert_eq!(state.page().page_index, 4);
    }

    #[test]
    fn test_snapshot_requires_database_and_table() {
        let state = FilterState::new(at(2024, 6, 15), 25);
        let mut scope = full_scope();
        scope.table = None;
        assert!(state.snapshot(&scope).is_none());
        scope.table = Some("2023".to_string());
        scope.database = None;
        assert!(state.snapshot(&scope).is_none());
    }

    #[test]
    fn test_snapshot_copies_all_fields() {
        let now = at(2024, 6, 15);
        let mut state = FilterState::new(now, 50);
        state.set_user(Some("alice".to_string()));
        state.set_flags(Some(1));
        state.set_page_index(3);
        state.set_date_range(start_of_year(2023), Some(now));

        let query = state.snapshot(&full_scope()).unwrap();
        assert_eq!(query.page_index, 3);
        assert_eq!(query.page_size, 50);
        assert_eq!(query.db_name, "db1");
        assert_eq!(query.table_name, "2023");
        assert_eq!(query.client.as_deref(), Some("svcA"));
        assert_eq!(query.user.as_deref(), Some("alice"));
        assert_eq!(query.flags, Some(1));
        assert_eq!(
            query.start_time,
            Some(format_timestamp(&start_of_year(2023).unwrap()))
        );
        assert!(query
            .start_time
            .as_deref()
            .unwrap()
            .starts_with("2023-01-01T00:00:00"));
        assert_eq!(query.end_time, Some(format_timestamp(&now)));
    }

    #[test]
    fn test_page_zero_is_first_page() {
        let mut state = FilterState::new(at(2024, 6, 15), 25);
        state.set_page_index(0);
        assert_eq!(state.page().page_index, 1);
    }
}
