// LogDash - core/model.rs
//
// Core data model types. Pure data definitions with no I/O and no
// platform dependencies.
//
// Wire types use the PascalCase field names of the log query API so they
// can be (de)serialised directly.

use crate::util::constants::LEVEL_ALL;
use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Deserializer, Serialize};

// =============================================================================
// Log Entry
// =============================================================================

/// A single log record as returned by the log-query endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LogEntry {
    /// Server-assigned record identifier.
    #[serde(rename = "ID", default)]
    pub id: String,

    /// Correlation identifier shared by records of one request.
    #[serde(default)]
    pub trace_no: String,

    /// User the record was written on behalf of.
    #[serde(default)]
    pub user: String,

    #[serde(default)]
    pub message: String,

    /// Error text, empty when the record carries none.
    #[serde(default)]
    pub error: String,

    #[serde(default)]
    pub stack_trace: String,

    /// Severity ordinal, 0 (Verbose) through 5 (Fatal).
    #[serde(default)]
    pub level: i32,

    /// Creation time in milliseconds since the Unix epoch (UTC).
    #[serde(default)]
    pub created_on_utc: i64,
}

impl LogEntry {
    /// Creation time converted to the local time zone.
    /// `None` if the stored millisecond value is out of chrono's range.
    pub fn created_on(&self) -> Option<DateTime<Local>> {
        Local.timestamp_millis_opt(self.created_on_utc).single()
    }

    /// Severity of this entry, `None` for ordinals outside 0-5.
    pub fn severity(&self) -> Option<Severity> {
        Severity::from_ordinal(self.level)
    }
}

// =============================================================================
// Severity
// =============================================================================

/// Severity levels understood by the log service, least severe first.
/// The discriminant is the ordinal sent on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Verbose = 0,
    Debug = 1,
    Info = 2,
    Warning = 3,
    Error = 4,
    Fatal = 5,
}

impl Severity {
    /// Returns all variants in ordinal order.
    pub fn all() -> &'static [Severity] {
        &[
            Severity::Verbose,
            Severity::Debug,
            Severity::Info,
            Severity::Warning,
            Severity::Error,
            Severity::Fatal,
        ]
    }

    pub fn from_ordinal(ordinal: i32) -> Option<Severity> {
        Self::all().iter().copied().find(|s| s.ordinal() == ordinal)
    }

    pub fn ordinal(self) -> i32 {
        self as i32
    }

    /// Human-readable label for display.
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Verbose => "Verbose",
            Severity::Debug => "Debug",
            Severity::Info => "Info",
            Severity::Warning => "Warning",
            Severity::Error => "Error",
            Severity::Fatal => "Fatal",
        }
    }

    /// Parse a label case-insensitively ("warning", "Fatal", ...).
    pub fn from_label(label: &str) -> Option<Severity> {
        Self::all()
            .iter()
            .copied()
            .find(|s| s.label().eq_ignore_ascii_case(label))
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Options for the level picker: the "All" sentinel followed by every
/// severity, as `(wire value, label)` pairs.
pub fn level_options() -> Vec<(i32, &'static str)> {
    std::iter::once((LEVEL_ALL, "All"))
        .chain(Severity::all().iter().map(|s| (s.ordinal(), s.label())))
        .collect()
}

// =============================================================================
// Scope
// =============================================================================

/// The selected (client, database, table) triple.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeSelection {
    pub client: Option<String>,
    pub database: Option<String>,
    pub table: Option<String>,
}

/// Option lists for each scope level, valid only for the current ancestors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeOptions {
    pub clients: Vec<String>,
    pub databases: Vec<String>,
    pub tables: Vec<String>,
}

/// Raw response of the list-metadata endpoint.
///
/// The list fields must be present, but `null` decodes as an empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ScopeListing {
    #[serde(default)]
    pub client: String,
    #[serde(default)]
    pub database: String,
    #[serde(default)]
    pub table: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub clients: Vec<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub databases: Vec<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub tables: Vec<String>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

// =============================================================================
// Query and result page
// =============================================================================

/// Immutable snapshot of scope, filters and pagination, serialised as the
/// body of the log-query request. Absent optional fields are omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LogQuery {
    pub page_size: u32,
    pub page_index: u32,
    #[serde(rename = "DBName")]
    pub db_name: String,
    pub table_name: String,
    /// Advisory only; the server resolves the partition from database+table.
    #[serde(skip)]
    pub client: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// ISO-8601 with local offset, e.g. `2023-01-01T00:00:00+01:00`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    pub level: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flags: Option<u32>,
}

/// One page of search results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultPage {
    pub entries: Vec<LogEntry>,
    pub total: u64,
}

/// Raw response of the log-query endpoint.
///
/// `message` is set by the server when the query itself failed.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LogQueryResponse {
    #[serde(deserialize_with = "null_as_empty")]
    pub log_entries: Vec<LogEntry>,
    pub total_count: u64,
    #[serde(default)]
    pub message: Option<String>,
}

impl From<LogQueryResponse> for ResultPage {
    fn from(r: LogQueryResponse) -> Self {
        Self {
            entries: r.log_entries,
            total: r.total_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_severity_ordinals_round_trip() {
        for s in Severity::all() {
            assert_eq!(Severity::from_ordinal(s.ordinal()), Some(*s));
        }
        assert_eq!(Severity::from_ordinal(LEVEL_ALL), None);
        assert_eq!(Severity::from_ordinal(6), None);
        assert_eq!(Severity::from_label("warning"), Some(Severity::Warning));
    }

    #[test]
    fn test_level_options_start_with_all() {
        let options = level_options();
        assert_eq!(options.len(), 7);
        assert_eq!(options[0], (-1, "All"));
        assert_eq!(options[6], (5, "Fatal"));
    }

    #[test]
    fn test_listing_null_lists_decode_as_empty() {
        let json = r#"{"Client":"","Database":"","Table":"",
            "Clients":["svcA","svcB"],"Databases":null,"Tables":null}"#;
        let listing: ScopeListing = serde_json::from_str(json).unwrap();
        assert_eq!(listing.clients, vec!["svcA", "svcB"]);
        assert!(listing.databases.is_empty());
        assert!(listing.tables.is_empty());
    }

    #[test]
    fn test_listing_missing_list_is_an_error() {
        let json = r#"{"Clients":["svcA"],"Databases":[]}"#;
        assert!(serde_json::from_str::<ScopeListing>(json).is_err());
    }

    #[test]
    fn test_query_serialises_pascal_case_and_omits_absent_fields() {
        let query = LogQuery {
            page_size: 25,
            page_index: 1,
            db_name: "db1".to_string(),
            table_name: "2023".to_string(),
            client: Some("svcA".to_string()),
            user: None,
            trace_no: Some("abc".to_string()),
            message: None,
            start_time: Some("2023-01-01T00:00:00+00:00".to_string()),
            end_time: None,
            level: -1,
            flags: None,
        };
        let value = serde_json::to_value(&query).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "PageSize": 25,
                "PageIndex": 1,
                "DBName": "db1",
                "TableName": "2023",
                "TraceNo": "abc",
                "StartTime": "2023-01-01T00:00:00+00:00",
                "Level": -1,
            })
        );
    }

    #[test]
    fn test_log_entry_decodes_wire_names() {
        let json = r#"{"ID":"x1","TraceNo":"t","User":"bob","Message":"hi",
            "Error":"","StackTrace":"","Level":4,"CreatedOnUtc":1700000000000}"#;
        let entry: LogEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.id, "x1");
        assert_eq!(entry.severity(), Some(Severity::Error));
        assert_eq!(
            entry.created_on().map(|t| t.timestamp_millis()),
            Some(1_700_000_000_000)
        );
    }

    #[test]
    fn test_query_response_null_entries() {
        let json = r#"{"LogEntries":null,"TotalCount":0}"#;
        let page: ResultPage = serde_json::from_str::<LogQueryResponse>(json)
            .unwrap()
            .into();
        assert_eq!(page, ResultPage::default());
    }
}
