// LogDash - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "LogDash";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "LogDash";

/// Current application version (updated by release script).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Remote API
// =============================================================================

/// API root used when neither the CLI nor config.toml provides one.
pub const DEFAULT_API_ROOT: &str = "http://localhost:7160/api";

/// Path of the list-metadata endpoint, relative to the API root.
pub const LIST_DATA_PATH: &str = "/listData";

/// Path of the log-query endpoint, relative to the API root.
pub const LOGS_PATH: &str = "/logs";

/// Default per-request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Minimum user-configurable request timeout (seconds).
pub const MIN_REQUEST_TIMEOUT_SECS: u64 = 1;

/// Maximum user-configurable request timeout (seconds).
pub const MAX_REQUEST_TIMEOUT_SECS: u64 = 600;

/// Maximum number of response body bytes quoted in a status error.
/// Keeps error messages readable when a proxy returns a full HTML page.
pub const MAX_ERROR_BODY_PREVIEW: usize = 512;

// =============================================================================
// Search defaults
// =============================================================================

/// Rows per page. Fixed for the lifetime of a dashboard.
pub const DEFAULT_PAGE_SIZE: u32 = 25;

/// Minimum configurable page size.
pub const MIN_PAGE_SIZE: u32 = 1;

/// Maximum configurable page size.
pub const MAX_PAGE_SIZE: u32 = 1_000;

/// First page index (pages are 1-based on the wire).
pub const FIRST_PAGE_INDEX: u32 = 1;

/// Level filter sentinel meaning "all severities".
pub const LEVEL_ALL: i32 = -1;

/// How far back the default time window reaches, in months.
pub const DEFAULT_LOOKBACK_MONTHS: u32 = 1;

/// Message column width in table output; longer messages are clipped.
pub const MAX_TABLE_MESSAGE_CHARS: usize = 200;

/// Error column width in table output.
pub const MAX_TABLE_ERROR_CHARS: usize = 60;

// =============================================================================
// Dashboard event loop bounds
// =============================================================================

/// Maximum number of completions applied by a single `Dashboard::poll` call.
/// Remaining completions stay queued for the next poll.
pub const MAX_COMPLETIONS_PER_POLL: usize = 64;

/// Maximum number of notices retained on the dashboard state.
/// Oldest notices are dropped first.
pub const MAX_NOTICES: usize = 100;

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";
