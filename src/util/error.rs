// LogDash - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// All errors preserve the causal chain for diagnostic logging.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all LogDash operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum LogDashError {
    /// A remote API call failed.
    Api(ApiError),

    /// Result export failed.
    Export(ExportError),

    /// Configuration loading or validation failed.
    Config(ConfigError),
}

impl fmt::Display for LogDashError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Api(e) => write!(f, "API error: {e}"),
            Self::Export(e) => write!(f, "Export error: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
        }
    }
}

impl std::error::Error for LogDashError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Api(e) => Some(e),
            Self::Export(e) => Some(e),
            Self::Config(e) => Some(e),
        }
    }
}

// ---------------------------------------------------------------------------
// API errors
// ---------------------------------------------------------------------------

/// Broad failure class of an [`ApiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Network failure, non-2xx status, or a server-reported query failure.
    Transport,
    /// The response body was not the JSON shape we expect.
    Decode,
}

/// Errors from the list-metadata and log-query endpoints.
#[derive(Debug)]
pub enum ApiError {
    /// The request could not be sent or the response could not be read.
    Transport {
        endpoint: &'static str,
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    Status {
        endpoint: &'static str,
        status: u16,
        body: String,
    },

    /// The server answered 2xx but reported a failure in its payload.
    Rejected {
        endpoint: &'static str,
        message: String,
    },

    /// The response body is not valid JSON or misses required fields.
    Decode {
        endpoint: &'static str,
        source: serde_json::Error,
    },

    /// The configured API root is not a usable base URL.
    InvalidRoot { root: String, reason: String },
}

impl ApiError {
    /// Failure class used by the dashboard when reporting the error.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Decode { .. } => FailureKind::Decode,
            _ => FailureKind::Transport,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport { endpoint, source } => {
                write!(f, "request to '{endpoint}' failed: {source}")
            }
            Self::Status {
                endpoint,
                status,
                body,
            } => {
                if body.is_empty() {
                    write!(f, "'{endpoint}' returned HTTP {status}")
                } else {
                    write!(f, "'{endpoint}' returned HTTP {status}: {body}")
                }
            }
            Self::Rejected { endpoint, message } => {
                write!(f, "'{endpoint}' rejected the query: {message}")
            }
            Self::Decode { endpoint, source } => {
                write!(f, "could not decode '{endpoint}' response: {source}")
            }
            Self::InvalidRoot { root, reason } => {
                write!(f, "API root '{root}' is invalid: {reason}")
            }
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Transport { source, .. } => Some(source),
            Self::Decode { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ApiError> for LogDashError {
    fn from(e: ApiError) -> Self {
        Self::Api(e)
    }
}

// ---------------------------------------------------------------------------
// Export errors
// ---------------------------------------------------------------------------

/// Errors related to export operations.
#[derive(Debug)]
pub enum ExportError {
    /// I/O error writing the export output.
    Io { source: io::Error },

    /// CSV serialisation error.
    Csv { source: csv::Error },

    /// JSON serialisation error.
    Json { source: serde_json::Error },
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { source } => write!(f, "export I/O error: {source}"),
            Self::Csv { source } => write!(f, "CSV export error: {source}"),
            Self::Json { source } => write!(f, "JSON export error: {source}"),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source } => Some(source),
            Self::Csv { source } => Some(source),
            Self::Json { source } => Some(source),
        }
    }
}

impl From<ExportError> for LogDashError {
    fn from(e: ExportError) -> Self {
        Self::Export(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A config value is out of the allowed range.
    ValueOutOfRange {
        field: String,
        value: String,
        expected: String,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::ValueOutOfRange {
                field,
                value,
                expected,
            } => write!(
                f,
                "Config '{field}' = '{value}' is out of range. Expected: {expected}"
            ),
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for LogDashError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Convenience type alias for LogDash results.
pub type Result<T> = std::result::Result<T, LogDashError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_error() -> serde_json::Error {
        serde_json::from_str::<serde_json::Value>("{not json").unwrap_err()
    }

    #[test]
    fn test_decode_error_kind() {
        let err = ApiError::Decode {
            endpoint: "/logs",
            source: decode_error(),
        };
        assert_eq!(err.kind(), FailureKind::Decode);
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_status_and_rejected_are_transport_failures() {
        let status = ApiError::Status {
            endpoint: "/listData",
            status: 502,
            body: String::new(),
        };
        assert_eq!(status.kind(), FailureKind::Transport);
        assert_eq!(status.to_string(), "'/listData' returned HTTP 502");

        let rejected = ApiError::Rejected {
            endpoint: "/logs",
            message: "table not found".to_string(),
        };
        assert_eq!(rejected.kind(), FailureKind::Transport);
        assert!(rejected.to_string().contains("table not found"));
    }

    #[test]
    fn test_top_level_error_wraps_api_error() {
        let err: LogDashError = ApiError::InvalidRoot {
            root: "nope".to_string(),
            reason: "relative URL without a base".to_string(),
        }
        .into();
        assert!(err.to_string().starts_with("API error: API root 'nope'"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
