// LogDash - platform/config.rs
//
// Platform-specific configuration directory resolution and config.toml
// loading with startup validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Resolved platform paths for LogDash configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/logdash/ or %APPDATA%\LogDash\config\)
    pub config_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            tracing::debug!(config = %config_dir.display(), "Platform paths resolved");
            Self { config_dir }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            Self {
                config_dir: PathBuf::from("."),
            }
        }
    }

    /// Default location of config.toml.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILE_NAME)
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[api]` section.
    pub api: ApiSection,
    /// `[search]` section.
    pub search: SearchSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[api]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ApiSection {
    /// Base URL of the log query API, e.g. "http://localhost:7160/api".
    pub root: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: Option<u64>,
}

/// `[search]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct SearchSection {
    /// Rows per result page.
    pub page_size: Option<u32>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
    /// Log file path (empty = stderr only).
    pub file: Option<String>,
}

/// Validated application configuration derived from `config.toml`.
///
/// Invalid values produce actionable warnings and fall back to defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    // -- API --
    pub api_root: String,
    pub request_timeout: Duration,

    // -- Search --
    pub page_size: u32,

    // -- Logging --
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
    /// Log file path.
    pub log_file: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_root: constants::DEFAULT_API_ROOT.to_string(),
            request_timeout: Duration::from_secs(constants::DEFAULT_REQUEST_TIMEOUT_SECS),
            page_size: constants::DEFAULT_PAGE_SIZE,
            log_level: None,
            log_file: None,
        }
    }
}

/// Load and validate the config file at `config_path`.
///
/// Returns `AppConfig` with validated values and a list of non-fatal warnings.
/// If the file does not exist, returns defaults with no warnings (first-run).
/// If the file is unparseable, returns defaults with a warning so the
/// application still starts but the user is informed.
pub fn load_config(config_path: &Path) -> (AppConfig, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();

    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config file found; using defaults");
        return (AppConfig::default(), warnings);
    }

    match load_config_strict(config_path) {
        Ok(loaded) => loaded,
        Err(e) => {
            let msg = format!("{e}. Using defaults.");
            tracing::warn!("{}", msg);
            warnings.push(msg);
            (AppConfig::default(), warnings)
        }
    }
}

/// Load and validate a config file the user named explicitly.
///
/// Unlike `load_config`, a missing or unparseable file is an error rather
/// than a fallback to defaults. Out-of-range values still only warn.
pub fn load_config_strict(config_path: &Path) -> Result<(AppConfig, Vec<String>), ConfigError> {
    let raw = read_raw(config_path)?;
    tracing::info!(path = %config_path.display(), "Loaded config file");

    let mut warnings = Vec::new();
    let config = validate(raw, &mut warnings);
    if !warnings.is_empty() {
        tracing::warn!(
            count = warnings.len(),
            "Config validation produced warnings"
        );
    }
    Ok((config, warnings))
}

fn read_raw(config_path: &Path) -> Result<RawConfig, ConfigError> {
    let content = std::fs::read_to_string(config_path).map_err(|source| ConfigError::Io {
        path: config_path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::TomlParse {
        path: config_path.to_path_buf(),
        source,
    })
}

fn out_of_range(field: &str, value: impl ToString, min: impl Display, max: impl Display) -> ConfigError {
    ConfigError::ValueOutOfRange {
        field: field.to_string(),
        value: value.to_string(),
        expected: format!("{min}-{max}"),
    }
}

/// Validate each raw field against named constants, accumulating warnings.
fn validate(raw: RawConfig, warnings: &mut Vec<String>) -> AppConfig {
    let mut config = AppConfig::default();

    // -- API: root --
    if let Some(root) = raw.api.root {
        let trimmed = root.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            config.api_root = trimmed.to_string();
        } else {
            warnings.push(format!(
                "[api] root = \"{root}\" must be an http:// or https:// URL. Using default ({}).",
                constants::DEFAULT_API_ROOT,
            ));
        }
    }

    // -- API: timeout_secs --
    if let Some(secs) = raw.api.timeout_secs {
        if (constants::MIN_REQUEST_TIMEOUT_SECS..=constants::MAX_REQUEST_TIMEOUT_SECS)
            .contains(&secs)
        {
            config.request_timeout = Duration::from_secs(secs);
        } else {
            let e = out_of_range(
                "[api] timeout_secs",
                secs,
                constants::MIN_REQUEST_TIMEOUT_SECS,
                constants::MAX_REQUEST_TIMEOUT_SECS,
            );
            warnings.push(format!(
                "{e}. Using default ({}).",
                constants::DEFAULT_REQUEST_TIMEOUT_SECS
            ));
        }
    }

    // -- Search: page_size --
    if let Some(size) = raw.search.page_size {
        if (constants::MIN_PAGE_SIZE..=constants::MAX_PAGE_SIZE).contains(&size) {
            config.page_size = size;
        } else {
            let e = out_of_range(
                "[search] page_size",
                size,
                constants::MIN_PAGE_SIZE,
                constants::MAX_PAGE_SIZE,
            );
            warnings.push(format!("{e}. Using default ({}).", constants::DEFAULT_PAGE_SIZE));
        }
    }

    // -- Logging: level --
    if let Some(ref level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.to_lowercase());
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: error, warn, info, debug, trace. Using default (info).",
            ));
        }
    }

    // -- Logging: file --
    if let Some(file) = raw.logging.file {
        if !file.is_empty() {
            config.log_file = Some(file);
        }
    }

    config
}
