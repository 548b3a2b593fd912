//! Console configuration resolved at boot.
//!
//! # Design
//! - One plain struct with defaults; the wasm shell overrides the base URL only.
//! - Timing knobs live here so tests can shrink them without touching components.

use crate::core::cache::CachePolicy;
use chrono::TimeDelta;
use std::fmt;
use std::str::FromStr;

/// Default API base when nothing else is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";
/// Rows per page on every management screen.
pub const DEFAULT_PAGE_SIZE: u32 = 10;
/// Settle window for the search box.
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u32 = 500;
/// Delay between a self-ban success notice and the forced logout.
pub const DEFAULT_SESSION_TEARDOWN_MS: u32 = 1_500;

/// Log verbosity for the browser console subscriber.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Errors only.
    Error,
    /// Warnings and errors.
    Warn,
    /// Informational output.
    #[default]
    Info,
    /// Request and cache diagnostics.
    Debug,
    /// Everything.
    Trace,
}

impl LogLevel {
    /// Lowercase label accepted by [`LogLevel::from_str`].
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }

    /// Matching `tracing` level.
    #[must_use]
    pub const fn as_tracing(self) -> tracing::Level {
        match self {
            Self::Error => tracing::Level::ERROR,
            Self::Warn => tracing::Level::WARN,
            Self::Info => tracing::Level::INFO,
            Self::Debug => tracing::Level::DEBUG,
            Self::Trace => tracing::Level::TRACE,
        }
    }
}

/// Error returned for unrecognised log level labels.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown log level '{0}'")]
pub struct ParseLogLevelError(String);

impl FromStr for LogLevel {
    type Err = ParseLogLevelError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            other => Err(ParseLogLevelError(other.to_string())),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Runtime configuration for the console.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConsoleConfig {
    /// Base URL of the remote admin API (no trailing slash).
    pub api_base_url: String,
    /// Rows per page for managed collections.
    pub page_size: u32,
    /// Search settle window in milliseconds.
    pub search_debounce_ms: u32,
    /// Cache freshness and keep-alive windows.
    pub cache: CachePolicy,
    /// Delay before a self-ban forces logout, in milliseconds.
    pub session_teardown_ms: u32,
    /// Browser console log level.
    pub log_level: LogLevel,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            search_debounce_ms: DEFAULT_SEARCH_DEBOUNCE_MS,
            cache: CachePolicy::default(),
            session_teardown_ms: DEFAULT_SESSION_TEARDOWN_MS,
            log_level: LogLevel::default(),
        }
    }
}

impl ConsoleConfig {
    /// Replace the API base URL, normalising trailing slashes away.
    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        let trimmed = base_url.trim().trim_end_matches('/');
        if !trimmed.is_empty() {
            self.api_base_url = trimmed.to_string();
        }
        self
    }

    /// Override the cache windows in seconds.
    #[must_use]
    pub fn with_cache_seconds(mut self, stale_after: i64, keep_alive: i64) -> Self {
        self.cache = CachePolicy {
            stale_after: TimeDelta::seconds(stale_after.max(0)),
            keep_alive: TimeDelta::seconds(keep_alive.max(0)),
        };
        self
    }

    /// Profile image URL for an uploaded file name.
    #[must_use]
    pub fn upload_url(&self, file_name: &str) -> String {
        let origin = self
            .api_base_url
            .strip_suffix("/api")
            .unwrap_or(&self.api_base_url);
        format!("{origin}/uploads/{}", urlencoding::encode(file_name))
    }
}
