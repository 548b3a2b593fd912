//! Browser storage and environment lookups for the console shell.

use crate::config::{ConsoleConfig, LogLevel};
use crate::core::session::SessionContext;
use gloo::console;
use gloo::storage::{LocalStorage, Storage};
use gloo::utils::window;

pub(crate) const API_BASE_URL_KEY: &str = "warden.api_base_url";
pub(crate) const LOG_LEVEL_KEY: &str = "warden.log_level";
pub(crate) const SESSION_KEY: &str = "warden.session";

/// Configuration with storage overrides applied.
pub(crate) fn load_config() -> ConsoleConfig {
    let mut config = ConsoleConfig::default().with_base_url(&api_base_url());
    if let Ok(raw) = LocalStorage::get::<String>(LOG_LEVEL_KEY) {
        match raw.parse::<LogLevel>() {
            Ok(level) => config.log_level = level,
            Err(err) => console::error!(format!("ignoring {LOG_LEVEL_KEY}: {err}")),
        }
    }
    config
}

/// Stored base URL, else the page origin with `/api` appended.
pub(crate) fn api_base_url() -> String {
    if let Ok(value) = LocalStorage::get::<String>(API_BASE_URL_KEY) {
        if !value.trim().is_empty() {
            return value;
        }
    }
    match window().location().origin() {
        Ok(origin) if !origin.is_empty() => format!("{origin}/api"),
        _ => ConsoleConfig::default().api_base_url,
    }
}

/// Session persisted by a previous login, when it still carries a token.
pub(crate) fn load_session() -> Option<SessionContext> {
    let session = LocalStorage::get::<SessionContext>(SESSION_KEY).ok()?;
    session.has_credentials().then_some(session)
}

pub(crate) fn persist_session(session: &SessionContext) {
    if let Err(err) = LocalStorage::set(SESSION_KEY, session) {
        console::error!(format!("failed to persist session: {err}"));
    }
}

pub(crate) fn clear_session() {
    LocalStorage::delete(SESSION_KEY);
}
