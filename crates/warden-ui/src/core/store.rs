//! App-wide yewdux store.
//!
//! # Design
//! - Only the session and the toast queue are global; list state stays local to
//!   each collection view.
//! - Reducer helpers are plain methods so they can be tested without a DOM.

use crate::core::session::SessionContext;
use yewdux::store::Store;

/// Toast severity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    /// Informational, e.g. an action that was already applied.
    Info,
    /// Action succeeded.
    Success,
    /// Action failed.
    Error,
}

/// User-facing outcome message before it becomes a toast.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    /// Severity.
    pub kind: NoticeKind,
    /// Text shown to the user.
    pub message: String,
}

impl Notice {
    /// Informational notice.
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            message: message.into(),
        }
    }

    /// Success notice.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    /// Error notice.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}

/// Toast rendered by the host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toast {
    /// Monotonic identifier.
    pub id: u64,
    /// Display text.
    pub message: String,
    /// Severity.
    pub kind: NoticeKind,
}

/// Global application store.
#[derive(Clone, Debug, PartialEq, Eq, Store, Default)]
pub struct AppStore {
    /// Signed-in principal, if any.
    pub session: Option<SessionContext>,
    /// Visible toasts, oldest first.
    pub toasts: Vec<Toast>,
    next_toast_id: u64,
}

/// Upper bound on simultaneously visible toasts.
pub const MAX_TOASTS: usize = 4;

impl AppStore {
    /// Queue a notice as a toast, dropping the oldest beyond [`MAX_TOASTS`].
    pub fn push_notice(&mut self, notice: Notice) -> u64 {
        self.next_toast_id += 1;
        let id = self.next_toast_id;
        self.toasts.push(Toast {
            id,
            message: notice.message,
            kind: notice.kind,
        });
        if self.toasts.len() > MAX_TOASTS {
            let overflow = self.toasts.len() - MAX_TOASTS;
            self.toasts.drain(..overflow);
        }
        id
    }

    /// Remove a toast by id.
    pub fn dismiss(&mut self, id: u64) {
        self.toasts.retain(|toast| toast.id != id);
    }

    /// Forget the session; toasts stay so the logout reason remains visible.
    pub fn end_session(&mut self) {
        self.session = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toasts_get_monotonic_ids_and_cap() {
        let mut store = AppStore::default();
        let first = store.push_notice(Notice::success("one"));
        let second = store.push_notice(Notice::error("two"));
        assert!(second > first);
        for idx in 0..5 {
            store.push_notice(Notice::info(format!("n{idx}")));
        }
        assert_eq!(store.toasts.len(), MAX_TOASTS);
        assert_eq!(store.toasts[0].message, "n1");
    }

    #[test]
    fn dismiss_removes_only_matching_toast() {
        let mut store = AppStore::default();
        let keep = store.push_notice(Notice::info("keep"));
        let drop_id = store.push_notice(Notice::info("drop"));
        store.dismiss(drop_id);
        assert_eq!(store.toasts.len(), 1);
        assert_eq!(store.toasts[0].id, keep);
    }
}
