//! Search debounce state machine.
//!
//! Every keystroke supersedes the previous one by bumping a generation counter;
//! a timer callback only commits when it still holds the latest ticket. The
//! component owns the actual timer, this type only decides what commits.

/// Handle returned for each keystroke, redeemed when its timer fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchTicket(u64);

/// Where the search box is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DebouncePhase {
    /// Nothing typed since the last commit.
    Idle,
    /// Keystrokes are waiting for the settle window.
    Typing,
    /// The raw text was committed.
    Committed,
}

/// Last-keystroke-wins debounce over the raw search text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchDebounce {
    raw: String,
    committed: String,
    generation: u64,
    phase: DebouncePhase,
    settle_ms: u32,
}

impl SearchDebounce {
    /// Empty debounce with a settle window.
    #[must_use]
    pub const fn new(settle_ms: u32) -> Self {
        Self {
            raw: String::new(),
            committed: String::new(),
            generation: 0,
            phase: DebouncePhase::Idle,
            settle_ms,
        }
    }

    /// Record a keystroke and hand back the ticket its timer must present.
    pub fn input(&mut self, raw: &str) -> SearchTicket {
        raw.clone_into(&mut self.raw);
        self.generation += 1;
        self.phase = DebouncePhase::Typing;
        SearchTicket(self.generation)
    }

    /// Redeem a timer ticket. Returns the text to commit when it is the latest
    /// ticket and the text actually differs from what is committed.
    pub fn settle(&mut self, ticket: SearchTicket) -> Option<String> {
        if ticket.0 != self.generation || self.phase != DebouncePhase::Typing {
            return None;
        }
        self.phase = DebouncePhase::Committed;
        if self.raw == self.committed {
            return None;
        }
        self.committed.clone_from(&self.raw);
        Some(self.committed.clone())
    }

    /// Clear the box immediately, bypassing the settle window.
    pub fn clear(&mut self) -> Option<String> {
        self.generation += 1;
        self.raw.clear();
        if self.committed.is_empty() {
            self.phase = DebouncePhase::Idle;
            return None;
        }
        self.committed.clear();
        self.phase = DebouncePhase::Committed;
        Some(String::new())
    }

    /// Abandon any pending keystrokes, restoring the committed text.
    pub fn cancel(&mut self) {
        self.generation += 1;
        self.raw.clone_from(&self.committed);
        self.phase = DebouncePhase::Idle;
    }

    /// Whether typed text is still waiting to commit.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.phase == DebouncePhase::Typing && self.raw != self.committed
    }

    /// Text currently in the input.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Text last committed to the query.
    #[must_use]
    pub fn committed(&self) -> &str {
        &self.committed
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> DebouncePhase {
        self.phase
    }

    /// Settle window in milliseconds.
    #[must_use]
    pub const fn settle_ms(&self) -> u32 {
        self.settle_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_of_keystrokes_commits_once() {
        let mut debounce = SearchDebounce::new(500);
        let first = debounce.input("a");
        let second = debounce.input("ab");
        let third = debounce.input("abc");
        assert!(debounce.is_pending());

        let commits: Vec<String> = [first, second, third]
            .into_iter()
            .filter_map(|ticket| debounce.settle(ticket))
            .collect();
        assert_eq!(commits, vec!["abc".to_string()]);
        assert!(!debounce.is_pending());
        assert_eq!(debounce.committed(), "abc");
    }

    #[test]
    fn retyping_committed_text_commits_nothing() {
        let mut debounce = SearchDebounce::new(500);
        let ticket = debounce.input("ada");
        assert_eq!(debounce.settle(ticket).as_deref(), Some("ada"));
        let _ = debounce.input("ad");
        let ticket = debounce.input("ada");
        assert_eq!(debounce.settle(ticket), None);
        assert_eq!(debounce.phase(), DebouncePhase::Committed);
    }

    #[test]
    fn clear_commits_immediately_and_voids_timers() {
        let mut debounce = SearchDebounce::new(500);
        let ticket = debounce.input("bob");
        assert_eq!(debounce.settle(ticket).as_deref(), Some("bob"));
        let late = debounce.input("bobby");
        assert_eq!(debounce.clear().as_deref(), Some(""));
        assert_eq!(debounce.settle(late), None);
        assert_eq!(debounce.raw(), "");
        assert_eq!(debounce.clear(), None);
    }

    #[test]
    fn cancel_restores_committed_text() {
        let mut debounce = SearchDebounce::new(500);
        let ticket = debounce.input("eve");
        let _ = debounce.settle(ticket);
        let pending = debounce.input("evelyn");
        debounce.cancel();
        assert_eq!(debounce.raw(), "eve");
        assert_eq!(debounce.settle(pending), None);
        assert_eq!(debounce.phase(), DebouncePhase::Idle);
    }
}
