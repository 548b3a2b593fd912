//! Descriptor-keyed query cache with tag invalidation.
//!
//! # Design
//! - Entries are keyed by the encoded descriptor, so equal descriptors share data.
//! - Time is always passed in; the cache never reads a clock itself.
//! - Invalidation marks entries instead of dropping them so a stale page can stay
//!   on screen while the refetch is in flight.
//! - Fetches and invalidations draw from one counter. A fetch that began before
//!   the latest invalidation of its entry stores its page but stays stale, and a
//!   fetch older than the page already stored is ignored.

use crate::core::pagination::PageResult;
use chrono::{DateTime, TimeDelta, Utc};
use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;

/// Freshness and retention windows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CachePolicy {
    /// Age after which an entry is served but refetched on mount.
    pub stale_after: TimeDelta,
    /// Unread time after which an entry is evicted.
    pub keep_alive: TimeDelta,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            stale_after: TimeDelta::seconds(60),
            keep_alive: TimeDelta::seconds(300),
        }
    }
}

/// Fetch status of a cache entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheStatus {
    /// Never fetched.
    Idle,
    /// A request is in flight.
    Loading,
    /// Last request succeeded.
    Success,
    /// Last request failed.
    Error,
}

/// Cached state for one descriptor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheEntry {
    /// Last good page, kept across failures.
    pub data: Option<Rc<PageResult>>,
    /// Current fetch status.
    pub status: CacheStatus,
    /// Message from the last failure.
    pub error: Option<String>,
    /// When `data` was last replaced.
    pub last_fetched_at: Option<DateTime<Utc>>,
    /// When a reader last asked for this entry.
    pub last_read_at: DateTime<Utc>,
    /// Invalidation tags.
    pub tags: BTreeSet<String>,
    invalidated: bool,
    invalidated_at: u64,
    stored_from: u64,
}

impl CacheEntry {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            data: None,
            status: CacheStatus::Idle,
            error: None,
            last_fetched_at: None,
            last_read_at: now,
            tags: BTreeSet::new(),
            invalidated: false,
            invalidated_at: 0,
            stored_from: 0,
        }
    }

    /// Whether a mutation has marked this entry for refetch.
    #[must_use]
    pub const fn is_invalidated(&self) -> bool {
        self.invalidated
    }
}

/// Issued by [`QueryCache::begin`]; hand it back when the fetch settles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(u64);

/// Result of a cache read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CacheRead {
    /// Data younger than the stale window; no refetch needed.
    Fresh(Rc<PageResult>),
    /// Data to show while a refetch runs.
    Stale(Rc<PageResult>),
    /// Nothing usable.
    Miss,
}

/// In-memory query cache.
#[derive(Debug, Default)]
pub struct QueryCache {
    entries: HashMap<String, CacheEntry>,
    policy: CachePolicy,
    tick: u64,
}

impl QueryCache {
    /// Empty cache with the given windows.
    #[must_use]
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            entries: HashMap::new(),
            policy,
            tick: 0,
        }
    }

    const fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    /// Active policy.
    #[must_use]
    pub const fn policy(&self) -> CachePolicy {
        self.policy
    }

    /// Read an entry and refresh its keep-alive clock.
    pub fn read(&mut self, key: &str, now: DateTime<Utc>) -> CacheRead {
        let stale_after = self.policy.stale_after;
        let Some(entry) = self.entries.get_mut(key) else {
            return CacheRead::Miss;
        };
        entry.last_read_at = now;
        let Some(data) = entry.data.clone() else {
            return CacheRead::Miss;
        };
        let fresh = !entry.invalidated
            && entry
                .last_fetched_at
                .is_some_and(|fetched| now - fetched < stale_after);
        if fresh {
            CacheRead::Fresh(data)
        } else {
            CacheRead::Stale(data)
        }
    }

    /// Mark a fetch as started, creating the entry if needed.
    #[must_use]
    pub fn begin(&mut self, key: &str, tag: &str, now: DateTime<Utc>) -> FetchTicket {
        let ticket = FetchTicket(self.next_tick());
        let entry = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| CacheEntry::new(now));
        entry.status = CacheStatus::Loading;
        entry.last_read_at = now;
        entry.tags.insert(tag.to_string());
        ticket
    }

    /// Store a successful page for the fetch holding `ticket`.
    ///
    /// Returns `false` when a newer fetch already stored its page or the entry
    /// was cleared while the request was in flight.
    pub fn complete(
        &mut self,
        key: &str,
        tag: &str,
        page: Rc<PageResult>,
        ticket: FetchTicket,
        now: DateTime<Utc>,
    ) -> bool {
        let Some(entry) = self.entries.get_mut(key) else {
            return false;
        };
        if ticket.0 < entry.stored_from {
            return false;
        }
        entry.data = Some(page);
        entry.status = CacheStatus::Success;
        entry.error = None;
        entry.last_fetched_at = Some(now);
        entry.last_read_at = now;
        entry.stored_from = ticket.0;
        entry.invalidated = entry.invalidated_at > ticket.0;
        entry.tags.insert(tag.to_string());
        true
    }

    /// Record a failure, keeping any previous data.
    pub fn fail(&mut self, key: &str, message: &str, ticket: FetchTicket, now: DateTime<Utc>) {
        if let Some(entry) = self.entries.get_mut(key) {
            if ticket.0 < entry.stored_from {
                return;
            }
            entry.status = CacheStatus::Error;
            entry.error = Some(message.to_string());
            entry.last_read_at = now;
        }
    }

    /// Mark every entry carrying `tag` for refetch. Returns how many matched.
    pub fn invalidate_tag(&mut self, tag: &str) -> usize {
        let at = self.next_tick();
        let mut count = 0;
        for entry in self.entries.values_mut() {
            if entry.tags.contains(tag) {
                entry.invalidated = true;
                entry.invalidated_at = at;
                count += 1;
            }
        }
        count
    }

    /// Drop entries unread for longer than the keep-alive window.
    pub fn evict_expired(&mut self, now: DateTime<Utc>) -> usize {
        let keep_alive = self.policy.keep_alive;
        let before = self.entries.len();
        self.entries.retain(|_, entry| {
            entry.status == CacheStatus::Loading || now - entry.last_read_at <= keep_alive
        });
        before - self.entries.len()
    }

    /// Inspect an entry without touching its clocks.
    #[must_use]
    pub fn entry(&self, key: &str) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    /// Number of live entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop everything, used on logout.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + seconds, 0)
            .single()
            .expect("timestamp")
    }

    fn page(total_items: u64) -> Rc<PageResult> {
        Rc::new(PageResult {
            items: Vec::new(),
            page: 1,
            page_size: 10,
            total_items,
            total_pages: 1,
            has_prev: false,
            has_next: false,
        })
    }

    fn store(cache: &mut QueryCache, key: &str, tag: &str, total_items: u64, now: DateTime<Utc>) {
        let ticket = cache.begin(key, tag, now);
        assert!(cache.complete(key, tag, page(total_items), ticket, now));
    }

    #[test]
    fn entries_go_stale_after_window() {
        let mut cache = QueryCache::new(CachePolicy::default());
        assert_eq!(cache.read("agents?page=1", at(0)), CacheRead::Miss);
        store(&mut cache, "agents?page=1", "agents", 3, at(0));
        assert!(matches!(cache.read("agents?page=1", at(59)), CacheRead::Fresh(_)));
        assert!(matches!(cache.read("agents?page=1", at(61)), CacheRead::Stale(_)));
    }

    #[test]
    fn invalidation_targets_tag_only() {
        let mut cache = QueryCache::new(CachePolicy::default());
        store(&mut cache, "agents?page=1", "agents", 1, at(0));
        store(&mut cache, "agents?page=2", "agents", 1, at(0));
        store(&mut cache, "users?page=1", "users", 1, at(0));
        assert_eq!(cache.invalidate_tag("agents"), 2);
        assert!(matches!(cache.read("agents?page=2", at(1)), CacheRead::Stale(_)));
        assert!(matches!(cache.read("users?page=1", at(1)), CacheRead::Fresh(_)));

        store(&mut cache, "agents?page=2", "agents", 2, at(2));
        assert!(matches!(cache.read("agents?page=2", at(3)), CacheRead::Fresh(_)));
    }

    #[test]
    fn fetch_begun_before_invalidation_stays_stale() {
        let mut cache = QueryCache::new(CachePolicy::default());
        store(&mut cache, "agents?page=1", "agents", 1, at(0));
        let before_ban = cache.begin("agents?page=1", "agents", at(61));
        assert_eq!(cache.invalidate_tag("agents"), 1);
        assert!(cache.complete("agents?page=1", "agents", page(1), before_ban, at(62)));
        assert!(cache.entry("agents?page=1").is_some_and(CacheEntry::is_invalidated));
        assert!(matches!(cache.read("agents?page=1", at(63)), CacheRead::Stale(_)));

        let after_ban = cache.begin("agents?page=1", "agents", at(64));
        assert!(cache.complete("agents?page=1", "agents", page(1), after_ban, at(65)));
        assert!(matches!(cache.read("agents?page=1", at(66)), CacheRead::Fresh(_)));
    }

    #[test]
    fn older_fetch_never_replaces_newer_page() {
        let mut cache = QueryCache::new(CachePolicy::default());
        let first = cache.begin("users?page=1", "users", at(0));
        let second = cache.begin("users?page=1", "users", at(1));
        assert!(cache.complete("users?page=1", "users", page(7), second, at(2)));
        assert!(!cache.complete("users?page=1", "users", page(3), first, at(3)));
        cache.fail("users?page=1", "late failure", first, at(4));

        let entry = cache.entry("users?page=1").expect("entry");
        assert_eq!(entry.status, CacheStatus::Success);
        assert_eq!(entry.data.as_ref().map(|data| data.total_items), Some(7));
    }

    #[test]
    fn fetch_settling_after_clear_is_dropped() {
        let mut cache = QueryCache::new(CachePolicy::default());
        let ticket = cache.begin("admins?page=1", "admins", at(0));
        cache.clear();
        assert!(!cache.complete("admins?page=1", "admins", page(2), ticket, at(1)));
        assert!(cache.is_empty());
    }

    #[test]
    fn failures_keep_previous_data() {
        let mut cache = QueryCache::new(CachePolicy::default());
        store(&mut cache, "users?page=1", "users", 4, at(0));
        let ticket = cache.begin("users?page=1", "users", at(70));
        cache.fail("users?page=1", "boom", ticket, at(71));
        let entry = cache.entry("users?page=1").expect("entry");
        assert_eq!(entry.status, CacheStatus::Error);
        assert_eq!(entry.error.as_deref(), Some("boom"));
        assert_eq!(entry.data.as_ref().map(|data| data.total_items), Some(4));
    }

    #[test]
    fn eviction_respects_keep_alive_and_reads() {
        let mut cache = QueryCache::new(CachePolicy::default());
        store(&mut cache, "a", "agents", 1, at(0));
        store(&mut cache, "b", "agents", 1, at(0));
        let _ = cache.read("b", at(200));
        assert_eq!(cache.evict_expired(at(301)), 1);
        assert!(cache.entry("a").is_none());
        assert!(cache.entry("b").is_some());

        let _ticket = cache.begin("c", "agents", at(0));
        assert_eq!(cache.evict_expired(at(1_000)), 1);
        assert!(cache.entry("c").is_some());
    }
}
