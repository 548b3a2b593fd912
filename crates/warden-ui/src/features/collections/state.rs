//! Collection view state machine.
//!
//! # Design
//! - The view owns its query, search debounce and in-flight set; nothing here
//!   touches the network. Callers fetch whatever descriptor a transition returns.
//! - A response is applied only when its descriptor still matches the current one
//!   and it answers the newest request issued, so an older fetch for the same
//!   descriptor cannot overwrite a newer one.

use crate::core::debounce::{SearchDebounce, SearchTicket};
use crate::core::descriptor::{ALL_FILTER, QueryDescriptor, QueryState};
use crate::core::pagination::{PageResult, PageSlot, clamp_page, page_window};
use crate::features::collections::actions::MutationOp;
use crate::features::collections::catalog::{CollectionDef, CollectionKind};
use std::collections::BTreeSet;
use std::rc::Rc;
use warden_api_models::EntityId;

/// What the view is showing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewPhase {
    /// Waiting for the first response for the current descriptor.
    Loading,
    /// Rows are on screen.
    Ready(Rc<PageResult>),
    /// Last fetch failed; the message is shown with a retry button.
    Error(String),
}

/// Which empty state to show for a page with no rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EmptyKind {
    /// A search is active; offer to clear it.
    SearchNoMatch,
    /// Filters exclude everything.
    FilteredNoMatch,
    /// The collection itself is empty.
    Empty,
}

impl EmptyKind {
    /// Heading and explanation shown instead of rows.
    #[must_use]
    pub fn copy(self, def: &CollectionDef, search: &str) -> (String, String) {
        match self {
            Self::SearchNoMatch => (
                "No matches".to_string(),
                format!("No {} match \"{}\".", def.items_key, search.trim()),
            ),
            Self::FilteredNoMatch => (
                "No results".to_string(),
                format!("No {} match the selected filters.", def.items_key),
            ),
            Self::Empty => (
                format!("No {} yet", def.items_key),
                if def.offers(MutationOp::Create) {
                    format!("Create the first {} to get started.", def.singular)
                } else {
                    format!("{} will appear here once they exist.", capitalized(def.items_key))
                },
            ),
        }
    }

    /// Label of the button that leaves this state, if one applies.
    #[must_use]
    pub const fn escape_label(self) -> Option<&'static str> {
        match self {
            Self::SearchNoMatch => Some("Clear search"),
            Self::FilteredNoMatch => Some("Reset filters"),
            Self::Empty => None,
        }
    }
}

fn capitalized(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// What happened to a response handed to the view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Response matched and is now on screen.
    Applied,
    /// Response answered an older descriptor and was dropped.
    Discarded,
    /// Page was out of range; fetch the returned descriptor instead.
    Clamped(QueryDescriptor),
}

/// Stamp on a page request; only the most recently issued one may land.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestSeq(u64);

/// State of one management screen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollectionViewState {
    /// Collection being shown.
    pub kind: CollectionKind,
    /// Control values.
    pub query: QueryState,
    /// Search box debounce.
    pub search: SearchDebounce,
    /// Loading, ready or error.
    pub phase: ViewPhase,
    /// Stale rows are shown while a background refetch runs.
    pub refreshing: bool,
    in_flight: BTreeSet<EntityId>,
    creating: bool,
    issued: u64,
}

impl CollectionViewState {
    /// Fresh view on page one.
    #[must_use]
    pub fn new(kind: CollectionKind, page_size: u32, debounce_ms: u32) -> Self {
        Self {
            kind,
            query: QueryState::new(page_size),
            search: SearchDebounce::new(debounce_ms),
            phase: ViewPhase::Loading,
            refreshing: false,
            in_flight: BTreeSet::new(),
            creating: false,
            issued: 0,
        }
    }

    /// Definition for the collection.
    #[must_use]
    pub fn def(&self) -> &'static CollectionDef {
        self.kind.def()
    }

    /// Descriptor for the current controls.
    #[must_use]
    pub fn descriptor(&self) -> QueryDescriptor {
        self.query.descriptor()
    }

    /// Keystroke in the search box.
    pub fn search_input(&mut self, raw: &str) -> SearchTicket {
        self.search.input(raw)
    }

    /// Settle timer fired; returns the descriptor to fetch when the search committed.
    pub fn search_settled(&mut self, ticket: SearchTicket) -> Option<QueryDescriptor> {
        let committed = self.search.settle(ticket)?;
        self.query
            .set_search(&committed)
            .then(|| self.reload())
    }

    /// Clear button; bypasses the settle window.
    pub fn clear_search(&mut self) -> Option<QueryDescriptor> {
        let committed = self.search.clear()?;
        self.query
            .set_search(&committed)
            .then(|| self.reload())
    }

    /// Pagination click.
    pub fn set_page(&mut self, page: u32) -> Option<QueryDescriptor> {
        let page = match &self.phase {
            ViewPhase::Ready(result) => clamp_page(page, result.total_pages),
            ViewPhase::Loading | ViewPhase::Error(_) => page,
        };
        self.query.set_page(page).then(|| self.reload())
    }

    /// Status select.
    pub fn set_status_filter(&mut self, status: &str) -> Option<QueryDescriptor> {
        self.query.set_status(status).then(|| self.reload())
    }

    /// Category select.
    pub fn set_category_filter(&mut self, category: &str) -> Option<QueryDescriptor> {
        self.query.set_category(category).then(|| self.reload())
    }

    /// Reset every filter and the search box.
    pub fn reset_filters(&mut self) -> Option<QueryDescriptor> {
        self.search.clear();
        let changed = [
            self.query.set_search(""),
            self.query.set_status(ALL_FILTER),
            self.query.set_category(ALL_FILTER),
        ]
        .contains(&true);
        changed.then(|| self.reload())
    }

    /// Show cached rows before the network answers.
    pub fn show_cached(&mut self, descriptor: &QueryDescriptor, page: Rc<PageResult>, stale: bool) {
        if descriptor != &self.descriptor() {
            return;
        }
        self.phase = ViewPhase::Ready(page);
        self.refreshing = stale;
    }

    /// Stamp a page request about to be sent or served from cache.
    pub const fn issue_request(&mut self) -> RequestSeq {
        self.issued += 1;
        RequestSeq(self.issued)
    }

    fn answers_latest(&self, descriptor: &QueryDescriptor, seq: RequestSeq) -> bool {
        seq.0 == self.issued && descriptor == &self.descriptor()
    }

    /// Apply a page fetched for `descriptor` under `seq`.
    pub fn apply_page(
        &mut self,
        descriptor: &QueryDescriptor,
        seq: RequestSeq,
        page: Rc<PageResult>,
    ) -> ApplyOutcome {
        if !self.answers_latest(descriptor, seq) {
            return ApplyOutcome::Discarded;
        }
        let clamped = clamp_page(descriptor.page, page.total_pages);
        if clamped != descriptor.page {
            self.query.set_page(clamped);
            return ApplyOutcome::Clamped(self.reload());
        }
        self.phase = ViewPhase::Ready(page);
        self.refreshing = false;
        ApplyOutcome::Applied
    }

    /// Apply a failed fetch for `descriptor` under `seq`.
    pub fn apply_error(
        &mut self,
        descriptor: &QueryDescriptor,
        seq: RequestSeq,
        message: &str,
    ) -> ApplyOutcome {
        if !self.answers_latest(descriptor, seq) {
            return ApplyOutcome::Discarded;
        }
        self.refreshing = false;
        self.phase = ViewPhase::Error(message.to_string());
        ApplyOutcome::Applied
    }

    /// Retry button.
    pub fn retry(&mut self) -> QueryDescriptor {
        self.reload()
    }

    /// After a successful delete of `id`: step back a page when the only row on
    /// the last page went away, then return the descriptor to refetch.
    pub fn after_delete(&mut self, id: &EntityId) -> QueryDescriptor {
        if let ViewPhase::Ready(page) = &self.phase {
            let was_last_row = page.items.len() == 1 && page.items[0].id == *id;
            let on_last_page = self.query.page >= page.total_pages;
            if was_last_row && on_last_page && self.query.page > 1 {
                let previous = page.total_pages.saturating_sub(1).max(1);
                self.query.set_page(previous);
            }
        }
        self.refresh()
    }

    /// Refetch the current descriptor while keeping rows visible.
    pub fn refresh(&mut self) -> QueryDescriptor {
        if matches!(self.phase, ViewPhase::Ready(_)) {
            self.refreshing = true;
        } else {
            self.phase = ViewPhase::Loading;
        }
        self.descriptor()
    }

    /// Empty state for a ready page without rows.
    #[must_use]
    pub fn empty_kind(&self) -> Option<EmptyKind> {
        let ViewPhase::Ready(page) = &self.phase else {
            return None;
        };
        if !page.is_empty() {
            return None;
        }
        Some(if self.query.has_search() {
            EmptyKind::SearchNoMatch
        } else if self.query.has_filters() {
            EmptyKind::FilteredNoMatch
        } else {
            EmptyKind::Empty
        })
    }

    /// Pagination slots for the current page.
    #[must_use]
    pub fn page_window(&self) -> Vec<PageSlot> {
        match &self.phase {
            ViewPhase::Ready(page) => page_window(self.query.page, page.total_pages),
            ViewPhase::Loading | ViewPhase::Error(_) => Vec::new(),
        }
    }

    /// Claim the in-flight slot for a mutation. Returns `false` when one is
    /// already running for the same target.
    pub fn begin_mutation(&mut self, op: MutationOp, id: Option<&EntityId>) -> bool {
        match (op, id) {
            (MutationOp::Create, _) | (_, None) => !std::mem::replace(&mut self.creating, true),
            (_, Some(id)) => self.in_flight.insert(id.clone()),
        }
    }

    /// Release the in-flight slot.
    pub fn finish_mutation(&mut self, op: MutationOp, id: Option<&EntityId>) {
        match (op, id) {
            (MutationOp::Create, _) | (_, None) => self.creating = false,
            (_, Some(id)) => {
                self.in_flight.remove(id);
            }
        }
    }

    /// Whether row controls for `id` should be disabled.
    #[must_use]
    pub fn is_busy(&self, id: &EntityId) -> bool {
        self.in_flight.contains(id)
    }

    /// Whether a create is running.
    #[must_use]
    pub const fn is_creating(&self) -> bool {
        self.creating
    }

    fn reload(&mut self) -> QueryDescriptor {
        self.phase = ViewPhase::Loading;
        self.refreshing = false;
        self.descriptor()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use warden_api_models::ManagedEntity;

    fn page(descriptor: &QueryDescriptor, ids: &[&str], total_items: u64) -> Rc<PageResult> {
        let items: Vec<ManagedEntity> = ids
            .iter()
            .map(|id| serde_json::from_value(json!({ "id": id })).expect("entity"))
            .collect();
        let total_pages = crate::core::pagination::total_pages_for(total_items, descriptor.page_size);
        Rc::new(PageResult {
            items,
            page: descriptor.page,
            page_size: descriptor.page_size,
            total_items,
            total_pages,
            has_prev: descriptor.page > 1,
            has_next: descriptor.page < total_pages,
        })
    }

    fn view() -> CollectionViewState {
        CollectionViewState::new(CollectionKind::Agents, 10, 500)
    }

    fn deliver(
        state: &mut CollectionViewState,
        descriptor: &QueryDescriptor,
        page: Rc<PageResult>,
    ) -> ApplyOutcome {
        let seq = state.issue_request();
        state.apply_page(descriptor, seq, page)
    }

    #[test]
    fn stale_responses_are_discarded() {
        let mut state = view();
        let first = state.descriptor();
        let first_seq = state.issue_request();
        let ticket = state.search_input("ab");
        let second = state.search_settled(ticket).expect("committed");
        let second_seq = state.issue_request();

        let late = page(&first, &["x"], 1);
        assert_eq!(state.apply_page(&first, first_seq, late), ApplyOutcome::Discarded);
        assert_eq!(state.phase, ViewPhase::Loading);

        let fresh = page(&second, &["y"], 1);
        assert_eq!(
            state.apply_page(&second, second_seq, fresh.clone()),
            ApplyOutcome::Applied
        );
        assert_eq!(state.phase, ViewPhase::Ready(fresh));
        assert_eq!(
            state.apply_error(&first, first_seq, "late failure"),
            ApplyOutcome::Discarded
        );
    }

    #[test]
    fn older_fetch_for_same_descriptor_cannot_overwrite_newer() {
        let mut state = view();
        let descriptor = state.descriptor();
        deliver(&mut state, &descriptor, page(&descriptor, &["ada"], 1));

        let background = state.issue_request();
        let after_ban = state.refresh();
        let after_ban_seq = state.issue_request();
        assert_eq!(after_ban, descriptor);

        let banned = page(&descriptor, &["ada", "bob"], 2);
        assert_eq!(
            state.apply_page(&descriptor, after_ban_seq, banned.clone()),
            ApplyOutcome::Applied
        );
        let before_ban = page(&descriptor, &["ada"], 1);
        assert_eq!(
            state.apply_page(&descriptor, background, before_ban),
            ApplyOutcome::Discarded
        );
        assert_eq!(
            state.apply_error(&descriptor, background, "timeout"),
            ApplyOutcome::Discarded
        );
        assert_eq!(state.phase, ViewPhase::Ready(banned));
        assert!(!state.refreshing);
    }

    #[test]
    fn superseded_request_landing_first_keeps_refreshing() {
        let mut state = view();
        let descriptor = state.descriptor();
        deliver(&mut state, &descriptor, page(&descriptor, &["ada"], 1));

        let older = state.issue_request();
        let _ = state.refresh();
        let newer = state.issue_request();
        assert_eq!(
            state.apply_page(&descriptor, older, page(&descriptor, &["ada"], 1)),
            ApplyOutcome::Discarded
        );
        assert!(state.refreshing);
        assert_eq!(
            state.apply_page(&descriptor, newer, page(&descriptor, &[], 0)),
            ApplyOutcome::Applied
        );
        assert!(!state.refreshing);
    }

    #[test]
    fn out_of_range_page_is_clamped() {
        let mut state = view();
        let _ = state.set_page(5);
        let descriptor = state.descriptor();
        let outcome = deliver(&mut state, &descriptor, page(&descriptor, &[], 21));
        assert_eq!(outcome, ApplyOutcome::Clamped(descriptor.with_page(3)));
        assert_eq!(state.query.page, 3);

        let mut empty = view();
        let _ = empty.set_page(2);
        let descriptor = empty.descriptor();
        let outcome = deliver(&mut empty, &descriptor, page(&descriptor, &[], 0));
        assert_eq!(outcome, ApplyOutcome::Clamped(descriptor.with_page(1)));
    }

    #[test]
    fn deleting_last_row_on_last_page_steps_back() {
        let mut state = view();
        let _ = state.set_page(3);
        let descriptor = state.descriptor();
        deliver(&mut state, &descriptor, page(&descriptor, &["only"], 21));

        let refetch = state.after_delete(&EntityId::from("only"));
        assert_eq!(refetch.page, 2);
        assert!(state.refreshing);
    }

    #[test]
    fn deleting_one_of_many_keeps_page() {
        let mut state = view();
        let _ = state.set_page(2);
        let descriptor = state.descriptor();
        deliver(&mut state, &descriptor, page(&descriptor, &["a", "b"], 12));
        assert_eq!(state.after_delete(&EntityId::from("a")).page, 2);

        let mut first = view();
        let descriptor = first.descriptor();
        deliver(&mut first, &descriptor, page(&descriptor, &["solo"], 1));
        assert_eq!(first.after_delete(&EntityId::from("solo")).page, 1);
    }

    #[test]
    fn empty_states_follow_search_then_filters() {
        let mut state = view();
        let ticket = state.search_input("zz");
        let descriptor = state.search_settled(ticket).expect("committed");
        deliver(&mut state, &descriptor, page(&descriptor, &[], 0));
        assert_eq!(state.empty_kind(), Some(EmptyKind::SearchNoMatch));

        let descriptor = state.clear_search().expect("cleared");
        let descriptor = state
            .set_status_filter("Banned")
            .unwrap_or(descriptor);
        deliver(&mut state, &descriptor, page(&descriptor, &[], 0));
        assert_eq!(state.empty_kind(), Some(EmptyKind::FilteredNoMatch));

        let descriptor = state.reset_filters().expect("reset");
        deliver(&mut state, &descriptor, page(&descriptor, &[], 0));
        assert_eq!(state.empty_kind(), Some(EmptyKind::Empty));
    }

    #[test]
    fn empty_copy_names_the_collection() {
        let agents = CollectionKind::Agents.def();
        let (title, description) = EmptyKind::SearchNoMatch.copy(agents, " zed ");
        assert_eq!(title, "No matches");
        assert_eq!(description, "No agents match \"zed\".");
        assert_eq!(EmptyKind::SearchNoMatch.escape_label(), Some("Clear search"));
        assert_eq!(EmptyKind::FilteredNoMatch.escape_label(), Some("Reset filters"));

        let (title, description) = EmptyKind::Empty.copy(agents, "");
        assert_eq!(title, "No agents yet");
        assert_eq!(description, "Create the first agent to get started.");

        let assigned = CollectionKind::AssignedUsers.def();
        let (_, description) = EmptyKind::Empty.copy(assigned, "");
        assert_eq!(description, "Users will appear here once they exist.");
        assert_eq!(EmptyKind::Empty.escape_label(), None);
    }

    #[test]
    fn filter_change_resets_page_and_reloads() {
        let mut state = view();
        let _ = state.set_page(4);
        let descriptor = state.set_category_filter("Sales").expect("changed");
        assert_eq!(descriptor.page, 1);
        assert_eq!(descriptor.category.as_deref(), Some("Sales"));
        assert_eq!(state.phase, ViewPhase::Loading);
        assert_eq!(state.set_category_filter("Sales"), None);
    }

    #[test]
    fn in_flight_guard_is_per_entity() {
        let mut state = view();
        let ada = EntityId::from("ada");
        let bob = EntityId::from("bob");
        assert!(state.begin_mutation(MutationOp::Ban, Some(&ada)));
        assert!(!state.begin_mutation(MutationOp::Delete, Some(&ada)));
        assert!(state.begin_mutation(MutationOp::Delete, Some(&bob)));
        assert!(state.is_busy(&ada));
        state.finish_mutation(MutationOp::Ban, Some(&ada));
        assert!(!state.is_busy(&ada));

        assert!(state.begin_mutation(MutationOp::Create, None));
        assert!(!state.begin_mutation(MutationOp::Create, None));
        state.finish_mutation(MutationOp::Create, None);
        assert!(!state.is_creating());
    }

    #[test]
    fn cached_rows_render_while_refreshing() {
        let mut state = view();
        let descriptor = state.descriptor();
        state.show_cached(&descriptor, page(&descriptor, &["a"], 1), true);
        assert!(state.refreshing);
        assert!(matches!(state.phase, ViewPhase::Ready(_)));
        assert_eq!(state.page_window(), vec![PageSlot::Page(1)]);
    }
}
