//! Query state and the canonical request descriptor derived from it.
//!
//! # Design
//! - `QueryState` is what the controls show; `QueryDescriptor` is what goes on the wire.
//! - Sentinel filter values and blank search never reach the descriptor, so equal
//!   descriptors always mean the same request and the same cache entry.

/// Sentinel filter value meaning "no constraint".
pub const ALL_FILTER: &str = "All";

/// User-controlled list parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryState {
    /// 1-based page index.
    pub page: u32,
    /// Rows per page.
    pub page_size: u32,
    /// Committed (debounced) search text.
    pub search: String,
    /// Status filter or [`ALL_FILTER`].
    pub status: String,
    /// Category filter or [`ALL_FILTER`].
    pub category: String,
}

impl QueryState {
    /// Fresh state on page one with no filters.
    #[must_use]
    pub fn new(page_size: u32) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            search: String::new(),
            status: ALL_FILTER.to_string(),
            category: ALL_FILTER.to_string(),
        }
    }

    /// Move to `page`, never below one. Returns whether anything changed.
    pub fn set_page(&mut self, page: u32) -> bool {
        let page = page.max(1);
        let changed = self.page != page;
        self.page = page;
        changed
    }

    /// Replace the committed search text; a real change resets to page one.
    pub fn set_search(&mut self, search: &str) -> bool {
        Self::replace(&mut self.search, search, &mut self.page)
    }

    /// Replace the status filter; a real change resets to page one.
    pub fn set_status(&mut self, status: &str) -> bool {
        Self::replace(&mut self.status, status, &mut self.page)
    }

    /// Replace the category filter; a real change resets to page one.
    pub fn set_category(&mut self, category: &str) -> bool {
        Self::replace(&mut self.category, category, &mut self.page)
    }

    /// Whether a non-blank search term is committed.
    #[must_use]
    pub fn has_search(&self) -> bool {
        normalize_search(&self.search).is_some()
    }

    /// Whether any enumerated filter is narrowing the list.
    #[must_use]
    pub fn has_filters(&self) -> bool {
        normalize_filter(&self.status).is_some() || normalize_filter(&self.category).is_some()
    }

    /// Canonical descriptor for the current state.
    #[must_use]
    pub fn descriptor(&self) -> QueryDescriptor {
        build_descriptor(self)
    }

    fn replace(slot: &mut String, value: &str, page: &mut u32) -> bool {
        if slot == value {
            return false;
        }
        value.clone_into(slot);
        *page = 1;
        true
    }
}

/// Canonical request parameters for one list page.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct QueryDescriptor {
    /// 1-based page index.
    pub page: u32,
    /// Rows per page.
    pub page_size: u32,
    /// Trimmed search term, absent when blank.
    pub search: Option<String>,
    /// Status constraint, absent for the sentinel.
    pub status: Option<String>,
    /// Category constraint, absent for the sentinel.
    pub category: Option<String>,
}

/// Build the canonical descriptor, dropping sentinels and blank search.
#[must_use]
pub fn build_descriptor(state: &QueryState) -> QueryDescriptor {
    QueryDescriptor {
        page: state.page.max(1),
        page_size: state.page_size.max(1),
        search: normalize_search(&state.search),
        status: normalize_filter(&state.status),
        category: normalize_filter(&state.category),
    }
}

fn normalize_search(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn normalize_filter(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty() && !trimmed.eq_ignore_ascii_case(ALL_FILTER)).then(|| trimmed.to_string())
}

impl QueryDescriptor {
    /// Same descriptor on a different page.
    #[must_use]
    pub fn with_page(&self, page: u32) -> Self {
        Self {
            page: page.max(1),
            ..self.clone()
        }
    }

    /// Wire query parameters in a stable order.
    ///
    /// `category_param` names the backend field for the category filter; when a
    /// collection has no category the constraint is dropped.
    #[must_use]
    pub fn query_pairs(&self, category_param: Option<&str>) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), self.page.to_string()),
            ("limit".to_string(), self.page_size.to_string()),
        ];
        if let Some(search) = &self.search {
            pairs.push(("search".to_string(), search.clone()));
        }
        if let Some(status) = &self.status {
            pairs.push(("status".to_string(), status.clone()));
        }
        if let (Some(param), Some(category)) = (category_param, &self.category) {
            pairs.push((param.to_string(), category.clone()));
        }
        pairs
    }

    /// Cache key combining the collection path and encoded parameters.
    #[must_use]
    pub fn cache_key(&self, collection_path: &str, category_param: Option<&str>) -> String {
        format!(
            "{collection_path}?{}",
            encode_query(&self.query_pairs(category_param))
        )
    }
}

/// Percent-encode query pairs into `a=1&b=2` form.
#[must_use]
pub fn encode_query(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                urlencoding::encode(key),
                urlencoding::encode(value)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equivalent_states_share_one_descriptor() {
        let mut blank = QueryState::new(10);
        blank.search = "   ".into();
        let mut explicit = QueryState::new(10);
        explicit.status = "all".into();
        explicit.category = String::new();
        assert_eq!(build_descriptor(&blank), build_descriptor(&explicit));
        assert_eq!(build_descriptor(&blank).search, None);
        assert_eq!(build_descriptor(&blank).status, None);
    }

    #[test]
    fn non_page_changes_reset_to_first_page() {
        let mut state = QueryState::new(10);
        state.set_page(4);
        assert!(state.set_search("ada"));
        assert_eq!(state.page, 1);

        state.set_page(3);
        assert!(state.set_status("Banned"));
        assert_eq!(state.page, 1);

        state.set_page(2);
        assert!(state.set_category("Support"));
        assert_eq!(state.page, 1);

        state.set_page(5);
        assert!(!state.set_status("Banned"));
        assert_eq!(state.page, 5);
    }

    #[test]
    fn set_page_never_goes_below_one() {
        let mut state = QueryState::new(10);
        assert!(!state.set_page(0));
        assert_eq!(state.page, 1);
    }

    #[test]
    fn query_pairs_use_collection_category_param() {
        let mut state = QueryState::new(10);
        state.set_search(" ada lovelace ");
        state.set_status("Active");
        state.set_category("Support");
        let descriptor = state.descriptor();
        assert_eq!(
            descriptor.cache_key("agents", Some("department")),
            "agents?page=1&limit=10&search=ada%20lovelace&status=Active&department=Support"
        );
        assert_eq!(
            descriptor.cache_key("users", None),
            "users?page=1&limit=10&search=ada%20lovelace&status=Active"
        );
    }

    #[test]
    fn with_page_keeps_filters() {
        let mut state = QueryState::new(10);
        state.set_status("Banned");
        let next = state.descriptor().with_page(3);
        assert_eq!(next.page, 3);
        assert_eq!(next.status.as_deref(), Some("Banned"));
    }
}
