//! Page results, derived totals and the visible page window.

use crate::core::descriptor::QueryDescriptor;
use warden_api_models::{ListEnvelope, ManagedEntity};

/// One fetched page with pagination derived from the server hints.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageResult {
    /// Entities in server order.
    pub items: Vec<ManagedEntity>,
    /// Page this result answers.
    pub page: u32,
    /// Rows per page requested.
    pub page_size: u32,
    /// Total matching items.
    pub total_items: u64,
    /// `ceil(total_items / page_size)`; zero for an empty collection.
    pub total_pages: u32,
    /// A previous page exists.
    pub has_prev: bool,
    /// A following page exists.
    pub has_next: bool,
}

impl PageResult {
    /// Derive a page result from a decoded envelope.
    ///
    /// Totals fall back from reported item counts to reported page counts to
    /// what can be inferred from the page itself.
    #[must_use]
    pub fn from_envelope(envelope: ListEnvelope, descriptor: &QueryDescriptor) -> Self {
        let page_size = descriptor.page_size.max(1);
        let page = descriptor.page.max(1);
        let seen = u64::from(page - 1) * u64::from(page_size) + envelope.items.len() as u64;
        let total_items = envelope
            .pagination
            .total_items
            .or_else(|| {
                envelope
                    .pagination
                    .total_pages
                    .map(|pages| u64::from(pages) * u64::from(page_size))
            })
            .unwrap_or(seen);
        let total_pages = envelope
            .pagination
            .total_pages
            .unwrap_or_else(|| total_pages_for(total_items, page_size));
        Self {
            items: envelope.items,
            page,
            page_size,
            total_items,
            total_pages,
            has_prev: page > 1,
            has_next: page < total_pages,
        }
    }

    /// Whether the page holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 1-based index of the first row shown, or zero when empty.
    #[must_use]
    pub fn first_row(&self) -> u64 {
        if self.items.is_empty() {
            0
        } else {
            u64::from(self.page - 1) * u64::from(self.page_size) + 1
        }
    }

    /// 1-based index of the last row shown.
    #[must_use]
    pub fn last_row(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.page_size) + self.items.len() as u64
    }
}

/// `ceil(total / page_size)`.
#[must_use]
pub fn total_pages_for(total_items: u64, page_size: u32) -> u32 {
    let pages = total_items.div_ceil(u64::from(page_size.max(1)));
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// Clamp a requested page into `1..=max(1, total_pages)`.
#[must_use]
pub fn clamp_page(page: u32, total_pages: u32) -> u32 {
    page.clamp(1, total_pages.max(1))
}

/// Slot in the rendered pagination control.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageSlot {
    /// Clickable page number.
    Page(u32),
    /// Collapsed run of pages.
    Ellipsis,
}

/// First, last and current plus or minus one, with gaps collapsed.
#[must_use]
pub fn page_window(current: u32, total_pages: u32) -> Vec<PageSlot> {
    if total_pages == 0 {
        return Vec::new();
    }
    let current = clamp_page(current, total_pages);
    let mut pages = vec![1, current.saturating_sub(1), current, current + 1, total_pages];
    pages.retain(|page| (1..=total_pages).contains(page));
    pages.sort_unstable();
    pages.dedup();

    let mut slots = Vec::with_capacity(pages.len() * 2);
    let mut previous = 0;
    for page in pages {
        if previous != 0 && page > previous + 1 {
            slots.push(PageSlot::Ellipsis);
        }
        slots.push(PageSlot::Page(page));
        previous = page;
    }
    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::descriptor::QueryState;
    use serde_json::json;
    use warden_api_models::PaginationMeta;

    fn entities(count: usize) -> Vec<ManagedEntity> {
        (0..count)
            .map(|idx| {
                serde_json::from_value(json!({ "id": format!("e{idx}") })).expect("entity")
            })
            .collect()
    }

    #[test]
    fn derives_totals_from_item_count() {
        let descriptor = QueryState::new(10).descriptor();
        let result = PageResult::from_envelope(
            ListEnvelope {
                items: entities(10),
                pagination: PaginationMeta {
                    total_items: Some(25),
                    ..PaginationMeta::default()
                },
            },
            &descriptor,
        );
        assert_eq!(result.total_pages, 3);
        assert!(!result.has_prev);
        assert!(result.has_next);
        assert_eq!((result.first_row(), result.last_row()), (1, 10));
    }

    #[test]
    fn infers_totals_when_server_omits_them() {
        let descriptor = QueryState::new(10).descriptor().with_page(2);
        let result = PageResult::from_envelope(
            ListEnvelope {
                items: entities(4),
                pagination: PaginationMeta::default(),
            },
            &descriptor,
        );
        assert_eq!(result.total_items, 14);
        assert_eq!(result.total_pages, 2);
        assert!(result.has_prev);
        assert!(!result.has_next);
    }

    #[test]
    fn empty_collection_has_zero_pages() {
        assert_eq!(total_pages_for(0, 10), 0);
        assert_eq!(clamp_page(4, 0), 1);
        assert!(page_window(1, 0).is_empty());
    }

    #[test]
    fn window_collapses_distant_pages() {
        use PageSlot::{Ellipsis, Page};
        assert_eq!(
            page_window(5, 10),
            vec![Page(1), Ellipsis, Page(4), Page(5), Page(6), Ellipsis, Page(10)]
        );
        assert_eq!(page_window(1, 3), vec![Page(1), Page(2), Page(3)]);
        assert_eq!(
            page_window(1, 8),
            vec![Page(1), Page(2), Ellipsis, Page(8)]
        );
        assert_eq!(page_window(12, 4), vec![Page(1), Ellipsis, Page(3), Page(4)]);
    }
}
