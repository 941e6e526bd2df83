// ── Pagination controller ──
//
// Owns page/size/total bookkeeping for the admin table, independent of
// whether the backend paginated (envelope) or returned the entire
// collection (local windowing). No operation here panics or errors:
// malformed input is clamped or ignored so the table never wedges.

use std::sync::Arc;

use crate::model::Biosite;

/// Sentinel emitted by [`visible_pages`] where a run of page numbers is
/// collapsed into an ellipsis.
pub const ELLIPSIS: i64 = -1;

/// Default rows per page.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// One authoritative load of table data.
///
/// The two access scopes return different shapes: full access gets a
/// server-paginated envelope, scoped access gets the whole branch as a
/// bare list that is windowed locally. Both feed
/// [`PaginationController::apply`].
#[derive(Debug, Clone)]
pub enum PageSource {
    /// Server-paginated: `data` is exactly one page.
    Envelope {
        data: Vec<Arc<Biosite>>,
        total: u64,
        page: u32,
        size: u32,
        total_pages: u32,
    },
    /// The entire (already filtered/sorted) result set; windowed locally.
    Complete(Vec<Arc<Biosite>>),
}

/// How the current item buffer relates to pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Windowing {
    /// `items` holds exactly the current page (server paginated).
    #[default]
    Server,
    /// `items` holds the full collection; pages are slices of it.
    Local,
}

#[derive(Debug, Clone)]
pub struct PaginationController {
    current_page: u32,
    page_size: u32,
    total_items: u64,
    total_pages: u32,
    items: Vec<Arc<Biosite>>,
    windowing: Windowing,
}

impl Default for PaginationController {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl PaginationController {
    /// Create an empty controller. A `page_size` of zero falls back to
    /// the default rather than erroring.
    pub fn new(page_size: u32) -> Self {
        Self {
            current_page: 1,
            page_size: if page_size == 0 {
                DEFAULT_PAGE_SIZE
            } else {
                page_size
            },
            total_items: 0,
            total_pages: 0,
            items: Vec::new(),
            windowing: Windowing::default(),
        }
    }

    // ── Navigation ───────────────────────────────────────────────────

    /// Jump to page `n`. Silent no-op when `n` is out of `[1, total_pages]`.
    /// Returns `true` if the page actually changed.
    pub fn set_page(&mut self, n: u32) -> bool {
        if n < 1 || n > self.total_pages || n == self.current_page {
            return false;
        }
        self.current_page = n;
        true
    }

    /// Change the page size and reset to page 1. Zero is ignored.
    /// Returns `true` if anything changed.
    pub fn set_page_size(&mut self, n: u32) -> bool {
        if n == 0 || n == self.page_size {
            return false;
        }
        self.page_size = n;
        self.current_page = 1;
        if self.windowing == Windowing::Local {
            self.recompute_local_totals();
        }
        true
    }

    pub fn next_page(&mut self) -> bool {
        if self.can_go_next() {
            self.set_page(self.current_page + 1)
        } else {
            false
        }
    }

    pub fn prev_page(&mut self) -> bool {
        if self.can_go_prev() {
            self.set_page(self.current_page - 1)
        } else {
            false
        }
    }

    pub fn go_to_first(&mut self) -> bool {
        self.set_page(1)
    }

    pub fn go_to_last(&mut self) -> bool {
        self.set_page(self.total_pages)
    }

    // ── Data application ─────────────────────────────────────────────

    /// Replace the pagination state wholesale from a fetch result.
    pub fn apply(&mut self, source: PageSource) {
        match source {
            PageSource::Envelope {
                data,
                total,
                page,
                size,
                total_pages,
            } => {
                self.windowing = Windowing::Server;
                self.items = data;
                self.total_items = total;
                self.total_pages = total_pages;
                if size > 0 {
                    self.page_size = size;
                }
                self.current_page = page.clamp(1, self.total_pages.max(1));
            }
            PageSource::Complete(items) => {
                self.windowing = Windowing::Local;
                self.items = items;
                self.recompute_local_totals();
            }
        }
    }

    fn recompute_local_totals(&mut self) {
        self.total_items = self.items.len() as u64;
        self.total_pages = u32::try_from(self.total_items.div_ceil(u64::from(self.page_size)))
            .unwrap_or(u32::MAX);
        self.current_page = self.current_page.clamp(1, self.total_pages.max(1));
    }

    // ── Derived state ────────────────────────────────────────────────

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn total_items(&self) -> u64 {
        self.total_items
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn can_go_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    pub fn can_go_prev(&self) -> bool {
        self.current_page > 1
    }

    /// Look up a row anywhere in the current buffer (not just the
    /// visible page) by id.
    pub fn find(&self, id: crate::model::BiositeId) -> Option<&Arc<Biosite>> {
        self.items.iter().find(|s| s.id == id)
    }

    /// Rows of the current page.
    pub fn page_rows(&self) -> &[Arc<Biosite>] {
        match self.windowing {
            Windowing::Server => &self.items,
            Windowing::Local => {
                let start = (self.current_page as usize - 1) * self.page_size as usize;
                let end = (start + self.page_size as usize).min(self.items.len());
                if start >= self.items.len() {
                    &[]
                } else {
                    &self.items[start..end]
                }
            }
        }
    }

    /// Page window for pagination controls, from the controller's own state.
    pub fn visible_pages(&self) -> Vec<i64> {
        visible_pages(self.current_page, self.total_pages, 2)
    }

    /// Human-readable range summary ("Showing 41-47 of 47 items").
    pub fn page_info(&self) -> String {
        if self.total_items == 0 {
            return "No biosites found".into();
        }
        let first = u64::from(self.current_page - 1) * u64::from(self.page_size) + 1;
        let last = (u64::from(self.current_page) * u64::from(self.page_size))
            .min(self.total_items);
        format!("Showing {first}-{last} of {} items", self.total_items)
    }
}

// ── Visible-page window ──────────────────────────────────────────────

/// Ordered sequence of page numbers to render in pagination controls.
///
/// Keeps page 1, the last page, and a `±delta` window around `current`;
/// any gap between those runs collapses into a single [`ELLIPSIS`]
/// sentinel. No ellipsis is emitted when the window already spans the
/// whole range.
pub fn visible_pages(current: u32, total: u32, delta: u32) -> Vec<i64> {
    if total == 0 {
        return Vec::new();
    }
    if total == 1 {
        return vec![1];
    }

    let current = i64::from(current.clamp(1, total));
    let total = i64::from(total);
    let delta = i64::from(delta);

    let window_start = (current - delta).max(2);
    let window_end = (current + delta).min(total - 1);

    let mut pages = Vec::with_capacity(usize::try_from(total).unwrap_or(0).min(64));
    pages.push(1);
    if window_start > 2 {
        pages.push(ELLIPSIS);
    }
    pages.extend(window_start..=window_end);
    if window_end < total - 1 {
        pages.push(ELLIPSIS);
    }
    pages.push(total);
    pages
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;

    fn site(n: u32) -> Arc<Biosite> {
        Arc::new(Biosite {
            id: Uuid::new_v4().into(),
            owner_id: Uuid::new_v4().into(),
            title: format!("site-{n}"),
            slug: None,
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            owner_handle: None,
        })
    }

    fn envelope(total: u64, page: u32, size: u32, total_pages: u32) -> PageSource {
        let count = usize::try_from(
            u64::from(size).min(total - u64::from(page - 1) * u64::from(size)),
        )
        .unwrap();
        PageSource::Envelope {
            data: (0..count).map(|i| site(u32::try_from(i).unwrap())).collect(),
            total,
            page,
            size,
            total_pages,
        }
    }

    #[test]
    fn set_page_out_of_range_is_noop() {
        let mut p = PaginationController::default();
        p.apply(envelope(47, 1, 10, 5));

        assert!(!p.set_page(0));
        assert_eq!(p.current_page(), 1);
        assert!(!p.set_page(6));
        assert_eq!(p.current_page(), 1);

        assert!(p.set_page(3));
        assert_eq!(p.current_page(), 3);
    }

    #[test]
    fn set_page_size_resets_to_first_page() {
        let mut p = PaginationController::default();
        p.apply(envelope(47, 1, 10, 5));
        p.set_page(4);

        assert!(p.set_page_size(25));
        assert_eq!(p.current_page(), 1);
        assert_eq!(p.page_size(), 25);

        // Zero page size is ignored entirely.
        assert!(!p.set_page_size(0));
        assert_eq!(p.page_size(), 25);
    }

    #[test]
    fn totals_follow_ceiling_division() {
        let mut p = PaginationController::default();
        p.apply(envelope(47, 1, 10, 5));
        assert_eq!(p.total_pages(), 5);
        assert_eq!(p.total_items(), 47);
    }

    #[test]
    fn page_info_reports_ranges() {
        let mut p = PaginationController::default();
        p.apply(envelope(47, 1, 10, 5));
        assert!(p.page_info().contains("1-10 of 47"));

        p.apply(envelope(47, 5, 10, 5));
        assert!(p.page_info().contains("41-47 of 47"));
    }

    #[test]
    fn page_info_handles_empty_result() {
        let mut p = PaginationController::default();
        p.apply(PageSource::Complete(Vec::new()));
        assert_eq!(p.page_info(), "No biosites found");
    }

    #[test]
    fn bounds_guard_next_and_prev() {
        let mut p = PaginationController::default();
        p.apply(envelope(30, 1, 10, 3));

        assert!(!p.prev_page());
        assert!(p.next_page());
        assert!(p.next_page());
        assert!(!p.next_page()); // at last page
        assert_eq!(p.current_page(), 3);

        assert!(p.go_to_first());
        assert_eq!(p.current_page(), 1);
        assert!(p.go_to_last());
        assert_eq!(p.current_page(), 3);
    }

    #[test]
    fn complete_collection_windows_locally() {
        let mut p = PaginationController::new(10);
        p.apply(PageSource::Complete((0..47).map(site).collect()));

        assert_eq!(p.total_items(), 47);
        assert_eq!(p.total_pages(), 5);
        assert_eq!(p.page_rows().len(), 10);

        p.go_to_last();
        assert_eq!(p.page_rows().len(), 7);

        // Shrinking the window reshapes pages without touching the data.
        p.set_page_size(25);
        assert_eq!(p.total_pages(), 2);
        assert_eq!(p.current_page(), 1);
        assert_eq!(p.page_rows().len(), 25);
    }

    #[test]
    fn current_page_clamps_when_collection_shrinks() {
        let mut p = PaginationController::new(10);
        p.apply(PageSource::Complete((0..47).map(site).collect()));
        p.go_to_last();

        p.apply(PageSource::Complete((0..5).map(site).collect()));
        assert_eq!(p.current_page(), 1);
        assert_eq!(p.total_pages(), 1);
    }

    #[test]
    fn visible_pages_collapses_gaps() {
        assert_eq!(
            visible_pages(5, 10, 2),
            vec![1, ELLIPSIS, 3, 4, 5, 6, 7, ELLIPSIS, 10]
        );
    }

    #[test]
    fn visible_pages_without_gaps_has_no_ellipsis() {
        assert_eq!(visible_pages(2, 3, 2), vec![1, 2, 3]);
    }

    #[test]
    fn visible_pages_edges() {
        assert_eq!(visible_pages(1, 1, 2), vec![1]);
        assert_eq!(visible_pages(1, 0, 2), Vec::<i64>::new());
        assert_eq!(
            visible_pages(1, 10, 2),
            vec![1, 2, 3, ELLIPSIS, 10]
        );
        assert_eq!(
            visible_pages(10, 10, 2),
            vec![1, ELLIPSIS, 8, 9, 10]
        );
    }
}
