//! Page navigation over the filter-visible options.

/// Current page and page size. Pages are 0-based internally and 1-based in
/// display text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    items_per_page: usize,
    current: usize,
}

impl Paginator {
    pub fn new(items_per_page: usize) -> Self {
        Self {
            items_per_page: items_per_page.max(1),
            current: 0,
        }
    }

    /// The 0-based current page.
    pub fn current_page(&self) -> usize {
        self.current
    }

    /// Number of pages for `visible` items; never less than one.
    pub fn total_pages(&self, visible: usize) -> usize {
        visible.div_ceil(self.items_per_page).max(1)
    }

    /// Positions (within the visible list) shown on the current page.
    pub fn page_range(&self, visible: usize) -> std::ops::Range<usize> {
        let start = (self.current * self.items_per_page).min(visible);
        let end = (start + self.items_per_page).min(visible);
        start..end
    }

    pub fn reset(&mut self) {
        self.current = 0;
    }

    /// Move to the next page. Returns `false` on the last page.
    pub fn next(&mut self, visible: usize) -> bool {
        if self.current + 1 < self.total_pages(visible) {
            self.current += 1;
            true
        } else {
            false
        }
    }

    /// Move to the previous page. Returns `false` on the first page.
    pub fn previous(&mut self) -> bool {
        if self.current > 0 {
            self.current -= 1;
            true
        } else {
            false
        }
    }

    /// Jump to a 0-based page, clamped into range.
    pub fn go_to(&mut self, page: usize, visible: usize) {
        self.current = page.min(self.total_pages(visible) - 1);
    }
}
