//! Page state and page-window derivation

use std::fmt;

/// Number of numbered page links shown at once
const PAGE_LINK_WINDOW: usize = 5;

/// Rows per page, restricted to a fixed set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ItemsPerPage {
    #[default]
    Five,
    Ten,
    Twenty,
    Fifty,
}

impl ItemsPerPage {
    pub const ALL: [ItemsPerPage; 4] = [
        ItemsPerPage::Five,
        ItemsPerPage::Ten,
        ItemsPerPage::Twenty,
        ItemsPerPage::Fifty,
    ];

    pub fn get(self) -> usize {
        match self {
            ItemsPerPage::Five => 5,
            ItemsPerPage::Ten => 10,
            ItemsPerPage::Twenty => 20,
            ItemsPerPage::Fifty => 50,
        }
    }

    /// Next size in the set, wrapping around
    pub fn cycle(self) -> Self {
        let index = Self::ALL.iter().position(|p| *p == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }
}

impl TryFrom<u32> for ItemsPerPage {
    type Error = u32;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|p| p.get() == value as usize)
            .ok_or(value)
    }
}

impl fmt::Display for ItemsPerPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

/// Entry of the numbered page-link strip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLink {
    Page(usize),
    Ellipsis,
}

/// "start – end of total" for the visible rows (1-based, inclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSummary {
    pub start: usize,
    pub end: usize,
    pub total: usize,
}

impl fmt::Display for PageSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} – {} of {}", self.start, self.end, self.total)
    }
}

/// Number of pages needed for `total_items` rows; 0 for an empty list
pub fn total_pages(total_items: usize, items_per_page: ItemsPerPage) -> usize {
    total_items.div_ceil(items_per_page.get())
}

/// Rows of `items` shown on `current_page` (1-based)
pub fn visible_window<T>(items: &[T], current_page: usize, items_per_page: ItemsPerPage) -> &[T] {
    let per_page = items_per_page.get();
    let start = current_page.saturating_sub(1).saturating_mul(per_page).min(items.len());
    let end = current_page.saturating_mul(per_page).min(items.len());
    &items[start..end]
}

/// Current page and page size
///
/// The total is not stored; every operation that depends on it takes the
/// current catalog length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    current_page: usize,
    items_per_page: ItemsPerPage,
}

impl Default for Pager {
    fn default() -> Self {
        Self::new(ItemsPerPage::default())
    }
}

impl Pager {
    pub fn new(items_per_page: ItemsPerPage) -> Self {
        Self {
            current_page: 1,
            items_per_page,
        }
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn items_per_page(&self) -> ItemsPerPage {
        self.items_per_page
    }

    pub fn total_pages(&self, total_items: usize) -> usize {
        total_pages(total_items, self.items_per_page)
    }

    /// Change the page size; always returns to the first page
    pub fn set_items_per_page(&mut self, items_per_page: ItemsPerPage) {
        self.items_per_page = items_per_page;
        self.current_page = 1;
    }

    /// Jump to `page`, clamped to the existing pages
    pub fn go_to(&mut self, page: usize, total_items: usize) {
        let last = self.total_pages(total_items).max(1);
        self.current_page = page.clamp(1, last);
    }

    pub fn next(&mut self, total_items: usize) {
        self.go_to(self.current_page.saturating_add(1), total_items);
    }

    pub fn prev(&mut self, total_items: usize) {
        self.go_to(self.current_page.saturating_sub(1), total_items);
    }

    pub fn first(&mut self) {
        self.current_page = 1;
    }

    pub fn last(&mut self, total_items: usize) {
        self.go_to(self.total_pages(total_items), total_items);
    }

    /// Pull the current page back inside the page range after the list shrank
    pub fn clamp(&mut self, total_items: usize) {
        self.go_to(self.current_page, total_items);
    }

    pub fn has_prev(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self, total_items: usize) -> bool {
        self.current_page < self.total_pages(total_items)
    }

    pub fn visible<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        visible_window(items, self.current_page, self.items_per_page)
    }

    pub fn summary(&self, total_items: usize) -> PageSummary {
        if total_items == 0 {
            return PageSummary { start: 0, end: 0, total: 0 };
        }
        let per_page = self.items_per_page.get();
        PageSummary {
            start: ((self.current_page - 1) * per_page + 1).min(total_items),
            end: (self.current_page * per_page).min(total_items),
            total: total_items,
        }
    }

    /// Numbered page links centered on the current page
    ///
    /// At most five numbers; near either end the window slides toward that end
    /// instead of shrinking. An ellipsis marks a side that does not reach the
    /// first or last page.
    pub fn page_links(&self, total_items: usize) -> Vec<PageLink> {
        let total = self.total_pages(total_items);
        if total == 0 {
            return Vec::new();
        }

        let size = PAGE_LINK_WINDOW.min(total);
        let current = self.current_page.clamp(1, total);
        let mut start = current.saturating_sub(PAGE_LINK_WINDOW / 2).max(1);
        if start + size - 1 > total {
            start = total + 1 - size;
        }
        let end = start + size - 1;

        let mut links = Vec::with_capacity(size + 2);
        if start > 1 {
            links.push(PageLink::Ellipsis);
        }
        links.extend((start..=end).map(PageLink::Page));
        if end < total {
            links.push(PageLink::Ellipsis);
        }
        links
    }
}
