use crate::model::Tag;

/// Page sizes offered by the pagination control
pub const PAGE_SIZE_OPTIONS: [usize; 4] = [10, 20, 50, 100];

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Compute one page of tags in newest-first order
///
/// The input keeps its stored (oldest-first) order; the reversal allocates a
/// new vector. A page past the end yields an empty vector. `page_number` 0
/// is treated as the first page and `page_size` 0 yields nothing.
pub fn derive_page(tags: &[Tag], page_number: usize, page_size: usize) -> Vec<Tag> {
    let start = page_number.max(1).saturating_sub(1).saturating_mul(page_size);
    tags.iter()
        .rev()
        .skip(start)
        .take(page_size)
        .cloned()
        .collect()
}

/// Pagination state of one expanded repository row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagerState {
    page_number: usize,
    page_size: usize,
}

impl Default for PagerState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl PagerState {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_number: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn page_number(&self) -> usize {
        self.page_number
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn set_page(&mut self, page_number: usize) {
        self.page_number = page_number.max(1);
    }

    /// Change the page size together with the page to land on
    pub fn set_page_size(&mut self, page_size: usize, page_number: usize) {
        self.page_size = page_size.max(1);
        self.page_number = page_number.max(1);
    }

    /// Number of pages for `total` items, at least one
    pub fn page_count(&self, total: usize) -> usize {
        total.div_ceil(self.page_size).max(1)
    }

    pub fn next_page(&mut self, total: usize) {
        if self.page_number < self.page_count(total) {
            self.page_number += 1;
        }
    }

    pub fn previous_page(&mut self) {
        self.page_number = self.page_number.saturating_sub(1).max(1);
    }

    /// Move to the next size in [`PAGE_SIZE_OPTIONS`], back to page 1
    pub fn cycle_page_size(&mut self) {
        let next = PAGE_SIZE_OPTIONS
            .iter()
            .position(|&size| size == self.page_size)
            .map(|idx| PAGE_SIZE_OPTIONS[(idx + 1) % PAGE_SIZE_OPTIONS.len()])
            .unwrap_or(DEFAULT_PAGE_SIZE);
        self.set_page_size(next, 1);
    }

    /// Keep the page inside `(page - 1) * size < max(1, total)`
    pub fn clamp_to(&mut self, total: usize) {
        let last = self.page_count(total);
        if self.page_number > last {
            self.page_number = last;
        }
    }

    pub fn page(&self, tags: &[Tag]) -> Vec<Tag> {
        derive_page(tags, self.page_number, self.page_size)
    }

    /// One-based inclusive item range shown on the current page, `None` when
    /// the page is empty
    pub fn visible_range(&self, total: usize) -> Option<(usize, usize)> {
        let start = (self.page_number - 1).saturating_mul(self.page_size);
        if start >= total {
            return None;
        }
        Some((start + 1, start.saturating_add(self.page_size).min(total)))
    }

    /// Label like `11 - 20 of 25`
    pub fn range_label(&self, total: usize) -> String {
        match self.visible_range(total) {
            Some((first, last)) => format!("{} - {} of {}", first, last, total),
            None => format!("0 - 0 of {}", total),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(n: usize) -> Vec<Tag> {
        (1..=n)
            .map(|i| Tag::new(&format!("v{}", i), &["x86_64"]))
            .collect()
    }

    fn names(tags: &[Tag]) -> Vec<&str> {
        tags.iter().map(|t| t.name.as_str()).collect()
    }

    #[test]
    fn test_first_page_starts_with_newest() {
        let tags = tags(3);
        let page = derive_page(&tags, 1, 10);
        assert_eq!(names(&page), vec!["v3", "v2", "v1"]);
        assert_eq!(names(&tags), vec!["v1", "v2", "v3"]);
    }

    #[test]
    fn test_zero_inputs_do_not_panic() {
        let tags = tags(3);
        assert_eq!(names(&derive_page(&tags, 0, 2)), vec!["v3", "v2"]);
        assert!(derive_page(&tags, 1, 0).is_empty());
        assert!(derive_page(&[], 5, 10).is_empty());
        assert!(derive_page(&tags, usize::MAX, usize::MAX).is_empty());
    }

    #[test]
    fn test_set_page_size_lands_on_given_page() {
        let mut pager = PagerState::default();
        pager.set_page(3);
        pager.set_page_size(20, 1);
        assert_eq!(pager.page_number(), 1);
        assert_eq!(pager.page_size(), 20);
    }

    #[test]
    fn test_next_and_previous_are_bounded() {
        let mut pager = PagerState::new(10);
        pager.next_page(25);
        pager.next_page(25);
        pager.next_page(25);
        assert_eq!(pager.page_number(), 3);

        pager.previous_page();
        pager.previous_page();
        pager.previous_page();
        assert_eq!(pager.page_number(), 1);
    }

    #[test]
    fn test_clamp_after_shrink() {
        let mut pager = PagerState::new(10);
        pager.set_page(4);
        pager.clamp_to(25);
        assert_eq!(pager.page_number(), 3);

        pager.clamp_to(0);
        assert_eq!(pager.page_number(), 1);
    }

    #[test]
    fn test_cycle_page_size() {
        let mut pager = PagerState::new(10);
        pager.set_page(2);
        pager.cycle_page_size();
        assert_eq!((pager.page_size(), pager.page_number()), (20, 1));
        pager.cycle_page_size();
        pager.cycle_page_size();
        pager.cycle_page_size();
        assert_eq!(pager.page_size(), 10);

        let mut odd = PagerState::new(7);
        odd.cycle_page_size();
        assert_eq!(odd.page_size(), DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_range_label() {
        let mut pager = PagerState::new(10);
        assert_eq!(pager.range_label(25), "1 - 10 of 25");
        pager.set_page(3);
        assert_eq!(pager.range_label(25), "21 - 25 of 25");
        pager.set_page(4);
        assert_eq!(pager.range_label(25), "0 - 0 of 25");
    }
}
