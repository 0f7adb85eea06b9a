use serde::{Deserialize, Serialize};

/// Splits a collection into fixed-size pages, indexed from zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    page_size: usize,
}

impl Paginator {
    pub const DEFAULT_PAGE_SIZE: usize = 20;

    /// Creates a paginator, a zero page size is raised to one.
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
        }
    }

    #[inline]
    pub fn page_size(self) -> usize {
        self.page_size
    }

    /// Number of pages of `total` items, zero when there are none.
    pub fn page_count(self, total: usize) -> usize {
        total.div_ceil(self.page_size)
    }

    /// The items of page `index`, empty if it's out of range.
    pub fn page<T>(self, items: &[T], index: usize) -> &[T] {
        let start = index.saturating_mul(self.page_size);
        if start >= items.len() {
            return &[];
        }
        &items[start..start.saturating_add(self.page_size).min(items.len())]
    }

    /// Clamps `index` into the pages of `total` items,
    /// `0` when there are no pages at all.
    #[inline]
    pub fn clamp(self, index: usize, total: usize) -> usize {
        index.min(self.page_count(total).saturating_sub(1))
    }

    /// The page before `index`, staying on the first page.
    #[inline]
    pub fn previous(self, index: usize) -> usize {
        index.saturating_sub(1)
    }

    /// The page after `index`, staying on the last page.
    #[inline]
    pub fn next(self, index: usize, total: usize) -> usize {
        self.clamp(index.saturating_add(1), total)
    }
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PAGE_SIZE)
    }
}

/// One page of a filtered collection.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Zero-based index of this page.
    pub index: usize,
    pub page_count: usize,
    /// Number of items across every page.
    pub total: usize,
    pub items: Vec<T>,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            index: self.index,
            page_count: self.page_count,
            total: self.total,
            items: self.items.into_iter().map(f).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_cover_every_item_once() {
        for size in [1, 3, 20] {
            let paginator = Paginator::new(size);
            for total in [0, 1, 2, 19, 20, 21, 45, 100] {
                let items: Vec<usize> = (0..total).collect();
                let joined: Vec<usize> = (0..paginator.page_count(total))
                    .flat_map(|i| paginator.page(&items, i).iter().copied())
                    .collect();
                assert_eq!(joined, items);
            }
        }
    }

    #[test]
    fn boundaries() {
        let paginator = Paginator::default();
        let items: Vec<usize> = (0..45).collect();
        assert_eq!(paginator.page_count(45), 3);
        assert_eq!(paginator.page(&items, 0).len(), 20);
        assert_eq!(paginator.page(&items, 2), &items[40..]);
        assert!(paginator.page(&items, 3).is_empty());
        assert!(paginator.page(&items, usize::MAX).is_empty());

        assert_eq!(paginator.page_count(40), 2);
        assert_eq!(paginator.page_count(41), 3);
    }

    #[test]
    fn zero_items_have_no_pages() {
        let paginator = Paginator::default();
        let items: [u8; 0] = [];
        assert_eq!(paginator.page_count(0), 0);
        assert!(paginator.page(&items, 0).is_empty());
        assert_eq!(paginator.clamp(5, 0), 0);
    }

    #[test]
    fn navigation_stays_in_range() {
        let paginator = Paginator::new(10);
        assert_eq!(paginator.previous(0), 0);
        assert_eq!(paginator.previous(2), 1);
        assert_eq!(paginator.next(0, 25), 1);
        assert_eq!(paginator.next(2, 25), 2);
        assert_eq!(paginator.next(0, 0), 0);
        assert_eq!(paginator.clamp(7, 25), 2);
    }

    #[test]
    fn huge_page_size_does_not_overflow() {
        let paginator = Paginator::new(usize::MAX);
        let items: Vec<usize> = (0..5).collect();
        assert_eq!(paginator.page_count(0), 0);
        assert_eq!(paginator.page_count(5), 1);
        assert_eq!(paginator.page_count(usize::MAX), 1);
        assert_eq!(paginator.page(&items, 0), &items[..]);
        assert!(paginator.page(&items, 1).is_empty());
        assert_eq!(paginator.clamp(3, 5), 0);
    }

    #[test]
    fn zero_page_size_is_raised() {
        assert_eq!(Paginator::new(0).page_size(), 1);
        assert_eq!(Paginator::new(0).page_count(3), 3);
    }
}
