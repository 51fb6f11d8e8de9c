use std::num::NonZeroUsize;

use crate::feed::Article;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page<'a> {
    pub items: &'a [Article],
    pub exhausted: bool,
}

/// Pagination state, tracked independently of what has been rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    cursor: usize,
    page_size: NonZeroUsize,
}

impl Paginator {
    pub fn new(page_size: NonZeroUsize) -> Self {
        Self {
            cursor: 0,
            page_size,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_exhausted(&self, articles: &[Article]) -> bool {
        self.cursor >= articles.len()
    }

    /// Returns `[cursor, cursor + page_size)` and advances the cursor by a full page,
    /// even when the slice came out shorter.
    pub fn next_page<'a>(&mut self, articles: &'a [Article]) -> Page<'a> {
        let start = self.cursor.min(articles.len());
        let end = self.cursor.saturating_add(self.page_size.get()).min(articles.len());

        self.cursor = self.cursor.saturating_add(self.page_size.get());

        Page {
            items: &articles[start..end],
            exhausted: self.is_exhausted(articles),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::tests::snapshot;

    fn paginator(page_size: usize) -> Paginator {
        Paginator::new(NonZeroUsize::new(page_size).unwrap())
    }

    #[test]
    fn pages_through_45_articles() {
        let articles = snapshot(45).articles;
        let mut pages = paginator(20);

        let first = pages.next_page(&articles);
        assert_eq!(first.items, &articles[0..20]);
        assert!(!first.exhausted);

        let second = pages.next_page(&articles);
        assert_eq!(second.items, &articles[20..40]);
        assert!(!second.exhausted);

        let third = pages.next_page(&articles);
        assert_eq!(third.items, &articles[40..45]);
        assert_eq!(third.items.len(), 5);
        assert!(third.exhausted);
        assert_eq!(pages.cursor(), 60);
    }

    #[test]
    fn exhausted_paginator_stays_exhausted() {
        let articles = snapshot(3).articles;
        let mut pages = paginator(2);
        pages.next_page(&articles);
        pages.next_page(&articles);

        for _ in 0..5 {
            let page = pages.next_page(&articles);
            assert!(page.items.is_empty());
            assert!(page.exhausted);
        }

        assert_eq!(pages.cursor(), 14);
    }

    #[test]
    fn empty_list_is_exhausted_immediately() {
        let mut pages = paginator(20);
        let page = pages.next_page(&[]);

        assert!(page.items.is_empty());
        assert!(page.exhausted);
        assert_eq!(pages.cursor(), 20);
    }

    #[test]
    fn cursor_saturates_instead_of_overflowing() {
        let articles = snapshot(1).articles;
        let mut pages = paginator(usize::MAX);

        assert_eq!(pages.next_page(&articles).items.len(), 1);
        assert!(pages.next_page(&articles).exhausted);
        assert_eq!(pages.cursor(), usize::MAX);
    }

    #[test]
    fn calls_until_exhaustion_is_ceil_n_over_p() {
        for len in [0, 1, 2, 19, 20, 21, 39, 40, 41, 100] {
            for page_size in [1, 2, 3, 7, 20, 50] {
                let articles = snapshot(len).articles;
                let mut pages = paginator(page_size);
                let mut calls = 0;
                let mut seen = 0;

                loop {
                    let page = pages.next_page(&articles);
                    calls += 1;
                    seen += page.items.len();

                    if page.exhausted {
                        break;
                    }
                }

                let expected = if len == 0 { 1 } else { len.div_ceil(page_size) };
                assert_eq!(calls, expected, "len = {len}, page size = {page_size}");
                assert_eq!(seen, len);
            }
        }
    }
}
