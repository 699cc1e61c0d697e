//! Incremental list aggregation.
//!
//! A [`Paginator`] is the state behind every "load more" list: it knows which
//! page comes next, keeps the accumulated items, drops items it has already
//! seen, and flips `has_more` off once the server runs out of data.
//!
//! The fetch itself is supplied by the caller, so the same accumulator
//! serves chapter lists, search results or anything else that comes back
//! as offset/limit slices.
//!
//! # Examples
//!
//! ```rust
//! use dexreader::pagination::{Identified, PageSlice, Paginator};
//!
//! #[derive(Debug, Clone)]
//! struct Item(String);
//!
//! impl Identified for Item {
//!     fn id(&self) -> &str {
//!         &self.0
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> dexreader::Result<()> {
//! let all: Vec<Item> = (0..5).map(|i| Item(i.to_string())).collect();
//! let mut list = Paginator::new(2);
//!
//! while list.has_more() {
//!     let source = all.clone();
//!     list.load_next(|offset, limit| async move {
//!         let items = source.into_iter().skip(offset).take(limit).collect();
//!         Ok::<_, dexreader::Error>(PageSlice::new(items))
//!     })
//!     .await?;
//! }
//!
//! assert_eq!(list.len(), 5);
//! assert_eq!(list.page(), 4);
//! # Ok(())
//! # }
//! ```

use std::collections::HashSet;
use std::future::Future;

use crate::{
    api::MangaApi,
    error::Result,
    types::{Chapter, ChapterQuery, Manga},
};

/// Anything with a stable identifier to de-duplicate on.
pub trait Identified {
    fn id(&self) -> &str;
}

impl Identified for Manga {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for Chapter {
    fn id(&self) -> &str {
        &self.id
    }
}

/// One page of results as returned by the server.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSlice<T> {
    pub items: Vec<T>,

    /// Total number of items the server reports for the whole list
    pub total: Option<usize>,
}

impl<T> PageSlice<T> {
    /// A slice without a reported total.
    pub fn new(items: Vec<T>) -> Self {
        Self { items, total: None }
    }

    pub fn with_total(items: Vec<T>, total: usize) -> Self {
        Self {
            items,
            total: Some(total),
        }
    }
}

/// Handle of one in-flight load, returned by
/// [`begin_request()`](Paginator::begin_request).
///
/// A reply is only merged while its request is still the one in flight: a
/// [`reset()`](Paginator::reset) or a completed load makes older requests
/// stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadRequest {
    pub offset: usize,
    pub limit: usize,
    generation: u64,
}

/// Page counter, accumulated items and end-of-data flag of one list.
///
/// Pages are 1-based; the offset of the next request is
/// `(page - 1) * page_size`.
///
/// The list ends when a page comes back empty, when the server's total says
/// the last item was reached, or, without a total, when a page comes back
/// shorter than `page_size`.
#[derive(Debug, Clone)]
pub struct Paginator<T> {
    page: usize,
    page_size: usize,
    items: Vec<T>,
    seen: HashSet<String>,
    has_more: bool,
    loading: bool,
    generation: u64,
}

impl<T: Identified> Paginator<T> {
    /// Creates an empty list fetching `page_size` items at a time.
    ///
    /// A page size of zero is treated as one.
    pub fn new(page_size: usize) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            items: Vec::new(),
            seen: HashSet::new(),
            has_more: true,
            loading: false,
            generation: 0,
        }
    }

    /// Number of the next page to load.
    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Offset of the next page to load.
    pub fn offset(&self) -> usize {
        (self.page - 1) * self.page_size
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Back to page 1 with an empty list.
    pub fn reset(&mut self) {
        self.page = 1;
        self.items.clear();
        self.seen.clear();
        self.has_more = true;
        self.loading = false;
        self.generation = self.generation.wrapping_add(1);
    }

    /// Marks a load as started and returns its `(offset, limit)`.
    ///
    /// Returns `None`, without changing anything, when the list is exhausted
    /// or a load is already in flight. Every `Some` must be followed by
    /// [`apply()`](Paginator::apply) or [`fail_load()`](Paginator::fail_load).
    pub fn begin_load(&mut self) -> Option<(usize, usize)> {
        self.begin_request().map(|req| (req.offset, req.limit))
    }

    /// Like [`begin_load()`](Paginator::begin_load), for loads whose reply
    /// arrives later and may outlive the list state it was issued for.
    ///
    /// Finish it with [`apply_for()`](Paginator::apply_for) or
    /// [`fail_for()`](Paginator::fail_for).
    pub fn begin_request(&mut self) -> Option<LoadRequest> {
        if !self.has_more || self.loading {
            return None;
        }
        self.loading = true;
        Some(LoadRequest {
            offset: self.offset(),
            limit: self.page_size,
            generation: self.generation,
        })
    }

    /// Whether `request` is the load currently in flight.
    pub fn is_pending(&self, request: &LoadRequest) -> bool {
        self.loading && request.generation == self.generation && request.offset == self.offset()
    }

    /// Ends an in-flight load that failed; the list is left as it was.
    pub fn fail_load(&mut self) {
        self.loading = false;
    }

    /// Ends `request` as failed. Returns `false`, changing nothing, when the
    /// request is stale.
    pub fn fail_for(&mut self, request: &LoadRequest) -> bool {
        if !self.is_pending(request) {
            return false;
        }
        self.fail_load();
        true
    }

    /// Merges the reply to `request`.
    ///
    /// Returns `None` and leaves the list untouched when the request is
    /// stale, otherwise the number of newly appended items.
    pub fn apply_for(&mut self, request: &LoadRequest, slice: PageSlice<T>) -> Option<usize> {
        if !self.is_pending(request) {
            tracing::debug!(offset = request.offset, "dropping stale page");
            return None;
        }
        Some(self.apply(slice))
    }

    /// Merges a fetched page and returns how many new items were appended.
    pub fn apply(&mut self, slice: PageSlice<T>) -> usize {
        self.loading = false;

        let offset = self.offset();
        let fetched = slice.items.len();

        let mut added = 0;
        for item in slice.items {
            if self.seen.insert(item.id().to_string()) {
                self.items.push(item);
                added += 1;
            }
        }

        if fetched > 0 {
            self.page += 1;
        }

        let exhausted = match slice.total {
            _ if fetched == 0 => true,
            Some(total) => offset + fetched >= total,
            None => fetched < self.page_size,
        };
        if exhausted {
            self.has_more = false;
            tracing::info!(items = self.items.len(), pages = self.page - 1, "list exhausted");
        }

        added
    }

    /// Loads the next page through `fetch(offset, limit)`.
    ///
    /// Returns the number of newly appended items; `Ok(0)` without calling
    /// `fetch` when the list is exhausted.
    ///
    /// # Errors
    ///
    /// Whatever `fetch` returns. The accumulated list, page counter and
    /// `has_more` are unchanged by a failed load.
    pub async fn load_next<F, Fut>(&mut self, fetch: F) -> Result<usize>
    where
        F: FnOnce(usize, usize) -> Fut,
        Fut: Future<Output = Result<PageSlice<T>>>,
    {
        let Some((offset, limit)) = self.begin_load() else {
            return Ok(0);
        };

        match fetch(offset, limit).await {
            Ok(slice) => Ok(self.apply(slice)),
            Err(e) => {
                self.fail_load();
                Err(e)
            }
        }
    }

    /// Loads pages until the list is exhausted and returns the number of
    /// items appended along the way.
    pub async fn fetch_all<F, Fut>(&mut self, mut fetch: F) -> Result<usize>
    where
        F: FnMut(usize, usize) -> Fut,
        Fut: Future<Output = Result<PageSlice<T>>>,
    {
        let mut added = 0;
        while self.has_more {
            added += self.load_next(&mut fetch).await?;
        }
        Ok(added)
    }
}

impl Paginator<Chapter> {
    /// Loads the next page of a manga's chapter list.
    pub async fn load_chapters<A>(&mut self, api: &A, query: &ChapterQuery) -> Result<usize>
    where
        A: MangaApi + ?Sized,
    {
        self.load_next(|offset, limit| api.chapter_page(query, offset, limit))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item(String);

    impl Identified for Item {
        fn id(&self) -> &str {
            &self.0
        }
    }

    fn items(ids: &[&str]) -> Vec<Item> {
        ids.iter().map(|id| Item(id.to_string())).collect()
    }

    #[test]
    fn test_offsets_follow_page_counter() {
        let mut list: Paginator<Item> = Paginator::new(100);
        assert_eq!(list.page(), 1);
        assert_eq!(list.offset(), 0);

        assert_eq!(list.begin_load(), Some((0, 100)));
        let full: Vec<Item> = (0..100).map(|i| Item(i.to_string())).collect();
        list.apply(PageSlice::new(full));

        assert_eq!(list.page(), 2);
        assert_eq!(list.offset(), 100);
        assert!(list.has_more());
    }

    #[test]
    fn test_begin_load_guards_in_flight() {
        let mut list: Paginator<Item> = Paginator::new(2);
        assert!(list.begin_load().is_some());
        assert!(list.is_loading());
        assert_eq!(list.begin_load(), None);

        list.fail_load();
        assert!(!list.is_loading());
        assert_eq!(list.begin_load(), Some((0, 2)));
    }

    #[test]
    fn test_duplicates_are_dropped() {
        let mut list = Paginator::new(3);
        list.begin_load();
        assert_eq!(list.apply(PageSlice::new(items(&["a", "b", "c"]))), 3);
        list.begin_load();
        assert_eq!(list.apply(PageSlice::new(items(&["c", "d", "a"]))), 1);

        let ids: Vec<&str> = list.items().iter().map(|i| i.id()).collect();
        assert_eq!(ids, vec!["a", "b", "c", "d"]);
        assert!(list.has_more());
    }

    #[test]
    fn test_empty_page_ends_list() {
        let mut list: Paginator<Item> = Paginator::new(2);
        list.begin_load();
        list.apply(PageSlice::new(items(&["a", "b"])));
        list.begin_load();
        assert_eq!(list.apply(PageSlice::new(Vec::new())), 0);

        assert!(!list.has_more());
        assert_eq!(list.page(), 2);
        assert_eq!(list.begin_load(), None);
    }

    #[test]
    fn test_total_ends_list() {
        let mut list = Paginator::new(2);
        list.begin_load();
        list.apply(PageSlice::with_total(items(&["a", "b"]), 4));
        assert!(list.has_more());
        list.begin_load();
        list.apply(PageSlice::with_total(items(&["c", "d"]), 4));
        assert!(!list.has_more());
    }

    #[test]
    fn test_total_overrides_short_page() {
        // A server capping the limit below page_size still reports its total
        let mut list = Paginator::new(10);
        list.begin_load();
        list.apply(PageSlice::with_total(items(&["a", "b"]), 30));
        assert!(list.has_more());
    }

    #[test]
    fn test_short_page_without_total_ends_list() {
        let mut list = Paginator::new(3);
        list.begin_load();
        list.apply(PageSlice::new(items(&["a"])));
        assert!(!list.has_more());
    }

    #[test]
    fn test_reset() {
        let mut list = Paginator::new(1);
        list.begin_load();
        list.apply(PageSlice::new(items(&["a"])));
        list.reset();

        assert_eq!(list.page(), 1);
        assert!(list.is_empty());
        assert!(list.has_more());

        list.begin_load();
        assert_eq!(list.apply(PageSlice::new(items(&["a"]))), 1);
    }

    #[test]
    fn test_reply_after_reset_is_stale() {
        let mut list = Paginator::new(2);
        let old = list.begin_request().unwrap();
        list.reset();
        let current = list.begin_request().unwrap();
        assert_eq!(old.offset, current.offset);

        // The old reply lands while the new load is still in flight
        assert_eq!(list.apply_for(&old, PageSlice::new(items(&["a", "b"]))), None);
        assert!(list.is_loading());
        assert_eq!(list.page(), 1);

        assert_eq!(list.apply_for(&current, PageSlice::new(items(&["a", "b"]))), Some(2));
        assert_eq!(list.apply_for(&old, PageSlice::new(items(&["a", "b"]))), None);
        assert_eq!(list.page(), 2);
        assert_eq!(list.offset(), 2);
        assert!(!list.fail_for(&old));
        assert_eq!(list.begin_load(), Some((2, 2)));
    }

    #[test]
    fn test_duplicate_reply_does_not_advance_page() {
        let mut list = Paginator::new(2);
        let first = list.begin_request().unwrap();
        assert_eq!(list.apply_for(&first, PageSlice::new(items(&["a", "b"]))), Some(2));

        // The same reply delivered twice
        assert_eq!(list.apply_for(&first, PageSlice::new(items(&["a", "b"]))), None);
        assert_eq!(list.page(), 2);

        let next = list.begin_request().unwrap();
        assert_eq!(next.offset, 2);
        assert!(!list.fail_for(&first));
        assert!(list.is_loading());
        assert!(list.fail_for(&next));
        assert!(!list.is_loading());
    }

    #[test]
    fn test_zero_page_size() {
        let list: Paginator<Item> = Paginator::new(0);
        assert_eq!(list.page_size(), 1);
    }
}
