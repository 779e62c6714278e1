//! Cursor pagination over list endpoints.
//!
//! [`paginate`] turns a page fetcher into a lazy stream of items. Pages are
//! requested strictly in cursor order and only when the consumer asks for
//! more items, so a caller looking for the first match can stop early by
//! dropping the stream. Calling [`paginate`] again restarts from the first
//! page.
//!
//! There is no page cap: the stream ends only when the remote reports no
//! next page.

use crate::error::{Error, Result};
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use std::future::Future;

/// Page size for most list endpoints.
pub const DEFAULT_PAGE_SIZE: u8 = 100;

/// Page size for endpoints with heavy items, such as release listings.
pub const RELEASES_PAGE_SIZE: u8 = 50;

/// Parameters for fetching a single page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Page cursor; `None` requests the first page
    pub page: Option<u32>,
    /// Maximum number of items per page
    pub per_page: u8,
}

impl PageRequest {
    /// Request for the first page.
    #[must_use]
    pub const fn first(per_page: u8) -> Self {
        Self {
            page: None,
            per_page,
        }
    }
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Items in remote order
    pub items: Vec<T>,
    /// Cursor of the next page; `None` or `Some(0)` means exhausted
    pub next_page: Option<u32>,
}

impl<T> Page<T> {
    /// A final page.
    #[must_use]
    pub const fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_page: None,
        }
    }

    /// A page followed by page `next`.
    #[must_use]
    pub const fn with_next(items: Vec<T>, next: u32) -> Self {
        Self {
            items,
            next_page: Some(next),
        }
    }

    /// Cursor of the next page, if there is one.
    #[must_use]
    pub fn next_cursor(&self) -> Option<u32> {
        self.next_page.filter(|page| *page != 0)
    }
}

/// Streams every item of a paginated listing.
///
/// `fetch` is called once per page with the cursor reported by the previous
/// page. The first error ends the stream.
pub fn paginate<'a, T, F, Fut>(per_page: u8, fetch: F) -> BoxStream<'a, Result<T>>
where
    T: Send + 'a,
    F: FnMut(PageRequest) -> Fut + Send + 'a,
    Fut: Future<Output = Result<Page<T>>> + Send + 'a,
{
    let first = Some(PageRequest::first(per_page));

    stream::try_unfold((fetch, first), |(mut fetch, request)| async move {
        let Some(request) = request else {
            return Ok::<_, Error>(None);
        };
        let page = fetch(request).await?;
        let next = page.next_cursor().map(|cursor| PageRequest {
            page: Some(cursor),
            per_page: request.per_page,
        });
        Ok(Some((page.items, (fetch, next))))
    })
    .map_ok(|items| stream::iter(items.into_iter().map(Ok)))
    .try_flatten()
    .boxed()
}
