//! Lazy, pull-based pagination over a listing endpoint
//!
//! Each call to `next` either pops a buffered record or, once the buffer
//! is drained, issues exactly one request for the following page. A page
//! is decoded in full before any of its records are yielded, so a failing
//! page never produces partial output.

use std::collections::VecDeque;
use std::iter::FusedIterator;

use oanet_core::EntityRecord;

use crate::api::{ApiClient, Page, Transport};
use crate::config::Query;
use crate::error::FetchError;
use crate::state::{Entity, PageCursor, PagingMode};

/// One retrieval session. Single use: re-issue the query to start over.
pub struct EntityPager<'a, T: Transport> {
    client: &'a ApiClient<T>,
    entity: Entity,
    base_params: Vec<(String, String)>,
    per_page: u32,
    mode: PagingMode,
    /// `None` once the server has no more pages (or the session failed)
    next: Option<PageCursor>,
    buffer: VecDeque<EntityRecord>,
    max_entities: Option<usize>,
    /// Effective total (server count capped by `max_entities`)
    total: Option<usize>,
    yielded: usize,
    pages_fetched: usize,
}

impl<'a, T: Transport> EntityPager<'a, T> {
    pub(crate) fn new(client: &'a ApiClient<T>, query: &Query) -> Self {
        let config = client.config();
        let mode = config.paging.resolve(query.max_entities);
        Self {
            client,
            entity: query.entity,
            base_params: query.base_params(config.email.as_deref()),
            per_page: config.per_page,
            mode,
            next: Some(PageCursor::start(mode)),
            buffer: VecDeque::new(),
            max_entities: query.max_entities,
            total: None,
            yielded: 0,
            pages_fetched: 0,
        }
    }

    pub fn entity(&self) -> Entity {
        self.entity
    }

    /// Resolved paging protocol
    pub fn mode(&self) -> PagingMode {
        self.mode
    }

    /// Effective total, known once the first page has arrived
    pub fn total(&self) -> Option<usize> {
        self.total
    }

    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    pub fn yielded(&self) -> usize {
        self.yielded
    }

    fn cap_reached(&self) -> bool {
        self.max_entities.is_some_and(|max| self.yielded >= max)
    }

    fn request_params(&self, position: &PageCursor) -> Vec<(String, String)> {
        let mut params = self.base_params.clone();
        params.push(("per-page".to_string(), self.per_page.to_string()));
        params.push(position.query_param());
        params
    }

    fn fetch(&mut self, position: PageCursor) -> Result<(), FetchError> {
        let params = self.request_params(&position);
        let page = self.client.fetch_page(self.entity, &params)?;
        self.pages_fetched += 1;

        if self.total.is_none() {
            self.total = page.meta.count.map(|count| self.effective_total(count));
        }
        log::debug!(
            "{}: {} -> {} records (total {:?})",
            self.entity,
            describe(&position),
            page.results.len(),
            self.total
        );

        self.next = self.advance(&position, &page);
        self.buffer.extend(page.results);
        Ok(())
    }

    fn effective_total(&self, count: u64) -> usize {
        let count = usize::try_from(count).unwrap_or(usize::MAX);
        match self.max_entities {
            Some(max) if count > max => {
                log::warn!(
                    "{}: {count} entities match, only the first {max} will be retrieved",
                    self.entity
                );
                max
            }
            _ => count,
        }
    }

    /// Position of the page after `current`, or `None` when exhausted
    fn advance(&self, current: &PageCursor, page: &Page) -> Option<PageCursor> {
        if page.results.is_empty() {
            return None;
        }
        match current {
            PageCursor::Page(k) => {
                let page_size = page.meta.per_page.unwrap_or(self.per_page).max(1) as usize;
                let seen = *k as usize * page_size;
                let more = match self.total {
                    Some(total) => seen < total,
                    // no count reported: a short page is the last one
                    None => page.results.len() >= page_size,
                };
                more.then(|| PageCursor::Page(k + 1))
            }
            PageCursor::Cursor(_) => page
                .meta
                .next_cursor()
                .map(|token| PageCursor::Cursor(token.to_string())),
        }
    }
}

fn describe(position: &PageCursor) -> String {
    let (k, v) = position.query_param();
    format!("{k}={v}")
}

impl<T: Transport> Iterator for EntityPager<'_, T> {
    type Item = Result<EntityRecord, FetchError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.cap_reached() {
                self.next = None;
                self.buffer.clear();
                return None;
            }
            if let Some(record) = self.buffer.pop_front() {
                self.yielded += 1;
                return Some(Ok(record));
            }
            let position = self.next.take()?;
            if let Err(e) = self.fetch(position) {
                log::error!("{}: session aborted: {e}", self.entity);
                return Some(Err(e));
            }
        }
    }
}

impl<T: Transport> FusedIterator for EntityPager<'_, T> {}
